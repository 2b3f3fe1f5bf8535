mod replay;
mod run;

pub use replay::Replay;
pub use run::Run;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_core::{BattleEngine, BattleSetup, BattleView, MemoryLibrary, Side};
use battle_runtime::{OracleManager, ReplayFormat, SessionOutcome};
use console::style;

/// Replay file encoding selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    /// Human-readable JSON
    Json,
    /// Compact binary
    Bincode,
}

impl From<FormatArg> for ReplayFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => ReplayFormat::Json,
            FormatArg::Bincode => ReplayFormat::Bincode,
        }
    }
}

/// Loaded content: the oracle for engines plus what scenarios are checked against.
pub struct Content {
    pub factory: ContentFactory,
    pub library: Arc<MemoryLibrary>,
    pub oracle: OracleManager,
}

impl Content {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let factory = ContentFactory::new(data_dir);
        let library = factory
            .load_library()
            .with_context(|| format!("Failed to load units and spells from {}", data_dir.display()))?;
        let rules = factory.load_rules().context("Failed to load rules")?;
        let config = factory.load_config().context("Failed to load battle config")?;

        let library = Arc::new(library);
        tracing::debug!(data_dir = %data_dir.display(), "content loaded");
        Ok(Self {
            oracle: OracleManager::new(library.clone(), rules, config),
            library,
            factory,
        })
    }
}

/// Default data directory: `BATTLE_DATA_DIR` or the bundled content.
pub fn default_data_dir() -> PathBuf {
    std::env::var_os("BATTLE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/battle/content/data"))
}

pub fn print_armies(engine: &BattleEngine, setup: &BattleSetup) {
    println!("{} seed {}", style("Battle:").bold().cyan(), setup.seed);
    for side in Side::BOTH {
        let stacks: Vec<String> = engine
            .stacks()
            .iter()
            .filter(|stack| stack.side() == side)
            .map(|stack| format!("{} x{}", stack.unit().id, stack.count()))
            .collect();
        println!("  {:<8} {}", side, stacks.join(", "));
    }
}

pub fn print_outcome(engine: &BattleEngine, outcome: &SessionOutcome) {
    println!();
    match outcome.result {
        Some(result) => println!("{} {}", style("Result:").bold().green(), result),
        None => println!(
            "{} {}",
            style("Result:").bold().yellow(),
            "stopped by the action limit"
        ),
    }
    println!("{} {}", style("Rounds:").bold().cyan(), outcome.rounds);
    println!("{} {}", style("Actions:").bold().cyan(), outcome.actions);
    println!("{} {}", style("Events:").bold().cyan(), outcome.events);
    println!(
        "{} {}",
        style("State root:").bold().cyan(),
        hex::encode(outcome.state_root)
    );

    println!("{}", style("Survivors:").bold().cyan());
    let survivors = engine.alive_stacks();
    if survivors.is_empty() {
        println!("  none");
    }
    for stack in survivors {
        println!(
            "  {:<8} {} x{} ({} hp on top)",
            stack.side(),
            stack.unit().id,
            stack.count(),
            stack.health()
        );
    }
}
