//! Run a scenario with the greedy AI on both sides.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use battle_core::BattleEvent;
use battle_runtime::{AiParams, BattleSession, ReplayFormat, repository::write_replay};
use clap::Parser;
use console::style;

use super::{Content, FormatArg, default_data_dir, print_armies, print_outcome};

#[derive(Parser)]
pub struct Run {
    /// Content directory with units, spells, rules, config and scenarios
    #[arg(short, long, value_name = "DIR")]
    data: Option<PathBuf>,

    /// Scenario name under `scenarios/`, or a path to a RON file
    #[arg(short, long, value_name = "SCENARIO", default_value = "skirmish")]
    scenario: String,

    /// Override the scenario's random seed
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Stop after this many actions (defaults to the battle config)
    #[arg(long, value_name = "N")]
    max_actions: Option<u32>,

    /// AI weights as a JSON file; missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    ai: Option<PathBuf>,

    /// Write the replay to this file
    #[arg(short, long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Replay encoding (inferred from the file extension when omitted)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let data_dir = self.data.unwrap_or_else(default_data_dir);
        let content = Content::load(&data_dir)?;

        let mut setup = content
            .factory
            .load_scenario(&self.scenario, &content.library)
            .with_context(|| format!("Failed to load scenario '{}'", self.scenario))?;
        if let Some(seed) = self.seed {
            setup.seed = seed;
        }

        let params = match &self.ai {
            Some(path) => load_ai_params(path)?,
            None => AiParams::default(),
        };

        let mut session = BattleSession::new(setup.clone(), &content.oracle)
            .context("Failed to set up the battle")?;
        if let Some(max_actions) = self.max_actions {
            session = session.with_max_actions(max_actions);
        }
        session.add_observer(|event: &BattleEvent| tracing::debug!(?event, "battle event"));

        let outcome = session.run_ai(params).context("Battle aborted")?;

        print_armies(session.engine(), &setup);
        print_outcome(session.engine(), &outcome);

        if let Some(path) = self.record {
            let format = match self.format {
                Some(format) => ReplayFormat::from(format),
                None => ReplayFormat::from_path(&path).unwrap_or_default(),
            };
            if let Some(found) = ReplayFormat::from_path(&path)
                && found != format
            {
                bail!(
                    "{} does not match the {} format; use the .{} extension",
                    path.display(),
                    format,
                    format.extension()
                );
            }
            let path = if path.extension().is_none() {
                path.with_extension(format.extension())
            } else {
                path
            };

            write_replay(&path, &session.replay_log(), format)
                .with_context(|| format!("Failed to write replay to {}", path.display()))?;
            println!(
                "{} {} ({})",
                style("Recorded:").bold().cyan(),
                path.display(),
                format
            );
        }

        Ok(())
    }
}

fn load_ai_params(path: &std::path::Path) -> Result<AiParams> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read AI weights from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse AI weights in {}", path.display()))
}
