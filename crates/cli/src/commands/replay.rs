//! Play a recorded battle back and report where it ends.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use battle_core::{BattleEvent, BattleView};
use battle_runtime::{ReplayPlayer, SessionOutcome, repository::read_replay};
use clap::Parser;
use console::style;

use super::{Content, default_data_dir, print_armies, print_outcome};

#[derive(Parser)]
pub struct Replay {
    /// Replay file (.json or .bin)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Content directory the battle was recorded against
    #[arg(short, long, value_name = "DIR")]
    data: Option<PathBuf>,

    /// Print every action as it is replayed
    #[arg(short, long)]
    verbose: bool,
}

impl Replay {
    pub fn execute(self) -> Result<()> {
        let data_dir = self.data.unwrap_or_else(default_data_dir);
        let content = Content::load(&data_dir)?;

        let log = read_replay(&self.file)
            .with_context(|| format!("Failed to read replay {}", self.file.display()))?;
        tracing::info!(file = %self.file.display(), actions = log.len(), "replay loaded");

        let mut player =
            ReplayPlayer::new(log, content.oracle).context("Failed to rebuild the battle")?;

        let events = Rc::new(Cell::new(0));
        let counter = Rc::clone(&events);
        player
            .engine_mut()
            .add_observer(move |_: &BattleEvent| counter.set(counter.get() + 1));

        print_armies(player.engine(), &player.log().setup);

        while !player.is_at_end() {
            if self.verbose {
                let index = player.position();
                let round = player.engine().round();
                println!(
                    "  {} round {} {}",
                    style(format!("[{index:>4}]")).dim(),
                    round,
                    player.log().actions[index]
                );
            }
            player
                .execute_current()
                .with_context(|| format!("Replay diverged from {}", self.file.display()))?;
        }

        let outcome = SessionOutcome::from_engine(player.engine(), player.position(), events.get());
        print_outcome(player.engine(), &outcome);
        Ok(())
    }
}
