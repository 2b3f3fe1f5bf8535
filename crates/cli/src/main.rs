//! Battle simulator binary.
//!
//! Runs a scenario with the greedy AI on both sides, optionally recording the
//! battle, or plays a recorded battle back.
//!
//! # Examples
//!
//! ```bash
//! # Run the bundled skirmish and keep the replay
//! battle run --data crates/battle/content/data --scenario skirmish --record skirmish.json
//!
//! # Watch it again
//! battle replay --data crates/battle/content/data skirmish.json
//! ```

mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Replay, Run};

/// Hex-grid tactical battle simulator
#[derive(Parser)]
#[command(name = "battle")]
#[command(about = "Run and replay deterministic hex-grid battles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scenario with the AI on both sides
    Run(Run),

    /// Play a recorded battle back
    Replay(Replay),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for RUST_LOG)
    let _ = dotenvy::dotenv();

    logging::setup_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Replay(cmd) => cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_a_recording_request() {
        let cli = Cli::try_parse_from([
            "battle", "run", "--scenario", "siege", "--seed", "7", "--record", "out", "--format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Run(_)));
    }

    #[test]
    fn replay_requires_a_file() {
        assert!(Cli::try_parse_from(["battle", "replay"]).is_err());
        assert!(Cli::try_parse_from(["battle", "replay", "duel.bin"]).is_ok());
    }
}
