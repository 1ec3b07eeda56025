use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Eisenhower task manager with French voice capture.
/// Storage defaults to $TODO_HOME/tasks.json (or ~/.todo/tasks.json).
#[derive(Parser)]
#[command(name = "todo", version, about = "Eisenhower task manager with voice capture")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log level: trace | debug | info | warn | error.
    #[arg(long, global = true, env = "TODO_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["todo", "list", "--db", "/tmp/t.json", "--log-level", "warn"])
            .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.json")));
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
        assert!(matches!(cli.command, Commands::List { .. }));
    }

    #[test]
    fn voice_accepts_missing_transcript() {
        let cli = Cli::try_parse_from(["todo", "voice", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Voice { transcript, dry_run, .. } => {
                assert!(transcript.is_none());
                assert!(dry_run);
            }
            _ => panic!("expected voice"),
        }
    }
}
