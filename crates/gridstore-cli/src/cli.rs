use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ingest power system datasets into a gridstore database", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a dataset into a freshly cleared database
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
    /// Print the bundled schema DDL
    Schema,
}

#[derive(Subcommand, Debug)]
pub enum IngestCommands {
    /// RTS-GMLC style dataset (network, generators, loads, supply curves)
    Rts(IngestArgs),
    /// 5-bus style dataset (network and bus loads)
    FiveBus(IngestArgs),
}

impl IngestCommands {
    pub fn args(&self) -> &IngestArgs {
        match self {
            IngestCommands::Rts(args) | IngestCommands::FiveBus(args) => args,
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            IngestCommands::Rts(_) => "rts",
            IngestCommands::FiveBus(_) => "five-bus",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Database file to create (cleared if it exists)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub db: PathBuf,

    /// Root directory of the source dataset
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub source: PathBuf,

    /// DDL script to apply instead of the bundled schema (repeatable)
    #[arg(long = "schema", value_hint = ValueHint::FilePath)]
    pub schemas: Vec<PathBuf>,

    /// Ingestion settings (TOML); defaults apply when omitted or missing
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Also write the ingestion report as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_schema_flags() {
        let cli = Cli::try_parse_from([
            "gridstore",
            "ingest",
            "five-bus",
            "--db",
            "out.db",
            "--source",
            "data",
            "--schema",
            "a.sql",
            "--schema",
            "b.sql",
        ])
        .unwrap();
        let Commands::Ingest { command } = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(command.family(), "five-bus");
        assert_eq!(
            command.args().schemas,
            vec![PathBuf::from("a.sql"), PathBuf::from("b.sql")]
        );
        assert_eq!(cli.log_level, tracing::Level::INFO);
    }

    #[test]
    fn db_and_source_are_required() {
        assert!(Cli::try_parse_from(["gridstore", "ingest", "rts", "--db", "out.db"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        build_cli_command().debug_assert();
    }
}
