//! CLI definitions for seller-harvest.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// seller-harvest CLI.
#[derive(Parser)]
#[command(name = "seller-harvest")]
#[command(about = "Resumable seller-contact harvester for a retail listing page")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Iterate over the sellers of the open listing tab (default)
    Run,

    /// Show the resume cursor and collected record counts
    Status,

    /// Export collected records
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print collected records as a table
    Show {
        /// Case-insensitive filter on business name, email or seller id
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Drop collected records and the resume cursor
    Clear,

    /// Print the effective configuration and validation findings
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["seller-harvest"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_export_flags() {
        let cli = Cli::try_parse_from([
            "seller-harvest",
            "export",
            "--format",
            "csv",
            "-o",
            "sellers.csv",
            "--config",
            "alt.toml",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Export { format, output }) => {
                assert_eq!(format, ExportFormat::Csv);
                assert_eq!(output, Some(PathBuf::from("sellers.csv")));
            }
            _ => panic!("expected export command"),
        }
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
    }

    #[test]
    fn test_show_search() {
        let cli = Cli::try_parse_from(["seller-harvest", "show", "-s", "acme"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Show { search: Some(ref q) }) if q == "acme"
        ));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["seller-harvest", "export", "--format", "xml"]).is_err());
    }
}
