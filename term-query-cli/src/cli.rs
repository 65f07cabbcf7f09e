//! CLI argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::query::{FetchArgs, InvokeArgs, ProjectArgs, SoqlArgs};
use crate::output::OutputFormat;

/// Term Query CLI
///
/// Build, run and flatten term queries against the query service.
#[derive(Parser, Debug)]
#[command(name = "term-query")]
#[command(version)]
#[command(about = "CLI for the term query handler", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (table, json)
    #[arg(short, long, global = true, default_value = "json", env = "TERM_QUERY_OUTPUT")]
    pub output: OutputFormat,

    /// Schema document (defaults to the embedded term schema)
    #[arg(long, global = true, env = "TERM_SCHEMA_PATH")]
    pub schema: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List schema fields and their SOQL paths
    #[command(alias = "fields")]
    Schema,

    /// Print the SOQL built for a set of filters
    #[command(alias = "build")]
    Soql(SoqlArgs),

    /// Flatten a saved query service payload
    Project(ProjectArgs),

    /// Run the handler against the query service
    #[command(alias = "get")]
    Fetch(FetchArgs),

    /// Run the handler on a proxy event read from a file or stdin
    Invoke(InvokeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_with_timeout(timeout: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from([
            "term-query",
            "fetch",
            "--service-url",
            "http://127.0.0.1:9/query",
            "--timeout",
            timeout,
        ])
    }

    #[test]
    fn test_fetch_timeout_range() {
        assert!(fetch_with_timeout("0").is_err());
        assert!(fetch_with_timeout("901").is_err());

        let cli = fetch_with_timeout("5").unwrap();
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.service.timeout, 5),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
