//! Term Query CLI
//!
//! Command-line access to the term query handler: inspect the schema, print
//! the SOQL a set of filters produces, flatten saved query payloads, and run
//! the full handler against the query service.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;

use cli::{Cli, Commands};
use context::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_directive = if cli.verbose { "term_query_handlers=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::new(&cli)?;

    match cli.command {
        Commands::Schema => commands::schema::execute(&ctx),
        Commands::Soql(cmd) => commands::query::soql(&ctx, cmd),
        Commands::Project(cmd) => commands::query::project(&ctx, cmd),
        Commands::Fetch(cmd) => commands::query::fetch(&ctx, cmd).await,
        Commands::Invoke(cmd) => commands::query::invoke(&ctx, cmd).await,
    }
}
