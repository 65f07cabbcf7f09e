//! Command context shared by every subcommand

use std::sync::Arc;

use anyhow::{Context as _, Result};
use term_query_handlers::SchemaRegistry;

use crate::cli::Cli;
use crate::output::OutputFormat;

pub struct Context {
    pub output: OutputFormat,
    pub schema: Arc<SchemaRegistry>,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self> {
        let schema = match cli.schema {
            Some(ref path) => SchemaRegistry::from_path(path)
                .with_context(|| format!("Failed to load schema from {}", path.display()))?,
            None => SchemaRegistry::term().context("Failed to load embedded term schema")?,
        };

        Ok(Self {
            output: cli.output,
            schema: Arc::new(schema),
        })
    }
}
