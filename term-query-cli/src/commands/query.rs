//! Query commands
//!
//! ```bash
//! # Show the SOQL for a set of filters
//! term-query soql --param status=Open --param sequence=2
//!
//! # Flatten a saved query service payload
//! term-query project --input payload.json
//!
//! # Run the handler against the query service
//! term-query fetch --param status=Open --service-url https://sf-query.example.com/query
//!
//! # Run the handler on a proxy event
//! term-query invoke --stdin < event.json
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use term_query_handlers::{
    ErrorEnvelope, FilterParams, FlatRecord, QueryBuilder, QueryExecutorClient,
    QueryExecutorConfig, RecordProjector, TermGetHandler, TermGetRequest, TermGetResponse,
};

use crate::context::Context;
use crate::output::{print_field, print_section, records_table, OutputFormat};

/// Filter parameters given on the command line.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Filter parameter as key=value (repeatable, order is kept)
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

impl FilterArgs {
    fn to_filter_params(&self) -> FilterParams {
        self.params.iter().cloned().collect()
    }
}

/// Query service connection options.
#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// Query service endpoint
    #[arg(long, env = "SF_QUERY_SERVICE_URL")]
    pub service_url: String,

    /// Bearer token for the query service
    #[arg(long, env = "SF_QUERY_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(
        long,
        env = "SF_QUERY_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=900)
    )]
    pub timeout: u64,
}

impl ServiceArgs {
    fn client(&self) -> Result<QueryExecutorClient> {
        let mut config = QueryExecutorConfig::new(&self.service_url)
            .context("Invalid query service URL")?;
        config.auth_token = self.token.clone();
        config.timeout = Duration::from_secs(self.timeout);

        QueryExecutorClient::new(config).context("Failed to create query service client")
    }
}

/// Input source options.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Input file path (JSON)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Read input from stdin
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Args, Debug)]
pub struct SoqlArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Print the SOQL for the given filters.
pub fn soql(ctx: &Context, args: SoqlArgs) -> Result<()> {
    let params = args.filters.to_filter_params();
    let builder = QueryBuilder::term(&ctx.schema);
    let query = builder.build(&params);

    match ctx.output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "soql": query }))?
            );
        }
        OutputFormat::Table => {
            print_section("SOQL");
            println!("{query}");

            let predicates = builder.predicates(&params);
            print_field("Predicates", &predicates.len().to_string());
            print_field("Ignored", &(params.len() - predicates.len()).to_string());
        }
    }

    Ok(())
}

/// Flatten the records in a saved payload.
pub fn project(ctx: &Context, args: ProjectArgs) -> Result<()> {
    let raw = read_input(&args.input)?;
    let payload: Value = serde_json::from_str(&raw).context("Failed to parse payload JSON")?;

    let records = term_query_handlers::contracts::records_from_payload(payload);
    let flat = RecordProjector::new(&ctx.schema).project_all(&records);

    print_records(ctx.output, &flat)
}

/// Run the handler for the given filters.
pub async fn fetch(ctx: &Context, args: FetchArgs) -> Result<()> {
    let handler = handler(ctx, &args.service)?;
    let request = TermGetRequest::new(args.filters.to_filter_params());

    let response = handler.handle(request).await;
    print_response(ctx.output, &response)
}

/// Run the handler on a proxy event and print the proxy response.
pub async fn invoke(ctx: &Context, args: InvokeArgs) -> Result<()> {
    let raw = read_input(&args.input)?;
    let request: TermGetRequest =
        serde_json::from_str(&raw).context("Failed to parse proxy event JSON")?;

    let handler = handler(ctx, &args.service)?;
    let response = handler.handle(request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn handler(ctx: &Context, service: &ServiceArgs) -> Result<TermGetHandler> {
    let client = service.client()?;
    Ok(TermGetHandler::new(Arc::clone(&ctx.schema), Arc::new(client)))
}

fn print_response(format: OutputFormat, response: &TermGetResponse) -> Result<()> {
    if !response.is_success() {
        let envelope: ErrorEnvelope = serde_json::from_str(&response.body)
            .context("Failed to parse error response")?;

        match format {
            OutputFormat::Json => println!("{}", response.body),
            OutputFormat::Table => {
                print_section("Query Failed");
                print_field("Status", &response.status_code.to_string());
                print_field("Error", &envelope.error);
                print_field("Detail", &envelope.detail);
            }
        }

        bail!("{}: {}", envelope.error, envelope.detail);
    }

    let records: Vec<FlatRecord> =
        serde_json::from_str(&response.body).context("Failed to parse response body")?;
    print_records(format, &records)
}

fn print_records(format: OutputFormat, records: &[FlatRecord]) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Table => {
            print_section("Records");
            if records.is_empty() {
                println!("  {}", "No records".dimmed());
            } else {
                println!("{}", records_table(records));
            }
            print_field("Count", &records.len().to_string());
        }
    }

    Ok(())
}

/// Read input from file or stdin
fn read_input(input: &InputArgs) -> Result<String> {
    if input.stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if let Some(ref path) = input.input {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    } else {
        bail!("Either --input or --stdin must be provided")
    }
}

/// Parse a `key=value` argument. Only the first `=` separates.
fn parse_key_val(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing key in '{arg}'")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{arg}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("status=Open").unwrap(),
            ("status".to_string(), "Open".to_string())
        );
        assert_eq!(
            parse_key_val("name=a=b").unwrap(),
            ("name".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_val("status=").unwrap(),
            ("status".to_string(), String::new())
        );
        assert!(parse_key_val("status").is_err());
        assert!(parse_key_val("=Open").is_err());
    }

    #[test]
    fn test_filter_args_keep_order_and_last_value() {
        let args = FilterArgs {
            params: vec![
                ("sequence".to_string(), "1".to_string()),
                ("status".to_string(), "Open".to_string()),
                ("sequence".to_string(), "2".to_string()),
            ],
        };

        let params = args.to_filter_params();
        let entries: Vec<_> = params.iter().collect();
        assert_eq!(entries, vec![("sequence", "2"), ("status", "Open")]);
    }

    #[test]
    fn test_read_input_requires_a_source() {
        let err = read_input(&InputArgs {
            input: None,
            stdin: false,
        })
        .unwrap_err();
        assert!(err.to_string().contains("--input or --stdin"));
    }
}
