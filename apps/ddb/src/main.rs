//! ddb - fetch a DynamoDB item by key.
//!
//! The table's key schema is discovered at run time, so the key values are
//! given as plain text and typed from the table description.
//!
//! # Usage
//!
//! ```text
//! ddb get <table> <partition> [<sort>] [--consistent-read]
//! ```
//!
//! # Configuration
//!
//! Settings are layered, highest precedence first: command-line flags,
//! environment variables, the config file (`--config`, else `~/.ddb.yaml`),
//! the region of the active AWS profile, built-in defaults.
//!
//! Credentials come from the AWS SDK's default provider chain: environment
//! variables, `AWS_PROFILE` and the shared config files (including SSO and
//! `credential_process`), web identity tokens and instance metadata.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AWS_ENDPOINT_URL_DYNAMODB` | *(regional endpoint)* | Endpoint override |
//! | `AWS_REGION` | *(profile region, else `us-east-1`)* | Signing region |
//! | `DDB_TIMEOUT_SECS` | `30` | Request timeout |
//! | `LOG_LEVEL` | `warn` | Log level filter (`--verbose` raises it to `debug`) |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides both) |
//! | `NO_COLOR` | *(unset)* | Disable colour unless `--color` is given |
//!
//! # Exit codes
//!
//! `0` on success, `1` on any failure, `2` on usage errors, `3` when no item
//! has the given key.

mod cli;
mod config;
mod render;

use std::io::IsTerminal;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ddb_client::{ClientConfig, DynamoDBClient, SdkCredentialProvider, load_sdk_config, sdk_region};
use ddb_core::{FetchError, FetchRequest, TypeMap, fetch_item};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::FileConfig;
use crate::render::Renderer;

const EXIT_ERROR: i32 = 1;
const EXIT_NOT_FOUND: i32 = 3;

fn log_level(verbose: bool) -> String {
    if verbose {
        "debug".to_owned()
    } else {
        std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_owned())
    }
}

fn init_tracing(log_level: &str, ansi: bool) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn client_config(
    cli: &Cli,
    file: &FileConfig,
    profile_region: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(region) = profile_region {
        config.region = region;
    }
    file.apply(&mut config);
    let mut config = config.with_lookup(env);
    if let Some(endpoint) = &cli.endpoint_url {
        config.endpoint_url = Some(endpoint.clone());
    }
    if let Some(region) = &cli.region {
        config.region.clone_from(region);
    }
    config
}

async fn run(cli: Cli, file: FileConfig) -> Result<()> {
    let is_terminal = std::io::stdout().is_terminal();
    let renderer = Renderer {
        pretty: cli.pretty(file.pretty.unwrap_or(is_terminal)),
        color: cli.color(
            file.color.unwrap_or(is_terminal),
            std::env::var_os("NO_COLOR").is_some(),
        ),
    };

    let sdk = load_sdk_config().await;
    let config = client_config(&cli, &file, sdk_region(&sdk), |key| std::env::var(key).ok());
    let credentials = SdkCredentialProvider::load(&sdk)
        .await
        .context("failed to resolve AWS credentials")?;
    let client = DynamoDBClient::new(&config, Arc::new(credentials))
        .context("failed to create DynamoDB client")?;

    match cli.command {
        Commands::Get {
            table,
            partition,
            sort,
            consistent_read,
        } => {
            let mut request =
                FetchRequest::new(table, partition).with_consistent_read(consistent_read);
            if let Some(sort) = sort {
                request = request.with_sort_value(sort);
            }
            debug!(?request, endpoint = %client.endpoint(), "Fetching item");

            let record = fetch_item(&client, &TypeMap::complete(), &request).await?;
            println!("{}", renderer.render(&record)?);
        }
    }
    Ok(())
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<FetchError>() {
        Some(FetchError::NotFound { .. }) => EXIT_NOT_FOUND,
        _ => EXIT_ERROR,
    }
}

fn exit_with_error(error: &anyhow::Error) -> ! {
    eprintln!("{} {error:#}", "error:".red().bold());
    process::exit(exit_code(error));
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let file = match FileConfig::load(cli.config.as_deref()) {
        Ok(file) => file,
        Err(e) => exit_with_error(&e),
    };

    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let stderr_color = !(cli.no_color || no_color_env) && std::io::stderr().is_terminal();
    let stdout_color = cli.color(
        file.color.unwrap_or(std::io::stdout().is_terminal()),
        no_color_env,
    );
    colored::control::set_override(stderr_color || stdout_color);

    let verbose = cli.verbose || file.verbose.unwrap_or(false);
    if let Err(e) = init_tracing(&log_level(verbose), stderr_color) {
        exit_with_error(&e);
    }
    if let Some(path) = &file.source {
        debug!(path = %path.display(), "Using config file");
    }

    if let Err(e) = run(cli, file).await {
        exit_with_error(&e);
    }
}
