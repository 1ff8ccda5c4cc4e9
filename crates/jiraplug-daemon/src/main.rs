//! JiraPlug Daemon
//!
//! Connects to the orchestration server as an issue tracker plug and answers
//! its requests against a Jira server.

use anyhow::{bail, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use jiraplug_core::storage::{init_data_dir, log_file_name, ConfigStorage};
use jiraplug_daemon::{ApiHandler, PlugClient, PlugConfig};
use jiraplug_jira::JiraClient;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "jiraplugd")]
#[command(about = "JiraPlug daemon - issue tracker plug for Jira", long_about = None)]
#[command(after_help = "Example:\n  jiraplugd --server wss://blackmore:7111/plug --config jira-config.conf \\\n            --apikey x2fjk28fda --name jira")]
struct Args {
    /// Orchestration server web socket URL
    #[arg(
        long = "server",
        value_name = "WEB_SOCKET_URL",
        value_parser = NonEmptyStringValueParser::new()
    )]
    server: String,

    /// JSON config file with serverUrl, user and password
    #[arg(long, value_name = "JSON_CONFIG_FILE_PATH")]
    config: PathBuf,

    /// Web socket connection API key
    #[arg(
        long = "apikey",
        value_name = "WEB_SOCKET_CONN_KEY",
        value_parser = NonEmptyStringValueParser::new()
    )]
    api_key: String,

    /// Name for this plug
    #[arg(
        long,
        value_name = "PLUG_NAME",
        value_parser = NonEmptyStringValueParser::new()
    )]
    name: String,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file_path = init_logging(&args)?;

    tracing::info!(
        "JiraPlug [{}] started. Version [{}]",
        args.name,
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Log file: {}", log_file_path.display());
    tracing::debug!("Args: {:?}", args);

    if let Err(e) = run(args).await {
        tracing::error!("Error: {}", e);
        tracing::debug!("Error detail: {:?}", e);
        return Err(e);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = ConfigStorage::new(&args.config).load()?;
    tracing::debug!("Loaded config: {:?}", config);

    let jira = JiraClient::new(&config.server_url, &config.user, &config.password)?;

    if !jira.check_connection().await {
        bail!(
            "Unable to contact Jira Server [{url}] using the specified credentials for user [{user}]. \
             Are you using Jira Cloud? If so, did you properly configure a Jira API token for user [{user}] \
             and set it in the JiraPlug password/API Token configuration field?",
            url = config.server_url,
            user = config.user
        );
    }
    tracing::info!("Connected to Jira server {}", config.server_url);

    let api_handler = Arc::new(ApiHandler::new(Arc::new(jira)));
    let plug_client = Arc::new(PlugClient::new(
        PlugConfig::new(args.server, args.name, args.api_key),
        api_handler,
    ));

    let client_handle = {
        let client = plug_client.clone();
        tokio::spawn(async move { client.run().await })
    };

    tracing::info!("Plug ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    plug_client.shutdown();
    client_handle.await?;

    Ok(())
}

/// Log to stdout at `--log-level` and to a per-plug file in the data
/// directory at debug and above, whatever the console level.
fn init_logging(args: &Args) -> Result<PathBuf> {
    let data_dir = init_data_dir()?;
    let log_file_path = data_dir.join(log_file_name(Some(&args.name)));

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    log_subscriber(&args.log_level, log_file).init();

    Ok(log_file_path)
}

fn log_subscriber(log_level: &str, log_file: fs::File) -> impl Subscriber + Send + Sync {
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(EnvFilter::new(log_level));
    let file_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
}
