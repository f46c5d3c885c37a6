use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nimbus_dataconnect::{DataConnect, InMemoryRpcClient, ObservableQuery, QueryState};
use nimbus_protocol::{ConnectorConfig, QueryRequest};
use serde_json::{Value, json};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Execute,
    Subscribe,
}

#[derive(Debug, Parser)]
#[command(name = "nimbus-query")]
#[command(about = "Run a Data Connect query against scripted fixtures")]
struct Cli {
    /// JSON document mapping operation names to scripted outcomes.
    #[arg(long)]
    fixtures: PathBuf,
    #[arg(long)]
    operation: String,
    /// Query variables as a JSON value.
    #[arg(long)]
    variables: Option<String>,
    #[arg(long, value_enum, default_value = "execute")]
    mode: Mode,
    /// How many times to run the query on the same reference.
    #[arg(long, default_value_t = 1)]
    repeat: u32,
    #[arg(long, default_value = "default")]
    service: String,
    #[arg(long, default_value = "us-central1")]
    location: String,
    #[arg(long, default_value = "default")]
    connector: String,
    /// Emit logs as JSON lines.
    #[arg(long)]
    json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

fn render_state(state: &QueryState<Value>) -> Value {
    json!({
        "data": state.data,
        "lastError": state.last_error.as_ref().map(ToString::to_string),
        "updatedAt": state.updated_at.map(|at| at.to_rfc3339()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let raw = fs::read_to_string(&cli.fixtures)
        .await
        .with_context(|| format!("failed reading fixtures {:?}", cli.fixtures))?;
    let rpc = InMemoryRpcClient::from_fixtures_str(&raw).context("failed loading fixtures")?;

    let mut request = QueryRequest::new(&cli.operation);
    if let Some(variables) = &cli.variables {
        let variables: Value =
            serde_json::from_str(variables).context("--variables is not valid JSON")?;
        request = request.with_variables_value(variables);
    }

    let dc = DataConnect::builder(ConnectorConfig::new(
        cli.service,
        cli.location,
        cli.connector,
    ))
    .rpc_client(Arc::new(rpc))
    .build()
    .context("failed building data connect client")?;
    info!(connector = %dc.config().connector_path(), "client ready");

    let query = dc.query::<Value>(request);
    for attempt in 1..=cli.repeat.max(1) {
        let outcome = match cli.mode {
            Mode::Execute => query.execute().await.map(|result| Some(result.data)),
            Mode::Subscribe => query.subscribe().await.map(|()| None),
        };
        match outcome {
            Ok(Some(data)) => info!(attempt, %data, "query executed"),
            Ok(None) => info!(attempt, "query subscribed"),
            Err(error) => warn!(attempt, error_kind = error.kind(), %error, "query failed"),
        }
    }

    let rendered = serde_json::to_string_pretty(&render_state(&query.state()))?;
    println!("{rendered}");

    dc.main_context().shutdown().await;
    Ok(())
}
