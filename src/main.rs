//! Command line front end for the tool runtime.
//!
//! ```bash
//! tool-runtime discover --tools tools.json --snapshot messages.json
//! tool-runtime validate --tools tools.json get_weather '{"city": "Oslo"}'
//! tool-runtime run --tools tools.json --snapshot messages.json --server-url http://localhost:8000 --endpoint agentic_chat
//! tool-runtime schema
//! ```

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tool_runtime::tool::tool_definition_schema;
use tool_runtime::{
    ConfigSource, HandlerConfig, Message, PlaceholderExecutor, Session, ToolCallHandler,
    ToolDiscovery, ToolRegistry,
};

/// Discover, validate and run tool calls
#[derive(Parser, Debug)]
#[command(name = "tool-runtime", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load tools and print what was discovered
    Discover {
        #[command(flatten)]
        sources: ToolSources,
    },
    /// Validate JSON arguments against a tool's schema
    Validate {
        #[command(flatten)]
        sources: ToolSources,
        /// Name of the tool
        tool: String,
        /// Arguments as a JSON object
        args: String,
    },
    /// Process the tool calls in a message snapshot and submit the results
    Run(RunArgs),
    /// Print the JSON Schema of the tool definition format
    Schema,
}

#[derive(Args, Debug)]
struct ToolSources {
    /// JSON array of tool definitions
    #[arg(long)]
    tools: Option<PathBuf>,

    /// JSON array of messages; tools are inferred from their calls
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// JSON object with a `tools` entry
    #[arg(long)]
    tools_config: Option<PathBuf>,

    /// Tool definitions given inline as a JSON array
    #[arg(long)]
    inline: Option<String>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    sources: ToolSources,

    /// Handler configuration file (JSON); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    server_url: Option<String>,

    #[arg(long)]
    endpoint: Option<String>,

    /// Extra request header as NAME=VALUE
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Request timeout, e.g. "30s"
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Merge --tool-args over every call's arguments
    #[arg(long)]
    non_interactive: bool,

    /// JSON object of override arguments
    #[arg(long)]
    tool_args: Option<String>,

    #[arg(long)]
    retry_attempts: Option<u32>,

    /// Pause between submission attempts, e.g. "500ms"
    #[arg(long, value_parser = humantime::parse_duration)]
    retry_delay: Option<Duration>,

    #[arg(long)]
    thread_id: Option<String>,

    #[arg(long)]
    run_id: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Discover { sources } => {
            let (discovery, _) = load_tools(&sources)?;
            let report = serde_json::json!({
                "stats": discovery.stats(),
                "tools": discovery.registry().list_summaries(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Validate {
            sources,
            tool,
            args,
        } => {
            let (discovery, _) = load_tools(&sources)?;
            discovery
                .registry()
                .validate_args(&tool, &args)
                .with_context(|| format!("arguments for '{tool}' are invalid"))?;
            println!("valid");
        }
        Command::Run(args) => run(args).await?,
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&tool_definition_schema())?);
        }
    }

    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    let (discovery, messages) = load_tools(&args.sources)?;
    let Some(messages) = messages else {
        bail!("--snapshot is required to run tool calls");
    };

    let config = handler_config(&args)?;
    let handler = ToolCallHandler::new(
        &config,
        discovery.registry().clone(),
        Arc::new(PlaceholderExecutor),
    )?;

    let mut session = Session::default();
    if let Some(thread_id) = args.thread_id {
        session.thread_id = thread_id;
    }
    if let Some(run_id) = args.run_id {
        session.run_id = run_id;
    }
    session.messages = messages;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling remaining tool calls");
            on_interrupt.cancel();
        }
    });

    info!(url = %config.endpoint_url(), thread_id = %session.thread_id, "Processing tool calls");
    let results = handler.process_session(&mut session, &cancel).await;
    println!("{}", serde_json::to_string_pretty(&results)?);

    if results.iter().any(|r| r.is_error()) {
        bail!("one or more tool calls failed");
    }
    Ok(())
}

fn handler_config(args: &RunArgs) -> Result<HandlerConfig> {
    let mut config = match &args.config {
        Some(path) => HandlerConfig::from_json_file(path)?,
        None => HandlerConfig::new(),
    };

    if let Some(server_url) = &args.server_url {
        config = config.with_server_url(server_url);
    }
    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(endpoint);
    }
    for (name, value) in &args.headers {
        config = config.with_header(name, value);
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }
    if args.non_interactive {
        config = config.with_interactive(false);
    }
    if let Some(tool_args) = &args.tool_args {
        config = config.with_tool_args(tool_args);
    }
    if let Some(attempts) = args.retry_attempts {
        config = config.with_retry_attempts(attempts);
    }
    if let Some(delay) = args.retry_delay {
        config = config.with_retry_delay(delay);
    }

    config.validate()?;
    Ok(config)
}

/// Populates a fresh registry from every given source. Returns the parsed
/// snapshot messages when a snapshot was given.
fn load_tools(sources: &ToolSources) -> Result<(ToolDiscovery, Option<Vec<Message>>)> {
    let discovery = ToolDiscovery::new(Arc::new(ToolRegistry::new()));

    if let Some(path) = &sources.tools {
        discovery.discover_from_tool_definitions(&read(path)?)?;
    }
    if let Some(path) = &sources.tools_config {
        let config: Map<String, Value> = serde_json::from_slice(&read(path)?)
            .with_context(|| format!("{} is not a JSON object", path.display()))?;
        discovery.discover_from_config(ConfigSource::ConfigMap(config))?;
    }
    if let Some(raw) = &sources.inline {
        discovery.discover_from_cli(raw)?;
    }

    let messages = match &sources.snapshot {
        Some(path) => {
            let messages: Vec<Message> = serde_json::from_slice(&read(path)?)
                .with_context(|| format!("{} is not a message array", path.display()))?;
            discovery.discover_from_messages(&messages);
            Some(messages)
        }
        None => None,
    };

    Ok((discovery, messages))
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
