use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use mcpjam_core::CommandQueue;
use mcpjam_core::config::Config;
use mcpjam_gateway::{GatewayState, McpServer};

mod logging;

#[derive(Parser)]
#[command(
    name = "mcpjam",
    about = "Command queue between MCP/HTTP callers and the FigJam canvas plugin",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP endpoints the plugin polls (default port: 8787)
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Serve MCP tools over stdin/stdout (JSON-RPC), plus the HTTP pull endpoint
    Stdio {
        /// Host to bind the HTTP endpoints to
        #[arg(long)]
        host: Option<String>,

        /// Port for the HTTP endpoints
        #[arg(long)]
        port: Option<u16>,
    },

    /// Drain a running server's queue once and print the commands
    Pull {
        /// Base URL of the running server
        #[arg(long, default_value = "http://localhost:8787")]
        url: String,

        /// Maximum number of commands to fetch
        #[arg(long)]
        batch: Option<i64>,
    },

    /// Show resolved settings
    Status,

    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a specific config value by dotted path
    Get { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load(&config_path)?;

    let stdio_mode = matches!(cli.command, Commands::Stdio { .. });
    logging::init(&logging::LogSettings::resolve(
        &config.logging(),
        cli.verbose,
        stdio_mode,
    ))?;

    let (warnings, errors) = config.validate();
    for w in &warnings {
        tracing::warn!("Config: {w}");
    }
    if !errors.is_empty() {
        for e in &errors {
            tracing::error!("Config: {e}");
        }
        anyhow::bail!("Invalid config at {}", config_path.display());
    }

    let config = Arc::new(config);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.host());
            let port = port.unwrap_or_else(|| config.port());

            let queue = Arc::new(CommandQueue::new());
            let state = gateway_state(config.clone(), queue)?;

            tracing::info!("Starting MCPJam HTTP server on {host}:{port}");
            mcpjam_gateway::start_gateway(Arc::new(state), &host, port).await?;
        }
        Commands::Stdio { host, port } => {
            let host = host.unwrap_or_else(|| config.host());
            let port = port.unwrap_or_else(|| config.port());

            // RPC tools enqueue, the plugin drains the same queue over HTTP.
            let queue = Arc::new(CommandQueue::new());
            let state = gateway_state(config.clone(), queue.clone())?;

            tracing::info!("Starting MCPJam HTTP server on {host}:{port} for stdio mode");
            tokio::spawn(async move {
                if let Err(e) = mcpjam_gateway::start_gateway(Arc::new(state), &host, port).await {
                    tracing::error!("HTTP server stopped: {e:#}");
                }
            });

            let server = McpServer::with_builtin_tools(queue);
            mcpjam_gateway::run_stdio_server(&server).await?;
        }
        Commands::Pull { url, batch } => {
            let mut endpoint = format!("{}/pull", url.trim_end_matches('/'));
            if let Some(batch) = batch {
                endpoint.push_str(&format!("?batch={batch}"));
            }

            let resp = reqwest::get(&endpoint).await?.error_for_status()?;
            let commands: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&commands)?);
        }
        Commands::Status => {
            println!("MCPJam v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!("HTTP address: {}:{}", config.host(), config.port());
            println!("Default pull batch: {}", config.default_batch());
            println!("CORS origins: {}", config.cors_origins().join(", "));
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&*config)?;
                println!("{json}");
            }
            ConfigAction::Get { key } => match config.get_path(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => anyhow::bail!("No config value at '{key}'"),
            },
        },
    }

    Ok(())
}

/// Gateway state over `queue`, with the Prometheus recorder when enabled.
fn gateway_state(config: Arc<Config>, queue: Arc<CommandQueue>) -> anyhow::Result<GatewayState> {
    #[allow(unused_mut)]
    let mut state = GatewayState::new(config, queue);

    #[cfg(feature = "metrics")]
    {
        let handle = mcpjam_gateway::metrics::install_prometheus_recorder()?;
        state = state.with_metrics(handle);
    }

    Ok(state)
}
