//! `querent`: serve the gateway or ask a single question.

mod config;

use clap::{Parser, Subcommand};
use config::QuerentConfig;
use querent_agent::{AssistantFactory, QueryProcessor, ResponseStrategy, ToolAgentFactory};
use querent_gateway::{GatewayServer, QueryRouter};
use querent_skills::{register_builtins, SkillRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "querent", about = "Querent: ask a tool-using assistant, get a traced answer")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "querent.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Default strategy for /api/query (overrides config)
        #[arg(long)]
        strategy: Option<ResponseStrategy>,
    },
    /// Answer a single query and print the result as JSON
    Ask {
        query: String,
        /// stream or invoke (overrides config)
        #[arg(long)]
        strategy: Option<ResponseStrategy>,
    },
}

fn assistant_factory(config: &QuerentConfig) -> Arc<dyn AssistantFactory> {
    let mut registry = SkillRegistry::new();
    register_builtins(&mut registry);
    info!(count = registry.skill_count(), "Built-in skills registered");
    Arc::new(ToolAgentFactory::new(config.model.clone(), Arc::new(registry)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials usually live in .env
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = QuerentConfig::load(&cli.config).await?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            strategy,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let strategy = strategy.unwrap_or(config.strategy);

            info!(
                static_dir = %config.server.static_dir.display(),
                strategy = %strategy,
                model = %config.model.model_id,
                "Starting Querent gateway on {host}:{port}"
            );

            let router = Arc::new(QueryRouter::new(assistant_factory(&config), strategy));
            let app = GatewayServer::build(router, config.server.static_dir.clone());

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Querent gateway listening on {addr}");
            axum::serve(listener, app).await?;
        }
        Commands::Ask { query, strategy } => {
            let strategy = strategy.unwrap_or(config.strategy);
            let processor = QueryProcessor::new(assistant_factory(&config), strategy);
            let result = processor.process(&query).await;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.is_error() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
