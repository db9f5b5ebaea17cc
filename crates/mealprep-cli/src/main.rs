mod config;
mod plan_cmds;
mod serve_cmd;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use mealprep_core::access::AccessGate;
use mealprep_core::gateway::AnthropicGateway;
use mealprep_core::orchestrator::PlanOrchestrator;

use config::{ConfigFile, GatewayConfig, ServerConfig};
use plan_cmds::OutputFormat;

#[derive(Parser)]
#[command(
    name = "mealprep",
    about = "Batch-cooking meal plans and grocery lists from a hosted LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a mealprep config file
    Init {
        /// Anthropic API key to store in the config file
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides MEALPREP_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides MEALPREP_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate a fresh meal plan
    Generate {
        /// Extra instructions for the model (e.g. "no cilantro, more fish")
        #[arg(long)]
        guidance: Option<String>,
        /// Output file or directory (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Regenerate one recipe of a saved plan and refresh its grocery list
    Regenerate {
        /// Path to a plan JSON file
        #[arg(long)]
        plan: PathBuf,
        /// Recipe ID to regenerate (e.g. dinner-2)
        #[arg(long)]
        recipe_id: String,
        /// What to change about the recipe
        #[arg(long)]
        feedback: String,
        /// Output file or directory (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the built-in sample plan
    Sample {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

/// Execute the `mealprep init` command: write config file.
fn cmd_init(api_key: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut cfg = ConfigFile::default();
    cfg.gateway.api_key = api_key.map(str::to_string);
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match api_key {
        Some(key) => println!("  gateway.api_key = {}", mask(key)),
        None => println!("  gateway.api_key is unset; ANTHROPIC_API_KEY will be used"),
    }
    println!();
    println!("Next: run `mealprep serve` or `mealprep generate`.");

    Ok(())
}

/// Show only the first and last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Build an orchestrator backed by the Anthropic gateway.
fn build_orchestrator(file: Option<&ConfigFile>) -> anyhow::Result<PlanOrchestrator> {
    let resolved = GatewayConfig::resolve(file)?;
    tracing::debug!(config = ?resolved, "gateway configuration resolved");
    let gateway = AnthropicGateway::new(resolved.anthropic())
        .context("failed to build model gateway client")?;
    Ok(PlanOrchestrator::new(
        Arc::new(gateway),
        resolved.orchestrator_settings(),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { api_key, force } => {
            cmd_init(api_key.as_deref(), force)?;
        }
        Commands::Serve { bind, port } => {
            let file = config::load_config()?;
            let server = ServerConfig::resolve(bind.as_deref(), port, file.as_ref())?;
            let orchestrator = build_orchestrator(file.as_ref())?;
            let gate = AccessGate::new(server.access_password.as_deref());
            let state = serve_cmd::AppState::new(orchestrator, gate);
            serve_cmd::run_serve(state, &server.bind, server.port).await?;
        }
        Commands::Generate {
            guidance,
            output,
            format,
        } => {
            let file = config::load_config()?;
            let orchestrator = build_orchestrator(file.as_ref())?;
            plan_cmds::run_generate(
                &orchestrator,
                guidance.as_deref(),
                output.as_deref(),
                format,
            )
            .await?;
        }
        Commands::Regenerate {
            plan,
            recipe_id,
            feedback,
            output,
            format,
        } => {
            let file = config::load_config()?;
            let orchestrator = build_orchestrator(file.as_ref())?;
            plan_cmds::run_regenerate(
                &orchestrator,
                &plan,
                &recipe_id,
                &feedback,
                output.as_deref(),
                format,
            )
            .await?;
        }
        Commands::Sample { format } => {
            plan_cmds::run_sample(format)?;
        }
    }

    Ok(())
}
