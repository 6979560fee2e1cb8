//! solgen CLI - prompt-to-deployed smart contract pipeline
//!
//! Usage:
//!   solgen generate -p "<prompt>"    Generate, verify, and deploy a contract
//!   solgen serve                     Run the HTTP service with a managed chain

use anyhow::Result;
use clap::{Parser, Subcommand};
use solgen_core::SolgenConfig;
use solgen_orchestrator::standard_loop;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_SERVICE_PORT: u16 = 5000;

#[derive(Parser)]
#[command(name = "solgen")]
#[command(author, version, about = "Generate, verify, and deploy smart contracts from a prompt")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a contract, verify it, and deploy it to the configured chain
    Generate {
        /// The prompt describing the contract to generate
        #[arg(short, long)]
        prompt: String,

        /// Maximum generation attempts (overrides configuration)
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// Run the HTTP service, spawning and owning a development chain
    Serve {
        /// Port to listen on
        #[arg(short = 'P', long, default_value_t = DEFAULT_SERVICE_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = SolgenConfig::load_or_default(Path::new("."))?;

    match cli.command {
        Commands::Generate {
            prompt,
            max_retries,
        } => {
            if let Some(max_retries) = max_retries {
                config.max_retries = max_retries;
            }
            generate(&config, &prompt).await
        }
        Commands::Serve { port } => {
            solgen_service::serve(config, port).await?;
            Ok(())
        }
    }
}

async fn generate(config: &SolgenConfig, prompt: &str) -> Result<()> {
    let pipeline = standard_loop(config)?;
    let result = pipeline.run(prompt).await;

    if result.succeeded {
        if let Some(code) = &result.final_code {
            println!("{}", code);
        }
        if let Some(deploy) = &result.feedback.deploy_results {
            if let Some(address) = &deploy.contract_address {
                eprintln!("deployed at {} after {} attempt(s)", address, result.attempts);
            }
        }
        return Ok(());
    }

    eprintln!(
        "no passing contract after {} attempt(s); last failing stage: {}",
        result.attempts,
        result
            .last_error_stage
            .map(|stage| stage.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    eprintln!("{}", serde_json::to_string_pretty(&result.feedback)?);
    std::process::exit(1);
}
