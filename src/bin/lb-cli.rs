use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use rr_balancer::config::{save_config, BalancerConfig};

#[derive(Parser)]
#[command(name = "lb-cli")]
#[command(about = "Operator CLI for the round-robin load balancer", long_about = None)]
struct Cli {
    /// Base URL of a running balancer.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show backend liveness
    Health,
    /// Show dispatch counters
    Metrics,
    /// Write a configuration file populated with defaults
    InitConfig {
        #[arg(short, long, default_value = "config.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Metrics => {
            let res = client.get(format!("{}/metrics", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::InitConfig { path } => {
            if path.exists() {
                eprintln!("Error: {} already exists", path.display());
                std::process::exit(1);
            }
            save_config(&path, &BalancerConfig::default())?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: balancer returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
