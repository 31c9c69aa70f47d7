use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "panel-cli")]
#[command(about = "Management CLI for the slot panel", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current slot configuration
    State,
    /// Render the artifacts for the current configuration without writing them
    Preview,
    /// Show the database assigned to a slot
    Database {
        /// Slot name (db1..db6)
        slot: String,
    },
    /// Replace the whole configuration with the slots in a JSON file
    Apply {
        /// JSON object mapping every slot name to a triple or null
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::State => client.get(format!("{}/api/state", base)).send().await?,
        Commands::Preview => client.get(format!("{}/api/preview", base)).send().await?,
        Commands::Database { slot } => {
            client
                .get(format!("{}/api/slots/{}/database", base, slot))
                .send()
                .await?
        }
        Commands::Apply { file } => {
            let desired: Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            client
                .put(format!("{}/api/state", base))
                .json(&desired)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: panel returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
