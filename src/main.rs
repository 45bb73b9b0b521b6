use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use eventdesk::config::Config;
use eventdesk::gateway;
use eventdesk::generate::{self, GenerationRequest};
use eventdesk::report::{self, EventRecord};

/// `EventDesk` — report generation service for academic event approvals.
#[derive(Parser, Debug)]
#[command(name = "eventdesk")]
#[command(version = "0.1.0")]
#[command(about = "Report generation service for academic event approvals.", long_about = None)]
struct Cli {
    /// Path to config.toml (default: ~/.eventdesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate an overview paragraph for an event without going through
    /// the gateway
    Generate {
        #[arg(long)]
        title: String,

        #[arg(long)]
        objective: String,

        #[arg(long)]
        description: String,
    },

    /// Render a stored event record (JSON) to the printable HTML report
    Render {
        /// Path to the event record JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let level = std::env::var("EVENTDESK_LOG")
        .ok()
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let cli = Cli::parse();
    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            gateway::run_gateway(config)
                .await
                .context("gateway terminated")?;
        }
        Commands::Generate {
            title,
            objective,
            description,
        } => {
            let request = GenerationRequest {
                title,
                objective,
                description,
            };
            if let Some(field) = request.missing_field() {
                anyhow::bail!("missing required field: {field}");
            }
            let text = generate::generate_overview(&config.generation, &request).await?;
            println!("{text}");
        }
        Commands::Render { input, output } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("reading event record at {}", input.display()))?;
            let record: EventRecord = serde_json::from_str(&raw)
                .with_context(|| format!("parsing event record at {}", input.display()))?;
            let html = report::render_html(&report::assemble_now(&record))?;
            match output {
                Some(path) => std::fs::write(&path, html)
                    .with_context(|| format!("writing report to {}", path.display()))?,
                None => print!("{html}"),
            }
        }
    }

    Ok(())
}
