//! sealradio - back end for the seal radio site
//!
//! Serves the chat proxy and model catalog endpoints in front of the
//! generative-language API.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sealradio::config::{Config, KeySource};
use sealradio::proxy::run_server;
use sealradio::upstream::UpstreamClient;

#[derive(Parser)]
#[command(name = "sealradio")]
#[command(about = "Chat proxy and model catalog for the seal radio site")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults plus GEMINI_API_KEY when omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration
    Check {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Fetch and print the model list the server would return
    Models {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn init_tracing(level: &str) {
    let default_filter = format!("sealradio={},tower_http=info", level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            let (mut config, key_source) = Config::load(config.as_deref())?;
            init_tracing(&config.logging.level);

            tracing::info!(key_source = %key_source, "Loaded configuration");
            if key_source == KeySource::None {
                tracing::warn!("No upstream API key configured - set GEMINI_API_KEY");
            }
            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                config.server.listen = addr;
            }

            run_server(config).await
        }

        Commands::Check { config } => {
            init_tracing("info");
            let (config, key_source) = Config::load(config.as_deref())?;

            println!("Configuration OK");
            println!("  listen:        {}", config.server.listen);
            println!("  upstream:      {}", config.upstream.base_url);
            println!("  timeout:       {}s", config.upstream.timeout_secs);
            println!("  api key:       {}", key_source);
            if key_source == KeySource::None {
                println!("  warning: no API key, upstream calls will fail");
            }
            Ok(())
        }

        Commands::Models { config } => {
            init_tracing("warn");
            let (config, _) = Config::load(config.as_deref())?;
            let client = UpstreamClient::new(&config.upstream)?;

            let models = client.list_models().await?;
            for model in &models {
                println!("{:<40} {}", model.id, model.name);
            }
            println!("{} models", models.len());
            Ok(())
        }
    }
}
