mod auth;
mod config;
mod error;
mod oneshot;
mod placeholders;
mod replacements;
mod requests;
mod server;
mod service;
mod slides;

use crate::auth::TokenSource;
use crate::config::{Config, load_config};
use crate::service::SlideSync;
use crate::slides::SlidesClient;
use clap::{Parser, Subcommand};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "slidesync",
    about = "Sync weekly lyrics and offering figures into a slide template"
)]
struct Cli {
    /// Config file (default: <config dir>/slidesync.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve,
    /// Fill placeholders from a JSON payload file ("-" for stdin)
    Update { file: PathBuf },
    /// Restore template placeholders
    Reset,
    /// Print the replacement map for a payload without touching the deck
    Preview { file: PathBuf },
    /// List every placeholder key the template may use
    Keys,
}

fn build_sync(config: &Config) -> SlideSync {
    let http = reqwest::Client::new();
    let tokens = TokenSource::new(config.credentials.clone(), http.clone());
    let client = SlidesClient::new(&config.slides_endpoint, http, tokens);
    SlideSync::new(Arc::new(client), config.presentation_id.clone())
}

fn require_config(path: Option<&Path>) -> Config {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve => {
            let config = require_config(config_path);
            let sync = Arc::new(build_sync(&config));
            debug!("serving presentation {}", config.presentation_id);

            if let Err(e) = server::run_server(sync, config.bind, config.frontend_origin).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Update { file } => {
            let sync = build_sync(&require_config(config_path));
            match oneshot::run_update(&sync, &file).await {
                Ok(outcome) => println!("{}", outcome.message),
                Err(e) => {
                    eprintln!("Failed to update slides: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Reset => {
            let sync = build_sync(&require_config(config_path));
            match sync.reset().await {
                Ok(outcome) => println!("{}", outcome.message),
                Err(e) => {
                    eprintln!("Failed to reset template: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Preview { file } => {
            let rendered = oneshot::read_payload(&file)
                .await
                .and_then(|data| oneshot::preview(&data));
            match rendered {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Keys => println!("{}", oneshot::list_keys()),
    }
}
