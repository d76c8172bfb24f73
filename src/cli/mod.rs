//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::{GenerationService, HttpGenerationClient};
use crate::cli::say::run_say;
use crate::core::config::{Config, ConfigKey};
use crate::core::controller::SessionController;
use crate::core::dispatch::{Dispatcher, SubmitOutcome};
use crate::ui::chat_loop::run_chat;
use crate::ui::surface::ChatView;
use crate::ui::theme::Theme;
use crate::utils::logging::{init_file_logging, init_stderr_logging};

#[derive(Parser)]
#[command(name = "chatterbox", version)]
#[command(about = "A terminal chat client for remote text and image generation")]
#[command(
    long_about = "Chatterbox is a full-screen terminal chat client backed by remote text and \
image generation endpoints. Each chat keeps its own history, and any number of chats can be \
open at once.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Ctrl+N            Start a new chat\n\
  Tab               Show or hide the chat list\n\
  Alt+1..9          Switch to chat n\n\
  PgUp/PgDn         Scroll the conversation\n\
  Ctrl+C / Esc      Quit the application\n\n\
Commands:\n\
  /image <prompt>   Generate an image\n\
  /help             Show commands and keys\n\n\
Environment Variables:\n\
  CHATTERBOX_LOG    Log filter directives (e.g. debug, chatterbox=trace)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Text generation endpoint (overrides the configured value)
    #[arg(long, global = true, value_name = "URL")]
    pub text_endpoint: Option<String>,

    /// Image generation endpoint (overrides the configured value)
    #[arg(long, global = true, value_name = "URL")]
    pub image_endpoint: Option<String>,

    /// Write diagnostics for the chat interface to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message without the chat interface and print the reply
    Say {
        /// Print the whole conversation as JSON
        #[arg(long)]
        json: bool,
        /// Message to send; "/image <prompt>" generates an image
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (text-endpoint or image-endpoint)
        key: String,
        /// Value to set for the key
        value: String,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key (text-endpoint or image-endpoint)
        key: String,
    },
    /// Print the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

fn parse_key(key: &str) -> ConfigKey {
    match ConfigKey::parse(key) {
        Some(key) => key,
        None => {
            eprintln!("❌ Unknown config key: {key}");
            eprintln!(
                "Known keys: {}",
                ConfigKey::ALL.map(ConfigKey::as_str).join(", ")
            );
            std::process::exit(1);
        }
    }
}

fn build_service(args: &Args, config: &Config) -> Arc<dyn GenerationService> {
    let endpoints = config.endpoints(
        args.text_endpoint.as_deref(),
        args.image_endpoint.as_deref(),
    );
    let client = HttpGenerationClient::new(reqwest::Client::new(), endpoints);
    let endpoints = client.endpoints();
    info!(text = %endpoints.text, image = %endpoints.image, "using generation endpoints");
    Arc::new(client)
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let command = args.command.clone().unwrap_or(Commands::Chat);

    match command {
        Commands::Chat => {
            if let Some(path) = args.log_file.as_deref() {
                init_file_logging(path)?;
            }
            let config = Config::load()?;
            let service = build_service(&args, &config);
            let controller = SessionController::new(ChatView::new()).into_shared();
            run_chat(Dispatcher::new(controller, service), Theme::dark_default()).await
        }
        Commands::Say { json, prompt } => {
            init_stderr_logging();
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                eprintln!("Usage: chatterbox say <prompt>");
                std::process::exit(1);
            }
            let config = Config::load()?;
            let service = build_service(&args, &config);
            let (outcome, output) = run_say(service, &prompt, json).await?;
            println!("{output}");
            if outcome == SubmitOutcome::Failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            let key = parse_key(&key);
            let mut config = Config::load()?;
            if let Err(err) = config.set(key, &value) {
                eprintln!("❌ {err}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {}", config.get(key).unwrap_or_default());
            Ok(())
        }
        Commands::Unset { key } => {
            let key = parse_key(&key);
            let mut config = Config::load()?;
            config.unset(key);
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Config => {
            let config = Config::load()?;
            config.print_all();
            Ok(())
        }
    }
}
