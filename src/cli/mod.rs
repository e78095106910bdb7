//! Command-line parsing and startup.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::core::config::{Config, ConfigOverrides};
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "gemchat", version)]
#[command(about = "A terminal chat client for Google's Gemini models")]
#[command(
    long_about = "gemchat is a full-screen terminal chat interface for the Gemini API. \
Each prompt is answered in one request and the reply is revealed a character at a time.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (GOOGLE_API_KEY is accepted as a fallback)\n\
  GEMINI_BASE_URL   Custom API base URL (optional, defaults to \
https://generativelanguage.googleapis.com/v1beta)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter/Ctrl+J  Insert a new line (also Shift+Enter on kitty-protocol terminals)\n\
  Ctrl+N            Start a new chat\n\
  Ctrl+T            Toggle light/dark theme\n\
  Alt+Up/Alt+Down   Pick an older/newer reply (Esc drops it)\n\
  Ctrl+Y            Copy the picked reply, or the latest one\n\
  PgUp/PgDn/Mouse   Scroll through the conversation\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    /// Gemini model to chat with
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Delay between revealed characters, in milliseconds
    #[arg(long, value_name = "MS")]
    pub reveal_delay_ms: Option<u64>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            reveal_delay_ms: self.reveal_delay_ms,
            log_file: self.log.clone(),
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    // Fail on configuration before touching the terminal.
    let config = Config::from_env(args.overrides())?;
    init_logging(config.log_file.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), "gemchat starting");

    tokio::runtime::Runtime::new()?.block_on(run_chat(config))
}
