//! gemchat is a terminal chat client for Google's Gemini models.
//!
//! - [`core`] owns the transcript, the turn lifecycle, the Gemini provider and
//!   the character-by-character reveal.
//! - [`ui`] renders the chat screen and runs the terminal event loop.
//! - [`api`] defines the `generateContent` request and response payloads.
//! - [`utils`] holds clipboard, logging and URL helpers.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`], which reads
//! the configuration and hands off to [`ui::chat_loop::run_chat`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
