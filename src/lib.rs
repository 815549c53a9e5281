//! Library root for `claude-dm-bot`.
//!
//! Claude-dm-bot is a Claude-powered assistant for Slack direct messages. When a
//! user DMs the bot, it:
//! - Gathers the most recent messages from every conversation it can see
//! - Wraps them, together with the question, into a single prompt
//! - Asks Claude for an answer and replies to the user in the DM
//!
//! The bot integrates with Slack (Socket Mode) for chat and the Anthropic
//! Messages API for responses. Both sit behind traits so they can be swapped
//! for mocks in tests.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use anyhow::anyhow;
use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the claude-dm-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the LLM and chat clients
/// - Starts the Socket Mode listener for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting claude-dm-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install the rustls crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
