//! Event handling and user interactions for claude-dm-bot.
//!
//! This module provides functionality for handling chat events:
//! - Answering direct messages
//! - Gathering recent workspace history as context for the answer

pub mod direct_message;
pub mod history;
