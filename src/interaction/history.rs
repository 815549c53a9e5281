//! Gathers recent workspace messages as prompt context.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, instrument};

use crate::{
    base::types::{MessageRecord, Res},
    service::chat::ChatClient,
};

/// Pause after each conversation's history fetch to stay under Slack's rate limits.
pub const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(1);

/// Number of recent messages fetched per conversation.
pub const DEFAULT_HISTORY_LIMIT: u16 = 10;

/// Fetches up to `limit` recent messages from every visible conversation.
///
/// Returns one `[<channel>] <user>: <text>` line per text-bearing message, in
/// conversation-then-message order.
pub async fn fetch_recent(chat: &ChatClient, limit: u16) -> Res<Vec<String>> {
    fetch_recent_with_pause(chat, limit, RATE_LIMIT_PAUSE).await
}

/// Same as [`fetch_recent`], with an explicit pause between conversations.
///
/// Conversations are fetched one at a time. Any listing or fetch failure aborts
/// the whole fetch.
#[instrument(skip(chat))]
pub async fn fetch_recent_with_pause(chat: &ChatClient, limit: u16, pause: Duration) -> Res<Vec<String>> {
    let conversations = chat.list_conversations().await.context("Failed to list conversations")?;

    let mut lines = Vec::new();

    for conversation in &conversations {
        let messages = chat
            .fetch_history(&conversation.id, limit)
            .await
            .with_context(|| format!("Failed to fetch history for {}", conversation.label()))?;

        info!("✅ Fetched history for {}", conversation.label());
        tokio::time::sleep(pause).await;

        lines.extend(messages.iter().filter_map(|message| MessageRecord::from_history(conversation, message)).map(|record| record.to_string()));
    }

    Ok(lines)
}
