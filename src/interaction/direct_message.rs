//! Answers direct messages sent to the bot.
//!
//! Each qualifying message runs the pipeline: fetch recent history, build the
//! prompt, request a completion, and reply to the sender. Any failure along the
//! way is logged and answered with a fixed apology instead.

use tracing::{Instrument, error, info, instrument};

use crate::{
    base::{
        prompts::{FAILURE_APOLOGY, build_prompt},
        types::{DirectMessage, InboundMessage, Res, Void},
    },
    interaction::history::{self, DEFAULT_HISTORY_LIMIT},
    service::{chat::ChatClient, llm::LlmClient},
};

/// Handles an inbound message event on its own task.
#[instrument(skip_all)]
pub fn handle_direct_message(message: InboundMessage, bot_user_id: String, chat: ChatClient, llm: LlmClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = handle_direct_message_internal(message, &bot_user_id, &chat, &llm).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {:#}", err);
        }
    });
}

/// Handles an inbound message event to completion.
///
/// Non-DM events, empty messages, and the bot's own messages are ignored without
/// any outbound call. The returned error is only ever a failure to deliver the reply.
#[instrument(skip_all)]
pub async fn handle_direct_message_internal(message: InboundMessage, bot_user_id: &str, chat: &ChatClient, llm: &LlmClient) -> Void {
    let Some(dm) = message.as_direct_message(bot_user_id) else {
        return Ok(());
    };

    info!("[📩] DM from {}: {}", dm.user_id, dm.text);

    let reply = match answer(&dm, chat, llm).await {
        Ok(reply) => reply,
        Err(err) => {
            error!("Error: {:?}", err);
            FAILURE_APOLOGY.to_string()
        }
    };

    chat.send_direct_message(&dm.user_id, &reply).await
}

/// Runs the fetch → build → complete pipeline for one direct message.
async fn answer(dm: &DirectMessage, chat: &ChatClient, llm: &LlmClient) -> Res<String> {
    let history = history::fetch_recent(chat, DEFAULT_HISTORY_LIMIT).await?;
    let prompt = build_prompt(&history, &dm.text);

    llm.complete(&prompt).await
}
