//! Slack implementation of the chat service.
//!
//! This module connects to Slack over Socket Mode and provides:
//! - Receiving direct-message events and handing them to the dispatcher
//! - Listing conversations and fetching their recent history
//! - Sending direct messages

use crate::{
    base::{
        config::Config,
        types::{Conversation, ConversationKind, HistoryMessage, InboundMessage, Res, Void},
    },
    interaction,
    service::llm::LlmClient,
};
use anyhow::Context;
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config, llm: LlmClient) -> Res<Self> {
        let client = SlackChatClient::new(config, llm).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    llm: LlmClient,
    chat: ChatClient,
    bot_user_id: String,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub llm: LlmClient,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, llm: LlmClient) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await.context("Slack auth.test failed")?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            llm,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            llm: self.llm.clone(),
            chat: ChatClient::from(self.clone()),
            bot_user_id: self.bot_user_id.clone(),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register the app token to listen for events.
        socket_mode_listener.listen_for(&self.app_token).await?;

        info!("⚡️ Slack Claude bot is running!");

        // Serve until Ctrl-C; reconnects are handled by the listener.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_conversations(&self) -> Res<Vec<Conversation>> {
        let request = SlackApiConversationsListRequest::new().with_types(vec![SlackConversationType::Public, SlackConversationType::Private, SlackConversationType::Im]);

        let session = self.client.open_session(&self.bot_token);

        let response = session.conversations_list(&request).await.map_err(|e| anyhow::anyhow!("Failed to list conversations: {}", e))?;

        Ok(response.channels.iter().map(conversation_from_channel_info).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self, conversation_id: &str, limit: u16) -> Res<Vec<HistoryMessage>> {
        let request = SlackApiConversationsHistoryRequest::new().with_channel(SlackChannelId(conversation_id.to_string())).with_limit(limit);

        let session = self.client.open_session(&self.bot_token);

        let response = session
            .conversations_history(&request)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch history for {}: {}", conversation_id, e))?;

        Ok(response.messages.iter().map(history_message_from_slack).collect())
    }

    #[instrument(skip(self, text))]
    async fn send_direct_message(&self, user_id: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        // Posting to a user ID delivers into the bot's DM with that user.
        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(user_id.to_string()), message);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Conversions from Slack types.

/// Maps a listed Slack channel onto a [`Conversation`].
fn conversation_from_channel_info(info: &SlackChannelInfo) -> Conversation {
    let kind = if info.flags.is_im.unwrap_or(false) {
        ConversationKind::DirectMessage
    } else if info.flags.is_private.unwrap_or(false) {
        ConversationKind::Private
    } else {
        ConversationKind::Public
    };

    Conversation {
        id: info.id.0.clone(),
        name: info.name.clone(),
        kind,
    }
}

/// Maps a Slack history message onto a [`HistoryMessage`].
fn history_message_from_slack(message: &SlackHistoryMessage) -> HistoryMessage {
    let user = message
        .sender
        .user
        .as_ref()
        .map(|u| u.0.clone())
        .or_else(|| message.sender.bot_id.as_ref().map(|b| b.0.clone()));

    HistoryMessage {
        user,
        text: message.content.text.clone(),
    }
}

/// Maps a Slack message event onto an [`InboundMessage`].
fn inbound_from_message_event(event: &SlackMessageEvent) -> InboundMessage {
    InboundMessage {
        user_id: event.sender.user.as_ref().map(|u| u.0.clone()),
        channel_id: event.origin.channel.as_ref().map(|c| c.0.clone()),
        channel_type: event.origin.channel_type.as_ref().map(|t| t.0.clone()),
        text: event.content.as_ref().and_then(|c| c.text.clone()),
    }
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are currently supported.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            debug!("Received message event ...");

            let message = inbound_from_message_event(&slack_message_event);

            interaction::direct_message::handle_direct_message(message, user_state.bot_user_id.clone(), user_state.chat.clone(), user_state.llm.clone());
        }
        _ => {
            debug!("Received unhandled push event.")
        }
    }

    Ok(())
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn channel_info(value: serde_json::Value) -> SlackChannelInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_public_channel_conversion() {
        let info = channel_info(json!({
            "id": "C1",
            "name": "general",
            "created": 1700000000,
            "is_channel": true,
            "is_private": false
        }));

        assert_eq!(
            conversation_from_channel_info(&info),
            Conversation {
                id: "C1".to_string(),
                name: Some("general".to_string()),
                kind: ConversationKind::Public,
            }
        );
    }

    #[test]
    fn test_private_and_im_conversion() {
        let private = channel_info(json!({
            "id": "G1",
            "name": "secret",
            "created": 1700000000,
            "is_group": true,
            "is_private": true
        }));
        let im = channel_info(json!({
            "id": "D1",
            "created": 1700000000,
            "is_im": true,
            "user": "U1"
        }));

        assert_eq!(conversation_from_channel_info(&private).kind, ConversationKind::Private);

        let im = conversation_from_channel_info(&im);
        assert_eq!(im.kind, ConversationKind::DirectMessage);
        assert_eq!(im.name, None);
        assert_eq!(im.label(), "DM");
    }

    #[test]
    fn test_history_message_conversion() {
        let from_user: SlackHistoryMessage = serde_json::from_value(json!({
            "type": "message",
            "ts": "1700000000.000100",
            "user": "U1",
            "text": "launch is Friday"
        }))
        .unwrap();
        let from_bot: SlackHistoryMessage = serde_json::from_value(json!({
            "type": "message",
            "subtype": "bot_message",
            "ts": "1700000000.000200",
            "bot_id": "B1",
            "text": "deploy finished"
        }))
        .unwrap();

        assert_eq!(
            history_message_from_slack(&from_user),
            HistoryMessage {
                user: Some("U1".to_string()),
                text: Some("launch is Friday".to_string()),
            }
        );
        assert_eq!(history_message_from_slack(&from_bot).user.as_deref(), Some("B1"));
    }

    #[test]
    fn test_message_event_conversion() {
        let event: SlackMessageEvent = serde_json::from_value(json!({
            "type": "message",
            "ts": "1700000000.000300",
            "channel": "D1",
            "channel_type": "im",
            "user": "U1",
            "text": "What did Alice say about the launch?"
        }))
        .unwrap();

        let message = inbound_from_message_event(&event);

        assert_eq!(message.user_id.as_deref(), Some("U1"));
        assert_eq!(message.channel_id.as_deref(), Some("D1"));
        assert_eq!(message.channel_type.as_deref(), Some("im"));
        assert_eq!(message.text.as_deref(), Some("What did Alice say about the launch?"));
        assert!(message.as_direct_message("UBOT").is_some());
    }
}
