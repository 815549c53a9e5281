pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Conversation, HistoryMessage, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows the dispatcher and the history
/// fetcher to run against a mocked platform in tests.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform,
    /// which is used to ignore the bot's own messages.
    fn bot_user_id(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This opens the event connection and dispatches incoming messages until
    /// the process is terminated.
    async fn start(&self) -> Void;

    /// List every conversation visible to the bot.
    ///
    /// Covers public channels, private channels, and direct-message threads.
    async fn list_conversations(&self) -> Res<Vec<Conversation>>;

    /// Fetch up to `limit` of the most recent messages in a conversation.
    ///
    /// Messages come back in the platform's order; they are not re-sorted.
    async fn fetch_history(&self, conversation_id: &str, limit: u16) -> Res<Vec<HistoryMessage>>;

    /// Send a direct message to a user.
    async fn send_direct_message(&self, user_id: &str, text: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
