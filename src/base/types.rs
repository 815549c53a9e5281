use std::fmt;

use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Label used for conversations that carry no display name (direct messages).
pub const UNNAMED_CONVERSATION_LABEL: &str = "DM";

/// Sender label used when a history message has no sender id.
pub const UNKNOWN_SENDER: &str = "unknown";

/// Kind of a conversation visible to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationKind {
    Public,
    Private,
    DirectMessage,
}

/// A channel-like container of messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub name: Option<String>,
    pub kind: ConversationKind,
}

impl Conversation {
    /// The display label used when formatting history lines.
    ///
    /// Falls back to `"DM"` when the conversation has no (or an empty) name.
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => UNNAMED_CONVERSATION_LABEL,
        }
    }
}

/// A single message as returned by a conversation history fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub user: Option<String>,
    pub text: Option<String>,
}

/// A history message that carries text, bound to its conversation's label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub channel_label: String,
    pub user_id: String,
    pub text: String,
}

impl MessageRecord {
    /// Builds a record from a fetched message, or `None` if the message has no text.
    pub fn from_history(conversation: &Conversation, message: &HistoryMessage) -> Option<Self> {
        let text = message.text.as_deref().filter(|t| !t.is_empty())?;

        Some(Self {
            channel_label: conversation.label().to_string(),
            user_id: message.user.clone().unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
            text: text.to_string(),
        })
    }
}

impl fmt::Display for MessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.channel_label, self.user_id, self.text)
    }
}

/// Platform-neutral view of an inbound "new message" event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Sender user id.
    pub user_id: Option<String>,
    /// Channel the event arrived on.
    pub channel_id: Option<String>,
    /// Channel type (`"im"` for direct messages).
    pub channel_type: Option<String>,
    /// Message text.
    pub text: Option<String>,
}

/// A validated direct message the bot should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMessage {
    pub user_id: String,
    pub text: String,
}

impl InboundMessage {
    /// Returns the direct message to answer, or `None` if the event should be ignored.
    ///
    /// Only `im` events with non-empty text from someone other than the bot qualify.
    pub fn as_direct_message(&self, bot_user_id: &str) -> Option<DirectMessage> {
        if self.channel_type.as_deref() != Some("im") {
            return None;
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty())?;
        let user_id = self.user_id.as_deref().filter(|u| !u.is_empty())?;

        if user_id == bot_user_id {
            return None;
        }

        Some(DirectMessage {
            user_id: user_id.to_string(),
            text: text.to_string(),
        })
    }
}

/// A typed unit of a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(name: Option<&str>) -> Conversation {
        Conversation {
            id: "C1".to_string(),
            name: name.map(str::to_string),
            kind: ConversationKind::Public,
        }
    }

    fn im(user: Option<&str>, text: Option<&str>) -> InboundMessage {
        InboundMessage {
            user_id: user.map(str::to_string),
            channel_id: Some("D1".to_string()),
            channel_type: Some("im".to_string()),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_record_formats_with_channel_name() {
        let message = HistoryMessage {
            user: Some("U1".to_string()),
            text: Some("launch is Friday".to_string()),
        };

        let record = MessageRecord::from_history(&conversation(Some("general")), &message).unwrap();

        assert_eq!(record.to_string(), "[general] U1: launch is Friday");
    }

    #[test]
    fn test_unnamed_conversation_is_labeled_dm() {
        let message = HistoryMessage {
            user: Some("U2".to_string()),
            text: Some("hi".to_string()),
        };

        assert_eq!(MessageRecord::from_history(&conversation(None), &message).unwrap().to_string(), "[DM] U2: hi");
        assert_eq!(MessageRecord::from_history(&conversation(Some("")), &message).unwrap().to_string(), "[DM] U2: hi");
    }

    #[test]
    fn test_record_skips_messages_without_text() {
        let empty = HistoryMessage {
            user: Some("U1".to_string()),
            text: Some(String::new()),
        };
        let missing = HistoryMessage { user: Some("U1".to_string()), text: None };

        assert!(MessageRecord::from_history(&conversation(Some("general")), &empty).is_none());
        assert!(MessageRecord::from_history(&conversation(Some("general")), &missing).is_none());
    }

    #[test]
    fn test_record_without_sender() {
        let message = HistoryMessage { user: None, text: Some("joined".to_string()) };

        assert_eq!(MessageRecord::from_history(&conversation(Some("random")), &message).unwrap().to_string(), "[random] unknown: joined");
    }

    #[test]
    fn test_direct_message_guard() {
        let dm = im(Some("U1"), Some("hello")).as_direct_message("UBOT").unwrap();
        assert_eq!(dm.user_id, "U1");
        assert_eq!(dm.text, "hello");

        // Wrong channel type.
        let mut channel = im(Some("U1"), Some("hello"));
        channel.channel_type = Some("channel".to_string());
        assert!(channel.as_direct_message("UBOT").is_none());

        let mut untyped = im(Some("U1"), Some("hello"));
        untyped.channel_type = None;
        assert!(untyped.as_direct_message("UBOT").is_none());

        // Missing or empty text.
        assert!(im(Some("U1"), None).as_direct_message("UBOT").is_none());
        assert!(im(Some("U1"), Some("")).as_direct_message("UBOT").is_none());

        // Own messages and missing senders.
        assert!(im(Some("UBOT"), Some("Friday.")).as_direct_message("UBOT").is_none());
        assert!(im(None, Some("hello")).as_direct_message("UBOT").is_none());
    }

    #[test]
    fn test_content_block_ignores_extra_fields() {
        let block: ContentBlock = serde_json::from_value(serde_json::json!({
            "type": "tool_use",
            "id": "toolu_1",
            "name": "search",
            "input": {}
        }))
        .unwrap();

        assert_eq!(block.block_type, "tool_use");
        assert!(block.text.is_none());
    }
}
