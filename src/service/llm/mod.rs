pub mod anthropic;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{
    prompts::NO_ANSWER_FALLBACK,
    types::{ContentBlock, Res},
};

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different LLM providers (or a mock) to be used by the
/// dispatcher.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Generate a completion for a single user prompt.
    ///
    /// Returns the text of the first text-typed content block, or the fixed
    /// fallback notice when the model returned none. Transport and provider
    /// errors are returned as-is.
    async fn complete(&self, prompt: &str) -> Res<String>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}

// Helpers.

/// Picks the reply out of a model response.
///
/// The first block typed `text` wins; when there is none, the fallback notice is returned.
pub fn extract_reply(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .find(|block| block.block_type == "text")
        .map(|block| block.text.clone().unwrap_or_default())
        .unwrap_or_else(|| NO_ANSWER_FALLBACK.to_string())
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn block(block_type: &str, text: Option<&str>) -> ContentBlock {
        ContentBlock {
            block_type: block_type.to_string(),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_first_text_block_wins() {
        let blocks = vec![block("tool_use", None), block("text", Some("Friday.")), block("text", Some("Later."))];

        assert_eq!(extract_reply(&blocks), "Friday.");
    }

    #[test]
    fn test_fallback_without_text_block() {
        assert_eq!(extract_reply(&[]), NO_ANSWER_FALLBACK);
        assert_eq!(extract_reply(&[block("tool_use", None), block("thinking", None)]), NO_ANSWER_FALLBACK);
    }

    #[test]
    fn test_empty_text_block_is_not_a_fallback() {
        assert_eq!(extract_reply(&[block("text", Some(""))]), "");
    }
}
