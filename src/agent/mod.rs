//! The completion provider seam.
//!
//! Handlers only ever see [`CompletionProvider`]; the rig-backed
//! implementation lives in [`rig_provider`] and tests substitute scripted
//! stubs.

pub mod rig_provider;

use async_trait::async_trait;
use cofounder_protocol::ChatMessage;
use futures_util::stream::BoxStream;

use crate::errors::AppError;

pub use rig_provider::RigCompletionProvider;

/// Text fragments in the order the provider produced them.
pub type FragmentStream = BoxStream<'static, Result<String, AppError>>;

/// Generation parameters for one call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProfile {
    pub temperature: f64,
    pub max_tokens: u64,
    /// Ask the provider for a single JSON object.
    pub json_output: bool,
}

impl GenerationProfile {
    pub const CONVERSATION: Self = Self { temperature: 0.7, max_tokens: 1000, json_output: false };
    pub const IDEA: Self = Self { temperature: 0.8, max_tokens: 1000, json_output: true };
    pub const DOCUMENT: Self = Self { temperature: 0.4, max_tokens: 3000, json_output: false };
    pub const CODE: Self = Self { temperature: 0.2, max_tokens: 4000, json_output: false };
}

/// A fully assembled provider call: system instruction first, then the
/// conversation in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub profile: GenerationProfile,
}

impl CompletionRequest {
    pub fn new(
        system: impl Into<String>,
        messages: Vec<ChatMessage>,
        profile: GenerationProfile,
    ) -> Self {
        Self { system: system.into(), messages, profile }
    }

    /// The exact message list the provider sees.
    pub fn provider_messages(&self) -> Vec<ChatMessage> {
        std::iter::once(ChatMessage::system(self.system.clone()))
            .chain(self.messages.iter().cloned())
            .collect()
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Single, non-streaming completion.
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError>;

    /// Streaming completion. Errors returned here happen before any fragment
    /// exists; later failures arrive as an `Err` item, after which the
    /// stream ends.
    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_is_the_most_creative_generation_site() {
        let profiles = [GenerationProfile::DOCUMENT, GenerationProfile::CODE];
        assert!(profiles
            .iter()
            .all(|p| p.temperature < GenerationProfile::CONVERSATION.temperature));
        assert!(GenerationProfile::CODE.temperature < GenerationProfile::DOCUMENT.temperature);
    }

    #[test]
    fn system_instruction_is_prepended() {
        let request = CompletionRequest::new(
            "be brief",
            vec![ChatMessage::user("hi"), ChatMessage::assistant("hello"), ChatMessage::user("?")],
            GenerationProfile::CONVERSATION,
        );
        let messages = request.provider_messages();
        assert_eq!(messages[0], ChatMessage::system("be brief"));
        assert_eq!(&messages[1..], request.messages.as_slice());
    }
}
