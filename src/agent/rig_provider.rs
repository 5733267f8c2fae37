use std::pin::pin;

use async_trait::async_trait;
use cofounder_protocol::{ChatMessage, Role};
use futures_util::{Stream, StreamExt};
use rig::agent::MultiTurnStreamItem;
use rig::client::Nothing;
use rig::completion::Chat;
use rig::message::Message as RigMessage;
use rig::prelude::CompletionClient;
use rig::providers::{ollama, openai};
use rig::streaming::{StreamedAssistantContent, StreamingChat};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

use crate::agent::{CompletionProvider, CompletionRequest, FragmentStream, GenerationProfile};
use crate::config::ProviderConfig;
use crate::errors::AppError;

const OPENAI_DEFAULT_HOST: &str = "https://api.openai.com/v1";
const FRAGMENT_BUFFER: usize = 64;

/// Builds a rig agent for one request: preamble, sampling parameters and
/// any provider-specific request fields.
macro_rules! build_agent {
    ($client:expr, $model:expr, $request:expr, $extra_params:expr) => {{
        let profile = $request.profile;
        let mut builder = $client
            .agent($model)
            .preamble(&$request.system)
            .temperature(profile.temperature)
            .max_tokens(profile.max_tokens);
        if let Some(params) = $extra_params(profile) {
            builder = builder.additional_params(params);
        }
        builder.build()
    }};
}

#[derive(Clone)]
enum Backend {
    // Chat Completions, not Responses: compatible endpoints behind
    // OPENAI_BASE_URL rarely serve `/responses`.
    OpenAi(openai::CompletionsClient),
    Ollama(ollama::Client),
}

/// Classifies provider failures from their message text.
#[derive(Debug, Clone)]
struct FailureContext {
    host: String,
    model: String,
}

impl FailureContext {
    fn classify(&self, message: &str) -> AppError {
        let lower = message.to_lowercase();
        if lower.contains("connection refused") || lower.contains("error trying to connect") {
            AppError::ProviderUnavailable { host: self.host.clone() }
        } else if lower.contains("model")
            && (lower.contains("not found") || lower.contains("does not exist"))
        {
            AppError::ModelNotFound { model_name: self.model.clone() }
        } else {
            AppError::provider(message)
        }
    }
}

/// Maps a client history onto rig's prompt + history split.
/// System entries are dropped: the system instruction travels as the preamble.
fn to_rig_conversation(messages: &[ChatMessage]) -> Result<(RigMessage, Vec<RigMessage>), AppError> {
    let mut converted: Vec<RigMessage> = messages
        .iter()
        .filter_map(|m| match m.role {
            Role::User => Some(RigMessage::user(&m.content)),
            Role::Assistant => Some(RigMessage::assistant(&m.content)),
            Role::System => None,
        })
        .collect();
    let prompt = converted
        .pop()
        .ok_or_else(|| AppError::bad_request("No messages provided"))?;
    Ok((prompt, converted))
}

/// Completion provider backed by a rig client, OpenAI or a local Ollama.
/// A fresh agent is built per request so the whole history is replayed each
/// time; nothing is kept between calls.
#[derive(Clone)]
pub struct RigCompletionProvider {
    backend: Backend,
    failures: FailureContext,
}

impl RigCompletionProvider {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, AppError> {
        match config {
            ProviderConfig::OpenAi { api_key, base_url, model } => {
                let mut builder = openai::Client::builder().api_key(api_key.as_str());
                if let Some(url) = base_url {
                    builder = builder.base_url(url);
                }
                let client = builder
                    .build()
                    .map_err(|e| AppError::Unexpected(format!("Failed to build OpenAI client: {e}")))?
                    .completions_api();
                Ok(Self {
                    backend: Backend::OpenAi(client),
                    failures: FailureContext {
                        host: base_url.clone().unwrap_or_else(|| OPENAI_DEFAULT_HOST.to_string()),
                        model: model.clone(),
                    },
                })
            }
            ProviderConfig::Ollama { base_url, model } => {
                let client = ollama::Client::builder()
                    .api_key(Nothing)
                    .base_url(base_url)
                    .build()
                    .map_err(|e| AppError::Unexpected(format!("Failed to build Ollama client: {e}")))?;
                Ok(Self {
                    backend: Backend::Ollama(client),
                    failures: FailureContext { host: base_url.clone(), model: model.clone() },
                })
            }
        }
    }

    fn model(&self) -> &str {
        &self.failures.model
    }
}

/// Chat Completions ignores the agent-level `max_tokens`, so it travels as a
/// request field alongside JSON mode.
fn openai_params(profile: GenerationProfile) -> Option<Value> {
    let mut params = json!({ "max_tokens": profile.max_tokens });
    if profile.json_output {
        params["response_format"] = json!({ "type": "json_object" });
    }
    Some(params)
}

fn ollama_params(profile: GenerationProfile) -> Option<Value> {
    profile.json_output.then(|| json!({ "format": "json" }))
}

#[async_trait]
impl CompletionProvider for RigCompletionProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        let (prompt, history) = to_rig_conversation(&request.messages)?;

        let result = match &self.backend {
            Backend::OpenAi(client) => {
                let agent = build_agent!(client, self.model(), request, openai_params);
                agent.chat(prompt, history).await
            }
            Backend::Ollama(client) => {
                let agent = build_agent!(client, self.model(), request, ollama_params);
                agent.chat(prompt, history).await
            }
        };

        result.map_err(|e| {
            error!("Completion failed on {}: {e}", self.failures.host);
            self.failures.classify(&e.to_string())
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream, AppError> {
        let (prompt, history) = to_rig_conversation(&request.messages)?;
        let (tx, rx) = mpsc::channel(FRAGMENT_BUFFER);
        let failures = self.failures.clone();

        match &self.backend {
            Backend::OpenAi(client) => {
                let agent = build_agent!(client, self.model(), request, openai_params);
                tokio::spawn(async move {
                    let stream = agent.stream_chat(prompt, history).await;
                    forward_fragments(stream, tx, failures).await;
                });
            }
            Backend::Ollama(client) => {
                let agent = build_agent!(client, self.model(), request, ollama_params);
                tokio::spawn(async move {
                    let stream = agent.stream_chat(prompt, history).await;
                    forward_fragments(stream, tx, failures).await;
                });
            }
        }

        Ok(ReceiverStream::new(rx).boxed())
    }
}

/// Pumps text deltas from a rig stream into `tx` until the stream ends, the
/// first error has been delivered, or the receiver goes away.
async fn forward_fragments<S, R, E>(
    stream: S,
    tx: mpsc::Sender<Result<String, AppError>>,
    failures: FailureContext,
) where
    S: Stream<Item = Result<MultiTurnStreamItem<R>, E>>,
    E: std::fmt::Display,
{
    let mut stream = pin!(stream);
    while let Some(item) = stream.next().await {
        let fragment = match item {
            Ok(MultiTurnStreamItem::StreamAssistantItem(StreamedAssistantContent::Text(text))) => {
                Ok(text.text)
            }
            Ok(_) => continue,
            Err(e) => {
                error!("Streaming completion failed on {}: {e}", failures.host);
                Err(failures.classify(&e.to_string()))
            }
        };
        let failed = fragment.is_err();
        if tx.send(fragment).await.is_err() {
            debug!("Fragment receiver dropped, abandoning provider stream");
            return;
        }
        if failed {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failures() -> FailureContext {
        FailureContext { host: "http://localhost:11434".into(), model: "llama3.2".into() }
    }

    #[test]
    fn classifies_connection_and_model_failures() {
        assert!(failures()
            .classify("error sending request: Connection refused (os error 111)")
            .is_provider_unavailable());
        assert!(matches!(
            failures().classify("model 'llama9' not found, try pulling it first"),
            AppError::ModelNotFound { .. }
        ));
        assert!(matches!(
            failures().classify("rate limit exceeded"),
            AppError::ProviderFailure { .. }
        ));
    }

    fn openai_wire_request(profile: GenerationProfile) -> Value {
        use rig::completion::CompletionRequest as RigRequest;
        use rig::providers::openai::completion::{CompletionRequest, OpenAIRequestParams};
        use rig::OneOrMany;

        let request = RigRequest {
            model: None,
            preamble: Some("system".into()),
            chat_history: OneOrMany::one(RigMessage::user("hi")),
            documents: vec![],
            tools: vec![],
            temperature: Some(profile.temperature),
            max_tokens: Some(profile.max_tokens),
            tool_choice: None,
            additional_params: openai_params(profile),
            output_schema: None,
        };
        let wire = CompletionRequest::try_from(OpenAIRequestParams {
            model: "gpt-4-0125-preview".into(),
            request,
            strict_tools: false,
            tool_result_array_content: false,
        })
        .unwrap();
        serde_json::to_value(wire).unwrap()
    }

    #[test]
    fn openai_idea_requests_ask_for_a_json_object() {
        let body = openai_wire_request(GenerationProfile::IDEA);
        assert_eq!(body["response_format"], json!({ "type": "json_object" }));
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn openai_chat_requests_stay_free_text() {
        let body = openai_wire_request(GenerationProfile::CONVERSATION);
        assert!(body.get("response_format").is_none());
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn ollama_json_mode_only_for_json_sites() {
        assert_eq!(ollama_params(GenerationProfile::IDEA), Some(json!({ "format": "json" })));
        assert_eq!(ollama_params(GenerationProfile::CODE), None);
    }

    #[test]
    fn last_message_becomes_the_prompt() {
        let (_, history) = to_rig_conversation(&[
            ChatMessage::user("a"),
            ChatMessage::assistant("b"),
            ChatMessage::user("c"),
        ])
        .unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn empty_or_system_only_history_is_rejected() {
        assert!(to_rig_conversation(&[]).is_err());
        assert!(to_rig_conversation(&[ChatMessage::system("x")]).is_err());
    }
}
