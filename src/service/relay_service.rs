use std::sync::Arc;

use chrono::Utc;
use cofounder_protocol::{ChatMessage, StreamEvent};
use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::agent::{CompletionProvider, CompletionRequest, FragmentStream, GenerationProfile};
use crate::errors::AppError;
use crate::models::{
    CodeRequest, DocumentKind, DocumentRequest, DocumentResponse, GeneratedIdea, IdeaParams,
};

pub const COFOUNDER_PREAMBLE: &str = "You are an AI co-founder assistant, helping entrepreneurs \
                                      build and grow their startups. Provide strategic advice, \
                                      answer questions, and help with planning.";

const CODE_PREAMBLE: &str = "You are an expert software developer. Generate production-ready, \
                             well-documented code based on the provided specifications. \
                             Include error handling, best practices, and comments explaining \
                             key functionality.";

const IDEA_PREAMBLE: &str = "You are a startup idea generator that creates innovative, \
                             market-viable business concepts. Format your response as detailed JSON.";

/// Stateless front door to the completion provider. Every call carries its
/// full context; nothing survives between calls.
#[derive(Clone)]
pub struct RelayService {
    provider: Arc<dyn CompletionProvider>,
}

impl RelayService {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Opens a conversational stream for the client's history.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream, AppError> {
        let request =
            CompletionRequest::new(COFOUNDER_PREAMBLE, messages, GenerationProfile::CONVERSATION);
        self.open_stream(request).await
    }

    pub async fn generate_code(&self, request: CodeRequest) -> Result<FragmentStream, AppError> {
        let prompt = code_prompt(request)?;
        let request = CompletionRequest::new(
            CODE_PREAMBLE,
            vec![ChatMessage::user(prompt)],
            GenerationProfile::CODE,
        );
        self.open_stream(request).await
    }

    pub async fn generate_document(
        &self,
        request: DocumentRequest,
    ) -> Result<DocumentResponse, AppError> {
        let kind = request
            .kind
            .ok_or(AppError::MissingFields { fields: vec!["type"] })?;
        let system = format!(
            "You are an expert business document writer. Generate professional {kind} documents \
             that are detailed, well-structured, and tailored to the audience."
        );
        let prompt = document_prompt(kind, &request);
        let document = self
            .provider
            .complete(CompletionRequest::new(
                system,
                vec![ChatMessage::user(prompt)],
                GenerationProfile::DOCUMENT,
            ))
            .await?;

        Ok(DocumentResponse { document, kind, timestamp: Utc::now() })
    }

    pub async fn generate_idea(&self, params: IdeaParams) -> Result<GeneratedIdea, AppError> {
        info!(
            "Generating idea for industry={} target_market={}",
            params.industry, params.target_market
        );
        let raw = self
            .provider
            .complete(CompletionRequest::new(
                IDEA_PREAMBLE,
                vec![ChatMessage::user(idea_prompt(&params))],
                GenerationProfile::IDEA,
            ))
            .await?;

        serde_json::from_str(strip_code_fence(&raw)).map_err(|e| {
            error!("Idea response was not the expected JSON: {e}");
            AppError::InvalidProviderOutput { message: e.to_string() }
        })
    }

    /// Opens the provider stream and holds it until the first non-empty
    /// fragment, so that failures before any output can still be reported
    /// with a status code.
    async fn open_stream(&self, request: CompletionRequest) -> Result<FragmentStream, AppError> {
        let mut fragments = self.provider.stream(request).await?;
        loop {
            match fragments.next().await {
                Some(Ok(text)) if text.is_empty() => continue,
                Some(Ok(text)) => {
                    let first = stream::once(async move { Ok::<_, AppError>(text) });
                    return Ok(first.chain(fragments).boxed());
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(stream::empty().boxed()),
            }
        }
    }
}

/// Per-response bookkeeping for [`relay_events`]. Dropping it before the
/// stream reached a terminal event means the client went away.
struct RelayState {
    fragments: FragmentStream,
    stream_id: Uuid,
    delivered: usize,
    terminated: bool,
}

impl Drop for RelayState {
    fn drop(&mut self) {
        if !self.terminated {
            debug!(
                "Stream {} closed by client after {} fragments",
                self.stream_id, self.delivered
            );
        }
    }
}

/// Turns provider fragments into wire events: one event per non-empty
/// fragment, then `Done`, or a single `Error` in place of `Done`.
pub fn relay_events(fragments: FragmentStream) -> impl Stream<Item = StreamEvent> + Send {
    let state = RelayState { fragments, stream_id: Uuid::new_v4(), delivered: 0, terminated: false };
    debug!("Stream {} opened", state.stream_id);

    stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        loop {
            match state.fragments.next().await {
                Some(Ok(text)) if text.is_empty() => continue,
                Some(Ok(text)) => {
                    state.delivered += 1;
                    return Some((StreamEvent::Fragment(text), Some(state)));
                }
                Some(Err(e)) => {
                    error!("Stream {} failed after {} fragments: {e}", state.stream_id, state.delivered);
                    state.terminated = true;
                    return Some((StreamEvent::Error(e.to_string()), None));
                }
                None => {
                    debug!("Stream {} finished after {} fragments", state.stream_id, state.delivered);
                    state.terminated = true;
                    return Some((StreamEvent::Done, None));
                }
            }
        }
    })
}

fn code_prompt(request: CodeRequest) -> Result<String, AppError> {
    let template = request
        .template
        .filter(|t| !t.trim().is_empty())
        .ok_or(AppError::MissingFields { fields: vec!["template"] })?;
    let specifications = request
        .specifications
        .ok_or(AppError::MissingFields { fields: vec!["specifications"] })?;
    let specs_json = serde_json::to_string(&specifications)
        .map_err(|e| AppError::Unexpected(e.to_string()))?;

    Ok(format!(
        "Generate code for a {template} with the following:\n\
         Tech Stack: {}\n\
         Features: {}\n\
         Specifications: {specs_json}\n\n\
         Provide:\n\
         1. Main implementation code\n\
         2. Required dependencies\n\
         3. Setup instructions\n\
         4. API documentation (if applicable)\n\
         5. Testing guidelines",
        specifications.tech_stack.join(", "),
        request.features,
    ))
}

fn document_prompt(kind: DocumentKind, request: &DocumentRequest) -> String {
    format!(
        "{}\n\n\
         Business Information: {}\n\
         Target Audience: {}\n\
         Purpose: {}\n\
         Tone: {}\n\n\
         Provide the document in a well-formatted structure with clear sections and professional language.",
        kind.instruction(),
        request.business_info,
        request.audience,
        request.purpose,
        request.tone,
    )
}

fn idea_prompt(params: &IdeaParams) -> String {
    format!(
        "Generate a detailed startup idea with the following parameters:\n\
         Industry: {}\n\
         Target Market: {}\n\
         Technology: {}\n\
         Problem Space: {}\n\n\
         Return a JSON object with these exact keys:\n\
         {{\n\
           \"name\": \"startup name\",\n\
           \"pitch\": \"one line pitch\",\n\
           \"description\": \"detailed description\",\n\
           \"keyFeatures\": [\"feature1\", \"feature2\", ...],\n\
           \"targetAudience\": \"target audience description\",\n\
           \"revenueModel\": \"revenue model description\",\n\
           \"challenges\": [\"challenge1\", \"challenge2\", ...],\n\
           \"growthStrategy\": \"growth strategy description\"\n\
         }}",
        params.industry, params.target_market, params.technology, params.problem_space,
    )
}

// Models without a JSON mode sometimes wrap the object in a markdown fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;

    fn scripted(items: Vec<Result<&'static str, AppError>>) -> FragmentStream {
        stream::iter(items.into_iter().map(|r| r.map(str::to_string))).boxed()
    }

    #[tokio::test]
    async fn events_end_with_done() {
        let events: Vec<StreamEvent> =
            relay_events(scripted(vec![Ok("a"), Ok(""), Ok("b")])).collect().await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Fragment("a".into()),
                StreamEvent::Fragment("b".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn error_replaces_done_and_ends_the_stream() {
        let events: Vec<StreamEvent> = relay_events(scripted(vec![
            Ok("Hello"),
            Err(AppError::provider("socket closed")),
            Ok("never sent"),
        ]))
        .collect()
        .await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Fragment("Hello".into()),
                StreamEvent::Error("Completion failed: socket closed".into()),
            ]
        );
    }

    #[tokio::test]
    async fn empty_provider_stream_is_just_done() {
        let events: Vec<StreamEvent> = relay_events(scripted(vec![])).collect().await;
        assert_eq!(events, vec![StreamEvent::Done]);
    }

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn code_prompt_requires_template_and_specifications() {
        let request: CodeRequest = serde_json::from_value(serde_json::json!({
            "template": "SaaS dashboard",
            "specifications": { "techStack": ["Rust", "Postgres"], "auth": "jwt" },
            "features": ["billing"]
        }))
        .unwrap();
        let prompt = code_prompt(request).unwrap();
        assert!(prompt.starts_with("Generate code for a SaaS dashboard"));
        assert!(prompt.contains("Tech Stack: Rust, Postgres"));
        assert!(prompt.contains("\"auth\":\"jwt\""));

        let missing: CodeRequest =
            serde_json::from_value(serde_json::json!({ "template": "x" })).unwrap();
        assert!(code_prompt(missing).unwrap_err().is_validation());
    }
}
