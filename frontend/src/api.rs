use std::cell::Cell;
use std::rc::Rc;

use cofounder_protocol::{ChatMessage, Reassembler, StreamError};
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::callback::Timeout;
use js_sys::{Reflect, Uint8Array};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, ReadableStreamDefaultReader};

use crate::models::{CodeForm, DocumentForm, ErrorBody, GeneratedDocument, GeneratedIdea, IdeaForm};

/// Base path of the backend API; the dashboard is served from the same origin.
const API_BASE: &str = "/api";

/// Caller-side deadline for idea generation.
const IDEA_TIMEOUT_MS: u32 = 60_000;

/// Session token stored by the login flow.
pub fn auth_token() -> Option<String> {
    web_sys::window()?
        .local_storage()
        .ok()??
        .get_item("auth_token")
        .ok()?
}

fn with_auth(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
        None => builder,
    }
}

fn js_error(e: JsValue) -> StreamError {
    StreamError::Transport(format!("{e:?}"))
}

async fn rejected(resp: &Response) -> StreamError {
    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => resp.status_text(),
    };
    StreamError::Http { status: resp.status(), message }
}

/// Sends the conversation to the relay and reassembles the streamed reply.
///
/// `on_update` receives the full accumulated text after every fragment.
/// Aborting `signal` closes the reader and ends with [`StreamError::Cancelled`].
pub async fn stream_chat(
    history: &[ChatMessage],
    token: Option<&str>,
    signal: &AbortSignal,
    on_update: impl FnMut(&str),
) -> Result<String, StreamError> {
    let body = serde_json::json!({ "messages": history });
    stream_events("ai/chat", &body, token, signal, on_update).await
}

/// Streams generated code for a template, same contract as [`stream_chat`].
pub async fn stream_code(
    form: &CodeForm,
    token: Option<&str>,
    signal: &AbortSignal,
    on_update: impl FnMut(&str),
) -> Result<String, StreamError> {
    stream_events("ai/generate-code", form, token, signal, on_update).await
}

async fn stream_events(
    path: &str,
    body: &impl Serialize,
    token: Option<&str>,
    signal: &AbortSignal,
    mut on_update: impl FnMut(&str),
) -> Result<String, StreamError> {
    let resp = with_auth(Request::post(&format!("{API_BASE}/{path}")), token)
        .abort_signal(Some(signal))
        .json(body)
        .map_err(|e| StreamError::Transport(format!("Serialize error: {e}")))?
        .send()
        .await
        .map_err(|e| {
            if signal.aborted() {
                StreamError::Cancelled
            } else {
                StreamError::Transport(format!("Network error: {e}"))
            }
        })?;

    if !resp.ok() {
        return Err(rejected(&resp).await);
    }

    let stream = resp
        .body()
        .ok_or_else(|| StreamError::Transport("response has no body".to_string()))?;
    let reader: ReadableStreamDefaultReader = stream.get_reader().unchecked_into();
    let mut reassembler = Reassembler::new();

    loop {
        let result = match JsFuture::from(reader.read()).await {
            Ok(result) => result,
            Err(e) => {
                if signal.aborted() {
                    reassembler.cancel();
                    break;
                }
                return Err(js_error(e));
            }
        };

        let done = Reflect::get(&result, &JsValue::from_str("done"))
            .map(|v| v.is_truthy())
            .map_err(js_error)?;
        if done {
            if signal.aborted() {
                reassembler.cancel();
            }
            break;
        }

        let value = Reflect::get(&result, &JsValue::from_str("value")).map_err(js_error)?;
        let bytes = Uint8Array::new(&value).to_vec();
        if let Err(e) = reassembler.feed_with(&bytes, &mut on_update) {
            let _ = reader.cancel();
            return Err(e);
        }
        if !reassembler.is_streaming() {
            // Sentinel seen: release the connection rather than wait for close.
            let _ = reader.cancel();
            break;
        }
    }

    reassembler.finish_with(&mut on_update).map(str::to_string)
}

/// Requests one business document. The backend answers in one piece.
pub async fn generate_document(
    form: &DocumentForm,
    token: Option<&str>,
) -> Result<GeneratedDocument, StreamError> {
    let resp = with_auth(Request::post(&format!("{API_BASE}/ai/generate-document")), token)
        .json(form)
        .map_err(|e| StreamError::Transport(format!("Serialize error: {e}")))?
        .send()
        .await
        .map_err(|e| StreamError::Transport(format!("Network error: {e}")))?;

    if !resp.ok() {
        return Err(rejected(&resp).await);
    }
    resp.json::<GeneratedDocument>()
        .await
        .map_err(|e| StreamError::Transport(format!("Parse error: {e}")))
}

/// Requests one generated idea, giving up after [`IDEA_TIMEOUT_MS`].
pub async fn generate_idea(
    form: &IdeaForm,
    token: Option<&str>,
) -> Result<GeneratedIdea, StreamError> {
    let controller = AbortController::new().map_err(js_error)?;
    let timed_out = Rc::new(Cell::new(false));
    let deadline = {
        let controller = controller.clone();
        let timed_out = timed_out.clone();
        Timeout::new(IDEA_TIMEOUT_MS, move || {
            timed_out.set(true);
            controller.abort();
        })
    };

    let result = async {
        let resp = with_auth(Request::post(&format!("{API_BASE}/ai/generate-idea")), token)
            .abort_signal(Some(&controller.signal()))
            .json(form)
            .map_err(|e| StreamError::Transport(format!("Serialize error: {e}")))?
            .send()
            .await
            .map_err(|e| StreamError::Transport(format!("Network error: {e}")))?;

        if !resp.ok() {
            return Err(rejected(&resp).await);
        }
        resp.json::<GeneratedIdea>()
            .await
            .map_err(|e| StreamError::Transport(format!("Parse error: {e}")))
    }
    .await;

    // Dropping the timer cancels it.
    drop(deadline);

    match result {
        Err(_) if timed_out.get() => Err(StreamError::Timeout),
        other => other,
    }
}
