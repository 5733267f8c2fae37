//! Event-stream framing used between the relay and its clients.
//!
//! Every event is a single `data: <payload>` line followed by a blank line.
//! Payloads are either a JSON object carrying `content` or `error`, or the
//! literal `[DONE]` sentinel.

use serde_json::{json, Value};

use crate::errors::FrameError;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Fragment(String),
    Error(String),
    Done,
}

impl StreamEvent {
    /// The text that follows `data: ` on the wire.
    pub fn payload(&self) -> String {
        match self {
            StreamEvent::Fragment(content) => json!({ "content": content }).to_string(),
            StreamEvent::Error(message) => json!({ "error": message }).to_string(),
            StreamEvent::Done => DONE_SENTINEL.to_string(),
        }
    }

    /// Full wire form, including the terminating blank line.
    pub fn encode(&self) -> String {
        format!("{DATA_PREFIX}{}\n\n", self.payload())
    }
}

/// Decodes one line of an event stream.
///
/// Returns `None` for anything that is not a `data: ` line (blank event
/// separators, comments, other fields).
pub fn decode_line(line: &str) -> Option<Result<StreamEvent, FrameError>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    if payload == DONE_SENTINEL {
        return Some(Ok(StreamEvent::Done));
    }
    Some(decode_payload(payload))
}

fn decode_payload(payload: &str) -> Result<StreamEvent, FrameError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| FrameError::Malformed(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(FrameError::Malformed(format!("expected an object, got {payload}")));
    };

    if let Some(message) = fields.get("error").and_then(error_message) {
        return Ok(StreamEvent::Error(message));
    }

    match fields.get("content") {
        None | Some(Value::Null) => Ok(StreamEvent::Fragment(String::new())),
        Some(Value::String(text)) => Ok(StreamEvent::Fragment(text.clone())),
        Some(other) => Err(FrameError::Malformed(format!("content is not a string: {other}"))),
    }
}

// Null, false and "" do not count as an error.
fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_each_event_kind() {
        assert_eq!(
            StreamEvent::Fragment("Sure".into()).encode(),
            "data: {\"content\":\"Sure\"}\n\n"
        );
        assert_eq!(
            StreamEvent::Error("boom".into()).encode(),
            "data: {\"error\":\"boom\"}\n\n"
        );
        assert_eq!(StreamEvent::Done.encode(), "data: [DONE]\n\n");
    }

    #[test]
    fn fragment_text_is_json_escaped() {
        let event = StreamEvent::Fragment("line one\nline \"two\"".into());
        let encoded = event.encode();
        assert_eq!(encoded.matches('\n').count(), 2);
        assert_eq!(decode_line(encoded.lines().next().unwrap()), Some(Ok(event)));
    }

    #[test]
    fn ignores_non_data_lines() {
        assert_eq!(decode_line(""), None);
        assert_eq!(decode_line(": keep-alive"), None);
        assert_eq!(decode_line("event: message"), None);
        assert_eq!(decode_line("data:{\"content\":\"x\"}"), None);
    }

    #[test]
    fn decodes_sentinel_and_strips_carriage_return() {
        assert_eq!(decode_line("data: [DONE]"), Some(Ok(StreamEvent::Done)));
        assert_eq!(decode_line("data: [DONE]\r"), Some(Ok(StreamEvent::Done)));
    }

    #[test]
    fn missing_or_null_content_is_an_empty_fragment() {
        assert_eq!(decode_line("data: {}"), Some(Ok(StreamEvent::Fragment(String::new()))));
        assert_eq!(
            decode_line("data: {\"content\":null}"),
            Some(Ok(StreamEvent::Fragment(String::new())))
        );
    }

    #[test]
    fn error_field_wins_over_content() {
        assert_eq!(
            decode_line("data: {\"content\":\"x\",\"error\":\"rate limited\"}"),
            Some(Ok(StreamEvent::Error("rate limited".into())))
        );
        assert_eq!(
            decode_line("data: {\"error\":{\"code\":500}}"),
            Some(Ok(StreamEvent::Error("{\"code\":500}".into())))
        );
        assert_eq!(
            decode_line("data: {\"error\":\"\",\"content\":\"ok\"}"),
            Some(Ok(StreamEvent::Fragment("ok".into())))
        );
    }

    #[test]
    fn malformed_payloads_are_reported() {
        assert!(matches!(decode_line("data: {not json"), Some(Err(FrameError::Malformed(_)))));
        assert!(matches!(decode_line("data: 42"), Some(Err(FrameError::Malformed(_)))));
        assert!(matches!(
            decode_line("data: {\"content\":7}"),
            Some(Err(FrameError::Malformed(_)))
        ));
    }
}
