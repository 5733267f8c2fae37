use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::AppError;

/// JSON body extractor that ignores `Content-Type` and also accepts a body
/// that is itself a JSON string holding the document, as some serverless
/// clients send it.
#[derive(Debug)]
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        decode_lenient(&body).map(LenientJson)
    }
}

pub fn decode_lenient<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let invalid = |e: serde_json::Error| AppError::bad_request(format!("Invalid request format: {e}"));

    let value: Value = serde_json::from_slice(body).map_err(invalid)?;
    let value = match value {
        Value::String(inner) => serde_json::from_str(&inner).map_err(invalid)?,
        other => other,
    };
    serde_json::from_value(value).map_err(invalid)
}

#[cfg(test)]
mod tests {
    use cofounder_protocol::ChatMessage;

    use super::*;
    use crate::models::ChatRequest;

    #[test]
    fn accepts_object_and_string_encoded_bodies() {
        let object = br#"{"messages":[{"role":"user","content":"hi"}]}"#;
        let wrapped = serde_json::to_vec(&String::from_utf8_lossy(object)).unwrap();

        for body in [object.to_vec(), wrapped] {
            let request: ChatRequest = decode_lenient(&body).unwrap();
            assert_eq!(request.into_messages().unwrap(), vec![ChatMessage::user("hi")]);
        }
    }

    #[test]
    fn rejects_garbage() {
        let err = decode_lenient::<ChatRequest>(b"messages=hi").unwrap_err();
        assert!(err.is_validation());
        let err = decode_lenient::<ChatRequest>(br#""not json inside""#).unwrap_err();
        assert!(err.is_validation());
    }
}
