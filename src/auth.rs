use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

/// Claims carried by dashboard session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

/// The caller a request was authenticated as, available as a request extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

/// Validates HS256 bearer tokens issued by the account service.
#[derive(Clone)]
pub struct BearerAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl BearerAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn extract_bearer_token(header_value: Option<&str>) -> Result<&str, AppError> {
        let raw = header_value.ok_or_else(|| AppError::unauthorized("Authentication required"))?;
        let token = raw
            .trim()
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid authorization scheme"))?;
        Ok(token)
    }

    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(AuthenticatedUser { user_id: data.claims.user_id }),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(AppError::unauthorized("Token expired")),
                _ => Err(AppError::unauthorized("Invalid token")),
            },
        }
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token.
pub async fn require_bearer(
    State(auth): State<BearerAuthenticator>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let user = BearerAuthenticator::extract_bearer_token(header)
        .and_then(|token| auth.authenticate(token))
        .inspect_err(|e| debug!("Rejected {} {}: {e}", request.method(), request.uri()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    fn make_token(user_id: i64, secret: &str, ttl_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            user_id,
            exp: (now + ttl_secs) as usize,
            iat: now as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .expect("token should encode")
    }

    #[test]
    fn bearer_extraction_requires_scheme() {
        assert!(matches!(
            BearerAuthenticator::extract_bearer_token(None),
            Err(AppError::Unauthorized { .. })
        ));
        assert!(BearerAuthenticator::extract_bearer_token(Some("abc")).is_err());
        assert!(BearerAuthenticator::extract_bearer_token(Some("Bearer   ")).is_err());
        assert_eq!(BearerAuthenticator::extract_bearer_token(Some("Bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn accepts_valid_token() {
        let auth = BearerAuthenticator::new("secret");
        let user = auth.authenticate(&make_token(42, "secret", 3600)).unwrap();
        assert_eq!(user, AuthenticatedUser { user_id: 42 });
    }

    #[test]
    fn rejects_wrong_key_and_expired_tokens() {
        let auth = BearerAuthenticator::new("secret");
        let wrong = auth.authenticate(&make_token(1, "other", 3600)).unwrap_err();
        assert_eq!(wrong.to_string(), "Invalid token");

        let expired = auth.authenticate(&make_token(1, "secret", -3600)).unwrap_err();
        assert_eq!(expired.to_string(), "Token expired");
    }
}
