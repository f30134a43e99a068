use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

/// Identity established by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    pub session_id: String,
}

/// Verifies session tokens issued by the hosted auth provider.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthSession, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing or invalid Authorization header")]
    MissingHeader,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Token verification failed")]
    VerificationFailed { detail: String },
}

impl AuthError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "AUTH_HEADER_MISSING",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::VerificationFailed { .. } => "VERIFICATION_FAILED",
        }
    }

    /// Short tag used on analytics events.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::InvalidToken => "invalid_token",
            Self::VerificationFailed { .. } => "verification_failed",
        }
    }
}

/// Extract the credential from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingHeader)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MissingHeader),
    }
}

/// Verify the request's bearer token, rejecting sessions without a subject or session id.
pub fn authenticate<T>(verifier: &T, headers: &HeaderMap) -> Result<AuthSession, AuthError>
where
    T: TokenVerifier + ?Sized,
{
    let token = bearer_token(headers)?;
    let session = verifier.verify(token)?;
    if session.user_id.is_empty() || session.session_id.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(session)
}
