use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::domain::UserUpsert;
use super::repository::{AccountRepository, RepositoryError};
use crate::telemetry::elapsed_ms;

pub const SVIX_ID: &str = "svix-id";
pub const SVIX_TIMESTAMP: &str = "svix-timestamp";
pub const SVIX_SIGNATURE: &str = "svix-signature";

/// Envelope posted by the auth provider. `data` is decoded per event type.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Payload of `user.created` / `user.updated`. Timestamps are Unix seconds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserEventData {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl UserEventData {
    /// First listed address is treated as primary; empty strings count as absent.
    pub fn into_upsert(self) -> UserUpsert {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        UserUpsert {
            email: non_empty(
                self.email_addresses
                    .into_iter()
                    .next()
                    .map(|address| address.email_address),
            ),
            first_name: non_empty(self.first_name),
            last_name: non_empty(self.last_name),
            image_url: non_empty(self.image_url),
            created_at: self.created_at.and_then(from_unix_seconds),
            updated_at: self.updated_at.and_then(from_unix_seconds),
            external_id: self.id,
        }
    }
}

fn from_unix_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
}

#[derive(Debug, Clone, Deserialize)]
struct DeletedUserData {
    id: String,
}

/// Authenticity check for inbound webhook deliveries.
pub trait WebhookVerifier: Send + Sync {
    fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookError>;
}

/// Accepts deliveries that carry the full Svix header set. Signature cryptography is delegated
/// to the platform edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvixHeaderVerifier;

impl WebhookVerifier for SvixHeaderVerifier {
    fn verify(&self, headers: &HeaderMap, _body: &[u8]) -> Result<(), WebhookError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
        };

        let missing: Vec<&'static str> = [SVIX_ID, SVIX_TIMESTAMP, SVIX_SIGNATURE]
            .into_iter()
            .filter(|name| header(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(WebhookError::Unverified { missing });
        }

        let signature = header(SVIX_SIGNATURE).unwrap_or_default();
        debug!(
            svix_id = header(SVIX_ID).unwrap_or_default(),
            svix_timestamp = header(SVIX_TIMESTAMP).unwrap_or_default(),
            svix_signature = %signature.chars().take(20).collect::<String>(),
            "webhook carries svix headers"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid webhook signature")]
    Unverified { missing: Vec<&'static str> },
    #[error("malformed webhook payload: {0}")]
    Malformed(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl WebhookError {
    const fn reason(&self) -> &'static str {
        match self {
            Self::Unverified { .. } => "verification_failed",
            Self::Malformed(_) => "malformed_payload",
            Self::Repository(_) => "processing_failed",
        }
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Upserted {
        event_type: String,
        external_id: String,
    },
    Deactivated {
        external_id: String,
        found: bool,
    },
    Ignored {
        event_type: String,
    },
}

impl WebhookOutcome {
    pub fn event_type(&self) -> &str {
        match self {
            Self::Upserted { event_type, .. } | Self::Ignored { event_type } => event_type,
            Self::Deactivated { .. } => "user.deleted",
        }
    }
}

/// Relays auth-provider user lifecycle events into the user table.
pub struct UserSyncService<R, W> {
    repository: Arc<R>,
    verifier: Arc<W>,
}

impl<R, W> UserSyncService<R, W>
where
    R: AccountRepository + 'static,
    W: WebhookVerifier + 'static,
{
    pub fn new(repository: Arc<R>, verifier: Arc<W>) -> Self {
        Self {
            repository,
            verifier,
        }
    }

    /// Verify, decode, and apply one delivery.
    pub fn handle(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookOutcome, WebhookError> {
        let start = Instant::now();
        match self.process(headers, body) {
            Ok(outcome) => {
                let event = match outcome {
                    WebhookOutcome::Ignored { .. } => "webhook_unhandled",
                    _ => "webhook_success",
                };
                info!(
                    event,
                    event_type = outcome.event_type(),
                    elapsed_ms = elapsed_ms(start),
                    "webhook processed"
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    event = "webhook_error",
                    reason = err.reason(),
                    error = %err,
                    elapsed_ms = elapsed_ms(start),
                    "webhook rejected"
                );
                Err(err)
            }
        }
    }

    fn process(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookOutcome, WebhookError> {
        self.verifier.verify(headers, body)?;
        let event: WebhookEvent = serde_json::from_slice(body)?;

        match event.event_type.as_str() {
            "user.created" | "user.updated" => {
                let data: UserEventData = serde_json::from_value(event.data)?;
                let record = self.repository.upsert_user(data.into_upsert())?;
                Ok(WebhookOutcome::Upserted {
                    event_type: event.event_type,
                    external_id: record.external_id,
                })
            }
            "user.deleted" => {
                let data: DeletedUserData = serde_json::from_value(event.data)?;
                let found = self.repository.deactivate_user(&data.id)?;
                if !found {
                    warn!(external_id = %data.id, "deletion for unknown user");
                }
                Ok(WebhookOutcome::Deactivated {
                    external_id: data.id,
                    found,
                })
            }
            _ => Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn svix_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SVIX_ID, HeaderValue::from_static("msg_1"));
        headers.insert(SVIX_TIMESTAMP, HeaderValue::from_static("1710403200"));
        headers.insert(
            SVIX_SIGNATURE,
            HeaderValue::from_static("v1,c2lnbmF0dXJlLWJ5dGVzLWhlcmU="),
        );
        headers
    }

    #[test]
    fn svix_verifier_lists_missing_headers() {
        let mut headers = svix_headers();
        assert_eq!(SvixHeaderVerifier.verify(&headers, b"{}"), Ok(()));

        headers.remove(SVIX_TIMESTAMP);
        headers.insert(SVIX_SIGNATURE, HeaderValue::from_static(""));
        assert_eq!(
            SvixHeaderVerifier.verify(&headers, b"{}"),
            Err(WebhookError::Unverified {
                missing: vec![SVIX_TIMESTAMP, SVIX_SIGNATURE]
            })
        );
    }

    #[test]
    fn user_event_data_maps_to_upsert() {
        let data: UserEventData = serde_json::from_value(json!({
            "id": "user_2abc",
            "email_addresses": [
                { "email_address": "primary@example.com", "id": "idn_1" },
                { "email_address": "other@example.com", "id": "idn_2" }
            ],
            "first_name": "Ada",
            "last_name": "",
            "image_url": null,
            "created_at": 1710403200,
            "updated_at": 1710406800
        }))
        .expect("valid payload");

        let upsert = data.into_upsert();
        assert_eq!(upsert.external_id, "user_2abc");
        assert_eq!(upsert.email.as_deref(), Some("primary@example.com"));
        assert_eq!(upsert.first_name.as_deref(), Some("Ada"));
        assert_eq!(upsert.last_name, None);
        assert_eq!(upsert.image_url, None);
        assert_eq!(
            upsert.created_at.map(|t| t.timestamp()),
            Some(1710403200)
        );
        assert_eq!(
            upsert.updated_at.map(|t| t.timestamp()),
            Some(1710406800)
        );
    }
}
