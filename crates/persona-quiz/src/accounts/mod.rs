//! User lifecycle and result persistence.
//!
//! Token verification, storage, and webhook signatures are external collaborators; this module
//! defines the seams they plug into and the record-keeping rules that sit in front of them.

pub mod auth;
pub mod domain;
pub mod repository;
pub mod webhook;

pub use auth::{authenticate, bearer_token, AuthError, AuthSession, TokenVerifier};
pub use domain::{NewResult, ResultId, StoredResult, UserId, UserRecord, UserUpsert};
pub use repository::{AccountRepository, RepositoryError};
pub use webhook::{
    SvixHeaderVerifier, UserEventData, UserSyncService, WebhookError, WebhookEvent,
    WebhookOutcome, WebhookVerifier,
};
