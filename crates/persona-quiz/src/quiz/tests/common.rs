use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request};
use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::accounts::auth::{AuthError, AuthSession, TokenVerifier};
use crate::accounts::domain::{
    NewResult, ResultId, StoredResult, UserId, UserRecord, UserUpsert,
};
use crate::accounts::repository::{AccountRepository, RepositoryError};
use crate::accounts::webhook::{SvixHeaderVerifier, UserSyncService, SVIX_ID, SVIX_SIGNATURE, SVIX_TIMESTAMP};
use crate::quiz::catalog::QuestionCatalog;
use crate::quiz::scoring::ScoringConfig;
use crate::quiz::service::QuizService;

pub(super) const VALID_TOKEN: &str = "sess-token-alice";
pub(super) const SUBJECT: &str = "user_alice";

#[derive(Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    results: Vec<StoredResult>,
}

#[derive(Default)]
pub(super) struct MemoryAccounts {
    state: Mutex<MemoryState>,
}

impl MemoryAccounts {
    pub(super) fn user(&self, external_id: &str) -> Option<UserRecord> {
        let state = self.state.lock().expect("lock");
        state
            .users
            .iter()
            .find(|user| user.external_id == external_id)
            .cloned()
    }

    pub(super) fn result_count(&self) -> usize {
        self.state.lock().expect("lock").results.len()
    }
}

impl AccountRepository for MemoryAccounts {
    fn find_user(&self, external_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.user(external_id))
    }

    fn ensure_user(&self, external_id: &str) -> Result<UserRecord, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        if let Some(user) = state.users.iter().find(|u| u.external_id == external_id) {
            return Ok(user.clone());
        }
        let id = UserId(state.users.len() as u64 + 1);
        let record = UserRecord::placeholder(id, external_id, Utc::now());
        state.users.push(record.clone());
        Ok(record)
    }

    fn upsert_user(&self, upsert: UserUpsert) -> Result<UserRecord, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        let now = Utc::now();
        if let Some(user) = state
            .users
            .iter_mut()
            .find(|u| u.external_id == upsert.external_id)
        {
            user.apply(upsert, now);
            return Ok(user.clone());
        }
        let id = UserId(state.users.len() as u64 + 1);
        let record = UserRecord::from_upsert(id, upsert, now);
        state.users.push(record.clone());
        Ok(record)
    }

    fn deactivate_user(&self, external_id: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        match state
            .users
            .iter_mut()
            .find(|u| u.external_id == external_id)
        {
            Some(user) => {
                user.deactivate(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_result(&self, result: NewResult) -> Result<StoredResult, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        let id = ResultId(state.results.len() as u64 + 1);
        let stored = StoredResult::from_new(id, result, Utc::now());
        state.results.push(stored.clone());
        Ok(stored)
    }

    fn results_for(&self, user_id: UserId) -> Result<Vec<StoredResult>, RepositoryError> {
        let state = self.state.lock().expect("lock");
        Ok(state
            .results
            .iter()
            .rev()
            .filter(|result| result.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableAccounts;

impl AccountRepository for UnavailableAccounts {
    fn find_user(&self, _external_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Err(unavailable())
    }

    fn ensure_user(&self, _external_id: &str) -> Result<UserRecord, RepositoryError> {
        Err(unavailable())
    }

    fn upsert_user(&self, _upsert: UserUpsert) -> Result<UserRecord, RepositoryError> {
        Err(unavailable())
    }

    fn deactivate_user(&self, _external_id: &str) -> Result<bool, RepositoryError> {
        Err(unavailable())
    }

    fn insert_result(&self, _result: NewResult) -> Result<StoredResult, RepositoryError> {
        Err(unavailable())
    }

    fn results_for(&self, _user_id: UserId) -> Result<Vec<StoredResult>, RepositoryError> {
        Err(unavailable())
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

/// Accepts a single fixed token.
pub(super) struct FixedTokenVerifier;

impl TokenVerifier for FixedTokenVerifier {
    fn verify(&self, token: &str) -> Result<AuthSession, AuthError> {
        if token == VALID_TOKEN {
            Ok(AuthSession {
                user_id: SUBJECT.to_string(),
                session_id: "sess_1".to_string(),
            })
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

pub(super) fn quiz_service<R: AccountRepository + 'static>(
    repository: Arc<R>,
) -> Arc<QuizService<R, FixedTokenVerifier>> {
    Arc::new(QuizService::new(
        Arc::new(QuestionCatalog::standard()),
        ScoringConfig::default(),
        repository,
        Arc::new(FixedTokenVerifier),
    ))
}

pub(super) fn sync_service<R: AccountRepository + 'static>(
    repository: Arc<R>,
) -> Arc<UserSyncService<R, SvixHeaderVerifier>> {
    Arc::new(UserSyncService::new(repository, Arc::new(SvixHeaderVerifier)))
}

pub(super) fn uniform_answers(value: i64) -> Vec<Value> {
    vec![json!(value); 60]
}

pub(super) fn alternating_answers() -> Vec<Value> {
    (0..60)
        .map(|index| if index % 2 == 0 { json!(1) } else { json!(5) })
        .collect()
}

pub(super) fn bearer_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {VALID_TOKEN}")).expect("header"),
    );
    headers
}

pub(super) fn session() -> AuthSession {
    AuthSession {
        user_id: SUBJECT.to_string(),
        session_id: "sess_1".to_string(),
    }
}

pub(super) fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub(super) fn webhook_request(body: Value, signed: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/clerk")
        .header(header::CONTENT_TYPE, "application/json");
    if signed {
        builder = builder
            .header(SVIX_ID, "msg_2f9")
            .header(SVIX_TIMESTAMP, "1710403200")
            .header(SVIX_SIGNATURE, "v1,dGVzdC1zaWduYXR1cmU=");
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
