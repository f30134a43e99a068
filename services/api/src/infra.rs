use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use persona_quiz::accounts::{
    AccountRepository, AuthError, AuthSession, NewResult, RepositoryError, ResultId,
    StoredResult, TokenVerifier, UserId, UserRecord, UserUpsert,
};
use persona_quiz::config::{DevToken, QuizConfig};
use persona_quiz::error::AppError;
use persona_quiz::quiz::QuestionCatalog;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) assets_dir: Option<Arc<PathBuf>>,
}

#[derive(Default)]
struct AccountTables {
    users: HashMap<String, UserRecord>,
    results: Vec<StoredResult>,
    next_user_id: u64,
}

impl AccountTables {
    fn allocate_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        UserId(self.next_user_id)
    }
}

/// Process-local stand-in for the hosted user and result tables.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountRepository {
    tables: Arc<Mutex<AccountTables>>,
}

impl InMemoryAccountRepository {
    fn lock(&self) -> Result<MutexGuard<'_, AccountTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("account store lock poisoned".to_string()))
    }
}

impl AccountRepository for InMemoryAccountRepository {
    fn find_user(&self, external_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.lock()?.users.get(external_id).cloned())
    }

    fn ensure_user(&self, external_id: &str) -> Result<UserRecord, RepositoryError> {
        let mut tables = self.lock()?;
        if let Some(user) = tables.users.get(external_id) {
            return Ok(user.clone());
        }
        let id = tables.allocate_user_id();
        let record = UserRecord::placeholder(id, external_id, Utc::now());
        tables
            .users
            .insert(external_id.to_string(), record.clone());
        Ok(record)
    }

    fn upsert_user(&self, upsert: UserUpsert) -> Result<UserRecord, RepositoryError> {
        let mut tables = self.lock()?;
        let now = Utc::now();
        if let Some(user) = tables.users.get_mut(&upsert.external_id) {
            user.apply(upsert, now);
            return Ok(user.clone());
        }
        let id = tables.allocate_user_id();
        let record = UserRecord::from_upsert(id, upsert, now);
        tables
            .users
            .insert(record.external_id.clone(), record.clone());
        Ok(record)
    }

    fn deactivate_user(&self, external_id: &str) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.users.get_mut(external_id) {
            Some(user) => {
                user.deactivate(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_result(&self, result: NewResult) -> Result<StoredResult, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.users.values().any(|user| user.id == result.user_id) {
            return Err(RepositoryError::NotFound);
        }
        let id = ResultId(tables.results.len() as u64 + 1);
        let stored = StoredResult::from_new(id, result, Utc::now());
        tables.results.push(stored.clone());
        Ok(stored)
    }

    fn results_for(&self, user_id: UserId) -> Result<Vec<StoredResult>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .results
            .iter()
            .rev()
            .filter(|result| result.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Token verifier backed by the configured development token table.
#[derive(Debug, Default, Clone)]
pub(crate) struct StaticTokenVerifier {
    sessions: HashMap<String, AuthSession>,
}

impl StaticTokenVerifier {
    pub(crate) fn from_dev_tokens(tokens: &[DevToken]) -> Self {
        let sessions = tokens
            .iter()
            .map(|token| {
                (
                    token.token.clone(),
                    AuthSession {
                        user_id: token.user_id.clone(),
                        session_id: token.session_id.clone(),
                    },
                )
            })
            .collect();
        Self { sessions }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<AuthSession, AuthError> {
        self.sessions
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// The configured catalog file when present, otherwise the built-in question set.
pub(crate) fn load_catalog(config: &QuizConfig) -> Result<QuestionCatalog, AppError> {
    match &config.catalog_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let catalog = QuestionCatalog::from_json(&raw)?;
            info!(path = %path.display(), questions = catalog.len(), "loaded question catalog");
            Ok(catalog)
        }
        None => Ok(QuestionCatalog::standard()),
    }
}
