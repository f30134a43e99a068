use super::domain::{NewResult, StoredResult, UserId, UserRecord, UserUpsert};

/// Storage abstraction over the hosted user and result tables.
pub trait AccountRepository: Send + Sync {
    fn find_user(&self, external_id: &str) -> Result<Option<UserRecord>, RepositoryError>;
    /// Fetch the user, creating a placeholder row when the subject is unknown.
    fn ensure_user(&self, external_id: &str) -> Result<UserRecord, RepositoryError>;
    fn upsert_user(&self, upsert: UserUpsert) -> Result<UserRecord, RepositoryError>;
    /// Returns `false` when no row matched.
    fn deactivate_user(&self, external_id: &str) -> Result<bool, RepositoryError>;
    fn insert_result(&self, result: NewResult) -> Result<StoredResult, RepositoryError>;
    /// Newest first.
    fn results_for(&self, user_id: UserId) -> Result<Vec<StoredResult>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
