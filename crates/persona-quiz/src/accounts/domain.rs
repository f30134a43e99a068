use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quiz::scoring::DimensionScores;
use crate::quiz::types::TypeCode;

/// Email stored for users created on first submission, before any webhook has arrived.
pub const PLACEHOLDER_EMAIL: &str = "unknown@example.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(pub u64);

/// Row in the user table, keyed internally by [`UserId`] and externally by the auth subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub external_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl UserRecord {
    /// Minimal row for an authenticated submitter the user table has not seen yet.
    pub fn placeholder(id: UserId, external_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            external_id: external_id.to_string(),
            email: Some(PLACEHOLDER_EMAIL.to_string()),
            first_name: None,
            last_name: None,
            image_url: None,
            created_at: now,
            updated_at: now,
            last_login: None,
            is_active: true,
        }
    }

    pub fn from_upsert(id: UserId, upsert: UserUpsert, now: DateTime<Utc>) -> Self {
        Self {
            id,
            external_id: upsert.external_id,
            email: upsert.email,
            first_name: upsert.first_name,
            last_name: upsert.last_name,
            image_url: upsert.image_url,
            created_at: upsert.created_at.unwrap_or(now),
            updated_at: upsert.updated_at.unwrap_or(now),
            last_login: Some(now),
            is_active: true,
        }
    }

    /// Merge provider data into an existing row. Absent fields keep their stored values.
    pub fn apply(&mut self, upsert: UserUpsert, now: DateTime<Utc>) {
        if upsert.email.is_some() {
            self.email = upsert.email;
        }
        if upsert.first_name.is_some() {
            self.first_name = upsert.first_name;
        }
        if upsert.last_name.is_some() {
            self.last_name = upsert.last_name;
        }
        if upsert.image_url.is_some() {
            self.image_url = upsert.image_url;
        }
        self.updated_at = upsert.updated_at.unwrap_or(now);
        self.last_login = Some(now);
    }

    /// Soft delete; results stay attached to the row.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }
}

/// User fields relayed from the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserUpsert {
    pub external_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A scored submission ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub user_id: UserId,
    pub mbti_type: TypeCode,
    pub full_type: String,
    pub answers: Vec<i64>,
    pub dimension_scores: DimensionScores,
    pub answer_variance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResult {
    pub id: ResultId,
    pub user_id: UserId,
    pub mbti_type: TypeCode,
    pub full_type: String,
    pub answers: Vec<i64>,
    pub dimension_scores: DimensionScores,
    pub answer_variance: f64,
    pub created_at: DateTime<Utc>,
}

impl StoredResult {
    pub fn from_new(id: ResultId, result: NewResult, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: result.user_id,
            mbti_type: result.mbti_type,
            full_type: result.full_type,
            answers: result.answers,
            dimension_scores: result.dimension_scores,
            answer_variance: result.answer_variance,
            created_at,
        }
    }
}
