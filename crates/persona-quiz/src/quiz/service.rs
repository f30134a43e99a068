use std::sync::Arc;

use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::catalog::{Question, QuestionCatalog};
use super::descriptor::{PersonalityDescription, PersonalityDescriptor};
use super::scoring::{Assessment, ScoringConfig, ScoringEngine, ScoringError};
use crate::accounts::auth::{authenticate, AuthError, AuthSession, TokenVerifier};
use crate::accounts::domain::{NewResult, ResultId, StoredResult};
use crate::accounts::repository::{AccountRepository, RepositoryError};

/// Scored submission plus its narrative description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub personality_description: PersonalityDescription,
}

/// Response for a persisted submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub success: bool,
    pub result_id: ResultId,
    pub message: String,
    #[serde(flatten)]
    pub result: QuizResult,
}

/// Scoring engine paired with the descriptor, shared by the HTTP service and offline tooling.
#[derive(Debug, Clone)]
pub struct QuizEvaluator {
    engine: ScoringEngine,
    descriptor: PersonalityDescriptor,
}

impl QuizEvaluator {
    pub fn new(catalog: Arc<QuestionCatalog>, config: ScoringConfig) -> Self {
        Self {
            engine: ScoringEngine::new(catalog, config),
            descriptor: PersonalityDescriptor::new(config.confidence_ceiling),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn evaluate(&self, answers: &[i64]) -> Result<QuizResult, ScoringError> {
        let assessment = self.engine.assess(answers)?;
        let personality_description = self.descriptor.describe(
            &assessment.full_type.to_string(),
            &assessment.dimension_scores,
        );
        Ok(QuizResult {
            assessment,
            personality_description,
        })
    }

    /// Parse wire answers (length first) and evaluate them, returning the parsed answers too.
    pub fn evaluate_submission(&self, raw: &[Value]) -> Result<(Vec<i64>, QuizResult), ScoringError> {
        let answers = self.engine.parse_submission(raw)?;
        let result = self.evaluate(&answers)?;
        Ok((answers, result))
    }
}

/// Service composing the evaluator, account storage, and token verification.
pub struct QuizService<R, T> {
    evaluator: QuizEvaluator,
    repository: Arc<R>,
    verifier: Arc<T>,
}

impl<R, T> QuizService<R, T>
where
    R: AccountRepository + 'static,
    T: TokenVerifier + 'static,
{
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        config: ScoringConfig,
        repository: Arc<R>,
        verifier: Arc<T>,
    ) -> Self {
        Self {
            evaluator: QuizEvaluator::new(catalog, config),
            repository,
            verifier,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        self.evaluator.engine()
    }

    pub fn questions(&self) -> &[Question] {
        self.engine().catalog().questions()
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthSession, AuthError> {
        authenticate(self.verifier.as_ref(), headers)
    }

    /// Score without persisting anything; used for anonymous takers.
    pub fn score(&self, answers: &[Value]) -> Result<QuizResult, QuizServiceError> {
        let (_, result) = self.evaluator.evaluate_submission(answers)?;
        debug!(full_type = %result.assessment.full_type, "scored anonymous submission");
        Ok(result)
    }

    /// Score and store the result against the authenticated user, creating the user if needed.
    pub fn submit(
        &self,
        session: &AuthSession,
        answers: &[Value],
    ) -> Result<SubmissionReceipt, QuizServiceError> {
        let (answers, result) = self.evaluator.evaluate_submission(answers)?;

        let user = self.repository.ensure_user(&session.user_id)?;
        let stored = self.repository.insert_result(NewResult {
            user_id: user.id,
            mbti_type: result.assessment.mbti_type,
            full_type: result.assessment.full_type.to_string(),
            answers,
            dimension_scores: result.assessment.dimension_scores,
            answer_variance: result.assessment.answer_variance,
        })?;

        info!(
            user_id = %session.user_id,
            result_id = stored.id.0,
            mbti_type = %stored.mbti_type,
            "stored quiz result"
        );

        Ok(SubmissionReceipt {
            success: true,
            result_id: stored.id,
            message: format!("Your personality type is {}", result.assessment.mbti_type),
            result,
        })
    }

    /// Stored results for the caller, newest first. Unknown users have no history.
    pub fn history(&self, session: &AuthSession) -> Result<Vec<StoredResult>, QuizServiceError> {
        match self.repository.find_user(&session.user_id)? {
            Some(user) => Ok(self.repository.results_for(user.id)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Error raised by the quiz service.
#[derive(Debug, thiserror::Error)]
pub enum QuizServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
