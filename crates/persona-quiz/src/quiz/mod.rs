//! Personality quiz: question catalog, weighted scoring, and type descriptions.
//!
//! Answers are positional Likert values (1..=5) matched against the catalog. The engine turns
//! them into four signed axis scores, a four-letter code, and an Assertive/Turbulent identity
//! derived from answer spread. The HTTP surface lives in [`router`].

pub mod catalog;
pub mod descriptor;
pub mod router;
pub mod scoring;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, Dimension, Question, QuestionCatalog};
pub use descriptor::{
    profile_for, DimensionPercentages, PersonalityDescription, PersonalityDescriptor,
    TypeProfile,
};
pub use router::{quiz_router, webhook_router};
pub use scoring::{
    answer_variance, parse_answers, Assessment, DimensionScores, ScoringConfig, ScoringEngine,
    ScoringError,
};
pub use service::{QuizEvaluator, QuizResult, QuizService, QuizServiceError, SubmissionReceipt};
pub use types::{split_identity, FullType, Identity, TypeCode, TypeCodeError};
