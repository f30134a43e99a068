use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::catalog::{Dimension, QuestionCatalog};
use super::types::{FullType, Identity, TypeCode};

/// Multiplier applied to questions whose weight magnitude exceeds [`COMPLEXITY_WEIGHT_THRESHOLD`].
pub const COMPLEXITY_FACTOR: f64 = 1.2;
pub const COMPLEXITY_WEIGHT_THRESHOLD: f64 = 1.0;

pub const MIN_ANSWER: i64 = 1;
pub const MAX_ANSWER: i64 = 5;
pub const NEUTRAL_ANSWER: i64 = 3;

/// Answer variance above this marks a submission as turbulent. Empirical; tune with care.
pub const DEFAULT_TURBULENCE_THRESHOLD: f64 = 2.5;
/// Assumed per-axis score magnitude that maps to 100% confidence.
pub const DEFAULT_CONFIDENCE_CEILING: f64 = 20.0;

pub fn complexity_factor(weight: f64) -> f64 {
    if weight.abs() > COMPLEXITY_WEIGHT_THRESHOLD {
        COMPLEXITY_FACTOR
    } else {
        1.0
    }
}

/// Tunable constants tied to the catalog in use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub confidence_ceiling: f64,
    pub turbulence_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_ceiling: DEFAULT_CONFIDENCE_CEILING,
            turbulence_threshold: DEFAULT_TURBULENCE_THRESHOLD,
        }
    }
}

/// Signed per-axis accumulation of weighted, centred answers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionScores {
    #[serde(rename = "EI")]
    pub ei: f64,
    #[serde(rename = "SN")]
    pub sn: f64,
    #[serde(rename = "TF")]
    pub tf: f64,
    #[serde(rename = "JP")]
    pub jp: f64,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::EI => self.ei,
            Dimension::SN => self.sn,
            Dimension::TF => self.tf,
            Dimension::JP => self.jp,
        }
    }

    fn bucket(&mut self, dimension: Dimension) -> &mut f64 {
        match dimension {
            Dimension::EI => &mut self.ei,
            Dimension::SN => &mut self.sn,
            Dimension::TF => &mut self.tf,
            Dimension::JP => &mut self.jp,
        }
    }
}

/// Caller input errors, detected before any accumulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("expected {expected} answers, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("answer at index {index} is {value}; answers must be whole numbers between 1 and 5")]
    OutOfRange { index: usize, value: f64 },
    #[error("answer at index {index} is not a number")]
    NotNumeric { index: usize },
}

impl ScoringError {
    /// Stable machine-readable code for API clients.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SizeMismatch { .. } => "SIZE_MISMATCH",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::NotNumeric { .. } => "NOT_NUMERIC",
        }
    }
}

/// Convert wire answers to integers without coercing fractions or strings.
pub fn parse_answers(raw: &[Value]) -> Result<Vec<i64>, ScoringError> {
    raw.iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Number(number) => {
                if let Some(answer) = number.as_i64() {
                    return Ok(answer);
                }
                let value = number.as_f64().unwrap_or(f64::NAN);
                // `4.0` is a whole number on the wire; `4.5` is not.
                if value.fract() == 0.0 && value.abs() <= MAX_ANSWER as f64 {
                    Ok(value as i64)
                } else {
                    Err(ScoringError::OutOfRange { index, value })
                }
            }
            _ => Err(ScoringError::NotNumeric { index }),
        })
        .collect()
}

/// Population variance of the raw answers, ignoring dimension and weight.
pub fn answer_variance(answers: &[i64]) -> f64 {
    if answers.is_empty() {
        return 0.0;
    }
    let count = answers.len() as f64;
    let mean = answers.iter().map(|&answer| answer as f64).sum::<f64>() / count;
    answers
        .iter()
        .map(|&answer| {
            let delta = answer as f64 - mean;
            delta * delta
        })
        .sum::<f64>()
        / count
}

/// Everything derived from one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub mbti_type: TypeCode,
    pub full_type: FullType,
    pub dimension_scores: DimensionScores,
    pub answer_variance: f64,
    pub is_turbulent: bool,
}

/// Stateless scorer bound to one catalog.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Arc<QuestionCatalog>,
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(catalog: Arc<QuestionCatalog>, config: ScoringConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn config(&self) -> ScoringConfig {
        self.config
    }

    fn check_len(&self, actual: usize) -> Result<(), ScoringError> {
        if actual != self.catalog.len() {
            return Err(ScoringError::SizeMismatch {
                expected: self.catalog.len(),
                actual,
            });
        }
        Ok(())
    }

    /// Wire answers to integers. A wrong-length array is a size mismatch whatever its elements hold.
    pub fn parse_submission(&self, raw: &[Value]) -> Result<Vec<i64>, ScoringError> {
        self.check_len(raw.len())?;
        parse_answers(raw)
    }

    /// Check length first, then every value, so no partial accumulation happens on bad input.
    pub fn validate(&self, answers: &[i64]) -> Result<(), ScoringError> {
        self.check_len(answers.len())?;

        match answers
            .iter()
            .position(|answer| !(MIN_ANSWER..=MAX_ANSWER).contains(answer))
        {
            Some(index) => Err(ScoringError::OutOfRange {
                index,
                value: answers[index] as f64,
            }),
            None => Ok(()),
        }
    }

    pub fn compute_dimension_scores(&self, answers: &[i64]) -> Result<DimensionScores, ScoringError> {
        self.validate(answers)?;

        let mut scores = DimensionScores::default();
        for (answer, question) in answers.iter().zip(self.catalog.iter()) {
            let centred = (answer - NEUTRAL_ANSWER) as f64;
            let contribution = centred * question.weight * complexity_factor(question.weight);
            *scores.bucket(question.dimension) += contribution;
        }
        Ok(scores)
    }

    /// Zero and positive scores resolve to the first-listed pole (E, N, T, J).
    pub fn classify(scores: &DimensionScores) -> TypeCode {
        TypeCode::from_poles(Dimension::ordered().map(|dimension| scores.get(dimension) >= 0.0))
    }

    pub fn answer_variance(&self, answers: &[i64]) -> f64 {
        answer_variance(answers)
    }

    pub fn identity_for_variance(&self, variance: f64) -> Identity {
        if variance > self.config.turbulence_threshold {
            Identity::Turbulent
        } else {
            Identity::Assertive
        }
    }

    /// Base type only; no variance is computed.
    pub fn calculate_mbti(&self, answers: &[i64]) -> Result<TypeCode, ScoringError> {
        let scores = self.compute_dimension_scores(answers)?;
        Ok(Self::classify(&scores))
    }

    pub fn assess(&self, answers: &[i64]) -> Result<Assessment, ScoringError> {
        let dimension_scores = self.compute_dimension_scores(answers)?;
        let mbti_type = Self::classify(&dimension_scores);
        let variance = answer_variance(answers);
        let identity = self.identity_for_variance(variance);

        Ok(Assessment {
            mbti_type,
            full_type: FullType::new(mbti_type, identity),
            dimension_scores,
            answer_variance: variance,
            is_turbulent: identity.is_turbulent(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::catalog::Question;
    use serde_json::json;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(
            Arc::new(QuestionCatalog::standard()),
            ScoringConfig::default(),
        )
    }

    fn small_engine() -> ScoringEngine {
        let questions = [
            (Dimension::EI, 1.5),
            (Dimension::EI, -0.5),
            (Dimension::SN, 1.0),
            (Dimension::SN, -1.0),
            (Dimension::TF, 2.0),
            (Dimension::TF, -1.0),
            (Dimension::JP, 0.5),
            (Dimension::JP, -1.1),
        ]
        .into_iter()
        .zip(1u32..)
        .map(|((dimension, weight), id)| Question {
            id,
            text: format!("q{id}"),
            dimension,
            weight,
        })
        .collect();
        ScoringEngine::new(
            Arc::new(QuestionCatalog::new(questions).expect("valid catalog")),
            ScoringConfig::default(),
        )
    }

    #[test]
    fn neutral_answers_resolve_to_first_poles() {
        let engine = engine();
        let answers = vec![NEUTRAL_ANSWER; engine.catalog().len()];
        let scores = engine
            .compute_dimension_scores(&answers)
            .expect("valid answers");
        for dimension in Dimension::ordered() {
            assert_eq!(scores.get(dimension), 0.0);
        }
        assert_eq!(ScoringEngine::classify(&scores).as_str(), "ENTJ");
    }

    #[test]
    fn complexity_factor_amplifies_heavy_weights() {
        let engine = small_engine();
        let scores = engine
            .compute_dimension_scores(&[5, 3, 5, 3, 1, 3, 5, 1])
            .expect("valid answers");

        assert!((scores.ei - 2.0 * 1.5 * 1.2).abs() < 1e-12);
        assert!((scores.sn - 2.0).abs() < 1e-12);
        assert!((scores.tf - (-2.0 * 2.0 * 1.2)).abs() < 1e-12);
        assert!((scores.jp - (1.0 + 2.0 * 1.1 * 1.2)).abs() < 1e-12);
        assert_eq!(ScoringEngine::classify(&scores).as_str(), "ENFJ");
    }

    #[test]
    fn negative_scores_select_second_poles() {
        let scores = DimensionScores {
            ei: -0.1,
            sn: -3.0,
            tf: -0.0001,
            jp: -12.0,
        };
        assert_eq!(ScoringEngine::classify(&scores).as_str(), "ISFP");
    }

    #[test]
    fn size_mismatch_is_checked_first() {
        let engine = engine();
        let answers = vec![9; engine.catalog().len() - 1];
        assert_eq!(
            engine.compute_dimension_scores(&answers),
            Err(ScoringError::SizeMismatch {
                expected: 60,
                actual: 59
            })
        );
    }

    #[test]
    fn out_of_range_cites_first_offending_index() {
        let engine = engine();
        let mut answers = vec![3; 60];
        answers[7] = 0;
        answers[9] = 6;
        assert_eq!(
            engine.compute_dimension_scores(&answers),
            Err(ScoringError::OutOfRange {
                index: 7,
                value: 0.0
            })
        );
        answers[7] = 4;
        assert_eq!(
            engine.calculate_mbti(&answers),
            Err(ScoringError::OutOfRange {
                index: 9,
                value: 6.0
            })
        );
    }

    #[test]
    fn parse_answers_rejects_without_coercion() {
        assert_eq!(parse_answers(&[json!(1), json!(5)]), Ok(vec![1, 5]));
        assert_eq!(parse_answers(&[json!(4.0)]), Ok(vec![4]));
        assert_eq!(
            parse_answers(&[json!(1), json!("4")]),
            Err(ScoringError::NotNumeric { index: 1 })
        );
        assert_eq!(
            parse_answers(&[json!(null)]),
            Err(ScoringError::NotNumeric { index: 0 })
        );
        assert_eq!(
            parse_answers(&[json!(2), json!(2.5)]),
            Err(ScoringError::OutOfRange {
                index: 1,
                value: 2.5
            })
        );
    }

    #[test]
    fn parse_submission_reports_length_before_elements() {
        let engine = engine();

        let mut short = vec![json!(3); 59];
        short[2] = json!("x");
        short[4] = json!(2.5);
        assert_eq!(
            engine.parse_submission(&short),
            Err(ScoringError::SizeMismatch {
                expected: 60,
                actual: 59
            })
        );

        let mut full = vec![json!(3); 60];
        assert_eq!(engine.parse_submission(&full), Ok(vec![3; 60]));
        full[2] = json!("x");
        assert_eq!(
            engine.parse_submission(&full),
            Err(ScoringError::NotNumeric { index: 2 })
        );
    }

    #[test]
    fn variance_uses_population_formula() {
        assert_eq!(answer_variance(&[4; 60]), 0.0);
        let alternating: Vec<i64> = (0..60).map(|i| if i % 2 == 0 { 1 } else { 5 }).collect();
        assert_eq!(answer_variance(&alternating), 4.0);
        assert!((answer_variance(&[1, 2, 3, 4]) - 1.25).abs() < 1e-12);
        assert_eq!(answer_variance(&[]), 0.0);
    }

    #[test]
    fn assess_attaches_identity_suffix() {
        let engine = engine();

        let steady = engine.assess(&[2; 60]).expect("valid answers");
        assert!(!steady.is_turbulent);
        assert!(steady.full_type.to_string().ends_with("-A"));

        let alternating: Vec<i64> = (0..60).map(|i| if i % 2 == 0 { 1 } else { 5 }).collect();
        let swinging = engine.assess(&alternating).expect("valid answers");
        assert!(swinging.is_turbulent);
        assert_eq!(swinging.answer_variance, 4.0);
        assert_eq!(
            swinging.full_type.to_string(),
            format!("{}-T", swinging.mbti_type)
        );
    }

    #[test]
    fn repeated_scoring_is_bit_identical() {
        let engine = engine();
        let answers: Vec<i64> = (0..60).map(|i| (i % 5) as i64 + 1).collect();
        let first = engine.compute_dimension_scores(&answers).expect("valid");
        let second = engine.compute_dimension_scores(&answers).expect("valid");
        for dimension in Dimension::ordered() {
            assert_eq!(
                first.get(dimension).to_bits(),
                second.get(dimension).to_bits()
            );
        }
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            ScoringError::SizeMismatch {
                expected: 1,
                actual: 0
            }
            .code(),
            "SIZE_MISMATCH"
        );
        assert_eq!(ScoringError::NotNumeric { index: 0 }.code(), "NOT_NUMERIC");
    }
}
