use crate::infra::load_catalog;
use clap::Args;
use persona_quiz::config::AppConfig;
use persona_quiz::error::AppError;
use persona_quiz::quiz::{Dimension, QuizEvaluator, QuizResult};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct QuestionsArgs {
    /// Emit the catalog as JSON instead of a numbered listing
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Comma-separated answers (1-5), one per catalog question
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) answers: Vec<i64>,
    /// Emit the full result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with one submission per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Treat the first row as a header
    #[arg(long)]
    pub(crate) has_headers: bool,
    /// Emit one JSON object per row
    #[arg(long)]
    pub(crate) json: bool,
}

/// Evaluator built from the environment's catalog and scoring settings.
fn evaluator_from_env() -> Result<QuizEvaluator, AppError> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(&config.quiz)?;
    Ok(QuizEvaluator::new(Arc::new(catalog), config.scoring))
}

pub(crate) fn run_questions(args: QuestionsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(&config.quiz)?;

    if args.json {
        println!("{}", to_json(catalog.questions())?);
        return Ok(());
    }

    for question in catalog.iter() {
        println!(
            "{:>3}. [{} {:+.1}] {}",
            question.id, question.dimension, question.weight, question.text
        );
    }
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let evaluator = evaluator_from_env()?;
    let result = evaluator.evaluate(&args.answers)?;

    if args.json {
        println!("{}", to_json(&result)?);
    } else {
        print!("{}", render_result(&result));
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let evaluator = evaluator_from_env()?;
    let file = std::fs::File::open(&args.csv)?;
    let rows = score_rows(&evaluator, file, args.has_headers)?;

    for row in &rows {
        if args.json {
            println!("{}", serde_json::to_string(row).map_err(std::io::Error::from)?);
        } else {
            println!("{}", row.summary_line());
        }
    }

    let failed = rows.iter().filter(|row| row.error.is_some()).count();
    eprintln!("scored {} rows ({} failed)", rows.len(), failed);
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRow {
    row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BatchRow {
    fn summary_line(&self) -> String {
        match (&self.full_type, &self.error) {
            (_, Some(error)) => format!("row {}: error: {}", self.row, error),
            (Some(full_type), None) => format!(
                "row {}: {} ({}% confidence)",
                self.row,
                full_type,
                self.percentage.unwrap_or_default()
            ),
            (None, None) => format!("row {}: no result", self.row),
        }
    }
}

/// Score each CSV record independently; a bad row is reported, not fatal.
fn score_rows<R: Read>(
    evaluator: &QuizEvaluator,
    reader: R,
    has_headers: bool,
) -> Result<Vec<BatchRow>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(std::io::Error::from)?;
        let raw: Vec<Value> = record.iter().map(cell_value).collect();
        let row = index + 1;

        rows.push(match evaluator.evaluate_submission(&raw) {
            Ok((_, result)) => BatchRow {
                row,
                full_type: Some(result.assessment.full_type.to_string()),
                percentage: Some(result.personality_description.percentage),
                error: None,
            },
            Err(err) => BatchRow {
                row,
                full_type: None,
                percentage: None,
                error: Some(err.to_string()),
            },
        });
    }
    Ok(rows)
}

/// Cells become JSON numbers when they parse, so validation matches the HTTP path.
fn cell_value(cell: &str) -> Value {
    if let Ok(value) = cell.parse::<i64>() {
        return Value::from(value);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Value::from(value),
        _ => Value::from(cell),
    }
}

fn render_result(result: &QuizResult) -> String {
    let description = &result.personality_description;
    let scores = &result.assessment.dimension_scores;
    let mut out = format!(
        "{} - {}\n{}\n\n",
        result.assessment.full_type, description.nickname, description.summary
    );
    for dimension in Dimension::ordered() {
        out.push_str(&format!(
            "  {:<28} {:>+7.2}  -> {}\n",
            dimension.label(),
            scores.get(dimension),
            result.assessment.mbti_type.pole(dimension)
        ));
    }
    out.push_str(&format!(
        "\n  answer variance {:.2}, overall confidence {}%\n",
        result.assessment.answer_variance, description.percentage
    ));
    out
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|err| AppError::Io(err.into()))
}
