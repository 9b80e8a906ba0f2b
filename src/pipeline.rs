use rand::Rng;
use tracing::info;

use crate::aggregate;
use crate::error::PipelineError;
use crate::models::{BatchSummary, ParseWarning, PredictionOutcome};
use crate::parse::{self, NumericFallback};
use crate::score;
use crate::validate;

#[derive(Debug)]
pub struct BatchResult {
    pub outcomes: Vec<PredictionOutcome>,
    pub summary: BatchSummary,
    pub warnings: Vec<ParseWarning>,
}

/// The local (heuristic) batch path: parse, validate, score every record,
/// aggregate. Any validation issue blocks the whole batch; no valid subset
/// is scored on its own.
pub fn run_local(
    text: &str,
    fallback: NumericFallback,
    rng: &mut impl Rng,
) -> Result<BatchResult, PipelineError> {
    let parsed = parse::parse(text, fallback)?;

    let issues = validate::validate(&parsed.records);
    if !issues.is_empty() {
        return Err(PipelineError::ValidationFailed(issues));
    }

    let outcomes: Vec<PredictionOutcome> = parsed
        .records
        .iter()
        .map(|record| PredictionOutcome::Scored {
            customer_id: record.customer_id().to_string(),
            assessment: score::score(record, rng),
        })
        .collect();

    let summary = aggregate::aggregate(&outcomes);
    info!(
        total = summary.total_customers,
        high_risk = summary.high_risk_customers,
        "batch scored"
    );

    Ok(BatchResult {
        outcomes,
        summary,
        warnings: parsed.warnings,
    })
}
