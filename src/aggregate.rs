use crate::models::{BatchSummary, PredictionOutcome, Priority, RiskDistribution, RiskLevel};

/// Fold per-customer outcomes into a batch summary. Pure function of its
/// input; an empty batch yields a zeroed summary rather than dividing by
/// zero.
pub fn aggregate(outcomes: &[PredictionOutcome]) -> BatchSummary {
    let total = outcomes.len();
    let mut distribution = RiskDistribution::default();
    let mut successful = 0usize;
    let mut probability_sum = 0.0;
    let mut annual_revenue = 0.0;
    let mut high_risk = 0usize;
    let mut immediate_attention = 0usize;

    for outcome in outcomes {
        match outcome.assessment() {
            Some(assessment) => {
                successful += 1;
                probability_sum += assessment.churn_probability;
                annual_revenue += assessment.estimated_revenue_risk.annual_risk_ghs;
                match assessment.risk_level {
                    RiskLevel::High => distribution.high += 1,
                    RiskLevel::Medium => distribution.medium += 1,
                    RiskLevel::Low => distribution.low += 1,
                    RiskLevel::VeryLow => distribution.very_low += 1,
                }
                if assessment.risk_level == RiskLevel::High {
                    high_risk += 1;
                    if assessment.priority == Priority::Critical {
                        immediate_attention += 1;
                    }
                }
            }
            None => distribution.error += 1,
        }
    }

    let success_rate = if total == 0 {
        0.0
    } else {
        round1(successful as f64 / total as f64 * 100.0)
    };
    let average_churn_probability = if successful == 0 {
        0.0
    } else {
        round3(probability_sum / successful as f64)
    };

    BatchSummary {
        total_customers: total,
        successful_predictions: successful,
        failed_predictions: total - successful,
        success_rate,
        average_churn_probability,
        risk_distribution: distribution,
        total_annual_revenue_at_risk: round2(annual_revenue),
        high_risk_customers: high_risk,
        customers_needing_immediate_attention: immediate_attention,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
