use rand::Rng;

use crate::models::{
    Confidence, CustomerRecord, Priority, RecommendedAction, RiskAssessment, RiskLevel,
    RevenueRisk,
};

/// Monthly charge assumed when the field is absent or non-numeric.
const DEFAULT_MONTHLY_CHARGE: f64 = 50.0;

/// The same steps are suggested for every assessment regardless of tier.
/// Known gap inherited from the model service's response template.
const NEXT_STEPS: [&str; 4] = [
    "Send targeted retention offer",
    "Analyze usage patterns",
    "Consider loyalty program enrollment",
    "Monitor for 30 days",
];

/// Heuristic churn scorer, used when no live model response is available.
/// The jitter term comes from the caller's random source so runs can be
/// seeded and tests can pin it to zero.
pub fn score(record: &CustomerRecord, rng: &mut impl Rng) -> RiskAssessment {
    score_with_jitter(record, rng.gen_range(0.0..0.2))
}

/// Deterministic core: everything but the jitter draw.
pub fn score_with_jitter(record: &CustomerRecord, jitter: f64) -> RiskAssessment {
    let risk_score = risk_indicator_count(record);
    let probability = (0.2 + risk_score as f64 * 0.15 + jitter).clamp(0.0, 1.0);

    // Tier thresholds compare the unrounded probability; only the reported
    // value is rounded.
    let (risk_level, priority) = if probability > 0.7 {
        (RiskLevel::High, Priority::Critical)
    } else if probability > 0.4 {
        (RiskLevel::Medium, Priority::High)
    } else {
        (RiskLevel::Low, Priority::Low)
    };
    let churn_probability = round3(probability);

    let high = risk_level == RiskLevel::High;
    let monthly = record
        .number("monthly_charge")
        .unwrap_or(DEFAULT_MONTHLY_CHARGE);

    RiskAssessment {
        churn_probability,
        risk_level,
        confidence: if high { Confidence::High } else { Confidence::Medium },
        recommended_action: if high {
            RecommendedAction::ImmediateIntervention
        } else {
            RecommendedAction::ProactiveEngagement
        },
        priority,
        next_steps: NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
        estimated_revenue_risk: RevenueRisk {
            monthly_risk_ghs: monthly,
            annual_risk_ghs: monthly * 12.0,
            customer_lifetime_value: monthly * 48.0,
        },
        intervention_timeline: if high { "1-2 days" } else { "3-7 days" }.to_string(),
        success_probability: if high { 0.6 } else { 0.8 },
    }
}

/// Count of the five boolean churn indicators that fire for this record.
pub fn risk_indicator_count(record: &CustomerRecord) -> usize {
    [
        record.coerced("late_payments") > 3.0,
        record.coerced("customer_service_calls") > 5.0,
        record.coerced("device_age_months") > 36.0,
        record.coerced("monthly_charge") > 60.0,
        record.coerced("account_length_months") < 12.0,
    ]
    .iter()
    .filter(|fired| **fired)
    .count()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
