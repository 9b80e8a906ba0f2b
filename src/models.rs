use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema;

/// One value as it came off the wire: the trimmed raw text plus, for numeric
/// fields, the parsed number when parsing succeeded.
#[derive(Debug, Clone, Default)]
pub struct FieldValue {
    pub raw: String,
    pub number: Option<f64>,
}

/// A single customer row. Built once by the parser, read-only afterwards.
/// Every schema field is present; missing or unparseable numerics read as 0
/// through `coerced`.
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    /// 1-based source line, offset by the header (first data row is 2);
    /// 0 for form-supplied records with no source line.
    pub row: usize,
    values: BTreeMap<&'static str, FieldValue>,
}

impl CustomerRecord {
    pub fn new(row: usize) -> Self {
        let mut values = BTreeMap::new();
        for spec in schema::FIELDS.iter() {
            values.insert(spec.name, FieldValue::default());
        }
        CustomerRecord { row, values }
    }

    pub fn set(&mut self, field: &'static str, raw: String, number: Option<f64>) {
        self.values.insert(field, FieldValue { raw, number });
    }

    pub fn raw(&self, field: &str) -> &str {
        self.values.get(field).map(|v| v.raw.as_str()).unwrap_or("")
    }

    /// Parsed numeric value, None when the field is empty or did not parse.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.values.get(field).and_then(|v| v.number)
    }

    /// Numeric value under the zero-substitution rule.
    pub fn coerced(&self, field: &str) -> f64 {
        self.number(field).unwrap_or(0.0)
    }

    pub fn customer_id(&self) -> &str {
        self.raw("customer_id")
    }

    /// JSON body for the prediction service: numbers where parsed, raw text
    /// otherwise.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for spec in schema::FIELDS.iter() {
            let value = match self.number(spec.name) {
                Some(n) if spec.field_type.is_numeric() => serde_json::json!(n),
                _ => serde_json::json!(self.raw(spec.name)),
            };
            map.insert(spec.name.to_string(), value);
        }
        serde_json::Value::Object(map)
    }
}

/// Malformed row that was skipped, surfaced to the caller rather than only
/// logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub row: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Source line number; 0 for records that did not come from a file.
    pub row: usize,
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.row == 0 {
            write!(f, "{}: {}", self.field, self.message)
        } else {
            write!(f, "row {}: {}: {}", self.row, self.field, self.message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    // Only the remote model emits this tier; the heuristic never does.
    VeryLow,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::VeryLow => "VERY_LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    ImmediateIntervention,
    ProactiveEngagement,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::ImmediateIntervention => "IMMEDIATE_INTERVENTION",
            RecommendedAction::ProactiveEngagement => "PROACTIVE_ENGAGEMENT",
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Revenue exposure in GHS, all derived from the monthly charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRisk {
    pub monthly_risk_ghs: f64,
    pub annual_risk_ghs: f64,
    pub customer_lifetime_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub churn_probability: f64,
    pub risk_level: RiskLevel,
    pub confidence: Confidence,
    pub recommended_action: RecommendedAction,
    pub priority: Priority,
    pub next_steps: Vec<String>,
    pub estimated_revenue_risk: RevenueRisk,
    pub intervention_timeline: String,
    pub success_probability: f64,
}

/// Per-customer result of one batch run.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Scored {
        customer_id: String,
        assessment: RiskAssessment,
    },
    Failed {
        customer_id: String,
        reason: String,
    },
}

impl PredictionOutcome {
    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match self {
            PredictionOutcome::Scored { assessment, .. } => Some(assessment),
            PredictionOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub very_low: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_customers: usize,
    pub successful_predictions: usize,
    pub failed_predictions: usize,
    /// Percent, rounded to one decimal place.
    pub success_rate: f64,
    /// Mean over successful outcomes, rounded to three decimal places.
    pub average_churn_probability: f64,
    pub risk_distribution: RiskDistribution,
    /// Sum of annual_risk_ghs over successes, rounded to two decimal places.
    pub total_annual_revenue_at_risk: f64,
    pub high_risk_customers: usize,
    pub customers_needing_immediate_attention: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_from_file_rows_name_the_line() {
        let issue = ValidationIssue {
            row: 3,
            field: "age",
            message: "must be between 18 and 100".to_string(),
        };
        assert_eq!(issue.to_string(), "row 3: age: must be between 18 and 100");
    }

    #[test]
    fn issues_without_a_source_line_drop_the_row_prefix() {
        let issue = ValidationIssue {
            row: 0,
            field: "age",
            message: "must be between 18 and 100".to_string(),
        };
        assert_eq!(issue.to_string(), "age: must be between 18 and 100");
    }
}
