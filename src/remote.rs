use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{BatchSummary, CustomerRecord, PredictionOutcome, RiskAssessment};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the external churn prediction service. One call carries
/// either a single record or the entire validated batch; there is no
/// per-record fan-out and no automatic retry.
#[derive(Clone)]
pub struct PredictionClient {
    endpoint: Url,
    http: Client,
}

#[derive(Debug, Deserialize)]
pub struct SinglePrediction {
    pub customer_id: String,
    #[serde(alias = "prediction")]
    pub assessment: RiskAssessment,
    pub timestamp: DateTime<Utc>,
    pub model_version: String,
    pub features_used: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RemoteOutcome {
    Scored {
        customer_id: String,
        #[serde(alias = "prediction")]
        assessment: RiskAssessment,
    },
    Failed {
        customer_id: String,
        #[serde(alias = "error")]
        reason: String,
    },
}

impl From<RemoteOutcome> for PredictionOutcome {
    fn from(outcome: RemoteOutcome) -> Self {
        match outcome {
            RemoteOutcome::Scored {
                customer_id,
                assessment,
            } => PredictionOutcome::Scored {
                customer_id,
                assessment,
            },
            RemoteOutcome::Failed {
                customer_id,
                reason,
            } => PredictionOutcome::Failed {
                customer_id,
                reason,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchPrediction {
    pub batch_id: Uuid,
    pub summary: BatchSummary,
    pub outcomes: Vec<RemoteOutcome>,
    pub timestamp: DateTime<Utc>,
    pub model_version: String,
}

impl PredictionClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, PipelineError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| PipelineError::Remote(format!("invalid endpoint: {err}")))?;
        let http = Client::builder()
            .timeout(timeout.max(Duration::from_secs(1)))
            .build()
            .map_err(|err| PipelineError::Remote(format!("client setup: {err}")))?;
        Ok(PredictionClient { endpoint, http })
    }

    pub async fn predict_single(
        &self,
        record: &CustomerRecord,
    ) -> Result<SinglePrediction, PipelineError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&record.to_payload())
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(response.json::<SinglePrediction>().await?)
    }

    /// One request for the whole validated batch. A failure here fails the
    /// batch; there is no partial aggregation.
    pub async fn predict_batch(
        &self,
        records: &[CustomerRecord],
    ) -> Result<BatchPrediction, PipelineError> {
        let payload = serde_json::json!({
            "records": records.iter().map(CustomerRecord::to_payload).collect::<Vec<_>>(),
        });
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(response.json::<BatchPrediction>().await?)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!(%status, "prediction service returned an error status");
        Err(PipelineError::Remote(format!(
            "service responded with status {status}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, RiskLevel};

    #[test]
    fn single_prediction_deserializes() {
        let body = serde_json::json!({
            "customer_id": "CUST_001",
            "prediction": {
                "churn_probability": 0.82,
                "risk_level": "HIGH",
                "confidence": "HIGH",
                "recommended_action": "IMMEDIATE_INTERVENTION",
                "priority": "CRITICAL",
                "next_steps": ["Send targeted retention offer"],
                "estimated_revenue_risk": {
                    "monthly_risk_ghs": 45.0,
                    "annual_risk_ghs": 540.0,
                    "customer_lifetime_value": 2160.0
                },
                "intervention_timeline": "1-2 days",
                "success_probability": 0.6
            },
            "timestamp": "2026-08-24T10:00:00Z",
            "model_version": "atghana-v1",
            "features_used": 14
        });

        let prediction: SinglePrediction = serde_json::from_value(body).unwrap();
        assert_eq!(prediction.customer_id, "CUST_001");
        assert_eq!(prediction.assessment.risk_level, RiskLevel::High);
        assert_eq!(prediction.features_used, 14);
        assert_eq!(prediction.model_version, "atghana-v1");
    }

    #[test]
    fn batch_prediction_deserializes_mixed_outcomes() {
        let body = serde_json::json!({
            "batch_id": "7f2c7e4a-0f3d-4a8a-b1d1-0f6a1a2b3c4d",
            "summary": {
                "total_customers": 2,
                "successful_predictions": 1,
                "failed_predictions": 1,
                "success_rate": 50.0,
                "average_churn_probability": 0.1,
                "risk_distribution": {
                    "high": 0, "medium": 0, "low": 0, "very_low": 1, "error": 1
                },
                "total_annual_revenue_at_risk": 240.0,
                "high_risk_customers": 0,
                "customers_needing_immediate_attention": 0
            },
            "outcomes": [
                {
                    "customer_id": "CUST_001",
                    "prediction": {
                        "churn_probability": 0.1,
                        "risk_level": "VERY_LOW",
                        "confidence": "MEDIUM",
                        "recommended_action": "PROACTIVE_ENGAGEMENT",
                        "priority": "LOW",
                        "next_steps": [],
                        "estimated_revenue_risk": {
                            "monthly_risk_ghs": 20.0,
                            "annual_risk_ghs": 240.0,
                            "customer_lifetime_value": 960.0
                        },
                        "intervention_timeline": "3-7 days",
                        "success_probability": 0.8
                    }
                },
                { "customer_id": "CUST_002", "error": "feature vector incomplete" }
            ],
            "timestamp": "2026-08-24T10:00:00Z",
            "model_version": "atghana-v1"
        });

        let batch: BatchPrediction = serde_json::from_value(body).unwrap();
        assert_eq!(batch.outcomes.len(), 2);
        assert_eq!(batch.summary.risk_distribution.very_low, 1);

        let outcomes: Vec<PredictionOutcome> =
            batch.outcomes.into_iter().map(Into::into).collect();
        match &outcomes[0] {
            PredictionOutcome::Scored { assessment, .. } => {
                assert_eq!(assessment.risk_level, RiskLevel::VeryLow);
                assert_eq!(assessment.priority, Priority::Low);
            }
            other => panic!("expected scored outcome, got {other:?}"),
        }
        match &outcomes[1] {
            PredictionOutcome::Failed { reason, .. } => {
                assert_eq!(reason, "feature vector incomplete");
            }
            other => panic!("expected failed outcome, got {other:?}"),
        }
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = PredictionClient::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(PipelineError::Remote(_))));
    }
}
