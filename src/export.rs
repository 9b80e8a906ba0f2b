use chrono::NaiveDate;

use crate::models::PredictionOutcome;

pub const COLUMNS: [&str; 11] = [
    "customer_id",
    "churn_probability",
    "risk_level",
    "confidence",
    "recommended_action",
    "priority",
    "monthly_risk_ghs",
    "annual_risk_ghs",
    "intervention_timeline",
    "success_probability",
    "status",
];

/// Render outcomes as CSV with a fixed column set. Error outcomes fill every
/// column with a fallback literal so downstream tooling sees a constant
/// width. Values containing the delimiter get standard CSV quoting.
pub fn to_csv(outcomes: &[PredictionOutcome]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;

    for outcome in outcomes {
        match outcome {
            PredictionOutcome::Scored {
                customer_id,
                assessment,
            } => {
                let churn = format_number(assessment.churn_probability);
                let monthly = format_number(assessment.estimated_revenue_risk.monthly_risk_ghs);
                let annual = format_number(assessment.estimated_revenue_risk.annual_risk_ghs);
                let success = format_number(assessment.success_probability);
                let row: [&str; 11] = [
                    customer_id,
                    &churn,
                    assessment.risk_level.as_str(),
                    assessment.confidence.as_str(),
                    assessment.recommended_action.as_str(),
                    assessment.priority.as_str(),
                    &monthly,
                    &annual,
                    &assessment.intervention_timeline,
                    &success,
                    "SUCCESS",
                ];
                writer.write_record(row)?;
            }
            PredictionOutcome::Failed { customer_id, .. } => {
                writer.write_record([
                    customer_id.as_str(),
                    "N/A",
                    "ERROR",
                    "N/A",
                    "MANUAL_REVIEW",
                    "HIGH",
                    "0",
                    "0",
                    "ASAP",
                    "0",
                    "ERROR",
                ])?;
            }
        }
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes).expect("writer emits UTF-8"))
}

/// Download filename for one export, e.g. `churn_predictions_2026-08-24.csv`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("churn_predictions_{}.csv", date.format("%Y-%m-%d"))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Confidence, Priority, RecommendedAction, RiskAssessment, RiskLevel, RevenueRisk,
    };

    fn scored(customer_id: &str, monthly: f64) -> PredictionOutcome {
        PredictionOutcome::Scored {
            customer_id: customer_id.to_string(),
            assessment: RiskAssessment {
                churn_probability: 0.95,
                risk_level: RiskLevel::High,
                confidence: Confidence::High,
                recommended_action: RecommendedAction::ImmediateIntervention,
                priority: Priority::Critical,
                next_steps: Vec::new(),
                estimated_revenue_risk: RevenueRisk {
                    monthly_risk_ghs: monthly,
                    annual_risk_ghs: monthly * 12.0,
                    customer_lifetime_value: monthly * 48.0,
                },
                intervention_timeline: "1-2 days".to_string(),
                success_probability: 0.6,
            },
        }
    }

    fn failed(customer_id: &str) -> PredictionOutcome {
        PredictionOutcome::Failed {
            customer_id: customer_id.to_string(),
            reason: "timeout".to_string(),
        }
    }

    #[test]
    fn header_has_fixed_column_order() {
        let text = to_csv(&[]).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "customer_id,churn_probability,risk_level,confidence,recommended_action,priority,monthly_risk_ghs,annual_risk_ghs,intervention_timeline,success_probability,status"
        );
    }

    #[test]
    fn scored_row_renders_all_fields() {
        let text = to_csv(&[scored("CUST_001", 45.0)]).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "CUST_001,0.95,HIGH,HIGH,IMMEDIATE_INTERVENTION,CRITICAL,45,540,1-2 days,0.6,SUCCESS"
        );
    }

    #[test]
    fn error_row_uses_fallback_literals() {
        let text = to_csv(&[failed("CUST_002")]).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "CUST_002,N/A,ERROR,N/A,MANUAL_REVIEW,HIGH,0,0,ASAP,0,ERROR");
    }

    #[test]
    fn every_row_has_the_same_width() {
        let text = to_csv(&[scored("CUST_001", 45.0), failed("CUST_002")]).unwrap();
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        for record in reader.records() {
            assert_eq!(record.unwrap().len(), COLUMNS.len());
        }
    }

    #[test]
    fn embedded_delimiters_are_quoted() {
        let text = to_csv(&[scored("ACME, Ltd", 45.0)]).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("\"ACME, Ltd\","));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "ACME, Ltd");
    }

    #[test]
    fn non_ascii_values_survive_export() {
        let text = to_csv(&[scored("KOFI_Ñ_001", 45.0)]).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("KOFI_Ñ_001,"));
    }

    #[test]
    fn round_trips_through_the_csv_reader() {
        let outcomes = vec![scored("CUST_001", 45.0), failed("CUST_002")];
        let text = to_csv(&outcomes).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let rows: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "CUST_001");
        assert_eq!(&rows[0][1], "0.95");
        assert_eq!(&rows[0][7], "540");
        assert_eq!(&rows[1][2], "ERROR");
        assert_eq!(&rows[1][10], "ERROR");
    }

    #[test]
    fn filename_embeds_the_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(export_filename(date), "churn_predictions_2026-08-24.csv");
    }
}
