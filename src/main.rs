use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod error;
mod export;
mod models;
mod parse;
mod pipeline;
mod remote;
mod schema;
mod score;
mod validate;

use error::PipelineError;
use models::{BatchSummary, CustomerRecord, PredictionOutcome, RiskAssessment};
use parse::NumericFallback;
use remote::{PredictionClient, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(name = "churn-risk-pipeline")]
#[command(about = "Customer churn risk scoring over usage data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a single customer from field flags
    Predict {
        #[arg(long)]
        customer_id: String,
        #[arg(long, default_value_t = 0.0)]
        monthly_sms: f64,
        #[arg(long, default_value_t = 0.0)]
        monthly_minutes: f64,
        #[arg(long, default_value_t = 0.0)]
        monthly_data_gb: f64,
        #[arg(long)]
        monthly_charge: f64,
        #[arg(long, default_value_t = 0.0)]
        late_payments: f64,
        #[arg(long, default_value_t = 0.0)]
        is_fraud: f64,
        #[arg(long, default_value_t = 0.0)]
        international_calls: f64,
        #[arg(long, default_value_t = 0.0)]
        device_age_months: f64,
        #[arg(long, default_value_t = 0.0)]
        customer_service_calls: f64,
        #[arg(long, default_value = "monthly")]
        contract_type: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long)]
        age: f64,
        #[arg(long, default_value_t = 0.0)]
        account_length_months: f64,
        /// Prediction service URL; omit to use the local heuristic
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
        /// Pin the scoring jitter for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the full pipeline over a CSV file
    Batch {
        #[arg(long)]
        csv: PathBuf,
        /// Prediction service URL; omit to use the local heuristic
        #[arg(long)]
        endpoint: Option<String>,
        /// Where to write the results CSV (defaults to a dated filename)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Fail the batch on any non-numeric cell instead of reading it as 0
        #[arg(long)]
        strict: bool,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            customer_id,
            monthly_sms,
            monthly_minutes,
            monthly_data_gb,
            monthly_charge,
            late_payments,
            is_fraud,
            international_calls,
            device_age_months,
            customer_service_calls,
            contract_type,
            city,
            age,
            account_length_months,
            endpoint,
            timeout_secs,
            seed,
        } => {
            // Row 0: form-supplied input has no source line to report.
            let mut record = CustomerRecord::new(0);
            record.set("customer_id", customer_id, None);
            record.set("contract_type", contract_type, None);
            record.set("city", city, None);
            for (field, value) in [
                ("monthly_sms", monthly_sms),
                ("monthly_minutes", monthly_minutes),
                ("monthly_data_gb", monthly_data_gb),
                ("monthly_charge", monthly_charge),
                ("late_payments", late_payments),
                ("is_fraud", is_fraud),
                ("international_calls", international_calls),
                ("device_age_months", device_age_months),
                ("customer_service_calls", customer_service_calls),
                ("age", age),
                ("account_length_months", account_length_months),
            ] {
                record.set(field, value.to_string(), Some(value));
            }

            let issues = validate::validate(std::slice::from_ref(&record));
            if !issues.is_empty() {
                report_issues(&issues);
                anyhow::bail!("record failed validation");
            }

            match endpoint {
                Some(url) => {
                    let client =
                        PredictionClient::new(&url, Duration::from_secs(timeout_secs))?;
                    let prediction = client.predict_single(&record).await?;
                    println!(
                        "Prediction for {} (model {}, {} features, {}):",
                        prediction.customer_id,
                        prediction.model_version,
                        prediction.features_used,
                        prediction.timestamp
                    );
                    print_assessment(&prediction.assessment);
                }
                None => {
                    let mut rng = seeded_rng(seed);
                    let assessment = score::score(&record, &mut rng);
                    println!("Heuristic assessment for {}:", record.customer_id());
                    print_assessment(&assessment);
                }
            }
        }
        Commands::Batch {
            csv,
            endpoint,
            out,
            strict,
            timeout_secs,
            seed,
        } => {
            let text = std::fs::read_to_string(&csv)
                .with_context(|| format!("failed to read {}", csv.display()))?;
            let fallback = if strict {
                NumericFallback::Strict
            } else {
                NumericFallback::Zero
            };

            let (outcomes, summary, warnings) = match endpoint {
                Some(url) => {
                    let parsed = parse::parse(&text, fallback).map_err(report_validation)?;
                    let issues = validate::validate(&parsed.records);
                    if !issues.is_empty() {
                        report_issues(&issues);
                        anyhow::bail!("batch failed validation");
                    }
                    let client =
                        PredictionClient::new(&url, Duration::from_secs(timeout_secs))?;
                    let batch = client.predict_batch(&parsed.records).await?;
                    println!(
                        "Batch {} scored by model {} at {}.",
                        batch.batch_id, batch.model_version, batch.timestamp
                    );
                    let outcomes: Vec<PredictionOutcome> =
                        batch.outcomes.into_iter().map(Into::into).collect();
                    (outcomes, batch.summary, parsed.warnings)
                }
                None => {
                    let mut rng = seeded_rng(seed);
                    let result = pipeline::run_local(&text, fallback, &mut rng)
                        .map_err(report_validation)?;
                    (result.outcomes, result.summary, result.warnings)
                }
            };

            for warning in &warnings {
                println!("Warning: {warning}");
            }
            print_summary(&summary);

            let out = out.unwrap_or_else(|| {
                PathBuf::from(export::export_filename(Utc::now().date_naive()))
            });
            let rendered = export::to_csv(&outcomes)?;
            std::fs::write(&out, rendered)?;
            println!("Results written to {}.", out.display());
        }
    }

    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Print every validation issue before surfacing the error; other pipeline
/// errors pass through unchanged.
fn report_validation(err: PipelineError) -> anyhow::Error {
    if let PipelineError::ValidationFailed(issues) = &err {
        report_issues(issues);
    }
    anyhow::Error::new(err)
}

fn report_issues(issues: &[models::ValidationIssue]) {
    println!("Validation issues:");
    for issue in issues {
        println!("- {issue}");
    }
}

fn print_assessment(assessment: &RiskAssessment) {
    println!(
        "- churn probability {:.1}% ({} risk, {} confidence)",
        assessment.churn_probability * 100.0,
        assessment.risk_level,
        assessment.confidence
    );
    println!(
        "- action {} at {} priority, within {}",
        assessment.recommended_action, assessment.priority, assessment.intervention_timeline
    );
    println!(
        "- revenue at risk GHS {:.2}/month, GHS {:.2}/year, lifetime value GHS {:.2}",
        assessment.estimated_revenue_risk.monthly_risk_ghs,
        assessment.estimated_revenue_risk.annual_risk_ghs,
        assessment.estimated_revenue_risk.customer_lifetime_value
    );
    println!(
        "- retention success probability {:.0}%",
        assessment.success_probability * 100.0
    );
    for step in &assessment.next_steps {
        println!("  * {step}");
    }
}

fn print_summary(summary: &BatchSummary) {
    println!("Batch summary:");
    println!(
        "- {} customers, {} scored, {} failed ({:.1}% success)",
        summary.total_customers,
        summary.successful_predictions,
        summary.failed_predictions,
        summary.success_rate
    );
    println!(
        "- average churn probability {:.3}",
        summary.average_churn_probability
    );
    let dist = &summary.risk_distribution;
    println!(
        "- risk mix: HIGH {} / MEDIUM {} / LOW {} / VERY_LOW {} / ERROR {}",
        dist.high, dist.medium, dist.low, dist.very_low, dist.error
    );
    println!(
        "- annual revenue at risk GHS {:.2}",
        summary.total_annual_revenue_at_risk
    );
    println!(
        "- {} high-risk customers, {} needing immediate attention",
        summary.high_risk_customers, summary.customers_needing_immediate_attention
    );
}
