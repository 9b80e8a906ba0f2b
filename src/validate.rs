use crate::models::{CustomerRecord, ValidationIssue};
use crate::schema;

/// Check every record against the schema constraints. Exhaustive: all issues
/// across the batch are collected, none short-circuit. Row numbers are the
/// source line numbers, so the first data row reports as row 2.
pub fn validate(records: &[CustomerRecord]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for record in records {
        for spec in schema::required_fields() {
            let raw = record.raw(spec.name);
            if raw.is_empty() {
                issues.push(issue(record, spec.name, "is required"));
                continue;
            }
            if spec.field_type.is_numeric() && record.number(spec.name).is_none() {
                issues.push(issue(record, spec.name, "must be a number"));
                continue;
            }
            check_range(record, spec, &mut issues);
        }
    }

    issues
}

fn check_range(
    record: &CustomerRecord,
    spec: &schema::FieldSpec,
    issues: &mut Vec<ValidationIssue>,
) {
    match spec.name {
        "age" => {
            let age = record.coerced("age");
            if !(18.0..=100.0).contains(&age) {
                issues.push(issue(record, "age", "must be between 18 and 100"));
            }
        }
        "monthly_charge" => {
            if record.coerced("monthly_charge") < 0.0 {
                issues.push(issue(record, "monthly_charge", "must not be negative"));
            }
        }
        "is_fraud" => {
            let flag = record.coerced("is_fraud");
            if flag != 0.0 && flag != 1.0 {
                issues.push(issue(record, "is_fraud", "must be 0 or 1"));
            }
        }
        "contract_type" => {
            let value = record.raw("contract_type");
            if !schema::is_valid_contract_type(value) {
                issues.push(issue(
                    record,
                    "contract_type",
                    "must be one of monthly, annual, prepaid, postpaid",
                ));
            }
        }
        _ => {}
    }
}

fn issue(record: &CustomerRecord, field: &'static str, message: &str) -> ValidationIssue {
    ValidationIssue {
        row: record.row,
        field,
        message: message.to_string(),
    }
}
