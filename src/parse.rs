use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::warn;

use crate::error::PipelineError;
use crate::models::{CustomerRecord, ParseWarning};
use crate::schema;

/// What to do when a numeric cell does not parse. `Zero` keeps the batch
/// moving and the value reads as 0 downstream; `Strict` fails the batch on
/// the first bad cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericFallback {
    #[default]
    Zero,
    Strict,
}

#[derive(Debug)]
pub struct ParseOutput {
    pub records: Vec<CustomerRecord>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse delimited text into customer records.
///
/// The first row is the header, matched case-insensitively against the
/// schema. Rows with a different column count than the header are skipped
/// and reported as warnings. Input order is preserved.
pub fn parse(text: &str, fallback: NumericFallback) -> Result<ParseOutput, PipelineError> {
    if text.trim().is_empty() {
        return Err(PipelineError::NoDataRows);
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map(StringRecord::clone)
        .unwrap_or_default();

    let mut rows: Vec<(usize, Result<StringRecord, csv::Error>)> = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let line = match &result {
            Ok(record) => record.position().map(|p| p.line() as usize),
            Err(err) => err.position().map(|p| p.line() as usize),
        };
        rows.push((line.unwrap_or(index + 2), result));
    }

    if rows.is_empty() {
        return Err(PipelineError::NoDataRows);
    }

    let columns = header_columns(&headers)?;

    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for (row, result) in rows {
        let values = match result {
            Ok(values) => values,
            Err(err) => {
                push_warning(&mut warnings, row, format!("unreadable row: {err}"));
                continue;
            }
        };

        if values.len() != headers.len() {
            push_warning(
                &mut warnings,
                row,
                format!(
                    "expected {} columns, found {}; row skipped",
                    headers.len(),
                    values.len()
                ),
            );
            continue;
        }

        records.push(build_record(row, &values, &columns, fallback)?);
    }

    Ok(ParseOutput { records, warnings })
}

/// Resolve each schema field to its header column, case-insensitively.
/// Every missing required field is reported in one error.
fn header_columns(
    headers: &StringRecord,
) -> Result<Vec<(&'static schema::FieldSpec, Option<usize>)>, PipelineError> {
    let mut columns = Vec::with_capacity(schema::FIELD_COUNT);
    let mut missing = Vec::new();

    for spec in schema::FIELDS.iter() {
        let index = headers
            .iter()
            .position(|name| name.trim().eq_ignore_ascii_case(spec.name));
        if index.is_none() && spec.required {
            missing.push(spec.name.to_string());
        }
        columns.push((spec, index));
    }

    if missing.is_empty() {
        Ok(columns)
    } else {
        Err(PipelineError::Schema { missing })
    }
}

fn build_record(
    row: usize,
    values: &StringRecord,
    columns: &[(&'static schema::FieldSpec, Option<usize>)],
    fallback: NumericFallback,
) -> Result<CustomerRecord, PipelineError> {
    let mut record = CustomerRecord::new(row);

    for (spec, index) in columns {
        let raw = index
            .and_then(|i| values.get(i))
            .unwrap_or("")
            .trim()
            .to_string();

        let number = if spec.field_type.is_numeric() && !raw.is_empty() {
            match raw.parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => match fallback {
                    NumericFallback::Zero => None,
                    NumericFallback::Strict => {
                        return Err(PipelineError::NumericCoercion {
                            row,
                            field: spec.name,
                            value: raw,
                        })
                    }
                },
            }
        } else {
            None
        };

        record.set(spec.name, raw, number);
    }

    Ok(record)
}

fn push_warning(warnings: &mut Vec<ParseWarning>, row: usize, message: String) {
    warn!(row, "{}", message);
    warnings.push(ParseWarning { row, message });
}
