pub const CONTRACT_TYPES: [&str; 4] = ["monthly", "annual", "prepaid", "postpaid"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Decimal,
    Enum(&'static [&'static str]),
    Text,
}

impl FieldType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Decimal)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
}

/// The fixed customer-usage schema. Column order matches the upstream CSV
/// template; header matching is case-insensitive.
pub static FIELDS: [FieldSpec; 14] = [
    FieldSpec { name: "customer_id", field_type: FieldType::Text, required: true },
    FieldSpec { name: "monthly_sms", field_type: FieldType::Integer, required: true },
    FieldSpec { name: "monthly_minutes", field_type: FieldType::Decimal, required: true },
    FieldSpec { name: "monthly_data_gb", field_type: FieldType::Decimal, required: true },
    FieldSpec { name: "monthly_charge", field_type: FieldType::Decimal, required: true },
    FieldSpec { name: "late_payments", field_type: FieldType::Integer, required: true },
    FieldSpec { name: "is_fraud", field_type: FieldType::Integer, required: true },
    FieldSpec { name: "international_calls", field_type: FieldType::Integer, required: true },
    FieldSpec { name: "device_age_months", field_type: FieldType::Integer, required: true },
    FieldSpec { name: "customer_service_calls", field_type: FieldType::Integer, required: true },
    FieldSpec {
        name: "contract_type",
        field_type: FieldType::Enum(&CONTRACT_TYPES),
        required: true,
    },
    FieldSpec { name: "city", field_type: FieldType::Text, required: false },
    FieldSpec { name: "age", field_type: FieldType::Integer, required: true },
    FieldSpec { name: "account_length_months", field_type: FieldType::Integer, required: true },
];

pub const FIELD_COUNT: usize = 14;

pub fn required_fields() -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(|spec| spec.required)
}

pub fn is_valid_contract_type(value: &str) -> bool {
    CONTRACT_TYPES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_fourteen_fields() {
        assert_eq!(FIELD_COUNT, 14);
    }

    #[test]
    fn city_is_the_only_optional_field() {
        let optional: Vec<&str> = FIELDS
            .iter()
            .filter(|spec| !spec.required)
            .map(|spec| spec.name)
            .collect();
        assert_eq!(optional, vec!["city"]);
    }

    #[test]
    fn contract_type_matches_case_insensitively() {
        assert!(is_valid_contract_type("monthly"));
        assert!(is_valid_contract_type("ANNUAL"));
        assert!(is_valid_contract_type(" Prepaid "));
        assert!(!is_valid_contract_type("weekly"));
    }

    #[test]
    fn required_fields_excludes_city() {
        assert_eq!(required_fields().count(), 13);
    }
}
