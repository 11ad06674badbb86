//! Record normalization pipeline
//!
//! Turns a loosely structured applicant record into the exact feature row the
//! classifier was trained on. Missing or unrecognized categorical data never
//! fails a request; only structurally invalid input does.

use super::schema::parse_number;
use super::{FeatureSchema, FeatureVector, PreprocessingConfig};
use crate::error::{Result, RiskError};
use serde_json::{Map, Value};
use tracing::debug;

/// Canonical monthly income feature
pub const INCOME_COLUMN: &str = "NETMONTHLYINCOME";
/// Monthly income as sent by the loan application form
pub const INCOME_ALIAS: &str = "monthlyIncome";
/// Free-form gender as sent by the loan application form
pub const GENDER_ALIAS: &str = "gender";
pub const GENDER_COLUMN: &str = "GENDER";
pub const EDUCATION_COLUMN: &str = "EDUCATION";
pub const MARITAL_STATUS_COLUMN: &str = "MARITALSTATUS";
pub const LAST_PRODUCT_COLUMN: &str = "last_prod_enq2";
pub const FIRST_PRODUCT_COLUMN: &str = "first_prod_enq2";

/// Columns expanded into `{column}_{value}` indicators
pub const CATEGORICAL_COLUMNS: [&str; 4] = [
    MARITAL_STATUS_COLUMN,
    GENDER_COLUMN,
    LAST_PRODUCT_COLUMN,
    FIRST_PRODUCT_COLUMN,
];

/// Maps raw applicant records onto a fixed feature schema
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessingConfig,
    schema: FeatureSchema,
}

impl Preprocessor {
    /// Create a preprocessor with the default domain policy
    pub fn new(schema: FeatureSchema) -> Self {
        Self::with_config(schema, PreprocessingConfig::default())
    }

    /// Create a preprocessor with custom configuration
    pub fn with_config(schema: FeatureSchema, config: PreprocessingConfig) -> Self {
        Self { config, schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Normalize a request payload, which must be a JSON object
    pub fn normalize(&self, payload: &Value) -> Result<FeatureVector<'_>> {
        match payload {
            Value::Object(record) => self.normalize_record(record),
            other => Err(RiskError::InvalidInput(format!(
                "payload must be a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Normalize a record and align it to the feature schema
    pub fn normalize_record(&self, record: &Map<String, Value>) -> Result<FeatureVector<'_>> {
        let row = self.prepare(record)?;
        self.schema.align(&row)
    }

    /// Apply aliasing, defaults, ordinal mapping and one-hot expansion, without
    /// aligning to the schema
    pub fn prepare(&self, record: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut row = record.clone();
        alias_income(&mut row);
        normalize_gender(&mut row);
        self.inject_defaults(&mut row);
        self.map_education(&mut row);
        expand_categoricals(&mut row)?;
        Ok(row)
    }

    fn inject_defaults(&self, row: &mut Map<String, Value>) {
        if is_empty(row.get(EDUCATION_COLUMN)) {
            row.insert(
                EDUCATION_COLUMN.to_string(),
                Value::String(self.config.education_default.clone()),
            );
        }

        let marital = match row.get(MARITAL_STATUS_COLUMN) {
            Some(value) if !value.is_null() => capitalize(render_scalar(value).trim()),
            _ => self.config.marital_status_default.clone(),
        };
        row.insert(MARITAL_STATUS_COLUMN.to_string(), Value::String(marital));

        for (column, default) in [
            (LAST_PRODUCT_COLUMN, &self.config.last_product_default),
            (FIRST_PRODUCT_COLUMN, &self.config.first_product_default),
        ] {
            if is_empty(row.get(column)) {
                row.insert(column.to_string(), Value::String(default.clone()));
            }
        }
    }

    fn map_education(&self, row: &mut Map<String, Value>) {
        let Some(value) = row.get_mut(EDUCATION_COLUMN) else {
            return;
        };
        let level = value.as_str().and_then(|label| self.config.education_level(label));
        if level.is_none() {
            debug!(education = %value, "Education outside ordinal table, leaving it missing");
        }
        *value = level.map(Value::from).unwrap_or(Value::Null);
    }
}

/// Copy the form's income field into the canonical column, coercing to a number
fn alias_income(row: &mut Map<String, Value>) {
    if row.contains_key(INCOME_COLUMN) {
        return;
    }
    if let Some(raw) = row.get(INCOME_ALIAS) {
        let income = coerce_numeric(raw).unwrap_or(0.0);
        row.insert(INCOME_COLUMN.to_string(), Value::from(income));
    }
}

/// Map a free-form gender onto the single-letter code used in training.
///
/// A caller-supplied `GENDER` always wins; unrecognized values leave it unset.
fn normalize_gender(row: &mut Map<String, Value>) {
    let code = match row.get(GENDER_ALIAS) {
        Some(value) if !value.is_null() => gender_code(&render_scalar(value)),
        _ => None,
    };
    if let Some(code) = code {
        if !row.contains_key(GENDER_COLUMN) {
            row.insert(GENDER_COLUMN.to_string(), Value::String(code.to_string()));
        }
    }
}

/// Single-letter gender code, `None` for anything unrecognized
pub fn gender_code(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "male" | "m" => Some("M"),
        "female" | "f" => Some("F"),
        other => {
            debug!(gender = %other, "Unrecognized gender value");
            None
        }
    }
}

/// Replace each present categorical column with its indicator column
fn expand_categoricals(row: &mut Map<String, Value>) -> Result<()> {
    for column in CATEGORICAL_COLUMNS {
        let Some(value) = row.remove(column) else {
            continue;
        };
        match value {
            Value::Null => {}
            Value::Array(_) | Value::Object(_) => {
                return Err(RiskError::NonScalarFeature(column.to_string()));
            }
            scalar => {
                row.insert(format!("{}_{}", column, render_scalar(&scalar)), Value::from(1));
            }
        }
    }
    Ok(())
}

fn is_empty(value: Option<&Value>) -> bool {
    value.map_or(true, Value::is_null)
}

/// String form of a scalar as it appears in indicator column names
fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Lenient numeric coercion; `None` when the value cannot be read as a number
fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Upper-case the first character, lower-case the rest
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            [
                INCOME_COLUMN,
                EDUCATION_COLUMN,
                "MARITALSTATUS_Married",
                "MARITALSTATUS_Single",
                "GENDER_F",
                "GENDER_M",
                "last_prod_enq2_PL",
                "last_prod_enq2_CC",
                "first_prod_enq2_PL",
                "first_prod_enq2_others",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
        .unwrap()
    }

    fn prepare(record: Value) -> Map<String, Value> {
        Preprocessor::new(schema())
            .prepare(record.as_object().unwrap())
            .unwrap()
    }

    #[test]
    fn test_income_alias_coerces_string() {
        let row = prepare(json!({"monthlyIncome": "50000"}));
        assert_eq!(row[INCOME_COLUMN].as_f64(), Some(50000.0));
    }

    #[test]
    fn test_income_alias_invalid_becomes_zero() {
        let row = prepare(json!({"monthlyIncome": "lots"}));
        assert_eq!(row[INCOME_COLUMN].as_f64(), Some(0.0));

        let row = prepare(json!({"monthlyIncome": null}));
        assert_eq!(row[INCOME_COLUMN].as_f64(), Some(0.0));

        for overflow in ["1e400", "inf", "NaN"] {
            let row = prepare(json!({ "monthlyIncome": overflow }));
            assert_eq!(row[INCOME_COLUMN].as_f64(), Some(0.0), "income {}", overflow);
        }
    }

    #[test]
    fn test_canonical_income_wins_over_alias() {
        let row = prepare(json!({"NETMONTHLYINCOME": 1200, "monthlyIncome": 99999}));
        assert_eq!(row[INCOME_COLUMN].as_f64(), Some(1200.0));
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(gender_code("Male"), Some("M"));
        assert_eq!(gender_code(" male "), Some("M"));
        assert_eq!(gender_code("M"), Some("M"));
        assert_eq!(gender_code("Female"), Some("F"));
        assert_eq!(gender_code("f"), Some("F"));
        assert_eq!(gender_code("non-binary"), None);
        assert_eq!(gender_code(""), None);
    }

    #[test]
    fn test_gender_expands_to_indicator() {
        let row = prepare(json!({"gender": "Female"}));
        assert_eq!(row.get("GENDER_F"), Some(&json!(1)));
        assert!(!row.contains_key("gender_F"));
        assert!(!row.contains_key(GENDER_COLUMN));
    }

    #[test]
    fn test_unknown_gender_leaves_field_unset() {
        let row = prepare(json!({"gender": "prefer not to say"}));
        assert!(!row.keys().any(|k| k.starts_with("GENDER")));
    }

    #[test]
    fn test_explicit_gender_column_is_kept() {
        let row = prepare(json!({"gender": "male", "GENDER": "F"}));
        assert_eq!(row.get("GENDER_F"), Some(&json!(1)));
        assert!(!row.contains_key("GENDER_M"));
    }

    #[test]
    fn test_defaults_injected_when_absent() {
        let row = prepare(json!({}));
        assert_eq!(row[EDUCATION_COLUMN], json!(3));
        assert_eq!(row.get("MARITALSTATUS_Single"), Some(&json!(1)));
        assert_eq!(row.get("last_prod_enq2_PL"), Some(&json!(1)));
        assert_eq!(row.get("first_prod_enq2_PL"), Some(&json!(1)));
    }

    #[test]
    fn test_defaults_injected_when_null() {
        let row = prepare(json!({
            "EDUCATION": null,
            "MARITALSTATUS": null,
            "last_prod_enq2": null,
            "first_prod_enq2": null,
        }));
        assert_eq!(row[EDUCATION_COLUMN], json!(3));
        assert_eq!(row.get("MARITALSTATUS_Single"), Some(&json!(1)));
        assert_eq!(row.get("last_prod_enq2_PL"), Some(&json!(1)));
        assert_eq!(row.get("first_prod_enq2_PL"), Some(&json!(1)));
    }

    #[test]
    fn test_marital_status_is_trimmed_and_capitalized() {
        let row = prepare(json!({"MARITALSTATUS": "  mARRIED "}));
        assert_eq!(row.get("MARITALSTATUS_Married"), Some(&json!(1)));
    }

    #[test]
    fn test_custom_defaults() {
        let config = PreprocessingConfig::default()
            .with_marital_status_default("Married")
            .with_product_defaults("CC", "others");
        let pre = Preprocessor::with_config(schema(), config);
        let row = pre.prepare(&Map::new()).unwrap();
        assert_eq!(row.get("MARITALSTATUS_Married"), Some(&json!(1)));
        assert_eq!(row.get("last_prod_enq2_CC"), Some(&json!(1)));
        assert_eq!(row.get("first_prod_enq2_others"), Some(&json!(1)));
    }

    #[test]
    fn test_education_ordinal_mapping() {
        let row = prepare(json!({"EDUCATION": "POST-GRADUATE"}));
        assert_eq!(row[EDUCATION_COLUMN], json!(4));

        let row = prepare(json!({"EDUCATION": "PHD"}));
        assert_eq!(row[EDUCATION_COLUMN], Value::Null);

        let row = prepare(json!({"EDUCATION": 3}));
        assert_eq!(row[EDUCATION_COLUMN], Value::Null);
    }

    #[test]
    fn test_numeric_categorical_rendering() {
        let row = prepare(json!({"last_prod_enq2": 5, "first_prod_enq2": 2.5}));
        assert_eq!(row.get("last_prod_enq2_5"), Some(&json!(1)));
        assert_eq!(row.get("first_prod_enq2_2.5"), Some(&json!(1)));
    }

    #[test]
    fn test_nested_categorical_is_rejected() {
        let pre = Preprocessor::new(schema());
        let record = json!({"last_prod_enq2": ["PL"]});
        let err = pre.prepare(record.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, RiskError::NonScalarFeature(_)));
    }

    #[test]
    fn test_normalize_requires_object() {
        let pre = Preprocessor::new(schema());
        let err = pre.normalize(&json!([{"monthlyIncome": 1}])).unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_normalize_aligns_to_schema() {
        let pre = Preprocessor::new(schema());
        let fv = pre
            .normalize(&json!({"monthlyIncome": "50000", "gender": "Female", "EDUCATION": "GRADUATE", "extra": "dropped"}))
            .unwrap();

        assert_eq!(fv.columns(), pre.schema().columns());
        assert_eq!(fv.get(INCOME_COLUMN), Some(Some(50000.0)));
        assert_eq!(fv.get(EDUCATION_COLUMN), Some(Some(3.0)));
        assert_eq!(fv.get("GENDER_F"), Some(Some(1.0)));
        assert_eq!(fv.get("GENDER_M"), Some(Some(0.0)));
        assert_eq!(fv.get("MARITALSTATUS_Single"), Some(Some(1.0)));
        assert_eq!(fv.get("extra"), None);
    }

    #[test]
    fn test_unknown_education_is_missing_after_alignment() {
        let pre = Preprocessor::new(schema());
        let fv = pre.normalize(&json!({"EDUCATION": "PHD"})).unwrap();
        assert_eq!(fv.get(EDUCATION_COLUMN), Some(None));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("married"), "Married");
        assert_eq!(capitalize("SINGLE"), "Single");
        assert_eq!(capitalize(""), "");
    }
}
