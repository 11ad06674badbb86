//! Feature schema and the schema-aligned feature vector

use crate::error::{Result, RiskError};
use ndarray::{Array1, Array2, Axis};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Ordered column names the classifier was trained on
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated column lists
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(RiskError::InvalidArtifact(
                "feature list is empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(RiskError::InvalidArtifact(format!(
                    "duplicate feature column '{}'",
                    name
                )));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reindex a row to this schema.
    ///
    /// Columns absent from the row become `0.0`, columns outside the schema are
    /// dropped, and cells that cannot be read as numbers become missing.
    pub fn align(&self, row: &Map<String, Value>) -> Result<FeatureVector<'_>> {
        let mut values = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let cell = match row.get(name) {
                None => Some(0.0),
                Some(value) => numeric_cell(name, value)?,
            };
            values.push(cell);
        }
        Ok(FeatureVector { schema: self, values })
    }
}

/// Interpret one cell of a schema column as a number
fn numeric_cell(column: &str, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => {
            let parsed = parse_number(s);
            if parsed.is_none() {
                tracing::debug!(column = %column, value = %s, "Non-numeric feature value treated as missing");
            }
            Ok(parsed)
        }
        Value::Array(_) | Value::Object(_) => Err(RiskError::NonScalarFeature(column.to_string())),
    }
}

/// Parse a numeric string; overflow, `inf` and `NaN` spellings count as non-numeric
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A single row aligned to a [`FeatureSchema`].
///
/// `None` marks a missing value; it reaches the classifier as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<'a> {
    schema: &'a FeatureSchema,
    values: Vec<Option<f64>>,
}

impl<'a> FeatureVector<'a> {
    pub fn schema(&self) -> &'a FeatureSchema {
        self.schema
    }

    pub fn columns(&self) -> &'a [String] {
        self.schema.columns()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Value of a named column; outer `None` when the column is not in the schema
    pub fn get(&self, name: &str) -> Option<Option<f64>> {
        self.schema
            .columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values[idx])
    }

    /// Single-row matrix for the classifier, missing values as NaN
    pub fn to_array(&self) -> Array2<f64> {
        let row: Array1<f64> = self.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        row.insert_axis(Axis(0))
    }

    /// Render back into a record, missing values as null
    pub fn to_record(&self) -> Map<String, Value> {
        self.columns()
            .iter()
            .zip(&self.values)
            .map(|(name, value)| {
                let json = value
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                (name.clone(), json)
            })
            .collect()
    }
}
