//! Applicant record preprocessing
//!
//! Reconciles an arbitrary key/value record with the feature schema the
//! classifier was trained on:
//! - Field-name aliasing for form inputs (`monthlyIncome` -> `NETMONTHLYINCOME`)
//! - Categorical normalization (gender codes, marital status casing)
//! - Domain defaults for absent categoricals
//! - Ordinal encoding of education
//! - One-hot expansion of categorical columns
//! - Reindexing to the trained schema

mod config;
mod pipeline;
mod schema;

pub use config::PreprocessingConfig;
pub use pipeline::{
    gender_code, Preprocessor, CATEGORICAL_COLUMNS, EDUCATION_COLUMN, GENDER_COLUMN,
    INCOME_ALIAS, INCOME_COLUMN, MARITAL_STATUS_COLUMN,
};
pub use schema::{FeatureSchema, FeatureVector};
