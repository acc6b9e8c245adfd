//! redb table definitions for persisted model artifacts.
//!
//! One table, `&str` keys, `&[u8]` values holding JSON.

use redb::TableDefinition;

/// Model artifacts keyed by artifact name.
pub const ARTIFACTS: TableDefinition<&str, &[u8]> = TableDefinition::new("artifacts");

/// Key of the regression weights record.
pub const MODEL_KEY: &str = "model";

/// Key of the standardization scaler record.
pub const SCALER_KEY: &str = "scaler";
