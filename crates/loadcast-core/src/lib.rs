pub mod config;
pub mod features;
pub mod timestamp;
pub mod types;

pub use config::LoadcastConfig;
pub use features::{FEATURE_COUNT, FeatureVector, TimeFeatureEncoder};
pub use timestamp::{ParseError, Timestamp};
pub use types::*;
