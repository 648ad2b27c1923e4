pub mod config;
pub mod engine;
pub mod phrases;

pub use config::{AnalysisConfig, SentinelPolicy};
pub use engine::{analyze, statement_seed, AnalysisInput};
pub use phrases::is_high_confidence;
