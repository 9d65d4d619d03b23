pub mod analyzer;
pub mod config;
pub mod error;
pub mod pattern;
pub mod prediction;

pub use analyzer::{Analyzer, FrequencyResult, HotColdResult, NumberCount};
pub use config::PredictionConfig;
pub use error::{AnalysisError, Result};
pub use pattern::{OddEven, PatternResult, RangeBucket, StatisticsSummary, SumRange};
pub use prediction::NumberScore;
