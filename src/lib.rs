// Library interface for readyrs modules
// This allows integration tests and benchmarks to access the core functionality

pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod readiness;
pub mod report;
pub mod trend;
pub mod wear;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use database::Database;
pub use error::{ReadyRsError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::{DailyMetrics, DateRange, TrainingStatus};
pub use normalizer::{FactorScore, SignalNormalizer};
pub use provider::{DailyMetricsCollector, JsonDumpProvider, TelemetryProvider};
pub use readiness::{Factor, FactorWeights, ReadinessCalculator, ReadinessConfig, ReadinessLevel, ReadinessResult};
pub use trend::{TrendAnalyzer, TrendConfig, TrendReport};
pub use wear::{watch_worn, WearStatus};
