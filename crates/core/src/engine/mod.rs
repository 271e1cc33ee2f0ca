pub mod adjuster;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod severity;

pub use adjuster::PreMarketAdjuster;
pub use config::AdjusterConfig;
pub use report::AdjustmentReport;
pub use severity::{Severity, SeverityClassifier};
