//! Time-series preprocessing for forecasting front ends.
//!
//! Takes raw uploaded rows (column→value maps) and runs a configurable
//! chain of cleaning stages over the designated timestamp and value
//! columns: date-frequency imputation, outlier filtering, smoothing,
//! variance-stabilizing transforms, trend/seasonal decomposition and
//! min-max normalization. Every stage is a pure function of its input
//! and its configuration; disabled stages pass through.
//!
//! ```
//! use tsprep::{Pipeline, PipelineConfig};
//! use serde_json::json;
//!
//! let rows: Vec<tsprep::RawRow> = vec![
//!     serde_json::from_value(json!({"date": "2024-01-01", "sales": 10})).unwrap(),
//!     serde_json::from_value(json!({"date": "2024-01-03", "sales": 30})).unwrap(),
//! ];
//! let mut config = PipelineConfig::default();
//! config.imputation.enabled = true;
//! let result = Pipeline::new(config).run(&rows, "date", "sales").unwrap();
//! assert_eq!(result.series.numeric_values(), vec![10.0, 20.0, 30.0]);
//! ```

pub mod core;
pub mod pipeline;
pub mod remote;
pub mod series;
pub mod stats;
pub mod temporal;

pub use crate::core::{Error, Result};
pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineResult};
pub use crate::remote::{ImputationService, LocalImputer};
pub use crate::series::{RawRow, Series, TimePoint};
pub use crate::stats::Stats;
pub use crate::temporal::Frequency;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
