//! The preprocessing pipeline: per-stage configuration and the
//! orchestrator that chains the stages in their fixed order.

pub mod decompose;
pub mod impute;
pub mod normalize;
pub mod outliers;
pub mod smoothing;
pub mod transform;

pub use decompose::DecompositionConfig;
pub use impute::{FillMethod, ImputationConfig};
pub use normalize::NormalizationConfig;
pub use outliers::{OutlierConfig, OutlierMethod};
pub use smoothing::{SmoothingConfig, SmoothingMethod};
pub use transform::{TransformConfig, TransformKind};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::remote::{ImputationRequest, ImputationService};
use crate::series::{RawRow, Series};

/// Full pipeline configuration, one sub-config per stage.
///
/// The default disables every stage, so a default run is coercion only.
/// Deserializes leniently: absent stages take their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub imputation: ImputationConfig,
    pub outliers: OutlierConfig,
    pub smoothing: SmoothingConfig,
    pub transform: TransformConfig,
    pub decomposition: DecompositionConfig,
    pub normalization: NormalizationConfig,
}

impl PipelineConfig {
    /// Reject impossible parameters before any stage runs.
    ///
    /// Only enabled stages are checked; a nonsense window on a disabled
    /// stage is inert and tolerated.
    pub fn validate(&self, input_len: usize) -> Result<()> {
        if self.imputation.enabled
            && self.imputation.method == FillMethod::Constant
            && !self.imputation.constant.is_finite()
        {
            return Err(Error::InvalidConfig(format!(
                "imputation constant must be finite, got {}",
                self.imputation.constant
            )));
        }
        if self.outliers.enabled
            && (!self.outliers.threshold.is_finite() || self.outliers.threshold <= 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "outlier threshold must be positive and finite, got {}",
                self.outliers.threshold
            )));
        }
        if self.smoothing.enabled && self.smoothing.window < 1 {
            return Err(Error::InvalidConfig(
                "smoothing window must be at least 1".to_string(),
            ));
        }
        if self.transform.enabled {
            if let Some(lambda) = self.transform.lambda {
                if !lambda.is_finite() {
                    return Err(Error::InvalidConfig(format!(
                        "Box-Cox lambda must be finite, got {}",
                        lambda
                    )));
                }
            }
        }
        if self.decomposition.enabled {
            if self.decomposition.window < 2 {
                return Err(Error::InvalidConfig(
                    "decomposition window must be at least 2".to_string(),
                ));
            }
            if self.decomposition.window >= input_len {
                return Err(Error::InvalidConfig(format!(
                    "decomposition window {} must be smaller than the series length {}",
                    self.decomposition.window, input_len
                )));
            }
        }
        Ok(())
    }
}

/// Everything a pipeline run produces.
///
/// `trend`/`seasonal` are present only when decomposition ran; when
/// present they are positionally aligned with `series`, with NaN marking
/// positions that have no defined component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub series: Series,
    pub trend: Option<Vec<f64>>,
    pub seasonal: Option<Vec<f64>>,
}

/// The stage chain. Stateless apart from its configuration: running the
/// same rows twice produces the same result.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full chain over raw rows, imputing locally.
    ///
    /// Stage order is fixed: imputation, outlier filtering, smoothing,
    /// transform, decomposition, normalization. Disabled stages pass the
    /// series through untouched.
    pub fn run(
        &self,
        rows: &[RawRow],
        date_column: &str,
        value_column: &str,
    ) -> Result<PipelineResult> {
        let series = Series::from_rows(rows, date_column, value_column);
        self.config.validate(series.len())?;

        let series = if self.config.imputation.enabled {
            let filled = impute::impute(&series, &self.config.imputation);
            debug!("pipeline: imputation produced {} rows", filled.len());
            filled
        } else {
            series
        };
        self.run_tail(series)
    }

    /// Run the full chain, deferring the imputation stage to a remote
    /// collaborator. The grid/fill output contract is the same as
    /// [`run`](Self::run); service failures surface unchanged.
    pub fn run_with_imputer(
        &self,
        rows: &[RawRow],
        date_column: &str,
        value_column: &str,
        service: &dyn ImputationService,
    ) -> Result<PipelineResult> {
        let series = Series::from_rows(rows, date_column, value_column);
        self.config.validate(series.len())?;

        let series = if self.config.imputation.enabled {
            let request =
                ImputationRequest::new(&series, date_column, value_column, &self.config.imputation);
            let response = service.impute(&request)?;
            let filled = response.into_series(date_column, value_column);
            debug!("pipeline: remote imputation produced {} rows", filled.len());
            filled
        } else {
            series
        };
        self.run_tail(series)
    }

    /// Stages 2–6, shared by the local and remote entry points.
    fn run_tail(&self, series: Series) -> Result<PipelineResult> {
        let series = if self.config.outliers.enabled {
            let kept = outliers::filter(&series, &self.config.outliers);
            debug!(
                "pipeline: outlier filter kept {} of {} rows",
                kept.len(),
                series.len()
            );
            kept
        } else {
            series
        };

        let series = if self.config.smoothing.enabled {
            smoothing::smooth(&series, &self.config.smoothing)
        } else {
            series
        };

        let series = if self.config.transform.enabled {
            let transformed = transform::apply(&series, &self.config.transform);
            debug!(
                "pipeline: transform {:?} left {} rows",
                self.config.transform.kind,
                transformed.len()
            );
            transformed
        } else {
            series
        };

        let (series, trend, seasonal) = if self.config.decomposition.enabled {
            let (out, trend, seasonal) = decompose::decompose(&series, &self.config.decomposition);
            (out, Some(trend), Some(seasonal))
        } else {
            (series, None, None)
        };

        let series = if self.config.normalization.enabled {
            normalize::normalize(&series)
        } else {
            series
        };

        Ok(PipelineResult {
            series,
            trend,
            seasonal,
        })
    }
}
