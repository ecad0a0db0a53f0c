//! Wire contracts for the remote collaborators.
//!
//! The imputation service and the forecasting backend both speak JSON row
//! payloads; the types here pin the exact field names those services
//! expect. Transport is out of scope: implementations of
//! [`ImputationService`] own their HTTP client and timeout policy.

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::pipeline::impute::{self, FillMethod, ImputationConfig};
use crate::series::{RawRow, Series};
use crate::temporal::Frequency;

/// Request body for the remote imputation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImputationRequest {
    pub data: Vec<RawRow>,
    pub date_column: String,
    pub value_column: String,
    #[serde(rename = "imputationMethod")]
    pub method: FillMethod,
    #[serde(rename = "imputationFrequency")]
    pub frequency: Frequency,
    #[serde(rename = "imputationConstant")]
    pub constant: f64,
}

impl ImputationRequest {
    pub fn new(
        series: &Series,
        date_column: &str,
        value_column: &str,
        config: &ImputationConfig,
    ) -> Self {
        Self {
            data: series.to_rows(date_column, value_column),
            date_column: date_column.to_string(),
            value_column: value_column.to_string(),
            method: config.method,
            frequency: config.frequency,
            constant: config.constant,
        }
    }
}

/// Response body from the remote imputation service: the same rows,
/// re-gridded and filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImputationResponse {
    pub data: Vec<RawRow>,
}

impl ImputationResponse {
    /// Coerce the returned rows back into a series.
    pub fn into_series(self, date_column: &str, value_column: &str) -> Series {
        Series::from_rows(&self.data, date_column, value_column)
    }
}

/// Gap-filling collaborator.
///
/// One synchronous method; the output contract is the same grid/fill
/// behavior as the local imputer. Failures surface as
/// [`Error::ImputationService`](crate::core::Error::ImputationService) or
/// [`Error::ImputationTimeout`](crate::core::Error::ImputationTimeout) so
/// callers can distinguish them from local computation errors.
pub trait ImputationService {
    fn impute(&self, request: &ImputationRequest) -> Result<ImputationResponse>;
}

/// In-process implementation of [`ImputationService`].
///
/// Runs the local grid/fill algorithm behind the remote interface, which
/// makes the local and remote paths interchangeable at the call site.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalImputer;

impl ImputationService for LocalImputer {
    fn impute(&self, request: &ImputationRequest) -> Result<ImputationResponse> {
        let series = Series::from_rows(&request.data, &request.date_column, &request.value_column);
        let config = ImputationConfig {
            enabled: true,
            frequency: request.frequency,
            method: request.method,
            constant: request.constant,
        };
        let filled = impute::impute(&series, &config);
        Ok(ImputationResponse {
            data: filled.to_rows(&request.date_column, &request.value_column),
        })
    }
}

fn default_confidence_level() -> u8 {
    95
}

/// Request body for the downstream forecasting service.
///
/// Built from a finished [`PipelineResult`](crate::pipeline::PipelineResult)
/// series; the pipeline itself never calls the forecaster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Model identifier as the service spells it
    pub model: String,
    /// Number of future periods to predict
    pub horizon: u32,
    /// Number of trailing periods of history to fit on
    pub history: u32,
    /// Name of the timestamp column inside `data`
    pub dt_name: String,
    /// Name of the value column inside `data`
    pub y_name: String,
    /// Frequency code of the (post-imputation) grid
    pub freq: String,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: u8,
    pub data: Vec<RawRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<RawRow> {
        vec![
            [
                ("date".to_string(), json!("2024-01-01")),
                ("sales".to_string(), json!(10.0)),
            ]
            .into_iter()
            .collect(),
            [
                ("date".to_string(), json!("2024-01-03")),
                ("sales".to_string(), json!(30.0)),
            ]
            .into_iter()
            .collect(),
        ]
    }

    #[test]
    fn test_request_wire_field_names() {
        let series = Series::from_rows(&rows(), "date", "sales");
        let request =
            ImputationRequest::new(&series, "date", "sales", &ImputationConfig::default());
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["imputationMethod"], json!("linear"));
        assert_eq!(body["imputationFrequency"], json!("D"));
        assert_eq!(body["imputationConstant"], json!(0.0));
        assert_eq!(body["date_column"], json!("date"));
        assert!(body["data"].is_array());
    }

    #[test]
    fn test_local_imputer_fills_the_gap() {
        let series = Series::from_rows(&rows(), "date", "sales");
        let request =
            ImputationRequest::new(&series, "date", "sales", &ImputationConfig::default());
        let response = LocalImputer.impute(&request).unwrap();
        let filled = response.into_series("date", "sales");
        assert_eq!(filled.numeric_values(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_forecast_request_defaults_confidence() {
        let body = json!({
            "model": "prophet",
            "horizon": 14,
            "history": 90,
            "dt_name": "date",
            "y_name": "sales",
            "freq": "D",
            "data": [],
        });
        let request: ForecastRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.confidence_level, 95);
    }
}
