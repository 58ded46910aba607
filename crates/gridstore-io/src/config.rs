//! Ingestion settings.
//!
//! Every field defaults to the conventions of the published datasets, so an
//! empty or missing file reproduces a stock run. Loaded from TOML:
//!
//! ```toml
//! [five_bus]
//! include_loads = false
//!
//! [series]
//! day_ahead_length = "elapsed_hours"
//! ```

use std::path::Path;

use gridstore_core::GridResult;
use gridstore_ts::LengthRule;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub rts: RtsConfig,
    pub five_bus: FiveBusConfig,
    pub series: SeriesConfig,
    pub investment: InvestmentConfig,
}

/// File names and columns of RTS-style datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtsConfig {
    pub bus_file: String,
    pub branch_file: String,
    pub generator_file: String,
    pub storage_file: String,
    pub day_ahead_load_file: String,
    pub real_time_load_file: String,
    /// Value columns of wide tables start after this one
    pub marker_column: String,
}

impl Default for RtsConfig {
    fn default() -> Self {
        Self {
            bus_file: "bus_mod_updatedwithBA.csv".to_string(),
            branch_file: "branch.csv".to_string(),
            generator_file: "ReEDS_generator_database_final_RTS-GMLC_updated_nodal.csv".to_string(),
            storage_file: "storage.csv".to_string(),
            day_ahead_load_file: "DAY_AHEAD_regional_Load.csv".to_string(),
            real_time_load_file: "REAL_TIME_regional_Load.csv".to_string(),
            marker_column: "Period".to_string(),
        }
    }
}

/// File names and columns of 5-bus-style datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiveBusConfig {
    pub bus_file: String,
    pub branch_file: String,
    pub day_ahead_load_file: String,
    pub real_time_load_file: String,
    pub datetime_column: String,
    pub marker_column: String,
    pub include_loads: bool,
}

impl Default for FiveBusConfig {
    fn default() -> Self {
        Self {
            bus_file: "bus.csv".to_string(),
            branch_file: "branch.csv".to_string(),
            day_ahead_load_file: "da_load.csv".to_string(),
            real_time_load_file: "rt_load.csv".to_string(),
            datetime_column: "DateTime".to_string(),
            marker_column: "values".to_string(),
            include_loads: true,
        }
    }
}

/// Header fields shared by every materialized series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Written to `features` as `{"unit": ...}`
    pub unit: String,
    /// Length rule of day-ahead load series
    pub day_ahead_length: LengthRule,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            unit: "MW".to_string(),
            day_ahead_length: LengthRule::RowCount,
        }
    }
}

/// Supply curves and availability profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentConfig {
    pub scenario: String,
    pub solar_supply_curve_file: String,
    pub wind_supply_curve_file: String,
    pub solar_availability_file: String,
    pub wind_availability_file: String,
    pub timestamp_column: String,
}

impl Default for InvestmentConfig {
    fn default() -> Self {
        Self {
            scenario: "Reference".to_string(),
            solar_supply_curve_file: "upv_supply_curve-reference_ba.csv".to_string(),
            wind_supply_curve_file: "wind-ons_supply_curve-reference_ba.csv".to_string(),
            solar_availability_file: "pv_availability.csv".to_string(),
            wind_availability_file: "wind_availability.csv".to_string(),
            timestamp_column: "Timestamps".to_string(),
        }
    }
}

impl IngestConfig {
    /// Settings from `path`, or defaults when no file is given or it does not exist.
    pub fn load(path: Option<&Path>) -> GridResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from(path),
            Some(path) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> GridResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
