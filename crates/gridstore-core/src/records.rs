//! Typed rows handed to the record writers.
//!
//! Fields are already parsed and validated by the importers. Numeric ranges
//! are not checked here; the DDL constraints are the gate.

use serde::{Deserialize, Serialize};

use crate::{ArcId, EntityId, TimeSeriesKind};

/// A planning region; `id` is the area code from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRegion {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl PlanningRegion {
    /// Region named after its area code, e.g. `Region 1`.
    pub fn for_area(area: i64) -> Self {
        Self {
            id: area,
            name: region_label(area),
            description: None,
        }
    }
}

/// The label regions are named with and buses record in their `area` column.
pub fn region_label(area: i64) -> String {
    format!("Region {}", area)
}

/// A bus; `id` is the externally supplied bus id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub id: i64,
    pub name: String,
    pub area: Option<String>,
    /// Bus kind as given by the source (`PV`, `PQ`, `Ref`)
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionLine {
    pub arc: ArcId,
    pub continuous_rating: f64,
    pub ste_rating: f64,
    pub lte_rating: f64,
    pub line_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionInterchange {
    pub arc: ArcId,
    pub name: String,
    pub max_flow_from: f64,
    pub max_flow_to: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationUnit {
    pub name: String,
    /// Prime mover code, e.g. `PrimeMovers.CT`
    pub prime_mover: String,
    pub fuel: Option<String>,
    /// Name (not id) of the bus the unit is connected to
    pub balancing_topology: String,
    pub rating: f64,
    pub base_power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageUnit {
    pub name: String,
    pub prime_mover: String,
    /// Energy capacity in MWh
    pub max_capacity: f64,
    pub balancing_topology: String,
    pub efficiency_up: f64,
    pub efficiency_down: f64,
    pub rating: f64,
    pub base_power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyTechnology {
    pub prime_mover: String,
    pub fuel: Option<String>,
    pub area: Option<String>,
    pub balancing_topology: Option<String>,
    pub scenario: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportTechnology {
    pub arc: Option<ArcId>,
    pub scenario: Option<String>,
}

/// Unit commitment data for a thermal generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalData {
    pub entity: EntityId,
    pub active_power_limit_min: f64,
    pub must_run: bool,
    pub uptime: f64,
    pub downtime: f64,
    pub ramp_up: f64,
    pub ramp_down: f64,
    pub operational_cost: Option<OperationalCost>,
}

/// Cost terms serialized into `operational_data.operational_cost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalCost {
    pub variable_cost: f64,
    pub fixed_cost: f64,
    pub start_up_cost: Option<f64>,
    pub startup_fuel_mmbtu_per_mw: Option<f64>,
}

/// Header row of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesHeader {
    pub kind: TimeSeriesKind,
    pub name: String,
    /// `YYYY-MM-DDTHH:MM:SS`
    pub initial_timestamp: String,
    pub resolution_ms: i64,
    pub horizon: Option<i64>,
    pub interval: Option<i64>,
    pub length: i64,
    pub uuid: Option<String>,
    pub features: Option<String>,
    pub metadata: Option<String>,
}

/// One value of a time series at a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: String,
    pub value: f64,
    pub uuid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_for_area_uses_label() {
        let region = PlanningRegion::for_area(3);
        assert_eq!(region.id, 3);
        assert_eq!(region.name, "Region 3");
        assert!(region.description.is_none());
    }

    #[test]
    fn operational_cost_serializes_flat() {
        let cost = OperationalCost {
            variable_cost: 2.08,
            fixed_cost: 38.0,
            start_up_cost: Some(51.75),
            startup_fuel_mmbtu_per_mw: None,
        };
        let json: serde_json::Value = serde_json::to_value(&cost).unwrap();
        assert_eq!(json["fixed_cost"], 38.0);
        assert!(json["startup_fuel_mmbtu_per_mw"].is_null());
    }
}
