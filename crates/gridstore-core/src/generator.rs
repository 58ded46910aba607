//! Generator classification.
//!
//! Each capacity row is classified once into a [`GeneratorKind`]; the
//! importer then dispatches on the variant. Quantities derived from the
//! classification (prime mover, rating, O&M costs, efficiencies) live here
//! too so they can be tested without a store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::curve::HeatRatePoints;
use crate::units::{GigawattHours, MegawattHours, Percent};
use crate::{GridResult, OperationalCost};

/// Rating written when a unit reports no positive reactive injection.
pub const MIN_RATING: f64 = 1e-8;

/// Prime mover codes understood by the store's reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimeMover {
    PVe,
    ST,
    CT,
    CC,
    HY,
    BA,
    WT,
    OT,
}

impl PrimeMover {
    /// Map a source unit type (`PV`, `STEAM`, `ROR`, ...) to a prime mover.
    pub fn from_unit_type(unit_type: &str) -> Self {
        match unit_type.trim().to_ascii_uppercase().as_str() {
            "PV" | "RTPV" | "CSP" => PrimeMover::PVe,
            "STEAM" | "NUCLEAR" => PrimeMover::ST,
            "CT" => PrimeMover::CT,
            "CC" => PrimeMover::CC,
            "ROR" | "HYDRO" => PrimeMover::HY,
            "STORAGE" => PrimeMover::BA,
            "WIND" => PrimeMover::WT,
            _ => PrimeMover::OT,
        }
    }

    /// Code stored in `prime_mover_types.name`, e.g. `PrimeMovers.CT`.
    pub fn code(self) -> String {
        format!("PrimeMovers.{:?}", self)
    }
}

impl fmt::Display for PrimeMover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Pair of profile files a renewable or storage unit reads its output from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileSource {
    Hydro,
    Pv,
    NaturalInflow,
    Rtpv,
    Wind,
}

impl ProfileSource {
    fn stem(self) -> &'static str {
        match self {
            ProfileSource::Hydro => "hydro",
            ProfileSource::Pv => "pv",
            ProfileSource::NaturalInflow => "Natural_Inflow",
            ProfileSource::Rtpv => "rtpv",
            ProfileSource::Wind => "wind",
        }
    }

    /// Hourly day-ahead profile file name.
    pub fn day_ahead_file(self) -> String {
        format!("DAY_AHEAD_{}.csv", self.stem())
    }

    /// Five-minute real-time profile file name.
    pub fn real_time_file(self) -> String {
        format!("REAL_TIME_{}.csv", self.stem())
    }
}

/// Storage-specific columns of a capacity row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageParams {
    pub max_volume: GigawattHours,
    pub roundtrip_efficiency: Percent,
    /// Set by the classifier from the unit's fuel
    pub profile: Option<ProfileSource>,
}

impl StorageParams {
    pub fn max_capacity(&self) -> MegawattHours {
        self.max_volume.into()
    }

    /// Charging and discharging efficiency, equal in both directions.
    pub fn efficiency(&self) -> f64 {
        self.roundtrip_efficiency.split_roundtrip()
    }
}

/// Thermal-specific columns of a capacity row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalParams {
    pub pmin: f64,
    pub min_up_hours: f64,
    pub min_down_hours: f64,
    pub ramp_rate: f64,
    pub start_cost: Option<f64>,
    pub start_heat: Option<f64>,
    pub heat_rate: HeatRatePoints,
    pub forced_outage_rate: Option<f64>,
    pub mttr_hours: Option<f64>,
    pub co2_lbs_per_mmbtu: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeneratorKind {
    Storage(StorageParams),
    Hydro,
    Pv,
    Csp,
    Rtpv,
    Wind,
    Thermal(ThermalParams),
    /// Solar unit of a type with no profile source
    Unsupported { unit_type: String },
}

impl GeneratorKind {
    /// Classify one capacity row.
    ///
    /// `storage` carries the row's storage columns when its GEN UID is listed
    /// in the storage table. `thermal` is only evaluated for thermal units.
    pub fn classify<F>(
        fuel: &str,
        unit_type: &str,
        storage: Option<StorageParams>,
        thermal: F,
    ) -> GridResult<Self>
    where
        F: FnOnce() -> GridResult<ThermalParams>,
    {
        if let Some(mut params) = storage {
            params.profile = match fuel {
                "Hydro" => Some(ProfileSource::Hydro),
                "Solar" => Some(ProfileSource::NaturalInflow),
                _ => None,
            };
            return Ok(GeneratorKind::Storage(params));
        }

        Ok(match (fuel, unit_type) {
            ("Hydro", _) => GeneratorKind::Hydro,
            ("Solar", "PV") => GeneratorKind::Pv,
            ("Solar", "CSP") => GeneratorKind::Csp,
            ("Solar", "RTPV") => GeneratorKind::Rtpv,
            ("Solar", other) => GeneratorKind::Unsupported {
                unit_type: other.to_string(),
            },
            ("Wind", _) => GeneratorKind::Wind,
            _ => GeneratorKind::Thermal(thermal()?),
        })
    }

    /// Profile files the unit's generation series come from.
    pub fn profile(&self) -> Option<ProfileSource> {
        match self {
            GeneratorKind::Storage(params) => params.profile,
            GeneratorKind::Hydro => Some(ProfileSource::Hydro),
            GeneratorKind::Pv => Some(ProfileSource::Pv),
            GeneratorKind::Csp => Some(ProfileSource::NaturalInflow),
            GeneratorKind::Rtpv => Some(ProfileSource::Rtpv),
            GeneratorKind::Wind => Some(ProfileSource::Wind),
            GeneratorKind::Thermal(_) | GeneratorKind::Unsupported { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GeneratorKind::Storage(_) => "storage",
            GeneratorKind::Hydro => "hydro",
            GeneratorKind::Pv => "pv",
            GeneratorKind::Csp => "csp",
            GeneratorKind::Rtpv => "rtpv",
            GeneratorKind::Wind => "wind",
            GeneratorKind::Thermal(_) => "thermal",
            GeneratorKind::Unsupported { .. } => "unsupported",
        }
    }
}

/// Unit rating from capacity and reactive injection.
///
/// Capped at `cap`; a non-positive injection gives [`MIN_RATING`].
pub fn unit_rating(cap: f64, mvar_inj: f64) -> f64 {
    if mvar_inj > cap {
        cap
    } else if mvar_inj > 0.0 {
        mvar_inj
    } else {
        MIN_RATING
    }
}

/// Fixed O&M cost per fuel ($/kW-yr).
pub fn fixed_om(fuel: &str) -> f64 {
    match fuel {
        "Hydro" => 92.0,
        "Solar" => 16.639,
        "Wind" => 26.314,
        "Nuclear" => 126.0,
        "NG" => 38.0,
        "Coal" => 123.3,
        "Oil" => 25.0,
        _ => 0.0,
    }
}

/// Variable O&M cost per fuel ($/MWh).
pub fn variable_om(fuel: &str) -> f64 {
    match fuel {
        "Nuclear" => 1.9,
        "NG" => 2.08,
        "Coal" => 14.2,
        "Oil" => 6.94,
        _ => 0.0,
    }
}

/// Gas and oil units can be decommitted; every other thermal fuel must run.
pub fn must_run(fuel: &str) -> bool {
    !matches!(fuel, "NG" | "Oil")
}

pub fn operational_cost(fuel: &str, params: &ThermalParams) -> OperationalCost {
    OperationalCost {
        variable_cost: variable_om(fuel),
        fixed_cost: fixed_om(fuel),
        start_up_cost: params.start_cost,
        startup_fuel_mmbtu_per_mw: params.start_heat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridError;

    fn no_thermal() -> GridResult<ThermalParams> {
        Err(GridError::Other("thermal params requested".into()))
    }

    fn storage() -> StorageParams {
        StorageParams {
            max_volume: GigawattHours(0.15),
            roundtrip_efficiency: Percent(81.0),
            profile: None,
        }
    }

    #[test]
    fn prime_mover_mapping() {
        assert_eq!(PrimeMover::from_unit_type("CSP"), PrimeMover::PVe);
        assert_eq!(PrimeMover::from_unit_type("NUCLEAR"), PrimeMover::ST);
        assert_eq!(PrimeMover::from_unit_type("ROR"), PrimeMover::HY);
        assert_eq!(PrimeMover::from_unit_type("Wind"), PrimeMover::WT);
        assert_eq!(PrimeMover::from_unit_type("SYNC_COND"), PrimeMover::OT);
        assert_eq!(PrimeMover::CT.code(), "PrimeMovers.CT");
    }

    #[test]
    fn storage_membership_wins_over_fuel() {
        let kind = GeneratorKind::classify("Hydro", "STORAGE", Some(storage()), no_thermal).unwrap();
        match kind {
            GeneratorKind::Storage(params) => {
                assert_eq!(params.profile, Some(ProfileSource::Hydro));
                assert_eq!(params.max_capacity(), MegawattHours(150.0));
            }
            other => panic!("expected storage, got {:?}", other),
        }

        let battery = GeneratorKind::classify("Storage", "STORAGE", Some(storage()), no_thermal).unwrap();
        assert_eq!(battery.profile(), None);
    }

    #[test]
    fn renewables_do_not_read_thermal_params() {
        let cases = [
            ("Hydro", "HYDRO", "hydro"),
            ("Solar", "PV", "pv"),
            ("Solar", "CSP", "csp"),
            ("Solar", "RTPV", "rtpv"),
            ("Wind", "WIND", "wind"),
            ("Solar", "DISH", "unsupported"),
        ];
        for (fuel, unit_type, label) in cases {
            let kind = GeneratorKind::classify(fuel, unit_type, None, no_thermal).unwrap();
            assert_eq!(kind.label(), label);
        }
    }

    #[test]
    fn other_fuels_are_thermal() {
        let kind = GeneratorKind::classify("Coal", "STEAM", None, || Ok(ThermalParams::default())).unwrap();
        assert!(matches!(kind, GeneratorKind::Thermal(_)));
        assert_eq!(kind.profile(), None);
    }

    #[test]
    fn profile_file_names() {
        assert_eq!(ProfileSource::Pv.day_ahead_file(), "DAY_AHEAD_pv.csv");
        assert_eq!(ProfileSource::NaturalInflow.real_time_file(), "REAL_TIME_Natural_Inflow.csv");
    }

    #[test]
    fn rating_rules() {
        assert_eq!(unit_rating(100.0, 150.0), 100.0);
        assert_eq!(unit_rating(100.0, 40.0), 40.0);
        assert_eq!(unit_rating(100.0, 0.0), MIN_RATING);
        assert_eq!(unit_rating(100.0, -5.0), MIN_RATING);
    }

    #[test]
    fn cost_tables() {
        assert!(must_run("Coal"));
        assert!(must_run("Nuclear"));
        assert!(!must_run("NG"));
        assert!(!must_run("Oil"));

        let cost = operational_cost("NG", &ThermalParams { start_cost: Some(5665.2), ..Default::default() });
        assert_eq!(cost.variable_cost, 2.08);
        assert_eq!(cost.fixed_cost, 38.0);
        assert_eq!(cost.start_up_cost, Some(5665.2));
        assert_eq!(fixed_om("Geothermal"), 0.0);
    }
}
