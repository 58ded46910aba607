//! Column names of the supported source tables.

/// Bus table columns; the two dataset families spell them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusColumns {
    pub id: &'static str,
    pub name: &'static str,
    pub area: &'static str,
    pub kind: &'static str,
    pub load: &'static str,
}

impl BusColumns {
    pub const RTS: BusColumns = BusColumns {
        id: "Bus_ID",
        name: "Bus_Name",
        area: "Area",
        kind: "Bus_Type",
        load: "MW_Load",
    };

    pub const FIVE_BUS: BusColumns = BusColumns {
        id: "Bus ID",
        name: "Bus Name",
        area: "Area",
        kind: "Bus Type",
        load: "MW Load",
    };

    pub fn required(&self) -> [&'static str; 5] {
        [self.id, self.name, self.area, self.kind, self.load]
    }
}

/// RTS bus table extras.
pub mod bus {
    pub const LAT: &str = "lat";
    pub const LON: &str = "lng";
    /// Balancing authority a bus belongs to
    pub const BA: &str = "BA";
}

pub mod branch {
    pub const FROM: &str = "From Bus";
    pub const TO: &str = "To Bus";
    pub const CONT_RATING: &str = "Cont Rating";
    pub const STE_RATING: &str = "STE Rating";
    pub const LTE_RATING: &str = "LTE Rating";
    pub const LENGTH: &str = "Length";
    pub const REACTANCE: &str = "X";
    pub const SUSCEPTANCE: &str = "B";
    pub const RESISTANCE: &str = "R";
}

/// Generator capacity database.
pub mod generator {
    pub const GEN_UID: &str = "GEN UID";
    pub const BUS_ID: &str = "Bus ID";
    pub const FUEL: &str = "Fuel";
    pub const UNIT_TYPE: &str = "Unit Type";
    pub const CAP: &str = "cap";
    pub const MVAR_INJ: &str = "MVAR Inj";
    pub const PMIN: &str = "PMin MW";
    pub const MIN_UP: &str = "Min Up Time Hr";
    pub const MIN_DOWN: &str = "Min Down Time Hr";
    pub const RAMP_RATE: &str = "Ramp Rate MW/Min";
    pub const START_COST: &str = "Non Fuel Start Cost $";
    pub const START_HEAT: &str = "Start Heat Warm MBTU";
    pub const HEAT_RATE: &str = "HeatRate";
    pub const OUTPUT_PCT: [&str; 5] = [
        "Output_pct_0",
        "Output_pct_1",
        "Output_pct_2",
        "Output_pct_3",
        "Output_pct_4",
    ];
    pub const HR_INCR: [&str; 4] = ["HR_incr_1", "HR_incr_2", "HR_incr_3", "HR_incr_4"];
    pub const FOR: &str = "FOR";
    pub const MTTR: &str = "MTTR Hr";
    pub const CO2: &str = "Emissions CO2 Lbs/MMBTU";
    pub const ROUNDTRIP_EFFICIENCY: &str = "Storage Roundtrip Efficiency";
}

pub mod storage {
    pub const GEN_UID: &str = "GEN UID";
    pub const MAX_VOLUME: &str = "Max Volume GWh";
}

/// Year/month/day/period time axis of RTS wide tables.
pub mod period {
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Month";
    pub const DAY: &str = "Day";
    pub const PERIOD: &str = "Period";
}

pub mod supply_curve {
    pub const REGION: &str = "region";
    pub const CLASS: &str = "class";
    pub const CAPACITY: &str = "capacity";
    pub const COST: &str = "supply_curve_cost_per_mw";
    pub const DISTANCE: &str = "dist_km";
    pub const REINFORCEMENT: &str = "reinforcement_dist_km";
}
