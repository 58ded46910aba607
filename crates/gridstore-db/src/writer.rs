//! Typed inserts, one per record kind.
//!
//! Entity-bearing records register their `entities` row in the same call
//! and return both ids. Values are written as given; CHECK and foreign key
//! violations come back as [`GridError::Store`](gridstore_core::GridError).

use gridstore_core::{
    ArcId, EntityId, EntityType, GenerationUnit, GridResult, NaturalKey, OperationalData,
    PlanningRegion, StorageUnit, SupplyTechnology, TopologyNode, TransmissionInterchange,
    TransmissionLine, TransportTechnology,
};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::{key_value, Store};

/// Ids of a freshly written entity-bearing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    /// Primary key in the record's own table
    pub id: i64,
    /// Row in `entities`
    pub entity: EntityId,
}

impl Store {
    /// Register `(entity_type, key)` in the generic entity table.
    pub fn insert_entity(&self, entity_type: EntityType, key: &NaturalKey) -> GridResult<EntityId> {
        self.conn.execute(
            "INSERT INTO entities (entity_type, entity_key) VALUES (?1, ?2)",
            params![entity_type.table_name(), key_value(key)],
        )?;
        Ok(EntityId::new(self.conn.last_insert_rowid()))
    }

    /// Register the row just inserted; its row id is the natural key.
    fn register(&self, entity_type: EntityType) -> GridResult<Inserted> {
        let id = self.conn.last_insert_rowid();
        let key = NaturalKey::Int(id);
        let entity = self.insert_entity(entity_type, &key)?;
        debug!(%entity_type, %key, entity = entity.value(), "registered entity");
        Ok(Inserted { id, entity })
    }

    /// Insert a region; its natural key is the area code.
    pub fn insert_planning_region(&self, region: &PlanningRegion) -> GridResult<Inserted> {
        self.conn.execute(
            "INSERT INTO planning_regions (id, name, description) VALUES (?1, ?2, ?3)",
            params![region.id, region.name, region.description],
        )?;
        self.register(EntityType::PlanningRegions)
    }

    /// Insert a bus; its natural key is the external bus id.
    pub fn insert_topology_node(&self, node: &TopologyNode) -> GridResult<Inserted> {
        self.conn.execute(
            "INSERT INTO balancing_topologies (id, name, area, description) VALUES (?1, ?2, ?3, ?4)",
            params![node.id, node.name, node.area, node.description],
        )?;
        self.register(EntityType::BalancingTopologies)
    }

    /// Arc between two entities, reusing an existing identical pair.
    pub fn ensure_arc(&self, from: EntityId, to: EntityId) -> GridResult<ArcId> {
        if let Some(existing) = self.arc_id(from, to)? {
            return Ok(existing);
        }
        self.conn.execute(
            "INSERT INTO arcs (from_id, to_id) VALUES (?1, ?2)",
            params![from.value(), to.value()],
        )?;
        Ok(ArcId::new(self.conn.last_insert_rowid()))
    }

    pub fn insert_transmission_line(&self, line: &TransmissionLine) -> GridResult<Inserted> {
        self.conn.execute(
            "INSERT INTO transmission_lines (arc_id, continuous_rating, ste_rating, lte_rating, line_length)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                line.arc.value(),
                line.continuous_rating,
                line.ste_rating,
                line.lte_rating,
                line.line_length,
            ],
        )?;
        self.register(EntityType::TransmissionLines)
    }

    pub fn insert_transmission_interchange(
        &self,
        interchange: &TransmissionInterchange,
    ) -> GridResult<Inserted> {
        self.conn.execute(
            "INSERT INTO transmission_interchanges (arc_id, name, max_flow_from, max_flow_to)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                interchange.arc.value(),
                interchange.name,
                interchange.max_flow_from,
                interchange.max_flow_to,
            ],
        )?;
        self.register(EntityType::TransmissionInterchanges)
    }

    pub fn insert_generation_unit(&self, unit: &GenerationUnit) -> GridResult<Inserted> {
        self.conn.execute(
            "INSERT INTO generation_units (name, prime_mover, fuel, balancing_topology, rating, base_power)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                unit.name,
                unit.prime_mover,
                unit.fuel,
                unit.balancing_topology,
                unit.rating,
                unit.base_power,
            ],
        )?;
        self.register(EntityType::GenerationUnits)
    }

    pub fn insert_storage_unit(&self, unit: &StorageUnit) -> GridResult<Inserted> {
        self.conn.execute(
            "INSERT INTO storage_units
               (name, prime_mover, max_capacity, balancing_topology, efficiency_up, efficiency_down, rating, base_power)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                unit.name,
                unit.prime_mover,
                unit.max_capacity,
                unit.balancing_topology,
                unit.efficiency_up,
                unit.efficiency_down,
                unit.rating,
                unit.base_power,
            ],
        )?;
        self.register(EntityType::StorageUnits)
    }

    pub fn insert_supply_technology(&self, tech: &SupplyTechnology) -> GridResult<Inserted> {
        self.conn.execute(
            "INSERT INTO supply_technologies (prime_mover, fuel, area, balancing_topology, scenario)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                tech.prime_mover,
                tech.fuel,
                tech.area,
                tech.balancing_topology,
                tech.scenario,
            ],
        )?;
        self.register(EntityType::SupplyTechnologies)
    }

    pub fn insert_transport_technology(&self, tech: &TransportTechnology) -> GridResult<Inserted> {
        self.conn.execute(
            "INSERT INTO transport_technologies (arc_id, scenario) VALUES (?1, ?2)",
            params![tech.arc.map(|a| a.value()), tech.scenario],
        )?;
        self.register(EntityType::TransportTechnologies)
    }

    pub fn insert_hydro_reservoir(&self, name: &str) -> GridResult<i64> {
        self.conn
            .execute("INSERT INTO hydro_reservoir (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Link a turbine (generation unit row id) to a reservoir.
    pub fn connect_hydro_reservoir(&self, turbine_id: i64, reservoir_id: i64) -> GridResult<i64> {
        self.conn.execute(
            "INSERT INTO hydro_reservoir_connections (turbine_id, reservoir_id) VALUES (?1, ?2)",
            params![turbine_id, reservoir_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_operational_data(&self, data: &OperationalData) -> GridResult<i64> {
        let cost = data
            .operational_cost
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.conn.execute(
            "INSERT INTO operational_data
               (entity_id, active_power_limit_min, must_run, uptime, downtime, ramp_up, ramp_down, operational_cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                data.entity.value(),
                data.active_power_limit_min,
                data.must_run,
                data.uptime,
                data.downtime,
                data.ramp_up,
                data.ramp_down,
                cost,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_prime_mover(&self, name: &str, description: Option<&str>) -> GridResult<i64> {
        self.conn.execute(
            "INSERT INTO prime_mover_types (name, description) VALUES (?1, ?2)",
            params![name, description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_fuel(&self, name: &str, description: Option<&str>) -> GridResult<i64> {
        self.conn.execute(
            "INSERT INTO fuels (name, description) VALUES (?1, ?2)",
            params![name, description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Id of a reference-table row by name, if present.
    pub fn fuel_id(&self, name: &str) -> GridResult<Option<i64>> {
        Ok(self
            .conn
            .query_row("SELECT id FROM fuels WHERE name = ?1", params![name], |row| row.get(0))
            .optional()?)
    }
}
