//! Natural-key lookups.
//!
//! Later ingestion phases only know business keys (a bus id from a CSV
//! column, an area code from a header). These lookups turn them back into
//! the ids written by earlier phases. A miss is `Ok(None)`; callers decide
//! whether it is fatal, usually through [`Store::require`].

use gridstore_core::{ArcId, EntityId, EntityType, GridError, GridResult, NaturalKey};
use rusqlite::{params, OptionalExtension};

use crate::{key_value, Store};

impl Store {
    pub fn resolve(&self, entity_type: EntityType, key: &NaturalKey) -> GridResult<Option<EntityId>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM entities WHERE entity_type = ?1 AND entity_key = ?2",
                params![entity_type.table_name(), key_value(key)],
                |row| row.get(0),
            )
            .optional()?
            .map(EntityId::new))
    }

    /// Like [`resolve`](Self::resolve), but a miss is an
    /// [`UnresolvedReference`](GridError::UnresolvedReference).
    pub fn require(&self, entity_type: EntityType, key: &NaturalKey) -> GridResult<EntityId> {
        self.resolve(entity_type, key)?
            .ok_or_else(|| GridError::unresolved(entity_type.table_name(), key))
    }

    pub fn arc_id(&self, from: EntityId, to: EntityId) -> GridResult<Option<ArcId>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM arcs WHERE from_id = ?1 AND to_id = ?2",
                params![from.value(), to.value()],
                |row| row.get(0),
            )
            .optional()?
            .map(ArcId::new))
    }

    pub fn bus_id_by_name(&self, name: &str) -> GridResult<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM balancing_topologies WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn bus_name(&self, bus_id: i64) -> GridResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT name FROM balancing_topologies WHERE id = ?1",
                params![bus_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// First transmission line on `arc`, by row id.
    pub fn transmission_line_by_arc(&self, arc: ArcId) -> GridResult<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM transmission_lines WHERE arc_id = ?1 ORDER BY id LIMIT 1",
                params![arc.value()],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Entity of the bus whose name is `name`.
    pub fn bus_entity_by_name(&self, name: &str) -> GridResult<Option<EntityId>> {
        match self.bus_id_by_name(name)? {
            Some(id) => self.resolve(EntityType::BalancingTopologies, &NaturalKey::Int(id)),
            None => Ok(None),
        }
    }
}
