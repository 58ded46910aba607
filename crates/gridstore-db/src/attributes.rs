//! Attribute binding.
//!
//! Every call writes a fresh attribute row and one association row; equal
//! values bound twice produce two attributes.

use gridstore_core::{AttributeValue, EntityId, EntityType, GridResult};
use rusqlite::types::{Value, ValueRef};
use rusqlite::params;

use crate::Store;

fn sql_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Integer(v) => Value::Integer(*v),
        AttributeValue::Real(v) => Value::Real(*v),
        AttributeValue::Text(s) => Value::Text(s.clone()),
        AttributeValue::Blob(b) => Value::Blob(b.clone()),
        AttributeValue::Null => Value::Null,
    }
}

fn attribute_value(value: ValueRef<'_>) -> AttributeValue {
    match value {
        ValueRef::Integer(v) => AttributeValue::Integer(v),
        ValueRef::Real(v) => AttributeValue::Real(v),
        ValueRef::Text(t) => AttributeValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => AttributeValue::Blob(b.to_vec()),
        ValueRef::Null => AttributeValue::Null,
    }
}

impl Store {
    /// Bind a named attribute to `entity`; returns the attribute id.
    pub fn bind(
        &self,
        entity_type: EntityType,
        name: &str,
        value: &AttributeValue,
        entity: EntityId,
    ) -> GridResult<i64> {
        self.conn.execute(
            "INSERT INTO attributes (entity_type, name, value) VALUES (?1, ?2, ?3)",
            params![entity_type.table_name(), name, sql_value(value)],
        )?;
        let attribute_id = self.conn.last_insert_rowid();
        self.conn.execute(
            "INSERT INTO attributes_associations (attribute_id, entity_id) VALUES (?1, ?2)",
            params![attribute_id, entity.value()],
        )?;
        Ok(attribute_id)
    }

    /// Bind a supplemental attribute (geolocation, emissions) to `entity`.
    pub fn bind_supplemental(
        &self,
        kind: &str,
        value: &AttributeValue,
        entity: EntityId,
    ) -> GridResult<i64> {
        self.conn.execute(
            "INSERT INTO supplemental_attributes (type, value) VALUES (?1, ?2)",
            params![kind, sql_value(value)],
        )?;
        let attribute_id = self.conn.last_insert_rowid();
        self.conn.execute(
            "INSERT INTO supplemental_attributes_association (attribute_id, entity_id) VALUES (?1, ?2)",
            params![attribute_id, entity.value()],
        )?;
        Ok(attribute_id)
    }

    /// Attributes bound to `entity`, in binding order.
    pub fn attributes_of(&self, entity: EntityId) -> GridResult<Vec<(String, AttributeValue)>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.name, a.value FROM attributes a
             JOIN attributes_associations aa ON aa.attribute_id = a.id
             WHERE aa.entity_id = ?1
             ORDER BY a.id",
        )?;
        let rows = stmt.query_map(params![entity.value()], |row| {
            Ok((row.get::<_, String>(0)?, attribute_value(row.get_ref(1)?)))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Supplemental attributes bound to `entity`, as `(type, value)`.
    pub fn supplemental_of(&self, entity: EntityId) -> GridResult<Vec<(String, AttributeValue)>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.type, s.value FROM supplemental_attributes s
             JOIN supplemental_attributes_association sa ON sa.attribute_id = s.id
             WHERE sa.entity_id = ?1
             ORDER BY s.id",
        )?;
        let rows = stmt.query_map(params![entity.value()], |row| {
            Ok((row.get::<_, String>(0)?, attribute_value(row.get_ref(1)?)))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store;
    use gridstore_core::{PiecewiseLinear, PlanningRegion};

    fn region(store: &Store) -> EntityId {
        store
            .insert_planning_region(&PlanningRegion::for_area(1))
            .unwrap()
            .entity
    }

    #[test]
    fn identical_bindings_are_not_deduplicated() {
        let store = store();
        let entity = region(&store);
        let value = AttributeValue::Real(0.25);
        let first = store.bind(EntityType::PlanningRegions, "Share", &value, entity).unwrap();
        let second = store.bind(EntityType::PlanningRegions, "Share", &value, entity).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.row_count("attributes").unwrap(), 2);
        assert_eq!(store.row_count("attributes_associations").unwrap(), 2);
    }

    #[test]
    fn curve_blobs_keep_blob_type() {
        let store = store();
        let entity = region(&store);
        let curve = PiecewiseLinear::from_samples(&[(10.0, 1.0), (20.0, 3.0)]);
        let id = store
            .bind(EntityType::PlanningRegions, "Heat Rate", &curve.to_attribute().unwrap(), entity)
            .unwrap();

        let kind: String = store
            .conn()
            .query_row("SELECT typeof(value) FROM attributes WHERE id = ?1", [id], |row| row.get(0))
            .unwrap();
        assert_eq!(kind, "blob");

        let attrs = store.attributes_of(entity).unwrap();
        match &attrs[0].1 {
            AttributeValue::Blob(bytes) => {
                assert_eq!(PiecewiseLinear::from_blob(bytes).unwrap(), curve)
            }
            other => panic!("expected blob, got {:?}", other),
        }
    }

    #[test]
    fn scalar_types_round_trip() {
        let store = store();
        let entity = region(&store);
        let values = [
            AttributeValue::Integer(3),
            AttributeValue::Real(0.0016),
            AttributeValue::Text("PV".into()),
            AttributeValue::Null,
        ];
        for (i, v) in values.iter().enumerate() {
            store
                .bind(EntityType::PlanningRegions, &format!("attr{}", i), v, entity)
                .unwrap();
        }
        let read: Vec<_> = store.attributes_of(entity).unwrap().into_iter().map(|(_, v)| v).collect();
        assert_eq!(read, values.to_vec());
    }

    #[test]
    fn supplemental_binding() {
        let store = store();
        let entity = region(&store);
        let geo = AttributeValue::json(&serde_json::json!({"lat": 33.4, "lon": -113.2})).unwrap();
        store.bind_supplemental("geolocation", &geo, entity).unwrap();
        store
            .bind_supplemental("CO2 Emissions", &AttributeValue::Real(117.0), entity)
            .unwrap();

        let sup = store.supplemental_of(entity).unwrap();
        assert_eq!(sup.len(), 2);
        assert_eq!(sup[0].0, "geolocation");
        assert_eq!(sup[1].1, AttributeValue::Real(117.0));
    }
}
