//! Entity/response mapper
//!
//! Pure, stateless conversion between the table store's schema-free property
//! bag and the wire entity exposed to the browser client. The reserved
//! system columns are excluded by name against a fixed denylist - never by
//! position - and scalar values pass through verbatim in both directions.

use serde_json::{Map, Value};
use speechops_core::models::{TableEntityResponse, UpsertEntityRequest};

/// System columns the table store manages itself. Stripped from every
/// outbound entity and re-attached (keys) or ignored (the rest) on write.
pub const RESERVED_COLUMNS: [&str; 4] = ["PartitionKey", "RowKey", "Timestamp", "odata.etag"];

fn is_reserved(key: &str) -> bool {
    RESERVED_COLUMNS.contains(&key)
}

/// Outbound: upstream entity -> wire entity.
///
/// Copies the partition and row key, then every property whose name is not
/// reserved. Missing key columns map to empty strings rather than failing;
/// the store never returns an entity without them.
pub fn entity_to_wire(entity: &Map<String, Value>) -> TableEntityResponse {
    let key_of = |name: &str| {
        entity
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let properties: Map<String, Value> = entity
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    TableEntityResponse {
        partition_key: key_of("PartitionKey"),
        row_key: key_of("RowKey"),
        properties,
    }
}

/// Inbound: wire upsert request -> upstream entity.
///
/// Re-attaches the key columns and copies every supplied property verbatim.
/// Reserved names in the supplied bag are dropped so a client cannot smuggle
/// in a fake timestamp or concurrency tag.
pub fn wire_to_entity(request: &UpsertEntityRequest) -> Map<String, Value> {
    let mut entity = Map::new();
    entity.insert(
        "PartitionKey".to_string(),
        Value::String(request.partition_key.clone()),
    );
    entity.insert(
        "RowKey".to_string(),
        Value::String(request.row_key.clone()),
    );
    for (key, value) in &request.properties {
        if !is_reserved(key) {
            entity.insert(key.clone(), value.clone());
        }
    }
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upstream_entity() -> Map<String, Value> {
        json!({
            "PartitionKey": "pk1",
            "RowKey": "rk1",
            "Timestamp": "2024-05-01T10:00:00Z",
            "odata.etag": "W/\"datetime'2024-05-01T10%3A00%3A00Z'\"",
            "Name": "alpha",
            "Count": 3,
            "Active": true
        })
        .as_object()
        .expect("object")
        .clone()
    }

    #[test]
    fn test_entity_to_wire_strips_reserved_columns() {
        let wire = entity_to_wire(&upstream_entity());
        assert_eq!(wire.partition_key, "pk1");
        assert_eq!(wire.row_key, "rk1");
        assert_eq!(wire.properties.len(), 3);
        assert!(wire.properties.get("Timestamp").is_none());
        assert!(wire.properties.get("odata.etag").is_none());
        assert_eq!(wire.properties["Name"], json!("alpha"));
        assert_eq!(wire.properties["Count"], json!(3));
        assert_eq!(wire.properties["Active"], json!(true));
    }

    #[test]
    fn test_wire_to_entity_reattaches_keys_verbatim() {
        let request = UpsertEntityRequest {
            partition_key: "pk1".to_string(),
            row_key: "rk1".to_string(),
            properties: json!({"Name": "alpha", "Count": 3})
                .as_object()
                .expect("object")
                .clone(),
        };
        let entity = wire_to_entity(&request);
        assert_eq!(entity["PartitionKey"], json!("pk1"));
        assert_eq!(entity["RowKey"], json!("rk1"));
        assert_eq!(entity["Name"], json!("alpha"));
        assert_eq!(entity["Count"], json!(3));
    }

    #[test]
    fn test_wire_to_entity_drops_supplied_reserved_names() {
        let request = UpsertEntityRequest {
            partition_key: "pk1".to_string(),
            row_key: "rk1".to_string(),
            properties: json!({"Timestamp": "1999-01-01T00:00:00Z", "Name": "alpha"})
                .as_object()
                .expect("object")
                .clone(),
        };
        let entity = wire_to_entity(&request);
        assert!(entity.get("Timestamp").is_none());
        assert_eq!(entity["Name"], json!("alpha"));
    }

    #[test]
    fn test_round_trip_equals_written_bag_minus_reserved() {
        let request = UpsertEntityRequest {
            partition_key: "pk1".to_string(),
            row_key: "rk1".to_string(),
            properties: json!({"Name": "alpha", "Score": 1.5})
                .as_object()
                .expect("object")
                .clone(),
        };
        let mut stored = wire_to_entity(&request);
        // Server adds its own system columns on read
        stored.insert("Timestamp".to_string(), json!("2024-05-01T10:00:00Z"));
        stored.insert("odata.etag".to_string(), json!("W/\"etag\""));

        let wire = entity_to_wire(&stored);
        assert_eq!(wire.properties, request.properties);
    }
}
