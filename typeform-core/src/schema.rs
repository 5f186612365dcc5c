//! Flat record schemas.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    DateTime,
}

/// One column of a flat record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl SchemaField {
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
        }
    }

    pub const fn date_time(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::DateTime,
        }
    }
}

/// Render a field list as a JSON Schema object. Every property is nullable.
pub fn json_schema(fields: &[SchemaField]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|field| {
            let property = match field.kind {
                FieldKind::String => json!({"type": ["string", "null"]}),
                FieldKind::DateTime => json!({"type": ["string", "null"], "format": "date-time"}),
            };
            (field.name.to_string(), property)
        })
        .collect();

    json!({
        "type": "object",
        "properties": properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_marks_date_time_fields() {
        let schema = json_schema(&[
            SchemaField::string("response_id"),
            SchemaField::date_time("submitted_at"),
        ]);

        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["properties"]["response_id"],
            json!({"type": ["string", "null"]})
        );
        assert_eq!(schema["properties"]["submitted_at"]["format"], "date-time");
    }

    #[test]
    fn test_json_schema_keeps_every_field() {
        let schema = json_schema(&[
            SchemaField::string("a"),
            SchemaField::string("b"),
            SchemaField::string("c"),
        ]);
        assert_eq!(schema["properties"].as_object().unwrap().len(), 3);
    }
}
