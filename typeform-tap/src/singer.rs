//! Singer-style JSON-lines output: SCHEMA, RECORD and STATE messages, plus the
//! discovery catalog.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use typeform_core::{schema, State, TapError};

use crate::streams::StreamDefinition;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message<'a> {
    Schema {
        stream: &'a str,
        schema: Value,
        key_properties: &'a [&'a str],
        bookmark_properties: Vec<&'a str>,
    },
    Record {
        stream: &'a str,
        record: Value,
        time_extracted: DateTime<Utc>,
    },
    State {
        value: &'a State,
    },
}

impl<'a> Message<'a> {
    pub fn schema(definition: &'a StreamDefinition) -> Self {
        Message::Schema {
            stream: definition.name,
            schema: schema::json_schema(definition.schema),
            key_properties: definition.primary_keys,
            bookmark_properties: definition.replication_key.into_iter().collect(),
        }
    }
}

/// Writes one message per line.
pub struct SingerWriter<W: Write> {
    out: W,
}

impl<W: Write> SingerWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write(&mut self, message: &Message<'_>) -> Result<(), TapError> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn record<T: Serialize>(&mut self, stream: &str, record: &T) -> Result<(), TapError> {
        self.write(&Message::Record {
            stream,
            record: serde_json::to_value(record)?,
            time_extracted: Utc::now(),
        })
    }

    pub fn state(&mut self, state: &State) -> Result<(), TapError> {
        self.write(&Message::State { value: state })?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// The catalog printed by `--discover`.
pub fn catalog(streams: &[&StreamDefinition]) -> Value {
    let entries: Vec<Value> = streams
        .iter()
        .map(|definition| {
            let replication_method = if definition.replication_key.is_some() {
                "INCREMENTAL"
            } else {
                "FULL_TABLE"
            };
            json!({
                "tap_stream_id": definition.name,
                "stream": definition.name,
                "schema": schema::json_schema(definition.schema),
                "key_properties": definition.primary_keys,
                "replication_key": definition.replication_key,
                "replication_method": replication_method,
            })
        })
        .collect();

    json!({ "streams": entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::answers::ANSWERS;
    use crate::streams::forms::FORMS;
    use crate::streams::ALL_STREAMS;
    use typeform_core::Context;

    fn lines(buf: Vec<u8>) -> Vec<Value> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_schema_message_shape() {
        let mut writer = SingerWriter::new(Vec::new());
        writer.write(&Message::schema(&ANSWERS)).unwrap();

        let msg = &lines(writer.into_inner())[0];
        assert_eq!(msg["type"], "SCHEMA");
        assert_eq!(msg["stream"], "answers");
        assert_eq!(msg["key_properties"], json!(["form_id", "question_id", "response_id"]));
        assert_eq!(msg["bookmark_properties"], json!(["submitted_at"]));
        assert_eq!(msg["schema"]["properties"]["submitted_at"]["format"], "date-time");
    }

    #[test]
    fn test_full_table_stream_has_no_bookmark_properties() {
        let mut writer = SingerWriter::new(Vec::new());
        writer.write(&Message::schema(&FORMS)).unwrap();

        let msg = &lines(writer.into_inner())[0];
        assert_eq!(msg["bookmark_properties"], json!([]));
    }

    #[test]
    fn test_record_and_state_messages() {
        let mut writer = SingerWriter::new(Vec::new());
        writer
            .record("forms", &json!({"id": "F1", "title": "Hello"}))
            .unwrap();

        let mut state = State::default();
        state.advance(
            "answers",
            &Context::new().with("form_id", "F1"),
            "submitted_at",
            "2023-01-01T00:00:00Z".parse().unwrap(),
        );
        writer.state(&state).unwrap();

        let msgs = lines(writer.into_inner());
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["type"], "RECORD");
        assert_eq!(msgs[0]["record"]["id"], "F1");
        assert!(msgs[0]["time_extracted"].is_string());
        assert_eq!(msgs[1]["type"], "STATE");
        assert_eq!(
            msgs[1]["value"]["bookmarks"]["answers"]["partitions"][0]["replication_key_value"],
            "2023-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_catalog_lists_every_stream() {
        let catalog = catalog(&ALL_STREAMS);
        let streams = catalog["streams"].as_array().unwrap();

        let names: Vec<&str> = streams
            .iter()
            .map(|s| s["stream"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["forms", "questions", "answers"]);
        assert_eq!(streams[2]["replication_method"], "INCREMENTAL");
        assert_eq!(streams[0]["replication_method"], "FULL_TABLE");
        assert_eq!(streams[1]["key_properties"], json!(["id"]));
    }
}
