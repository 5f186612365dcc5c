//! Replication bookmarks.
//!
//! Shaped like Singer SDK partitioned state so existing state files carry over:
//!
//! ```json
//! {"bookmarks": {"answers": {"partitions": [
//!   {"context": {"form_id": "F1"},
//!    "replication_key": "submitted_at",
//!    "replication_key_value": "2023-01-01T00:00:00Z"}
//! ]}}}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::TapError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamBookmarks>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamBookmarks {
    #[serde(default)]
    pub partitions: Vec<PartitionBookmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionBookmark {
    pub context: Context,
    pub replication_key: String,
    pub replication_key_value: DateTime<Utc>,
}

impl State {
    pub fn load(path: &Path) -> Result<Self, TapError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// An empty document is treated as empty state.
    pub fn parse(raw: &str) -> Result<Self, TapError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    fn partition(&self, stream: &str, context: &Context) -> Option<&PartitionBookmark> {
        self.bookmarks
            .get(stream)?
            .partitions
            .iter()
            .find(|p| &p.context == context)
    }

    /// Last recorded replication value for this stream partition.
    pub fn starting_value(&self, stream: &str, context: &Context) -> Option<DateTime<Utc>> {
        self.partition(stream, context)
            .map(|p| p.replication_key_value)
    }

    /// Record `value` for the partition; the stored value never moves backwards.
    pub fn advance(
        &mut self,
        stream: &str,
        context: &Context,
        replication_key: &str,
        value: DateTime<Utc>,
    ) {
        let partitions = &mut self
            .bookmarks
            .entry(stream.to_string())
            .or_default()
            .partitions;

        match partitions.iter_mut().find(|p| &p.context == context) {
            Some(existing) => {
                if value > existing.replication_key_value {
                    existing.replication_key_value = value;
                }
                existing.replication_key = replication_key.to_string();
            }
            None => partitions.push(PartitionBookmark {
                context: context.clone(),
                replication_key: replication_key.to_string(),
                replication_key_value: value,
            }),
        }
    }
}
