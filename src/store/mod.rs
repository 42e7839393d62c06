//! Document store collaborator.
//!
//! Documents are flat JSON objects grouped into named collections and keyed
//! by an id the store assigns on [`DocumentStore::create`]. Timestamps travel
//! as `{"$timestamp": <unix millis>}`; writers that want the store's own time
//! put [`server_timestamp`] in a field and the store resolves it on write.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};
use thiserror::Error;

pub use memory::MemoryStore;

pub type Fields = Map<String, Value>;

pub const SERVER_TIMESTAMP_KEY: &str = "$serverTimestamp";
pub const TIMESTAMP_KEY: &str = "$timestamp";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("document {collection}/{id} does not exist")]
    DocumentNotFound { collection: String, id: String },

    #[error("malformed document: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return the id assigned to it.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Returns `None` if the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Fields>>;

    /// Merge `fields` over the top level of an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Every document whose top-level `field` equals `value`.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Fields)>>;
}

/// Placeholder the store replaces with its current time on write.
pub fn server_timestamp() -> Value {
    json!({ SERVER_TIMESTAMP_KEY: true })
}

pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    json!({ TIMESTAMP_KEY: at.timestamp_millis() })
}

pub fn is_server_timestamp(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.len() == 1 && object.contains_key(SERVER_TIMESTAMP_KEY))
}

/// Decode a stored timestamp; `None` for null, missing or foreign values.
pub fn read_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let millis = value.as_object()?.get(TIMESTAMP_KEY)?.as_i64()?;
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn timestamps_survive_the_wire_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(read_timestamp(&timestamp_value(at)), Some(at));
    }

    #[test]
    fn null_and_foreign_values_are_not_timestamps() {
        assert_eq!(read_timestamp(&Value::Null), None);
        assert_eq!(read_timestamp(&json!("2024-05-01")), None);
        assert_eq!(read_timestamp(&server_timestamp()), None);
    }

    #[test]
    fn sentinel_is_recognised() {
        assert!(is_server_timestamp(&server_timestamp()));
        assert!(!is_server_timestamp(&json!({ "$serverTimestamp": true, "x": 1 })));
    }
}
