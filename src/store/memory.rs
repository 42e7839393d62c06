use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use super::{is_server_timestamp, timestamp_value, DocumentStore, Fields, Result, StoreError};
use crate::clock::{Clock, SystemClock};

/// Key type: (collection, document id).
type DocumentKey = (String, String);

/// In-process document store.
pub struct MemoryStore {
    documents: DashMap<DocumentKey, Fields>,
    clock: Arc<dyn Clock>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            documents: DashMap::new(),
            clock,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Overwrite a document verbatim, bypassing timestamp resolution.
    pub fn insert_raw(&self, collection: &str, id: &str, fields: Fields) {
        self.documents
            .insert((collection.to_string(), id.to_string()), fields);
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn resolve(&self, value: &mut Value, now: &Value) {
        if is_server_timestamp(value) {
            *value = now.clone();
            return;
        }

        match value {
            Value::Array(items) => items.iter_mut().for_each(|item| self.resolve(item, now)),
            Value::Object(object) => object.values_mut().for_each(|item| self.resolve(item, now)),
            _ => {}
        }
    }

    fn resolve_fields(&self, fields: &mut Fields) {
        let now = timestamp_value(self.clock.now());
        fields.values_mut().for_each(|value| self.resolve(value, &now));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, mut fields: Fields) -> Result<String> {
        self.check_writes()?;

        let id = Uuid::new_v4().to_string();
        self.resolve_fields(&mut fields);
        self.documents
            .insert((collection.to_string(), id.clone()), fields);

        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Fields>> {
        self.check_reads()?;

        let key = (collection.to_string(), id.to_string());
        Ok(self.documents.get(&key).map(|entry| entry.value().clone()))
    }

    async fn update(&self, collection: &str, id: &str, mut fields: Fields) -> Result<()> {
        self.check_writes()?;

        let key = (collection.to_string(), id.to_string());
        let mut document =
            self.documents
                .get_mut(&key)
                .ok_or_else(|| StoreError::DocumentNotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;

        self.resolve_fields(&mut fields);
        document.extend(fields);

        Ok(())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Fields)>> {
        self.check_reads()?;

        let matches = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == collection && entry.value().get(field) == Some(value))
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();

        Ok(matches)
    }
}
