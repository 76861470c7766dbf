use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde_json::Value;

use super::{BatchOperation, Document, DocumentStore, OrderDirection, Query, StoreError};

/// In-memory document store. Batches run under one exclusive lock: every
/// operation is validated before any is applied, so readers never observe a
/// partially committed batch.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    sequence: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("doc-{id:06}")
    }

    fn merge(existing: &mut Value, patch: &Value) {
        if let (Value::Object(target), Value::Object(fields)) = (existing, patch) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn compare_fields(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering::Equal;
    match (a, b) {
        (Value::Number(left), Value::Number(right)) => left
            .as_f64()
            .partial_cmp(&right.as_f64())
            .unwrap_or(Equal),
        (Value::String(left), Value::String(right)) => left.cmp(right),
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        _ => Equal,
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().expect("store lock poisoned");
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().expect("store lock poisoned");
        let mut matches: Vec<Document> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(_, data)| query.filters.iter().all(|filter| filter.matches(data)))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            matches.sort_by(|a, b| {
                let left = a.data.get(&order.field).unwrap_or(&Value::Null);
                let right = b.data.get(&order.field).unwrap_or(&Value::Null);
                let ordering = compare_fields(left, right);
                match order.direction {
                    OrderDirection::Ascending => ordering,
                    OrderDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }

        Ok(matches)
    }

    fn create(&self, collection: &str, mut data: Value) -> Result<String, StoreError> {
        let id = self.next_id();
        if let Value::Object(fields) = &mut data {
            fields.insert("id".to_string(), Value::String(id.clone()));
        }

        let mut collections = self.collections.write().expect("store lock poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("store lock poisoned");
        let document = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or(StoreError::NotFound)?;
        Self::merge(document, &patch);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("store lock poisoned");
        let removed = collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    fn run_batch(&self, operations: Vec<BatchOperation>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("store lock poisoned");

        // Validation pass: nothing is applied unless every operation can be.
        for operation in &operations {
            match operation {
                BatchOperation::Create { .. } => {}
                BatchOperation::Update {
                    collection,
                    id,
                    guard,
                    ..
                } => {
                    let document = collections
                        .get(collection.as_str())
                        .and_then(|documents| documents.get(id))
                        .ok_or(StoreError::NotFound)?;
                    if let Some(guard) = guard {
                        if document.get(&guard.field) != Some(&guard.equals) {
                            return Err(StoreError::Conflict);
                        }
                    }
                }
                BatchOperation::Delete { collection, id } => {
                    collections
                        .get(collection.as_str())
                        .and_then(|documents| documents.get(id))
                        .ok_or(StoreError::NotFound)?;
                }
            }
        }

        for operation in operations {
            match operation {
                BatchOperation::Create {
                    collection,
                    mut data,
                } => {
                    let id = self.next_id();
                    if let Value::Object(fields) = &mut data {
                        fields.insert("id".to_string(), Value::String(id.clone()));
                    }
                    collections.entry(collection).or_default().insert(id, data);
                }
                BatchOperation::Update {
                    collection,
                    id,
                    patch,
                    ..
                } => {
                    if let Some(document) = collections
                        .get_mut(collection.as_str())
                        .and_then(|documents| documents.get_mut(&id))
                    {
                        Self::merge(document, &patch);
                    }
                }
                BatchOperation::Delete { collection, id } => {
                    if let Some(documents) = collections.get_mut(collection.as_str()) {
                        documents.remove(&id);
                    }
                }
            }
        }

        Ok(())
    }
}
