//! Document store abstraction used by the admissions and matching workflows.
//!
//! Collections hold schemaless JSON documents keyed by store-minted ids. The
//! trait is intentionally small: equality/in-list filters, single-field
//! ordering, shallow patch updates, and an atomic multi-document batch. The
//! arbitration workflow depends on `run_batch` being all-or-nothing.

mod memory;

pub use memory::MemoryDocumentStore;

use serde_json::Value;

/// A stored document together with its collection-unique id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Deserialize the document body into a typed value.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone()).map_err(StoreError::InvalidDocument)
    }
}

/// Field predicate applied to top-level document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn any_of(field: &str, values: Vec<Value>) -> Self {
        Filter::In {
            field: field.to_string(),
            values,
        }
    }

    pub(crate) fn matches(&self, data: &Value) -> bool {
        match self {
            Filter::Eq { field, value } => data.get(field) == Some(value),
            Filter::In { field, values } => data
                .get(field)
                .map(|candidate| values.iter().any(|value| value == candidate))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Single-field ordering for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: OrderDirection,
}

/// Query description: all filters must match; ordering and limit optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn filtered(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            order_by: None,
            limit: None,
        }
    }

    pub fn order_by(mut self, field: &str, direction: OrderDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Precondition attached to a batched update: the named field must currently
/// hold the given value or the entire batch fails with `Conflict`.
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub field: String,
    pub equals: Value,
}

/// One operation inside an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOperation {
    Create {
        collection: String,
        data: Value,
    },
    Update {
        collection: String,
        id: String,
        patch: Value,
        guard: Option<Guard>,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("write conflict")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed document")]
    InvalidDocument(#[source] serde_json::Error),
}

/// Storage abstraction so workflows can be exercised against any backend.
pub trait DocumentStore: Send + Sync {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Persist a new document, returning the minted id. The id is also
    /// injected into the stored body under `"id"` so reads round-trip.
    fn create(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    /// Shallow-merge `patch` into an existing document.
    fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Apply every operation or none. Guarded updates whose precondition no
    /// longer holds fail the whole batch with `Conflict`.
    fn run_batch(&self, operations: Vec<BatchOperation>) -> Result<(), StoreError>;
}
