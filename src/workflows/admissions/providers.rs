use std::sync::Arc;

use serde_json::json;

use crate::store::{DocumentStore, Filter, Query, StoreError};
use crate::workflows::matching::{Candidate, Target};

use super::collections;

/// Read-only access to student profiles. The core never writes to it.
pub trait CandidateDirectory: Send + Sync {
    fn candidate(&self, student_id: &str) -> Result<Option<Candidate>, StoreError>;
}

/// Read-only access to course and job listings.
pub trait TargetCatalog: Send + Sync {
    /// Resolve a target id against courses first, then jobs.
    fn target(&self, target_id: &str) -> Result<Option<Target>, StoreError>;

    /// All job listings currently accepting applications.
    fn open_jobs(&self) -> Result<Vec<Target>, StoreError>;
}

/// Store-backed implementation of both provider traits.
pub struct StoreDirectory<S> {
    store: Arc<S>,
}

impl<S> StoreDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> CandidateDirectory for StoreDirectory<S>
where
    S: DocumentStore,
{
    fn candidate(&self, student_id: &str) -> Result<Option<Candidate>, StoreError> {
        match self.store.get(collections::STUDENTS, student_id)? {
            Some(document) => Ok(Some(document.decode()?)),
            None => Ok(None),
        }
    }
}

impl<S> TargetCatalog for StoreDirectory<S>
where
    S: DocumentStore,
{
    fn target(&self, target_id: &str) -> Result<Option<Target>, StoreError> {
        if let Some(document) = self.store.get(collections::COURSES, target_id)? {
            return Ok(Some(document.decode()?));
        }
        match self.store.get(collections::JOBS, target_id)? {
            Some(document) => Ok(Some(document.decode()?)),
            None => Ok(None),
        }
    }

    fn open_jobs(&self) -> Result<Vec<Target>, StoreError> {
        let query = Query::filtered(vec![Filter::eq("status", json!("active"))]);
        self.store
            .query(collections::JOBS, &query)?
            .iter()
            .map(|document| document.decode())
            .collect()
    }
}
