use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::store::{
    BatchOperation, Document, DocumentStore, MemoryDocumentStore, Query, StoreError,
};
use crate::workflows::admissions::notify::{NotificationDraft, NotificationError, NotificationSink};
use crate::workflows::admissions::providers::StoreDirectory;
use crate::workflows::admissions::service::AdmissionsService;
use crate::workflows::admissions::{collections, GatekeeperPolicy};
use crate::workflows::matching::{
    Candidate, EducationEntry, EducationLevel, RequirementSet, Target, TargetKind, TargetStatus,
    WorkExperienceEntry,
};

pub(super) type TestService<S> =
    AdmissionsService<S, StoreDirectory<MemoryDocumentStore>, RecordingSink>;

pub(super) fn service(
    store: Arc<MemoryDocumentStore>,
) -> (TestService<MemoryDocumentStore>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let service = AdmissionsService::new(
        store.clone(),
        Arc::new(StoreDirectory::new(store)),
        sink.clone(),
        GatekeeperPolicy::default(),
    );
    (service, sink)
}

pub(super) fn candidate() -> Candidate {
    Candidate {
        id: String::new(),
        full_name: "Amara Okafor".to_string(),
        education: vec![EducationEntry {
            level: EducationLevel::Bachelors,
            field: "Computer Science".to_string(),
            gpa: 3.4,
            institution: "Lakeside University".to_string(),
            start_year: 2019,
            end_year: Some(2023),
        }],
        skills: vec!["reactjs".to_string(), "sql".to_string()],
        work_experience: vec![WorkExperienceEntry {
            position: "Junior Developer".to_string(),
            company: "Northwind".to_string(),
            years: 2.0,
            start_date: None,
            end_date: None,
        }],
        certificates: Vec::new(),
        preferred_location: None,
    }
}

pub(super) fn seed_student(store: &MemoryDocumentStore, candidate: &Candidate) -> String {
    store
        .create(
            collections::STUDENTS,
            serde_json::to_value(candidate).expect("candidate serializes"),
        )
        .expect("student seeds")
}

pub(super) fn course(institution_id: &str, title: &str) -> Target {
    Target {
        id: String::new(),
        kind: TargetKind::Course,
        title: title.to_string(),
        institution_id: institution_id.to_string(),
        institution_name: format!("{institution_id} University"),
        location: None,
        status: TargetStatus::Active,
        requirements: RequirementSet::default(),
    }
}

pub(super) fn job(company_id: &str, title: &str, requirements: RequirementSet) -> Target {
    Target {
        id: String::new(),
        kind: TargetKind::Job,
        title: title.to_string(),
        institution_id: company_id.to_string(),
        institution_name: format!("{company_id} Inc"),
        location: None,
        status: TargetStatus::Active,
        requirements,
    }
}

pub(super) fn seed_target(store: &MemoryDocumentStore, target: &Target) -> String {
    let collection = match target.kind {
        TargetKind::Course => collections::COURSES,
        TargetKind::Job => collections::JOBS,
    };
    store
        .create(
            collection,
            serde_json::to_value(target).expect("target serializes"),
        )
        .expect("target seeds")
}

/// Sink capturing drafts so tests can assert on emission.
#[derive(Default)]
pub(super) struct RecordingSink {
    events: Mutex<Vec<NotificationDraft>>,
}

impl RecordingSink {
    pub(super) fn events(&self) -> Vec<NotificationDraft> {
        self.events.lock().expect("sink lock").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&self, draft: NotificationDraft) -> Result<(), NotificationError> {
        self.events.lock().expect("sink lock").push(draft);
        Ok(())
    }
}

/// Sink that always fails, for asserting best-effort semantics.
pub(super) struct FailingSink;

impl NotificationSink for FailingSink {
    fn emit(&self, _draft: NotificationDraft) -> Result<(), NotificationError> {
        Err(NotificationError::Sink("transport offline".to_string()))
    }
}

/// Store wrapper whose first `failures` batch submissions conflict, to force
/// the arbitration retry loop through its re-read path.
pub(super) struct FlakyStore {
    inner: Arc<MemoryDocumentStore>,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub(super) fn new(inner: Arc<MemoryDocumentStore>, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }
}

impl DocumentStore for FlakyStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id)
    }

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.query(collection, query)
    }

    fn create(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        self.inner.create(collection, data)
    }

    fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        self.inner.update(collection, id, patch)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id)
    }

    fn run_batch(&self, operations: Vec<BatchOperation>) -> Result<(), StoreError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict);
        }
        self.inner.run_batch(operations)
    }
}
