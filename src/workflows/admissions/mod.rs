//! Application intake, eligibility gating, and admission arbitration.
//!
//! The arbitration path owns the one invariant everything else leans on: a
//! student never holds more than one accepted course application in any
//! transaction-consistent view of the store.

pub mod domain;
pub mod gatekeeper;
pub mod notify;
pub mod providers;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Application, ApplicationStatus, ApplicationView, Enrichment};
pub use gatekeeper::{EligibilityReport, Gatekeeper, GatekeeperPolicy, DEFAULT_INSTITUTION_CAP};
pub use notify::{
    Notification, NotificationDraft, NotificationError, NotificationKind, NotificationSink,
    StoreNotificationSink,
};
pub use providers::{CandidateDirectory, StoreDirectory, TargetCatalog};
pub use router::admissions_router;
pub use service::{AdmissionsError, AdmissionsService, SelectionOutcome};

/// Store collection names shared by the admissions and matching workflows.
pub mod collections {
    pub const STUDENTS: &str = "students";
    pub const COURSES: &str = "courses";
    pub const JOBS: &str = "jobs";
    pub const APPLICATIONS: &str = "applications";
    pub const NOTIFICATIONS: &str = "notifications";
}
