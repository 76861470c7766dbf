use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::store::{BatchOperation, DocumentStore, Filter, Guard, Query, StoreError};
use crate::workflows::matching::{
    rank_jobs, QualificationScorer, RankedJob, Target, TargetKind,
};

use super::collections;
use super::domain::{Application, ApplicationStatus, ApplicationView, Enrichment};
use super::gatekeeper::{EligibilityReport, Gatekeeper, GatekeeperPolicy};
use super::notify::{NotificationDraft, NotificationKind, NotificationSink};
use super::providers::{CandidateDirectory, TargetCatalog};

/// How many times the arbitration batch is re-read and re-submitted when the
/// store reports a conflicting concurrent write.
const SELECTION_RETRIES: usize = 3;

/// Result of a successful admission selection.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub accepted: Application,
    pub declined: Vec<Application>,
}

/// Error taxonomy surfaced by the gatekeeper and arbitrator. Store-level
/// details never leak into the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionsError {
    #[error("student already has an active application for this target")]
    AlreadyApplied,
    #[error("application limit reached for this institution")]
    ApplicationCapExceeded,
    #[error("target is not accepting applications")]
    TargetUnavailable,
    #[error("candidate does not meet the requirements")]
    NotQualified { missing: Vec<String> },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("selection requires an admitted application")]
    InvalidSelection,
    #[error("actor does not own this application")]
    Unauthorized,
    #[error("cannot move a {kind} application from {from} to {to}")]
    InvalidTransition {
        kind: &'static str,
        from: &'static str,
        to: &'static str,
    },
    #[error("a concurrent update interfered; retry the operation")]
    StoreConflict,
    #[error("storage backend failed")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for AdmissionsError {
    fn from(error: StoreError) -> Self {
        AdmissionsError::Storage(error)
    }
}

/// Facade composing the document store, the read-side providers, the
/// notification sink, and the eligibility policy.
pub struct AdmissionsService<S, P, N> {
    store: Arc<S>,
    providers: Arc<P>,
    notifier: Arc<N>,
    gatekeeper: Gatekeeper,
}

impl<S, P, N> AdmissionsService<S, P, N>
where
    S: DocumentStore + 'static,
    P: CandidateDirectory + TargetCatalog + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, providers: Arc<P>, notifier: Arc<N>, policy: GatekeeperPolicy) -> Self {
        Self {
            store,
            providers,
            notifier,
            gatekeeper: Gatekeeper::new(policy),
        }
    }

    /// Evaluate all four eligibility rules for a prospective application.
    /// Read-only and idempotent: repeated calls with no intervening writes
    /// return identical reports.
    pub fn check_eligibility(
        &self,
        student_id: &str,
        target_id: &str,
    ) -> Result<EligibilityReport, AdmissionsError> {
        let (_, _, report) = self.eligibility(student_id, target_id)?;
        Ok(report)
    }

    /// Re-check eligibility and create the application. Safe to call without
    /// a prior `check_eligibility`; the check is always re-run here. The
    /// check-then-create window is a known bounded race: two concurrent
    /// applies can both pass, producing at most one extra application.
    pub fn apply_for_target(
        &self,
        student_id: &str,
        target_id: &str,
    ) -> Result<Application, AdmissionsError> {
        let (candidate, target, report) = self.eligibility(student_id, target_id)?;

        if !report.target_available {
            return Err(AdmissionsError::TargetUnavailable);
        }
        if report.already_applied {
            return Err(AdmissionsError::AlreadyApplied);
        }
        if !report.can_apply_to_target {
            return Err(AdmissionsError::ApplicationCapExceeded);
        }
        if !report.qualified {
            return Err(AdmissionsError::NotQualified {
                missing: report.missing_requirements,
            });
        }

        let now = Utc::now();
        let mut application = Application {
            id: String::new(),
            student_id: candidate.id.clone(),
            target_id: target.id.clone(),
            target_kind: target.kind,
            institution_id: target.institution_id.clone(),
            target_title: target.title.clone(),
            institution_name: target.institution_name.clone(),
            status: ApplicationStatus::Pending,
            student_selected: false,
            applied_at: now,
            updated_at: now,
            reviewed_at: None,
            reviewed_by: None,
            selected_at: None,
            rejection_reason: None,
        };

        let id = self
            .store
            .create(collections::APPLICATIONS, encode(&application)?)?;
        application.id = id;

        self.notify(NotificationDraft {
            user_id: application.student_id.clone(),
            kind: NotificationKind::ApplicationSubmitted,
            title: "Application submitted".to_string(),
            message: format!(
                "Your application to {} at {} was received.",
                application.target_title, application.institution_name
            ),
            related_application_id: Some(application.id.clone()),
        });

        Ok(application)
    }

    /// Staff review transition. Touches exactly one document, so it can never
    /// mint a second `accepted` record; only `select_admission` writes that
    /// status.
    pub fn update_application_status(
        &self,
        application_id: &str,
        new_status: ApplicationStatus,
        reviewer: &str,
    ) -> Result<Application, AdmissionsError> {
        let mut application = self.application(application_id)?;

        if !application
            .status
            .staff_transition_allowed(application.target_kind, new_status)
        {
            return Err(AdmissionsError::InvalidTransition {
                kind: application.target_kind.label(),
                from: application.status.label(),
                to: new_status.label(),
            });
        }

        let now = Utc::now();
        let mut patch = json!({
            "status": new_status,
            "updated_at": now,
            "reviewed_at": now,
            "reviewed_by": reviewer,
        });
        if new_status == ApplicationStatus::Pending {
            // A revert wipes the prior verdict's trail.
            patch["rejection_reason"] = Value::Null;
        }

        self.store
            .update(collections::APPLICATIONS, application_id, patch)?;

        application.status = new_status;
        application.updated_at = now;
        application.reviewed_at = Some(now);
        application.reviewed_by = Some(reviewer.to_string());
        if new_status == ApplicationStatus::Pending {
            application.rejection_reason = None;
        }

        self.notify(status_notification(&application));

        Ok(application)
    }

    /// Accept one admitted course offer and atomically decline every other
    /// admitted offer the student holds. Either the whole batch commits or
    /// nothing does; a transaction-consistent reader can never observe two
    /// accepted applications for one student.
    pub fn select_admission(
        &self,
        student_id: &str,
        application_id: &str,
    ) -> Result<SelectionOutcome, AdmissionsError> {
        for _ in 0..SELECTION_RETRIES {
            let application = self.application(application_id)?;

            if application.student_id != student_id {
                return Err(AdmissionsError::Unauthorized);
            }
            if application.target_kind != TargetKind::Course
                || application.status != ApplicationStatus::Admitted
            {
                return Err(AdmissionsError::InvalidSelection);
            }

            let admitted = self.admitted_course_applications(student_id)?;
            let declined: Vec<Application> = admitted
                .into_iter()
                .filter(|other| other.id != application.id)
                .collect();

            let now = Utc::now();
            let admitted_guard = || Guard {
                field: "status".to_string(),
                equals: json!(ApplicationStatus::Admitted),
            };

            let mut operations = vec![BatchOperation::Update {
                collection: collections::APPLICATIONS.to_string(),
                id: application.id.clone(),
                patch: json!({
                    "status": ApplicationStatus::Accepted,
                    "student_selected": true,
                    "selected_at": now,
                    "updated_at": now,
                }),
                guard: Some(admitted_guard()),
            }];
            for other in &declined {
                operations.push(BatchOperation::Update {
                    collection: collections::APPLICATIONS.to_string(),
                    id: other.id.clone(),
                    patch: json!({
                        "status": ApplicationStatus::Rejected,
                        "rejection_reason": "student selected another institution",
                        "updated_at": now,
                    }),
                    guard: Some(admitted_guard()),
                });
            }

            match self.store.run_batch(operations) {
                Ok(()) => {
                    let accepted = self.application(&application.id)?;
                    let declined: Vec<Application> = declined
                        .into_iter()
                        .map(|mut other| {
                            other.status = ApplicationStatus::Rejected;
                            other.rejection_reason =
                                Some("student selected another institution".to_string());
                            other.updated_at = now;
                            other
                        })
                        .collect();
                    self.notify(NotificationDraft {
                        user_id: student_id.to_string(),
                        kind: NotificationKind::AdmissionSelected,
                        title: "Admission confirmed".to_string(),
                        message: selection_message(&accepted, declined.len()),
                        related_application_id: Some(accepted.id.clone()),
                    });
                    return Ok(SelectionOutcome { accepted, declined });
                }
                // A concurrent status change invalidated the snapshot; re-read
                // and resubmit the whole batch rather than any single document.
                Err(StoreError::Conflict) => continue,
                Err(other) => return Err(AdmissionsError::Storage(other)),
            }
        }

        Err(AdmissionsError::StoreConflict)
    }

    /// Two-path read: `Stored` trusts the denormalized snapshot taken at
    /// application time, `Refreshed` overlays the live listing's display
    /// fields. Refresh failures fall back to the snapshot; enrichment is
    /// best-effort and never fails the read.
    pub fn get_application(
        &self,
        application_id: &str,
        enrichment: Enrichment,
    ) -> Result<ApplicationView, AdmissionsError> {
        let application = self.application(application_id)?;

        if enrichment == Enrichment::Refreshed {
            match self.providers.target(&application.target_id) {
                Ok(Some(target)) => {
                    return Ok(ApplicationView {
                        target_title: target.title,
                        institution_name: target.institution_name,
                        refreshed: true,
                        application,
                    });
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(application_id, %error, "target refresh failed; serving stored snapshot");
                }
            }
        }

        Ok(ApplicationView {
            target_title: application.target_title.clone(),
            institution_name: application.institution_name.clone(),
            refreshed: false,
            application,
        })
    }

    /// Ranked open-job matches for a student, freshly scored on every call.
    pub fn matches_for_student(&self, student_id: &str) -> Result<Vec<RankedJob>, AdmissionsError> {
        let candidate = self
            .providers
            .candidate(student_id)?
            .ok_or(AdmissionsError::NotFound("student"))?;
        let open_jobs = self.providers.open_jobs()?;
        Ok(rank_jobs(&candidate, &open_jobs))
    }

    /// Administrative hard delete. Bypasses the status lifecycle on purpose;
    /// nothing in the matching flow calls this.
    pub fn delete_application(&self, application_id: &str) -> Result<(), AdmissionsError> {
        match self.store.delete(collections::APPLICATIONS, application_id) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(AdmissionsError::NotFound("application")),
            Err(other) => Err(AdmissionsError::Storage(other)),
        }
    }

    fn eligibility(
        &self,
        student_id: &str,
        target_id: &str,
    ) -> Result<(crate::workflows::matching::Candidate, Target, EligibilityReport), AdmissionsError>
    {
        let candidate = self
            .providers
            .candidate(student_id)?
            .ok_or(AdmissionsError::NotFound("student"))?;
        let target = self
            .providers
            .target(target_id)?
            .ok_or(AdmissionsError::NotFound("target"))?;

        let already_applied = !self
            .store
            .query(
                collections::APPLICATIONS,
                &Query::filtered(vec![
                    Filter::eq("student_id", student_id),
                    Filter::eq("target_id", target_id),
                    non_rejected_filter(),
                ]),
            )?
            .is_empty();

        let institution_count = self
            .store
            .query(
                collections::APPLICATIONS,
                &Query::filtered(vec![
                    Filter::eq("student_id", student_id),
                    Filter::eq("institution_id", target.institution_id.as_str()),
                    non_rejected_filter(),
                ]),
            )?
            .len();

        let scorer = match target.kind {
            TargetKind::Course => QualificationScorer::course_application(),
            TargetKind::Job => QualificationScorer::job_ranking(),
        };
        let qualification = scorer.score(&candidate, &target.requirements);

        let report = self
            .gatekeeper
            .report(&target, &qualification, already_applied, institution_count);

        Ok((candidate, target, report))
    }

    fn admitted_course_applications(
        &self,
        student_id: &str,
    ) -> Result<Vec<Application>, AdmissionsError> {
        let documents = self.store.query(
            collections::APPLICATIONS,
            &Query::filtered(vec![
                Filter::eq("student_id", student_id),
                Filter::eq("target_kind", json!(TargetKind::Course)),
                Filter::eq("status", json!(ApplicationStatus::Admitted)),
            ]),
        )?;
        documents
            .iter()
            .map(|document| document.decode().map_err(AdmissionsError::from))
            .collect()
    }

    fn application(&self, application_id: &str) -> Result<Application, AdmissionsError> {
        let document = self
            .store
            .get(collections::APPLICATIONS, application_id)?
            .ok_or(AdmissionsError::NotFound("application"))?;
        Ok(document.decode()?)
    }

    fn notify(&self, draft: NotificationDraft) {
        if let Err(error) = self.notifier.emit(draft) {
            warn!(%error, "notification emit failed; continuing");
        }
    }
}

fn non_rejected_filter() -> Filter {
    Filter::any_of(
        "status",
        ApplicationStatus::non_rejected_labels()
            .iter()
            .map(|label| json!(label))
            .collect(),
    )
}

fn encode(application: &Application) -> Result<Value, AdmissionsError> {
    serde_json::to_value(application)
        .map_err(|error| AdmissionsError::Storage(StoreError::InvalidDocument(error)))
}

fn status_notification(application: &Application) -> NotificationDraft {
    let (title, message) = match application.status {
        ApplicationStatus::Admitted => (
            "Admission offer received",
            format!(
                "You have been admitted to {} at {}. Select it to confirm your place.",
                application.target_title, application.institution_name
            ),
        ),
        ApplicationStatus::Rejected => (
            "Application decision",
            format!(
                "Your application to {} at {} was not successful.",
                application.target_title, application.institution_name
            ),
        ),
        ApplicationStatus::Shortlisted => (
            "Application shortlisted",
            format!(
                "You were shortlisted for {} at {}.",
                application.target_title, application.institution_name
            ),
        ),
        ApplicationStatus::Interview => (
            "Interview invitation",
            format!(
                "{} at {} invited you to interview.",
                application.target_title, application.institution_name
            ),
        ),
        _ => (
            "Application updated",
            format!(
                "Your application to {} at {} is back under review.",
                application.target_title, application.institution_name
            ),
        ),
    };

    NotificationDraft {
        user_id: application.student_id.clone(),
        kind: NotificationKind::ApplicationStatusChanged,
        title: title.to_string(),
        message,
        related_application_id: Some(application.id.clone()),
    }
}

fn selection_message(accepted: &Application, declined: usize) -> String {
    match declined {
        0 => format!(
            "You accepted your place in {} at {}.",
            accepted.target_title, accepted.institution_name
        ),
        1 => format!(
            "You accepted your place in {} at {}; 1 other admitted offer was automatically declined.",
            accepted.target_title, accepted.institution_name
        ),
        count => format!(
            "You accepted your place in {} at {}; {count} other admitted offers were automatically declined.",
            accepted.target_title, accepted.institution_name
        ),
    }
}
