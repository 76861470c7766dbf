use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::matching::TargetKind;

/// Lifecycle states across both application variants. Course applications use
/// pending/admitted/accepted/rejected; job applications use
/// pending/shortlisted/interview/rejected. `accepted` is only ever written by
/// the arbitration path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Admitted,
    Accepted,
    Rejected,
    Shortlisted,
    Interview,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Admitted => "admitted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
        }
    }

    /// Statuses that count against duplicate and cap checks.
    pub const fn non_rejected_labels() -> [&'static str; 5] {
        ["pending", "admitted", "accepted", "shortlisted", "interview"]
    }

    pub fn valid_for(self, kind: TargetKind) -> bool {
        match kind {
            TargetKind::Course => matches!(
                self,
                ApplicationStatus::Pending
                    | ApplicationStatus::Admitted
                    | ApplicationStatus::Accepted
                    | ApplicationStatus::Rejected
            ),
            TargetKind::Job => matches!(
                self,
                ApplicationStatus::Pending
                    | ApplicationStatus::Shortlisted
                    | ApplicationStatus::Interview
                    | ApplicationStatus::Rejected
            ),
        }
    }

    /// Staff review moves. `accepted` is terminal and unreachable here; it is
    /// produced exclusively by `select_admission`.
    pub(crate) fn staff_transition_allowed(self, kind: TargetKind, to: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        match kind {
            TargetKind::Course => matches!(
                (self, to),
                (Pending, Admitted)
                    | (Pending, Rejected)
                    | (Admitted, Pending)
                    | (Admitted, Rejected)
                    | (Rejected, Pending)
            ),
            TargetKind::Job => matches!(
                (self, to),
                (Pending, Shortlisted)
                    | (Pending, Rejected)
                    | (Shortlisted, Interview)
                    | (Shortlisted, Pending)
                    | (Shortlisted, Rejected)
                    | (Interview, Pending)
                    | (Interview, Rejected)
                    | (Rejected, Pending)
            ),
        }
    }
}

/// A student's application to a course or job. Target and institution display
/// fields are denormalized at creation time so list reads need no joins; the
/// two-path read on the service can refresh them from the live listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub student_id: String,
    pub target_id: String,
    pub target_kind: TargetKind,
    pub institution_id: String,
    pub target_title: String,
    pub institution_name: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub student_selected: bool,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub selected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Whether a read should trust the creation-time display snapshot or refresh
/// it from the live target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Enrichment {
    #[default]
    Stored,
    Refreshed,
}

/// An application plus its display fields, resolved through either read path.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application: Application,
    pub target_title: String,
    pub institution_name: String,
    /// True when the display fields were re-fetched from the live listing.
    pub refreshed: bool,
}
