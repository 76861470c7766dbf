//! Qualification scoring between a candidate profile and a requirement set.
//!
//! Scoring is pure: it never touches the store and never raises domain
//! errors; missing data degrades the affected category to zero credit.
//! Results are always recomputed on demand rather than persisted, so a
//! stale score can never be served.

pub mod domain;
pub mod ranking;
pub mod weights;

mod policy;
mod rules;

pub use domain::{
    Candidate, CertificateEntry, EducationEntry, EducationLevel, ExperienceLevel, RequirementSet,
    Target, TargetKind, TargetStatus, WorkExperienceEntry,
};
pub use ranking::{rank_jobs, RankedJob};
pub use weights::{WeightProfile, JOB_QUALIFICATION_THRESHOLD, MAX_RANKED_JOBS, RANKING_SCORE_FLOOR};

use serde::{Deserialize, Serialize};

/// Categories a requirement set can score against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCategory {
    Education,
    Skills,
    Experience,
    Academic,
    Certificates,
}

/// Per-category verdict surfaced alongside the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub category: MatchCategory,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<u8>,
}

/// Derived match verdict. Never stored; recomputed from the current
/// candidate and requirement set every time it is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationResult {
    pub score: u8,
    pub matched_categories: Vec<CategoryMatch>,
    pub qualified: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_requirements: Vec<String>,
}

/// How a caller turns sub-scores into a qualified/not-qualified verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QualificationRule {
    /// AND of every present sub-check; used by the course application gate.
    CourseGate,
    /// Composite score against the 60-point threshold; used by job ranking.
    JobThreshold,
}

/// Stateless scorer applying one named weight profile.
#[derive(Debug, Clone)]
pub struct QualificationScorer {
    profile: WeightProfile,
    rule: QualificationRule,
}

impl QualificationScorer {
    /// Scorer for the job discovery path: weighted composite, qualified at
    /// the 60-point threshold.
    pub fn job_ranking() -> Self {
        Self {
            profile: WeightProfile::job_ranking(),
            rule: QualificationRule::JobThreshold,
        }
    }

    /// Scorer for the course application gate: AND of present sub-checks,
    /// with per-check missing-requirement messages.
    pub fn course_application() -> Self {
        Self {
            profile: WeightProfile::course_application(),
            rule: QualificationRule::CourseGate,
        }
    }

    pub fn profile(&self) -> &WeightProfile {
        &self.profile
    }

    pub fn score(&self, candidate: &Candidate, requirements: &RequirementSet) -> QualificationResult {
        let (matched_categories, score, signals) =
            rules::score_requirements(candidate, requirements, &self.profile);

        let (qualified, missing_requirements) = match self.rule {
            QualificationRule::CourseGate => policy::course_qualification(requirements, &signals),
            QualificationRule::JobThreshold => (policy::job_qualified(score), Vec::new()),
        };

        QualificationResult {
            score,
            matched_categories,
            qualified,
            missing_requirements,
        }
    }
}
