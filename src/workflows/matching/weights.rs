use serde::Serialize;

/// Minimum composite score for a job match to count as qualified.
pub const JOB_QUALIFICATION_THRESHOLD: u8 = 60;

/// Ranked job results below or at this score are dropped.
pub const RANKING_SCORE_FLOOR: u8 = 50;

/// Ranked job results are truncated to this many entries.
pub const MAX_RANKED_JOBS: usize = 10;

/// Category weights applied when folding sub-scores into the composite.
/// Categories with weight zero never contribute, even when a requirement is
/// present; they may still gate qualification on the course path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeightProfile {
    pub name: &'static str,
    pub education: u32,
    pub skills: u32,
    pub experience: u32,
    pub academic: u32,
    pub certificates: u32,
}

impl WeightProfile {
    /// Weights used when ranking open jobs for a student. Sums to 100.
    pub const fn job_ranking() -> Self {
        Self {
            name: "job-ranking",
            education: 20,
            skills: 25,
            experience: 20,
            academic: 25,
            certificates: 10,
        }
    }

    /// Weights used when checking a course application. The course gate keys
    /// on sub-checks rather than the composite, so only the displayed score
    /// uses these.
    pub const fn course_application() -> Self {
        Self {
            name: "course-application",
            education: 0,
            skills: 30,
            experience: 30,
            academic: 40,
            certificates: 0,
        }
    }
}
