use serde::Serialize;

use super::domain::{Candidate, Target};
use super::weights::{MAX_RANKED_JOBS, RANKING_SCORE_FLOOR};
use super::{QualificationResult, QualificationScorer};

/// A job listing paired with the freshly computed match result.
#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    pub job: Target,
    pub result: QualificationResult,
}

/// Batch-score open jobs for a candidate. Jobs at or below the score floor
/// are dropped, the rest sort descending by score with ties keeping their
/// input order, truncated to the top ten. Nothing is persisted; a stored
/// score could go stale the moment the profile or listing changes.
pub fn rank_jobs(candidate: &Candidate, open_jobs: &[Target]) -> Vec<RankedJob> {
    let scorer = QualificationScorer::job_ranking();

    let mut ranked: Vec<RankedJob> = open_jobs
        .iter()
        .map(|job| RankedJob {
            job: job.clone(),
            result: scorer.score(candidate, &job.requirements),
        })
        .filter(|entry| entry.result.score > RANKING_SCORE_FLOOR)
        .collect();

    // Vec::sort_by is stable, preserving submission order on equal scores.
    ranked.sort_by(|a, b| b.result.score.cmp(&a.result.score));
    ranked.truncate(MAX_RANKED_JOBS);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::matching::domain::{
        EducationEntry, EducationLevel, RequirementSet, TargetKind, TargetStatus,
    };

    fn candidate_with_gpa(gpa: f64) -> Candidate {
        Candidate {
            id: "stu-100".to_string(),
            full_name: "Jordan Reyes".to_string(),
            education: vec![EducationEntry {
                level: EducationLevel::Bachelors,
                field: "Software Engineering".to_string(),
                gpa,
                institution: "Hillcrest College".to_string(),
                start_year: 2018,
                end_year: Some(2022),
            }],
            skills: Vec::new(),
            work_experience: Vec::new(),
            certificates: Vec::new(),
            preferred_location: None,
        }
    }

    /// A job whose only requirement is a minimum GPA scores exactly
    /// `round(gpa / min * 100)`, letting tests pin composite scores.
    fn job(id: &str, min_gpa: f64) -> Target {
        Target {
            id: id.to_string(),
            kind: TargetKind::Job,
            title: format!("Role {id}"),
            institution_id: "co-001".to_string(),
            institution_name: "Initech".to_string(),
            location: None,
            status: TargetStatus::Active,
            requirements: RequirementSet {
                min_gpa: Some(min_gpa),
                ..RequirementSet::default()
            },
        }
    }

    #[test]
    fn filters_below_floor_and_sorts_descending() {
        let candidate = candidate_with_gpa(2.0);
        // GPA 2.0 against these minimums yields scores 90, 40, 70, 55, 10.
        let jobs = vec![
            job("j-90", 2.0 / 0.90),
            job("j-40", 5.0),
            job("j-70", 2.0 / 0.70),
            job("j-55", 2.0 / 0.55),
            job("j-10", 20.0),
        ];

        let ranked = rank_jobs(&candidate, &jobs);
        let scores: Vec<u8> = ranked.iter().map(|entry| entry.result.score).collect();
        assert_eq!(scores, vec![90, 70, 55]);
    }

    #[test]
    fn equal_scores_preserve_input_order() {
        let candidate = candidate_with_gpa(3.0);
        let jobs = vec![job("first", 4.0), job("second", 4.0), job("third", 4.0)];

        let ranked = rank_jobs(&candidate, &jobs);
        let ids: Vec<&str> = ranked.iter().map(|entry| entry.job.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn truncates_to_the_top_ten() {
        let candidate = candidate_with_gpa(3.5);
        let jobs: Vec<Target> = (0..15).map(|index| job(&format!("j-{index}"), 3.0)).collect();

        let ranked = rank_jobs(&candidate, &jobs);
        assert_eq!(ranked.len(), 10);
    }

    #[test]
    fn a_score_exactly_at_the_floor_is_dropped() {
        let candidate = candidate_with_gpa(1.0);
        let jobs = vec![job("boundary", 2.0)];

        let ranked = rank_jobs(&candidate, &jobs);
        assert!(ranked.is_empty());
    }
}
