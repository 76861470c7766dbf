use super::domain::RequirementSet;
use super::rules::CategorySignals;
use super::weights::JOB_QUALIFICATION_THRESHOLD;

/// Job ranking treats qualification as a soft threshold over the composite.
pub(crate) fn job_qualified(score: u8) -> bool {
    score >= JOB_QUALIFICATION_THRESHOLD
}

/// Course applications gate on the AND of every present sub-check instead of
/// the composite. A listing with no education requirement short-circuits to
/// qualified with nothing missing; that asymmetry with the job path is
/// intentional.
pub(crate) fn course_qualification(
    requirements: &RequirementSet,
    signals: &CategorySignals,
) -> (bool, Vec<String>) {
    let required_level = match requirements.education {
        Some(level) => level,
        None => return (true, Vec::new()),
    };

    let mut missing = Vec::new();

    if signals.education_met != Some(true) {
        missing.push(format!("requires a {} or higher", required_level.label()));
    }

    if signals.gpa_met == Some(false) {
        if let Some(min_gpa) = requirements.effective_min_gpa() {
            missing.push(format!("minimum GPA of {min_gpa:.1}"));
        }
    }

    for skill in &signals.missing_skills {
        missing.push(format!("missing required skill: {skill}"));
    }

    if let (Some(credit), Some(required_years)) =
        (signals.experience_credit, signals.required_years)
    {
        if credit < 1.0 {
            missing.push(format!(
                "requires {required_years:.1} years of experience, has {:.1}",
                signals.total_years
            ));
        }
    }

    for certificate in &signals.missing_certificates {
        missing.push(format!("missing required certificate: {certificate}"));
    }

    (missing.is_empty(), missing)
}
