use super::domain::{fuzzy_match, Candidate, RequirementSet};
use super::weights::WeightProfile;
use super::{CategoryMatch, MatchCategory};

/// Raw per-category readings handed to the qualification policies. `None`
/// means the requirement is absent and the category was excluded.
pub(crate) struct CategorySignals {
    pub education_met: Option<bool>,
    pub gpa_met: Option<bool>,
    pub missing_skills: Vec<String>,
    pub experience_credit: Option<f64>,
    pub required_years: Option<f64>,
    pub total_years: f64,
    pub missing_certificates: Vec<String>,
}

fn percentage(credit: f64) -> u8 {
    (credit * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Score a candidate against a requirement set. Only categories whose
/// requirement is present contribute a `CategoryMatch`; only those that also
/// carry profile weight enter the composite. With no contributing category
/// the composite is a full 100.
pub(crate) fn score_requirements(
    candidate: &Candidate,
    requirements: &RequirementSet,
    profile: &WeightProfile,
) -> (Vec<CategoryMatch>, u8, CategorySignals) {
    let mut categories = Vec::new();
    let mut weighted_sum = 0.0_f64;
    let mut applied_weights = 0_u32;

    let mut signals = CategorySignals {
        education_met: None,
        gpa_met: None,
        missing_skills: Vec::new(),
        experience_credit: None,
        required_years: None,
        total_years: candidate.total_experience_years(),
        missing_certificates: Vec::new(),
    };

    if let Some(required_level) = requirements.education {
        // Binary: the highest level held either clears the bar or it doesn't.
        let met = candidate
            .highest_education()
            .map(|held| held.rank() >= required_level.rank())
            .unwrap_or(false);
        signals.education_met = Some(met);
        categories.push(CategoryMatch {
            category: MatchCategory::Education,
            matched: met,
            match_percentage: None,
        });
        if profile.education > 0 {
            let credit = if met { 1.0 } else { 0.0 };
            weighted_sum += credit * f64::from(profile.education);
            applied_weights += profile.education;
        }
    }

    if !requirements.skills.is_empty() {
        let mut matched = 0usize;
        for required in &requirements.skills {
            let hit = candidate
                .skills
                .iter()
                .any(|held| fuzzy_match(held, required));
            if hit {
                matched += 1;
            } else {
                signals.missing_skills.push(required.clone());
            }
        }
        let credit = matched as f64 / requirements.skills.len() as f64;
        categories.push(CategoryMatch {
            category: MatchCategory::Skills,
            matched: matched == requirements.skills.len(),
            match_percentage: Some(percentage(credit)),
        });
        if profile.skills > 0 {
            weighted_sum += credit * f64::from(profile.skills);
            applied_weights += profile.skills;
        }
    }

    if let Some(level) = requirements.experience_level {
        let threshold = level.minimum_years();
        if threshold > 0.0 {
            let credit = (signals.total_years / threshold).min(1.0);
            signals.experience_credit = Some(credit);
            signals.required_years = Some(threshold);
            categories.push(CategoryMatch {
                category: MatchCategory::Experience,
                matched: credit >= 1.0,
                match_percentage: Some(percentage(credit)),
            });
            if profile.experience > 0 {
                weighted_sum += credit * f64::from(profile.experience);
                applied_weights += profile.experience;
            }
        }
    }

    if let Some(min_gpa) = requirements.effective_min_gpa() {
        let gpa = candidate.highest_gpa().unwrap_or(0.0);
        let credit = if gpa >= min_gpa {
            1.0
        } else {
            (gpa / min_gpa).clamp(0.0, 1.0)
        };
        signals.gpa_met = Some(gpa >= min_gpa);
        categories.push(CategoryMatch {
            category: MatchCategory::Academic,
            matched: gpa >= min_gpa,
            match_percentage: Some(percentage(credit)),
        });
        if profile.academic > 0 {
            weighted_sum += credit * f64::from(profile.academic);
            applied_weights += profile.academic;
        }
    }

    if !requirements.required_certificates.is_empty() {
        let mut matched = 0usize;
        for required in &requirements.required_certificates {
            let hit = candidate
                .certificates
                .iter()
                .any(|held| fuzzy_match(&held.name, required));
            if hit {
                matched += 1;
            } else {
                signals.missing_certificates.push(required.clone());
            }
        }
        let credit = matched as f64 / requirements.required_certificates.len() as f64;
        categories.push(CategoryMatch {
            category: MatchCategory::Certificates,
            matched: matched == requirements.required_certificates.len(),
            match_percentage: Some(percentage(credit)),
        });
        if profile.certificates > 0 {
            weighted_sum += credit * f64::from(profile.certificates);
            applied_weights += profile.certificates;
        }
    }

    let score = if applied_weights == 0 {
        100
    } else {
        percentage(weighted_sum / f64::from(applied_weights))
    };

    (categories, score, signals)
}
