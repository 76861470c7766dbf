use serde::{Deserialize, Serialize};

/// Ordered academic attainment scale. Ordering follows the declared rank so
/// `candidate_level >= required_level` reads directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    Diploma,
    Bachelors,
    Masters,
    Phd,
}

impl EducationLevel {
    pub const fn rank(self) -> u8 {
        match self {
            EducationLevel::HighSchool => 1,
            EducationLevel::Diploma => 2,
            EducationLevel::Bachelors => 3,
            EducationLevel::Masters => 4,
            EducationLevel::Phd => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "high school",
            EducationLevel::Diploma => "diploma",
            EducationLevel::Bachelors => "bachelors",
            EducationLevel::Masters => "masters",
            EducationLevel::Phd => "phd",
        }
    }
}

/// Experience bands advertised on job and course listings, each mapping to a
/// minimum-years threshold used by the experience sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceLevel {
    Internship,
    EntryLevel,
    MidLevel,
    Senior,
}

impl ExperienceLevel {
    pub const fn minimum_years(self) -> f64 {
        match self {
            ExperienceLevel::Internship => 0.5,
            ExperienceLevel::EntryLevel => 1.0,
            ExperienceLevel::MidLevel => 3.0,
            ExperienceLevel::Senior => 5.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "internship",
            ExperienceLevel::EntryLevel => "entry-level",
            ExperienceLevel::MidLevel => "mid-level",
            ExperienceLevel::Senior => "senior",
        }
    }
}

/// One academic record on a student profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub level: EducationLevel,
    pub field: String,
    pub gpa: f64,
    pub institution: String,
    pub start_year: u16,
    #[serde(default)]
    pub end_year: Option<u16>,
}

/// One employment record on a student profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperienceEntry {
    pub position: String,
    pub company: String,
    pub years: f64,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A certificate held by the student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateEntry {
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub issue_date: Option<String>,
}

/// Student profile projection used as scoring input. Owned by the student and
/// treated as an immutable snapshot here: scoring never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperienceEntry>,
    #[serde(default)]
    pub certificates: Vec<CertificateEntry>,
    #[serde(default)]
    pub preferred_location: Option<String>,
}

impl Candidate {
    /// Highest ranked education level held, if any.
    pub fn highest_education(&self) -> Option<EducationLevel> {
        self.education.iter().map(|entry| entry.level).max()
    }

    /// Best GPA across all education entries.
    pub fn highest_gpa(&self) -> Option<f64> {
        self.education
            .iter()
            .map(|entry| entry.gpa)
            .fold(None, |best, gpa| match best {
                Some(current) if current >= gpa => Some(current),
                _ => Some(gpa),
            })
    }

    /// Total declared years across all work experience entries.
    pub fn total_experience_years(&self) -> f64 {
        self.work_experience.iter().map(|entry| entry.years).sum()
    }
}

/// Qualification criteria attached to a course or job listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    #[serde(default)]
    pub education: Option<EducationLevel>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub min_gpa: Option<f64>,
    #[serde(default)]
    pub required_certificates: Vec<String>,
}

impl RequirementSet {
    /// GPA requirements at or below zero carry no signal and are ignored.
    pub fn effective_min_gpa(&self) -> Option<f64> {
        self.min_gpa.filter(|min| *min > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Course,
    Job,
}

impl TargetKind {
    pub const fn label(self) -> &'static str {
        match self {
            TargetKind::Course => "course",
            TargetKind::Job => "job",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Active,
    Closed,
}

/// A course or job listing as the matching core sees it. Listings are closed
/// rather than deleted while applications still reference them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub kind: TargetKind,
    pub title: String,
    pub institution_id: String,
    pub institution_name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub status: TargetStatus,
    #[serde(default)]
    pub requirements: RequirementSet,
}

impl Target {
    pub fn is_open(&self) -> bool {
        self.status == TargetStatus::Active
    }
}

/// Case-insensitive bidirectional substring match used for skills and
/// certificates. The looseness is intentional ("reactjs" matches "React");
/// tightening it changes scoring outcomes.
pub(crate) fn fuzzy_match(left: &str, right: &str) -> bool {
    let left = left.trim().to_lowercase();
    let right = right.trim().to_lowercase();
    if left.is_empty() || right.is_empty() {
        return false;
    }
    left.contains(&right) || right.contains(&left)
}
