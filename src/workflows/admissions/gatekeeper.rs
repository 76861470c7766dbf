use serde::Serialize;

use crate::workflows::matching::{QualificationResult, Target};

/// Default maximum number of non-rejected applications a student may hold
/// against one institution or company at a time.
pub const DEFAULT_INSTITUTION_CAP: usize = 2;

/// Tunables for the eligibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatekeeperPolicy {
    pub institution_cap: usize,
}

impl Default for GatekeeperPolicy {
    fn default() -> Self {
        Self {
            institution_cap: DEFAULT_INSTITUTION_CAP,
        }
    }
}

/// Structured multi-reason verdict so callers can show every blocking reason
/// at once rather than the first failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityReport {
    pub qualified: bool,
    pub can_apply_to_target: bool,
    pub target_available: bool,
    pub already_applied: bool,
    pub missing_requirements: Vec<String>,
    pub current_application_count: usize,
}

impl EligibilityReport {
    /// All four rules must pass for an application to proceed.
    pub fn allows_application(&self) -> bool {
        self.qualified && self.can_apply_to_target && self.target_available && !self.already_applied
    }
}

/// Applies the eligibility rules to signals the service gathers from the
/// store and providers. The four rules are evaluated independently; none
/// short-circuits another.
#[derive(Debug, Clone, Default)]
pub struct Gatekeeper {
    policy: GatekeeperPolicy,
}

impl Gatekeeper {
    pub fn new(policy: GatekeeperPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GatekeeperPolicy {
        &self.policy
    }

    pub fn report(
        &self,
        target: &Target,
        qualification: &QualificationResult,
        already_applied: bool,
        institution_application_count: usize,
    ) -> EligibilityReport {
        EligibilityReport {
            qualified: qualification.qualified,
            can_apply_to_target: institution_application_count < self.policy.institution_cap,
            target_available: target.is_open(),
            already_applied,
            missing_requirements: qualification.missing_requirements.clone(),
            current_application_count: institution_application_count,
        }
    }
}
