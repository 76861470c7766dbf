use std::sync::Arc;

use crate::store::MemoryDocumentStore;
use crate::workflows::admissions::domain::ApplicationStatus;
use crate::workflows::admissions::notify::NotificationKind;
use crate::workflows::admissions::service::AdmissionsError;
use crate::workflows::matching::{EducationLevel, RequirementSet, TargetStatus};

use super::common::{candidate, course, seed_student, seed_target, service};

#[test]
fn check_eligibility_is_idempotent_without_intervening_writes() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let course_id = seed_target(&store, &course("lakeside", "Applied Statistics"));
    let (service, _) = service(store);

    let first = service
        .check_eligibility(&student_id, &course_id)
        .expect("report");
    let second = service
        .check_eligibility(&student_id, &course_id)
        .expect("report");
    assert_eq!(first, second);
}

#[test]
fn missing_student_and_target_are_distinct_not_found_errors() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let (service, _) = service(store);

    match service.check_eligibility("doc-999999", "irrelevant") {
        Err(AdmissionsError::NotFound("student")) => {}
        other => panic!("expected student not found, got {other:?}"),
    }
    match service.check_eligibility(&student_id, "doc-999999") {
        Err(AdmissionsError::NotFound("target")) => {}
        other => panic!("expected target not found, got {other:?}"),
    }
}

#[test]
fn apply_creates_pending_application_with_denormalized_snapshot() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let course_id = seed_target(&store, &course("lakeside", "Applied Statistics"));
    let (service, sink) = service(store);

    let application = service
        .apply_for_target(&student_id, &course_id)
        .expect("application created");

    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.student_id, student_id);
    assert_eq!(application.target_id, course_id);
    assert_eq!(application.target_title, "Applied Statistics");
    assert_eq!(application.institution_name, "lakeside University");
    assert!(!application.student_selected);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationKind::ApplicationSubmitted);
    assert_eq!(
        events[0].related_application_id.as_deref(),
        Some(application.id.as_str())
    );
}

#[test]
fn duplicate_application_is_rejected_until_the_first_is_rejected() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let course_id = seed_target(&store, &course("lakeside", "Applied Statistics"));
    let (service, _) = service(store);

    let first = service
        .apply_for_target(&student_id, &course_id)
        .expect("first application");

    match service.apply_for_target(&student_id, &course_id) {
        Err(AdmissionsError::AlreadyApplied) => {}
        other => panic!("expected already applied, got {other:?}"),
    }

    service
        .update_application_status(&first.id, ApplicationStatus::Rejected, "registrar")
        .expect("rejection");

    let report = service
        .check_eligibility(&student_id, &course_id)
        .expect("report");
    assert!(!report.already_applied);
    service
        .apply_for_target(&student_id, &course_id)
        .expect("re-application after rejection");
}

#[test]
fn institution_cap_blocks_a_third_active_application() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let first = seed_target(&store, &course("lakeside", "Applied Statistics"));
    let second = seed_target(&store, &course("lakeside", "Linear Algebra"));
    let third = seed_target(&store, &course("lakeside", "Number Theory"));
    let (service, _) = service(store);

    let blocked_one = service
        .apply_for_target(&student_id, &first)
        .expect("first application");
    service
        .apply_for_target(&student_id, &second)
        .expect("second application");

    let report = service
        .check_eligibility(&student_id, &third)
        .expect("report");
    assert!(!report.can_apply_to_target);
    assert_eq!(report.current_application_count, 2);
    match service.apply_for_target(&student_id, &third) {
        Err(AdmissionsError::ApplicationCapExceeded) => {}
        other => panic!("expected cap exceeded, got {other:?}"),
    }

    // Rejecting one of the two frees a slot.
    service
        .update_application_status(&blocked_one.id, ApplicationStatus::Rejected, "registrar")
        .expect("rejection");
    let report = service
        .check_eligibility(&student_id, &third)
        .expect("report");
    assert!(report.can_apply_to_target);
    assert_eq!(report.current_application_count, 1);
}

#[test]
fn cap_is_per_institution_not_global() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let first = seed_target(&store, &course("lakeside", "Applied Statistics"));
    let second = seed_target(&store, &course("lakeside", "Linear Algebra"));
    let elsewhere = seed_target(&store, &course("hillcrest", "Data Mining"));
    let (service, _) = service(store);

    service.apply_for_target(&student_id, &first).expect("first");
    service
        .apply_for_target(&student_id, &second)
        .expect("second");

    let report = service
        .check_eligibility(&student_id, &elsewhere)
        .expect("report");
    assert!(report.can_apply_to_target);
    assert_eq!(report.current_application_count, 0);
}

#[test]
fn closed_target_is_reported_and_blocks_apply() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let mut listing = course("lakeside", "Applied Statistics");
    listing.status = TargetStatus::Closed;
    let course_id = seed_target(&store, &listing);
    let (service, _) = service(store);

    let report = service
        .check_eligibility(&student_id, &course_id)
        .expect("report");
    assert!(!report.target_available);

    match service.apply_for_target(&student_id, &course_id) {
        Err(AdmissionsError::TargetUnavailable) => {}
        other => panic!("expected target unavailable, got {other:?}"),
    }
}

#[test]
fn unqualified_candidate_sees_every_missing_requirement() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let mut listing = course("lakeside", "Graduate Seminar");
    listing.requirements = RequirementSet {
        education: Some(EducationLevel::Masters),
        min_gpa: Some(3.9),
        ..RequirementSet::default()
    };
    let course_id = seed_target(&store, &listing);
    let (service, _) = service(store);

    let report = service
        .check_eligibility(&student_id, &course_id)
        .expect("report");
    assert!(!report.qualified);
    assert_eq!(report.missing_requirements.len(), 2);
    // Both failing checks are visible at once; no short-circuit.
    assert!(report.target_available);
    assert!(report.can_apply_to_target);

    match service.apply_for_target(&student_id, &course_id) {
        Err(AdmissionsError::NotQualified { missing }) => {
            assert_eq!(missing.len(), 2);
        }
        other => panic!("expected not qualified, got {other:?}"),
    }
}

#[test]
fn rule_failures_do_not_mask_each_other() {
    let store = Arc::new(MemoryDocumentStore::new());
    let student_id = seed_student(&store, &candidate());
    let open_one = seed_target(&store, &course("lakeside", "Applied Statistics"));
    let open_two = seed_target(&store, &course("lakeside", "Linear Algebra"));
    let mut closed = course("lakeside", "Graduate Seminar");
    closed.status = TargetStatus::Closed;
    closed.requirements = RequirementSet {
        education: Some(EducationLevel::Phd),
        ..RequirementSet::default()
    };
    let closed_id = seed_target(&store, &closed);
    let (service, _) = service(store);

    service
        .apply_for_target(&student_id, &open_one)
        .expect("first");
    service
        .apply_for_target(&student_id, &open_two)
        .expect("second");

    let report = service
        .check_eligibility(&student_id, &closed_id)
        .expect("report");
    assert!(!report.target_available);
    assert!(!report.can_apply_to_target);
    assert!(!report.qualified);
    assert!(!report.already_applied);
    assert!(!report.allows_application());
}
