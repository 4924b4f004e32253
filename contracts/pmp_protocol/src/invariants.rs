#![allow(dead_code)]

extern crate std;

use crate::types::{PledgeRecord, Project, ProjectStatus};

/// INV-1: Funded amount stays within `[0, cap]`.
pub fn assert_within_cap(project: &Project) {
    assert!(
        project.amount_funded >= 0 && project.amount_funded <= project.cap,
        "INV-1 violated: project {} funded {} outside [0, {}]",
        project.id,
        project.amount_funded,
        project.cap
    );
}

/// INV-2: Cap is always positive.
pub fn assert_cap_positive(project: &Project) {
    assert!(
        project.cap > 0,
        "INV-2 violated: project {} has non-positive cap ({})",
        project.id,
        project.cap
    );
}

/// INV-3: Status is Funded exactly when the cap has been reached.
pub fn assert_status_matches_funding(project: &Project) {
    let expected = if project.amount_funded == project.cap {
        ProjectStatus::Funded
    } else {
        ProjectStatus::Open
    };
    assert_eq!(
        project.status, expected,
        "INV-3 violated: project {} status {:?} with {} of {} funded",
        project.id, project.status, project.amount_funded, project.cap
    );
}

/// INV-4: `amount_funded` never decreases.
pub fn assert_funding_monotonic(before: &Project, after: &Project) {
    assert!(
        after.amount_funded >= before.amount_funded,
        "INV-4 violated: project {} funding decreased from {} to {}",
        after.id,
        before.amount_funded,
        after.amount_funded
    );
}

/// INV-5: `total_donated` never decreases, even across strategy replacement.
pub fn assert_donation_monotonic(before: &PledgeRecord, after: &PledgeRecord) {
    assert!(
        after.total_donated >= before.total_donated,
        "INV-5 violated: total_donated decreased from {} to {}",
        before.total_donated,
        after.total_donated
    );
}

/// INV-6: Project IDs are sequential starting from 0.
pub fn assert_sequential_ids(projects: &[Project]) {
    for (i, project) in projects.iter().enumerate() {
        assert_eq!(
            project.id, i as u64,
            "INV-6 violated: expected id {}, got {}",
            i, project.id
        );
    }
}

/// INV-7: Fields fixed at creation never change.
pub fn assert_project_immutable_fields(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "INV-7 violated: project id changed");
    assert_eq!(original.name, current.name, "INV-7 violated: name changed");
    assert_eq!(
        original.description, current.description,
        "INV-7 violated: description changed"
    );
    assert_eq!(
        original.recipient, current.recipient,
        "INV-7 violated: recipient changed"
    );
    assert_eq!(original.asset, current.asset, "INV-7 violated: asset changed");
    assert_eq!(original.cap, current.cap, "INV-7 violated: cap changed");
    assert_eq!(
        original.duration, current.duration,
        "INV-7 violated: duration changed"
    );
}

/// INV-8: Contributions summed over a project's contributors equal its
/// funded amount (cap enforced globally, not per contributor).
pub fn assert_contributions_sum(project: &Project, records: &[PledgeRecord]) {
    let sum: i128 = records.iter().map(|r| r.total_donated).sum();
    assert_eq!(
        sum, project.amount_funded,
        "INV-8 violated: contributions {} != funded {} for project {}",
        sum, project.amount_funded, project.id
    );
}

/// Run all stateless project invariants.
pub fn assert_all_project_invariants(project: &Project) {
    assert_within_cap(project);
    assert_cap_positive(project);
    assert_status_matches_funding(project);
}
