//! Guide balancing and panel resolution against the in-memory store.

mod support;

use chrono::{TimeZone, Utc};
use review_scheduler::config::GuideSelectionWindow;
use review_scheduler::db::repository::DirectoryRepository;
use review_scheduler::db::LocalRepository;
use review_scheduler::models::{FacultyId, PanelId, TeamId, TeamStatus};
use review_scheduler::services::{self, ErrorCategory, SchedulingError};
use support::{cohort, guide, guided, panel, team};

fn closed() -> GuideSelectionWindow {
    GuideSelectionWindow::closed_at(Utc.with_ymd_and_hms(2024, 1, 19, 17, 0, 0).unwrap())
}

#[tokio::test]
async fn test_auto_assign_prefers_least_loaded_guide() {
    let repo = LocalRepository::new();
    repo.insert_guide(guide("G1", 2));
    repo.insert_guide(guide("G2", 2));
    repo.insert_team(guided(
        team("T0", &["S0"], TeamStatus::Approved, None),
        "G2",
    ));
    repo.insert_team(team("T1", &["S1"], TeamStatus::Approved, None));
    repo.insert_team(team("T2", &["S2"], TeamStatus::Approved, None));

    let allocation = services::auto_assign_guides(&repo, &closed(), Utc::now(), 3)
        .await
        .unwrap();

    let pairs: Vec<(&str, &str)> = allocation
        .assigned
        .iter()
        .map(|a| (a.team_id.as_str(), a.guide_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("T1", "G1"), ("T2", "G1")]);
    assert_eq!(repo.guide_load(&FacultyId::from("G1")), 2);
    assert_eq!(repo.guide_load(&FacultyId::from("G2")), 1);
}

#[tokio::test]
async fn test_auto_assign_waits_for_selection_to_close() {
    let repo = cohort();
    let closes_at = Utc.with_ymd_and_hms(2024, 1, 19, 17, 0, 0).unwrap();
    let selection = GuideSelectionWindow::closed_at(closes_at);

    let err = services::auto_assign_guides(
        &repo,
        &selection,
        closes_at - chrono::TimeDelta::hours(1),
        3,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SchedulingError::GuideSelectionOpen { .. }));
    assert_eq!(err.category(), ErrorCategory::Prerequisite);

    let teams = repo.list_teams().await.unwrap();
    assert!(teams.iter().all(|t| t.guide.is_none()));
}

#[tokio::test]
async fn test_auto_assign_reports_unplaced_teams() {
    let repo = LocalRepository::new();
    repo.insert_guide(guide("G1", 1));
    repo.insert_team(team("T1", &["S1"], TeamStatus::Approved, None));
    repo.insert_team(team("T2", &["S2"], TeamStatus::Approved, None));
    repo.insert_team(team("T3", &["S3"], TeamStatus::Rejected, None));

    let allocation = services::auto_assign_guides(&repo, &closed(), Utc::now(), 3)
        .await
        .unwrap();
    assert_eq!(allocation.assigned.len(), 1);
    assert_eq!(allocation.unplaced, vec![TeamId::from("T2")]);
    assert!(repo
        .get_team(&TeamId::from("T3"))
        .await
        .unwrap()
        .unwrap()
        .guide
        .is_none());
}

#[tokio::test]
async fn test_manual_assignment_respects_capacity() {
    let repo = cohort();
    services::assign_guide(&repo, &TeamId::from("T4"), &FacultyId::from("F3"), 3)
        .await
        .unwrap();

    let err = services::assign_guide(&repo, &TeamId::from("T1"), &FacultyId::from("F3"), 3)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulingError::GuideAtCapacity { capacity: 1, .. }
    ));
    assert_eq!(repo.guide_load(&FacultyId::from("F3")), 1);

    // Same guide again is a no-op, not a capacity breach.
    let team = services::assign_guide(&repo, &TeamId::from("T4"), &FacultyId::from("F3"), 3)
        .await
        .unwrap();
    assert_eq!(team.guide, Some(FacultyId::from("F3")));
}

#[tokio::test]
async fn test_reassignment_moves_load() {
    let repo = cohort();
    let t4 = TeamId::from("T4");
    services::assign_guide(&repo, &t4, &FacultyId::from("F3"), 3)
        .await
        .unwrap();
    services::assign_guide(&repo, &t4, &FacultyId::from("F1"), 3)
        .await
        .unwrap();
    assert_eq!(repo.guide_load(&FacultyId::from("F3")), 0);
    assert_eq!(repo.guide_load(&FacultyId::from("F1")), 1);

    let team = services::remove_guide(&repo, &t4, 3).await.unwrap();
    assert!(team.guide.is_none());
    assert_eq!(repo.guide_load(&FacultyId::from("F1")), 0);
}

#[tokio::test]
async fn test_guide_on_team_panel_is_conflict_of_interest() {
    let repo = cohort();
    let err = services::assign_guide(&repo, &TeamId::from("T1"), &FacultyId::from("F1"), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::ConflictOfInterest { .. }));
}

#[tokio::test]
async fn test_unknown_guide_or_team() {
    let repo = cohort();
    let err = services::assign_guide(&repo, &TeamId::from("T9"), &FacultyId::from("F1"), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { entity: "team", .. }));
    let err = services::assign_guide(&repo, &TeamId::from("T4"), &FacultyId::from("F9"), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { entity: "guide", .. }));
}

#[tokio::test]
async fn test_available_panels_exclude_guide_and_order_by_load() {
    let repo = cohort();
    repo.insert_team(guided(
        team("T6", &["S61"], TeamStatus::Approved, None),
        "F3",
    ));

    let panels = services::available_panels(&repo, &TeamId::from("T6"))
        .await
        .unwrap();
    let listed: Vec<(&str, usize)> = panels
        .iter()
        .map(|o| (o.panel.id.as_str(), o.team_count))
        .collect();
    // P3 holds F3; P2 carries one team, P1 three.
    assert_eq!(listed, vec![("P2", 1), ("P1", 3)]);

    let unguided = services::available_panels(&repo, &TeamId::from("T5"))
        .await
        .unwrap();
    assert_eq!(unguided.len(), 3);
    assert_eq!(unguided[0].panel.id.as_str(), "P3");
}

#[tokio::test]
async fn test_defective_panel_never_offered() {
    let repo = cohort();
    repo.insert_panel(panel("P4", "Panel D", &[], Some("X2")));
    repo.insert_panel(panel("P5", "Panel E", &[], None));

    let panels = services::available_panels(&repo, &TeamId::from("T5"))
        .await
        .unwrap();
    assert!(panels.iter().all(|o| o.panel.id.as_str() != "P5"));
    // A lone external member is still a sound panel.
    assert!(panels.iter().any(|o| o.panel.id.as_str() == "P4"));

    let err = services::assign_panel(&repo, &TeamId::from("T5"), &PanelId::from("P5"), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn test_assign_panel_rechecks_conflict_of_interest() {
    let repo = cohort();
    repo.insert_team(guided(
        team("T6", &["S61"], TeamStatus::Approved, None),
        "F2",
    ));

    let err = services::assign_panel(&repo, &TeamId::from("T6"), &PanelId::from("P2"), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::ConflictOfInterest { .. }));
    assert_eq!(err.category(), ErrorCategory::Conflict);

    let team = services::assign_panel(&repo, &TeamId::from("T6"), &PanelId::from("P3"), 3)
        .await
        .unwrap();
    assert_eq!(team.panel, Some(PanelId::from("P3")));

    // Re-assignment overwrites the reference.
    let team = services::assign_panel(&repo, &TeamId::from("T6"), &PanelId::from("P1"), 3)
        .await
        .unwrap();
    assert_eq!(team.panel, Some(PanelId::from("P1")));
    let stored = repo.get_team(&TeamId::from("T6")).await.unwrap().unwrap();
    assert_eq!(stored.panel, Some(PanelId::from("P1")));
}

#[tokio::test]
async fn test_remove_guide_after_capacity_cut() {
    let repo = LocalRepository::new();
    repo.insert_guide(guide("G1", 3));
    for id in ["T1", "T2", "T3"] {
        repo.insert_team(guided(team(id, &[id], TeamStatus::Approved, None), "G1"));
    }
    repo.insert_guide(guide("G1", 1));

    let team = services::remove_guide(&repo, &TeamId::from("T1"), 3)
        .await
        .unwrap();
    assert!(team.guide.is_none());
    assert_eq!(repo.guide_load(&FacultyId::from("G1")), 2);

    // Still over capacity, so it cannot take a team back.
    let err = services::assign_guide(&repo, &TeamId::from("T1"), &FacultyId::from("G1"), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::GuideAtCapacity { capacity: 1, .. }));
}

#[tokio::test]
async fn test_auto_assign_uses_any_guide_with_room() {
    let repo = LocalRepository::new();
    repo.insert_panel(panel("P1", "Panel A", &["G1"], None));
    repo.insert_guide(guide("G1", 2));
    repo.insert_team(team("T1", &["S1"], TeamStatus::Approved, Some("P1")));

    let allocation = services::auto_assign_guides(&repo, &closed(), Utc::now(), 3)
        .await
        .unwrap();
    assert_eq!(allocation.assigned.len(), 1);
    assert_eq!(allocation.assigned[0].guide_id.as_str(), "G1");
    assert!(allocation.unplaced.is_empty());
    assert_eq!(repo.guide_load(&FacultyId::from("G1")), 1);
}
