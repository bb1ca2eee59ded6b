//! Expanded tests for LocalRepository.
//!
//! These tests cover concurrent access patterns, edge cases and error
//! conditions of the in-memory store's conditional writes.

mod support;

use std::sync::Arc;

use review_scheduler::db::repositories::LocalRepository;
use review_scheduler::db::repository::{DirectoryRepository, RepositoryError, ScheduleRepository};
use review_scheduler::models::{
    FacultyId, NewScheduleRecord, PanelId, ReviewSlot, ReviewType, ScheduleRecordId, TeamId,
    TeamStatus,
};
use review_scheduler::services;
use support::{cohort, guide, guided, team, window};

fn slot_at(h: u32, m: u32) -> ReviewSlot {
    let end = if m == 30 { (h + 1, 0) } else { (h, 30) };
    services::generate_slots(ReviewType::Review1, &window((h, m), end, 30))
        .unwrap()
        .remove(0)
}

fn booking(team: &str, panel: &str, slot: ReviewSlot) -> NewScheduleRecord {
    NewScheduleRecord {
        team: TeamId::from(team),
        panel: PanelId::from(panel),
        slot,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_at_same_revision_one_wins() {
    let repo = Arc::new(cohort());
    let revision = repo.revision().await.unwrap();

    let handles: Vec<_> = ["T1", "T2", "T3"]
        .into_iter()
        .enumerate()
        .map(|(i, team)| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                repo.insert_schedule_records(
                    revision,
                    vec![booking(team, "P1", slot_at(9 + i as u32, 0))],
                )
                .await
            })
        })
        .collect();

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(e) => {
                assert!(e.is_conflict());
                conflicts += 1;
            }
        }
    }
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 2);
    assert_eq!(repo.record_count(), 1);
    assert_eq!(repo.revision().await.unwrap(), revision + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_during_writes() {
    let repo = Arc::new(cohort());
    let mut handles = Vec::new();

    for _ in 0..8 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            for _ in 0..20 {
                let teams = repo.list_teams().await.unwrap();
                assert_eq!(teams.len(), 5);
                repo.list_schedule_records(ReviewType::Review1).await.unwrap();
            }
        }));
    }

    let writer = {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move {
            for (i, team) in ["T1", "T2", "T3"].into_iter().enumerate() {
                let revision = repo.revision().await.unwrap();
                repo.insert_schedule_records(
                    revision,
                    vec![booking(team, "P1", slot_at(9 + i as u32, 0))],
                )
                .await
                .unwrap();
            }
        })
    };

    for handle in handles {
        handle.await.unwrap();
    }
    writer.await.unwrap();
    assert_eq!(repo.record_count(), 3);
}

#[tokio::test]
async fn test_records_listed_by_panel_then_start() {
    let repo = cohort();
    let revision = repo.revision().await.unwrap();
    repo.insert_schedule_records(
        revision,
        vec![
            booking("T1", "P1", slot_at(10, 0)),
            booking("T4", "P2", slot_at(9, 0)),
            booking("T2", "P1", slot_at(9, 0)),
        ],
    )
    .await
    .unwrap();

    let listed = repo
        .list_schedule_records(ReviewType::Review1)
        .await
        .unwrap();
    let order: Vec<&str> = listed.iter().map(|r| r.team.as_str()).collect();
    assert_eq!(order, vec!["T2", "T1", "T4"]);

    assert!(repo
        .list_schedule_records(ReviewType::Review2)
        .await
        .unwrap()
        .is_empty());

    let t1 = repo.records_for_team(&TeamId::from("T1")).await.unwrap();
    assert_eq!(t1.len(), 1);
}

#[tokio::test]
async fn test_same_interval_on_other_panel_is_allowed() {
    let repo = cohort();
    let revision = repo.revision().await.unwrap();
    let stored = repo
        .insert_schedule_records(
            revision,
            vec![
                booking("T1", "P1", slot_at(9, 0)),
                booking("T4", "P2", slot_at(9, 0)),
            ],
        )
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].id, stored[1].id);
}

#[tokio::test]
async fn test_second_booking_for_team_is_refused() {
    let repo = cohort();
    let revision = repo.revision().await.unwrap();
    repo.insert_schedule_records(revision, vec![booking("T1", "P1", slot_at(9, 0))])
        .await
        .unwrap();

    let revision = repo.revision().await.unwrap();
    let err = repo
        .insert_schedule_records(revision, vec![booking("T1", "P1", slot_at(11, 0))])
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(repo.revision().await.unwrap(), revision);
}

#[tokio::test]
async fn test_unknown_references_are_not_found() {
    let repo = cohort();
    let revision = repo.revision().await.unwrap();

    let err = repo
        .insert_schedule_records(revision, vec![booking("T9", "P1", slot_at(9, 0))])
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let err = repo
        .set_team_panel(revision, &TeamId::from("T1"), Some(PanelId::from("P9")))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let err = repo
        .set_team_guides(revision, &[(TeamId::from("T1"), Some(FacultyId::from("F9")))])
        .await
        .unwrap_err();
    assert_eq!(err.context().entity, Some("guide".to_string()));

    let err = repo
        .delete_schedule_record(revision, ScheduleRecordId::new(99))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert_eq!(repo.revision().await.unwrap(), revision);
}

#[tokio::test]
async fn test_update_keeps_id_and_rechecks_overlap() {
    let repo = cohort();
    let revision = repo.revision().await.unwrap();
    let stored = repo
        .insert_schedule_records(
            revision,
            vec![
                booking("T1", "P1", slot_at(9, 0)),
                booking("T2", "P1", slot_at(9, 30)),
            ],
        )
        .await
        .unwrap();

    let mut moved = stored[0].clone();
    let onto_t2 = slot_at(9, 30);
    moved.start = onto_t2.start;
    moved.end = onto_t2.end;
    let revision = repo.revision().await.unwrap();
    let err = repo
        .update_schedule_record(revision, moved.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    let later = slot_at(11, 0);
    moved.start = later.start;
    moved.end = later.end;
    let updated = repo.update_schedule_record(revision, moved).await.unwrap();
    assert_eq!(updated.id, stored[0].id);
    let fetched = repo.get_schedule_record(stored[0].id).await.unwrap().unwrap();
    assert_eq!(fetched.start, later.start);
}

#[tokio::test]
async fn test_unhealthy_repository_refuses_reads_and_writes() {
    let repo = cohort();
    let revision = repo.revision().await.unwrap();
    repo.set_healthy(false);

    assert!(!repo.health_check().await.unwrap());
    let err = repo.list_teams().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(repo.revision().await.is_err());
    assert!(repo
        .insert_schedule_records(revision, vec![booking("T1", "P1", slot_at(9, 0))])
        .await
        .is_err());

    repo.set_healthy(true);
    assert!(repo.health_check().await.unwrap());
    assert_eq!(repo.record_count(), 0);
}

#[tokio::test]
async fn test_clear_empties_store_and_moves_revision() {
    let repo = cohort();
    let before = repo.revision().await.unwrap();
    repo.clear();

    assert!(repo.list_teams().await.unwrap().is_empty());
    assert_eq!(repo.guide_count(), 0);
    assert!(repo.revision().await.unwrap() > before);
}

#[tokio::test]
async fn test_cloned_repository_shares_state() {
    let repo = cohort();
    let clone = repo.clone();

    let revision = clone.revision().await.unwrap();
    clone
        .insert_schedule_records(revision, vec![booking("T4", "P2", slot_at(9, 0))])
        .await
        .unwrap();
    assert_eq!(repo.record_count(), 1);
    assert_eq!(repo.revision().await.unwrap(), revision + 1);
}

/// G1 guides three teams, then its capacity is cut to one.
fn overloaded_guide() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.insert_guide(guide("G1", 3));
    repo.insert_guide(guide("G2", 2));
    for id in ["T1", "T2", "T3"] {
        repo.insert_team(guided(team(id, &[id], TeamStatus::Approved, None), "G1"));
    }
    repo.insert_guide(guide("G1", 1));
    repo
}

#[tokio::test]
async fn test_teams_can_leave_guide_over_capacity() {
    let repo = overloaded_guide();
    let g1 = FacultyId::from("G1");

    let revision = repo.revision().await.unwrap();
    repo.set_team_guides(revision, &[(TeamId::from("T1"), None)])
        .await
        .unwrap();
    assert_eq!(repo.guide_load(&g1), 2);

    let revision = repo.revision().await.unwrap();
    repo.set_team_guides(
        revision,
        &[(TeamId::from("T2"), Some(FacultyId::from("G2")))],
    )
    .await
    .unwrap();
    assert_eq!(repo.guide_load(&g1), 1);
    assert_eq!(repo.guide_load(&FacultyId::from("G2")), 1);
}

#[tokio::test]
async fn test_guide_over_capacity_cannot_gain_teams() {
    let repo = overloaded_guide();
    repo.insert_team(team("T4", &["T4"], TeamStatus::Approved, None));

    let revision = repo.revision().await.unwrap();
    let err = repo
        .set_team_guides(
            revision,
            &[
                (TeamId::from("T1"), None),
                (TeamId::from("T4"), Some(FacultyId::from("G1"))),
            ],
        )
        .await
        .unwrap_err();
    // Swapping one team out for another keeps the load at three.
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(repo.guide_load(&FacultyId::from("G1")), 3);
}

#[test]
fn test_repository_default_trait() {
    let repo = LocalRepository::default();
    assert_eq!(repo.record_count(), 0);
    assert_eq!(repo.guide_count(), 0);
}
