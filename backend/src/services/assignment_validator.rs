//! Batch validation and commit of slot assignments.
//!
//! A commit covers every in-scope team of a review session at once. The whole
//! batch is checked first; any violation rejects it and nothing is written.
//! The write itself is conditioned on the store revision the batch was
//! validated against, and is re-validated from scratch a bounded number of
//! times when another writer got there first.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::error::{SchedulingError, SchedulingResult, Violation, ViolationKind};
use super::prerequisite_gate::Eligibility;
use super::scope::ReviewScope;
use crate::db::repository::FullRepository;
use crate::models::{NewScheduleRecord, PanelId, ReviewSlot, ReviewType, ScheduleRecord, SlotKey, TeamId};

/// One row of a commit batch. `slot` is `None` when the coordinator left the
/// team unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub team_id: TeamId,
    #[serde(default)]
    pub slot: Option<ReviewSlot>,
}

impl SlotAssignment {
    pub fn new(team_id: impl Into<TeamId>, slot: ReviewSlot) -> Self {
        Self {
            team_id: team_id.into(),
            slot: Some(slot),
        }
    }

    pub fn unassigned(team_id: impl Into<TeamId>) -> Self {
        Self {
            team_id: team_id.into(),
            slot: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    /// Restrict the session to the teams of one panel.
    #[serde(default)]
    pub panel_id: Option<PanelId>,
    pub assignments: Vec<SlotAssignment>,
}

/// Check a batch against a scope snapshot.
///
/// Returns the records to insert, or every violation found. Slot checks run
/// in batch order, so when two rows claim the same slot only the later one is
/// reported.
pub fn validate_batch(
    scope: &ReviewScope,
    assignments: &[SlotAssignment],
) -> Result<Vec<NewScheduleRecord>, Vec<Violation>> {
    let mut violations = Vec::new();
    let mut staged: Vec<NewScheduleRecord> = Vec::new();
    let mut listed: BTreeSet<TeamId> = BTreeSet::new();
    let mut claimed_keys: HashMap<SlotKey, TeamId> = HashMap::new();

    for assignment in assignments {
        let team_id = &assignment.team_id;

        let Some(team) = scope.teams.get(team_id) else {
            violations.push(Violation::new(
                team_id.clone(),
                ViolationKind::UnknownTeam,
                format!("team {} does not exist", team_id),
            ));
            continue;
        };

        if !listed.insert(team_id.clone()) {
            violations.push(Violation::new(
                team_id.clone(),
                ViolationKind::IncompleteAssignment,
                "team is listed more than once",
            ));
            continue;
        }

        if !scope.is_candidate(team) {
            let detail = if !team.is_approved() {
                "team is not approved".to_string()
            } else if team.panel.is_none() {
                "team has no panel".to_string()
            } else {
                format!(
                    "team belongs to panel {}",
                    team.panel.as_ref().map(|p| p.as_str()).unwrap_or_default()
                )
            };
            violations.push(Violation::new(team_id.clone(), ViolationKind::OutOfScope, detail));
            continue;
        }

        if let Some(existing) = scope.booking_of(team_id) {
            violations.push(
                Violation::new(
                    team_id.clone(),
                    ViolationKind::AlreadyScheduled,
                    format!("team already holds record {} for {}", existing.id, scope.review_type),
                )
                .at_slot(existing.key()),
            );
            continue;
        }

        if let Some(Eligibility::Blocked(reason)) = scope.eligibility_of(team_id) {
            violations.push(Violation::new(
                team_id.clone(),
                ViolationKind::PrerequisiteNotMet(reason),
                format!("team is not eligible for {}", scope.review_type),
            ));
            continue;
        }

        let Some(slot) = &assignment.slot else {
            violations.push(Violation::new(
                team_id.clone(),
                ViolationKind::IncompleteAssignment,
                "team has no slot",
            ));
            continue;
        };
        let key = slot.key();

        if let Some(problem) = slot_problem(slot, scope.review_type) {
            violations.push(
                Violation::new(team_id.clone(), ViolationKind::InvalidSlot, problem).at_slot(key),
            );
            continue;
        }

        if let Some(holder) = claimed_keys.get(&key) {
            violations.push(
                Violation::new(
                    team_id.clone(),
                    ViolationKind::DuplicateSlot,
                    format!("slot is already assigned to team {} in this batch", holder),
                )
                .at_slot(key),
            );
            continue;
        }

        // A candidate always has a panel.
        let Some(panel) = team.panel.clone() else {
            continue;
        };

        if let Some(stored) = scope
            .records
            .iter()
            .find(|r| r.clashes_with(&panel, scope.review_type, &key))
        {
            violations.push(
                Violation::new(
                    team_id.clone(),
                    ViolationKind::DuplicateSlot,
                    format!(
                        "slot overlaps record {} of team {} on panel {}",
                        stored.id, stored.team, panel
                    ),
                )
                .at_slot(key),
            );
            continue;
        }

        if let Some(earlier) = staged
            .iter()
            .find(|s| s.panel == panel && s.slot.key().overlaps(&key))
        {
            violations.push(
                Violation::new(
                    team_id.clone(),
                    ViolationKind::DuplicateSlot,
                    format!(
                        "slot overlaps the slot of team {} on panel {}",
                        earlier.team, panel
                    ),
                )
                .at_slot(key),
            );
            continue;
        }

        claimed_keys.insert(key, team_id.clone());
        staged.push(NewScheduleRecord {
            team: team_id.clone(),
            panel,
            slot: slot.clone(),
        });
    }

    for team in scope.teams_in_scope() {
        if !listed.contains(&team.id) {
            violations.push(Violation::new(
                team.id.clone(),
                ViolationKind::IncompleteAssignment,
                "in-scope team is missing from the batch",
            ));
        }
    }

    if violations.is_empty() {
        Ok(staged)
    } else {
        Err(violations)
    }
}

pub(crate) fn slot_problem(slot: &ReviewSlot, review_type: ReviewType) -> Option<String> {
    if !slot.key().is_well_formed() {
        return Some(format!("interval {} is empty or reversed", slot.key()));
    }
    if slot.review_type != review_type {
        return Some(format!(
            "slot was generated for {}, not {}",
            slot.review_type, review_type
        ));
    }
    if slot.length().num_minutes() != i64::from(slot.duration_minutes) {
        return Some(format!(
            "slot spans {} minutes but declares {}",
            slot.length().num_minutes(),
            slot.duration_minutes
        ));
    }
    None
}

/// CommitAssignments: validate and atomically persist a session's bookings.
///
/// # Errors
/// * `Validation` - the batch is empty
/// * `NotFound` - `panel_id` names no panel
/// * `Rejected` - one or more rows failed; nothing was written
/// * `Conflict` - the store kept changing for `max_attempts` attempts
pub async fn commit_assignments(
    repo: &dyn FullRepository,
    review_type: ReviewType,
    request: &CommitRequest,
    max_attempts: u32,
) -> SchedulingResult<Vec<ScheduleRecord>> {
    if request.assignments.is_empty() {
        return Err(SchedulingError::Validation(
            "commit batch contains no assignments".to_string(),
        ));
    }

    for attempt in 1..=max_attempts.max(1) {
        let revision = repo.revision().await?;
        let scope = ReviewScope::load(repo, review_type, request.panel_id.as_ref()).await?;

        let staged = match validate_batch(&scope, &request.assignments) {
            Ok(staged) => staged,
            Err(violations) => {
                warn!(
                    "Rejected {} commit of {} assignments: {} violation(s)",
                    review_type,
                    request.assignments.len(),
                    violations.len()
                );
                return Err(SchedulingError::Rejected(violations));
            }
        };

        match repo.insert_schedule_records(revision, staged).await {
            Ok(records) => {
                info!(
                    "Committed {} {} bookings at revision {}",
                    records.len(),
                    review_type,
                    revision + 1
                );
                return Ok(records);
            }
            Err(e) if e.is_conflict() => {
                debug!(
                    "Commit attempt {}/{} lost a race: {}",
                    attempt, max_attempts, e
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    warn!(
        "Giving up {} commit after {} attempts",
        review_type, max_attempts
    );
    Err(SchedulingError::Conflict(format!(
        "schedule changed during {} consecutive commit attempts",
        max_attempts
    )))
}
