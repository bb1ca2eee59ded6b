//! Prerequisite gating.
//!
//! `review2` needs every member present at `review1` and a `review1` booking;
//! `review3` needs the same against `review2`. `review1` and `viva` are
//! ungated. Attendance is checked before the booking, so an absent member
//! blocks a team even when its earlier booking exists.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{SchedulingError, SchedulingResult};
use crate::db::repository::FullRepository;
use crate::models::{ReviewType, Team, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockReason {
    /// Some member was not marked present at the preceding review.
    AttendanceMissing,
    /// The team holds no booking for the preceding review.
    ScheduleMissing,
}

/// Whether a team may be booked for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum Eligibility {
    Eligible,
    Blocked(BlockReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// The gating rule itself, over facts already looked up.
pub fn decide(
    review_type: ReviewType,
    all_members_present: bool,
    has_prerequisite_booking: bool,
) -> Eligibility {
    if review_type.prerequisite().is_none() {
        Eligibility::Eligible
    } else if !all_members_present {
        Eligibility::Blocked(BlockReason::AttendanceMissing)
    } else if !has_prerequisite_booking {
        Eligibility::Blocked(BlockReason::ScheduleMissing)
    } else {
        Eligibility::Eligible
    }
}

/// Evaluate one team against the current store state.
pub async fn evaluate_team(
    repo: &dyn FullRepository,
    team: &Team,
    review_type: ReviewType,
) -> SchedulingResult<Eligibility> {
    let Some(previous) = review_type.prerequisite() else {
        return Ok(Eligibility::Eligible);
    };

    let mut all_present = true;
    for member in &team.members {
        // Unmarked attendance counts as absent.
        if repo.attendance(member, previous).await? != Some(true) {
            debug!(
                "Team {}: member {} not marked present at {}",
                team.id, member, previous
            );
            all_present = false;
            break;
        }
    }

    let has_booking = repo
        .records_for_team(&team.id)
        .await?
        .iter()
        .any(|r| r.review_type == previous);

    Ok(decide(review_type, all_present, has_booking))
}

/// Look up every id, failing with one `NotFound` naming all unknown ids.
pub(crate) async fn resolve_teams(
    repo: &dyn FullRepository,
    team_ids: &[TeamId],
) -> SchedulingResult<Vec<Team>> {
    let mut teams = Vec::with_capacity(team_ids.len());
    let mut missing = Vec::new();
    for id in team_ids {
        match repo.get_team(id).await? {
            Some(team) => teams.push(team),
            None => missing.push(id.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(SchedulingError::NotFound {
            entity: "team",
            ids: missing,
        });
    }
    Ok(teams)
}

/// CheckPrerequisite: eligibility of each requested team.
///
/// Read-only; repeated calls over unchanged data return identical maps.
pub async fn check_prerequisites(
    repo: &dyn FullRepository,
    review_type: ReviewType,
    team_ids: &[TeamId],
) -> SchedulingResult<BTreeMap<TeamId, Eligibility>> {
    let teams = resolve_teams(repo, team_ids).await?;
    let mut result = BTreeMap::new();
    for team in &teams {
        let eligibility = evaluate_team(repo, team, review_type).await?;
        result.insert(team.id.clone(), eligibility);
    }
    Ok(result)
}

/// CheckScheduleExists: whether each requested team already holds a booking
/// for `review_type`.
pub async fn check_schedule_exists(
    repo: &dyn FullRepository,
    review_type: ReviewType,
    team_ids: &[TeamId],
) -> SchedulingResult<BTreeMap<TeamId, bool>> {
    let teams = resolve_teams(repo, team_ids).await?;
    let mut result = BTreeMap::new();
    for team in &teams {
        let exists = repo
            .records_for_team(&team.id)
            .await?
            .iter()
            .any(|r| r.review_type == review_type);
        result.insert(team.id.clone(), exists);
    }
    Ok(result)
}
