//! Guide allocation.
//!
//! Once the guide-selection period has closed, approved teams that still have
//! no guide are spread over guides with spare capacity, least-loaded first.
//! Loads are always recomputed from team references.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use super::error::{SchedulingError, SchedulingResult};
use crate::config::GuideSelectionWindow;
use crate::db::repository::FullRepository;
use crate::models::{FacultyId, Guide, Team, TeamId, TeamStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideAssignment {
    pub team_id: TeamId,
    pub guide_id: FacultyId,
}

/// Outcome of an allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideAllocation {
    pub assigned: Vec<GuideAssignment>,
    /// Teams left without a guide because no guide had room.
    pub unplaced: Vec<TeamId>,
}

/// Least-loaded allocation.
///
/// `pending` is processed in the given order; `guides` carries each guide with
/// its current load. Each team goes to the guide with the smallest
/// `(load, id)` among those below capacity, and that guide's load grows by
/// one before the next team is placed. Once every guide is full the remaining
/// teams are unplaced.
pub fn balance(pending: &[TeamId], guides: &[(Guide, u32)]) -> GuideAllocation {
    let capacities: BTreeMap<&FacultyId, u32> =
        guides.iter().map(|(g, _)| (&g.id, g.capacity)).collect();
    let mut heap: BinaryHeap<Reverse<(u32, FacultyId)>> = guides
        .iter()
        .filter(|(g, load)| *load < g.capacity)
        .map(|(g, load)| Reverse((*load, g.id.clone())))
        .collect();

    let mut allocation = GuideAllocation::default();
    for team_id in pending {
        match heap.pop() {
            Some(Reverse((load, guide_id))) => {
                let capacity = capacities.get(&guide_id).copied().unwrap_or(0);
                if load + 1 < capacity {
                    heap.push(Reverse((load + 1, guide_id.clone())));
                }
                allocation.assigned.push(GuideAssignment {
                    team_id: team_id.clone(),
                    guide_id,
                });
            }
            None => allocation.unplaced.push(team_id.clone()),
        }
    }
    allocation
}

fn loads(teams: &[Team]) -> BTreeMap<FacultyId, u32> {
    let mut loads = BTreeMap::new();
    for guide in teams.iter().filter_map(|t| t.guide.as_ref()) {
        *loads.entry(guide.clone()).or_insert(0) += 1;
    }
    loads
}

/// AutoAssignGuides: give every approved, guideless team a guide.
///
/// All assignments of a run land in one conditional write. Teams that cannot
/// be placed are reported, not failed.
///
/// # Errors
/// * `GuideSelectionOpen` - `now` is before the selection period closes
/// * `Conflict` - the store kept changing for `max_attempts` attempts
pub async fn auto_assign_guides(
    repo: &dyn FullRepository,
    selection: &GuideSelectionWindow,
    now: DateTime<Utc>,
    max_attempts: u32,
) -> SchedulingResult<GuideAllocation> {
    if let (false, Some(closes_at)) = (selection.is_closed(now), selection.closes_at) {
        return Err(SchedulingError::GuideSelectionOpen { closes_at });
    }

    for attempt in 1..=max_attempts.max(1) {
        let revision = repo.revision().await?;
        let teams = repo.list_teams().await?;
        let guides = repo.list_guides().await?;
        let mut pending: Vec<TeamId> = teams
            .iter()
            .filter(|t| t.status == TeamStatus::Approved && t.guide.is_none())
            .map(|t| t.id.clone())
            .collect();
        pending.sort();

        let current = loads(&teams);
        let guides: Vec<(Guide, u32)> = guides
            .into_iter()
            .map(|g| {
                let load = current.get(&g.id).copied().unwrap_or(0);
                (g, load)
            })
            .collect();

        let allocation = balance(&pending, &guides);
        if !allocation.unplaced.is_empty() {
            warn!(
                "{} team(s) left without a guide: no capacity remaining",
                allocation.unplaced.len()
            );
        }
        if allocation.assigned.is_empty() {
            return Ok(allocation);
        }

        let changes: Vec<(TeamId, Option<FacultyId>)> = allocation
            .assigned
            .iter()
            .map(|a| (a.team_id.clone(), Some(a.guide_id.clone())))
            .collect();
        match repo.set_team_guides(revision, &changes).await {
            Ok(()) => {
                info!("Auto-assigned guides to {} team(s)", allocation.assigned.len());
                return Ok(allocation);
            }
            Err(e) if e.is_conflict() => {
                debug!("Guide allocation attempt {} lost a race: {}", attempt, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SchedulingError::Conflict(format!(
        "teams changed during {} consecutive allocation attempts",
        max_attempts
    )))
}

/// AssignGuide: manual assignment or reassignment of one team's guide.
///
/// Assigning the guide a team already has is a no-op.
pub async fn assign_guide(
    repo: &dyn FullRepository,
    team_id: &TeamId,
    guide_id: &FacultyId,
    max_attempts: u32,
) -> SchedulingResult<Team> {
    for attempt in 1..=max_attempts.max(1) {
        let revision = repo.revision().await?;
        let mut team = repo
            .get_team(team_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("team", team_id))?;
        let guide = repo
            .get_guide(guide_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("guide", guide_id))?;

        if team.status == TeamStatus::Rejected {
            return Err(SchedulingError::Validation(format!(
                "team {} was rejected and cannot receive a guide",
                team_id
            )));
        }
        if team.guide.as_ref() == Some(guide_id) {
            return Ok(team);
        }
        if let Some(panel_id) = &team.panel {
            if let Some(panel) = repo.get_panel(panel_id).await? {
                if panel.has_member(guide_id) {
                    return Err(SchedulingError::ConflictOfInterest {
                        team: team_id.clone(),
                        panel: panel_id.clone(),
                        guide: guide_id.clone(),
                    });
                }
            }
        }

        let load = loads(&repo.list_teams().await?)
            .get(guide_id)
            .copied()
            .unwrap_or(0);
        if load + 1 > guide.capacity {
            return Err(SchedulingError::GuideAtCapacity {
                guide: guide_id.clone(),
                capacity: guide.capacity,
            });
        }

        match repo
            .set_team_guides(revision, &[(team_id.clone(), Some(guide_id.clone()))])
            .await
        {
            Ok(()) => {
                info!("Team {} now guided by {}", team_id, guide_id);
                team.guide = Some(guide_id.clone());
                return Ok(team);
            }
            Err(e) if e.is_conflict() => {
                debug!("Guide assignment attempt {} lost a race: {}", attempt, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SchedulingError::Conflict(format!(
        "team {} changed during {} consecutive attempts",
        team_id, max_attempts
    )))
}

/// RemoveGuide: clear a team's guide. Clearing an empty reference is a no-op.
pub async fn remove_guide(
    repo: &dyn FullRepository,
    team_id: &TeamId,
    max_attempts: u32,
) -> SchedulingResult<Team> {
    for attempt in 1..=max_attempts.max(1) {
        let revision = repo.revision().await?;
        let mut team = repo
            .get_team(team_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("team", team_id))?;
        let Some(previous) = team.guide.take() else {
            return Ok(team);
        };

        match repo.set_team_guides(revision, &[(team_id.clone(), None)]).await {
            Ok(()) => {
                info!("Team {} released from guide {}", team_id, previous);
                return Ok(team);
            }
            Err(e) if e.is_conflict() => {
                debug!("Guide removal attempt {} lost a race: {}", attempt, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SchedulingError::Conflict(format!(
        "team {} changed during {} consecutive attempts",
        team_id, max_attempts
    )))
}
