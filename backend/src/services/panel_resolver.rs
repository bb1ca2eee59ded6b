//! Panel eligibility and assignment.
//!
//! A guide never examines their own team: any panel the team's guide sits on
//! is withheld. Remaining panels are offered least-loaded first.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::{SchedulingError, SchedulingResult};
use crate::db::repository::FullRepository;
use crate::models::{FacultyId, Panel, PanelId, Team, TeamId, TeamStatus};

/// A panel offered to a team, with the number of teams already assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelOption {
    #[serde(flatten)]
    pub panel: Panel,
    pub team_count: usize,
}

/// Panels a team guided by `guide` may be offered, ordered by
/// `(team_count, name)`.
///
/// A panel must have at least one member and at most one external member.
/// A panel breaking that rule cannot hold a valid review, so it is withheld
/// from every team, including one with no guide. With no guide, defects are
/// the only exclusion.
pub fn rank_panels(
    panels: Vec<Panel>,
    teams: &[Team],
    guide: Option<&FacultyId>,
) -> Vec<PanelOption> {
    let mut counts: HashMap<&PanelId, usize> = HashMap::new();
    for panel_id in teams.iter().filter_map(|t| t.panel.as_ref()) {
        *counts.entry(panel_id).or_insert(0) += 1;
    }

    let mut options: Vec<PanelOption> = panels
        .into_iter()
        .filter(|p| match p.defect() {
            Some(defect) => {
                debug!("Panel {} withheld: {:?}", p.id, defect);
                false
            }
            None => true,
        })
        .filter(|p| guide.map_or(true, |g| !p.has_member(g)))
        .map(|panel| {
            let team_count = counts.get(&panel.id).copied().unwrap_or(0);
            PanelOption { panel, team_count }
        })
        .collect();

    options.sort_by(|a, b| {
        a.team_count
            .cmp(&b.team_count)
            .then_with(|| a.panel.name.cmp(&b.panel.name))
            .then_with(|| a.panel.id.cmp(&b.panel.id))
    });
    options
}

/// AvailablePanels: the panels a team may be assigned to.
pub async fn available_panels(
    repo: &dyn FullRepository,
    team_id: &TeamId,
) -> SchedulingResult<Vec<PanelOption>> {
    let team = repo
        .get_team(team_id)
        .await?
        .ok_or_else(|| SchedulingError::not_found("team", team_id))?;
    let teams = repo.list_teams().await?;
    let panels = repo.list_panels().await?;
    Ok(rank_panels(panels, &teams, team.guide.as_ref()))
}

/// AssignPanel: point a team at a panel, replacing any previous panel.
///
/// The conflict-of-interest rule is checked against the state being written,
/// not against an earlier `available_panels` answer.
pub async fn assign_panel(
    repo: &dyn FullRepository,
    team_id: &TeamId,
    panel_id: &PanelId,
    max_attempts: u32,
) -> SchedulingResult<Team> {
    for attempt in 1..=max_attempts.max(1) {
        let revision = repo.revision().await?;
        let mut team = repo
            .get_team(team_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("team", team_id))?;
        let panel = repo
            .get_panel(panel_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("panel", panel_id))?;

        if team.status == TeamStatus::Rejected {
            return Err(SchedulingError::Validation(format!(
                "team {} was rejected and cannot receive a panel",
                team_id
            )));
        }
        if let Some(defect) = panel.defect() {
            return Err(SchedulingError::Validation(format!(
                "panel {} cannot be assigned: {:?}",
                panel_id, defect
            )));
        }
        if let Some(guide) = &team.guide {
            if panel.has_member(guide) {
                return Err(SchedulingError::ConflictOfInterest {
                    team: team_id.clone(),
                    panel: panel_id.clone(),
                    guide: guide.clone(),
                });
            }
        }
        if team.panel.as_ref() == Some(panel_id) {
            return Ok(team);
        }

        match repo
            .set_team_panel(revision, team_id, Some(panel_id.clone()))
            .await
        {
            Ok(()) => {
                info!("Team {} assigned to panel {}", team_id, panel_id);
                team.panel = Some(panel_id.clone());
                return Ok(team);
            }
            Err(e) if e.is_conflict() => {
                debug!("Panel assignment attempt {} lost a race: {}", attempt, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SchedulingError::Conflict(format!(
        "team {} changed during {} consecutive attempts",
        team_id, max_attempts
    )))
}
