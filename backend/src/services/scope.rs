//! Which teams a review session covers.
//!
//! A team is a candidate for a review when it is approved and sits in front
//! of a panel (the requested panel, when the session is scoped to one). A
//! candidate is in scope when it has no booking for the review yet and passes
//! the prerequisite gate.

use std::collections::BTreeMap;

use super::error::{SchedulingError, SchedulingResult};
use super::prerequisite_gate::{evaluate_team, Eligibility};
use crate::db::repository::FullRepository;
use crate::models::{PanelId, ReviewType, ScheduleRecord, Team, TeamId};

/// Snapshot of everything a session needs to decide scope.
#[derive(Debug, Clone)]
pub struct ReviewScope {
    pub review_type: ReviewType,
    pub panel: Option<PanelId>,
    pub teams: BTreeMap<TeamId, Team>,
    /// Stored records for `review_type`, every panel.
    pub records: Vec<ScheduleRecord>,
    /// Eligibility of each candidate team.
    pub eligibility: BTreeMap<TeamId, Eligibility>,
}

impl ReviewScope {
    pub async fn load(
        repo: &dyn FullRepository,
        review_type: ReviewType,
        panel: Option<&PanelId>,
    ) -> SchedulingResult<Self> {
        if let Some(panel_id) = panel {
            if repo.get_panel(panel_id).await?.is_none() {
                return Err(SchedulingError::not_found("panel", panel_id));
            }
        }

        let teams: BTreeMap<TeamId, Team> = repo
            .list_teams()
            .await?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        let records = repo.list_schedule_records(review_type).await?;

        let mut scope = Self {
            review_type,
            panel: panel.cloned(),
            teams,
            records,
            eligibility: BTreeMap::new(),
        };

        let candidates: Vec<Team> = scope.candidates().cloned().collect();
        for team in &candidates {
            let eligibility = evaluate_team(repo, team, review_type).await?;
            scope.eligibility.insert(team.id.clone(), eligibility);
        }
        Ok(scope)
    }

    /// Approved, panel-assigned teams matching the panel scope.
    pub fn is_candidate(&self, team: &Team) -> bool {
        team.is_approved()
            && match (&team.panel, &self.panel) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(own), Some(scoped)) => own == scoped,
            }
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Team> {
        self.teams.values().filter(|t| self.is_candidate(t))
    }

    pub fn booking_of(&self, team_id: &TeamId) -> Option<&ScheduleRecord> {
        self.records.iter().find(|r| &r.team == team_id)
    }

    pub fn eligibility_of(&self, team_id: &TeamId) -> Option<Eligibility> {
        self.eligibility.get(team_id).copied()
    }

    /// Candidates that still need a booking and may receive one, by id.
    pub fn teams_in_scope(&self) -> Vec<&Team> {
        self.candidates()
            .filter(|t| self.booking_of(&t.id).is_none())
            .filter(|t| {
                self.eligibility_of(&t.id)
                    .map(|e| e.is_eligible())
                    .unwrap_or(false)
            })
            .collect()
    }
}
