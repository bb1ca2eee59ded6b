//! Read access to the directory data owned by team, faculty and attendance
//! management.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{FacultyId, Guide, Panel, PanelId, ReviewType, StudentId, Team, TeamId};

/// Read-only view of teams, guides, panels and attendance.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Check if the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Get a team by id.
    ///
    /// # Returns
    /// * `Ok(Some(Team))` - The team
    /// * `Ok(None)` - No team with this id
    async fn get_team(&self, team_id: &TeamId) -> RepositoryResult<Option<Team>>;

    /// All teams, ordered by id.
    async fn list_teams(&self) -> RepositoryResult<Vec<Team>>;

    async fn get_guide(&self, guide_id: &FacultyId) -> RepositoryResult<Option<Guide>>;

    /// All guides, ordered by id.
    async fn list_guides(&self) -> RepositoryResult<Vec<Guide>>;

    async fn get_panel(&self, panel_id: &PanelId) -> RepositoryResult<Option<Panel>>;

    /// All panels, ordered by id.
    async fn list_panels(&self) -> RepositoryResult<Vec<Panel>>;

    /// Presence of a student at a review.
    ///
    /// # Returns
    /// * `Ok(Some(true))` / `Ok(Some(false))` - Attendance was marked
    /// * `Ok(None)` - Attendance was never marked
    async fn attendance(
        &self,
        student: &StudentId,
        review_type: ReviewType,
    ) -> RepositoryResult<Option<bool>>;
}
