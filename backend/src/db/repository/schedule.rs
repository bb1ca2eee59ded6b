//! Schedule records and the engine's conditional writes.

use async_trait::async_trait;

use super::error::RepositoryResult;
use super::Revision;
use crate::models::{
    FacultyId, NewScheduleRecord, PanelId, ReviewType, ScheduleRecord, ScheduleRecordId, TeamId,
};

/// Store operations owned by the scheduling engine.
///
/// All writes take the revision the caller validated against and fail with
/// `RepositoryError::Conflict` when it is stale. Batch writes are
/// all-or-nothing.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Current store revision.
    async fn revision(&self) -> RepositoryResult<Revision>;

    /// Records for a review type, ordered by panel then start time.
    async fn list_schedule_records(
        &self,
        review_type: ReviewType,
    ) -> RepositoryResult<Vec<ScheduleRecord>>;

    /// All records held by a team, in review order.
    async fn records_for_team(&self, team_id: &TeamId) -> RepositoryResult<Vec<ScheduleRecord>>;

    async fn get_schedule_record(
        &self,
        record_id: ScheduleRecordId,
    ) -> RepositoryResult<Option<ScheduleRecord>>;

    /// Insert a batch of validated records.
    ///
    /// # Returns
    /// * `Ok(Vec<ScheduleRecord>)` - The stored records with their ids, in input order
    /// * `Err(RepositoryError::Conflict)` - `expected` is stale; nothing written
    /// * `Err(RepositoryError::ValidationError)` - The batch would break a record invariant
    async fn insert_schedule_records(
        &self,
        expected: Revision,
        records: Vec<NewScheduleRecord>,
    ) -> RepositoryResult<Vec<ScheduleRecord>>;

    /// Replace an existing record (same id) with new slot data.
    async fn update_schedule_record(
        &self,
        expected: Revision,
        record: ScheduleRecord,
    ) -> RepositoryResult<ScheduleRecord>;

    async fn delete_schedule_record(
        &self,
        expected: Revision,
        record_id: ScheduleRecordId,
    ) -> RepositoryResult<()>;

    /// Set or clear the guide reference of several teams at once.
    async fn set_team_guides(
        &self,
        expected: Revision,
        changes: &[(TeamId, Option<FacultyId>)],
    ) -> RepositoryResult<()>;

    /// Set or clear the panel reference of a team.
    async fn set_team_panel(
        &self,
        expected: Revision,
        team_id: &TeamId,
        panel_id: Option<PanelId>,
    ) -> RepositoryResult<()>;
}
