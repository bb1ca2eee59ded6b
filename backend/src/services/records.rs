//! Maintenance of committed schedule records.
//!
//! Records are never overwritten by a commit. Moving a booking goes through
//! [`reschedule_record`], dropping one through [`delete_record`].

use log::{debug, info};

use super::assignment_validator::slot_problem;
use super::error::{SchedulingError, SchedulingResult, Violation, ViolationKind};
use crate::db::repository::FullRepository;
use crate::models::{ReviewSlot, ReviewType, ScheduleRecord, ScheduleRecordId};

/// ListScheduleRecords: bookings of a review type, by panel then start.
pub async fn list_schedule_records(
    repo: &dyn FullRepository,
    review_type: ReviewType,
) -> SchedulingResult<Vec<ScheduleRecord>> {
    Ok(repo.list_schedule_records(review_type).await?)
}

/// RescheduleRecord: move an existing booking to another slot of the same
/// review type on the same panel.
///
/// # Errors
/// * `NotFound` - no record with `record_id`
/// * `Rejected` - `InvalidSlot` or `DuplicateSlot` against another record
/// * `Conflict` - the store kept changing for `max_attempts` attempts
pub async fn reschedule_record(
    repo: &dyn FullRepository,
    record_id: ScheduleRecordId,
    slot: &ReviewSlot,
    max_attempts: u32,
) -> SchedulingResult<ScheduleRecord> {
    for attempt in 1..=max_attempts.max(1) {
        let revision = repo.revision().await?;
        let current = repo
            .get_schedule_record(record_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("schedule record", record_id))?;

        let key = slot.key();
        if let Some(problem) = slot_problem(slot, current.review_type) {
            return Err(SchedulingError::Rejected(vec![Violation::new(
                current.team.clone(),
                ViolationKind::InvalidSlot,
                problem,
            )
            .at_slot(key)]));
        }

        let others = repo.list_schedule_records(current.review_type).await?;
        if let Some(clash) = others
            .iter()
            .filter(|r| r.id != record_id)
            .find(|r| r.clashes_with(&current.panel, current.review_type, &key))
        {
            return Err(SchedulingError::Rejected(vec![Violation::new(
                current.team.clone(),
                ViolationKind::DuplicateSlot,
                format!(
                    "slot overlaps record {} of team {} on panel {}",
                    clash.id, clash.team, current.panel
                ),
            )
            .at_slot(key)]));
        }

        let moved = ScheduleRecord {
            session: slot.session,
            start: slot.start,
            end: slot.end,
            duration_minutes: slot.duration_minutes,
            ..current
        };
        match repo.update_schedule_record(revision, moved).await {
            Ok(record) => {
                info!("Record {} moved to {}", record.id, record.key());
                return Ok(record);
            }
            Err(e) if e.is_conflict() => {
                debug!("Reschedule attempt {} lost a race: {}", attempt, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SchedulingError::Conflict(format!(
        "schedule changed during {} consecutive attempts to move record {}",
        max_attempts, record_id
    )))
}

/// DeleteScheduleRecord: remove a booking.
pub async fn delete_record(
    repo: &dyn FullRepository,
    record_id: ScheduleRecordId,
    max_attempts: u32,
) -> SchedulingResult<()> {
    for attempt in 1..=max_attempts.max(1) {
        let revision = repo.revision().await?;
        if repo.get_schedule_record(record_id).await?.is_none() {
            return Err(SchedulingError::not_found("schedule record", record_id));
        }
        match repo.delete_schedule_record(revision, record_id).await {
            Ok(()) => {
                info!("Record {} deleted", record_id);
                return Ok(());
            }
            Err(e) if e.is_conflict() => {
                debug!("Delete attempt {} lost a race: {}", attempt, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SchedulingError::Conflict(format!(
        "schedule changed during {} consecutive attempts to delete record {}",
        max_attempts, record_id
    )))
}
