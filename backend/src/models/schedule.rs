//! Committed review bookings.

use serde::{Deserialize, Serialize};

use super::ids::{PanelId, ScheduleRecordId, TeamId};
use super::review::{ReviewSlot, ReviewType, SessionHalf, SlotKey};
use chrono::NaiveDateTime;

/// A durable booking of one team in front of one panel for one review.
///
/// Per panel and review type the intervals never overlap, and a team holds at
/// most one record per review type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: ScheduleRecordId,
    pub team: TeamId,
    pub panel: PanelId,
    pub review_type: ReviewType,
    pub session: SessionHalf,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: u32,
}

impl ScheduleRecord {
    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.start, self.end)
    }

    /// Whether this record occupies part of `key` on `panel` for `review_type`.
    pub fn clashes_with(&self, panel: &PanelId, review_type: ReviewType, key: &SlotKey) -> bool {
        &self.panel == panel && self.review_type == review_type && self.key().overlaps(key)
    }
}

/// A record that has passed validation but has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScheduleRecord {
    pub team: TeamId,
    pub panel: PanelId,
    pub slot: ReviewSlot,
}

impl NewScheduleRecord {
    pub fn into_record(self, id: ScheduleRecordId) -> ScheduleRecord {
        ScheduleRecord {
            id,
            team: self.team,
            panel: self.panel,
            review_type: self.slot.review_type,
            session: self.slot.session,
            start: self.slot.start,
            end: self.slot.end,
            duration_minutes: self.slot.duration_minutes,
        }
    }
}
