//! Slot generation.
//!
//! Cuts a same-day window into back-to-back slots of a fixed length. A
//! trailing remainder shorter than one slot is dropped. Generation is pure:
//! the same window always yields the same slots, and the iterator can be
//! recreated at any time.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::error::{SchedulingError, SchedulingResult};
use crate::config::ReviewWindow;
use crate::models::{ReviewSlot, ReviewType, SessionHalf};

/// A coordinator-supplied window to cut into slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Slot length in minutes. Signed so that bad input can be reported
    /// instead of failing to deserialize.
    pub duration_minutes: i64,
    pub session: SessionHalf,
}

impl SlotWindow {
    fn validate(&self) -> SchedulingResult<()> {
        if self.start_time >= self.end_time {
            return Err(SchedulingError::InvalidWindow(format!(
                "start time {} is not before end time {}",
                self.start_time, self.end_time
            )));
        }
        if self.duration_minutes <= 0 {
            return Err(SchedulingError::InvalidWindow(format!(
                "duration must be positive, got {} minutes",
                self.duration_minutes
            )));
        }
        if self.duration_minutes > u32::MAX as i64 {
            return Err(SchedulingError::InvalidWindow(format!(
                "duration of {} minutes is out of range",
                self.duration_minutes
            )));
        }
        Ok(())
    }

    /// Iterate the slots of this window for a review type.
    pub fn slots(&self, review_type: ReviewType) -> SchedulingResult<SlotIter> {
        self.validate()?;
        Ok(SlotIter {
            review_type,
            session: self.session,
            cursor: self.date.and_time(self.start_time),
            end: self.date.and_time(self.end_time),
            step: TimeDelta::minutes(self.duration_minutes),
            duration_minutes: self.duration_minutes as u32,
        })
    }
}

/// Iterator over the slots of a [`SlotWindow`].
#[derive(Debug, Clone)]
pub struct SlotIter {
    review_type: ReviewType,
    session: SessionHalf,
    cursor: NaiveDateTime,
    end: NaiveDateTime,
    step: TimeDelta,
    duration_minutes: u32,
}

impl Iterator for SlotIter {
    type Item = ReviewSlot;

    fn next(&mut self) -> Option<ReviewSlot> {
        let slot_end = self.cursor.checked_add_signed(self.step)?;
        if slot_end > self.end {
            return None;
        }
        let slot = ReviewSlot {
            review_type: self.review_type,
            session: self.session,
            start: self.cursor,
            end: slot_end,
            duration_minutes: self.duration_minutes,
        };
        self.cursor = slot_end;
        Some(slot)
    }
}

/// Produce every slot of `window`, in start order.
///
/// # Errors
/// `InvalidWindow` when `start_time >= end_time` or the duration is not
/// positive.
pub fn generate_slots(
    review_type: ReviewType,
    window: &SlotWindow,
) -> SchedulingResult<Vec<ReviewSlot>> {
    Ok(window.slots(review_type)?.collect())
}

/// Reject dates outside the configured scheduling window of a review.
pub fn check_review_window(
    review_type: ReviewType,
    window: Option<&ReviewWindow>,
    date: NaiveDate,
) -> SchedulingResult<()> {
    match window {
        Some(window) if !window.contains(date) => Err(SchedulingError::Validation(format!(
            "{} can only be scheduled between {} and {}, not on {}",
            review_type, window.opens_on, window.closes_on, date
        ))),
        _ => Ok(()),
    }
}
