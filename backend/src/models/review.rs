//! Review types, session halves and bookable slots.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The reviews a team goes through, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Review1,
    Review2,
    Review3,
    Viva,
}

impl ReviewType {
    pub const ALL: [ReviewType; 4] = [
        ReviewType::Review1,
        ReviewType::Review2,
        ReviewType::Review3,
        ReviewType::Viva,
    ];

    /// The review whose attendance and booking gate this one.
    ///
    /// `viva` deliberately has none: whether it depends on `review3` has not
    /// been confirmed.
    pub fn prerequisite(self) -> Option<ReviewType> {
        match self {
            ReviewType::Review1 => None,
            ReviewType::Review2 => Some(ReviewType::Review1),
            ReviewType::Review3 => Some(ReviewType::Review2),
            ReviewType::Viva => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewType::Review1 => "review1",
            ReviewType::Review2 => "review2",
            ReviewType::Review3 => "review3",
            ReviewType::Viva => "viva",
        }
    }
}

impl fmt::Display for ReviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "review1" => Ok(Self::Review1),
            "review2" => Ok(Self::Review2),
            "review3" => Ok(Self::Review3),
            "viva" => Ok(Self::Viva),
            _ => Err(format!("Unknown review type: {}", s)),
        }
    }
}

/// Forenoon or afternoon session. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionHalf {
    Forenoon,
    Afternoon,
}

/// A candidate bookable interval `[start, end)`.
///
/// The `(start, end)` pair is the slot's identity; two slots with the same
/// pair are the same slot regardless of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSlot {
    pub review_type: ReviewType,
    pub session: SessionHalf,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: u32,
}

impl ReviewSlot {
    pub fn key(&self) -> SlotKey {
        SlotKey {
            start: self.start,
            end: self.end,
        }
    }

    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Natural key of a slot, also usable as a plain half-open interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SlotKey {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Half-open overlap: touching intervals do not overlap.
    pub fn overlaps(&self, other: &SlotKey) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_prerequisite_chain() {
        assert_eq!(ReviewType::Review1.prerequisite(), None);
        assert_eq!(ReviewType::Review2.prerequisite(), Some(ReviewType::Review1));
        assert_eq!(ReviewType::Review3.prerequisite(), Some(ReviewType::Review2));
        assert_eq!(ReviewType::Viva.prerequisite(), None);
    }

    #[test]
    fn test_review_type_parsing() {
        assert_eq!("Review2".parse::<ReviewType>().unwrap(), ReviewType::Review2);
        assert_eq!("viva".parse::<ReviewType>().unwrap(), ReviewType::Viva);
        assert!("review4".parse::<ReviewType>().is_err());
        assert_eq!(
            serde_json::to_string(&ReviewType::Review3).unwrap(),
            "\"review3\""
        );
    }

    #[test]
    fn test_touching_slots_do_not_overlap() {
        let a = SlotKey::new(at(9, 0), at(9, 30));
        let b = SlotKey::new(at(9, 30), at(10, 0));
        let c = SlotKey::new(at(9, 15), at(9, 45));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_slot_key_display() {
        let key = SlotKey::new(at(9, 0), at(9, 30));
        assert_eq!(key.to_string(), "2024-03-04 09:00-09:30");
    }
}
