//! Engine error taxonomy.
//!
//! Batch operations never fail with a single opaque message: a rejected
//! commit carries one [`Violation`] per offending team so the caller can point
//! at the exact row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::repository::RepositoryError;
use crate::models::{FacultyId, PanelId, SlotKey, TeamId};

use super::prerequisite_gate::BlockReason;

pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// How the caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed input. Fix the request and retry.
    Validation,
    /// Stale or concurrently modified state. Re-fetch and retry.
    Conflict,
    /// Gated on upstream state (attendance, earlier bookings, time windows).
    Prerequisite,
    NotFound,
    Internal,
}

/// Why a single entry of a commit batch was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ViolationKind {
    /// An in-scope team has no slot, or a team is listed more than once.
    IncompleteAssignment,
    /// The slot is already taken in this batch or on this panel.
    DuplicateSlot,
    PrerequisiteNotMet(BlockReason),
    AlreadyScheduled,
    UnknownTeam,
    /// The team is not approved, has no panel, or belongs to another panel.
    OutOfScope,
    /// The slot interval is empty or reversed.
    InvalidSlot,
}

impl ViolationKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ViolationKind::DuplicateSlot | ViolationKind::AlreadyScheduled => {
                ErrorCategory::Conflict
            }
            ViolationKind::PrerequisiteNotMet(_) => ErrorCategory::Prerequisite,
            ViolationKind::UnknownTeam => ErrorCategory::NotFound,
            ViolationKind::IncompleteAssignment
            | ViolationKind::OutOfScope
            | ViolationKind::InvalidSlot => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub team_id: TeamId,
    #[serde(flatten)]
    pub kind: ViolationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<SlotKey>,
    pub detail: String,
}

impl Violation {
    pub fn new(team_id: TeamId, kind: ViolationKind, detail: impl Into<String>) -> Self {
        Self {
            team_id,
            kind,
            slot: None,
            detail: detail.into(),
        }
    }

    pub fn at_slot(mut self, slot: SlotKey) -> Self {
        self.slot = Some(slot);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.team_id, self.detail)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A commit batch failed one or more invariants; nothing was written.
    #[error("Assignment rejected with {} violation(s)", .0.len())]
    Rejected(Vec<Violation>),

    #[error("Guide {guide} is at capacity ({capacity} teams)")]
    GuideAtCapacity { guide: FacultyId, capacity: u32 },

    #[error("Guide {guide} of team {team} sits on panel {panel}")]
    ConflictOfInterest {
        team: TeamId,
        panel: PanelId,
        guide: FacultyId,
    },

    /// Concurrent modification or stale state; re-fetch and retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Guide selection is still open until {closes_at}")]
    GuideSelectionOpen { closes_at: DateTime<Utc> },

    #[error("Unknown {entity}: {}", .ids.join(", "))]
    NotFound {
        entity: &'static str,
        ids: Vec<String>,
    },

    #[error(transparent)]
    Repository(RepositoryError),
}

impl SchedulingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        SchedulingError::NotFound {
            entity,
            ids: vec![id.to_string()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SchedulingError::InvalidWindow(_) | SchedulingError::Validation(_) => {
                ErrorCategory::Validation
            }
            SchedulingError::Rejected(violations) => rejection_category(violations),
            SchedulingError::GuideAtCapacity { .. }
            | SchedulingError::ConflictOfInterest { .. }
            | SchedulingError::Conflict(_) => ErrorCategory::Conflict,
            SchedulingError::GuideSelectionOpen { .. } => ErrorCategory::Prerequisite,
            SchedulingError::NotFound { .. } => ErrorCategory::NotFound,
            SchedulingError::Repository(e) => match e {
                RepositoryError::NotFound { .. } => ErrorCategory::NotFound,
                RepositoryError::Conflict { .. } | RepositoryError::ValidationError { .. } => {
                    ErrorCategory::Conflict
                }
                _ => ErrorCategory::Internal,
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            SchedulingError::Repository(e) => e.is_retryable(),
            other => other.category() == ErrorCategory::Conflict,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            SchedulingError::Rejected(violations) => violations,
            _ => &[],
        }
    }
}

/// Store conflicts surface as engine conflicts; everything else is wrapped.
impl From<RepositoryError> for SchedulingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { .. } => SchedulingError::Conflict(err.to_string()),
            other => SchedulingError::Repository(other),
        }
    }
}

/// The most actionable category among a batch's violations: conflicts first
/// (re-fetch fixes them), then gating, then plain validation.
fn rejection_category(violations: &[Violation]) -> ErrorCategory {
    let categories: Vec<ErrorCategory> = violations.iter().map(|v| v.kind.category()).collect();
    for wanted in [
        ErrorCategory::Conflict,
        ErrorCategory::Prerequisite,
        ErrorCategory::NotFound,
    ] {
        if categories.contains(&wanted) {
            return wanted;
        }
    }
    ErrorCategory::Validation
}
