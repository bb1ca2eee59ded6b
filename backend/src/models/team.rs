//! Teams and the attendance signal consumed by prerequisite gating.

use serde::{Deserialize, Serialize};

use super::ids::{FacultyId, PanelId, StudentId, TeamId};
use super::review::ReviewType;

/// Team lifecycle status as maintained by team formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Pending,
    Approved,
    Rejected,
}

/// A project team.
///
/// `guide` and `panel` are written only by the assignment operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub members: Vec<StudentId>,
    pub leader: StudentId,
    pub status: TeamStatus,
    #[serde(default)]
    pub guide: Option<FacultyId>,
    #[serde(default)]
    pub panel: Option<PanelId>,
}

impl Team {
    pub fn is_approved(&self) -> bool {
        self.status == TeamStatus::Approved
    }
}

/// Presence flag of one student at one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student: StudentId,
    pub review_type: ReviewType,
    pub present: bool,
}
