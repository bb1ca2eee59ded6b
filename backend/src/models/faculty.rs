//! Guides and review panels.

use serde::{Deserialize, Serialize};

use super::ids::{FacultyId, PanelId};

/// A faculty member who may supervise teams.
///
/// The current load is not stored here; it is the number of teams whose
/// `guide` points at this faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    pub id: FacultyId,
    #[serde(default)]
    pub name: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelMember {
    pub faculty: FacultyId,
    pub kind: MemberKind,
}

/// A review panel. Many teams may share one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub id: PanelId,
    pub name: String,
    pub members: Vec<PanelMember>,
    pub coordinator: FacultyId,
}

/// Why a panel cannot be offered to any team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelDefect {
    NoMembers,
    MultipleExternalMembers,
}

impl Panel {
    pub fn has_member(&self, faculty: &FacultyId) -> bool {
        self.members.iter().any(|m| &m.faculty == faculty)
    }

    pub fn external_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::External)
            .count()
    }

    /// Structural check on the composition owned by panel management.
    pub fn defect(&self) -> Option<PanelDefect> {
        if self.members.is_empty() {
            Some(PanelDefect::NoMembers)
        } else if self.external_count() > 1 {
            Some(PanelDefect::MultipleExternalMembers)
        } else {
            None
        }
    }
}
