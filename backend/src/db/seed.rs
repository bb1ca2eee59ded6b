//! Directory snapshots used to populate an in-memory store.
//!
//! Teams, guides, panels and attendance are owned by other subsystems. For
//! local runs and tests they are loaded from a JSON document of this shape:
//!
//! ```json
//! {
//!   "teams": [{"id": "T1", "members": ["S1"], "leader": "S1", "status": "approved"}],
//!   "guides": [{"id": "F1", "name": "Dr. Rao", "capacity": 3}],
//!   "panels": [{"id": "P1", "name": "Panel A", "coordinator": "F2",
//!               "members": [{"faculty": "F2", "kind": "internal"}]}],
//!   "attendance": [{"student": "S1", "review_type": "review1", "present": true}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{AttendanceRecord, Guide, Panel, Team};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub guides: Vec<Guide>,
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

impl DirectorySeed {
    pub fn from_json_str(json: &str) -> RepositoryResult<Self> {
        serde_json::from_str(json).map_err(|e| RepositoryError::ConfigurationError {
            message: format!("Failed to parse directory seed: {}", e),
            context: ErrorContext::new("load_seed"),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::ConfigurationError {
                message: format!("Failed to read directory seed: {}", e),
                context: ErrorContext::new("load_seed")
                    .with_details(path.as_ref().display().to_string()),
            }
        })?;
        Self::from_json_str(&content)
    }
}
