//! Data Transfer Objects for the HTTP API.
//!
//! Engine types already derive Serialize/Deserialize and are re-exported
//! as-is; the types below only wrap them into request and response bodies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use crate::api::{
    Eligibility, FacultyId, GuideAllocation, PanelId, PanelOption, ReviewSlot, ReviewType,
    ScheduleRecord, SlotPlan, SlotWindow, Team, TeamId,
};
pub use crate::services::CommitRequest;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Store connectivity
    pub database: String,
}

/// Request body for slot generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSlotsRequest {
    #[serde(flatten)]
    pub window: SlotWindow,
    /// Restrict the session to the teams of one panel
    #[serde(default)]
    pub panel_id: Option<PanelId>,
}

/// Request body for the per-team batch checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamIdsRequest {
    pub team_ids: Vec<TeamId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrerequisitesResponse {
    pub review_type: ReviewType,
    pub teams: BTreeMap<TeamId, Eligibility>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleExistsResponse {
    pub review_type: ReviewType,
    pub teams: BTreeMap<TeamId, bool>,
}

/// Schedule records of one review type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub review_type: ReviewType,
    pub records: Vec<ScheduleRecord>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub slot: ReviewSlot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignGuideRequest {
    pub guide_id: FacultyId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignPanelRequest {
    pub panel_id: PanelId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailablePanelsResponse {
    pub team_id: TeamId,
    pub panels: Vec<PanelOption>,
}
