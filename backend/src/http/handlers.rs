//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the engine in
//! [`crate::services`], passing windows and limits from [`AppState`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::dto::{
    AssignGuideRequest, AssignPanelRequest, AvailablePanelsResponse, CommitRequest,
    GenerateSlotsRequest, GuideAllocation, HealthResponse, PrerequisitesResponse,
    RecordListResponse, RescheduleRequest, ScheduleExistsResponse, ScheduleRecord, SlotPlan,
    Team, TeamIdsRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{ReviewType, ScheduleRecordId, TeamId};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn parse_review_type(raw: &str) -> Result<ReviewType, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Review sessions
// =============================================================================

/// POST /v1/reviews/{review_type}/slots
///
/// Cut a window into slots and list the teams of the session.
pub async fn generate_slots(
    State(state): State<AppState>,
    Path(review_type): Path<String>,
    Json(request): Json<GenerateSlotsRequest>,
) -> HandlerResult<SlotPlan> {
    let review_type = parse_review_type(&review_type)?;
    let plan = services::generate_review_slots(
        state.repository.as_ref(),
        review_type,
        &request.window,
        request.panel_id.as_ref(),
        state.config.review_windows.get(review_type),
    )
    .await?;
    Ok(Json(plan))
}

/// POST /v1/reviews/{review_type}/assignments
///
/// Commit a session's team-to-slot mapping. All or nothing.
pub async fn commit_assignments(
    State(state): State<AppState>,
    Path(review_type): Path<String>,
    Json(request): Json<CommitRequest>,
) -> Result<(StatusCode, Json<Vec<ScheduleRecord>>), AppError> {
    let review_type = parse_review_type(&review_type)?;
    let records = services::commit_assignments(
        state.repository.as_ref(),
        review_type,
        &request,
        state.max_attempts(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(records)))
}

/// POST /v1/reviews/{review_type}/prerequisites
pub async fn check_prerequisites(
    State(state): State<AppState>,
    Path(review_type): Path<String>,
    Json(request): Json<TeamIdsRequest>,
) -> HandlerResult<PrerequisitesResponse> {
    let review_type = parse_review_type(&review_type)?;
    let teams =
        services::check_prerequisites(state.repository.as_ref(), review_type, &request.team_ids)
            .await?;
    Ok(Json(PrerequisitesResponse { review_type, teams }))
}

/// POST /v1/reviews/{review_type}/schedule-exists
pub async fn check_schedule_exists(
    State(state): State<AppState>,
    Path(review_type): Path<String>,
    Json(request): Json<TeamIdsRequest>,
) -> HandlerResult<ScheduleExistsResponse> {
    let review_type = parse_review_type(&review_type)?;
    let teams =
        services::check_schedule_exists(state.repository.as_ref(), review_type, &request.team_ids)
            .await?;
    Ok(Json(ScheduleExistsResponse { review_type, teams }))
}

/// GET /v1/reviews/{review_type}/records
pub async fn list_records(
    State(state): State<AppState>,
    Path(review_type): Path<String>,
) -> HandlerResult<RecordListResponse> {
    let review_type = parse_review_type(&review_type)?;
    let records = services::list_schedule_records(state.repository.as_ref(), review_type).await?;
    let total = records.len();
    Ok(Json(RecordListResponse {
        review_type,
        records,
        total,
    }))
}

// =============================================================================
// Records
// =============================================================================

/// PUT /v1/records/{record_id}
pub async fn reschedule_record(
    State(state): State<AppState>,
    Path(record_id): Path<i64>,
    Json(request): Json<RescheduleRequest>,
) -> HandlerResult<ScheduleRecord> {
    let record = services::reschedule_record(
        state.repository.as_ref(),
        ScheduleRecordId::new(record_id),
        &request.slot,
        state.max_attempts(),
    )
    .await?;
    Ok(Json(record))
}

/// DELETE /v1/records/{record_id}
pub async fn delete_record(
    State(state): State<AppState>,
    Path(record_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete_record(
        state.repository.as_ref(),
        ScheduleRecordId::new(record_id),
        state.max_attempts(),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Guides and panels
// =============================================================================

/// POST /v1/guides/auto-assign
///
/// Spread guideless approved teams over guides once selection has closed.
pub async fn auto_assign_guides(State(state): State<AppState>) -> HandlerResult<GuideAllocation> {
    let allocation = services::auto_assign_guides(
        state.repository.as_ref(),
        &state.config.guide_selection,
        Utc::now(),
        state.max_attempts(),
    )
    .await?;
    Ok(Json(allocation))
}

/// PUT /v1/teams/{team_id}/guide
pub async fn assign_guide(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<AssignGuideRequest>,
) -> HandlerResult<Team> {
    let team = services::assign_guide(
        state.repository.as_ref(),
        &TeamId::from(team_id),
        &request.guide_id,
        state.max_attempts(),
    )
    .await?;
    Ok(Json(team))
}

/// DELETE /v1/teams/{team_id}/guide
pub async fn remove_guide(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> HandlerResult<Team> {
    let team = services::remove_guide(
        state.repository.as_ref(),
        &TeamId::from(team_id),
        state.max_attempts(),
    )
    .await?;
    Ok(Json(team))
}

/// GET /v1/teams/{team_id}/available-panels
pub async fn available_panels(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> HandlerResult<AvailablePanelsResponse> {
    let team_id = TeamId::from(team_id);
    let panels = services::available_panels(state.repository.as_ref(), &team_id).await?;
    Ok(Json(AvailablePanelsResponse { team_id, panels }))
}

/// PUT /v1/teams/{team_id}/panel
pub async fn assign_panel(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<AssignPanelRequest>,
) -> HandlerResult<Team> {
    let team = services::assign_panel(
        state.repository.as_ref(),
        &TeamId::from(team_id),
        &request.panel_id,
        state.max_attempts(),
    )
    .await?;
    Ok(Json(team))
}
