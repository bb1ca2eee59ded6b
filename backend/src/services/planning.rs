//! GenerateSlots: slots for a session plus the teams they are meant for.

use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::SchedulingResult;
use super::prerequisite_gate::Eligibility;
use super::scope::ReviewScope;
use super::slot_generator::{check_review_window, generate_slots, SlotWindow};
use crate::config::ReviewWindow;
use crate::db::repository::FullRepository;
use crate::models::{PanelId, ReviewSlot, ReviewType, TeamId};

/// What a coordinator needs to build a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPlan {
    pub review_type: ReviewType,
    pub date: NaiveDate,
    pub slots: Vec<ReviewSlot>,
    /// Teams that still need a booking and may receive one, by id.
    pub teams_in_scope: Vec<TeamId>,
    /// Eligibility of every approved, panel-assigned team in the session,
    /// blocked teams included.
    pub eligibility: BTreeMap<TeamId, Eligibility>,
    /// Fewer slots than in-scope teams. Advisory only.
    pub insufficient_slots: bool,
}

/// Cut `window` into slots and attach the session's teams.
///
/// # Errors
/// * `InvalidWindow` - reversed window or non-positive duration
/// * `Validation` - `window.date` falls outside `review_window`
/// * `NotFound` - `panel_scope` names no panel
pub async fn generate_review_slots(
    repo: &dyn FullRepository,
    review_type: ReviewType,
    window: &SlotWindow,
    panel_scope: Option<&PanelId>,
    review_window: Option<&ReviewWindow>,
) -> SchedulingResult<SlotPlan> {
    let slots = generate_slots(review_type, window)?;
    check_review_window(review_type, review_window, window.date)?;

    let scope = ReviewScope::load(repo, review_type, panel_scope).await?;
    let teams_in_scope: Vec<TeamId> = scope
        .teams_in_scope()
        .into_iter()
        .map(|t| t.id.clone())
        .collect();

    let insufficient_slots = slots.len() < teams_in_scope.len();
    if insufficient_slots {
        warn!(
            "{} window on {} yields {} slots for {} teams",
            review_type,
            window.date,
            slots.len(),
            teams_in_scope.len()
        );
    } else {
        info!(
            "Generated {} {} slots on {} for {} teams",
            slots.len(),
            review_type,
            window.date,
            teams_in_scope.len()
        );
    }

    Ok(SlotPlan {
        review_type,
        date: window.date,
        slots,
        teams_in_scope,
        eligibility: scope.eligibility,
        insufficient_slots,
    })
}
