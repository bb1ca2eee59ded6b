//! The review scheduling engine.
//!
//! Every operation is a stateless request handler over a [`FullRepository`]:
//! read the store, validate, and write conditioned on the revision that was
//! read. Limits and windows come in as arguments.
//!
//! [`FullRepository`]: crate::db::repository::FullRepository

pub mod assignment_validator;
pub mod error;
pub mod guide_balancer;
pub mod panel_resolver;
pub mod planning;
pub mod prerequisite_gate;
pub mod records;
pub mod scope;
pub mod slot_generator;

pub use assignment_validator::{commit_assignments, validate_batch, CommitRequest, SlotAssignment};
pub use error::{ErrorCategory, SchedulingError, SchedulingResult, Violation, ViolationKind};
pub use guide_balancer::{
    assign_guide, auto_assign_guides, balance, remove_guide, GuideAllocation, GuideAssignment,
};
pub use panel_resolver::{assign_panel, available_panels, rank_panels, PanelOption};
pub use planning::{generate_review_slots, SlotPlan};
pub use prerequisite_gate::{
    check_prerequisites, check_schedule_exists, evaluate_team, BlockReason, Eligibility,
};
pub use records::{delete_record, list_schedule_records, reschedule_record};
pub use scope::ReviewScope;
pub use slot_generator::{check_review_window, generate_slots, SlotIter, SlotWindow};
