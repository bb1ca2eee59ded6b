//! Public API surface for the scheduling engine.
//!
//! This file consolidates the types a caller needs to drive the engine,
//! whether in-process or through the HTTP layer. All of them derive
//! Serialize/Deserialize for JSON serialization.

pub use crate::models::{
    AttendanceRecord, FacultyId, Guide, MemberKind, NewScheduleRecord, Panel, PanelDefect,
    PanelId, PanelMember, ReviewSlot, ReviewType, ScheduleRecord, ScheduleRecordId,
    SessionHalf, SlotKey, StudentId, Team, TeamId, TeamStatus,
};

pub use crate::services::{
    BlockReason, CommitRequest, Eligibility, ErrorCategory, GuideAllocation, GuideAssignment,
    PanelOption, SlotAssignment, SlotPlan, SlotWindow, Violation, ViolationKind,
};

pub use crate::config::{GuideSelectionWindow, ReviewWindow};

pub use crate::db::seed::DirectorySeed;
