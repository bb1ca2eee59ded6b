#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime};
use review_scheduler::db::LocalRepository;
use review_scheduler::models::{
    FacultyId, Guide, MemberKind, Panel, PanelId, PanelMember, ReviewType, SessionHalf,
    StudentId, Team, TeamId, TeamStatus,
};
use review_scheduler::services::SlotWindow;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn team(id: &str, members: &[&str], status: TeamStatus, panel: Option<&str>) -> Team {
    Team {
        id: TeamId::from(id),
        members: members.iter().map(|m| StudentId::from(*m)).collect(),
        leader: StudentId::from(members.first().copied().unwrap_or("nobody")),
        status,
        guide: None,
        panel: panel.map(PanelId::from),
    }
}

pub fn guided(mut team: Team, guide: &str) -> Team {
    team.guide = Some(FacultyId::from(guide));
    team
}

pub fn guide(id: &str, capacity: u32) -> Guide {
    Guide {
        id: FacultyId::from(id),
        name: format!("Dr. {}", id),
        capacity,
    }
}

pub fn panel(id: &str, name: &str, internal: &[&str], external: Option<&str>) -> Panel {
    let mut members: Vec<PanelMember> = internal
        .iter()
        .map(|f| PanelMember {
            faculty: FacultyId::from(*f),
            kind: MemberKind::Internal,
        })
        .collect();
    if let Some(f) = external {
        members.push(PanelMember {
            faculty: FacultyId::from(f),
            kind: MemberKind::External,
        });
    }
    Panel {
        id: PanelId::from(id),
        name: name.to_string(),
        coordinator: members
            .first()
            .map(|m| m.faculty.clone())
            .unwrap_or_else(|| FacultyId::from("C0")),
        members,
    }
}

/// A small cohort:
///
/// - panels `P1` (F1 + external X1), `P2` (F2), `P3` (F3)
/// - guides `F1` (cap 2), `F2` (cap 2), `F3` (cap 1)
/// - approved teams `T1`, `T2`, `T3` on `P1` and `T4` on `P2`
/// - pending team `T5` without a panel
pub fn cohort() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.insert_panel(panel("P1", "Panel A", &["F1"], Some("X1")));
    repo.insert_panel(panel("P2", "Panel B", &["F2"], None));
    repo.insert_panel(panel("P3", "Panel C", &["F3"], None));
    repo.insert_guide(guide("F1", 2));
    repo.insert_guide(guide("F2", 2));
    repo.insert_guide(guide("F3", 1));
    repo.insert_team(team("T1", &["S11", "S12"], TeamStatus::Approved, Some("P1")));
    repo.insert_team(team("T2", &["S21", "S22"], TeamStatus::Approved, Some("P1")));
    repo.insert_team(team("T3", &["S31"], TeamStatus::Approved, Some("P1")));
    repo.insert_team(team("T4", &["S41"], TeamStatus::Approved, Some("P2")));
    repo.insert_team(team("T5", &["S51"], TeamStatus::Pending, None));
    repo
}

/// Mark each listed student present or absent at `review_type`.
pub fn mark_team(repo: &LocalRepository, members: &[&str], review_type: ReviewType, present: bool) {
    for m in members {
        repo.record_attendance(&StudentId::from(*m), review_type, present);
    }
}

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

pub fn window(start: (u32, u32), end: (u32, u32), duration_minutes: i64) -> SlotWindow {
    SlotWindow {
        date: date(),
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        duration_minutes,
        session: SessionHalf::Forenoon,
    }
}

pub fn ids<'a>(teams: impl IntoIterator<Item = &'a TeamId>) -> Vec<&'a str> {
    teams.into_iter().map(TeamId::as_str).collect()
}
