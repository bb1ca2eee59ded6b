//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all store traits suitable
//! for unit testing and local development. All data lives in ordered maps
//! behind a single lock, so every conditional write is a true
//! read-check-write transaction.

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::db::repository::*;
use crate::db::seed::DirectorySeed;
use crate::models::*;

/// In-memory local repository.
///
/// # Example
/// ```
/// use review_scheduler::db::repositories::LocalRepository;
/// use review_scheduler::models::{Guide, FacultyId};
///
/// let repo = LocalRepository::new();
/// repo.insert_guide(Guide { id: FacultyId::from("F1"), name: "Dr. Rao".into(), capacity: 2 });
/// assert_eq!(repo.guide_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    teams: BTreeMap<TeamId, Team>,
    guides: BTreeMap<FacultyId, Guide>,
    panels: BTreeMap<PanelId, Panel>,
    attendance: HashMap<(StudentId, ReviewType), bool>,
    records: BTreeMap<ScheduleRecordId, ScheduleRecord>,

    next_record_id: i64,
    revision: Revision,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            teams: BTreeMap::new(),
            guides: BTreeMap::new(),
            panels: BTreeMap::new(),
            attendance: HashMap::new(),
            records: BTreeMap::new(),
            next_record_id: 1,
            revision: 0,
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.is_healthy {
            return Err(RepositoryError::connection("Store is not healthy"));
        }
        Ok(())
    }

    fn check_revision(&self, expected: Revision, operation: &str) -> RepositoryResult<()> {
        if self.revision != expected {
            debug!(
                "{}: stale revision (expected {}, current {})",
                operation, expected, self.revision
            );
            return Err(RepositoryError::conflict(
                expected,
                self.revision,
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn guide_load(&self, guide: &FacultyId) -> u32 {
        self.teams
            .values()
            .filter(|t| t.guide.as_ref() == Some(guide))
            .count() as u32
    }

    /// Checks a candidate record against stored records, skipping `ignore`.
    fn check_record_invariants(
        &self,
        candidate: &ScheduleRecord,
        ignore: Option<ScheduleRecordId>,
        operation: &str,
    ) -> RepositoryResult<()> {
        if !self.teams.contains_key(&candidate.team) {
            return Err(RepositoryError::not_found_with_context(
                format!("Team {} not found", candidate.team),
                ErrorContext::new(operation)
                    .with_entity("team")
                    .with_entity_id(&candidate.team),
            ));
        }
        if !self.panels.contains_key(&candidate.panel) {
            return Err(RepositoryError::not_found_with_context(
                format!("Panel {} not found", candidate.panel),
                ErrorContext::new(operation)
                    .with_entity("panel")
                    .with_entity_id(&candidate.panel),
            ));
        }
        if !candidate.key().is_well_formed() {
            return Err(RepositoryError::validation_with_context(
                format!("Interval {} is empty or reversed", candidate.key()),
                ErrorContext::new(operation).with_entity("schedule_record"),
            ));
        }

        let key = candidate.key();
        for existing in self.records.values() {
            if Some(existing.id) == ignore {
                continue;
            }
            if existing.team == candidate.team && existing.review_type == candidate.review_type {
                return Err(RepositoryError::validation_with_context(
                    format!(
                        "Team {} already holds record {} for {}",
                        candidate.team, existing.id, candidate.review_type
                    ),
                    ErrorContext::new(operation)
                        .with_entity("schedule_record")
                        .with_entity_id(existing.id),
                ));
            }
            if existing.clashes_with(&candidate.panel, candidate.review_type, &key) {
                return Err(RepositoryError::validation_with_context(
                    format!(
                        "Interval {} overlaps record {} on panel {}",
                        key, existing.id, candidate.panel
                    ),
                    ErrorContext::new(operation)
                        .with_entity("schedule_record")
                        .with_entity_id(existing.id),
                ));
            }
        }
        Ok(())
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository pre-populated with a directory snapshot.
    pub fn from_seed(seed: DirectorySeed) -> Self {
        let repo = Self::new();
        repo.load_seed(seed);
        repo
    }

    /// Merge a directory snapshot into the store.
    pub fn load_seed(&self, seed: DirectorySeed) {
        let (teams, guides, panels, attendance) = (
            seed.teams.len(),
            seed.guides.len(),
            seed.panels.len(),
            seed.attendance.len(),
        );
        for team in seed.teams {
            self.insert_team(team);
        }
        for guide in seed.guides {
            self.insert_guide(guide);
        }
        for panel in seed.panels {
            self.insert_panel(panel);
        }
        for record in seed.attendance {
            self.record_attendance(&record.student, record.review_type, record.present);
        }
        info!(
            "Loaded directory seed: {} teams, {} guides, {} panels, {} attendance marks",
            teams, guides, panels, attendance
        );
    }

    /// Add or replace a team.
    pub fn insert_team(&self, team: Team) {
        let mut data = self.data.write();
        data.teams.insert(team.id.clone(), team);
        data.bump();
    }

    /// Add or replace a guide.
    pub fn insert_guide(&self, guide: Guide) {
        let mut data = self.data.write();
        data.guides.insert(guide.id.clone(), guide);
        data.bump();
    }

    /// Add or replace a panel.
    pub fn insert_panel(&self, panel: Panel) {
        let mut data = self.data.write();
        data.panels.insert(panel.id.clone(), panel);
        data.bump();
    }

    /// Mark a student present or absent at a review.
    pub fn record_attendance(&self, student: &StudentId, review_type: ReviewType, present: bool) {
        let mut data = self.data.write();
        data.attendance
            .insert((student.clone(), review_type), present);
        data.bump();
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let revision = data.revision + 1;
        *data = LocalData {
            is_healthy: data.is_healthy,
            revision,
            ..Default::default()
        };
    }

    pub fn record_count(&self) -> usize {
        self.data.read().records.len()
    }

    pub fn guide_count(&self) -> usize {
        self.data.read().guides.len()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn get_team(&self, team_id: &TeamId) -> RepositoryResult<Option<Team>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.teams.get(team_id).cloned())
    }

    async fn list_teams(&self) -> RepositoryResult<Vec<Team>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.teams.values().cloned().collect())
    }

    async fn get_guide(&self, guide_id: &FacultyId) -> RepositoryResult<Option<Guide>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.guides.get(guide_id).cloned())
    }

    async fn list_guides(&self) -> RepositoryResult<Vec<Guide>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.guides.values().cloned().collect())
    }

    async fn get_panel(&self, panel_id: &PanelId) -> RepositoryResult<Option<Panel>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.panels.get(panel_id).cloned())
    }

    async fn list_panels(&self) -> RepositoryResult<Vec<Panel>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.panels.values().cloned().collect())
    }

    async fn attendance(
        &self,
        student: &StudentId,
        review_type: ReviewType,
    ) -> RepositoryResult<Option<bool>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data
            .attendance
            .get(&(student.clone(), review_type))
            .copied())
    }
}

#[async_trait]
impl ScheduleRepository for LocalRepository {
    async fn revision(&self) -> RepositoryResult<Revision> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.revision)
    }

    async fn list_schedule_records(
        &self,
        review_type: ReviewType,
    ) -> RepositoryResult<Vec<ScheduleRecord>> {
        let data = self.data.read();
        data.check_health()?;
        let mut records: Vec<ScheduleRecord> = data
            .records
            .values()
            .filter(|r| r.review_type == review_type)
            .cloned()
            .collect();
        records.sort_by(|a, b| (&a.panel, a.start, a.id).cmp(&(&b.panel, b.start, b.id)));
        Ok(records)
    }

    async fn records_for_team(&self, team_id: &TeamId) -> RepositoryResult<Vec<ScheduleRecord>> {
        let data = self.data.read();
        data.check_health()?;
        let mut records: Vec<ScheduleRecord> = data
            .records
            .values()
            .filter(|r| &r.team == team_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.review_type);
        Ok(records)
    }

    async fn get_schedule_record(
        &self,
        record_id: ScheduleRecordId,
    ) -> RepositoryResult<Option<ScheduleRecord>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.records.get(&record_id).cloned())
    }

    async fn insert_schedule_records(
        &self,
        expected: Revision,
        records: Vec<NewScheduleRecord>,
    ) -> RepositoryResult<Vec<ScheduleRecord>> {
        const OP: &str = "insert_schedule_records";
        let mut data = self.data.write();
        data.check_health()?;
        data.check_revision(expected, OP)?;

        // Validate the whole batch (against storage and against itself)
        // before touching anything.
        let mut staged: Vec<ScheduleRecord> = Vec::with_capacity(records.len());
        let mut next_id = data.next_record_id;
        for new in records {
            let candidate = new.into_record(ScheduleRecordId::new(next_id));
            next_id += 1;
            data.check_record_invariants(&candidate, None, OP)?;
            let key = candidate.key();
            if let Some(clash) = staged.iter().find(|s| {
                (s.team == candidate.team && s.review_type == candidate.review_type)
                    || s.clashes_with(&candidate.panel, candidate.review_type, &key)
            }) {
                return Err(RepositoryError::validation_with_context(
                    format!(
                        "Batch entries for teams {} and {} collide",
                        clash.team, candidate.team
                    ),
                    ErrorContext::new(OP).with_entity("schedule_record"),
                ));
            }
            staged.push(candidate);
        }

        data.next_record_id = next_id;
        for record in &staged {
            data.records.insert(record.id, record.clone());
        }
        data.bump();
        debug!(
            "Inserted {} schedule records at revision {}",
            staged.len(),
            data.revision
        );
        Ok(staged)
    }

    async fn update_schedule_record(
        &self,
        expected: Revision,
        record: ScheduleRecord,
    ) -> RepositoryResult<ScheduleRecord> {
        const OP: &str = "update_schedule_record";
        let mut data = self.data.write();
        data.check_health()?;
        data.check_revision(expected, OP)?;
        if !data.records.contains_key(&record.id) {
            return Err(RepositoryError::not_found_with_context(
                format!("Schedule record {} not found", record.id),
                ErrorContext::new(OP)
                    .with_entity("schedule_record")
                    .with_entity_id(record.id),
            ));
        }
        data.check_record_invariants(&record, Some(record.id), OP)?;
        data.records.insert(record.id, record.clone());
        data.bump();
        Ok(record)
    }

    async fn delete_schedule_record(
        &self,
        expected: Revision,
        record_id: ScheduleRecordId,
    ) -> RepositoryResult<()> {
        const OP: &str = "delete_schedule_record";
        let mut data = self.data.write();
        data.check_health()?;
        data.check_revision(expected, OP)?;
        if data.records.remove(&record_id).is_none() {
            return Err(RepositoryError::not_found_with_context(
                format!("Schedule record {} not found", record_id),
                ErrorContext::new(OP)
                    .with_entity("schedule_record")
                    .with_entity_id(record_id),
            ));
        }
        data.bump();
        Ok(())
    }

    async fn set_team_guides(
        &self,
        expected: Revision,
        changes: &[(TeamId, Option<FacultyId>)],
    ) -> RepositoryResult<()> {
        const OP: &str = "set_team_guides";
        let mut data = self.data.write();
        data.check_health()?;
        data.check_revision(expected, OP)?;

        // Guides receiving a team they do not already guide. Only these are
        // held to capacity; releasing a team is always allowed.
        let mut receiving: HashSet<FacultyId> = HashSet::new();
        for (team_id, guide) in changes {
            let team = data.teams.get(team_id).ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Team {} not found", team_id),
                    ErrorContext::new(OP).with_entity("team").with_entity_id(team_id),
                )
            })?;
            if let Some(guide) = guide {
                if !data.guides.contains_key(guide) {
                    return Err(RepositoryError::not_found_with_context(
                        format!("Guide {} not found", guide),
                        ErrorContext::new(OP).with_entity("guide").with_entity_id(guide),
                    ));
                }
                if team.guide.as_ref() != Some(guide) {
                    receiving.insert(guide.clone());
                }
            }
        }

        // Apply to a scratch copy so a capacity breach leaves the store untouched.
        let mut teams = data.teams.clone();
        for (team_id, guide) in changes {
            if let Some(team) = teams.get_mut(team_id) {
                team.guide = guide.clone();
            }
        }
        for guide_id in &receiving {
            let Some(guide) = data.guides.get(guide_id) else {
                continue;
            };
            let load = teams
                .values()
                .filter(|t| t.guide.as_ref() == Some(guide_id))
                .count() as u32;
            if load > guide.capacity {
                return Err(RepositoryError::validation_with_context(
                    format!(
                        "Guide {} would supervise {} teams (capacity {})",
                        guide_id, load, guide.capacity
                    ),
                    ErrorContext::new(OP).with_entity("guide").with_entity_id(guide_id),
                ));
            }
        }

        data.teams = teams;
        data.bump();
        debug!(
            "Updated guide references of {} teams at revision {}",
            changes.len(),
            data.revision
        );
        Ok(())
    }

    async fn set_team_panel(
        &self,
        expected: Revision,
        team_id: &TeamId,
        panel_id: Option<PanelId>,
    ) -> RepositoryResult<()> {
        const OP: &str = "set_team_panel";
        let mut data = self.data.write();
        data.check_health()?;
        data.check_revision(expected, OP)?;
        if let Some(panel) = &panel_id {
            if !data.panels.contains_key(panel) {
                return Err(RepositoryError::not_found_with_context(
                    format!("Panel {} not found", panel),
                    ErrorContext::new(OP).with_entity("panel").with_entity_id(panel),
                ));
            }
        }
        let team = data.teams.get_mut(team_id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Team {} not found", team_id),
                ErrorContext::new(OP).with_entity("team").with_entity_id(team_id),
            )
        })?;
        team.panel = panel_id;
        data.bump();
        Ok(())
    }
}

impl LocalRepository {
    /// Number of teams currently referencing `guide`.
    pub fn guide_load(&self, guide: &FacultyId) -> u32 {
        self.data.read().guide_load(guide)
    }
}
