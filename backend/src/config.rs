//! Scheduler configuration file support.
//!
//! Configuration is read from a TOML file and a few environment overrides.
//! The engine never reads it directly: callers pull the windows and limits
//! out of [`SchedulerConfig`] and hand them to each operation.
//!
//! ```toml
//! [repository]
//! type = "local"
//! seed = "seed/demo.json"
//!
//! [server]
//! port = 8080
//!
//! [engine]
//! max_commit_attempts = 3
//!
//! [guide_selection]
//! opens_at = "2024-01-08T09:00:00Z"
//! closes_at = "2024-01-19T17:00:00Z"
//!
//! [review_windows.review1]
//! opens_on = "2024-02-05"
//! closes_on = "2024-02-09"
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::db::factory::RepositoryType;
use crate::db::repository::RepositoryError;
use crate::models::ReviewType;

/// Complete scheduler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub guide_selection: GuideSelectionWindow,
    #[serde(default)]
    pub review_windows: ReviewWindows,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
    /// JSON directory snapshot loaded into the store at startup.
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
            seed: None,
        }
    }
}

impl RepositorySettings {
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repo_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Limits applied by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// How many times a conditional write is re-validated after losing a
    /// race before the request fails with a conflict.
    #[serde(default = "default_max_commit_attempts")]
    pub max_commit_attempts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_commit_attempts: default_max_commit_attempts(),
        }
    }
}

/// The period during which students pick their own guide.
///
/// Automatic guide allocation is only allowed once it has closed. With no
/// `closes_at` configured there is no selection period to wait for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideSelectionWindow {
    #[serde(default)]
    pub opens_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closes_at: Option<DateTime<Utc>>,
}

impl GuideSelectionWindow {
    pub fn closed_at(closes_at: DateTime<Utc>) -> Self {
        Self {
            opens_at: None,
            closes_at: Some(closes_at),
        }
    }

    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        match self.closes_at {
            Some(closes_at) => now >= closes_at,
            None => true,
        }
    }
}

/// Inclusive range of dates on which a review may be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWindow {
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
}

impl ReviewWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.opens_on <= date && date <= self.closes_on
    }
}

/// Optional scheduling window per review type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWindows {
    #[serde(default)]
    pub review1: Option<ReviewWindow>,
    #[serde(default)]
    pub review2: Option<ReviewWindow>,
    #[serde(default)]
    pub review3: Option<ReviewWindow>,
    #[serde(default)]
    pub viva: Option<ReviewWindow>,
}

impl ReviewWindows {
    pub fn get(&self, review_type: ReviewType) -> Option<&ReviewWindow> {
        match review_type {
            ReviewType::Review1 => self.review1.as_ref(),
            ReviewType::Review2 => self.review2.as_ref(),
            ReviewType::Review3 => self.review3.as_ref(),
            ReviewType::Viva => self.viva.as_ref(),
        }
    }
}

fn default_repo_type() -> String {
    "local".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_commit_attempts() -> u32 {
    3
}

impl SchedulerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(SchedulerConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        let config: SchedulerConfig = toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `scheduler.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        match Self::default_path() {
            Some(path) => Self::from_file(path),
            None => Err(RepositoryError::configuration(
                "No scheduler.toml found in standard locations",
            )),
        }
    }

    fn default_path() -> Option<PathBuf> {
        [
            PathBuf::from("scheduler.toml"),
            PathBuf::from("backend/scheduler.toml"),
            PathBuf::from("../scheduler.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Resolve the configuration the server should run with.
    ///
    /// Uses `SCHEDULER_CONFIG` when set, otherwise the default search path,
    /// otherwise built-in defaults; then applies environment overrides.
    pub fn load() -> Result<Self, RepositoryError> {
        let mut config = match env::var("SCHEDULER_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => match Self::default_path() {
                Some(path) => Self::from_file(path)?,
                None => {
                    log::info!("No scheduler.toml found; using built-in defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `HOST`, `PORT`, `REPOSITORY_TYPE` and `SCHEDULER_SEED`.
    pub fn apply_env_overrides(&mut self) -> Result<(), RepositoryError> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.parse().map_err(|_| {
                RepositoryError::configuration(format!("PORT must be a valid port number: {}", port))
            })?;
        }
        if let Ok(repo_type) = env::var("REPOSITORY_TYPE") {
            self.repository.repo_type = repo_type;
        }
        if let Ok(seed) = env::var("SCHEDULER_SEED") {
            self.repository.seed = Some(PathBuf::from(seed));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), RepositoryError> {
        self.repository
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        if self.engine.max_commit_attempts == 0 {
            return Err(RepositoryError::configuration(
                "engine.max_commit_attempts must be at least 1",
            ));
        }

        if let (Some(opens), Some(closes)) =
            (self.guide_selection.opens_at, self.guide_selection.closes_at)
        {
            if closes <= opens {
                return Err(RepositoryError::configuration(
                    "guide_selection.closes_at must be after opens_at",
                ));
            }
        }

        for review_type in ReviewType::ALL {
            if let Some(window) = self.review_windows.get(review_type) {
                if window.closes_on < window.opens_on {
                    return Err(RepositoryError::configuration(format!(
                        "review_windows.{}: closes_on is before opens_on",
                        review_type
                    )));
                }
            }
        }
        Ok(())
    }
}
