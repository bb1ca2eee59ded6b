//! Repository factory for dependency injection.
//!
//! Picks and builds a store from runtime configuration.

use std::str::FromStr;
use std::sync::Arc;

use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::seed::DirectorySeed;
use crate::config::RepositorySettings;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use review_scheduler::config::SchedulerConfig;
/// use review_scheduler::db::RepositoryFactory;
///
/// let config = SchedulerConfig::load()?;
/// let repo = RepositoryFactory::from_settings(&config.repository)?;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create an empty in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a repository of the given type, optionally seeded.
    pub fn create(
        repo_type: RepositoryType,
        seed: Option<DirectorySeed>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => {
                let repo = match seed {
                    Some(seed) => LocalRepository::from_seed(seed),
                    None => LocalRepository::new(),
                };
                Ok(Arc::new(repo))
            }
        }
    }

    /// Create the repository described by the `[repository]` settings,
    /// loading the directory seed file when one is configured.
    pub fn from_settings(
        settings: &RepositorySettings,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = settings.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        let seed = match &settings.seed {
            Some(path) => Some(DirectorySeed::from_file(path)?),
            None => None,
        };
        Self::create(repo_type, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            RepositoryType::from_str("Memory").unwrap(),
            RepositoryType::Local
        );
        assert!(RepositoryType::from_str("postgres").is_err());
    }

    #[tokio::test]
    async fn test_create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_from_settings_loads_seed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"guides": [{{"id": "F1", "name": "Dr. Rao", "capacity": 2}}]}}"#
        )
        .unwrap();

        let settings = RepositorySettings {
            repo_type: "local".to_string(),
            seed: Some(file.path().to_path_buf()),
        };
        let repo = RepositoryFactory::from_settings(&settings).unwrap();
        assert_eq!(repo.list_guides().await.unwrap().len(), 1);
    }

    #[test]
    fn test_from_settings_missing_seed_file() {
        let settings = RepositorySettings {
            repo_type: "local".to_string(),
            seed: Some("/nonexistent/seed.json".into()),
        };
        assert!(matches!(
            RepositoryFactory::from_settings(&settings),
            Err(RepositoryError::ConfigurationError { .. })
        ));
    }
}
