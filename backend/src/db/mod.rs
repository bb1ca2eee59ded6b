//! Storage boundary of the scheduling engine.
//!
//! The engine treats its store as a transactional document store with
//! conditional writes. This module holds the trait definitions, the in-memory
//! implementation, and the plumbing to pick and share one instance.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP Layer (http/) - request parsing, error mapping     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Engine (services/) - slots, gating, commits, balancing │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Store Traits (repository/) - Directory + Schedule      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;
pub mod seed;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
pub use repository::{
    DirectoryRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    Revision, ScheduleRepository,
};
pub use seed::DirectorySeed;

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

use crate::config::RepositorySettings;

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository singleton from repository settings.
///
/// Later calls are no-ops; the first configuration wins.
pub fn init_repository(settings: &RepositorySettings) -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = RepositoryFactory::from_settings(settings)
        .map_err(|e| anyhow::Error::msg(e.to_string()))?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
