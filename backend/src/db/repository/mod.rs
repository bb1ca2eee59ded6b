//! Store trait definitions.
//!
//! The engine sees the store through two focused traits:
//!
//! - [`DirectoryRepository`]: read access to teams, guides, panels and
//!   attendance, all owned by collaborators outside the engine.
//! - [`ScheduleRepository`]: schedule records plus the conditional writes the
//!   engine performs (record commits, guide and panel references).
//!
//! # Optimistic concurrency
//!
//! Every successful write bumps a store-wide revision. Writers read the
//! revision, validate against the state they read, and pass the revision back
//! with the write. If anything was written in between, the store answers
//! [`RepositoryError::Conflict`] and writes nothing.
//!
//! ```ignore
//! let revision = repo.revision().await?;
//! let teams = repo.list_teams().await?;
//! // ... validate ...
//! repo.set_team_guides(revision, &changes).await?;
//! ```

pub mod directory;
pub mod error;
pub mod schedule;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use directory::DirectoryRepository;
pub use schedule::ScheduleRepository;

/// Store-wide write counter used to condition writes.
pub type Revision = u64;

/// Composite trait bound for a complete store implementation.
pub trait FullRepository: DirectoryRepository + ScheduleRepository {}

impl<T> FullRepository for T where T: DirectoryRepository + ScheduleRepository {}
