//! Errors raised by the schedule store.
//!
//! Each variant carries an [`ErrorContext`] naming the store operation and
//! the entity it was working on, so a failed write can be traced back to the
//! team, panel or record that caused it.

use std::fmt;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a store error happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Store method name, e.g. `set_team_guides`.
    pub operation: Option<String>,
    /// Kind of row involved: `team`, `guide`, `panel` or `schedule_record`.
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    /// Set when repeating the same call against fresh state can succeed.
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("operation", self.operation.as_deref()),
            ("entity", self.entity.as_deref()),
            ("id", self.entity_id.as_deref()),
            ("details", self.details.as_deref()),
            ("retryable", self.retryable.then_some("true")),
        ];
        let shown: Vec<String> = fields
            .iter()
            .filter_map(|(name, value)| value.map(|v| format!("{}={}", name, v)))
            .collect();
        write!(f, "[{}]", shown.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The store refused service, e.g. after a failed health check.
    #[error("Store unavailable: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// A referenced team, guide, panel or record does not exist.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// The write would break a stored invariant: overlapping bookings on a
    /// panel, a second booking for a team, or a guide over capacity.
    #[error("Rejected write: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// Bad settings or an unreadable seed file.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// A conditional write observed a revision other than the one it was
    /// validated against. Nothing was written.
    #[error("Write conflict: expected revision {expected}, found {actual} {context}")]
    Conflict {
        expected: u64,
        actual: u64,
        context: ErrorContext,
    },
}

impl RepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn validation_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ValidationError {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn conflict(expected: u64, actual: u64, context: ErrorContext) -> Self {
        Self::Conflict {
            expected,
            actual,
            context: context.retryable(),
        }
    }

    /// Conflicts always are; an unavailable store is unless its context
    /// says otherwise.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Conflict { .. } => true,
            Self::ConnectionError { context, .. } => context.retryable,
            _ => false,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::Conflict { context, .. } => context,
        }
    }
}
