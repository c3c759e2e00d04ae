//! Rule resolution errors.

use thiserror::Error;

/// Errors from resolving the rule for an entity and event.
///
/// These indicate a programming or deployment defect and are returned from
/// `execute` directly rather than being captured into a transition result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{argument} must not be null or blank")]
    NullArgument { argument: &'static str },

    #[error("lifecycle not found: '{lifecycle}'")]
    LifecycleNotFound { lifecycle: String },

    #[error("ambiguous transition in lifecycle '{lifecycle}': {} rules match state {state} and event {event}", .rules.len())]
    AmbiguousTransition {
        lifecycle: String,
        state: String,
        event: String,
        rules: Vec<String>,
    },

    #[error("no transition in lifecycle '{lifecycle}' for state {state} and event {event} (entity {entity_id})")]
    TransitionNotFound {
        lifecycle: String,
        state: String,
        event: String,
        entity_id: String,
    },
}

impl ResolveError {
    /// Returns a stable code for the error kind, suitable for host-side
    /// metrics or API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolveError::NullArgument { .. } => "NULL_ARGUMENT",
            ResolveError::LifecycleNotFound { .. } => "LIFECYCLE_NOT_FOUND",
            ResolveError::AmbiguousTransition { .. } => "AMBIGUOUS_TRANSITION",
            ResolveError::TransitionNotFound { .. } => "TRANSITION_NOT_FOUND",
        }
    }
}
