//! Outcome of one `execute` call.

use crate::core::{BoxError, Event, StateContext, StatefulObject, Variables};
use crate::record::{Outcome, TransitionRecord};
use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A guard or action failure captured during rule execution.
///
/// The original error raised by the guard or action is kept as the
/// [`source`](std::error::Error::source) and can be downcast through
/// [`TransitionFailure::cause`].
#[derive(Debug, Error)]
pub enum TransitionFailure {
    #[error("guard #{index} failed: {source}")]
    Guard { index: usize, source: BoxError },

    #[error("action {} failed: {source}", describe_action(.index, .name))]
    Action {
        index: usize,
        name: Option<String>,
        source: BoxError,
    },
}

fn describe_action(index: &usize, name: &Option<String>) -> String {
    match name {
        Some(name) => format!("'{name}' (#{index})"),
        None => format!("#{index}"),
    }
}

impl TransitionFailure {
    /// The error raised by the guard or action.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match self {
            TransitionFailure::Guard { source, .. } | TransitionFailure::Action { source, .. } => {
                &**source
            }
        }
    }

    pub fn into_cause(self) -> BoxError {
        match self {
            TransitionFailure::Guard { source, .. } | TransitionFailure::Action { source, .. } => {
                source
            }
        }
    }

    /// Message recorded into the context when the failure is captured.
    ///
    /// Falls back to a description of the failing step when the cause has an
    /// empty message.
    pub fn message(&self) -> String {
        let message = self.cause().to_string();
        if !message.trim().is_empty() {
            return message;
        }
        match self {
            TransitionFailure::Guard { index, .. } => format!("guard #{index} failed"),
            TransitionFailure::Action { index, name, .. } => {
                format!("action {} failed", describe_action(index, name))
            }
        }
    }
}

/// Result of executing a transition.
///
/// A result is only produced once a rule has been resolved. Guard rejection
/// and action failure are reported here with `succeeded() == false`; the
/// entity keeps its state in both cases.
pub struct TransitionResult<'a, T: StatefulObject, E: Event> {
    pub(crate) execution_id: Uuid,
    pub(crate) succeeded: bool,
    pub(crate) context: StateContext<'a, T, E>,
    pub(crate) source_state: T::State,
    pub(crate) target_state: T::State,
    pub(crate) error: Option<TransitionFailure>,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) finished_at: DateTime<Utc>,
}

impl<'a, T: StatefulObject, E: Event> TransitionResult<'a, T, E> {
    /// Identifier of this execution, also attached to its log span.
    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn context(&self) -> &StateContext<'a, T, E> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut StateContext<'a, T, E> {
        &mut self.context
    }

    /// State the entity had when the execution started.
    pub fn source_state(&self) -> &T::State {
        &self.source_state
    }

    /// State the rule leads to. Equals the entity's state only on success.
    pub fn target_state(&self) -> &T::State {
        &self.target_state
    }

    /// The captured guard or action failure, if any.
    pub fn error(&self) -> Option<&TransitionFailure> {
        self.error.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn outcome(&self) -> Outcome {
        match (&self.error, self.succeeded) {
            (Some(_), _) => Outcome::Failed,
            (None, true) => Outcome::Committed,
            (None, false) => Outcome::Rejected,
        }
    }

    /// Builds a serializable record of this execution.
    ///
    /// The entity id is stored in its `Debug` rendering, so an
    /// `Option<String>` id reads `Some("42")`.
    pub fn record(&self) -> TransitionRecord<T::State, E> {
        let entity = self.context.entity();
        TransitionRecord {
            execution_id: self.execution_id,
            lifecycle: entity.lifecycle_name().to_string(),
            entity_id: format!("{:?}", entity.id()),
            from: self.source_state.clone(),
            to: self.target_state.clone(),
            event: self.context.event().clone(),
            outcome: self.outcome(),
            error: self.error.as_ref().map(TransitionFailure::message),
            timestamp: self.finished_at,
        }
    }

    /// Consumes the result, releasing the entity borrow.
    pub fn into_parts(self) -> (bool, Variables, Option<TransitionFailure>) {
        (self.succeeded, self.context.into_variables(), self.error)
    }
}

impl<T, E> fmt::Debug for TransitionResult<'_, T, E>
where
    T: StatefulObject,
    E: Event,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionResult")
            .field("execution_id", &self.execution_id)
            .field("succeeded", &self.succeeded)
            .field("source_state", &self.source_state)
            .field("target_state", &self.target_state)
            .field("error", &self.error)
            .field("context", &self.context)
            .finish()
    }
}
