//! Side-effecting steps executed when a rule applies.

use super::context::StateContext;
use super::entity::StatefulObject;
use super::state::Event;
use std::fmt;
use std::sync::Arc;

/// Error type returned by guards and actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type Step<T, E> = dyn Fn(&mut StateContext<'_, T, E>) -> Result<(), BoxError> + Send + Sync;

/// A side-effecting step of a rule.
///
/// Actions of a rule run in the order they were declared, all against the
/// same context. The first action returning an error stops the rule: later
/// actions never run and the entity keeps its state.
pub struct Action<T: StatefulObject, E: Event> {
    name: Option<String>,
    step: Arc<Step<T, E>>,
}

impl<T: StatefulObject, E: Event> Action<T, E> {
    pub fn new<F>(step: F) -> Self
    where
        F: Fn(&mut StateContext<'_, T, E>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Action {
            name: None,
            step: Arc::new(step),
        }
    }

    /// Create an action with a name used in log output.
    pub fn named<F>(name: impl Into<String>, step: F) -> Self
    where
        F: Fn(&mut StateContext<'_, T, E>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Action {
            name: Some(name.into()),
            step: Arc::new(step),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn execute(&self, ctx: &mut StateContext<'_, T, E>) -> Result<(), BoxError> {
        (self.step)(ctx)
    }
}

impl<T: StatefulObject, E: Event> Clone for Action<T, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            step: Arc::clone(&self.step),
        }
    }
}

impl<T: StatefulObject, E: Event> fmt::Debug for Action<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("name", &self.name).finish()
    }
}
