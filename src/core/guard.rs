//! Guard predicates for controlling transitions.
//!
//! Guards are boolean functions over the execution context that determine
//! whether a matched rule may apply. Every guard of a rule must pass before
//! any of its actions run.

use super::action::BoxError;
use super::context::StateContext;
use super::entity::StatefulObject;
use super::state::Event;
use std::fmt;
use std::sync::Arc;

type Predicate<T, E> =
    dyn Fn(&StateContext<'_, T, E>) -> Result<bool, BoxError> + Send + Sync;

/// Predicate that determines if a rule can apply.
///
/// A guard only reads the context. It may fail (for example when a variable
/// holds a value of the wrong type); the failure is reported to the caller
/// through the transition result, exactly like a failing action.
///
/// # Example
///
/// ```rust
/// use statekeeper::core::{Guard, StateContext, StatefulObject, Variables};
///
/// struct Invoice {
///     state: String,
/// }
///
/// impl StatefulObject for Invoice {
///     type State = String;
///     type Id = ();
///     fn id(&self) {}
///     fn state(&self) -> &String { &self.state }
///     fn set_state(&mut self, state: String) { self.state = state; }
///     fn lifecycle_name(&self) -> &str { "invoice" }
/// }
///
/// let in_euro = Guard::<Invoice, String>::try_new(|ctx| {
///     Ok(ctx.variable::<String>("currency")?.map(String::as_str) == Some("EUR"))
/// });
///
/// let mut invoice = Invoice { state: "open".to_string() };
/// let ctx = StateContext::new(
///     &mut invoice,
///     "pay".to_string(),
///     Variables::new().with("currency", "EUR".to_string()),
/// );
/// assert!(in_euro.check(&ctx).unwrap());
/// ```
pub struct Guard<T: StatefulObject, E: Event> {
    predicate: Arc<Predicate<T, E>>,
}

impl<T: StatefulObject, E: Event> Guard<T, E> {
    /// Create a guard from an infallible predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&StateContext<'_, T, E>) -> bool + Send + Sync + 'static,
    {
        Self::try_new(move |ctx| Ok(predicate(ctx)))
    }

    /// Create a guard from a predicate that may fail.
    pub fn try_new<F>(predicate: F) -> Self
    where
        F: Fn(&StateContext<'_, T, E>) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard against the context.
    pub fn check(&self, ctx: &StateContext<'_, T, E>) -> Result<bool, BoxError> {
        (self.predicate)(ctx)
    }
}

impl<T: StatefulObject, E: Event> Clone for Guard<T, E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T: StatefulObject, E: Event> fmt::Debug for Guard<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}
