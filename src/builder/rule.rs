//! Sequential builder for declaring the rules of one lifecycle.

use crate::builder::error::{BuildError, RuleDefect};
use crate::core::{Action, BoxError, Event, Guard, State, StateContext, StatefulObject};
use crate::engine::Rule;
use stillwater::validation::Validation;

/// Whether a rule is currently being described.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Describing,
}

struct RuleDraft<T: StatefulObject, E: Event> {
    source_state: Option<T::State>,
    target_state: Option<T::State>,
    event: Option<E>,
    guards: Vec<Guard<T, E>>,
    actions: Vec<Action<T, E>>,
}

impl<T: StatefulObject, E: Event> RuleDraft<T, E> {
    fn new() -> Self {
        Self {
            source_state: None,
            target_state: None,
            event: None,
            guards: Vec::new(),
            actions: Vec::new(),
        }
    }

    fn render(&self) -> String {
        fn part<V: std::fmt::Debug>(value: &Option<V>) -> String {
            value
                .as_ref()
                .map_or_else(|| "?".to_string(), |v| format!("{v:?}"))
        }
        format!(
            "{} --{}--> {}",
            part(&self.source_state),
            part(&self.event),
            part(&self.target_state)
        )
    }

    fn validate(self, position: usize) -> Validation<Rule<T, E>, Vec<RuleDefect>> {
        let rule = self.render();
        match (self.source_state, self.target_state, self.event) {
            (Some(source), Some(target), Some(event)) => Validation::success(Rule::new(
                source,
                target,
                event,
                self.guards,
                self.actions,
            )),
            (source, target, event) => {
                let missing = [
                    (source.is_none(), "source state"),
                    (target.is_none(), "target state"),
                    (event.is_none(), "event"),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                Validation::failure(vec![RuleDefect {
                    position,
                    rule,
                    missing,
                }])
            }
        }
    }
}

/// Fluent, stateful builder used by a [`LifecycleConfiguration`] to declare
/// its rules one at a time.
///
/// Every rule starts with [`begin`](Self::begin); attribute calls apply to the
/// rule most recently begun. Mandatory attributes are checked by
/// [`build`](Self::build), which reports every incomplete rule at once.
///
/// [`LifecycleConfiguration`]: crate::registry::LifecycleConfiguration
///
/// # Example
///
/// ```rust
/// use statekeeper::builder::RuleBuilder;
/// use statekeeper::core::StatefulObject;
///
/// struct Door { state: String }
///
/// impl StatefulObject for Door {
///     type State = String;
///     type Id = ();
///     fn id(&self) {}
///     fn state(&self) -> &String { &self.state }
///     fn set_state(&mut self, state: String) { self.state = state; }
///     fn lifecycle_name(&self) -> &str { "door" }
/// }
///
/// # fn main() -> Result<(), statekeeper::builder::BuildError> {
/// let mut builder = RuleBuilder::<Door, String>::new();
/// builder
///     .begin()
///     .source_state("closed".to_string())?
///     .target_state("open".to_string())?
///     .event("push".to_string())?;
/// builder
///     .begin()
///     .source_state("open".to_string())?
///     .target_state("closed".to_string())?
///     .event("pull".to_string())?;
///
/// let rules = builder.build()?;
/// assert_eq!(rules.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct RuleBuilder<T: StatefulObject, E: Event> {
    drafts: Vec<RuleDraft<T, E>>,
    phase: Phase,
}

impl<T: StatefulObject, E: Event> RuleBuilder<T, E> {
    pub fn new() -> Self {
        Self {
            drafts: Vec::new(),
            phase: Phase::Idle,
        }
    }

    /// Start describing a new rule.
    pub fn begin(&mut self) -> &mut Self {
        self.drafts.push(RuleDraft::new());
        self.phase = Phase::Describing;
        self
    }

    /// Set the source state of the current rule (required).
    pub fn source_state(&mut self, state: T::State) -> Result<&mut Self, BuildError> {
        if state.is_blank() {
            return Err(BuildError::NullArgument {
                argument: "source_state",
            });
        }
        self.current("source_state")?.source_state = Some(state);
        Ok(self)
    }

    /// Set the target state of the current rule (required).
    pub fn target_state(&mut self, state: T::State) -> Result<&mut Self, BuildError> {
        if state.is_blank() {
            return Err(BuildError::NullArgument {
                argument: "target_state",
            });
        }
        self.current("target_state")?.target_state = Some(state);
        Ok(self)
    }

    /// Set the event of the current rule (required).
    pub fn event(&mut self, event: E) -> Result<&mut Self, BuildError> {
        if event.is_blank() {
            return Err(BuildError::NullArgument { argument: "event" });
        }
        self.current("event")?.event = Some(event);
        Ok(self)
    }

    /// Add a guard to the current rule (optional).
    pub fn guard(&mut self, guard: Guard<T, E>) -> Result<&mut Self, BuildError> {
        self.current("guard")?.guards.push(guard);
        Ok(self)
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(&mut self, predicate: F) -> Result<&mut Self, BuildError>
    where
        F: Fn(&StateContext<'_, T, E>) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Append an action to the current rule; actions run in call order.
    pub fn action(&mut self, action: Action<T, E>) -> Result<&mut Self, BuildError> {
        self.current("action")?.actions.push(action);
        Ok(self)
    }

    /// Append an action using a closure.
    pub fn action_fn<F>(&mut self, step: F) -> Result<&mut Self, BuildError>
    where
        F: Fn(&mut StateContext<'_, T, E>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.action(Action::new(step))
    }

    /// Number of rules begun so far.
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Validate every declared rule and return them in declaration order.
    pub fn build(self) -> Result<Vec<Rule<T, E>>, BuildError> {
        let checks: Vec<_> = self
            .drafts
            .into_iter()
            .enumerate()
            .map(|(position, draft)| draft.validate(position))
            .collect();

        match Validation::all_vec(checks) {
            Validation::Success(rules) => Ok(rules),
            Validation::Failure(defects) => Err(BuildError::MalformedRule { defects }),
        }
    }

    fn current(&mut self, operation: &'static str) -> Result<&mut RuleDraft<T, E>, BuildError> {
        match self.phase {
            Phase::Idle => Err(BuildError::ConfigurationSequence { operation }),
            Phase::Describing => self
                .drafts
                .last_mut()
                .ok_or(BuildError::ConfigurationSequence { operation }),
        }
    }
}

impl<T: StatefulObject, E: Event> Default for RuleBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
