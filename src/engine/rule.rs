//! Transition rules and their two-phase execution.

use crate::core::{Action, Event, Guard, StateContext, StatefulObject};
use crate::engine::result::TransitionFailure;
use std::fmt;

/// A transition rule: `(source_state, event) -> target_state` plus guards and
/// ordered actions.
///
/// Rules are produced by the [`RuleBuilder`] and are immutable afterwards.
///
/// [`RuleBuilder`]: crate::builder::RuleBuilder
pub struct Rule<T: StatefulObject, E: Event> {
    source_state: T::State,
    target_state: T::State,
    event: E,
    guards: Vec<Guard<T, E>>,
    actions: Vec<Action<T, E>>,
}

impl<T: StatefulObject, E: Event> Rule<T, E> {
    pub(crate) fn new(
        source_state: T::State,
        target_state: T::State,
        event: E,
        guards: Vec<Guard<T, E>>,
        actions: Vec<Action<T, E>>,
    ) -> Self {
        Self {
            source_state,
            target_state,
            event,
            guards,
            actions,
        }
    }

    pub fn source_state(&self) -> &T::State {
        &self.source_state
    }

    pub fn target_state(&self) -> &T::State {
        &self.target_state
    }

    pub fn event(&self) -> &E {
        &self.event
    }

    pub fn guards(&self) -> &[Guard<T, E>] {
        &self.guards
    }

    pub fn actions(&self) -> &[Action<T, E>] {
        &self.actions
    }

    /// Check if this rule is keyed by the given state and event (pure).
    pub fn matches(&self, state: &T::State, event: &E) -> bool {
        self.source_state == *state && self.event == *event
    }

    /// Apply the rule to the context.
    ///
    /// Every guard is evaluated first; if any returns `false` no action runs
    /// and `Ok(false)` is returned. Otherwise actions run in declared order and
    /// the first failing action aborts the rest. `Ok(true)` means every action
    /// completed. The entity's state is never touched here.
    pub fn apply(&self, ctx: &mut StateContext<'_, T, E>) -> Result<bool, TransitionFailure> {
        for (index, guard) in self.guards.iter().enumerate() {
            let allowed = guard
                .check(ctx)
                .map_err(|source| TransitionFailure::Guard { index, source })?;
            if !allowed {
                tracing::debug!(
                    rule = %self,
                    guard = index,
                    "guard rejected transition"
                );
                return Ok(false);
            }
        }

        for (index, action) in self.actions.iter().enumerate() {
            action
                .execute(ctx)
                .map_err(|source| TransitionFailure::Action {
                    index,
                    name: action.name().map(str::to_string),
                    source,
                })?;
        }

        Ok(true)
    }
}

impl<T: StatefulObject, E: Event> Clone for Rule<T, E> {
    fn clone(&self) -> Self {
        Self {
            source_state: self.source_state.clone(),
            target_state: self.target_state.clone(),
            event: self.event.clone(),
            guards: self.guards.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<T: StatefulObject, E: Event> fmt::Display for Rule<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} --{:?}--> {:?}",
            self.source_state, self.event, self.target_state
        )
    }
}

impl<T: StatefulObject, E: Event> fmt::Debug for Rule<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("source_state", &self.source_state)
            .field("target_state", &self.target_state)
            .field("event", &self.event)
            .field("guards", &self.guards.len())
            .field("actions", &self.actions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Variables;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Task {
        state: String,
    }

    impl StatefulObject for Task {
        type State = String;
        type Id = &'static str;

        fn id(&self) -> &'static str {
            "task-1"
        }

        fn state(&self) -> &String {
            &self.state
        }

        fn set_state(&mut self, state: String) {
            self.state = state;
        }

        fn lifecycle_name(&self) -> &str {
            "task"
        }
    }

    fn append(label: &'static str) -> Action<Task, String> {
        Action::new(move |ctx| {
            let mut order = ctx
                .variable::<Vec<&'static str>>("action-order")?
                .cloned()
                .unwrap_or_default();
            order.push(label);
            ctx.set_variable("action-order", order);
            Ok(())
        })
    }

    fn rule(guards: Vec<Guard<Task, String>>, actions: Vec<Action<Task, String>>) -> Rule<Task, String> {
        Rule::new(
            "open".to_string(),
            "done".to_string(),
            "finish".to_string(),
            guards,
            actions,
        )
    }

    fn task() -> Task {
        Task {
            state: "open".to_string(),
        }
    }

    #[test]
    fn matches_on_source_state_and_event() {
        let rule = rule(vec![], vec![]);

        assert!(rule.matches(&"open".to_string(), &"finish".to_string()));
        assert!(!rule.matches(&"done".to_string(), &"finish".to_string()));
        assert!(!rule.matches(&"open".to_string(), &"reopen".to_string()));
    }

    #[test]
    fn actions_run_in_declared_order() {
        let rule = rule(vec![], vec![append("a"), append("b"), append("c")]);
        let mut task = task();
        let mut ctx = StateContext::new(&mut task, "finish".to_string(), Variables::new());

        assert!(rule.apply(&mut ctx).unwrap());
        assert_eq!(
            ctx.variable::<Vec<&'static str>>("action-order").unwrap().unwrap(),
            &vec!["a", "b", "c"]
        );
    }

    #[test]
    fn false_guard_blocks_every_action() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let rule = rule(
            vec![Guard::new(|_| true), Guard::new(|_| false)],
            vec![Action::new(move |_| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })],
        );
        let mut task = task();
        let mut ctx = StateContext::new(&mut task, "finish".to_string(), Variables::new());

        assert!(!rule.apply(&mut ctx).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_action_stops_the_rest() {
        let rule = rule(
            vec![],
            vec![
                append("first"),
                Action::named("broken", |_| Err("disk full".into())),
                append("never"),
            ],
        );
        let mut task = task();
        let mut ctx = StateContext::new(&mut task, "finish".to_string(), Variables::new());

        let failure = rule.apply(&mut ctx).unwrap_err();
        match &failure {
            TransitionFailure::Action { index, name, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(name.as_deref(), Some("broken"));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert_eq!(
            ctx.variable::<Vec<&'static str>>("action-order").unwrap().unwrap(),
            &vec!["first"]
        );
    }

    #[test]
    fn failing_guard_is_reported_as_guard_failure() {
        let rule = rule(
            vec![Guard::try_new(|_| Err("lookup failed".into()))],
            vec![append("never")],
        );
        let mut task = task();
        let mut ctx = StateContext::new(&mut task, "finish".to_string(), Variables::new());

        let failure = rule.apply(&mut ctx).unwrap_err();
        assert!(matches!(failure, TransitionFailure::Guard { index: 0, .. }));
        assert!(!ctx.variables().contains_key("action-order"));
    }

    #[test]
    fn apply_never_changes_entity_state() {
        let rule = rule(vec![], vec![append("a")]);
        let mut task = task();
        let mut ctx = StateContext::new(&mut task, "finish".to_string(), Variables::new());

        assert!(rule.apply(&mut ctx).unwrap());
        drop(ctx);
        assert_eq!(task.state, "open");
    }

    #[test]
    fn display_shows_transition() {
        let rule = rule(vec![], vec![]);
        assert_eq!(rule.to_string(), "\"open\" --\"finish\"--> \"done\"");
    }
}
