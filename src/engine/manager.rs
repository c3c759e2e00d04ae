//! The single entry point for driving entities through their lifecycles.

use super::config::{ConfigError, ManagerConfig};
use super::result::TransitionResult;
use crate::core::{Event, State, StateContext, StatefulObject, Variables};
use crate::registry::{ResolveError, RuleRegistry};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Executes events against entities using a shared [`RuleRegistry`].
///
/// Each call resolves exactly one rule, runs its guards and actions against a
/// fresh [`StateContext`], and commits the target state only when every guard
/// passed and every action completed. Structural problems (unknown lifecycle,
/// no rule, several rules) are returned as `Err`; guard rejections and
/// guard/action failures are reported inside the [`TransitionResult`].
pub struct LifecycleManager<T: StatefulObject, E: Event> {
    registry: Arc<RuleRegistry<T, E>>,
    config: ManagerConfig,
}

impl<T: StatefulObject, E: Event> LifecycleManager<T, E> {
    pub fn new(registry: Arc<RuleRegistry<T, E>>) -> Self {
        Self {
            registry,
            config: ManagerConfig::default(),
        }
    }

    pub fn with_config(
        registry: Arc<RuleRegistry<T, E>>,
        config: ManagerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    pub fn registry(&self) -> &Arc<RuleRegistry<T, E>> {
        &self.registry
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Execute `event` against `entity` with no initial variables.
    pub fn execute<'a>(
        &self,
        entity: &'a mut T,
        event: E,
    ) -> Result<TransitionResult<'a, T, E>, ResolveError> {
        self.execute_with(entity, event, Variables::new())
    }

    /// Execute `event` against `entity`, seeding the context with `variables`.
    pub fn execute_with<'a>(
        &self,
        entity: &'a mut T,
        event: E,
        variables: Variables,
    ) -> Result<TransitionResult<'a, T, E>, ResolveError> {
        if event.is_blank() {
            return Err(ResolveError::NullArgument { argument: "event" });
        }

        let execution_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "execute",
            %execution_id,
            lifecycle = entity.lifecycle_name(),
            event = event.name(),
        );
        let _enter = span.enter();

        let started_at = Utc::now();
        let rule = self.registry.resolve(entity, &event)?;
        let source_state = rule.source_state().clone();
        let target_state = rule.target_state().clone();

        let mut context = StateContext::new(entity, event, variables);
        let (succeeded, error) = match rule.apply(&mut context) {
            Ok(true) => {
                context.entity_mut().set_state(target_state.clone());
                tracing::debug!(
                    from = source_state.name(),
                    to = target_state.name(),
                    "transition committed"
                );
                (true, None)
            }
            Ok(false) => {
                tracing::debug!(
                    from = source_state.name(),
                    to = target_state.name(),
                    "transition rejected"
                );
                restore_state(&mut context, &source_state);
                (false, None)
            }
            Err(failure) => {
                tracing::error!(
                    from = source_state.name(),
                    to = target_state.name(),
                    entity_id = ?context.entity().id(),
                    error = %failure,
                    "transition failed"
                );
                if self.config.record_error_message {
                    context.set_variable_if_absent(self.config.error_key.clone(), failure.message());
                }
                restore_state(&mut context, &source_state);
                (false, Some(failure))
            }
        };

        Ok(TransitionResult {
            execution_id,
            succeeded,
            context,
            source_state,
            target_state,
            error,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Put back the source state if an action changed it on a run that did not
/// commit.
fn restore_state<T, E>(context: &mut StateContext<'_, T, E>, source: &T::State)
where
    T: StatefulObject,
    E: Event,
{
    let current = context.entity().state();
    if current != source {
        tracing::warn!(
            found = current.name(),
            restored = source.name(),
            "action changed state of uncommitted transition"
        );
        context.entity_mut().set_state(source.clone());
    }
}

impl<T: StatefulObject, E: Event> Clone for LifecycleManager<T, E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            config: self.config.clone(),
        }
    }
}
