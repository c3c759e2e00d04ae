//! Rule registry: lifecycles built from configurations, and rule resolution.
//!
//! The registry is built once, before any execution, and is read-only
//! afterwards. It can be shared behind an `Arc` by any number of managers or
//! threads.
//!
//! # Example
//!
//! ```rust
//! use statekeeper::builder::{BuildError, RuleBuilder};
//! use statekeeper::core::StatefulObject;
//! use statekeeper::registry::{LifecycleConfiguration, RuleRegistry};
//!
//! struct Door {
//!     state: String,
//! }
//!
//! impl StatefulObject for Door {
//!     type State = String;
//!     type Id = ();
//!
//!     fn id(&self) {}
//!     fn state(&self) -> &String {
//!         &self.state
//!     }
//!     fn set_state(&mut self, state: String) {
//!         self.state = state;
//!     }
//!     fn lifecycle_name(&self) -> &str {
//!         "door"
//!     }
//! }
//!
//! struct DoorRules;
//!
//! impl LifecycleConfiguration<Door, String> for DoorRules {
//!     fn lifecycle_name(&self) -> Option<&str> {
//!         Some("door")
//!     }
//!
//!     fn configure(&self, rules: &mut RuleBuilder<Door, String>) -> Result<(), BuildError> {
//!         rules
//!             .begin()
//!             .source_state("closed".to_string())?
//!             .event("open".to_string())?
//!             .target_state("open".to_string())?;
//!         Ok(())
//!     }
//! }
//!
//! let registry = RuleRegistry::builder().configuration(DoorRules).build().unwrap();
//! let door = Door { state: "closed".to_string() };
//! let rule = registry.resolve(&door, &"open".to_string()).unwrap();
//! assert_eq!(rule.target_state(), "open");
//! ```

pub mod error;
pub mod initializer;
pub mod lifecycle;

pub use error::ResolveError;
pub use initializer::{CodeConfigInitializer, LifecycleConfiguration, LifecyclesInitializer};
pub use lifecycle::{Ambiguity, Lifecycle};

use crate::builder::BuildError;
use crate::core::{Event, State, StatefulObject};
use crate::engine::Rule;
use std::collections::HashMap;
use std::fmt;

/// Immutable catalogue of lifecycles, keyed by name.
pub struct RuleRegistry<T: StatefulObject, E: Event> {
    lifecycles: HashMap<String, Lifecycle<T, E>>,
}

impl<T: StatefulObject, E: Event> RuleRegistry<T, E> {
    pub fn builder() -> RegistryBuilder<T, E> {
        RegistryBuilder::new()
    }

    /// Find the single rule for the entity's current state and `event`.
    ///
    /// Lookup has no side effects; calling it repeatedly with the same
    /// inputs yields the same rule or the same error.
    pub fn resolve(&self, entity: &T, event: &E) -> Result<&Rule<T, E>, ResolveError> {
        if event.is_blank() {
            return Err(ResolveError::NullArgument { argument: "event" });
        }

        let name = entity.lifecycle_name();
        let lifecycle = self
            .lifecycles
            .get(name)
            .filter(|_| !name.trim().is_empty())
            .ok_or_else(|| {
                tracing::error!(lifecycle = name, "lifecycle not found");
                ResolveError::LifecycleNotFound {
                    lifecycle: name.to_string(),
                }
            })?;

        let state = entity.state();
        let candidates = lifecycle.candidates(state, event);
        match candidates.as_slice() {
            [rule] => {
                tracing::debug!(lifecycle = name, rule = %rule, "resolved rule");
                Ok(*rule)
            }
            [] => {
                let entity_id = format!("{:?}", entity.id());
                tracing::error!(
                    lifecycle = name,
                    state = state.name(),
                    event = event.name(),
                    entity_id = %entity_id,
                    "no transition found"
                );
                Err(ResolveError::TransitionNotFound {
                    lifecycle: name.to_string(),
                    state: state.name().to_string(),
                    event: event.name().to_string(),
                    entity_id,
                })
            }
            many => {
                tracing::error!(
                    lifecycle = name,
                    state = state.name(),
                    event = event.name(),
                    matches = many.len(),
                    "ambiguous transition"
                );
                Err(ResolveError::AmbiguousTransition {
                    lifecycle: name.to_string(),
                    state: state.name().to_string(),
                    event: event.name().to_string(),
                    rules: many.iter().map(|rule| rule.to_string()).collect(),
                })
            }
        }
    }

    pub fn lifecycle(&self, name: &str) -> Option<&Lifecycle<T, E>> {
        self.lifecycles.get(name)
    }

    /// Names of every registered lifecycle, sorted.
    pub fn lifecycle_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lifecycles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Rules of the named lifecycle in declaration order, if it exists.
    pub fn rules(&self, lifecycle: &str) -> Option<&[Rule<T, E>]> {
        self.lifecycles.get(lifecycle).map(Lifecycle::rules)
    }

    /// Every `(source_state, event)` pair that would fail resolution as
    /// ambiguous, across all lifecycles.
    ///
    /// Building never rejects such pairs. Hosts that want a start-up check
    /// can assert this is empty.
    pub fn ambiguities(&self) -> Vec<Ambiguity<T::State, E>> {
        let mut names: Vec<&String> = self.lifecycles.keys().collect();
        names.sort_unstable();
        names
            .into_iter()
            .flat_map(|name| self.lifecycles[name].ambiguities())
            .collect()
    }
}

impl<T: StatefulObject, E: Event> fmt::Debug for RuleRegistry<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("lifecycles", &self.lifecycle_names())
            .finish()
    }
}

/// Collects lifecycle configurations and builds a [`RuleRegistry`].
pub struct RegistryBuilder<T: StatefulObject, E: Event> {
    configurations: Vec<Box<dyn LifecycleConfiguration<T, E>>>,
    initializer: Box<dyn LifecyclesInitializer<T, E>>,
}

impl<T: StatefulObject, E: Event> RegistryBuilder<T, E> {
    pub fn new() -> Self {
        Self {
            configurations: Vec::new(),
            initializer: Box::new(CodeConfigInitializer),
        }
    }

    pub fn configuration<C>(mut self, configuration: C) -> Self
    where
        C: LifecycleConfiguration<T, E> + 'static,
    {
        self.configurations.push(Box::new(configuration));
        self
    }

    pub fn configurations<I>(mut self, configurations: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn LifecycleConfiguration<T, E>>>,
    {
        self.configurations.extend(configurations);
        self
    }

    /// Replace the default [`CodeConfigInitializer`].
    pub fn initializer<I>(mut self, initializer: I) -> Self
    where
        I: LifecyclesInitializer<T, E> + 'static,
    {
        self.initializer = Box::new(initializer);
        self
    }

    pub fn build(self) -> Result<RuleRegistry<T, E>, BuildError> {
        let lifecycles = self.initializer.initialize(&self.configurations)?;
        tracing::debug!(
            configurations = self.configurations.len(),
            lifecycles = lifecycles.len(),
            "rule registry built"
        );
        Ok(RuleRegistry { lifecycles })
    }
}

impl<T: StatefulObject, E: Event> Default for RegistryBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RuleBuilder;
    use crate::{event_enum, state_enum};

    state_enum! {
        enum Phase {
            Draft,
            Review,
            Published,
            Archived,
        }
        final: [Archived]
    }

    event_enum! {
        enum Command {
            Submit,
            Approve,
            Publish,
        }
    }

    struct Article {
        id: u32,
        lifecycle: String,
        phase: Phase,
    }

    impl Article {
        fn new(phase: Phase) -> Self {
            Self {
                id: 7,
                lifecycle: "article".to_string(),
                phase,
            }
        }
    }

    impl StatefulObject for Article {
        type State = Phase;
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn state(&self) -> &Phase {
            &self.phase
        }

        fn set_state(&mut self, state: Phase) {
            self.phase = state;
        }

        fn lifecycle_name(&self) -> &str {
            &self.lifecycle
        }
    }

    struct Editorial;

    impl LifecycleConfiguration<Article, Command> for Editorial {
        fn lifecycle_name(&self) -> Option<&str> {
            Some("article")
        }

        fn configure(&self, rules: &mut RuleBuilder<Article, Command>) -> Result<(), BuildError> {
            rules
                .begin()
                .source_state(Phase::Draft)?
                .event(Command::Submit)?
                .target_state(Phase::Review)?;
            rules
                .begin()
                .source_state(Phase::Review)?
                .event(Command::Approve)?
                .target_state(Phase::Published)?;
            rules
                .begin()
                .source_state(Phase::Review)?
                .event(Command::Approve)?
                .target_state(Phase::Archived)?;
            Ok(())
        }
    }

    fn registry() -> RuleRegistry<Article, Command> {
        RuleRegistry::builder().configuration(Editorial).build().unwrap()
    }

    #[test]
    fn resolves_unique_rule() {
        let registry = registry();
        let article = Article::new(Phase::Draft);

        let rule = registry.resolve(&article, &Command::Submit).unwrap();
        assert_eq!(rule.target_state(), &Phase::Review);
    }

    #[test]
    fn unknown_lifecycle_is_reported() {
        let registry = registry();
        let mut article = Article::new(Phase::Draft);
        article.lifecycle = "blog".to_string();

        let err = registry.resolve(&article, &Command::Submit).unwrap_err();
        assert_eq!(
            err,
            ResolveError::LifecycleNotFound {
                lifecycle: "blog".to_string()
            }
        );
        assert_eq!(err.error_code(), "LIFECYCLE_NOT_FOUND");
    }

    #[test]
    fn blank_lifecycle_is_not_found() {
        let registry = registry();
        let mut article = Article::new(Phase::Draft);
        article.lifecycle = " ".to_string();

        let err = registry.resolve(&article, &Command::Submit).unwrap_err();
        assert!(matches!(err, ResolveError::LifecycleNotFound { .. }));
    }

    #[test]
    fn missing_transition_names_state_and_event() {
        let registry = registry();
        let article = Article::new(Phase::Draft);

        let err = registry.resolve(&article, &Command::Publish).unwrap_err();
        match err {
            ResolveError::TransitionNotFound {
                lifecycle,
                state,
                event,
                entity_id,
            } => {
                assert_eq!(lifecycle, "article");
                assert_eq!(state, "Draft");
                assert_eq!(event, "Publish");
                assert_eq!(entity_id, "7");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_keys_are_ambiguous() {
        let registry = registry();
        let article = Article::new(Phase::Review);

        let err = registry.resolve(&article, &Command::Approve).unwrap_err();
        match err {
            ResolveError::AmbiguousTransition { rules, .. } => assert_eq!(rules.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(registry.ambiguities().len(), 1);
    }

    #[test]
    fn blank_event_is_rejected() {
        struct Note {
            state: String,
        }

        impl StatefulObject for Note {
            type State = String;
            type Id = ();

            fn id(&self) {}
            fn state(&self) -> &String {
                &self.state
            }
            fn set_state(&mut self, state: String) {
                self.state = state;
            }
            fn lifecycle_name(&self) -> &str {
                "note"
            }
        }

        struct NoteRules;

        impl LifecycleConfiguration<Note, String> for NoteRules {
            fn lifecycle_name(&self) -> Option<&str> {
                Some("note")
            }

            fn configure(&self, rules: &mut RuleBuilder<Note, String>) -> Result<(), BuildError> {
                rules
                    .begin()
                    .source_state("open".to_string())?
                    .event("close".to_string())?
                    .target_state("closed".to_string())?;
                Ok(())
            }
        }

        let registry = RuleRegistry::builder().configuration(NoteRules).build().unwrap();
        let note = Note {
            state: "open".to_string(),
        };

        let err = registry.resolve(&note, &"".to_string()).unwrap_err();
        assert_eq!(err, ResolveError::NullArgument { argument: "event" });
    }

    #[test]
    fn empty_builder_fails() {
        let result = RuleRegistry::<Article, Command>::builder().build();
        assert!(matches!(
            result,
            Err(BuildError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn introspection_lists_lifecycles_and_rules() {
        let registry = registry();

        assert_eq!(registry.lifecycle_names(), vec!["article"]);
        assert_eq!(registry.rules("article").map(<[_]>::len), Some(3));
        assert!(registry.rules("blog").is_none());
        assert_eq!(registry.lifecycle("article").unwrap().name(), "article");
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<RuleRegistry<Article, Command>>();
    }
}
