//! Per-execution context shared by guards and actions.

use super::entity::StatefulObject;
use super::state::Event;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while reading context variables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("incorrect type requested for variable '{key}': expected {expected}, actual {actual}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
}

struct Slot {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Heterogeneous key/value bag carried through one execution.
///
/// Values of any `'static + Send + Sync` type may be stored. Reads name the
/// expected type and fail with [`ContextError::TypeMismatch`] when the stored
/// value has a different runtime type.
#[derive(Default)]
pub struct Variables {
    slots: HashMap<String, Slot>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when preparing variables for `execute`.
    pub fn with<V>(mut self, key: impl Into<String>, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        self.set(key, value);
        self
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<V>(&mut self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.slots.insert(key.into(), Slot::new(value));
    }

    /// Stores `value` only if `key` is not present yet.
    ///
    /// Returns `true` when the value was stored.
    pub fn set_if_absent<V>(&mut self, key: impl Into<String>, value: V) -> bool
    where
        V: Any + Send + Sync,
    {
        let key = key.into();
        if self.slots.contains_key(&key) {
            return false;
        }
        self.slots.insert(key, Slot::new(value));
        true
    }

    /// Reads the value stored under `key` as a `V`.
    ///
    /// Returns `Ok(None)` for an absent key.
    pub fn get<V: Any>(&self, key: &str) -> Result<Option<&V>, ContextError> {
        let Some(slot) = self.slots.get(key) else {
            return Ok(None);
        };
        match slot.value.downcast_ref::<V>() {
            Some(value) => Ok(Some(value)),
            None => Err(ContextError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<V>(),
                actual: slot.type_name,
            }),
        }
    }

    pub fn get_mut<V: Any>(&mut self, key: &str) -> Result<Option<&mut V>, ContextError> {
        let Some(slot) = self.slots.get_mut(key) else {
            return Ok(None);
        };
        let actual = slot.type_name;
        match slot.value.downcast_mut::<V>() {
            Some(value) => Ok(Some(value)),
            None => Err(ContextError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<V>(),
                actual,
            }),
        }
    }

    /// Removes and returns the value under `key`, if its type matches.
    pub fn remove<V: Any>(&mut self, key: &str) -> Result<Option<V>, ContextError> {
        self.get::<V>(key)?;
        Ok(self
            .slots
            .remove(key)
            .and_then(|slot| slot.value.downcast::<V>().ok())
            .map(|boxed| *boxed))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Slot {
    fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<V>(),
        }
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(k, slot)| (k, slot.type_name)))
            .finish()
    }
}

/// Context of one transition execution.
///
/// Created fresh by the lifecycle manager for every `execute` call and shared
/// by every guard and action of the matched rule. After execution it is
/// handed back to the caller inside the [`TransitionResult`].
///
/// [`TransitionResult`]: crate::engine::TransitionResult
pub struct StateContext<'a, T: StatefulObject, E: Event> {
    entity: &'a mut T,
    event: E,
    variables: Variables,
}

impl<'a, T: StatefulObject, E: Event> StateContext<'a, T, E> {
    pub fn new(entity: &'a mut T, event: E, variables: Variables) -> Self {
        Self {
            entity,
            event,
            variables,
        }
    }

    pub fn entity(&self) -> &T {
        self.entity
    }

    /// Mutable access to the entity for actions.
    ///
    /// Actions must not change the entity's state directly; the manager
    /// commits the target state once every action has succeeded.
    pub fn entity_mut(&mut self) -> &mut T {
        self.entity
    }

    pub fn event(&self) -> &E {
        &self.event
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// Shorthand for `variables().get::<V>(key)`.
    pub fn variable<V: Any>(&self, key: &str) -> Result<Option<&V>, ContextError> {
        self.variables.get(key)
    }

    pub fn set_variable<V>(&mut self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.variables.set(key, value);
    }

    pub fn set_variable_if_absent<V>(&mut self, key: impl Into<String>, value: V) -> bool
    where
        V: Any + Send + Sync,
    {
        self.variables.set_if_absent(key, value)
    }

    /// Consumes the context, releasing the entity borrow.
    pub fn into_variables(self) -> Variables {
        self.variables
    }
}

impl<T, E> fmt::Debug for StateContext<'_, T, E>
where
    T: StatefulObject,
    E: Event,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContext")
            .field("entity_id", &self.entity.id())
            .field("event", &self.event)
            .field("variables", &self.variables)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doc {
        state: String,
    }

    impl StatefulObject for Doc {
        type State = String;
        type Id = &'static str;

        fn id(&self) -> &'static str {
            "doc-1"
        }

        fn state(&self) -> &String {
            &self.state
        }

        fn set_state(&mut self, state: String) {
            self.state = state;
        }

        fn lifecycle_name(&self) -> &str {
            "doc"
        }
    }

    #[test]
    fn set_overwrites_and_get_reads_back() {
        let mut vars = Variables::new();
        vars.set("k", "v".to_string());
        vars.set("k", "w".to_string());

        assert_eq!(vars.get::<String>("k").unwrap(), Some(&"w".to_string()));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn set_if_absent_keeps_existing_value() {
        let mut vars = Variables::new().with("error", "from action".to_string());

        assert!(!vars.set_if_absent("error", "from manager".to_string()));
        assert!(vars.set_if_absent("other", 1_u32));
        assert_eq!(
            vars.get::<String>("error").unwrap().map(String::as_str),
            Some("from action")
        );
    }

    #[test]
    fn absent_key_reads_as_none() {
        let vars = Variables::new();
        assert_eq!(vars.get::<String>("missing").unwrap(), None);
    }

    #[test]
    fn wrong_type_is_reported() {
        let vars = Variables::new().with("amount", 10.5_f64);

        let err = vars.get::<String>("amount").unwrap_err();
        match err {
            ContextError::TypeMismatch {
                key,
                expected,
                actual,
            } => {
                assert_eq!(key, "amount");
                assert_eq!(expected, type_name::<String>());
                assert_eq!(actual, "f64");
            }
        }
    }

    #[test]
    fn remove_checks_type_before_removing() {
        let mut vars = Variables::new().with("n", 3_i32);

        assert!(vars.remove::<String>("n").is_err());
        assert!(vars.contains_key("n"));
        assert_eq!(vars.remove::<i32>("n").unwrap(), Some(3));
        assert!(vars.is_empty());
    }

    #[test]
    fn get_mut_allows_in_place_updates() {
        let mut vars = Variables::new().with("order", Vec::<&'static str>::new());

        vars.get_mut::<Vec<&'static str>>("order")
            .unwrap()
            .unwrap()
            .push("first");

        assert_eq!(
            vars.get::<Vec<&'static str>>("order").unwrap().unwrap(),
            &vec!["first"]
        );
    }

    #[test]
    fn context_exposes_entity_event_and_variables() {
        let mut doc = Doc {
            state: "draft".to_string(),
        };
        let mut ctx = StateContext::new(
            &mut doc,
            "publish".to_string(),
            Variables::new().with("k", "v".to_string()),
        );

        assert_eq!(ctx.entity().state(), "draft");
        assert_eq!(ctx.event(), "publish");
        ctx.set_variable("written", true);
        assert_eq!(ctx.variable::<bool>("written").unwrap(), Some(&true));

        let vars = ctx.into_variables();
        assert_eq!(vars.len(), 2);
        assert_eq!(doc.state, "draft");
    }
}
