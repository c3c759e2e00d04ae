//! A named, indexed set of rules.

use crate::core::{Event, StatefulObject};
use crate::engine::Rule;
use std::collections::HashMap;
use std::fmt;

/// Two or more rules of one lifecycle keyed by the same source state and
/// event. Resolving that pair fails with an ambiguity error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity<S, E> {
    pub lifecycle: String,
    pub source_state: S,
    pub event: E,
    /// Rendered conflicting rules, in declaration order.
    pub rules: Vec<String>,
}

/// The rules of one lifecycle, indexed by `(source_state, event)`.
pub struct Lifecycle<T: StatefulObject, E: Event> {
    name: String,
    rules: Vec<Rule<T, E>>,
    /// (source_state, event) -> positions in `rules`, in declaration order.
    index: HashMap<(T::State, E), Vec<usize>>,
}

impl<T: StatefulObject, E: Event> Lifecycle<T, E> {
    pub fn new(name: impl Into<String>, rules: Vec<Rule<T, E>>) -> Self {
        let mut index: HashMap<(T::State, E), Vec<usize>> = HashMap::new();
        for (position, rule) in rules.iter().enumerate() {
            index
                .entry((rule.source_state().clone(), rule.event().clone()))
                .or_default()
                .push(position);
        }

        Self {
            name: name.into(),
            rules,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule<T, E>] {
        &self.rules
    }

    /// Rules keyed by `(state, event)`, in declaration order.
    pub fn candidates(&self, state: &T::State, event: &E) -> Vec<&Rule<T, E>> {
        self.index
            .get(&(state.clone(), event.clone()))
            .map(|positions| positions.iter().map(|&i| &self.rules[i]).collect())
            .unwrap_or_default()
    }

    /// Every `(source_state, event)` pair declared by more than one rule.
    pub fn ambiguities(&self) -> Vec<Ambiguity<T::State, E>> {
        let mut found: Vec<Ambiguity<T::State, E>> = self
            .index
            .iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|((state, event), positions)| Ambiguity {
                lifecycle: self.name.clone(),
                source_state: state.clone(),
                event: event.clone(),
                rules: positions.iter().map(|&i| self.rules[i].to_string()).collect(),
            })
            .collect();
        found.sort_by(|a, b| a.rules.cmp(&b.rules));
        found
    }

    /// Merge another rule set into this lifecycle.
    pub(crate) fn extend(&mut self, rules: Vec<Rule<T, E>>) {
        for rule in rules {
            let position = self.rules.len();
            self.index
                .entry((rule.source_state().clone(), rule.event().clone()))
                .or_default()
                .push(position);
            self.rules.push(rule);
        }
    }
}

impl<T: StatefulObject, E: Event> fmt::Debug for Lifecycle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .finish()
    }
}
