//! Build errors for the rule builder and the registry builder.

use std::fmt;
use thiserror::Error;

/// A rule that was declared without all of its mandatory attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefect {
    /// Zero-based position of the rule in declaration order.
    pub position: usize,
    /// The rule as declared, with `?` for missing attributes.
    pub rule: String,
    /// Names of the missing attributes.
    pub missing: Vec<&'static str>,
}

impl fmt::Display for RuleDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule #{} ({}) is missing {}",
            self.position,
            self.rule,
            self.missing.join(", ")
        )
    }
}

/// Errors that can occur when declaring rules and building a registry.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Bad usage of the rule builder: .{operation}() called before .begin()")]
    ConfigurationSequence { operation: &'static str },

    #[error("{argument} must not be null or blank")]
    NullArgument { argument: &'static str },

    #[error("Rules must have a source state, target state and event: {}", join_defects(.defects))]
    MalformedRule { defects: Vec<RuleDefect> },

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

fn join_defects(defects: &[RuleDefect]) -> String {
    defects
        .iter()
        .map(RuleDefect::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
