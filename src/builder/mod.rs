//! Builder API for declaring lifecycle rules.
//!
//! This module provides the sequential [`RuleBuilder`] used by lifecycle
//! configurations, the errors it raises, and macros for declaring state and
//! event enums with minimal boilerplate.

pub mod error;
pub mod macros;
pub mod rule;

pub use error::{BuildError, RuleDefect};
pub use rule::RuleBuilder;
