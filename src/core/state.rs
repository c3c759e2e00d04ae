//! State and event traits.
//!
//! Rules are matched by value equality of the entity's current state and the
//! incoming event, so both traits require `Eq + Hash`. They also require serde
//! so that transition records can be serialized by the host.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for lifecycle states.
///
/// # Required Traits
///
/// - `Clone`: states are copied into rules, contexts and results
/// - `Eq` + `Hash`: states are part of the rule lookup key
/// - `Debug`: states are debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states appear in transition records
///
/// # Example
///
/// ```rust
/// use statekeeper::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum OrderState {
///     Init,
///     New,
///     Paid,
///     Delivered,
/// }
///
/// impl State for OrderState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Init => "Init",
///             Self::New => "New",
///             Self::Paid => "Paid",
///             Self::Delivered => "Delivered",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Delivered)
///     }
/// }
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Purely informational: the engine never refuses to resolve rules out
    /// of a final state. Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Whether this value counts as "not provided".
    ///
    /// Enum states are never blank. String states are blank when empty or
    /// whitespace-only. The builder rejects blank values.
    fn is_blank(&self) -> bool {
        false
    }
}

/// Trait for events that trigger transitions.
pub trait Event:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the event's name for display/logging.
    fn name(&self) -> &str;

    /// Whether this value counts as "not provided".
    ///
    /// A blank event is rejected both by the builder and at execution time.
    fn is_blank(&self) -> bool {
        false
    }
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Event for String {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}
