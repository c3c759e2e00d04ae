//! The entity contract implemented by host types.

use super::state::State;
use std::fmt::Debug;

/// An entity whose lifecycle is managed by a [`LifecycleManager`].
///
/// The host owns construction, identity and persistence of the entity. The
/// engine only reads its state and lifecycle name, and writes the state back
/// after a successful transition.
///
/// [`LifecycleManager`]: crate::engine::LifecycleManager
///
/// # Example
///
/// ```rust
/// use statekeeper::core::StatefulObject;
///
/// struct Ticket {
///     id: Option<u64>,
///     state: String,
/// }
///
/// impl StatefulObject for Ticket {
///     type State = String;
///     type Id = Option<u64>;
///
///     fn id(&self) -> Option<u64> {
///         self.id
///     }
///
///     fn state(&self) -> &String {
///         &self.state
///     }
///
///     fn set_state(&mut self, state: String) {
///         self.state = state;
///     }
///
///     fn lifecycle_name(&self) -> &str {
///         "ticket"
///     }
/// }
/// ```
pub trait StatefulObject {
    /// Type of the entity's state.
    type State: State;

    /// Type of the entity's identifier, used for diagnostics only.
    ///
    /// Errors and transition records carry its `Debug` rendering.
    type Id: Debug;

    /// Returns the entity's identifier.
    fn id(&self) -> Self::Id;

    /// Returns the entity's current state.
    fn state(&self) -> &Self::State;

    /// Sets the entity's state.
    ///
    /// Only the lifecycle manager should call this, and only after every guard
    /// and action of the matched rule succeeded.
    fn set_state(&mut self, state: Self::State);

    /// Name of the lifecycle that governs this entity.
    fn lifecycle_name(&self) -> &str;
}
