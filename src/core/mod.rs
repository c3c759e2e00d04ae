//! Core lifecycle types.
//!
//! This module contains the building blocks shared by the builder, the
//! registry and the engine:
//! - State and event definitions via the `State` and `Event` traits
//! - The `StatefulObject` contract implemented by host entities
//! - Guard predicates and side-effecting actions
//! - The per-execution `StateContext` and its `Variables` bag

mod action;
mod context;
mod entity;
mod guard;
mod state;

pub use action::{Action, BoxError};
pub use context::{ContextError, StateContext, Variables};
pub use entity::StatefulObject;
pub use guard::Guard;
pub use state::{Event, State};
