//! Statekeeper: an embeddable lifecycle engine
//!
//! Statekeeper drives host-owned entities through declared lifecycles. A
//! lifecycle is a set of rules `(source_state, event) -> target_state`, each
//! with guards that decide whether the rule may fire and ordered actions that
//! run when it does. The entity's state changes only after every guard passed
//! and every action completed.
//!
//! # Core Concepts
//!
//! - **State / Event**: value types implementing the `State` and `Event` traits
//! - **StatefulObject**: the host entity whose state is managed
//! - **Rule**: source state, event, target state, guards and actions
//! - **RuleRegistry**: lifecycles built once from configurations, used to
//!   resolve the single rule for an entity and event
//! - **LifecycleManager**: the entry point that executes events
//!
//! # Example
//!
//! ```rust
//! use statekeeper::builder::{BuildError, RuleBuilder};
//! use statekeeper::core::{StatefulObject, Variables};
//! use statekeeper::engine::LifecycleManager;
//! use statekeeper::registry::{LifecycleConfiguration, RuleRegistry};
//! use statekeeper::{event_enum, state_enum};
//! use std::sync::Arc;
//!
//! state_enum! {
//!     pub enum TaskState {
//!         Open,
//!         Done,
//!     }
//!     final: [Done]
//! }
//!
//! event_enum! {
//!     pub enum TaskEvent {
//!         Complete,
//!     }
//! }
//!
//! struct Task {
//!     state: TaskState,
//! }
//!
//! impl StatefulObject for Task {
//!     type State = TaskState;
//!     type Id = ();
//!
//!     fn id(&self) {}
//!     fn state(&self) -> &TaskState {
//!         &self.state
//!     }
//!     fn set_state(&mut self, state: TaskState) {
//!         self.state = state;
//!     }
//!     fn lifecycle_name(&self) -> &str {
//!         "task"
//!     }
//! }
//!
//! struct TaskLifecycle;
//!
//! impl LifecycleConfiguration<Task, TaskEvent> for TaskLifecycle {
//!     fn lifecycle_name(&self) -> Option<&str> {
//!         Some("task")
//!     }
//!
//!     fn configure(&self, rules: &mut RuleBuilder<Task, TaskEvent>) -> Result<(), BuildError> {
//!         rules
//!             .begin()
//!             .source_state(TaskState::Open)?
//!             .event(TaskEvent::Complete)?
//!             .target_state(TaskState::Done)?
//!             .when(|ctx| ctx.variable::<String>("assignee").ok().flatten().is_some())?;
//!         Ok(())
//!     }
//! }
//!
//! let registry = RuleRegistry::builder().configuration(TaskLifecycle).build().unwrap();
//! let manager = LifecycleManager::new(Arc::new(registry));
//!
//! let mut task = Task { state: TaskState::Open };
//! let variables = Variables::new().with("assignee", "ana".to_string());
//! let result = manager
//!     .execute_with(&mut task, TaskEvent::Complete, variables)
//!     .unwrap();
//! assert!(result.succeeded());
//! drop(result);
//! assert_eq!(task.state, TaskState::Done);
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod record;
pub mod registry;

// Re-export commonly used types
pub use builder::{BuildError, RuleBuilder};
pub use core::{Action, Event, Guard, State, StateContext, StatefulObject, Variables};
pub use engine::{LifecycleManager, ManagerConfig, Rule, TransitionFailure, TransitionResult};
pub use record::{Outcome, TransitionRecord};
pub use registry::{LifecycleConfiguration, ResolveError, RuleRegistry};
