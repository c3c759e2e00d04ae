//! Rule execution and the lifecycle manager.

pub mod config;
pub mod manager;
pub mod result;
pub mod rule;

pub use config::{ConfigError, ManagerConfig};
pub use manager::LifecycleManager;
pub use result::{TransitionFailure, TransitionResult};
pub use rule::Rule;
