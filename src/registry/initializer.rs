//! Turning lifecycle configurations into indexed lifecycles.

use super::lifecycle::Lifecycle;
use crate::builder::{BuildError, RuleBuilder};
use crate::core::{Event, StatefulObject};
use std::any::type_name;
use std::collections::HashMap;

/// Declares the rules of one lifecycle.
///
/// Implemented by the host application. The registry calls
/// [`configure`](Self::configure) exactly once per configuration object, with
/// a fresh [`RuleBuilder`].
pub trait LifecycleConfiguration<T: StatefulObject, E: Event> {
    /// Name of the lifecycle these rules belong to.
    ///
    /// When `None` or blank, the lifecycle is registered under
    /// [`configuration_name`](Self::configuration_name).
    fn lifecycle_name(&self) -> Option<&str> {
        None
    }

    /// Declare every rule of the lifecycle.
    fn configure(&self, rules: &mut RuleBuilder<T, E>) -> Result<(), BuildError>;

    /// Type name of the configuration, the fallback lifecycle name.
    fn configuration_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Strategy that builds the lifecycles of a registry from configurations.
pub trait LifecyclesInitializer<T: StatefulObject, E: Event> {
    fn initialize(
        &self,
        configurations: &[Box<dyn LifecycleConfiguration<T, E>>],
    ) -> Result<HashMap<String, Lifecycle<T, E>>, BuildError>;
}

/// Default initializer for code-based configurations.
///
/// Configurations that resolve to the same lifecycle name contribute their
/// rules to one lifecycle, in configuration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeConfigInitializer;

impl<T: StatefulObject, E: Event> LifecyclesInitializer<T, E> for CodeConfigInitializer {
    fn initialize(
        &self,
        configurations: &[Box<dyn LifecycleConfiguration<T, E>>],
    ) -> Result<HashMap<String, Lifecycle<T, E>>, BuildError> {
        if configurations.is_empty() {
            return Err(BuildError::InvalidConfiguration {
                reason: "configurations must not be empty".to_string(),
            });
        }

        let mut lifecycles: HashMap<String, Lifecycle<T, E>> = HashMap::new();
        for configuration in configurations {
            let mut builder = RuleBuilder::new();
            configuration.configure(&mut builder)?;
            let rules = builder.build()?;

            let name = configuration
                .lifecycle_name()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| configuration.configuration_name())
                .to_string();

            tracing::debug!(
                lifecycle = %name,
                configuration = configuration.configuration_name(),
                rules = rules.len(),
                "configured lifecycle"
            );

            match lifecycles.get_mut(&name) {
                Some(lifecycle) => lifecycle.extend(rules),
                None => {
                    lifecycles.insert(name.clone(), Lifecycle::new(name, rules));
                }
            }
        }

        Ok(lifecycles)
    }
}
