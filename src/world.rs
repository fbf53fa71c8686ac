//! The process wide entry points.
//!
//! A [`World`] bundles the state shared groups live in: the template registry
//! and the configuration rules. Suites that want isolated state build their
//! own `World` and create their groups with
//! [`ExampleGroup::describe_in`]. Everything else goes through the global
//! world returned by [`world()`], which also backs the free functions
//! [`shared_examples_for`], [`share_examples_for`] and [`share_as`].
//!
//! The lifecycle is: register while the suite is defined, [`World::freeze`]
//! once definition is done, [`World::reset`] before an independent run.

use std::sync::{Arc, LazyLock};

use crate::{
    config::Configuration,
    error::SharedError,
    group::{ExampleGroup, GroupHost},
    key::{KeyArgs, ResolvedKey, resolve, resolve_direct},
    module::SharedModule,
    registry::SharedRegistry,
    template::Template,
};

pub struct World<G = ExampleGroup> {
    shared_example_groups: SharedRegistry<G>,
    configuration: Configuration<G>,
}

impl<G> Default for World<G> {
    fn default() -> Self {
        Self {
            shared_example_groups: SharedRegistry::default(),
            configuration: Configuration::default(),
        }
    }
}

impl<G: GroupHost> World<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared_example_groups(&self) -> &SharedRegistry<G> {
        &self.shared_example_groups
    }

    pub fn configuration(&self) -> &Configuration<G> {
        &self.configuration
    }

    /// Register `template` under the shared group key `key`.
    ///
    /// Label and type keys go into the registry. Tagged keys are appended to
    /// the configuration as an extension rule instead.
    ///
    /// After [`freeze`](Self::freeze) both paths fail with
    /// [`SharedError::RegistryFrozen`].
    pub fn shared_examples_for(
        &self,
        key: impl Into<KeyArgs>,
        template: Template<G>,
    ) -> Result<(), SharedError> {
        match resolve(&key.into())? {
            ResolvedKey::Direct(key) => {
                self.shared_example_groups.register(key, template)?;
            }
            ResolvedKey::Tagged { label, tags } => {
                if self.shared_example_groups.is_frozen() {
                    return Err(SharedError::RegistryFrozen {
                        label: match label.is_empty() {
                            true => tags.to_string(),
                            false => label.into_owned(),
                        },
                    });
                }
                self.configuration
                    .extend_with_template(label, tags, template);
            }
        }
        Ok(())
    }

    /// Same as [`shared_examples_for`](Self::shared_examples_for).
    pub fn share_examples_for(
        &self,
        key: impl Into<KeyArgs>,
        template: Template<G>,
    ) -> Result<(), SharedError> {
        self.shared_examples_for(key, template)
    }

    /// Register `template` under `key` and return it as an includable module.
    pub fn share_as(
        &self,
        key: impl Into<KeyArgs>,
        template: Template<G>,
    ) -> Result<SharedModule<G>, SharedError> {
        let key = resolve_direct(&key.into())?;
        let template = self.shared_example_groups.register(key.clone(), template)?;
        Ok(SharedModule::new(Some(key), template))
    }

    /// End the definition phase, see [`SharedRegistry::freeze`].
    pub fn freeze(&self) {
        self.shared_example_groups.freeze();
    }

    /// Forget every registration and configuration rule.
    pub fn reset(&self) {
        self.shared_example_groups.clear();
        self.configuration.clear();
    }
}

static WORLD: LazyLock<Arc<World>> = LazyLock::new(|| Arc::new(World::new()));

/// The global world.
pub fn world() -> &'static Arc<World> {
    &WORLD
}

/// Register a shared example group in the global world.
pub fn shared_examples_for(key: impl Into<KeyArgs>, template: Template) -> Result<(), SharedError> {
    world().shared_examples_for(key, template)
}

/// Same as [`shared_examples_for`].
pub fn share_examples_for(key: impl Into<KeyArgs>, template: Template) -> Result<(), SharedError> {
    world().share_examples_for(key, template)
}

/// Register a shared example group in the global world and return it as an
/// includable module.
pub fn share_as(key: impl Into<KeyArgs>, template: Template) -> Result<SharedModule, SharedError> {
    world().share_as(key, template)
}
