//! Global configuration rules.
//!
//! A shared group registered under tags does not go into the registry. It is
//! wrapped as a [`SharedModule`] and appended to the configuration as an
//! [`InclusionMode::Extend`] rule, to be applied by the surrounding framework
//! to every group whose tags match. Matching rules against groups is up to
//! that framework; the configuration only keeps the rules in order.

use std::{borrow::Cow, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;

use crate::{group::ExampleGroup, key::Tags, module::SharedModule, template::Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InclusionMode {
    Include,
    Extend,
}

#[non_exhaustive]
pub struct ConfigRule<G = ExampleGroup> {
    pub mode: InclusionMode,
    pub unit: SharedModule<G>,
    pub tags: Tags,
}

impl<G> Clone for ConfigRule<G> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            unit: self.unit.clone(),
            tags: self.tags.clone(),
        }
    }
}

impl<G> std::fmt::Debug for ConfigRule<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRule")
            .field("mode", &self.mode)
            .field("unit", &self.unit)
            .field("tags", &self.tags)
            .finish()
    }
}

pub struct Configuration<G = ExampleGroup> {
    include_or_extend_modules: RwLock<Vec<ConfigRule<G>>>,
}

impl<G> Default for Configuration<G> {
    fn default() -> Self {
        Self {
            include_or_extend_modules: RwLock::new(Vec::new()),
        }
    }
}

impl<G: crate::group::GroupHost> Configuration<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_rule(&self, mode: InclusionMode, unit: SharedModule<G>, tags: Tags) {
        debug!(?mode, %tags, "appending configuration rule");
        self.include_or_extend_modules
            .write()
            .push(ConfigRule { mode, unit, tags });
    }

    /// Include `unit` into every group matching `tags`.
    pub fn include(&self, unit: SharedModule<G>, tags: Tags) {
        self.append_rule(InclusionMode::Include, unit, tags);
    }

    /// Extend every group matching `tags` with `unit`.
    pub fn extend(&self, unit: SharedModule<G>, tags: Tags) {
        self.append_rule(InclusionMode::Extend, unit, tags);
    }

    /// Register a tagged shared group as an extension rule.
    pub(crate) fn extend_with_template(
        &self,
        label: Cow<'static, str>,
        tags: Tags,
        template: Template<G>,
    ) {
        debug!(%label, "routing tagged shared example group to the configuration");
        self.extend(SharedModule::new(None, Arc::new(template)), tags);
    }

    /// A snapshot of the rules in the order they were appended.
    pub fn include_or_extend_modules(&self) -> Vec<ConfigRule<G>> {
        self.include_or_extend_modules.read().clone()
    }

    pub fn clear(&self) {
        self.include_or_extend_modules.write().clear();
    }
}

impl<G> std::fmt::Debug for Configuration<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field(
                "include_or_extend_modules",
                &*self.include_or_extend_modules.read(),
            )
            .finish()
    }
}
