use std::{borrow::Cow, fmt::Debug, sync::Arc};

use tracing::debug;

use crate::{
    compose::evaluate,
    error::SharedError,
    group::{ExampleGroup, GroupHost, Metadata},
    key::TemplateKey,
    template::{Args, Template},
    whatever::boxed,
};

/// A shared group wrapped as a unit that can be included into or extended
/// onto a group.
///
/// Including creates an anonymous child group tagged with the originating
/// key as [`Metadata::SHARED_GROUP_NAME`] and evaluates the template there.
/// Extending evaluates the template on the group itself. Neither path takes
/// arguments or a caller block.
pub struct SharedModule<G = ExampleGroup> {
    name: Option<TemplateKey>,
    template: Arc<Template<G>>,
}

impl<G: GroupHost> SharedModule<G> {
    pub(crate) fn new(name: Option<TemplateKey>, template: Arc<Template<G>>) -> Self {
        Self { name, template }
    }

    /// The key the module was shared as, `None` for configuration units.
    pub fn name(&self) -> Option<&TemplateKey> {
        self.name.as_ref()
    }

    pub fn template(&self) -> &Template<G> {
        &self.template
    }

    /// Attach the module to `group` as an anonymous child group.
    pub fn included<'g>(&self, group: &'g mut G) -> Result<&'g mut G, SharedError> {
        debug!(name = ?self.name, "including shared module");
        let child = group.create_child(Cow::Borrowed(""));
        if let Some(name) = &self.name {
            child.set_metadata(Metadata::SHARED_GROUP_NAME.into(), boxed(name.clone()));
        }
        evaluate(child, &self.template, Args::bind(self.template.params(), Vec::new()))?;
        Ok(child)
    }

    /// Evaluate the module directly on `group`.
    pub fn extended(&self, group: &mut G) -> Result<(), SharedError> {
        debug!(name = ?self.name, "extending group with shared module");
        evaluate(group, &self.template, Args::bind(self.template.params(), Vec::new()))
    }
}

impl<G> Clone for SharedModule<G> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            template: Arc::clone(&self.template),
        }
    }
}

impl<G> Debug for SharedModule<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedModule")
            .field("name", &self.name)
            .field("template", &self.template)
            .finish()
    }
}
