//! The template registry.
//!
//! The registry maps a [`TemplateKey`] to the [`Template`] registered under
//! it. Entries are only ever added while a suite is being defined, never
//! removed one by one, and a key can be taken exactly once. A second
//! registration under the same label or type is an authoring error and is
//! reported right away.
//!
//! After the definition phase the registry can be [frozen](SharedRegistry::freeze).
//! A frozen registry still serves lookups, for example while groups run in
//! parallel, but rejects further registrations.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::RwLock;
use tracing::debug;

use crate::{
    error::SharedError,
    group::{ExampleGroup, GroupHost},
    key::TemplateKey,
    template::Template,
};

pub struct SharedRegistry<G = ExampleGroup> {
    entries: RwLock<HashMap<TemplateKey, Arc<Template<G>>>>,
    frozen: AtomicBool,
}

impl<G> Default for SharedRegistry<G> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            frozen: AtomicBool::new(false),
        }
    }
}

impl<G: GroupHost> SharedRegistry<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `template` under `key`.
    ///
    /// Fails with [`SharedError::DuplicateRegistration`] if `key` is taken and
    /// with [`SharedError::RegistryFrozen`] after [`freeze`](Self::freeze).
    pub fn register(
        &self,
        key: TemplateKey,
        template: Template<G>,
    ) -> Result<Arc<Template<G>>, SharedError> {
        if self.is_frozen() {
            return Err(SharedError::RegistryFrozen {
                label: key.to_string(),
            });
        }

        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(SharedError::DuplicateRegistration {
                label: key.to_string(),
            });
        }

        debug!(%key, arity = template.arity(), "registered shared example group");
        let template = Arc::new(template);
        entries.insert(key, Arc::clone(&template));
        Ok(template)
    }

    pub fn lookup(&self, key: &TemplateKey) -> Option<Arc<Template<G>>> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &TemplateKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<TemplateKey> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// End the definition phase.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Drop every entry and reopen the registry for registrations.
    pub fn clear(&self) {
        self.entries.write().clear();
        self.frozen.store(false, Ordering::Release);
    }
}
