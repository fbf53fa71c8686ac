use std::{borrow::Cow, collections::BTreeMap, fmt::Debug, sync::Arc};

use crate::{template::Args, whatever::BoxedWhatever};

/// Where a helper method is attached on a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperLevel {
    /// Callable from the examples of a group.
    Instance,

    /// Callable on the group itself.
    Class,
}

/// A helper method defined by a template body or a caller block.
#[derive(Clone)]
pub struct Helper(Arc<dyn Fn(&Args) -> Option<BoxedWhatever> + Send + Sync>);

impl Helper {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Args) -> Option<BoxedWhatever> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &Args) -> Option<BoxedWhatever> {
        (self.0)(args)
    }
}

impl Debug for Helper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Helper(...)")
    }
}

/// A table of helper methods, split by [`HelperLevel`].
///
/// Helpers reach a group through
/// [`GroupHost::extend_capabilities`](crate::group::GroupHost::extend_capabilities).
#[derive(Debug, Clone, Default)]
pub struct HelperTable {
    instance: BTreeMap<Cow<'static, str>, Helper>,
    class: BTreeMap<Cow<'static, str>, Helper>,
}

impl HelperTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, level: HelperLevel, name: impl Into<Cow<'static, str>>, helper: Helper) {
        self.level_mut(level).insert(name.into(), helper);
    }

    pub fn get(&self, level: HelperLevel, name: &str) -> Option<&Helper> {
        self.level(level).get(name)
    }

    pub fn names(&self, level: HelperLevel) -> impl ExactSizeIterator<Item = &str> {
        self.level(level).keys().map(|name| name.as_ref())
    }

    /// Move every helper of `other` into `self`, replacing helpers with the same name.
    pub fn merge(&mut self, other: HelperTable) {
        self.instance.extend(other.instance);
        self.class.extend(other.class);
    }

    pub fn len(&self) -> usize {
        self.instance.len() + self.class.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn level(&self, level: HelperLevel) -> &BTreeMap<Cow<'static, str>, Helper> {
        match level {
            HelperLevel::Instance => &self.instance,
            HelperLevel::Class => &self.class,
        }
    }

    fn level_mut(&mut self, level: HelperLevel) -> &mut BTreeMap<Cow<'static, str>, Helper> {
        match level {
            HelperLevel::Instance => &mut self.instance,
            HelperLevel::Class => &mut self.class,
        }
    }
}
