//! Example groups.
//!
//! The shared group engine does not own the test tree. It only needs a few
//! capabilities from a group, described by [`GroupHost`]: create a child,
//! record metadata on it and extend it with helper methods. Evaluating a
//! template "in" a group means calling the template with a
//! [`TemplateScope`](crate::template::TemplateScope) over that group.
//!
//! [`ExampleGroup`] is the group tree this crate ships. It implements
//! [`GroupHost`] and carries the author facing entry points
//! ([`it_should_behave_like`](ExampleGroup::it_should_behave_like),
//! [`include`](ExampleGroup::include), [`extend`](ExampleGroup::extend)).

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt::{self, Display},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    compose,
    error::SharedError,
    example::{Example, ExampleContext, ExampleFn, ExampleResult},
    helper::{Helper, HelperLevel, HelperTable},
    key::{KeyArgs, TemplateKey},
    module::SharedModule,
    template::{Args, TemplateResult, TemplateScope},
    whatever::{BoxedWhatever, Whatever, boxed},
    world::{World, world},
};

/// The capabilities the shared group engine needs from a test group.
pub trait GroupHost: Sized + 'static {
    /// Create a child group attached to `self` and return it.
    fn create_child(&mut self, description: Cow<'static, str>) -> &mut Self;

    /// Record a metadata entry on the group.
    fn set_metadata(&mut self, key: Cow<'static, str>, value: BoxedWhatever);

    /// Attach every helper of `helpers` to the group.
    fn extend_capabilities(&mut self, helpers: HelperTable);
}

/// A process unique identity of an [`ExampleGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(u64);

impl GroupId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(BTreeMap<Cow<'static, str>, BoxedWhatever>);

impl Metadata {
    pub const DESCRIPTION: &'static str = "description";
    pub const SHARED_GROUP_NAME: &'static str = "shared_group_name";

    pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: BoxedWhatever) {
        self.0.insert(key.into(), value);
    }

    pub fn get<T: Whatever>(&self, key: &str) -> Option<&T> {
        self.0.get(key)?.downcast_ref()
    }

    pub fn get_raw(&self, key: &str) -> Option<&dyn Whatever> {
        self.0.get(key).map(|value| &**value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The key of the shared group that produced the group, if any.
    ///
    /// The entry is stored as a [`TemplateKey`], so reading it back as a
    /// `String` through [`get`](Self::get) yields `None`. Use
    /// [`shared_group_label`](Self::shared_group_label) for the text.
    pub fn shared_group_name(&self) -> Option<&TemplateKey> {
        self.get(Self::SHARED_GROUP_NAME)
    }

    /// The shared group key as text: the label itself, or the type name for
    /// type keys.
    pub fn shared_group_label(&self) -> Option<String> {
        self.shared_group_name().map(TemplateKey::to_string)
    }

    pub fn description(&self) -> Option<&str> {
        self.get::<Cow<'static, str>>(Self::DESCRIPTION)
            .map(|description| description.as_ref())
    }
}

pub struct ExampleGroup {
    id: GroupId,
    description: Cow<'static, str>,
    metadata: Metadata,
    examples: Vec<Example>,
    children: Vec<ExampleGroup>,
    helpers: HelperTable,
    world: Arc<World>,
}

impl ExampleGroup {
    /// Create a top level group that resolves shared groups through [`world()`].
    pub fn describe(description: impl Into<Cow<'static, str>>) -> Self {
        Self::describe_in(world(), description)
    }

    /// Create a top level group that resolves shared groups through `world`.
    pub fn describe_in(world: &Arc<World>, description: impl Into<Cow<'static, str>>) -> Self {
        Self::with_parts(Arc::clone(world), description.into(), HelperTable::default())
    }

    fn with_parts(world: Arc<World>, description: Cow<'static, str>, helpers: HelperTable) -> Self {
        let mut metadata = Metadata::default();
        metadata.insert(Metadata::DESCRIPTION, boxed(description.clone()));
        Self {
            id: GroupId::next(),
            description,
            metadata,
            examples: Vec::new(),
            children: Vec::new(),
            helpers,
            world,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn children(&self) -> &[ExampleGroup] {
        &self.children
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Declare an example in this group.
    pub fn it<F, T>(&mut self, description: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(&ExampleContext<'_>) -> T + Send + Sync + 'static,
        T: Into<ExampleResult>,
    {
        self.examples.push(Example::new(description, f));
        self
    }

    /// Declare an example from an already boxed example function.
    pub fn it_with(
        &mut self,
        description: impl Into<Cow<'static, str>>,
        f: Arc<dyn ExampleFn>,
    ) -> &mut Self {
        self.examples.push(Example::from_arc(description, f));
        self
    }

    /// Create a nested group.
    pub fn context(&mut self, description: impl Into<Cow<'static, str>>) -> &mut ExampleGroup {
        self.create_child(description.into())
    }

    /// Compose the shared group registered under `key` into a new child group.
    pub fn it_should_behave_like(
        &mut self,
        key: impl Into<KeyArgs>,
        args: Vec<BoxedWhatever>,
    ) -> Result<&mut ExampleGroup, SharedError> {
        let world = Arc::clone(&self.world);
        compose::compose(
            world.shared_example_groups(),
            self,
            key.into(),
            args,
            None::<fn(&mut TemplateScope<'_, ExampleGroup>)>,
        )
    }

    /// Like [`it_should_behave_like`](Self::it_should_behave_like), then
    /// evaluate `block` in the same child group.
    pub fn it_should_behave_like_with<F, R>(
        &mut self,
        key: impl Into<KeyArgs>,
        args: Vec<BoxedWhatever>,
        block: F,
    ) -> Result<&mut ExampleGroup, SharedError>
    where
        F: FnOnce(&mut TemplateScope<'_, ExampleGroup>) -> R,
        R: Into<TemplateResult>,
    {
        let world = Arc::clone(&self.world);
        compose::compose(
            world.shared_example_groups(),
            self,
            key.into(),
            args,
            Some(block),
        )
    }

    /// Include a shared module, creating an anonymous child group for it.
    pub fn include(
        &mut self,
        module: &SharedModule<ExampleGroup>,
    ) -> Result<&mut ExampleGroup, SharedError> {
        module.included(self)
    }

    /// Extend this group with the helpers and examples of a shared module.
    pub fn extend(&mut self, module: &SharedModule<ExampleGroup>) -> Result<(), SharedError> {
        module.extended(self)
    }

    pub fn instance_methods(&self) -> impl ExactSizeIterator<Item = &str> {
        self.helpers.names(HelperLevel::Instance)
    }

    pub fn class_methods(&self) -> impl ExactSizeIterator<Item = &str> {
        self.helpers.names(HelperLevel::Class)
    }

    /// Call an instance level helper the way an example of this group would.
    pub fn call_instance(
        &self,
        name: &str,
        args: Vec<BoxedWhatever>,
    ) -> Result<Option<BoxedWhatever>, SharedError> {
        self.call_helper(HelperLevel::Instance, name, &Args::positional(args))
    }

    /// Call a class level helper on this group.
    pub fn call_class(
        &self,
        name: &str,
        args: Vec<BoxedWhatever>,
    ) -> Result<Option<BoxedWhatever>, SharedError> {
        self.call_helper(HelperLevel::Class, name, &Args::positional(args))
    }

    pub(crate) fn call_helper(
        &self,
        level: HelperLevel,
        name: &str,
        args: &Args,
    ) -> Result<Option<BoxedWhatever>, SharedError> {
        let helper = self.helper(level, name).ok_or_else(|| self.undefined_helper(name))?;
        Ok(helper.call(args))
    }

    pub(crate) fn helper(&self, level: HelperLevel, name: &str) -> Option<&Helper> {
        self.helpers.get(level, name)
    }

    pub(crate) fn undefined_helper(&self, name: &str) -> SharedError {
        SharedError::UndefinedHelper {
            name: name.to_string(),
            group: self.description.to_string(),
        }
    }
}

impl GroupHost for ExampleGroup {
    fn create_child(&mut self, description: Cow<'static, str>) -> &mut Self {
        let child = Self::with_parts(Arc::clone(&self.world), description, self.helpers.clone());
        let index = self.children.len();
        self.children.push(child);
        &mut self.children[index]
    }

    fn set_metadata(&mut self, key: Cow<'static, str>, value: BoxedWhatever) {
        self.metadata.insert(key, value);
    }

    fn extend_capabilities(&mut self, helpers: HelperTable) {
        self.helpers.merge(helpers);
    }
}

impl fmt::Debug for ExampleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExampleGroup")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("metadata", &self.metadata)
            .field("examples", &self.examples)
            .field("children", &self.children)
            .field("helpers", &self.helpers)
            .finish_non_exhaustive()
    }
}
