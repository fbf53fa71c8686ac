use std::{borrow::Cow, fmt::Debug, sync::Arc};

use crate::{
    error::SharedError,
    group::{ExampleGroup, GroupId, Metadata},
    helper::HelperLevel,
    template::Args,
    whatever::BoxedWhatever,
};

/// A single example declared in an [`ExampleGroup`].
#[derive(Clone)]
pub struct Example {
    description: Cow<'static, str>,
    function: Arc<dyn ExampleFn>,
}

impl Example {
    pub fn new<F, T>(description: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&ExampleContext<'_>) -> T + Send + Sync + 'static,
        T: Into<ExampleResult>,
    {
        Self::from_arc(description, Arc::new(f))
    }

    pub fn from_arc(description: impl Into<Cow<'static, str>>, function: Arc<dyn ExampleFn>) -> Self {
        Self {
            description: description.into(),
            function,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn call(&self, ctx: &ExampleContext<'_>) -> ExampleResult {
        self.function.call_example(ctx)
    }
}

impl Debug for Example {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Example")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

pub trait ExampleFn: Send + Sync {
    fn call_example(&self, ctx: &ExampleContext<'_>) -> ExampleResult;
}

impl<F, T> ExampleFn for F
where
    F: Fn(&ExampleContext<'_>) -> T + Send + Sync,
    T: Into<ExampleResult>,
{
    fn call_example(&self, ctx: &ExampleContext<'_>) -> ExampleResult {
        (self)(ctx).into()
    }
}

#[derive(Debug)]
pub struct ExampleResult(pub Result<(), String>);

impl From<()> for ExampleResult {
    fn from(_: ()) -> Self {
        Self(Ok(()))
    }
}

impl<E: Debug> From<Result<(), E>> for ExampleResult {
    fn from(v: Result<(), E>) -> Self {
        ExampleResult(v.map_err(|e| format!("{e:#?}")))
    }
}

/// What an example sees of the group it runs in.
///
/// Instance helpers resolve through the example's group first and then
/// through its enclosing groups, nearest first. A helper defined on an outer
/// group after a nested group was declared is still visible to the nested
/// group's examples.
#[derive(Debug, Clone, Copy)]
pub struct ExampleContext<'g> {
    group: &'g ExampleGroup,
    /// Enclosing groups, root first.
    ancestors: &'g [&'g ExampleGroup],
}

impl<'g> ExampleContext<'g> {
    pub(crate) fn new(group: &'g ExampleGroup, ancestors: &'g [&'g ExampleGroup]) -> Self {
        Self { group, ancestors }
    }

    /// The identity of the group the example was declared in.
    pub fn group_id(&self) -> GroupId {
        self.group.id()
    }

    pub fn group_description(&self) -> &'g str {
        self.group.description()
    }

    pub fn metadata(&self) -> &'g Metadata {
        self.group.metadata()
    }

    /// Call an instance level helper of the example's group.
    pub fn call(
        &self,
        name: &str,
        args: Vec<BoxedWhatever>,
    ) -> Result<Option<BoxedWhatever>, SharedError> {
        let helper = std::iter::once(self.group)
            .chain(self.ancestors.iter().rev().copied())
            .find_map(|group| group.helper(HelperLevel::Instance, name))
            .ok_or_else(|| self.group.undefined_helper(name))?;
        Ok(helper.call(&Args::positional(args)))
    }
}
