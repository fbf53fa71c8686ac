use std::{
    borrow::Cow,
    fmt::Debug,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use crate::{
    error::SharedError,
    group::{ExampleGroup, GroupHost},
    helper::{Helper, HelperLevel, HelperTable},
    whatever::{BoxedWhatever, Whatever},
};

/// Build a `Vec<BoxedWhatever>` of positional arguments.
///
/// ```
/// let args = kitest_shared::args![":value1", 2];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        ::std::vec![$($crate::boxed($value)),*]
    };
}

/// Positional arguments bound to the parameters a template declares.
///
/// Arguments are bound by position. Arguments past the declared parameters
/// stay reachable through [`Args::nth`], missing ones read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    names: Vec<Cow<'static, str>>,
    values: Vec<BoxedWhatever>,
}

impl Args {
    pub fn positional(values: Vec<BoxedWhatever>) -> Self {
        Self {
            names: Vec::new(),
            values,
        }
    }

    pub(crate) fn bind(params: &[Cow<'static, str>], values: Vec<BoxedWhatever>) -> Self {
        Self {
            names: params.to_vec(),
            values,
        }
    }

    pub fn get<T: Whatever>(&self, name: &str) -> Option<&T> {
        let index = self.names.iter().position(|param| param == name)?;
        self.nth(index)
    }

    pub fn nth<T: Whatever>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.downcast_ref()
    }

    pub fn raw(&self, index: usize) -> Option<&dyn Whatever> {
        self.values.get(index).map(|value| &**value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The result of evaluating a template body or caller block.
#[derive(Debug)]
pub struct TemplateResult(pub Result<(), SharedError>);

impl From<()> for TemplateResult {
    fn from(_: ()) -> Self {
        Self(Ok(()))
    }
}

impl From<Result<(), SharedError>> for TemplateResult {
    fn from(v: Result<(), SharedError>) -> Self {
        Self(v)
    }
}

pub trait TemplateFn<G>: Send + Sync {
    fn call_template(&self, scope: &mut TemplateScope<'_, G>, args: &Args) -> TemplateResult;
}

impl<G, F, R> TemplateFn<G> for F
where
    F: Fn(&mut TemplateScope<'_, G>, &Args) -> R + Send + Sync,
    R: Into<TemplateResult>,
{
    fn call_template(&self, scope: &mut TemplateScope<'_, G>, args: &Args) -> TemplateResult {
        (self)(scope, args).into()
    }
}

/// A registered block of shared example declarations.
///
/// A template is a function value plus the parameter names it declares. It is
/// immutable once built and evaluated once per composition.
pub struct Template<G = ExampleGroup> {
    params: Vec<Cow<'static, str>>,
    body: Arc<dyn TemplateFn<G>>,
}

impl Template {
    /// Create a template for [`ExampleGroup`] trees.
    pub fn new<F, R>(body: F) -> Self
    where
        F: Fn(&mut TemplateScope<'_, ExampleGroup>, &Args) -> R + Send + Sync + 'static,
        R: Into<TemplateResult> + 'static,
    {
        Self::from_fn(body)
    }
}

impl<G: GroupHost> Template<G> {
    /// Create a template for any [`GroupHost`].
    pub fn from_fn<F, R>(body: F) -> Self
    where
        F: Fn(&mut TemplateScope<'_, G>, &Args) -> R + Send + Sync + 'static,
        R: Into<TemplateResult> + 'static,
    {
        Self {
            params: Vec::new(),
            body: Arc::new(body),
        }
    }

    pub fn with_params<P>(self, params: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn params(&self) -> &[Cow<'static, str>] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn call(&self, scope: &mut TemplateScope<'_, G>, args: &Args) -> TemplateResult {
        self.body.call_template(scope, args)
    }
}

impl<G> Clone for Template<G> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<G> Debug for Template<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The context a template body or caller block is evaluated in.
///
/// Dereferences to the group the template is evaluated in, so examples and
/// nested compositions are declared on that group directly. Helper methods
/// defined with [`def`](Self::def) and [`def_class`](Self::def_class) are
/// attached to the group right away, so groups declared after them in the
/// same body inherit them.
pub struct TemplateScope<'g, G> {
    group: &'g mut G,
}

impl<'g, G> TemplateScope<'g, G> {
    pub(crate) fn new(group: &'g mut G) -> Self {
        Self { group }
    }

    pub fn group(&mut self) -> &mut G {
        self.group
    }
}

impl<G: GroupHost> TemplateScope<'_, G> {
    /// Define an instance level helper, callable from the group's examples.
    pub fn def<F>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(&Args) -> Option<BoxedWhatever> + Send + Sync + 'static,
    {
        self.define(HelperLevel::Instance, name.into(), Helper::new(f))
    }

    /// Define a class level helper, callable on the group itself.
    pub fn def_class<F>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(&Args) -> Option<BoxedWhatever> + Send + Sync + 'static,
    {
        self.define(HelperLevel::Class, name.into(), Helper::new(f))
    }

    fn define(&mut self, level: HelperLevel, name: Cow<'static, str>, helper: Helper) -> &mut Self {
        let mut table = HelperTable::new();
        table.define(level, name, helper);
        self.group.extend_capabilities(table);
        self
    }
}

impl<G> Deref for TemplateScope<'_, G> {
    type Target = G;

    fn deref(&self) -> &Self::Target {
        self.group
    }
}

impl<G> DerefMut for TemplateScope<'_, G> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.group
    }
}
