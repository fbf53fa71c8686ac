//! Composition of shared groups into a group tree.
//!
//! Composing looks up a template, creates one child group under the parent,
//! evaluates the template in that child with the caller's arguments bound
//! and then evaluates the optional caller block in the same child. Every
//! call creates a new child and evaluates the template again; nothing is
//! cached between compositions.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::{
    error::SharedError,
    group::{GroupHost, Metadata},
    key::{KeyArgs, TemplateKey, resolve_direct},
    registry::SharedRegistry,
    template::{Args, Template, TemplateResult, TemplateScope},
    whatever::{BoxedWhatever, boxed},
};

/// Compose the template registered under `key` into a new child of `parent`.
///
/// Returns the created child. A key without a registered template fails with
/// [`SharedError::UnresolvedReference`] before any child is created.
pub fn compose<'g, G, B, R>(
    registry: &SharedRegistry<G>,
    parent: &'g mut G,
    key: KeyArgs,
    args: Vec<BoxedWhatever>,
    block: Option<B>,
) -> Result<&'g mut G, SharedError>
where
    G: GroupHost,
    B: FnOnce(&mut TemplateScope<'_, G>) -> R,
    R: Into<TemplateResult>,
{
    let key = resolve_direct(&key)?;
    let template = registry
        .lookup(&key)
        .ok_or_else(|| SharedError::UnresolvedReference {
            label: key.to_string(),
        })?;

    if args.len() != template.arity() {
        warn!(
            %key,
            given = args.len(),
            declared = template.arity(),
            "shared example group called with a different number of arguments than it declares"
        );
    }
    debug!(%key, args = args.len(), block = block.is_some(), "composing shared example group");

    let child = parent.create_child(Cow::Owned(composed_description(&key)));
    child.set_metadata(Metadata::SHARED_GROUP_NAME.into(), boxed(key.clone()));
    evaluate(child, &template, Args::bind(template.params(), args))?;
    if let Some(block) = block {
        evaluate_with(child, |scope| block(scope).into())?;
    }
    Ok(child)
}

/// Evaluate `template` directly in `group` with `args`.
///
/// Examples, helpers and nested compositions declared by the template land
/// on `group`.
pub fn evaluate<G: GroupHost>(
    group: &mut G,
    template: &Template<G>,
    args: Args,
) -> Result<(), SharedError> {
    evaluate_with(group, |scope| template.call(scope, &args))
}

fn evaluate_with<G, F>(group: &mut G, f: F) -> Result<(), SharedError>
where
    G: GroupHost,
    F: FnOnce(&mut TemplateScope<'_, G>) -> TemplateResult,
{
    f(&mut TemplateScope::new(group)).0
}

/// The label a composed child group is described with.
pub fn composed_description(key: &TemplateKey) -> String {
    format!("it should behave like {key}")
}
