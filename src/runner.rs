use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    time::Instant,
};

use tracing::trace;

use crate::{
    example::{Example, ExampleContext},
    group::ExampleGroup,
    outcome::{ExampleFailure, ExampleOutcome, ExampleStatus},
    report::{ExampleOutcomes, GroupReport},
};

impl ExampleGroup {
    /// Run every example of this group and its children, depth first.
    ///
    /// A group's own examples run before its children. Panics inside an
    /// example are caught and reported as [`ExampleFailure::Panicked`].
    pub fn run(&self) -> GroupReport {
        let now = Instant::now();
        let mut outcomes = Vec::new();
        run_group(self, &mut Vec::new(), &mut outcomes);
        GroupReport {
            outcomes,
            duration: now.elapsed(),
        }
    }
}

fn run_group<'g>(
    group: &'g ExampleGroup,
    ancestors: &mut Vec<&'g ExampleGroup>,
    outcomes: &mut ExampleOutcomes,
) {
    let ctx = ExampleContext::new(group, ancestors);
    for example in group.examples() {
        let name = ancestors
            .iter()
            .chain([&group])
            .map(|group| group.description())
            .chain([example.description()])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        trace!(%name, group = %group.id(), "running example");
        outcomes.push((name, run_example(example, &ctx)));
    }

    ancestors.push(group);
    for child in group.children() {
        run_group(child, ancestors, outcomes);
    }
    ancestors.pop();
}

fn run_example(example: &Example, ctx: &ExampleContext<'_>) -> ExampleOutcome {
    let now = Instant::now();
    let status = match catch_unwind(AssertUnwindSafe(|| example.call(ctx))) {
        Ok(result) => ExampleStatus::from(result),
        Err(err) => ExampleStatus::Failed(ExampleFailure::Panicked(payload_as_string(err))),
    };
    ExampleOutcome {
        status,
        duration: now.elapsed(),
    }
}

/// Convert a panic payload into a string.
///
/// This matches the common payload types produced by `panic!` (`&'static str` and `String`).
/// Other payload types are formatted as a generic placeholder.
fn payload_as_string(err: Box<dyn Any + Send + 'static>) -> String {
    err.downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|err| err.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("Box<dyn Any>"))
}
