use std::process::Termination;

use kitest_shared::{
    ExampleGroup, SharedError, Symbol, Tags, Template, args, boxed, share_as,
    shared_examples_for, world,
};
use tracing_subscriber::EnvFilter;

fn define() -> Result<ExampleGroup, SharedError> {
    shared_examples_for(
        "a stack",
        Template::new(|scope, args| {
            let capacity = args.get::<usize>("capacity").copied().unwrap_or(0);
            scope.def("capacity", move |_| Some(boxed(capacity)));
            scope.it("starts empty", |_| {});
            scope.it("has room", |ctx| match ctx.call("capacity", vec![]) {
                Ok(Some(capacity)) if capacity != boxed(0_usize) => Ok(()),
                other => Err(format!("no capacity: {other:?}")),
            });
        })
        .with_params(["capacity"]),
    )?;

    shared_examples_for(
        ("legacy behaviour", Tags::new().with("compat", Symbol::new("rspec_1"))),
        Template::new(|scope, _| {
            scope.def("legacy", |_| Some(boxed(true)));
        }),
    )?;

    let drainable = share_as(
        "Drainable",
        Template::new(|scope, _| {
            scope.it("drains to nothing", |_| {});
        }),
    )?;

    world().freeze();

    let mut group = ExampleGroup::describe("Vec");
    group.it_should_behave_like_with("a stack", args![16_usize], |scope| {
        scope.it("keeps insertion order", |_| {});
    })?;
    group.include(&drainable)?;

    // no tag matching here, every configured rule applies
    let legacy = group.context("legacy mode");
    for rule in world().configuration().include_or_extend_modules() {
        legacy.extend(&rule.unit)?;
    }
    legacy
        .context("nested")
        .it("sees legacy helpers", |ctx| ctx.call("legacy", vec![]).map(|_| ()));

    Ok(group)
}

fn main() -> impl Termination {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let group = match define() {
        Ok(group) => group,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let report = group.run();
    for (name, outcome) in &report.outcomes {
        println!("{name} ... {:?}", outcome.status);
    }
    report
}
