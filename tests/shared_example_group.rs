use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use kitest_shared::{
    ExampleGroup, SharedError, Symbol, Tags, Template, TemplateKey, TypeKey, args,
    boxed,
    config::InclusionMode,
    share_as, share_examples_for, shared_examples_for, world,
    World,
};
use regex::Regex;

struct ExampleModule;
struct ExampleClass;

fn isolated() -> Arc<World> {
    Arc::new(World::new())
}

mod registration {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn global_spellings_register_into_the_global_world() {
        shared_examples_for("registration: global", Template::new(|_, _| {})).unwrap();
        assert!(
            world()
                .shared_example_groups()
                .contains(&TemplateKey::label("registration: global"))
        );

        let err = share_examples_for("registration: global", Template::new(|_, _| {}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Shared example group 'registration: global' already exists"
        );
    }

    #[test]
    fn second_registration_with_the_same_name_fails() {
        let expected = SharedError::DuplicateRegistration {
            label: "shared group".into(),
        };

        let world = isolated();
        world
            .shared_examples_for("shared group", Template::new(|_, _| {}))
            .unwrap();
        assert_eq!(
            world
                .shared_examples_for("shared group", Template::new(|_, _| {}))
                .unwrap_err(),
            expected
        );

        let world = isolated();
        world
            .share_examples_for("shared group", Template::new(|_, _| {}))
            .unwrap();
        assert_eq!(
            world
                .share_examples_for("shared group", Template::new(|_, _| {}))
                .unwrap_err(),
            expected
        );
    }

    #[test]
    fn second_registration_with_the_same_type_fails() {
        let world = isolated();
        world
            .shared_examples_for(TypeKey::of::<ExampleClass>(), Template::new(|_, _| {}))
            .unwrap();

        let err = world
            .shared_examples_for(TypeKey::of::<ExampleClass>(), Template::new(|_, _| {}))
            .unwrap_err();
        assert!(matches!(err, SharedError::DuplicateRegistration { .. }));
        assert!(
            Regex::new(r"Shared example group '.*ExampleClass' already exists")
                .unwrap()
                .is_match(&err.to_string())
        );
    }

    #[test]
    fn captures_every_key_shape() {
        let world = isolated();
        world
            .shared_examples_for("name", Template::new(|_, _| {}))
            .unwrap();
        world
            .shared_examples_for(TypeKey::of::<ExampleModule>(), Template::new(|_, _| {}))
            .unwrap();
        world
            .shared_examples_for(TypeKey::of::<ExampleClass>(), Template::new(|_, _| {}))
            .unwrap();

        let registry = world.shared_example_groups();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(&TemplateKey::from(Symbol::new("name"))));
        assert!(registry.contains(&TemplateKey::of::<ExampleModule>()));
        assert!(registry.contains(&TemplateKey::of::<ExampleClass>()));
    }

    #[test]
    fn symbol_and_string_name_the_same_group() {
        let world = isolated();
        world
            .shared_examples_for(Symbol::new("name"), Template::new(|_, _| {}))
            .unwrap();
        assert!(matches!(
            world.shared_examples_for("name", Template::new(|_, _| {})),
            Err(SharedError::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn a_hash_delegates_extend_on_configuration() {
        let world = isolated();
        let tags = Tags::new().with("foo", Symbol::new("bar"));
        world
            .shared_examples_for(
                tags.clone(),
                Template::new(|scope, _| {
                    scope.def("bar", |_| Some(boxed("bar")));
                }),
            )
            .unwrap();

        let rules = world.configuration().include_or_extend_modules();
        let rule = &rules[0];
        assert_eq!(rule.mode, InclusionMode::Extend);
        assert_eq!(rule.tags, tags);

        let mut group = ExampleGroup::describe_in(&world, "extended");
        group.extend(&rule.unit).unwrap();
        assert_eq!(
            group.call_instance("bar", vec![]).unwrap(),
            Some(boxed("bar"))
        );
    }

    #[test]
    fn a_string_and_a_hash_delegate_extend_on_configuration() {
        let world = isolated();
        let tags = Tags::new().with("foo", Symbol::new("bar"));
        world
            .shared_examples_for(
                ("name", tags.clone()),
                Template::new(|scope, _| {
                    scope.def("bar", |_| Some(boxed("bar")));
                }),
            )
            .unwrap();

        assert!(world.shared_example_groups().is_empty());
        let rules = world.configuration().include_or_extend_modules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].mode, InclusionMode::Extend);
        assert_eq!(rules[0].tags, tags);

        let mut group = ExampleGroup::describe_in(&world, "extended");
        group.extend(&rules[0].unit).unwrap();
        assert_eq!(group.instance_methods().collect::<Vec<_>>(), ["bar"]);
    }
}

mod it_should_behave_like {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn creates_a_nested_group() {
        let world = isolated();
        world
            .shared_examples_for("thing", Template::new(|_, _| {}))
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "fake group");
        group.it_should_behave_like("thing", vec![]).unwrap();
        assert_eq!(group.children().len(), 1);
    }

    #[test]
    fn creates_a_nested_group_for_a_type() {
        let world = isolated();
        world
            .shared_examples_for(TypeKey::of::<ExampleClass>(), Template::new(|_, _| {}))
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "fake group");
        group
            .it_should_behave_like(TypeKey::of::<ExampleClass>(), vec![])
            .unwrap();
        assert_eq!(group.children().len(), 1);
    }

    #[test]
    fn adds_shared_examples_to_the_nested_group() {
        let world = isolated();
        world
            .shared_examples_for(
                "thing",
                Template::new(|scope, _| {
                    scope.it("does something", |_| {});
                }),
            )
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "fake group");
        let shared_group = group.it_should_behave_like("thing", vec![]).unwrap();
        assert_eq!(shared_group.examples().len(), 1);
    }

    #[test]
    fn adds_shared_instance_methods_to_the_nested_group() {
        let world = isolated();
        world
            .shared_examples_for(
                "thing",
                Template::new(|scope, _| {
                    scope.def("foo", |_| None);
                }),
            )
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "fake group");
        let shared_group = group.it_should_behave_like("thing", vec![]).unwrap();
        assert!(shared_group.instance_methods().any(|name| name == "foo"));
        assert_eq!(shared_group.call_instance("foo", vec![]).unwrap(), None);

        assert_eq!(group.instance_methods().count(), 0);
    }

    #[test]
    fn adds_shared_class_methods_to_the_nested_group() {
        let world = isolated();
        world
            .shared_examples_for(
                "thing",
                Template::new(|scope, _| {
                    scope.def_class("foo", |_| Some(boxed("class foo")));
                }),
            )
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "fake group");
        let shared_group = group.it_should_behave_like("thing", vec![]).unwrap();
        assert!(shared_group.class_methods().any(|name| name == "foo"));
        assert_eq!(
            shared_group.call_class("foo", vec![]).unwrap(),
            Some(boxed("class foo"))
        );
        assert!(shared_group.call_instance("foo", vec![]).is_err());
    }

    #[test]
    fn examples_can_call_shared_instance_methods() {
        let world = isolated();
        world
            .shared_examples_for(
                "thing",
                Template::new(|scope, _| {
                    scope.def("answer", |_| Some(boxed(42)));
                    scope.it("uses the helper", |ctx| {
                        let answer = ctx.call("answer", vec![]).unwrap();
                        assert_eq!(answer, Some(boxed(42)));
                    });
                }),
            )
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "fake group");
        group.it_should_behave_like("thing", vec![]).unwrap();
        assert!(group.run().all_passed());
    }

    #[test]
    fn nested_groups_see_helpers_defined_in_the_same_body() {
        let world = isolated();
        world
            .shared_examples_for(
                "thing",
                Template::new(|scope, _| {
                    scope.def("foo", |_| Some(boxed("foo")));
                    scope.context("nested").it("calls foo", |ctx| {
                        ctx.call("foo", vec![]).map(|value| assert_eq!(value, Some(boxed("foo"))))
                    });
                }),
            )
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "g");
        group.it_should_behave_like("thing", vec![]).unwrap();

        let report = group.run();
        assert_eq!(report.outcomes[0].0, "g it should behave like thing nested calls foo");
        assert!(report.all_passed(), "{:?}", report.outcomes);
    }

    #[test]
    fn nested_groups_see_helpers_defined_after_them() {
        let world = isolated();
        world
            .shared_examples_for(
                "thing",
                Template::new(|scope, _| {
                    scope.context("nested").it("calls late", |ctx| {
                        ctx.call("late", vec![]).map(|_| ())
                    });
                    scope.def("late", |_| None);
                }),
            )
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "g");
        group.it_should_behave_like("thing", vec![]).unwrap();
        assert!(group.run().all_passed());
    }

    #[test]
    fn nested_compositions_see_helpers_of_the_outer_template() {
        let world = isolated();
        world
            .shared_examples_for(
                "inner",
                Template::new(|scope, _| {
                    scope.it("calls the outer helper", |ctx| {
                        let value = ctx.call("outer_helper", vec![])?;
                        assert_eq!(value, Some(boxed(7)));
                        Ok::<_, SharedError>(())
                    });
                }),
            )
            .unwrap();
        world
            .shared_examples_for(
                "outer",
                Template::new(|scope, _| -> Result<(), SharedError> {
                    scope.def("outer_helper", |_| Some(boxed(7)));
                    scope.it_should_behave_like("inner", vec![])?;
                    Ok(())
                }),
            )
            .unwrap();

        let mut group = ExampleGroup::describe_in(&world, "g");
        let outer = group.it_should_behave_like("outer", vec![]).unwrap();
        assert_eq!(
            outer.children()[0]
                .call_instance("outer_helper", vec![])
                .unwrap(),
            Some(boxed(7))
        );
        assert!(group.run().all_passed());
    }

    #[test]
    fn caller_blocks_share_helpers_with_nested_groups() {
        let world = isolated();
        world
            .shared_examples_for(
                "thing",
                Template::new(|scope, _| {
                    scope.def("from_template", |_| Some(boxed(1)));
                }),
            )
            .unwrap();
        let mut group = ExampleGroup::describe_in(&world, "g");
        group
            .it_should_behave_like_with("thing", vec![], |scope| {
                scope.def("from_block", |_| Some(boxed(2)));
                scope.context("nested").it("calls both", |ctx| {
                    ctx.call("from_template", vec![])?;
                    ctx.call("from_block", vec![]).map(|_| ())
                });
            })
            .unwrap();
        assert!(group.run().all_passed());
    }

    mod given_some_parameters {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn passes_the_parameters_to_the_shared_example_group() {
            let world = isolated();
            let passed_params = Arc::new(Mutex::new(Vec::new()));
            let captured = Arc::clone(&passed_params);
            world
                .shared_examples_for(
                    "thing",
                    Template::new(move |scope, args| {
                        let param1 = args.get::<Symbol>("param1").cloned();
                        let param2 = args.get::<Symbol>("param2").cloned();
                        let captured = Arc::clone(&captured);
                        scope.it("has access to the given parameters", move |_| {
                            let mut passed = captured.lock().unwrap();
                            passed.push(("param1", param1.clone()));
                            passed.push(("param2", param2.clone()));
                        });
                    })
                    .with_params(["param1", "param2"]),
                )
                .unwrap();

            let mut group = ExampleGroup::describe_in(&world, "group");
            group
                .it_should_behave_like(
                    "thing",
                    args![Symbol::new("value1"), Symbol::new("value2")],
                )
                .unwrap();
            assert!(group.run().all_passed());

            assert_eq!(
                *passed_params.lock().unwrap(),
                [
                    ("param1", Some(Symbol::new("value1"))),
                    ("param2", Some(Symbol::new("value2"))),
                ]
            );
        }

        #[test]
        fn adds_shared_instance_methods_to_the_nested_group() {
            let world = isolated();
            world
                .shared_examples_for(
                    "thing",
                    Template::new(|scope, _| {
                        scope.def("foo", |_| None);
                    })
                    .with_params(["param1"]),
                )
                .unwrap();
            let mut group = ExampleGroup::describe_in(&world, "fake group");
            let shared_group = group
                .it_should_behave_like("thing", args![Symbol::new("a")])
                .unwrap();
            assert!(shared_group.instance_methods().any(|name| name == "foo"));
        }

        #[test]
        fn evals_the_shared_example_group_only_once() {
            let world = isolated();
            let eval_count = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&eval_count);
            world
                .shared_examples_for(
                    "thing",
                    Template::new(move |_, _| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .with_params(["p"]),
                )
                .unwrap();
            let mut group = ExampleGroup::describe_in(&world, "fake group");
            group
                .it_should_behave_like("thing", args![Symbol::new("a")])
                .unwrap();
            assert_eq!(eval_count.load(Ordering::SeqCst), 1);
        }
    }

    mod given_a_block {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn evaluates_the_block_in_the_nested_group() {
            let world = isolated();
            let scopes = Arc::new(Mutex::new(Vec::new()));
            let template_scopes = Arc::clone(&scopes);
            world
                .shared_examples_for(
                    "thing",
                    Template::new(move |scope, _| {
                        let scopes = Arc::clone(&template_scopes);
                        scope.it("gets run in the nested group", move |ctx| {
                            scopes.lock().unwrap().push(ctx.group_id());
                        });
                    }),
                )
                .unwrap();

            let mut group = ExampleGroup::describe_in(&world, "group");
            let block_scopes = Arc::clone(&scopes);
            group
                .it_should_behave_like_with("thing", vec![], move |scope| {
                    scope.it("gets run in the same nested group", move |ctx| {
                        block_scopes.lock().unwrap().push(ctx.group_id());
                    });
                })
                .unwrap();
            assert!(group.run().all_passed());

            let scopes = scopes.lock().unwrap();
            assert_eq!(scopes.len(), 2);
            assert_eq!(scopes[0], scopes[1]);
            assert_eq!(scopes[0], group.children()[0].id());
        }
    }

    #[test]
    fn raises_when_the_named_shared_example_group_can_not_be_found() {
        let mut group = ExampleGroup::describe_in(&isolated(), "example_group");
        let err = group
            .it_should_behave_like("a group that does not exist", vec![])
            .unwrap_err();

        assert!(
            Regex::new("Could not find shared example group named")
                .unwrap()
                .is_match(&err.to_string())
        );
        assert_eq!(
            err,
            SharedError::UnresolvedReference {
                label: "a group that does not exist".into()
            }
        );
    }
}

mod share_as {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn is_exposed_globally() {
        let module = share_as("share_as: global", Template::new(|_, _| {})).unwrap();
        assert_eq!(module.name(), Some(&TemplateKey::label("share_as: global")));
        assert!(
            world()
                .shared_example_groups()
                .contains(&TemplateKey::label("share_as: global"))
        );
    }

    #[test]
    fn adds_examples_to_the_current_group_using_include() {
        let world = isolated();
        let cornucopia = world
            .share_as(
                "Cornucopia",
                Template::new(|scope, _| {
                    scope.it("is plentiful", |_| {
                        assert_eq!(5, 4);
                    });
                }),
            )
            .unwrap();

        let mut group = ExampleGroup::describe_in(&world, "group");
        group.include(&cornucopia).unwrap();

        let phantom_group = &group.children()[0];
        assert_eq!(group.children().len(), 1);
        assert_eq!(phantom_group.description(), "");
        assert_eq!(
            phantom_group.metadata().shared_group_name(),
            Some(&TemplateKey::label("Cornucopia"))
        );
        assert_eq!(
            phantom_group.metadata().shared_group_label().as_deref(),
            Some("Cornucopia")
        );
        assert_eq!(phantom_group.examples().len(), 1);
        assert_eq!(phantom_group.examples()[0].description(), "is plentiful");

        let report = group.run();
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].0, "group is plentiful");
        assert!(report.outcomes[0].1.failed());
    }

    #[test]
    fn the_shared_module_is_also_composable_by_name() {
        let world = isolated();
        world
            .share_as(
                "Cornucopia",
                Template::new(|scope, _| {
                    scope.it("is plentiful", |_| {});
                }),
            )
            .unwrap();

        let mut group = ExampleGroup::describe_in(&world, "group");
        let child = group.it_should_behave_like("Cornucopia", vec![]).unwrap();
        assert_eq!(child.examples().len(), 1);
    }
}
