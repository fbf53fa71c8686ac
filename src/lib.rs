//! Shared example groups for composable test suites.
//!
//! Define a block of examples and helpers once under a name, a type or a set
//! of tags, then splice it into any number of example groups:
//!
//! ```
//! use kitest_shared::{ExampleGroup, Template, args, share_as, shared_examples_for};
//!
//! shared_examples_for(
//!     "a collection",
//!     Template::new(|scope, args| {
//!         let size = args.get::<usize>("size").copied().unwrap_or_default();
//!         scope.it("knows its size", move |_| assert!(size > 0));
//!     })
//!     .with_params(["size"]),
//! )
//! .unwrap();
//!
//! let cornucopia = share_as(
//!     "Cornucopia",
//!     Template::new(|scope, _| {
//!         scope.it("is plentiful", |_| {});
//!     }),
//! )
//! .unwrap();
//!
//! let mut group = ExampleGroup::describe("Vec");
//! group.it_should_behave_like("a collection", args![3_usize]).unwrap();
//! group.include(&cornucopia).unwrap();
//!
//! assert_eq!(group.children().len(), 2);
//! assert!(group.run().all_passed());
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod example;
pub mod group;
pub mod helper;
pub mod key;
pub mod module;
pub mod outcome;
pub mod registry;
pub mod report;
pub mod template;

mod runner;

mod whatever;
pub use whatever::*;

mod world;
pub use world::*;

pub use error::SharedError;
pub use group::{ExampleGroup, GroupHost};
pub use key::{Symbol, Tags, TemplateKey, TypeKey};
pub use module::SharedModule;
pub use template::{Args, Template, TemplateScope};
