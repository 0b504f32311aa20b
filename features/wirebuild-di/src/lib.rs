//! Wirebuild DI resolves the components of an application into a fixed build plan.
//!
//! Wirebuild DI is split into three major parts:
//! 1. Descriptors: components and init hooks, as reported by a scanner
//! 2. Resolver: turns descriptors into a [`BuildPlan`], in a deterministic order
//! 3. Emitters: turn the plan into bootstrap source code, or run it in process
//!
//! # Examples
//!
//! ```rust
//! use wirebuild_di::{
//!     ComponentDescriptor, ParameterRequirement, PlanBuilder, SourceEmitter,
//! };
//!
//! let plan = PlanBuilder::new()
//!     .add_component(ComponentDescriptor::constructor(
//!         "app::Service",
//!         vec![ParameterRequirement::of("app::Repo")],
//!     ))
//!     .add_component(ComponentDescriptor::constructor("app::Repo", vec![]))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(plan.construction_order(), vec!["app::Repo", "app::Service"]);
//!
//! let source = plan.emit(SourceEmitter::new()).unwrap();
//! assert!(source.contains("let var1 = context.component(move || app::Service::new(var0.clone()));"));
//! ```

pub mod builder;
pub mod context;
pub mod dependency_graph;
pub mod descriptor;
pub mod emit;
pub mod errors;
pub mod hooks;
pub mod matching;
pub mod plan;
pub mod registry;
pub mod resolver;
pub mod types;

pub use builder::PlanBuilder;
pub use context::{ApplicationContext, ContextAssembler, HookCall, Injected};
pub use descriptor::{
    ComponentDescriptor, ComponentKind, ParameterRequirement, ScannedComponent,
    ScannedConstructor,
};
pub use emit::{source::SourceEmitter, PlanEmitter};
pub use errors::{
    AssembleError, ConstructorSelectionError, DependencyResolveError, HookShapeError,
    RequireError, ResolveError,
};
pub use hooks::{priority, HookDescriptor, HookOwner};
pub use matching::{ExactMatch, MatchStrategy, SupertypeMatch, TypeHierarchy};
pub use plan::{BuildPlan, ConstructionStep, HookArgument, HookStep, PlanWarning};
pub use registry::{Injection, ProducerHandle, TypeRegistry};
pub use resolver::Resolver;
pub use types::{Injectable, Instance, Qualifier, TypeName};
