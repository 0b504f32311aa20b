use pretty_assertions::assert_eq;
use wirebuild_config::{keys, HookOrder, MatchingMode, OptionsProvider, ProcessorConfig};
use wirebuild_di::{
    priority, types::args_type, ComponentDescriptor, HookDescriptor, HookStep, Injection,
    ParameterRequirement, PlanBuilder, ProducerHandle, ResolveError, Resolver, ScannedComponent,
    ScannedConstructor, SourceEmitter, TypeHierarchy, TypeName,
};

fn scanned_web_app() -> PlanBuilder {
    PlanBuilder::new()
        .add_scanned(ScannedComponent::class(
            "app::Controller",
            vec![ScannedConstructor::new(vec![
                ParameterRequirement::of("app::Service"),
                ParameterRequirement::of("app::Repo"),
            ])],
        ))
        .unwrap()
        .add_scanned(ScannedComponent::class(
            "app::Service",
            vec![
                ScannedConstructor::new(vec![]),
                ScannedConstructor::new(vec![ParameterRequirement::of("app::Settings")]).autowired(),
            ],
        ))
        .unwrap()
        .add_scanned(ScannedComponent::class(
            "app::Repo",
            vec![ScannedConstructor::new(vec![])],
        ))
        .unwrap()
        .add_scanned(ScannedComponent::function(
            "app::settings",
            "app::Settings",
            vec![ParameterRequirement::named("args", args_type()).exact("args")],
        ))
        .unwrap()
}

#[test]
fn web_app_resolves_in_sweep_order() {
    let plan = scanned_web_app().build().unwrap();

    assert_eq!(
        plan.construction_order(),
        vec!["app::Repo", "app::settings", "app::Service", "app::Controller"]
    );
    assert_eq!(plan.sweeps, 2);
    assert_eq!(
        plan.constructions[1].arguments,
        vec![Injection::Shared(ProducerHandle::Args)]
    );
}

#[test]
fn web_app_renders_bootstrap_source() {
    let plan = scanned_web_app()
        .add_hook(
            HookDescriptor::free("app::serve", vec![ParameterRequirement::of("app::Controller")])
                .with_priority(priority::BLOCKING),
        )
        .build()
        .unwrap();

    let source = plan.emit(SourceEmitter::new()).unwrap();

    let body: Vec<_> = source
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("let var0"))
        .collect();
    assert_eq!(
        body,
        vec![
            "        let var0 = context.component(move || app::Repo::new());",
            "        let var1 = context.component(move || app::settings(args.clone()));",
            "        let var2 = context.component(move || app::Service::new(var1.clone()));",
            "        let var3 = context.component(move || app::Controller::new(var2.clone(), var0.clone()));",
            "        context.after_build(move |context| {",
            "            app::serve(var3.clone());",
            "        });",
            "        context.build()",
            "    }",
            "}",
        ]
    );
}

#[test]
fn options_configure_the_resolver() {
    let options = OptionsProvider::from_pairs([
        (keys::MODULE, "app"),
        (keys::FUNCTION, "bootstrap"),
        (keys::MATCHING, "supertype"),
        (keys::HOOK_ORDER, "ascending"),
    ]);
    let config = ProcessorConfig::from_options(&options).unwrap();
    assert_eq!(config.matching, MatchingMode::Supertype);
    assert_eq!(config.hook_order, HookOrder::Ascending);

    let mut hierarchy = TypeHierarchy::new();
    hierarchy.declare("app::PgRepo", ["app::Repo"]);

    let plan = PlanBuilder::new()
        .with_resolver(Resolver::from_config(&config, hierarchy))
        .add_component(ComponentDescriptor::constructor(
            "app::Service",
            vec![ParameterRequirement::of("app::Repo")],
        ))
        .add_component(ComponentDescriptor::constructor("app::PgRepo", vec![]))
        .add_hook(HookDescriptor::free("app::serve", vec![]).with_priority(priority::BLOCKING))
        .add_hook(HookDescriptor::free("app::logging", vec![]).with_priority(priority::INTERNAL_HIGH))
        .build()
        .unwrap();

    assert_eq!(plan.construction_order(), vec!["app::PgRepo", "app::Service"]);
    assert_eq!(plan.hook_order(), vec!["app::serve", "app::logging"]);

    let source = plan.emit(SourceEmitter::new()).unwrap();
    assert!(source.contains("pub mod app {"));
    assert!(source.contains("pub fn bootstrap(args: Vec<String>)"));
}

#[test]
fn stalled_resolution_reports_everything_unresolved() {
    let err = PlanBuilder::new()
        .add_component(ComponentDescriptor::constructor(
            "app::A",
            vec![ParameterRequirement::of("app::B")],
        ))
        .add_component(ComponentDescriptor::constructor(
            "app::B",
            vec![ParameterRequirement::of("app::A")],
        ))
        .add_component(ComponentDescriptor::constructor(
            "app::C",
            vec![ParameterRequirement::of("app::Z")],
        ))
        .add_component(ComponentDescriptor::constructor("app::D", vec![]))
        .build()
        .unwrap_err();

    let err = match err {
        ResolveError::DependencyResolve(err) => err,
        other => panic!("expected a dependency error, got {other:?}"),
    };
    assert_eq!(
        err.unresolved_types(),
        vec![
            &TypeName::new("app::A"),
            &TypeName::new("app::B"),
            &TypeName::new("app::C")
        ]
    );

    let message = err.to_string();
    assert!(message.starts_with("Unsatisfied dependency (possible circular dependency), 3 unresolved:"));
    assert!(message.contains("app::A -> app::B -> app::A"));
    assert!(message.contains("'app::C' needs 'app::Z' but no component provides it"));
}

#[test]
fn member_hooks_run_on_every_instance() {
    let plan = PlanBuilder::new()
        .add_component(ComponentDescriptor::constructor("app::Pool", vec![]).qualified("primary"))
        .add_component(ComponentDescriptor::constructor("app::Pool", vec![]).qualified("replica"))
        .add_component(ComponentDescriptor::constructor("app::Pool", vec![]).non_singleton())
        .add_hook(HookDescriptor::member(
            "app::Pool",
            "warm_up",
            vec![ParameterRequirement::of(TypeName::new("wirebuild::ApplicationContext"))],
        ))
        .build()
        .unwrap();

    let owners: Vec<_> = plan.hooks.iter().map(|step: &HookStep| step.owner).collect();
    assert_eq!(
        owners,
        vec![
            Some(ProducerHandle::Component(0)),
            Some(ProducerHandle::Component(1))
        ]
    );
    assert!(plan.warnings.is_empty());
}
