use std::{error::Error, sync::Arc};

use tracing_subscriber::EnvFilter;
use wirebuild_config::{OptionsProvider, ProcessorConfig};
use wirebuild_di::{
    priority, types::args_type, ApplicationContext, ComponentDescriptor, ContextAssembler,
    HookDescriptor, ParameterRequirement, PlanBuilder, Resolver, SourceEmitter, TypeHierarchy,
    TypeName,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = ProcessorConfig::from_options(&OptionsProvider::from_env("WIREBUILD_"))?;
    if !config.enabled {
        tracing::info!("Dependency injection is disabled, nothing to do");
        return Ok(());
    }
    config.context_type = TypeName::of::<ApplicationContext>().to_string();

    let plan = PlanBuilder::new()
        .with_resolver(Resolver::from_config(&config, TypeHierarchy::new()))
        .add_component(ComponentDescriptor::constructor(
            TypeName::of::<Controller>(),
            vec![
                ParameterRequirement::of(TypeName::of::<Service>()),
                ParameterRequirement::of(TypeName::of::<Repo>()),
            ],
        ))
        .add_component(ComponentDescriptor::constructor(
            TypeName::of::<Service>(),
            vec![ParameterRequirement::of(TypeName::of::<Settings>())],
        ))
        .add_component(ComponentDescriptor::constructor(TypeName::of::<Repo>(), vec![]))
        .add_component(ComponentDescriptor::factory(
            "settings_from_args",
            TypeName::of::<Settings>(),
            vec![ParameterRequirement::named("args", args_type()).exact("args")],
        ))
        .add_hook(
            HookDescriptor::free(
                "serve",
                vec![ParameterRequirement::of(TypeName::of::<Controller>())],
            )
            .with_priority(priority::BLOCKING),
        )
        .add_hook(HookDescriptor::member(
            TypeName::of::<Repo>(),
            "migrate",
            vec![ParameterRequirement::of(TypeName::of::<ApplicationContext>())],
        ))
        .build()?;

    for warning in &plan.warnings {
        println!("warning: {warning}");
    }
    println!("{}", plan.emit(SourceEmitter::new())?);

    let assembler = ContextAssembler::new(std::env::args().collect())
        .add_factory(TypeName::of::<Repo>().as_str(), |_| Ok(Repo))
        .add_factory("settings_from_args", |args| {
            let args = args.get::<Vec<String>>(0)?;
            Ok(Settings {
                name: args.first().cloned().unwrap_or_default(),
            })
        })
        .add_factory(TypeName::of::<Service>().as_str(), |args| {
            Ok(Service {
                settings: args.get(0)?,
            })
        })
        .add_factory(TypeName::of::<Controller>().as_str(), |args| {
            Ok(Controller {
                service: args.get(0)?,
                repo: args.get(1)?,
            })
        })
        .add_hook(format!("{}::migrate", TypeName::of::<Repo>()), |call| {
            let repo = call.owner::<Repo>()?;
            println!("Migrating {repo:?}, context holds {} components", call.context.len());
            Ok(())
        })
        .add_hook("serve", |call| {
            let controller = call.arguments.get::<Controller>(0)?;
            println!("Serving {controller:?}");
            Ok(())
        });

    let context = plan.emit(assembler)?;
    println!("{context:?}");
    Ok(())
}

#[derive(Debug)]
struct Repo;

#[derive(Debug)]
struct Settings {
    #[allow(dead_code)]
    name: String,
}

#[derive(Debug)]
struct Service {
    #[allow(dead_code)]
    settings: Arc<Settings>,
}

#[derive(Debug)]
struct Controller {
    #[allow(dead_code)]
    service: Arc<Service>,
    #[allow(dead_code)]
    repo: Arc<Repo>,
}
