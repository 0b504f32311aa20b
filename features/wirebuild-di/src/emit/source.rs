use std::fmt::{self, Write};

use wirebuild_config::OutputTarget;

use crate::{
    descriptor::ComponentKind,
    emit::PlanEmitter,
    plan::{ConstructionStep, HookArgument, HookStep},
    registry::Injection,
};

const HEADER: &str =
    "// This file was generated by wirebuild. Do not edit, changes will be overwritten!";

/// Renders a plan as the source of a bootstrap function.
///
/// Every construction becomes one binding, non-singletons become provider
/// closures called at each injection site, and init hooks are collected into
/// a single `after_build` block.
#[derive(Debug, Default)]
pub struct SourceEmitter {
    out: String,
    hooks_open: bool,
}

impl SourceEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanEmitter for SourceEmitter {
    type Output = String;
    type Error = fmt::Error;

    fn begin(&mut self, target: &OutputTarget) -> Result<(), Self::Error> {
        writeln!(self.out, "{HEADER}")?;
        writeln!(self.out)?;
        writeln!(self.out, "pub mod {} {{", target.module)?;
        writeln!(
            self.out,
            "    pub fn {}(args: Vec<String>) -> wirebuild::ApplicationContext {{",
            target.function
        )?;
        writeln!(
            self.out,
            "        let mut context = wirebuild::ApplicationContext::builder();"
        )
    }

    fn construct(&mut self, step: &ConstructionStep) -> Result<(), Self::Error> {
        let arguments = step
            .arguments
            .iter()
            .map(render_injection)
            .collect::<Vec<_>>()
            .join(", ");

        let call = match &step.kind {
            ComponentKind::Constructor => format!("{}::new({arguments})", step.produced_type),
            ComponentKind::FactoryFunction { path } => format!("{path}({arguments})"),
        };

        let register = if step.non_singleton {
            "provider"
        } else {
            "component"
        };

        writeln!(
            self.out,
            "        let {} = context.{register}(move || {call});",
            step.handle
        )
    }

    fn invoke(&mut self, step: &HookStep) -> Result<(), Self::Error> {
        if !self.hooks_open {
            writeln!(self.out, "        context.after_build(move |context| {{")?;
            self.hooks_open = true;
        }

        let arguments = step
            .arguments
            .iter()
            .map(|argument| match argument {
                HookArgument::Context => "context".to_string(),
                HookArgument::Injected(injection) => render_injection(injection),
            })
            .collect::<Vec<_>>()
            .join(", ");

        match step.owner {
            Some(owner) => {
                let method = step.hook.rsplit("::").next().unwrap_or(&step.hook);
                writeln!(self.out, "            {owner}.{method}({arguments});")
            }
            None => writeln!(self.out, "            {}({arguments});", step.hook),
        }
    }

    fn finish(mut self) -> Result<Self::Output, Self::Error> {
        if self.hooks_open {
            writeln!(self.out, "        }});")?;
        }
        writeln!(self.out, "        context.build()")?;
        writeln!(self.out, "    }}")?;
        writeln!(self.out, "}}")?;
        Ok(self.out)
    }
}

fn render_injection(injection: &Injection) -> String {
    match injection {
        Injection::Shared(handle) => format!("{handle}.clone()"),
        Injection::Provider(handle) => format!("{handle}()"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        plan::BuildPlan,
        registry::ProducerHandle,
        types::{Qualifier, TypeName},
    };

    #[test]
    fn renders_bootstrap_function() {
        let plan = BuildPlan {
            output: OutputTarget::new("app", "bootstrap"),
            constructions: vec![
                ConstructionStep {
                    handle: ProducerHandle::Component(0),
                    component: "app::db::connect".to_string(),
                    produced_type: TypeName::new("app::Conn"),
                    qualifier: None,
                    non_singleton: true,
                    arguments: vec![Injection::Shared(ProducerHandle::Args)],
                    kind: ComponentKind::FactoryFunction {
                        path: "app::db::connect".to_string(),
                    },
                },
                ConstructionStep {
                    handle: ProducerHandle::Component(1),
                    component: "app::Repo".to_string(),
                    produced_type: TypeName::new("app::Repo"),
                    qualifier: Some(Qualifier::new("main")),
                    non_singleton: false,
                    arguments: vec![Injection::Provider(ProducerHandle::Component(0))],
                    kind: ComponentKind::Constructor,
                },
            ],
            hooks: vec![
                HookStep {
                    hook: "app::Repo::migrate".to_string(),
                    priority: 10,
                    owner: Some(ProducerHandle::Component(1)),
                    arguments: vec![HookArgument::Context],
                },
                HookStep {
                    hook: "app::serve".to_string(),
                    priority: -20,
                    owner: None,
                    arguments: vec![
                        HookArgument::Injected(Injection::Shared(ProducerHandle::Component(1))),
                        HookArgument::Context,
                    ],
                },
            ],
            warnings: vec![],
            sweeps: 0,
        };

        let source = plan.emit(SourceEmitter::new()).unwrap();

        assert_eq!(
            source,
            [
                HEADER,
                "",
                "pub mod app {",
                "    pub fn bootstrap(args: Vec<String>) -> wirebuild::ApplicationContext {",
                "        let mut context = wirebuild::ApplicationContext::builder();",
                "        let var0 = context.provider(move || app::db::connect(args.clone()));",
                "        let var1 = context.component(move || app::Repo::new(var0()));",
                "        context.after_build(move |context| {",
                "            var1.migrate(context);",
                "            app::serve(var1.clone(), context);",
                "        });",
                "        context.build()",
                "    }",
                "}",
                "",
            ]
            .join("\n")
        );
    }
}
