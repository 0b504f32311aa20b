use wirebuild_config::HookOrder;

use crate::{
    descriptor::ParameterRequirement,
    errors::{DependencyResolveError, HookShapeError, ResolveError, Unresolved},
    matching::MatchStrategy,
    plan::{HookArgument, HookStep, PlanWarning},
    registry::TypeRegistry,
    types::TypeName,
};

/// Predefined init hook priorities, the higher it is, the earlier the hook is invoked
pub mod priority {
    pub const LOW: i32 = -1;
    pub const NORMAL: i32 = 0;
    pub const HIGH: i32 = 1;
    /// For hooks blocking the main thread, e.g. starting a server
    pub const BLOCKING: i32 = -20;
    /// Used for registering internal shutdown hooks
    pub const INTERNAL_LOW: i32 = -10;
    /// Used for initializing loggers
    pub const INTERNAL_HIGH: i32 = 10;
}

/// What an init hook is called on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HookOwner {
    /// A free function
    Free,
    /// A method, called on every singleton instance of the type
    Member(TypeName),
}

/// A function to run once all components are constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookDescriptor {
    /// Function path for free hooks, `Type::method` for members
    pub name: String,
    pub priority: i32,
    pub owner: HookOwner,
    pub parameters: Vec<ParameterRequirement>,
}

impl HookDescriptor {
    pub fn free(name: impl Into<String>, parameters: Vec<ParameterRequirement>) -> Self {
        Self {
            name: name.into(),
            priority: priority::NORMAL,
            owner: HookOwner::Free,
            parameters,
        }
    }

    pub fn member(
        owner: impl Into<TypeName>,
        method: &str,
        parameters: Vec<ParameterRequirement>,
    ) -> Self {
        let owner = owner.into();
        Self {
            name: format!("{owner}::{method}"),
            priority: priority::NORMAL,
            owner: HookOwner::Member(owner),
            parameters,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Orders init hooks and binds them against the final registry
pub(crate) struct HookOrderer<'a> {
    pub registry: &'a TypeRegistry,
    pub strategy: &'a dyn MatchStrategy,
    pub order: HookOrder,
    pub context_type: &'a TypeName,
}

impl HookOrderer<'_> {
    /// Sorts `hooks` by priority and emits one step per invocation.
    ///
    /// Equal priorities keep their declaration order.
    pub fn order(
        &self,
        hooks: &[HookDescriptor],
    ) -> Result<(Vec<HookStep>, Vec<PlanWarning>), ResolveError> {
        let mut sorted: Vec<&HookDescriptor> = hooks.iter().collect();
        sorted.sort_by(|a, b| self.order.compare(a.priority, b.priority));

        let mut steps = Vec::new();
        let mut warnings = Vec::new();
        let mut unresolved = Vec::new();

        for hook in sorted {
            match &hook.owner {
                HookOwner::Free => match self.bind_arguments(&hook.parameters) {
                    Ok(arguments) => steps.push(HookStep {
                        hook: hook.name.clone(),
                        priority: hook.priority,
                        owner: None,
                        arguments,
                    }),
                    Err(missing) => unresolved.push(Unresolved::Hook {
                        hook: hook.name.clone(),
                        owner: None,
                        missing,
                    }),
                },
                HookOwner::Member(owner) => {
                    let arguments = self.member_arguments(hook, owner)?;

                    let instances: Vec<_> = self.registry.singletons_of(owner).collect();
                    if instances.is_empty() {
                        let warning = PlanWarning::HookWithoutInstances {
                            hook: hook.name.clone(),
                            owner: owner.clone(),
                        };
                        tracing::warn!("{warning}");
                        warnings.push(warning);
                        continue;
                    }

                    for instance in instances {
                        steps.push(HookStep {
                            hook: hook.name.clone(),
                            priority: hook.priority,
                            owner: Some(instance),
                            arguments: arguments.clone(),
                        });
                    }
                }
            }
        }

        if !unresolved.is_empty() {
            return Err(DependencyResolveError {
                unresolved,
                causes: Vec::new(),
            }
            .into());
        }

        tracing::debug!("Ordered {} init hook invocations", steps.len());
        Ok((steps, warnings))
    }

    /// Resolves every parameter.
    ///
    /// The context is available to a single parameter, a repeated context
    /// parameter is reported as missing.
    fn bind_arguments(
        &self,
        parameters: &[ParameterRequirement],
    ) -> Result<Vec<HookArgument>, Vec<ParameterRequirement>> {
        let mut arguments = Vec::with_capacity(parameters.len());
        let mut missing = Vec::new();
        let mut context_bound = false;

        for parameter in parameters {
            if self.is_context(parameter) {
                if context_bound {
                    missing.push(parameter.clone());
                } else {
                    context_bound = true;
                    arguments.push(HookArgument::Context);
                }
                continue;
            }
            match self.strategy.find(self.registry, parameter) {
                Some(producer) => arguments.push(HookArgument::Injected(producer.injection())),
                None => missing.push(parameter.clone()),
            }
        }

        if missing.is_empty() {
            Ok(arguments)
        } else {
            Err(missing)
        }
    }

    /// Member hooks accept nothing, or only the context
    fn member_arguments(
        &self,
        hook: &HookDescriptor,
        owner: &TypeName,
    ) -> Result<Vec<HookArgument>, HookShapeError> {
        match hook.parameters.as_slice() {
            [] => Ok(Vec::new()),
            [parameter] if self.is_context(parameter) => Ok(vec![HookArgument::Context]),
            parameters => Err(HookShapeError {
                hook: hook.name.clone(),
                owner: owner.clone(),
                context_type: self.context_type.clone(),
                found: parameters.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    fn is_context(&self, parameter: &ParameterRequirement) -> bool {
        parameter.type_name == *self.context_type
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{
        matching::ExactMatch,
        registry::{Injection, ProducerHandle},
    };

    const CONTEXT: &str = "wirebuild::ApplicationContext";

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register("app::Repo".into(), ProducerHandle::Component(0), false, None);
        registry.register("app::Repo".into(), ProducerHandle::Component(1), false, Some("replica".into()));
        registry.register("app::Conn".into(), ProducerHandle::Component(2), true, None);
        registry
    }

    fn order(
        registry: &TypeRegistry,
        hook_order: HookOrder,
        hooks: &[HookDescriptor],
    ) -> Result<(Vec<HookStep>, Vec<PlanWarning>), ResolveError> {
        let context_type = TypeName::new(CONTEXT);
        HookOrderer {
            registry,
            strategy: &ExactMatch,
            order: hook_order,
            context_type: &context_type,
        }
        .order(hooks)
    }

    fn priorities(steps: &[HookStep]) -> Vec<i32> {
        steps.iter().map(|s| s.priority).collect()
    }

    #[rstest]
    #[case(HookOrder::Descending, vec![10, 5, -1])]
    #[case(HookOrder::Ascending, vec![-1, 5, 10])]
    fn hooks_sort_by_priority(#[case] hook_order: HookOrder, #[case] expected: Vec<i32>) {
        let hooks: Vec<_> = [5, -1, 10]
            .into_iter()
            .map(|p| HookDescriptor::free(format!("app::hook{p}"), vec![]).with_priority(p))
            .collect();

        let (steps, warnings) = order(&registry(), hook_order, &hooks).unwrap();

        assert_eq!(priorities(&steps), expected);
        assert!(warnings.is_empty());
    }

    #[test]
    fn equal_priorities_keep_declaration_order() {
        let hooks = vec![
            HookDescriptor::free("app::first", vec![]),
            HookDescriptor::free("app::urgent", vec![]).with_priority(priority::INTERNAL_HIGH),
            HookDescriptor::free("app::second", vec![]),
        ];

        let (steps, _) = order(&registry(), HookOrder::Descending, &hooks).unwrap();

        let names: Vec<_> = steps.iter().map(|s| s.hook.as_str()).collect();
        assert_eq!(names, vec!["app::urgent", "app::first", "app::second"]);
    }

    #[test]
    fn member_hooks_bind_to_every_singleton_instance() {
        let hooks = vec![HookDescriptor::member(
            "app::Repo",
            "migrate",
            vec![ParameterRequirement::of(CONTEXT)],
        )];

        let (steps, _) = order(&registry(), HookOrder::Descending, &hooks).unwrap();

        assert_eq!(
            steps,
            vec![
                HookStep {
                    hook: "app::Repo::migrate".to_string(),
                    priority: 0,
                    owner: Some(ProducerHandle::Component(0)),
                    arguments: vec![HookArgument::Context],
                },
                HookStep {
                    hook: "app::Repo::migrate".to_string(),
                    priority: 0,
                    owner: Some(ProducerHandle::Component(1)),
                    arguments: vec![HookArgument::Context],
                },
            ]
        );
    }

    #[test]
    fn member_hook_without_instances_is_skipped_with_warning() {
        let hooks = vec![
            HookDescriptor::member("app::Conn", "ping", vec![]),
            HookDescriptor::member("app::Unused", "start", vec![]),
        ];

        let (steps, warnings) = order(&registry(), HookOrder::Descending, &hooks).unwrap();

        assert!(steps.is_empty());
        assert_eq!(
            warnings,
            vec![
                PlanWarning::HookWithoutInstances {
                    hook: "app::Conn::ping".to_string(),
                    owner: TypeName::new("app::Conn"),
                },
                PlanWarning::HookWithoutInstances {
                    hook: "app::Unused::start".to_string(),
                    owner: TypeName::new("app::Unused"),
                },
            ]
        );
    }

    #[test]
    fn member_hook_shape_is_validated_without_instances() {
        let hooks = vec![HookDescriptor::member(
            "app::Unused",
            "start",
            vec![ParameterRequirement::of("app::Repo")],
        )];

        let err = order(&registry(), HookOrder::Descending, &hooks).unwrap_err();

        assert!(matches!(
            err,
            ResolveError::HookShape(HookShapeError { ref hook, ref found, .. })
                if hook == "app::Unused::start" && found == &vec!["app::Repo".to_string()]
        ));
    }

    #[test]
    fn free_hooks_resolve_parameters_against_registry() {
        let hooks = vec![HookDescriptor::free(
            "app::serve",
            vec![
                ParameterRequirement::of("app::Repo").exact("replica"),
                ParameterRequirement::of(CONTEXT),
                ParameterRequirement::of("app::Conn"),
            ],
        )];

        let (steps, _) = order(&registry(), HookOrder::Descending, &hooks).unwrap();

        assert_eq!(
            steps[0].arguments,
            vec![
                HookArgument::Injected(Injection::Shared(ProducerHandle::Component(1))),
                HookArgument::Context,
                HookArgument::Injected(Injection::Provider(ProducerHandle::Component(2))),
            ]
        );
    }

    #[test]
    fn unresolved_free_hook_parameters_are_fatal() {
        let hooks = vec![
            HookDescriptor::free("app::a", vec![ParameterRequirement::of("app::Missing")]),
            HookDescriptor::free("app::b", vec![]),
            HookDescriptor::free("app::c", vec![ParameterRequirement::of("app::Repo").exact("nope")]),
        ];

        let err = match order(&registry(), HookOrder::Descending, &hooks).unwrap_err() {
            ResolveError::DependencyResolve(err) => err,
            other => panic!("expected a dependency error, got {other:?}"),
        };
        let hooks: Vec<_> = err
            .unresolved
            .iter()
            .map(|u| match u {
                Unresolved::Hook { hook, .. } => hook.as_str(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(hooks, vec!["app::a", "app::c"]);
    }

    #[test]
    fn free_hooks_take_the_context_once() {
        let hooks = vec![HookDescriptor::free(
            "app::boot",
            vec![
                ParameterRequirement::named("first", CONTEXT),
                ParameterRequirement::named("second", CONTEXT),
            ],
        )];

        let err = match order(&registry(), HookOrder::Descending, &hooks).unwrap_err() {
            ResolveError::DependencyResolve(err) => err,
            other => panic!("expected a dependency error, got {other:?}"),
        };
        assert_eq!(
            err.unresolved,
            vec![Unresolved::Hook {
                hook: "app::boot".to_string(),
                owner: None,
                missing: vec![ParameterRequirement::named("second", CONTEXT)],
            }]
        );
        assert!(err.causes.is_empty());
    }
}
