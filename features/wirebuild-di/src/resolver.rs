use wirebuild_config::{
    config::DEFAULT_CONTEXT_TYPE, HookOrder, MatchingMode, OutputTarget, ProcessorConfig,
};

use crate::{
    dependency_graph::DependencyGraph,
    descriptor::{ComponentDescriptor, ParameterRequirement},
    errors::{DependencyResolveError, ResolveError, Unresolved},
    hooks::{HookDescriptor, HookOrderer},
    matching::{ExactMatch, MatchStrategy, SupertypeMatch, TypeHierarchy},
    plan::{BuildPlan, ConstructionStep},
    registry::{Injection, ProducerHandle, TypeRegistry},
    types::TypeName,
};

/// Resolves component descriptors into a [`BuildPlan`].
///
/// Components are first tried in scan order. Everything with an unresolvable
/// parameter goes to a backlog, which is swept in insertion order until it is
/// empty. A sweep that resolves nothing fails the whole run.
///
/// A resolver is not tied to one run: every call to [`Resolver::resolve`]
/// starts from a fresh registry, and the same input always yields the same plan.
pub struct Resolver {
    strategy: Box<dyn MatchStrategy>,
    hook_order: HookOrder,
    context_type: TypeName,
    output: OutputTarget,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Exact type matching and descending hook priorities
    pub fn new() -> Self {
        Resolver {
            strategy: Box::new(ExactMatch),
            hook_order: HookOrder::default(),
            context_type: TypeName::new(DEFAULT_CONTEXT_TYPE),
            output: OutputTarget::default(),
        }
    }

    /// Builds a resolver from the processor configuration.
    ///
    /// `hierarchy` is only used when the config asks for supertype matching.
    pub fn from_config(config: &ProcessorConfig, hierarchy: TypeHierarchy) -> Self {
        let strategy: Box<dyn MatchStrategy> = match config.matching {
            MatchingMode::Exact => Box::new(ExactMatch),
            MatchingMode::Supertype => Box::new(SupertypeMatch::new(hierarchy)),
        };

        Resolver {
            strategy,
            hook_order: config.hook_order,
            context_type: TypeName::new(&config.context_type),
            output: config.output.clone(),
        }
    }

    pub fn with_strategy(mut self, strategy: impl MatchStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn with_hook_order(mut self, hook_order: HookOrder) -> Self {
        self.hook_order = hook_order;
        self
    }

    pub fn with_context_type(mut self, context_type: impl Into<TypeName>) -> Self {
        self.context_type = context_type.into();
        self
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    /// Resolves all components, then orders and binds all init hooks
    pub fn resolve(
        &self,
        components: &[ComponentDescriptor],
        hooks: &[HookDescriptor],
    ) -> Result<BuildPlan, ResolveError> {
        let ResolvedComponents {
            registry,
            constructions,
            sweeps,
        } = self.resolve_components(components)?;

        let (hooks, warnings) = HookOrderer {
            registry: &registry,
            strategy: self.strategy.as_ref(),
            order: self.hook_order,
            context_type: &self.context_type,
        }
        .order(hooks)?;

        tracing::info!(
            "Created build plan for {} with {} components and {} init hook calls",
            self.output,
            constructions.len(),
            hooks.len()
        );

        Ok(BuildPlan {
            output: self.output.clone(),
            constructions,
            hooks,
            warnings,
            sweeps,
        })
    }

    /// Runs the forward pass and the backlog sweeps over `components`
    pub fn resolve_components(
        &self,
        components: &[ComponentDescriptor],
    ) -> Result<ResolvedComponents, DependencyResolveError> {
        let mut run = ResolutionRun {
            registry: TypeRegistry::new(),
            constructions: Vec::with_capacity(components.len()),
            strategy: self.strategy.as_ref(),
        };

        tracing::debug!("Resolving {} components", components.len());

        let mut backlog = Vec::new();
        for descriptor in components {
            if let Err(missing) = run.try_resolve(descriptor) {
                tracing::debug!(
                    "Adding {descriptor} to backlog (unknown parameter {})",
                    missing[0]
                );
                backlog.push(descriptor);
            }
        }

        let mut sweeps = 0;
        while !backlog.is_empty() {
            sweeps += 1;
            tracing::debug!("Sweep {sweeps} over {} backlog entries", backlog.len());

            let mut still_pending = Vec::with_capacity(backlog.len());
            for descriptor in &backlog {
                if run.try_resolve(descriptor).is_err() {
                    still_pending.push(*descriptor);
                }
            }

            if still_pending.len() == backlog.len() {
                return Err(run.stalled(&still_pending));
            }

            backlog = still_pending;
        }

        Ok(ResolvedComponents {
            registry: run.registry,
            constructions: run.constructions,
            sweeps,
        })
    }
}

/// Outcome of the component pass, before hooks are ordered
#[derive(Debug, Clone)]
pub struct ResolvedComponents {
    /// The final registry, nothing is registered after this point
    pub registry: TypeRegistry,
    pub constructions: Vec<ConstructionStep>,
    pub sweeps: usize,
}

struct ResolutionRun<'s> {
    registry: TypeRegistry,
    constructions: Vec<ConstructionStep>,
    strategy: &'s dyn MatchStrategy,
}

impl ResolutionRun<'_> {
    /// Resolves all parameters of `descriptor` or nothing.
    ///
    /// On success the component is registered and its construction step appended.
    fn try_resolve(
        &mut self,
        descriptor: &ComponentDescriptor,
    ) -> Result<ProducerHandle, Vec<ParameterRequirement>> {
        let arguments = self.bind(descriptor)?;

        let handle = ProducerHandle::Component(self.constructions.len());
        self.registry.register(
            descriptor.produced_type.clone(),
            handle,
            descriptor.non_singleton,
            descriptor.qualifier.clone(),
        );
        self.constructions.push(ConstructionStep {
            handle,
            component: descriptor.name.clone(),
            produced_type: descriptor.produced_type.clone(),
            qualifier: descriptor.qualifier.clone(),
            non_singleton: descriptor.non_singleton,
            arguments,
            kind: descriptor.kind.clone(),
        });

        tracing::info!("Processed {descriptor} as {handle}");
        Ok(handle)
    }

    /// Looks up every parameter, returning all the missing ones on failure
    fn bind(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Vec<Injection>, Vec<ParameterRequirement>> {
        let mut arguments = Vec::with_capacity(descriptor.parameters.len());
        let mut missing = Vec::new();

        for parameter in &descriptor.parameters {
            match self.strategy.find(&self.registry, parameter) {
                Some(producer) => arguments.push(producer.injection()),
                None => missing.push(parameter.clone()),
            }
        }

        if missing.is_empty() {
            Ok(arguments)
        } else {
            Err(missing)
        }
    }

    fn stalled(&self, pending: &[&ComponentDescriptor]) -> DependencyResolveError {
        tracing::error!(
            "Resolution stalled with {} components in backlog",
            pending.len()
        );

        let unresolved = pending
            .iter()
            .map(|descriptor| Unresolved::Component {
                name: descriptor.name.clone(),
                produced_type: descriptor.produced_type.clone(),
                qualifier: descriptor.qualifier.clone(),
                missing: self.bind(descriptor).err().unwrap_or_default(),
            })
            .collect();

        let causes = DependencyGraph::new(pending, &self.registry, self.strategy).check();

        DependencyResolveError { unresolved, causes }
    }
}
