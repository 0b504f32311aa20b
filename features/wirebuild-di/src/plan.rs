use std::fmt;

use wirebuild_config::OutputTarget;

use crate::{
    descriptor::ComponentKind,
    emit::PlanEmitter,
    registry::{Injection, ProducerHandle},
    types::{Qualifier, TypeName},
};

/// Construct one component from already produced values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionStep {
    /// Handle the constructed value (or provider) is bound to
    pub handle: ProducerHandle,
    /// Name of the component descriptor
    pub component: String,
    pub produced_type: TypeName,
    pub qualifier: Option<Qualifier>,
    pub non_singleton: bool,
    /// One injection per parameter, in parameter order
    pub arguments: Vec<Injection>,
    pub kind: ComponentKind,
}

/// Argument handed to an init hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookArgument {
    /// The application context, always available to hooks
    Context,
    Injected(Injection),
}

/// Invoke one init hook, optionally bound to an owning instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookStep {
    pub hook: String,
    pub priority: i32,
    /// The instance the hook is called on, `None` for free functions
    pub owner: Option<ProducerHandle>,
    pub arguments: Vec<HookArgument>,
}

/// A non-fatal condition found while planning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanWarning {
    /// An init hook was declared on a type that never got a shared instance
    HookWithoutInstances { hook: String, owner: TypeName },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HookWithoutInstances { hook, owner } => write!(
                f,
                "Init hook '{hook}' found for type '{owner}', which has no singleton component instances"
            ),
        }
    }
}

/// The fixed construction plan produced by a resolution run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Passed through to emitters untouched
    pub output: OutputTarget,
    /// Construction steps in construction order
    pub constructions: Vec<ConstructionStep>,
    /// Hook invocations in invocation order
    pub hooks: Vec<HookStep>,
    pub warnings: Vec<PlanWarning>,
    /// Backlog sweeps needed after the forward pass
    pub sweeps: usize,
}

impl BuildPlan {
    /// Component names in construction order
    pub fn construction_order(&self) -> Vec<&str> {
        self.constructions
            .iter()
            .map(|step| step.component.as_str())
            .collect()
    }

    /// Hook names in invocation order, one entry per invocation
    pub fn hook_order(&self) -> Vec<&str> {
        self.hooks.iter().map(|step| step.hook.as_str()).collect()
    }

    pub fn construction(&self, handle: ProducerHandle) -> Option<&ConstructionStep> {
        self.constructions.iter().find(|step| step.handle == handle)
    }

    /// Hands all steps to `emitter`, constructions first, then hooks
    pub fn emit<E: PlanEmitter>(&self, mut emitter: E) -> Result<E::Output, E::Error> {
        emitter.begin(&self.output)?;
        for step in &self.constructions {
            emitter.construct(step)?;
        }
        for step in &self.hooks {
            emitter.invoke(step)?;
        }
        emitter.finish()
    }
}
