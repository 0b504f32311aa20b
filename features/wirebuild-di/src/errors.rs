use std::fmt;

use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphError,
    descriptor::ParameterRequirement,
    registry::ProducerHandle,
    types::{DynError, Qualifier, TypeName},
};

/// Any error that aborts a resolution run. No partial plan is produced.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error(transparent)]
    ConstructorSelection(#[from] ConstructorSelectionError),
    #[error(transparent)]
    DependencyResolve(#[from] DependencyResolveError),
    #[error(transparent)]
    HookShape(#[from] HookShapeError),
}

/// No unique injection constructor could be selected for a class
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No autowiring constructor found for '{type_name}': {candidates} eligible constructors, expected exactly one")]
pub struct ConstructorSelectionError {
    pub type_name: TypeName,
    pub candidates: usize,
}

/// An init hook declared on a component type has an invalid parameter list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Init hook '{hook}' on '{owner}' must accept zero parameters or only one of type '{context_type}', found {found:?}")]
pub struct HookShapeError {
    pub hook: String,
    pub owner: TypeName,
    pub context_type: TypeName,
    pub found: Vec<String>,
}

/// Something that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    Component {
        name: String,
        produced_type: TypeName,
        qualifier: Option<Qualifier>,
        missing: Vec<ParameterRequirement>,
    },
    Hook {
        hook: String,
        owner: Option<TypeName>,
        missing: Vec<ParameterRequirement>,
    },
}

impl Unresolved {
    /// The produced type of a component, or the owner type of a hook
    pub fn type_name(&self) -> Option<&TypeName> {
        match self {
            Self::Component { produced_type, .. } => Some(produced_type),
            Self::Hook { owner, .. } => owner.as_ref(),
        }
    }

    pub fn missing(&self) -> &[ParameterRequirement] {
        match self {
            Self::Component { missing, .. } | Self::Hook { missing, .. } => missing,
        }
    }
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = self
            .missing()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        match self {
            Self::Component {
                name,
                produced_type,
                qualifier,
                ..
            } => {
                write!(f, "component '{name}' producing '{produced_type}'")?;
                if let Some(qualifier) = qualifier {
                    write!(f, " (\"{qualifier}\")")?;
                }
            }
            Self::Hook { hook, owner, .. } => {
                write!(f, "init hook '{hook}'")?;
                if let Some(owner) = owner {
                    write!(f, " on '{owner}'")?;
                }
            }
        }
        write!(f, " is missing [{missing}]")
    }
}

/// Dependencies could not be satisfied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct DependencyResolveError {
    /// Everything left unresolved, in backlog order
    pub unresolved: Vec<Unresolved>,
    /// Root causes found by walking the unresolved dependency graph.
    /// Only filled for stalled components, never for unresolved init hooks.
    pub causes: Vec<DependencyGraphError>,
}

impl DependencyResolveError {
    /// Produced (or owner) types of everything left unresolved
    pub fn unresolved_types(&self) -> Vec<&TypeName> {
        self.unresolved
            .iter()
            .filter_map(Unresolved::type_name)
            .collect()
    }
}

impl fmt::Display for DependencyResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut display = Vec::new();
        display.push(format!(
            "Unsatisfied dependency (possible circular dependency), {} unresolved:",
            self.unresolved.len()
        ));
        for unresolved in &self.unresolved {
            display.push(format!("- {unresolved}"));
        }
        if !self.causes.is_empty() {
            display.push("Caused by:".to_string());
            for cause in &self.causes {
                display.push(format!("- {cause}"));
            }
        }
        f.write_str(&display.join("\n"))
    }
}

/// Errors while assembling an [`ApplicationContext`](crate::context::ApplicationContext) from a plan
#[derive(Error, Debug)]
pub enum AssembleError {
    /// No factory was registered for a component of the plan
    #[error("No factory registered for component '{0}'")]
    MissingFactory(String),
    /// No callback was registered for an init hook of the plan
    #[error("No callback registered for init hook '{0}'")]
    MissingHook(String),
    /// A step referenced a handle which was not produced before it
    #[error("Handle '{0}' was referenced before it was produced")]
    UnknownHandle(ProducerHandle),
    /// A Factory failed to build
    #[error("Factory for '{component}' failed - error: {error:?}")]
    FactoryFailed { component: String, error: DynError },
    /// An init hook failed
    #[error("Init hook '{hook}' failed - error: {error:?}")]
    HookFailed { hook: String, error: DynError },
}

/// Errors when requiring a type from an [`ApplicationContext`](crate::context::ApplicationContext)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequireError {
    /// No component of the required type exists
    #[error("No component of type '{0}' exists")]
    TypeMissing(&'static str),
}
