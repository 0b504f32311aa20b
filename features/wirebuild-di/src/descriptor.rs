use std::fmt;

use crate::{
    errors::ConstructorSelectionError,
    types::{Qualifier, TypeName},
};

/// How a component is constructed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Through a constructor of the produced type
    Constructor,
    /// Through a free factory function, identified by its path
    FactoryFunction { path: String },
}

/// A single dependency of a component or hook
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterRequirement {
    /// Parameter name, only used for diagnostics
    pub name: Option<String>,
    /// The required type
    pub type_name: TypeName,
    /// If set, only a producer with exactly this qualifier satisfies the parameter
    pub exact_qualifier: Option<Qualifier>,
}

impl ParameterRequirement {
    pub fn of(type_name: impl Into<TypeName>) -> Self {
        Self {
            name: None,
            type_name: type_name.into(),
            exact_qualifier: None,
        }
    }

    pub fn named(name: impl Into<String>, type_name: impl Into<TypeName>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::of(type_name)
        }
    }

    /// Requires the producer with the given qualifier
    pub fn exact(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.exact_qualifier = Some(qualifier.into());
        self
    }
}

impl fmt::Display for ParameterRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{}", self.type_name)?;
        if let Some(qualifier) = &self.exact_qualifier {
            write!(f, " @ \"{qualifier}\"")?;
        }
        Ok(())
    }
}

/// A resolvable component: something that produces one instance (or a provider) of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Display name of the component, the class name or the factory function path
    pub name: String,
    pub produced_type: TypeName,
    pub parameters: Vec<ParameterRequirement>,
    /// Produced through a provider invoked on each injection site instead of a shared instance
    pub non_singleton: bool,
    pub qualifier: Option<Qualifier>,
    pub kind: ComponentKind,
}

impl ComponentDescriptor {
    /// A component built by a constructor of `produced_type`
    pub fn constructor(
        produced_type: impl Into<TypeName>,
        parameters: Vec<ParameterRequirement>,
    ) -> Self {
        let produced_type = produced_type.into();
        Self {
            name: produced_type.to_string(),
            produced_type,
            parameters,
            non_singleton: false,
            qualifier: None,
            kind: ComponentKind::Constructor,
        }
    }

    /// A component built by calling the factory function at `path`
    pub fn factory(
        path: impl Into<String>,
        produced_type: impl Into<TypeName>,
        parameters: Vec<ParameterRequirement>,
    ) -> Self {
        let path = path.into();
        Self {
            name: path.clone(),
            produced_type: produced_type.into(),
            parameters,
            non_singleton: false,
            qualifier: None,
            kind: ComponentKind::FactoryFunction { path },
        }
    }

    pub fn non_singleton(mut self) -> Self {
        self.non_singleton = true;
        self
    }

    pub fn qualified(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Normalizes a scan result into a descriptor.
    ///
    /// Returns `Ok(None)` for components which are not accessible from the generated code.
    pub fn from_scanned(
        scanned: ScannedComponent,
    ) -> Result<Option<Self>, ConstructorSelectionError> {
        let ScannedComponent {
            accessible,
            non_singleton,
            qualifier,
            source,
        } = scanned;

        if !accessible {
            tracing::debug!("Skipping inaccessible component {}", source.name());
            return Ok(None);
        }

        let descriptor = match source {
            ScannedSource::Class {
                type_name,
                constructors,
            } => {
                let constructor = select_constructor(&type_name, constructors)?;
                Self::constructor(type_name, constructor.parameters)
            }
            ScannedSource::Function {
                path,
                return_type,
                parameters,
            } => Self::factory(path, return_type, parameters),
        };

        Ok(Some(Self {
            non_singleton,
            qualifier,
            ..descriptor
        }))
    }
}

impl fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.name != self.produced_type.as_str() {
            write!(f, " -> {}", self.produced_type)?;
        }
        if let Some(qualifier) = &self.qualifier {
            write!(f, " (\"{qualifier}\")")?;
        }
        Ok(())
    }
}

/// A constructor found while scanning a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedConstructor {
    pub parameters: Vec<ParameterRequirement>,
    /// Explicitly marked as the constructor to inject through
    pub autowired: bool,
    pub accessible: bool,
}

impl ScannedConstructor {
    pub fn new(parameters: Vec<ParameterRequirement>) -> Self {
        Self {
            parameters,
            autowired: false,
            accessible: true,
        }
    }

    pub fn autowired(mut self) -> Self {
        self.autowired = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.accessible = false;
        self
    }
}

/// Where a scanned component comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedSource {
    Class {
        type_name: TypeName,
        constructors: Vec<ScannedConstructor>,
    },
    Function {
        path: String,
        return_type: TypeName,
        parameters: Vec<ParameterRequirement>,
    },
}

impl ScannedSource {
    fn name(&self) -> &str {
        match self {
            Self::Class { type_name, .. } => type_name.as_str(),
            Self::Function { path, .. } => path,
        }
    }
}

/// A component as reported by the scanner, before constructor selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedComponent {
    pub accessible: bool,
    pub non_singleton: bool,
    pub qualifier: Option<Qualifier>,
    pub source: ScannedSource,
}

impl ScannedComponent {
    pub fn class(type_name: impl Into<TypeName>, constructors: Vec<ScannedConstructor>) -> Self {
        Self::from_source(ScannedSource::Class {
            type_name: type_name.into(),
            constructors,
        })
    }

    pub fn function(
        path: impl Into<String>,
        return_type: impl Into<TypeName>,
        parameters: Vec<ParameterRequirement>,
    ) -> Self {
        Self::from_source(ScannedSource::Function {
            path: path.into(),
            return_type: return_type.into(),
            parameters,
        })
    }

    fn from_source(source: ScannedSource) -> Self {
        Self {
            accessible: true,
            non_singleton: false,
            qualifier: None,
            source,
        }
    }

    pub fn private(mut self) -> Self {
        self.accessible = false;
        self
    }

    pub fn non_singleton(mut self) -> Self {
        self.non_singleton = true;
        self
    }

    pub fn qualified(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

/// Picks the constructor used for injection.
///
/// A single constructor is always used. Otherwise exactly one accessible
/// constructor must be marked as autowired.
pub fn select_constructor(
    type_name: &TypeName,
    mut constructors: Vec<ScannedConstructor>,
) -> Result<ScannedConstructor, ConstructorSelectionError> {
    if constructors.len() == 1 {
        return Ok(constructors.remove(0));
    }

    let mut eligible: Vec<ScannedConstructor> = constructors
        .into_iter()
        .filter(|c| c.autowired && c.accessible)
        .collect();

    if eligible.len() != 1 {
        return Err(ConstructorSelectionError {
            type_name: type_name.clone(),
            candidates: eligible.len(),
        });
    }

    Ok(eligible.remove(0))
}
