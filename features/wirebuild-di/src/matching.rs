use std::collections::{HashMap, HashSet};

use crate::{
    descriptor::ParameterRequirement,
    registry::{Producer, TypeRegistry},
    types::{Qualifier, TypeName},
};

/// Decides which registered producer satisfies a parameter requirement.
///
/// The strategy is fixed when the resolver is built, so a run always matches
/// the same way.
pub trait MatchStrategy {
    /// Finds the producer satisfying `requirement`, if any
    fn find<'r>(
        &self,
        registry: &'r TypeRegistry,
        requirement: &ParameterRequirement,
    ) -> Option<&'r Producer>;

    /// Could a producer of `offered` with `qualifier` ever satisfy `requirement`
    fn accepts(
        &self,
        offered: &TypeName,
        qualifier: Option<&Qualifier>,
        requirement: &ParameterRequirement,
    ) -> bool;
}

/// Only producers of the exact required type match
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl MatchStrategy for ExactMatch {
    fn find<'r>(
        &self,
        registry: &'r TypeRegistry,
        requirement: &ParameterRequirement,
    ) -> Option<&'r Producer> {
        registry.lookup(
            &requirement.type_name,
            requirement.exact_qualifier.as_ref(),
        )
    }

    fn accepts(
        &self,
        offered: &TypeName,
        qualifier: Option<&Qualifier>,
        requirement: &ParameterRequirement,
    ) -> bool {
        *offered == requirement.type_name && qualifier_matches(qualifier, requirement)
    }
}

/// Declared supertypes of each known type
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    supertypes: HashMap<TypeName, Vec<TypeName>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the direct supertypes of `type_name`
    pub fn declare(
        &mut self,
        type_name: impl Into<TypeName>,
        supertypes: impl IntoIterator<Item = impl Into<TypeName>>,
    ) -> &mut Self {
        self.supertypes
            .entry(type_name.into())
            .or_default()
            .extend(supertypes.into_iter().map(Into::into));
        self
    }

    /// Is `ancestor` reachable from `type_name` through declared supertypes.
    ///
    /// A type is not its own subtype here.
    pub fn is_subtype_of(&self, type_name: &TypeName, ancestor: &TypeName) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![type_name];

        while let Some(current) = stack.pop() {
            for supertype in self.supertypes.get(current).into_iter().flatten() {
                if supertype == ancestor {
                    return true;
                }
                if visited.insert(supertype) {
                    stack.push(supertype);
                }
            }
        }

        false
    }
}

/// Matches exact types first, then walks the registered types in registration
/// order for one whose supertypes include the required type
#[derive(Debug, Clone, Default)]
pub struct SupertypeMatch {
    hierarchy: TypeHierarchy,
}

impl SupertypeMatch {
    pub fn new(hierarchy: TypeHierarchy) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }
}

impl MatchStrategy for SupertypeMatch {
    fn find<'r>(
        &self,
        registry: &'r TypeRegistry,
        requirement: &ParameterRequirement,
    ) -> Option<&'r Producer> {
        if let Some(producer) = ExactMatch.find(registry, requirement) {
            return Some(producer);
        }

        let qualifier = requirement.exact_qualifier.as_ref();
        registry
            .types()
            .filter(|(type_name, _)| {
                self.hierarchy
                    .is_subtype_of(type_name, &requirement.type_name)
            })
            .find_map(|(_, producers)| producers.iter().find(|p| p.accepts(qualifier)))
    }

    fn accepts(
        &self,
        offered: &TypeName,
        qualifier: Option<&Qualifier>,
        requirement: &ParameterRequirement,
    ) -> bool {
        (*offered == requirement.type_name
            || self.hierarchy.is_subtype_of(offered, &requirement.type_name))
            && qualifier_matches(qualifier, requirement)
    }
}

fn qualifier_matches(qualifier: Option<&Qualifier>, requirement: &ParameterRequirement) -> bool {
    match &requirement.exact_qualifier {
        Some(required) => qualifier == Some(required),
        None => true,
    }
}
