use std::{collections::HashSet, fmt};

use thiserror::Error;

use crate::{
    descriptor::{ComponentDescriptor, ParameterRequirement},
    matching::MatchStrategy,
    registry::TypeRegistry,
};

/// Graph of the components left over after resolution stalled.
///
/// Used to tell a missing producer apart from a circular dependency.
pub struct DependencyGraph<'a> {
    entries: Vec<DependencyGraphEntry<'a>>,
}

struct DependencyGraphEntry<'a> {
    descriptor: &'a ComponentDescriptor,
    dependencies: Vec<Dependency>,
}

/// An unsatisfied parameter of a pending component
enum Dependency {
    /// Another pending component could provide it
    Pending(usize),
    /// Nothing registered or pending provides it
    Missing(ParameterRequirement),
}

impl<'a> DependencyGraph<'a> {
    /// Builds the graph of `pending` components on top of an already populated registry
    pub fn new(
        pending: &[&'a ComponentDescriptor],
        registry: &TypeRegistry,
        strategy: &dyn MatchStrategy,
    ) -> Self {
        let entries = pending
            .iter()
            .map(|&descriptor| {
                let dependencies = descriptor
                    .parameters
                    .iter()
                    .filter(|requirement| strategy.find(registry, requirement).is_none())
                    .map(|requirement| {
                        pending
                            .iter()
                            .position(|other| {
                                strategy.accepts(
                                    &other.produced_type,
                                    other.qualifier.as_ref(),
                                    requirement,
                                )
                            })
                            .map(Dependency::Pending)
                            .unwrap_or_else(|| Dependency::Missing(requirement.clone()))
                    })
                    .collect();

                DependencyGraphEntry {
                    descriptor,
                    dependencies,
                }
            })
            .collect();

        Self { entries }
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Vec<DependencyGraphError> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for index in 0..self.entries.len() {
            let mut dependency_chain = Vec::new();
            check_recurse(self, &mut checked, &mut errors, &mut dependency_chain, index);
        }

        return errors;

        fn check_recurse(
            graph: &DependencyGraph,
            checked: &mut HashSet<usize>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<usize>,
            index: usize,
        ) {
            // Circular Dependency Check
            if let Some(start) = dependency_chain.iter().position(|i| *i == index) {
                let chain = dependency_chain[start..]
                    .iter()
                    .chain(std::iter::once(&index))
                    .map(|i| graph.label(*i))
                    .collect::<Vec<_>>();

                errors.push(DependencyGraphError::CircularDependency {
                    from: graph.label(dependency_chain[start]),
                    to: graph.label(dependency_chain[dependency_chain.len() - 1]),
                    chain,
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(index) {
                return;
            }

            dependency_chain.push(index);

            for dependency in &graph.entries[index].dependencies {
                match dependency {
                    Dependency::Pending(next) => {
                        check_recurse(graph, checked, errors, dependency_chain, *next)
                    }
                    Dependency::Missing(requirement) => {
                        errors.push(DependencyGraphError::MissingDependency {
                            dependency: requirement.clone(),
                            required_by: graph.label(index),
                        })
                    }
                }
            }

            dependency_chain.pop();
        }
    }

    fn label(&self, index: usize) -> String {
        self.entries[index].descriptor.to_string()
    }
}

/// Root cause of a stalled resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but no component provides it")]
    MissingDependency {
        dependency: ParameterRequirement,
        required_by: String,
    },
    #[error("A circular dependency exists between '{from}' and '{to}' through {}", DisplayChain(.chain))]
    CircularDependency {
        from: String,
        to: String,
        chain: Vec<String>,
    },
}

struct DisplayChain<'a>(&'a [String]);

impl fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" -> "))
    }
}
