use std::fmt;

use indexmap::IndexMap;

use crate::types::{args_type, Qualifier, TypeName, ARGS_QUALIFIER};

/// Handle of a produced value in the build plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProducerHandle {
    /// The raw program arguments
    Args,
    /// The n-th constructed component
    Component(usize),
}

impl fmt::Display for ProducerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Args => f.write_str("args"),
            Self::Component(index) => write!(f, "var{index}"),
        }
    }
}

/// How a resolved producer reaches an injection site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Injection {
    /// The single shared instance
    Shared(ProducerHandle),
    /// A fresh instance, invoking the provider at this injection site
    Provider(ProducerHandle),
}

impl Injection {
    pub fn handle(&self) -> ProducerHandle {
        match self {
            Self::Shared(handle) | Self::Provider(handle) => *handle,
        }
    }
}

/// A registered producer of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Producer {
    pub handle: ProducerHandle,
    pub non_singleton: bool,
    pub qualifier: Option<Qualifier>,
}

impl Producer {
    /// Non-singletons are wrapped as providers
    pub fn injection(&self) -> Injection {
        if self.non_singleton {
            Injection::Provider(self.handle)
        } else {
            Injection::Shared(self.handle)
        }
    }

    /// Does this producer satisfy a requirement for `exact_qualifier`
    pub fn accepts(&self, exact_qualifier: Option<&Qualifier>) -> bool {
        match exact_qualifier {
            Some(required) => self.qualifier.as_ref() == Some(required),
            None => true,
        }
    }
}

/// Registry of all resolved producers, keyed by the type they produce.
///
/// The registry is append-only: producers are never removed or replaced, and
/// the producers of a type keep their registration order.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    producers: IndexMap<TypeName, Vec<Producer>>,
}

impl TypeRegistry {
    /// An empty registry, without the program arguments
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the program arguments under the `args` qualifier
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(
            args_type(),
            ProducerHandle::Args,
            false,
            Some(Qualifier::new(ARGS_QUALIFIER)),
        );
        registry
    }

    pub fn register(
        &mut self,
        type_name: TypeName,
        handle: ProducerHandle,
        non_singleton: bool,
        qualifier: Option<Qualifier>,
    ) {
        self.producers.entry(type_name).or_default().push(Producer {
            handle,
            non_singleton,
            qualifier,
        });
    }

    /// First producer of exactly `type_name` that carries `exact_qualifier`,
    /// or the first producer of `type_name` at all when no qualifier is required
    pub fn lookup(
        &self,
        type_name: &TypeName,
        exact_qualifier: Option<&Qualifier>,
    ) -> Option<&Producer> {
        self.producers(type_name)
            .iter()
            .find(|p| p.accepts(exact_qualifier))
    }

    /// Resolves a dependency by exact type
    pub fn resolve(
        &self,
        type_name: &TypeName,
        exact_qualifier: Option<&Qualifier>,
    ) -> Option<Injection> {
        self.lookup(type_name, exact_qualifier)
            .map(Producer::injection)
    }

    /// All producers of exactly `type_name`, in registration order
    pub fn producers(&self, type_name: &TypeName) -> &[Producer] {
        self.producers
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Handles of all shared (non-provider) instances of exactly `type_name`
    pub fn singletons_of<'a>(
        &'a self,
        type_name: &TypeName,
    ) -> impl Iterator<Item = ProducerHandle> + 'a {
        self.producers(type_name)
            .iter()
            .filter(|p| !p.non_singleton)
            .map(|p| p.handle)
    }

    /// All registered types with their producers, in order of first registration
    pub fn types(&self) -> impl Iterator<Item = (&TypeName, &[Producer])> {
        self.producers
            .iter()
            .map(|(type_name, producers)| (type_name, producers.as_slice()))
    }

    pub fn contains(&self, type_name: &TypeName) -> bool {
        self.producers.contains_key(type_name)
    }
}
