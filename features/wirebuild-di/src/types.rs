use std::{
    any::{type_name, Any},
    fmt,
    sync::Arc,
};

/// All errors raised by user supplied factories and hooks
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Qualifier under which the program arguments are registered
pub const ARGS_QUALIFIER: &str = "args";

/// Type identity of the raw program arguments, available to every component.
///
/// Same identity as `TypeName::of::<Vec<String>>()`, the type the arguments are stored as.
pub fn args_type() -> TypeName {
    TypeName::of::<Vec<String>>()
}

/// Identity of a type as reported by the scanner, usually its fully qualified path.
///
/// Equality is the only operation the resolver relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Type name of a Rust type, as given by [`std::any::type_name`]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(type_name::<T>())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Name disambiguating several producers of the same type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qualifier(Arc<str>);

impl Qualifier {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Qualifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Qualifier {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Anything stored in an [`ApplicationContext`](crate::context::ApplicationContext)
/// must be shareable between threads and have a static lifetime
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A constructed component instance
#[derive(Clone)]
pub struct Instance {
    pub type_name: &'static str,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Instance {
            type_name: type_name::<T>(),
            instance: Arc::new(instance),
        }
    }

    /// Downcasts to the concrete type, returning the actual type name on mismatch
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.type_name),
        }
    }

    pub fn is<T: Injectable>(&self) -> bool {
        self.instance.is::<T>()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance").field(&self.type_name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_compare_by_value() {
        assert_eq!(TypeName::new("app::Repo"), TypeName::from("app::Repo"));
        assert_ne!(TypeName::new("app::Repo"), TypeName::new("app::Service"));
        assert_eq!(TypeName::of::<Vec<u8>>().as_str(), type_name::<Vec<u8>>());
    }

    #[test]
    fn instance_downcast() {
        let instance = Instance::new(String::from("hello"));

        assert!(instance.is::<String>());
        assert_eq!(*instance.downcast::<String>().unwrap(), "hello");
        assert_eq!(instance.downcast::<u32>().unwrap_err(), type_name::<String>());
    }
}
