use std::{cmp::Ordering, fmt, str::FromStr};

use crate::{
    errors::{OptionError, UnknownVariant},
    provider::OptionsProvider,
};

/// Keys of all options read by [`ProcessorConfig::from_options`]
pub mod keys {
    pub const ENABLED: &str = "wirebuild.di.enabled";
    pub const MODULE: &str = "wirebuild.di.module";
    pub const FUNCTION: &str = "wirebuild.di.function";
    pub const MATCHING: &str = "wirebuild.di.matching";
    pub const HOOK_ORDER: &str = "wirebuild.di.hookOrder";
    pub const CONTEXT_TYPE: &str = "wirebuild.di.contextType";
    pub const CLASSES: &str = "wirebuild.di.classes";
    pub const MEMBERS: &str = "wirebuild.di.members";
    pub const INITS: &str = "wirebuild.di.inits";
}

pub const DEFAULT_MODULE: &str = "wirebuild";
pub const DEFAULT_FUNCTION: &str = "main";
pub const DEFAULT_CONTEXT_TYPE: &str = "wirebuild::ApplicationContext";

/// How a parameter requirement is matched against registered producers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchingMode {
    /// Only producers of the exact required type match
    #[default]
    Exact,
    /// Falls back to producers of a registered subtype when no exact producer exists
    Supertype,
}

impl FromStr for MatchingMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "supertype" => Ok(Self::Supertype),
            _ => Err(UnknownVariant {
                expected: "exact, supertype",
                found: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MatchingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Supertype => f.write_str("supertype"),
        }
    }
}

/// Order in which init hooks are invoked, based on their priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HookOrder {
    /// The higher the priority, the earlier the hook is invoked
    #[default]
    Descending,
    /// The lower the priority, the earlier the hook is invoked
    Ascending,
}

impl HookOrder {
    /// Compares two priorities, `Less` means `a` runs before `b`
    pub fn compare(self, a: i32, b: i32) -> Ordering {
        match self {
            Self::Descending => b.cmp(&a),
            Self::Ascending => a.cmp(&b),
        }
    }
}

impl FromStr for HookOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "descending" | "desc" => Ok(Self::Descending),
            "ascending" | "asc" => Ok(Self::Ascending),
            _ => Err(UnknownVariant {
                expected: "descending, ascending",
                found: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HookOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descending => f.write_str("descending"),
            Self::Ascending => f.write_str("ascending"),
        }
    }
}

/// Where the emitted bootstrap code lives, passed through to emitters untouched
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputTarget {
    pub module: String,
    pub function: String,
}

impl OutputTarget {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE, DEFAULT_FUNCTION)
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.function)
    }
}

/// Typed configuration of the dependency injection processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub enabled: bool,
    pub output: OutputTarget,
    pub matching: MatchingMode,
    pub hook_order: HookOrder,
    /// Type identity of the context handed to init hooks
    pub context_type: String,
    /// Component classes contributed by libraries
    pub extra_classes: Vec<String>,
    /// Component functions contributed by libraries
    pub extra_members: Vec<String>,
    /// Init hooks contributed by libraries
    pub extra_inits: Vec<String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: OutputTarget::default(),
            matching: MatchingMode::default(),
            hook_order: HookOrder::default(),
            context_type: DEFAULT_CONTEXT_TYPE.to_string(),
            extra_classes: Vec::new(),
            extra_members: Vec::new(),
            extra_inits: Vec::new(),
        }
    }
}

impl ProcessorConfig {
    /// Reads the configuration from processor options, any unset option keeps its default
    pub fn from_options(options: &OptionsProvider) -> Result<Self, OptionError> {
        let defaults = Self::default();

        let config = Self {
            enabled: options.get_flag(keys::ENABLED)?.unwrap_or(defaults.enabled),
            output: OutputTarget {
                module: non_empty(options.get(keys::MODULE)).unwrap_or(defaults.output.module),
                function: non_empty(options.get(keys::FUNCTION))
                    .unwrap_or(defaults.output.function),
            },
            matching: options
                .get_parsed(keys::MATCHING)?
                .unwrap_or(defaults.matching),
            hook_order: options
                .get_parsed(keys::HOOK_ORDER)?
                .unwrap_or(defaults.hook_order),
            context_type: non_empty(options.get(keys::CONTEXT_TYPE))
                .unwrap_or(defaults.context_type),
            extra_classes: options.get_list(keys::CLASSES)?,
            extra_members: options.get_list(keys::MEMBERS)?,
            extra_inits: options.get_list(keys::INITS)?,
        };

        tracing::debug!(
            "Processor config: enabled={}, output={}, matching={}, hook order={}",
            config.enabled,
            config.output,
            config.matching,
            config.hook_order
        );

        Ok(config)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
