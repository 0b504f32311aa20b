//! Wirebuild Config reads the options of the dependency injection processor.
//!
//! Wirebuild Config is split into two major parts:
//! 1. OptionsProvider: the raw key/value options handed over by the build tool
//! 2. ProcessorConfig: the typed configuration the resolver and emitters work with
//!
//! # Examples
//!
//! ```rust
//! use wirebuild_config::{keys, HookOrder, OptionsProvider, ProcessorConfig};
//!
//! let mut options = OptionsProvider::new();
//! options
//!     .add_option(keys::MODULE, "app")
//!     .add_option(keys::HOOK_ORDER, "ascending");
//!
//! let config = ProcessorConfig::from_options(&options).unwrap();
//!
//! assert_eq!(config.output.module, "app");
//! assert_eq!(config.hook_order, HookOrder::Ascending);
//! ```

pub mod config;
pub mod errors;
pub mod provider;

pub use config::{keys, HookOrder, MatchingMode, OutputTarget, ProcessorConfig};
pub use errors::{OptionError, UnknownVariant};
pub use provider::OptionsProvider;
