/// Errors when reading a processor option
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// The option is set, but its value can't be parsed
    #[error("Option '{key}' has an invalid value '{value}': {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
    /// A list option is not valid base64 encoded UTF-8
    #[error("Option '{key}' is not a base64 encoded list")]
    Undecodable { key: String },
}

/// Error when parsing one of the option enums from a string
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown value '{found}', expected one of: {expected}")]
pub struct UnknownVariant {
    pub expected: &'static str,
    pub found: String,
}
