use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::errors::OptionError;

/// A provider for all processor options.
///
/// Options are plain string key/value pairs, the same shape a build tool hands
/// to an annotation processor. Keys are matched case-insensitively and `_` is
/// treated like `.`, so `WIREBUILD_DI_MODULE` and `wirebuild.di.module` are the same key.
#[derive(Debug, Clone, Default)]
pub struct OptionsProvider {
    options: BTreeMap<String, String>,
}

impl OptionsProvider {
    /// Initializes an empty Options Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects all options from an iterator of key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut provider = Self::new();
        for (key, value) in pairs {
            provider.add_option(key.as_ref(), value);
        }
        provider
    }

    /// Collects all environment variables starting with `prefix`.
    ///
    /// The prefix is kept as part of the key, so `from_env("WIREBUILD_")` picks up
    /// `WIREBUILD_DI_HOOKORDER` as `wirebuild.di.hookorder`.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_vars(std::env::vars(), prefix)
    }

    /// Same as [`OptionsProvider::from_env`], with the variables passed in
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>, prefix: &str) -> Self {
        let prefix = normalize_key(prefix);
        let provider = Self::from_pairs(
            vars.into_iter()
                .filter(|(key, _)| normalize_key(key).starts_with(&prefix)),
        );
        tracing::debug!(
            "Loaded {} processor options with prefix '{prefix}'",
            provider.options.len()
        );
        provider
    }

    /// Add an option, replacing any previous value for the same key
    pub fn add_option(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.options.insert(normalize_key(key), value.into());
        self
    }

    /// Retrieve the raw value of an option
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(&normalize_key(key)).map(String::as_str)
    }

    /// Retrieve an option parsed into `T`.
    ///
    /// Returns `Ok(None)` if the option is not set, and an [`OptionError`] if
    /// it is set but can't be parsed.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, OptionError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| OptionError::Invalid {
                key: key.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    /// Retrieve a boolean option
    pub fn get_flag(&self, key: &str) -> Result<Option<bool>, OptionError> {
        self.get_parsed(key)
    }

    /// Retrieve a base64 encoded, comma separated list.
    ///
    /// A missing option and a list with only empty items both yield an empty list.
    pub fn get_list(&self, key: &str) -> Result<Vec<String>, OptionError> {
        let Some(value) = self.get(key) else {
            return Ok(Vec::new());
        };

        let undecodable = || OptionError::Undecodable {
            key: key.to_string(),
        };
        let decoded = STANDARD.decode(value.trim()).map_err(|_| undecodable())?;
        let decoded = String::from_utf8(decoded).map_err(|_| undecodable())?;

        let items: Vec<String> = decoded.split(',').map(|s| s.trim().to_string()).collect();
        if items.iter().all(String::is_empty) {
            return Ok(Vec::new());
        }

        Ok(items)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('_', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(list: &str) -> String {
        STANDARD.encode(list)
    }

    #[test]
    fn keys_are_normalized() {
        let mut options = OptionsProvider::new();
        options.add_option("wirebuild.di.hookOrder", "ascending");

        assert_eq!(options.get("WIREBUILD_DI_HOOKORDER"), Some("ascending"));
        assert_eq!(options.get("wirebuild.di.hookorder"), Some("ascending"));
        assert_eq!(options.get("wirebuild.di.module"), None);
    }

    #[test]
    fn from_vars_filters_by_prefix() {
        let vars = vec![
            ("WIREBUILD_DI_MODULE".to_string(), "app".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        let options = OptionsProvider::from_vars(vars, "WIREBUILD_");

        assert_eq!(options.len(), 1);
        assert_eq!(options.get("wirebuild.di.module"), Some("app"));
    }

    #[test]
    fn parsed_values_report_invalid_input() {
        let options = OptionsProvider::from_pairs([("flag", "yes"), ("count", " 3 ")]);

        assert_eq!(options.get_parsed::<u32>("count"), Ok(Some(3)));
        assert_eq!(options.get_flag("missing"), Ok(None));
        assert!(matches!(
            options.get_flag("flag"),
            Err(OptionError::Invalid { key, value, .. }) if key == "flag" && value == "yes"
        ));
    }

    #[test]
    fn lists_are_base64_decoded() {
        let options = OptionsProvider::from_pairs([
            ("classes", encode("app::Repo, app::Service")),
            ("empty", encode("")),
            ("blank", encode(" , ")),
            ("broken", "not base64!".to_string()),
        ]);

        assert_eq!(
            options.get_list("classes").unwrap(),
            vec!["app::Repo".to_string(), "app::Service".to_string()]
        );
        assert!(options.get_list("empty").unwrap().is_empty());
        assert!(options.get_list("blank").unwrap().is_empty());
        assert!(options.get_list("missing").unwrap().is_empty());
        assert_eq!(
            options.get_list("broken"),
            Err(OptionError::Undecodable {
                key: "broken".to_string()
            })
        );
    }
}
