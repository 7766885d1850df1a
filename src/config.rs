use crate::parser::DEFAULT_MAX_ARGS;
use std::collections::HashMap;
use std::env as stdenv;

/// Environment variable overriding [`Config::max_args`].
pub const MAX_ARGS_VAR: &str = "CRABQL_MAX_ARGS";
/// Environment variable overriding [`Config::echo`]. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
pub const ECHO_VAR: &str = "CRABQL_ECHO";

/// Settings for a script run.
///
/// Built from defaults, then environment variables, then whatever the caller
/// (usually the command line) overrides on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on the number of arguments in one statement.
    pub max_args: usize,
    /// Write every executed statement to the output before its result.
    pub echo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_args: DEFAULT_MAX_ARGS,
            echo: false,
        }
    }
}

impl Config {
    /// Defaults overridden by the current process environment.
    pub fn from_env() -> Self {
        Self::from_vars(stdenv::vars())
    }

    /// Defaults overridden by the given variables.
    ///
    /// Values that don't parse are ignored with a warning.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let mut config = Self::default();

        if let Some(raw) = vars.get(MAX_ARGS_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(n) => config.max_args = n,
                Err(e) => log::warn!("ignoring {}={:?}: {}", MAX_ARGS_VAR, raw, e),
            }
        }

        if let Some(raw) = vars.get(ECHO_VAR) {
            match parse_flag(raw) {
                Some(flag) => config.echo = flag,
                None => log::warn!("ignoring {}={:?}: not a boolean", ECHO_VAR, raw),
            }
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_vars() {
        let config = Config::from_vars(Vec::new());
        assert_eq!(config, Config::default());
        assert_eq!(config.max_args, 10);
        assert!(!config.echo);
    }

    #[test]
    fn test_vars_override_defaults() {
        let config = Config::from_vars(vars(&[
            (MAX_ARGS_VAR, " 4 "),
            (ECHO_VAR, "yes"),
            ("PATH", "/usr/bin"),
        ]));
        assert_eq!(config.max_args, 4);
        assert!(config.echo);
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let config = Config::from_vars(vars(&[(MAX_ARGS_VAR, "lots"), (ECHO_VAR, "maybe")]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("2"), None);
    }
}
