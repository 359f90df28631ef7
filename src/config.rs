//! Pipeline configuration.
//!
//! Deserializable so a host can embed it in its own configuration file:
//!
//! ```rust
//! use chute::{Arguments, Config};
//!
//! let config: Config = serde_json::from_str(r#"{ "arguments": "discard" }"#).unwrap();
//! assert_eq!(config.arguments, Arguments::Discard);
//! ```

use serde::Deserialize;

/// What the route handler receives as its input.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Arguments {
    /// The result of the last pre-handler, or `Null` when there is none.
    #[default]
    PassThrough,
    /// Always `Null`; pre-handler results are dropped.
    Discard,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
    pub arguments: Arguments,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pass_through() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.arguments, Arguments::PassThrough);
    }

    #[test]
    fn rejects_unknown_argument_modes() {
        assert!(serde_json::from_str::<Config>(r#"{ "arguments": "spread" }"#).is_err());
    }
}
