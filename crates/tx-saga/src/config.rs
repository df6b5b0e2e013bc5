use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_NAME: &str = "transaction";

/// Settings for a [`Transaction`](crate::Transaction).
///
/// Can be read from a TOML table:
///
/// ```toml
/// name = "checkout"
/// audit = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TransactionConfig {
    name: String,
    audit: bool,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            name: String::from(DEFAULT_NAME),
            audit: true,
        }
    }
}

impl TransactionConfig {
    /// Parse a config from TOML, filling in defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the input is not valid TOML or
    /// contains unknown keys.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Name the transaction reports in errors and uses as a nested task.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the transaction keeps an audit log of its tasks.
    #[must_use]
    pub fn audit(&self) -> bool {
        self.audit
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }
}
