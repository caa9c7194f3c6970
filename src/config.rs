//! Interceptor configuration and project name validation.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::address::LocalAddress;
use crate::error::{Error, Result};

/// Property key holding the project name.
pub const PROJECT_NAME_KEY: &str = "projectName";

// Only characters that can never close or open a SQL comment.
static PROJECT_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_ ]+$").unwrap());

/// A validated project name, safe to embed inside a SQL comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    /// Validate a raw project name.
    ///
    /// Blank values and values with characters other than ASCII letters,
    /// digits, underscores and spaces are rejected.
    pub fn parse(value: &str) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(Error::invalid_configuration(format!(
                "{PROJECT_NAME_KEY} property must be set."
            )));
        }

        if !PROJECT_NAME_REGEX.is_match(value) {
            return Err(Error::invalid_configuration(format!(
                "{PROJECT_NAME_KEY} '{value}' contains illegal chars. \
                 {PROJECT_NAME_KEY} must contain only alpha numerics, spaces and underscores."
            )));
        }

        Ok(Self(value.to_string()))
    }

    /// The name as it appears in the comment.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration for the caller-comment interceptor.
///
/// # Example
///
/// ```rust
/// use sea_orm_caller_comment::{InterceptorConfig, LocalAddress};
///
/// let config = InterceptorConfig::new("billing api")
///     .unwrap()
///     .with_local_address(LocalAddress::parse("10.0.0.12").unwrap());
///
/// assert_eq!(config.project_name().as_str(), "billing api");
/// ```
#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    /// Name of the calling application, embedded in every comment.
    pub project_name: ProjectName,

    /// Address of the calling host.
    /// Default: `None`, meaning the interceptor uses the process-wide address
    /// from [`LocalAddress::shared`].
    pub local_address: Option<LocalAddress>,
}

impl InterceptorConfig {
    /// Create a configuration for the given project name.
    pub fn new(project_name: &str) -> Result<Self> {
        let project_name = ProjectName::parse(project_name)?;
        tracing::info!(project_name = %project_name, "projectName configured");

        Ok(Self {
            project_name,
            local_address: None,
        })
    }

    /// Read the configuration from the pool's interceptor properties.
    ///
    /// Only [`PROJECT_NAME_KEY`] is recognized; any other key is ignored.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        for key in properties.keys().filter(|key| key.as_str() != PROJECT_NAME_KEY) {
            tracing::debug!(key = %key, "Ignoring unknown interceptor property");
        }

        let value = properties
            .get(PROJECT_NAME_KEY)
            .map(String::as_str)
            .unwrap_or_default();

        Self::new(value)
    }

    /// Use a fixed local address instead of discovering one.
    pub fn with_local_address(mut self, local_address: LocalAddress) -> Self {
        self.local_address = Some(local_address);
        self
    }

    /// The validated project name.
    pub fn project_name(&self) -> &ProjectName {
        &self.project_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MUST_BE_SET: &str = "projectName property must be set.";

    fn properties(value: &str) -> HashMap<String, String> {
        HashMap::from([(PROJECT_NAME_KEY.to_string(), value.to_string())])
    }

    fn illegal_chars(value: &str) -> String {
        format!(
            "projectName '{value}' contains illegal chars. \
             projectName must contain only alpha numerics, spaces and underscores."
        )
    }

    #[test]
    fn test_missing_project_name() {
        let err = InterceptorConfig::from_properties(&HashMap::new()).unwrap_err();
        assert_eq!(err, Error::InvalidConfiguration(MUST_BE_SET.to_string()));
        assert_eq!(err.to_string(), MUST_BE_SET);
    }

    #[test]
    fn test_blank_project_name() {
        for blank in ["", "   ", "\t"] {
            let err = InterceptorConfig::from_properties(&properties(blank)).unwrap_err();
            assert_eq!(err.to_string(), MUST_BE_SET);
        }
    }

    #[test]
    fn test_illegal_chars() {
        for value in [
            "ABC123abc123*",
            "ABC123abc123\t",
            "ABC123abc123-",
            "ABC123abc123/",
            "ABC123abc123한글",
            "ABC123abc123\n",
            "app */ DROP TABLE users; /*",
        ] {
            let err = InterceptorConfig::from_properties(&properties(value)).unwrap_err();
            assert_eq!(err, Error::InvalidConfiguration(illegal_chars(value)));
            assert!(err.to_string().contains(value));
        }
    }

    #[test]
    fn test_valid_project_name() {
        let config = InterceptorConfig::from_properties(&properties("abc123 ABC098_")).unwrap();
        assert_eq!(config.project_name().as_str(), "abc123 ABC098_");
        assert!(config.local_address.is_none());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut props = properties("orders");
        props.insert("useEquals".to_string(), "true".to_string());
        let config = InterceptorConfig::from_properties(&props).unwrap();
        assert_eq!(config.project_name().as_str(), "orders");
    }

    #[test]
    fn test_config_builder() {
        let config = InterceptorConfig::new("orders")
            .unwrap()
            .with_local_address(LocalAddress::parse("10.0.0.1").unwrap());

        assert_eq!(config.local_address, Some(LocalAddress::parse("10.0.0.1").unwrap()));
    }
}
