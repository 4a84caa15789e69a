//! Configuration management.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream endpoint base URLs
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Request attribution sent to the ID converter
    #[serde(default)]
    pub contact: ContactConfig,

    /// Search defaults and bounds
    #[serde(default)]
    pub search: SearchConfig,

    /// Outbound HTTP behavior
    #[serde(default)]
    pub http: HttpConfig,
}

/// Base URLs for the upstream service family. Overridable so tests can point
/// them at a local mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// E-utilities base (ESearch, ESummary, EFetch)
    #[serde(default = "default_eutils_base")]
    pub eutils_base: String,

    /// PMID-to-PMCID converter base
    #[serde(default = "default_idconv_base")]
    pub idconv_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            eutils_base: default_eutils_base(),
            idconv_base: default_idconv_base(),
        }
    }
}

fn default_eutils_base() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}

fn default_idconv_base() -> String {
    "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0".to_string()
}

/// Tool/email attribution parameters for NCBI requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Tool name reported to the ID converter
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Contact email reported to the ID converter, omitted when unset
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            email: None,
        }
    }
}

fn default_tool() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

/// Search defaults and bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Result count when a request does not specify one
    #[serde(default = "default_retmax")]
    pub default_retmax: usize,

    /// Ceiling applied to requested result counts
    #[serde(default = "default_max_retmax")]
    pub max_retmax: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_retmax: default_retmax(),
            max_retmax: default_max_retmax(),
        }
    }
}

fn default_retmax() -> usize {
    10
}

fn default_max_retmax() -> usize {
    100
}

/// Outbound HTTP behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Attempt budget for transient upstream failures
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &PathBuf) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_path()))
        .add_source(config::Environment::with_prefix("RESEARCH_READER"))
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.endpoints.eutils_base.contains("eutils.ncbi.nlm.nih.gov"));
        assert_eq!(config.search.default_retmax, 10);
        assert_eq!(config.search.max_retmax, 100);
        assert_eq!(config.http.retry_attempts, 3);
        assert!(config.contact.email.is_none());
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"search": {"default_retmax": 25}}"#).unwrap();
        assert_eq!(config.search.default_retmax, 25);
        assert_eq!(config.search.max_retmax, 100);
        assert_eq!(config.http.timeout_secs, 30);
    }
}
