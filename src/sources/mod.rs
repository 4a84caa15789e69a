//! NCBI source clients.
//!
//! Two clients cover the pipeline: [`PubMedSource`] turns a free-text query
//! into enriched, citation-formatted paper summaries (ESearch + ESummary +
//! EFetch), and [`PmcSource`] turns a PMID into readable full-text sections
//! from PubMed Central (ID converter + EFetch). Both treat the upstream as
//! untrusted and partially available: individual records may be missing or
//! malformed without failing a request.

mod pmc;
mod pubmed;

pub use pmc::PmcSource;
pub use pubmed::{extract_record_fields, PubMedSource, RecordFields};

/// Errors that can occur when talking to a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (JSON or XML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
