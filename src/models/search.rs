//! Request models: the wire contract consumed by the voice frontend proxy.

use serde::{Deserialize, Serialize};

/// A literature search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query keywords
    pub query: String,

    /// Optional earliest publication date filter (e.g. "2020")
    #[serde(default)]
    pub mindate: Option<String>,

    /// Maximum number of results; source default applies when omitted
    #[serde(default)]
    pub retmax: Option<usize>,
}

impl SearchRequest {
    /// Create a request with only a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mindate: None,
            retmax: None,
        }
    }

    /// Set the minimum publication date
    pub fn mindate(mut self, mindate: impl Into<String>) -> Self {
        self.mindate = Some(mindate.into());
        self
    }

    /// Set the maximum result count
    pub fn retmax(mut self, retmax: usize) -> Self {
        self.retmax = Some(retmax);
        self
    }
}

/// A full-text retrieval request for a single article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTextRequest {
    /// PubMed identifier of the article
    pub pmid: String,
}

impl FullTextRequest {
    pub fn new(pmid: impl Into<String>) -> Self {
        Self { pmid: pmid.into() }
    }
}
