//! Full-text document models for open-access articles.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const PMC_ARTICLE_BASE: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles";

pub const NOT_OPEN_ACCESS_ERROR: &str =
    "This article is not available in PubMed Central (not open access).";
pub const NOT_OPEN_ACCESS_SUGGESTION: &str =
    "Only open-access articles have full text available. The abstract should still be readable.";

/// Extracted full text of an open-access article.
///
/// `sections` preserves document order. When no titled section survives
/// filtering it holds at most one synthetic `"Abstract"` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTextDocument {
    pub success: bool,
    pub pmid: String,
    pub pmcid: String,
    pub title: String,
    pub sections: IndexMap<String, String>,
    pub full_text: String,
    pub pmc_link: String,
}

impl FullTextDocument {
    /// Assemble a document, deriving `full_text` and the PMC link.
    pub fn new(
        pmid: impl Into<String>,
        pmcid: impl Into<String>,
        title: impl Into<String>,
        sections: IndexMap<String, String>,
    ) -> Self {
        let pmcid = pmcid.into();
        let title = title.into();

        let mut full_text_parts = vec![format!("TITLE: {}\n", title)];
        for (name, content) in &sections {
            full_text_parts.push(format!("\n{}:\n{}", name.to_uppercase(), content));
        }

        Self {
            success: true,
            pmid: pmid.into(),
            pmc_link: format!("{}/{}/", PMC_ARTICLE_BASE, pmcid),
            pmcid,
            title,
            full_text: full_text_parts.join("\n"),
            sections,
        }
    }
}

/// Structured negative result for articles without a full-text mapping.
///
/// Not an error: "not open access" is an expected outcome the caller handles
/// by degrading to abstract-only behavior. Carries no `pmcid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTextUnavailable {
    pub success: bool,
    pub error: String,
    pub pmid: String,
    pub suggestion: String,
}

/// Outcome of a full-text request: either the document or the structured
/// negative result. Serializes untagged so both wire shapes are flat.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FullTextOutcome {
    Available(FullTextDocument),
    NotAvailable(FullTextUnavailable),
}

impl FullTextOutcome {
    /// The negative outcome for an article with no full-text mapping
    pub fn not_open_access(pmid: impl Into<String>) -> Self {
        FullTextOutcome::NotAvailable(FullTextUnavailable {
            success: false,
            error: NOT_OPEN_ACCESS_ERROR.to_string(),
            pmid: pmid.into(),
            suggestion: NOT_OPEN_ACCESS_SUGGESTION.to_string(),
        })
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FullTextOutcome::Available(_))
    }
}
