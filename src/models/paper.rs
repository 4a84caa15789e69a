//! Paper summary model for search results.

use serde::{Deserialize, Serialize};

use crate::utils::cite::{format_citation, JournalRef};

const PUBMED_ARTICLE_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov";

/// Placeholder values used when a summary field is missing upstream.
///
/// Every field of a [`PaperSummary`] except `id` degrades to one of these
/// rather than being absent.
pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_JOURNAL: &str = "Unknown";
pub const DEFAULT_PUBDATE: &str = "N/A";
pub const DEFAULT_ABSTRACT: &str = "Abstract not available.";

/// An enriched, citation-formatted search result for a single article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSummary {
    /// PubMed identifier; always equal to the identifier the search produced
    pub id: String,

    /// Article title
    pub title: String,

    /// Author display names, in record order
    pub authors: Vec<String>,

    /// Journal name
    pub journal: String,

    /// Raw publication date string as supplied upstream
    pub pubdate: String,

    /// Article page URL
    pub link: String,

    /// Abstract text
    pub r#abstract: String,

    /// MeSH descriptor terms, possibly empty
    pub mesh_terms: Vec<String>,

    /// Derived human-readable citation
    pub citation: String,
}

/// Builder for constructing [`PaperSummary`] values.
///
/// Presets every optional field to its placeholder, so callers only set what
/// the upstream record actually carried. Volume/issue/pages are held only to
/// derive the citation at [`build`](Self::build); they are not part of the
/// summary itself.
#[derive(Debug, Clone)]
pub struct PaperSummaryBuilder {
    id: String,
    title: String,
    authors: Vec<String>,
    journal: String,
    pubdate: String,
    abstract_text: String,
    mesh_terms: Vec<String>,
    journal_ref: JournalRef,
}

impl PaperSummaryBuilder {
    /// Start a builder for the given identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            authors: Vec::new(),
            journal: DEFAULT_JOURNAL.to_string(),
            pubdate: DEFAULT_PUBDATE.to_string(),
            abstract_text: DEFAULT_ABSTRACT.to_string(),
            mesh_terms: Vec::new(),
            journal_ref: JournalRef::default(),
        }
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the author display names
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// Set the journal name
    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = journal.into();
        self
    }

    /// Set the publication date string
    pub fn pubdate(mut self, pubdate: impl Into<String>) -> Self {
        self.pubdate = pubdate.into();
        self
    }

    /// Set the abstract
    pub fn abstract_text(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = text.into();
        self
    }

    /// Set the MeSH descriptor terms
    pub fn mesh_terms(mut self, terms: Vec<String>) -> Self {
        self.mesh_terms = terms;
        self
    }

    /// Set the journal volume (citation only)
    pub fn volume(mut self, volume: impl Into<String>) -> Self {
        self.journal_ref.volume = volume.into();
        self
    }

    /// Set the journal issue (citation only)
    pub fn issue(mut self, issue: impl Into<String>) -> Self {
        self.journal_ref.issue = issue.into();
        self
    }

    /// Set the page range (citation only)
    pub fn pages(mut self, pages: impl Into<String>) -> Self {
        self.journal_ref.pages = pages.into();
        self
    }

    /// Build the summary, deriving the article link and the citation
    pub fn build(self) -> PaperSummary {
        let citation = format_citation(
            &self.authors,
            &self.title,
            &self.journal,
            &self.pubdate,
            &self.journal_ref,
        );
        let link = format!("{}/{}/", PUBMED_ARTICLE_BASE, self.id);

        PaperSummary {
            id: self.id,
            title: self.title,
            authors: self.authors,
            journal: self.journal,
            pubdate: self.pubdate,
            link,
            r#abstract: self.abstract_text,
            mesh_terms: self.mesh_terms,
            citation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let paper = PaperSummaryBuilder::new("123456").build();

        assert_eq!(paper.id, "123456");
        assert_eq!(paper.title, DEFAULT_TITLE);
        assert_eq!(paper.journal, DEFAULT_JOURNAL);
        assert_eq!(paper.pubdate, DEFAULT_PUBDATE);
        assert_eq!(paper.r#abstract, DEFAULT_ABSTRACT);
        assert!(paper.authors.is_empty());
        assert!(paper.mesh_terms.is_empty());
        assert_eq!(paper.link, "https://pubmed.ncbi.nlm.nih.gov/123456/");
    }

    #[test]
    fn test_builder_derives_citation() {
        let paper = PaperSummaryBuilder::new("123456")
            .title("Sarcopenia in older adults.")
            .authors(vec!["Smith J".to_string(), "Doe A".to_string()])
            .journal("J Gerontol")
            .pubdate("2023 Mar")
            .volume("78")
            .issue("3")
            .pages("412-420")
            .build();

        assert_eq!(
            paper.citation,
            "Smith J, Doe A. Sarcopenia in older adults. J Gerontol. 2023;78(3):412-420."
        );
    }

    #[test]
    fn test_builder_citation_without_volume() {
        let paper = PaperSummaryBuilder::new("1")
            .title("T.")
            .authors(vec!["Smith J".to_string()])
            .journal("J")
            .pubdate("2020 Jan")
            .build();

        assert_eq!(paper.citation, "Smith J. T. J.");
    }
}
