//! # Research Reader
//!
//! Literature retrieval and full-text extraction backend for a voice-first
//! research assistant.
//!
//! The crate turns a free-text query into a ranked, enriched,
//! citation-formatted list of papers, and a PMID into readable full-text
//! sections for narration. It orchestrates the NCBI E-utilities family
//! (ESearch, ESummary, EFetch) and the PMC ID converter, reconciling their
//! JSON and XML responses by PMID while tolerating partial and malformed
//! upstream data.
//!
//! ## Architecture
//!
//! - [`models`]: request contract and result types (PaperSummary, FullTextDocument)
//! - [`sources`]: the PubMed search pipeline and the PMC full-text client
//! - [`utils`]: HTTP client, retry with backoff, citation formatting
//! - [`config`]: configuration management

pub mod config;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{FullTextOutcome, PaperSummary, SearchRequest};
pub use sources::{PmcSource, PubMedSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
