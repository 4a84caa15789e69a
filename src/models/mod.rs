//! Core data structures.
//!
//! Everything here is constructed fresh per request and never mutated after
//! construction; there is no cross-request state.

mod fulltext;
mod paper;
mod search;

pub use fulltext::{
    FullTextDocument, FullTextOutcome, FullTextUnavailable, NOT_OPEN_ACCESS_ERROR,
    NOT_OPEN_ACCESS_SUGGESTION,
};
pub use paper::{
    PaperSummary, PaperSummaryBuilder, DEFAULT_ABSTRACT, DEFAULT_JOURNAL, DEFAULT_PUBDATE,
    DEFAULT_TITLE,
};
pub use search::{FullTextRequest, SearchRequest};
