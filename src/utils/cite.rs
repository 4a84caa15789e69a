//! Citation formatting.
//!
//! Single best-effort journal-style citation:
//! `Author(s). Title. Journal. Year;Volume(Issue):Pages.`
//! No locale handling and no bibliographic-standard validation.

/// Journal reference fields consumed only by the citation string.
#[derive(Debug, Clone, Default)]
pub struct JournalRef {
    pub volume: String,
    pub issue: String,
    pub pages: String,
}

/// Format the author segment: first three display names joined by `", "`,
/// with a literal `" et al."` appended when more than three exist.
pub fn author_string(authors: &[String]) -> String {
    let mut author_str = authors
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if authors.len() > 3 {
        author_str.push_str(" et al.");
    }
    author_str
}

/// Compose a citation from normalized summary fields.
///
/// The year is the first whitespace-delimited token of `pubdate`. The
/// `Year;Volume(Issue):Pages` clause appears only when `volume` is present;
/// the issue and pages sub-clauses are each omitted independently when
/// absent.
pub fn format_citation(
    authors: &[String],
    title: &str,
    journal: &str,
    pubdate: &str,
    journal_ref: &JournalRef,
) -> String {
    let year = pubdate.split_whitespace().next().unwrap_or("N/A");

    let mut citation_parts = vec![
        format!("{}.", author_string(authors)),
        title.to_string(),
        format!("{}.", journal),
    ];

    if !journal_ref.volume.is_empty() {
        let mut vol_str = format!("{};{}", year, journal_ref.volume);
        if !journal_ref.issue.is_empty() {
            vol_str.push_str(&format!("({})", journal_ref.issue));
        }
        if !journal_ref.pages.is_empty() {
            vol_str.push_str(&format!(":{}", journal_ref.pages));
        }
        citation_parts.push(format!("{}.", vol_str));
    }

    citation_parts.join(" ")
}
