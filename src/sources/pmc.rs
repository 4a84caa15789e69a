//! PubMed Central full-text retrieval.
//!
//! A PMID is first cross-referenced to a PMCID through the NCBI ID
//! converter; only open-access articles have such a mapping, and a miss is
//! an expected outcome, not an error. For resolved articles the PMC record
//! XML is fetched and scanned for titled sections suitable for reading
//! aloud, falling back to the abstract when the body yields nothing.

use std::sync::Arc;

use indexmap::IndexMap;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{FullTextDocument, FullTextOutcome};
use crate::sources::SourceError;
use crate::utils::{HttpClient, RetryConfig};

/// Cleaned section bodies must exceed this many chars to be kept; shorter
/// matches are caption stubs and figure debris.
const SECTION_MIN_CHARS: usize = 100;
/// Hard per-section cap bounding response size; the cut is not word-aware.
const SECTION_MAX_CHARS: usize = 3000;

/// PubMed Central full-text client
#[derive(Debug, Clone)]
pub struct PmcSource {
    client: Arc<HttpClient>,
    config: Arc<Config>,
    retry: RetryConfig,
}

impl PmcSource {
    /// Create a new PMC source over a shared HTTP client
    pub fn new(config: Arc<Config>, client: Arc<HttpClient>) -> Self {
        let retry = RetryConfig::with_attempts(config.http.retry_attempts);
        Self {
            client,
            config,
            retry,
        }
    }

    /// Retrieve the full text of an article by PMID.
    ///
    /// Returns `Ok` for both outcomes: the extracted document, or the
    /// structured not-open-access result when the article has no full-text
    /// mapping. Only whole-call failures (network, upstream down) are `Err`.
    pub async fn full_text(&self, pmid: &str) -> Result<FullTextOutcome, SourceError> {
        let Some(pmcid) = self.resolve_pmcid(pmid).await? else {
            tracing::info!(pmid = %pmid, "no full-text mapping, article is not open access");
            return Ok(FullTextOutcome::not_open_access(pmid));
        };
        tracing::info!(pmid = %pmid, pmcid = %pmcid, "resolved full-text identifier");

        let xml = self
            .client
            .get_text(&self.efetch_url(&pmcid), "PMC EFetch", self.retry)
            .await?;

        Ok(FullTextOutcome::Available(parse_full_text(
            &xml, pmid, &pmcid,
        )))
    }

    /// Map a PMID to its PMCID, if the article is open access
    pub async fn resolve_pmcid(&self, pmid: &str) -> Result<Option<String>, SourceError> {
        let body = self
            .client
            .get_text(&self.idconv_url(pmid), "ID converter", self.retry)
            .await?;
        let response: IdConvResponse = serde_json::from_str(&body)?;
        Ok(response.records.into_iter().next().and_then(|r| r.pmcid))
    }

    fn idconv_url(&self, pmid: &str) -> String {
        let mut url = format!(
            "{}/?ids={}&format=json&tool={}",
            self.config.endpoints.idconv_base,
            urlencoding::encode(pmid),
            urlencoding::encode(&self.config.contact.tool)
        );
        if let Some(email) = &self.config.contact.email {
            url.push_str(&format!("&email={}", urlencoding::encode(email)));
        }
        url
    }

    fn efetch_url(&self, pmcid: &str) -> String {
        format!(
            "{}/efetch.fcgi?db=pmc&id={}&rettype=xml&retmode=xml",
            self.config.endpoints.eutils_base,
            urlencoding::encode(pmcid)
        )
    }
}

/// Scan PMC record XML into a [`FullTextDocument`].
///
/// One streaming pass collects the first article title, the first abstract
/// block, and every top-level section. Sections keep document order; bodies
/// are markup-stripped, whitespace-collapsed, filtered by minimum length and
/// capped. A scan error ends extraction with whatever was collected; this
/// function never fails.
pub fn parse_full_text(xml: &str, pmid: &str, pmcid: &str) -> FullTextDocument {
    let mut reader = Reader::from_str(xml);

    let mut title: Option<String> = None;
    let mut abstract_text: Option<String> = None;
    let mut sections: IndexMap<String, String> = IndexMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"article-title" if title.is_none() => {
                    if let Ok(text) = read_flat_text(&mut reader) {
                        title = Some(text.trim().to_string());
                    }
                }
                b"abstract" if abstract_text.is_none() => {
                    if let Ok(text) = read_spaced_text(&mut reader) {
                        abstract_text = Some(collapse_whitespace(&text));
                    }
                }
                b"sec" => {
                    if let Ok(Some((name, body))) = read_section(&mut reader) {
                        if body.chars().count() > SECTION_MIN_CHARS {
                            sections.insert(name, truncate_chars(&body, SECTION_MAX_CHARS));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("full-text scan stopped on XML error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Abstract-only fallback when the body yielded no usable section
    if sections.is_empty() {
        if let Some(text) = abstract_text {
            sections.insert("Abstract".to_string(), text);
        }
    }

    FullTextDocument::new(
        pmid,
        pmcid,
        title.unwrap_or_else(|| "Title not found".to_string()),
        sections,
    )
}

/// Read one section whose `<sec>` start tag was just consumed, through its
/// matching close. The section name is the first immediate `<title>`; all
/// remaining text, nested subsections included, becomes the body. Sections
/// with no title are dropped.
fn read_section(
    reader: &mut Reader<&[u8]>,
) -> Result<Option<(String, String)>, quick_xml::Error> {
    let mut depth = 1usize;
    let mut sec_title: Option<String> = None;
    let mut body = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if sec_title.is_none() && depth == 1 && e.name().as_ref() == b"title" {
                    let text = read_spaced_text(reader)?;
                    sec_title = Some(collapse_whitespace(&text));
                } else {
                    depth += 1;
                    body.push(' ');
                }
            }
            Event::End(_) => {
                depth -= 1;
                body.push(' ');
                if depth == 0 {
                    break;
                }
            }
            Event::Empty(_) => body.push(' '),
            Event::Text(t) => body.push_str(&t.unescape()?),
            Event::CData(t) => body.push_str(&String::from_utf8_lossy(&t)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sec_title
        .filter(|t| !t.is_empty())
        .map(|t| (t, collapse_whitespace(&body))))
}

/// Read the remaining text of the current element with nested markup removed
fn read_flat_text(reader: &mut Reader<&[u8]>) -> Result<String, quick_xml::Error> {
    let mut depth = 1usize;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Read the remaining text of the current element with nested markup
/// replaced by spaces, so adjacent block elements do not run together
fn read_spaced_text(reader: &mut Reader<&[u8]>) -> Result<String, quick_xml::Error> {
    let mut depth = 1usize;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::Start(_) => {
                depth += 1;
                text.push(' ');
            }
            Event::End(_) => {
                depth -= 1;
                text.push(' ');
                if depth == 0 {
                    break;
                }
            }
            Event::Empty(_) => text.push(' '),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ===== ID Converter API Types =====

#[derive(Debug, Deserialize)]
struct IdConvResponse {
    #[serde(default)]
    records: Vec<IdConvRecord>,
}

#[derive(Debug, Deserialize)]
struct IdConvRecord {
    #[serde(default)]
    pmcid: Option<String>,
}
