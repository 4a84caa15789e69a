//! PubMed search pipeline using the NCBI E-utilities API.
//!
//! One request fans out over three upstream endpoints: ESearch resolves the
//! query to a relevance-ranked identifier list, then ESummary (bulk JSON
//! metadata) and EFetch (bulk record XML, for abstracts and MeSH terms) are
//! fetched concurrently and reconciled by PMID into [`PaperSummary`] values.

use std::collections::HashMap;
use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::models::{PaperSummary, PaperSummaryBuilder, SearchRequest};
use crate::sources::SourceError;
use crate::utils::{HttpClient, RetryConfig};

/// PubMed search client
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    config: Arc<Config>,
    retry: RetryConfig,
}

impl PubMedSource {
    /// Create a new PubMed source over a shared HTTP client
    pub fn new(config: Arc<Config>, client: Arc<HttpClient>) -> Self {
        let retry = RetryConfig::with_attempts(config.http.retry_attempts);
        Self {
            client,
            config,
            retry,
        }
    }

    /// Run the full search pipeline for one request.
    ///
    /// An empty identifier list is a terminal success: no further upstream
    /// calls are made and an empty list is returned. Identifiers the summary
    /// response does not cover are skipped; partial upstream fulfillment is
    /// expected, not an error.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<PaperSummary>, SourceError> {
        let ids = self.resolve_ids(request).await?;
        if ids.is_empty() {
            tracing::info!(query = %request.query, "search matched nothing");
            return Ok(Vec::new());
        }
        tracing::info!(query = %request.query, count = ids.len(), "resolved identifiers");

        // Both fetches depend only on the identifier list, so they run
        // concurrently and are joined before formatting.
        let (summaries, records) =
            tokio::try_join!(self.fetch_summaries(&ids), self.fetch_records(&ids))?;

        let mut papers = Vec::new();
        for id in &ids {
            let Some(item) = summaries.get(id) else {
                tracing::debug!(pmid = %id, "identifier absent from summary response, skipping");
                continue;
            };
            papers.push(build_summary(id, item, &records));
        }

        Ok(papers)
    }

    /// Resolve a query to a relevance-ranked PMID list (ESearch)
    pub async fn resolve_ids(&self, request: &SearchRequest) -> Result<Vec<String>, SourceError> {
        let body = self
            .client
            .get_text(&self.esearch_url(request), "ESearch", self.retry)
            .await?;
        let response: ESearchResponse = serde_json::from_str(&body)?;
        Ok(response.esearchresult.idlist)
    }

    /// Fetch bulk summary metadata for a batch of PMIDs (ESummary).
    ///
    /// Returns the raw per-identifier field bags; identifiers the upstream
    /// did not fulfill are simply absent from the map.
    async fn fetch_summaries(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, Value>, SourceError> {
        let body = self
            .client
            .get_text(&self.esummary_url(ids), "ESummary", self.retry)
            .await?;
        let data: Value = serde_json::from_str(&body)?;

        let mut summaries = HashMap::new();
        if let Some(result) = data.get("result").and_then(|v| v.as_object()) {
            for (uid, item) in result {
                // "uids" is bookkeeping, not a record
                if uid != "uids" {
                    summaries.insert(uid.clone(), item.clone());
                }
            }
        }
        Ok(summaries)
    }

    /// Fetch bulk record XML for a batch of PMIDs and extract per-record
    /// abstract and MeSH fields (EFetch)
    async fn fetch_records(&self, ids: &[String]) -> Result<RecordFields, SourceError> {
        let xml = self
            .client
            .get_text(&self.efetch_url(ids), "EFetch", self.retry)
            .await?;
        Ok(extract_record_fields(&xml))
    }

    fn esearch_url(&self, request: &SearchRequest) -> String {
        let retmax = request
            .retmax
            .unwrap_or(self.config.search.default_retmax)
            .min(self.config.search.max_retmax)
            .max(1);

        let mut params = vec![
            ("db".to_string(), "pubmed".to_string()),
            ("term".to_string(), request.query.clone()),
            ("retmax".to_string(), retmax.to_string()),
            ("retmode".to_string(), "json".to_string()),
            ("sort".to_string(), "relevance".to_string()),
        ];

        if let Some(mindate) = &request.mindate {
            params.push(("mindate".to_string(), mindate.clone()));
        }

        format!(
            "{}/esearch.fcgi?{}",
            self.config.endpoints.eutils_base,
            params
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        )
    }

    fn esummary_url(&self, ids: &[String]) -> String {
        format!(
            "{}/esummary.fcgi?db=pubmed&id={}&retmode=json",
            self.config.endpoints.eutils_base,
            ids.join(",")
        )
    }

    fn efetch_url(&self, ids: &[String]) -> String {
        format!(
            "{}/efetch.fcgi?db=pubmed&id={}&rettype=xml&retmode=xml",
            self.config.endpoints.eutils_base,
            ids.join(",")
        )
    }
}

/// Normalize one summary field bag into a [`PaperSummary`], enriched with the
/// extracted record fields. Every missing field falls back to its placeholder.
fn build_summary(id: &str, item: &Value, records: &RecordFields) -> PaperSummary {
    let authors: Vec<String> = item
        .get("authors")
        .and_then(|v| v.as_array())
        .map(|list| {
            list.iter()
                .filter_map(|a| a.get("name").and_then(|n| n.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut builder = PaperSummaryBuilder::new(id).authors(authors);

    if let Some(title) = text_field(item, "title") {
        builder = builder.title(title);
    }
    if let Some(journal) = text_field(item, "source") {
        builder = builder.journal(journal);
    }
    if let Some(pubdate) = text_field(item, "pubdate") {
        builder = builder.pubdate(pubdate);
    }
    builder = builder
        .volume(text_field(item, "volume").unwrap_or_default())
        .issue(text_field(item, "issue").unwrap_or_default())
        .pages(text_field(item, "pages").unwrap_or_default());

    if let Some(abstract_text) = records.abstracts.get(id) {
        builder = builder.abstract_text(abstract_text.clone());
    }
    if let Some(mesh) = records.mesh_terms.get(id) {
        builder = builder.mesh_terms(mesh.clone());
    }

    builder.build()
}

fn text_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(|v| v.as_str())
}

/// Per-record fields extracted from bulk EFetch XML
#[derive(Debug, Default)]
pub struct RecordFields {
    /// PMID to abstract text, for records that carry one
    pub abstracts: HashMap<String, String>,
    /// PMID to MeSH descriptor terms, in document order
    pub mesh_terms: HashMap<String, Vec<String>>,
}

const RECORD_START: &str = "<PubmedArticle";
const RECORD_END: &str = "</PubmedArticle>";

/// Extract abstract and MeSH fields from a bulk EFetch document.
///
/// The document is first split into per-record substrings on the
/// `PubmedArticle` boundary markers, and each block is then scanned
/// independently, so one malformed record can neither abort the batch nor
/// poison its siblings. A block with no numeric PMID is skipped entirely.
/// This function never fails; on broken input it returns whatever was
/// extractable.
pub fn extract_record_fields(xml: &str) -> RecordFields {
    let mut fields = RecordFields::default();

    for block in record_blocks(xml) {
        let record = parse_record(block);
        let Some(pmid) = record.pmid else {
            tracing::debug!("record block without PMID, skipping");
            continue;
        };
        if let Some(abstract_text) = record.abstract_text {
            fields.abstracts.insert(pmid.clone(), abstract_text);
        }
        if !record.mesh_terms.is_empty() {
            fields.mesh_terms.insert(pmid, record.mesh_terms);
        }
    }

    fields
}

/// Split a bulk document into per-record substrings. Each block runs from a
/// record start marker to the first closing marker after it.
fn record_blocks(xml: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find(RECORD_START) {
        let after_tag = &rest[start + RECORD_START.len()..];
        // Skip longer element names sharing the prefix (PubmedArticleSet)
        if !after_tag.starts_with('>') && !after_tag.starts_with(char::is_whitespace) {
            rest = after_tag;
            continue;
        }
        let Some(end) = after_tag.find(RECORD_END) else {
            break;
        };
        let block_len = RECORD_START.len() + end + RECORD_END.len();
        blocks.push(&rest[start..start + block_len]);
        rest = &rest[start + block_len..];
    }

    blocks
}

#[derive(Debug, Default)]
struct ParsedRecord {
    pmid: Option<String>,
    abstract_text: Option<String>,
    mesh_terms: Vec<String>,
}

/// Scan one record block. A parse error ends the scan for this block only;
/// whatever was already extracted is kept.
fn parse_record(block: &str) -> ParsedRecord {
    let mut reader = Reader::from_str(block);
    let mut record = ParsedRecord::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                // The first PMID in the record is the citation's own id;
                // later ones belong to references and corrections.
                b"PMID" if record.pmid.is_none() => {
                    if let Ok(text) = read_element_text(&mut reader) {
                        let text = text.trim().to_string();
                        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                            record.pmid = Some(text);
                        }
                    }
                }
                b"AbstractText" if record.abstract_text.is_none() => {
                    if let Ok(text) = read_element_text(&mut reader) {
                        record.abstract_text = Some(text.trim().to_string());
                    }
                }
                b"DescriptorName" => {
                    if let Ok(term) = read_element_text(&mut reader) {
                        let term = term.trim().to_string();
                        if !term.is_empty() {
                            record.mesh_terms.push(term);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("record scan stopped on XML error: {}", e);
                break;
            }
            _ => {}
        }
    }

    record
}

/// Read the remaining text of the element whose start tag was just consumed,
/// flattening any nested inline markup.
fn read_element_text(reader: &mut Reader<&[u8]>) -> Result<String, quick_xml::Error> {
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

// ===== E-utilities API Types =====

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: ESearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_ABSTRACT;

    fn source_with_base(base: &str) -> PubMedSource {
        let mut config = Config::default();
        config.endpoints.eutils_base = base.to_string();
        PubMedSource::new(Arc::new(config), Arc::new(HttpClient::new()))
    }

    #[test]
    fn test_esearch_url() {
        let source = source_with_base("http://localhost/eutils");
        let request = SearchRequest::new("sarcopenia elderly").mindate("2020");
        let url = source.esearch_url(&request);

        assert!(url.starts_with("http://localhost/eutils/esearch.fcgi?"));
        assert!(url.contains("db=pubmed"));
        assert!(url.contains("term=sarcopenia%20elderly"));
        assert!(url.contains("retmax=10"));
        assert!(url.contains("retmode=json"));
        assert!(url.contains("sort=relevance"));
        assert!(url.contains("mindate=2020"));
    }

    #[test]
    fn test_esearch_url_clamps_retmax() {
        let source = source_with_base("http://localhost");
        let url = source.esearch_url(&SearchRequest::new("x").retmax(500));
        assert!(url.contains("retmax=100"));

        let url = source.esearch_url(&SearchRequest::new("x").retmax(0));
        assert!(url.contains("retmax=1&"));
    }

    #[test]
    fn test_batch_urls_join_ids() {
        let source = source_with_base("http://localhost");
        let ids = vec!["123456".to_string(), "789012".to_string()];

        assert_eq!(
            source.esummary_url(&ids),
            "http://localhost/esummary.fcgi?db=pubmed&id=123456,789012&retmode=json"
        );
        assert_eq!(
            source.efetch_url(&ids),
            "http://localhost/efetch.fcgi?db=pubmed&id=123456,789012&rettype=xml&retmode=xml"
        );
    }

    #[test]
    fn test_esearch_response_parsing() {
        let response: ESearchResponse = serde_json::from_str(
            r#"{"header": {}, "esearchresult": {"count": "2", "idlist": ["123456", "789012"]}}"#,
        )
        .unwrap();
        assert_eq!(response.esearchresult.idlist, vec!["123456", "789012"]);

        let empty: ESearchResponse = serde_json::from_str(r#"{"esearchresult": {}}"#).unwrap();
        assert!(empty.esearchresult.idlist.is_empty());
    }

    #[test]
    fn test_extract_skips_block_without_pmid() {
        let xml = r#"<PubmedArticleSet>
            <PubmedArticle>
                <MedlineCitation>
                    <PMID Version="1">123456</PMID>
                    <Article>
                        <Abstract><AbstractText>First abstract.</AbstractText></Abstract>
                    </Article>
                    <MeshHeadingList>
                        <MeshHeading><DescriptorName UI="D000368">Aged</DescriptorName></MeshHeading>
                        <MeshHeading><DescriptorName UI="D055442">Sarcopenia</DescriptorName></MeshHeading>
                    </MeshHeadingList>
                </MedlineCitation>
            </PubmedArticle>
            <PubmedArticle>
                <MedlineCitation>
                    <Article>
                        <Abstract><AbstractText>Orphan abstract.</AbstractText></Abstract>
                    </Article>
                </MedlineCitation>
            </PubmedArticle>
            <PubmedArticle>
                <MedlineCitation>
                    <PMID Version="1">789012</PMID>
                    <Article>
                        <Abstract><AbstractText>Third abstract.</AbstractText></Abstract>
                    </Article>
                </MedlineCitation>
            </PubmedArticle>
        </PubmedArticleSet>"#;

        let fields = extract_record_fields(xml);

        assert_eq!(fields.abstracts.len(), 2);
        assert_eq!(fields.abstracts["123456"], "First abstract.");
        assert_eq!(fields.abstracts["789012"], "Third abstract.");
        assert_eq!(
            fields.mesh_terms["123456"],
            vec!["Aged".to_string(), "Sarcopenia".to_string()]
        );
        assert!(!fields.mesh_terms.contains_key("789012"));
    }

    #[test]
    fn test_extract_flattens_inline_markup() {
        let xml = r#"<PubmedArticle>
            <MedlineCitation>
                <PMID>111</PMID>
                <Abstract>
                    <AbstractText>Levels of <i>IGF-1</i> and <sup>2</sup>H were measured.</AbstractText>
                </Abstract>
            </MedlineCitation>
        </PubmedArticle>"#;

        let fields = extract_record_fields(xml);
        assert_eq!(
            fields.abstracts["111"],
            "Levels of IGF-1 and 2H were measured."
        );
    }

    #[test]
    fn test_extract_takes_first_abstract_block_only() {
        let xml = r#"<PubmedArticle>
            <MedlineCitation>
                <PMID>111</PMID>
                <Abstract>
                    <AbstractText>Background part.</AbstractText>
                    <AbstractText>Methods part.</AbstractText>
                </Abstract>
            </MedlineCitation>
        </PubmedArticle>"#;

        let fields = extract_record_fields(xml);
        assert_eq!(fields.abstracts["111"], "Background part.");
    }

    #[test]
    fn test_extract_malformed_block_keeps_siblings() {
        let xml = r#"<PubmedArticle>
            <MedlineCitation><PMID>111</PMID>
                <Abstract><AbstractText>Good one.</AbstractText></Abstract>
            </MedlineCitation>
        </PubmedArticle>
        <PubmedArticle>
            <MedlineCitation><PMID>222</PMID>
                <Abstract><AbstractText>Broken &undefined; entity</AbstractText></Abstract>
            </MedlineCitation>
        </PubmedArticle>
        <PubmedArticle>
            <MedlineCitation><PMID>333</PMID>
                <Abstract><AbstractText>Another good one.</AbstractText></Abstract>
            </MedlineCitation>
        </PubmedArticle>"#;

        let fields = extract_record_fields(xml);
        assert_eq!(fields.abstracts["111"], "Good one.");
        assert_eq!(fields.abstracts["333"], "Another good one.");
        assert!(!fields.abstracts.contains_key("222"));
    }

    #[test]
    fn test_extract_empty_document() {
        let fields = extract_record_fields("");
        assert!(fields.abstracts.is_empty());
        assert!(fields.mesh_terms.is_empty());
    }

    #[test]
    fn test_build_summary_defaults_and_enrichment() {
        let item: Value = serde_json::from_str(
            r#"{
                "uid": "123456",
                "title": "Sarcopenia in older adults.",
                "source": "J Gerontol",
                "pubdate": "2023 Mar",
                "volume": "78",
                "issue": "3",
                "pages": "412-420",
                "authors": [
                    {"name": "Smith J", "authtype": "Author"},
                    {"name": "Doe A", "authtype": "Author"}
                ]
            }"#,
        )
        .unwrap();

        let mut records = RecordFields::default();
        records
            .abstracts
            .insert("123456".to_string(), "Extracted abstract.".to_string());
        records
            .mesh_terms
            .insert("123456".to_string(), vec!["Aged".to_string()]);

        let paper = build_summary("123456", &item, &records);

        assert_eq!(paper.id, "123456");
        assert_eq!(paper.authors, vec!["Smith J", "Doe A"]);
        assert_eq!(paper.r#abstract, "Extracted abstract.");
        assert_eq!(paper.mesh_terms, vec!["Aged"]);
        assert_eq!(paper.link, "https://pubmed.ncbi.nlm.nih.gov/123456/");
        assert_eq!(
            paper.citation,
            "Smith J, Doe A. Sarcopenia in older adults. J Gerontol. 2023;78(3):412-420."
        );
    }

    #[test]
    fn test_build_summary_empty_field_bag() {
        let item: Value = serde_json::from_str(r#"{"uid": "999"}"#).unwrap();
        let paper = build_summary("999", &item, &RecordFields::default());

        assert_eq!(paper.title, "No Title");
        assert_eq!(paper.journal, "Unknown");
        assert_eq!(paper.pubdate, "N/A");
        assert_eq!(paper.r#abstract, DEFAULT_ABSTRACT);
        assert!(paper.authors.is_empty());
        assert!(paper.mesh_terms.is_empty());
        assert_eq!(paper.citation, ". No Title Unknown.");
    }
}
