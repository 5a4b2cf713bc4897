//! Wikipedia search adapter.

use super::{LookupError, ResultId, SearchLookup};
use log::{error, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

pub const WIKIPEDIA_API_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const WIKIPEDIA_PAGE_BASE: &str = "https://en.wikipedia.org/";
const USER_AGENT: &str = concat!("notebook/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    pageid: ResultId,
}

/// Blocking Wikipedia `list=search` client.
///
/// Must not be called from inside an async executor thread; the server
/// drives it from `spawn_blocking`.
pub struct WikipediaLookup {
    endpoint: String,
    client: Client,
}

impl WikipediaLookup {
    /// Builds a client against `endpoint` with a hard request `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| LookupError::Client(err.to_string()))?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Full query URL for `term`.
    pub fn search_url(&self, term: &str) -> String {
        format!(
            "{}?action=query&list=search&srsearch={}&format=json",
            self.endpoint,
            urlencoding::encode(term)
        )
    }
}

impl SearchLookup for WikipediaLookup {
    fn resolve(&self, term: &str) -> Result<Vec<ResultId>, LookupError> {
        let started_at = Instant::now();
        let result = self.fetch(term);
        match &result {
            Ok(ids) => info!(
                "event=lookup_resolve module=lookup status=ok results={} duration_ms={}",
                ids.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=lookup_resolve module=lookup status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn link_for(&self, id: ResultId) -> String {
        format!("{WIKIPEDIA_PAGE_BASE}?curid={id}")
    }

    fn source_label(&self) -> &str {
        "Wikipedia"
    }
}

impl WikipediaLookup {
    fn fetch(&self, term: &str) -> Result<Vec<ResultId>, LookupError> {
        let response = self
            .client
            .get(self.search_url(term))
            .send()
            .map_err(|err| LookupError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        parse_search_response(&body)
    }
}

fn parse_search_response(body: &str) -> Result<Vec<ResultId>, LookupError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|err| LookupError::Decode(err.to_string()))?;
    Ok(parsed.query.search.into_iter().map(|hit| hit.pageid).collect())
}

#[cfg(test)]
mod tests {
    use super::{parse_search_response, WikipediaLookup, DEFAULT_LOOKUP_TIMEOUT};
    use crate::lookup::{LookupError, SearchLookup};

    fn lookup() -> WikipediaLookup {
        WikipediaLookup::new("https://en.wikipedia.org/w/api.php/", DEFAULT_LOOKUP_TIMEOUT)
            .expect("client should build")
    }

    #[test]
    fn search_url_encodes_term() {
        let url = lookup().search_url("rust & c++");
        assert_eq!(
            url,
            "https://en.wikipedia.org/w/api.php?action=query&list=search&srsearch=rust%20%26%20c%2B%2B&format=json"
        );
    }

    #[test]
    fn link_uses_curid() {
        assert_eq!(lookup().link_for(42), "https://en.wikipedia.org/?curid=42");
        assert_eq!(lookup().source_label(), "Wikipedia");
    }

    #[test]
    fn parses_page_ids_in_rank_order() {
        let body = r#"{"batchcomplete":"","query":{"searchinfo":{"totalhits":3},
            "search":[{"ns":0,"title":"A","pageid":30},{"ns":0,"title":"B","pageid":10},{"ns":0,"title":"C","pageid":20}]}}"#;
        assert_eq!(parse_search_response(body).unwrap(), vec![30, 10, 20]);
    }

    #[test]
    fn empty_search_list_is_not_an_error() {
        let body = r#"{"query":{"searchinfo":{"totalhits":0},"search":[]}}"#;
        assert!(parse_search_response(body).unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = parse_search_response(r#"{"error":{"code":"badvalue"}}"#).unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }
}
