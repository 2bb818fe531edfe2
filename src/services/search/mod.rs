//! Query fallback over one marketplace.


use crate::error::FetchError;
use crate::marketplace::Marketplace;
use crate::services::delay::{self, DelayBounds, Sleeper};
use crate::services::extract::Extractor;
use crate::services::fetch::FetchClient;
use crate::types::Record;
use std::sync::Arc;
use url::Url;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Result of a fallback search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorOutcome {
    /// `query` was the first to yield records.
    Success { query: String, records: Vec<Record> },
    /// Every query came back empty.
    Empty,
}

impl OrchestratorOutcome {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            OrchestratorOutcome::Success { records, .. } => records,
            OrchestratorOutcome::Empty => Vec::new(),
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            OrchestratorOutcome::Success { query, .. } => Some(query),
            OrchestratorOutcome::Empty => None,
        }
    }
}

pub struct Searcher {
    client: Arc<FetchClient>,
    extractor: Extractor,
    origin: String,
    max_attempts: usize,
    query_cooldown: DelayBounds,
    sleeper: Arc<dyn Sleeper>,
}

impl Searcher {
    pub fn new(
        client: Arc<FetchClient>,
        extractor: Extractor,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let query_cooldown = client.retry_policy().query_cooldown;
        Self {
            origin: extractor.origin().to_string(),
            client,
            extractor,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            query_cooldown,
            sleeper,
        }
    }

    pub fn for_marketplace(
        client: Arc<FetchClient>,
        marketplace: Marketplace,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self::new(client, Extractor::for_marketplace(marketplace), sleeper)
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// `{origin}/s?k={query}&ref=sr_pg_1`, with the query form-encoded.
    pub fn search_url(&self, query: &str) -> Result<String, FetchError> {
        let mut url = Url::parse(&format!("{}/s", self.origin))
            .map_err(|e| FetchError::InvalidInput(format!("invalid origin {}: {}", self.origin, e)))?;
        url.query_pairs_mut()
            .append_pair("k", query)
            .append_pair("ref", "sr_pg_1");
        Ok(url.into())
    }

    /// Fetch and parse the first results page for `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Record>, FetchError> {
        let url = self.search_url(query)?;
        tracing::info!(query, url = url.as_str(), "starting search");

        let page = self.client.fetch(&url, self.max_attempts).await?;
        let records = self.extractor.parse_page(&page.html);

        tracing::info!(
            query,
            records = records.len(),
            attempts = page.attempts,
            "search completed"
        );
        Ok(records)
    }

    /// Try `primary`, then each fallback in order, until one yields records.
    ///
    /// A query whose fetch is exhausted counts as empty. The cooldown only runs
    /// when another query is still to come.
    pub async fn search_with_fallback(
        &self,
        primary: &str,
        fallbacks: &[String],
    ) -> OrchestratorOutcome {
        let queries: Vec<&str> = std::iter::once(primary)
            .chain(fallbacks.iter().map(String::as_str))
            .collect();

        for (i, query) in queries.iter().enumerate() {
            tracing::info!(query, "trying search term");

            let records = match self.search(query).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!(query, error = %e, "failed to fetch search results");
                    Vec::new()
                }
            };

            if !records.is_empty() {
                tracing::info!(query, records = records.len(), "search term succeeded");
                return OrchestratorOutcome::Success {
                    query: query.to_string(),
                    records,
                };
            }

            if i + 1 < queries.len() {
                tracing::warn!(query, "no records, trying next term");
                delay::wait(self.sleeper.as_ref(), self.query_cooldown).await;
            }
        }

        tracing::warn!(tried = queries.len(), "all search terms came back empty");
        OrchestratorOutcome::Empty
    }
}
