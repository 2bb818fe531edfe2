use crate::config::SearchConfig;
use crate::error::{FetchError, MarketError, Result};
use crate::marketplace::Marketplace;
use crate::services::{
    ActivityLogger, Extractor, FetchClient, HostGate, IdentityPool, ReqwestTransport, Searcher,
    Sleeper, TokioSleeper, Transport,
};
use crate::types::{ApiResponse, Record, SearchRequest};
use futures_util::{stream, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/* ------------ public facade components ------------ */

/// Everything a search needs. Build once and share across calls.
pub struct Components {
    pub transport: Arc<dyn Transport>,
    pub sleeper: Arc<dyn Sleeper>,
    pub identities: IdentityPool,
    pub config: SearchConfig,
    pub gate: HostGate,
    pub logger: Option<ActivityLogger>,
}

impl Components {
    /// Real HTTP, real timers, activity log in the home directory when available.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.request_timeout())?;
        let mut components =
            Self::with_transport(config, Arc::new(transport), Arc::new(TokioSleeper));
        components.logger = ActivityLogger::new().ok();
        Ok(components)
    }

    /// Components over an arbitrary transport and sleeper, without an activity log.
    pub fn with_transport(
        config: SearchConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            transport,
            sleeper,
            identities: IdentityPool::default(),
            config,
            gate: HostGate::new(),
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: ActivityLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn searcher(&self, marketplace: Marketplace) -> Searcher {
        let client = FetchClient::new(
            self.transport.clone(),
            self.sleeper.clone(),
            self.identities.clone(),
            self.config.retry,
        )
        .with_gate(self.gate.clone());
        let extractor = Extractor::for_marketplace(marketplace)
            .with_max_containers(self.config.max_containers);

        Searcher::new(Arc::new(client), extractor, self.sleeper.clone())
            .with_max_attempts(self.config.max_attempts)
    }

    // Logging failures never break the operation.
    fn log_info(&self, marketplace: Option<&str>, event: &str, details: &str) {
        if let Some(logger) = &self.logger {
            let _ = logger.info(marketplace, event, Some(details));
        }
    }

    fn log_error(&self, marketplace: Option<&str>, event: &str, details: &str) {
        if let Some(logger) = &self.logger {
            let _ = logger.error(marketplace, event, Some(details));
        }
    }
}

/* ------------ search entrypoints ------------ */

/// One search, no fallback.
///
/// The country is resolved before any network activity. An exhausted fetch is
/// returned as an error so callers can tell "blocked" from "no results".
pub async fn search(components: &Components, request: &SearchRequest) -> Result<Vec<Record>> {
    let start_time = Instant::now();

    let marketplace = match Marketplace::from_country_code(&request.country) {
        Ok(m) => m,
        Err(e) => {
            components.log_error(
                None,
                "search",
                &format!("rejected country {:?}", request.country),
            );
            return Err(e.into());
        }
    };
    let query = request.query.trim();
    if query.is_empty() {
        return Err(FetchError::InvalidInput("query must not be empty".into()).into());
    }

    let result = components
        .searcher(marketplace)
        .search(query)
        .await
        .map_err(MarketError::from);
    let duration = start_time.elapsed();

    match &result {
        Ok(records) => components.log_info(
            Some(marketplace.country_code()),
            "search",
            &format!(
                "succeeded in {}ms, {} records",
                duration.as_millis(),
                records.len()
            ),
        ),
        Err(_) => components.log_error(
            Some(marketplace.country_code()),
            "search",
            &format!("failed in {}ms", duration.as_millis()),
        ),
    }

    result
}

/// Try `primary`, then each fallback, returning the first non-empty batch.
/// Exhaustion is an empty batch, never an error.
pub async fn search_with_fallback(
    components: &Components,
    marketplace: Marketplace,
    primary: &str,
    fallbacks: &[String],
) -> Vec<Record> {
    let start_time = Instant::now();
    let outcome = components
        .searcher(marketplace)
        .search_with_fallback(primary, fallbacks)
        .await;
    let duration = start_time.elapsed();

    let details = match outcome.query() {
        Some(query) => format!("succeeded with {:?} in {}ms", query, duration.as_millis()),
        None => format!("exhausted {} queries in {}ms", fallbacks.len() + 1, duration.as_millis()),
    };
    components.log_info(
        Some(marketplace.country_code()),
        "search_with_fallback",
        &details,
    );

    outcome.into_records()
}

/// [`search_with_fallback`] over the configured fallback queries.
pub async fn search_with_default_fallback(
    components: &Components,
    marketplace: Marketplace,
    primary: &str,
) -> Vec<Record> {
    search_with_fallback(
        components,
        marketplace,
        primary,
        &components.config.fallback_queries,
    )
    .await
}

/// Request handler: `{country, query}` in, `{ok, data, error}` out.
pub async fn handle_search(
    components: &Components,
    request: &SearchRequest,
) -> ApiResponse<Vec<Record>> {
    match search(components, request).await {
        Ok(records) => ApiResponse::ok(records),
        Err(e) => ApiResponse::from_error(&e),
    }
}

/// Run independent searches with at most `concurrency` in flight.
///
/// Requests against the same host still go out one at a time. Results come
/// back in completion order, each paired with its request.
pub async fn search_marketplaces(
    components: &Components,
    requests: Vec<SearchRequest>,
    concurrency: usize,
) -> Vec<(SearchRequest, Result<Vec<Record>>)> {
    let start_time = Instant::now();
    let total = requests.len();

    let results: Vec<_> = stream::iter(requests)
        .map(|request| async move {
            let result = search(components, &request).await;
            (request, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    components.log_info(
        None,
        "search_marketplaces",
        &format!(
            "{} searches, {} failed in {}ms",
            total,
            failed,
            start_time.elapsed().as_millis()
        ),
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::testing::{page_with_records, search_page, RecordingSleeper, RoutedTransport};

    fn components(transport: Arc<RoutedTransport>) -> Components {
        Components::with_transport(
            SearchConfig::default(),
            transport,
            Arc::new(RecordingSleeper::default()),
        )
    }

    #[tokio::test]
    async fn unknown_country_fails_before_any_request() {
        let transport = Arc::new(RoutedTransport::new().route("/s?", 200, page_with_records(3)));
        let c = components(transport.clone());

        let err = search(&c, &SearchRequest::new("ZZ", "books"))
            .await
            .unwrap_err();

        assert!(err.is_input_error());
        assert_eq!(err.to_string(), "invalid input: unsupported country code: ZZ");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let transport = Arc::new(RoutedTransport::new());
        let c = components(transport.clone());

        let err = search(&c, &SearchRequest::new("US", "   ")).await.unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn search_targets_country_origin() {
        let transport = Arc::new(
            RoutedTransport::new().route("amazon.co.uk/s?k=kettle", 200, page_with_records(2)),
        );
        let c = components(transport.clone());

        let records = search(&c, &SearchRequest::new("uk", "kettle")).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].link(), "https://www.amazon.co.uk/dp/B001");
        assert_eq!(
            transport.urls(),
            vec!["https://www.amazon.co.uk/s?k=kettle&ref=sr_pg_1".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_page_is_ok_empty() {
        let transport = Arc::new(RoutedTransport::new().route("/s?", 200, search_page(&[])));
        let c = components(transport);

        let records = search(&c, &SearchRequest::new("IN", "nothing")).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn handler_wraps_results_and_errors() {
        let transport = Arc::new(RoutedTransport::new().route("k=books", 200, page_with_records(1)));
        let c = components(transport);

        let ok = handle_search(&c, &SearchRequest::new("IN", "books")).await;
        assert!(ok.ok);
        assert_eq!(ok.data.map(|d| d.len()), Some(1));

        let err = handle_search(&c, &SearchRequest::new("FR", "books")).await;
        assert!(!err.ok);
        assert_eq!(
            err.error.as_deref(),
            Some("invalid input: unsupported country code: FR")
        );
        assert_eq!(err.kind, Some(ErrorKind::InvalidInput));
    }

    #[tokio::test]
    async fn handler_reports_blocked_marketplace_as_upstream() {
        let transport = Arc::new(RoutedTransport::new().route("/s?", 503, ""));
        let mut c = components(transport);
        c.config.max_attempts = 1;

        let resp = handle_search(&c, &SearchRequest::new("US", "books")).await;
        assert!(!resp.ok);
        assert_eq!(resp.kind, Some(ErrorKind::Upstream));
        assert!(resp.error.unwrap().starts_with("fetch exhausted after 1 attempt(s)"));
    }

    #[tokio::test]
    async fn blocked_search_is_an_error_not_empty() {
        let transport = Arc::new(RoutedTransport::new().route("/s?", 503, ""));
        let mut c = components(transport.clone());
        c.config.max_attempts = 2;

        let err = search(&c, &SearchRequest::new("US", "books")).await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Fetch(FetchError::Exhausted { attempts: 2, .. })
        ));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn default_fallback_walks_configured_queries() {
        let transport = Arc::new(
            RoutedTransport::new()
                .route("k=books", 200, page_with_records(2))
                .route("/s?", 200, search_page(&[])),
        );
        let c = components(transport.clone());

        let records = search_with_default_fallback(&c, Marketplace::In, "gadgets").await;
        assert_eq!(records.len(), 2);
        // gadgets, electronics, books
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn fallback_exhaustion_is_empty() {
        let transport = Arc::new(RoutedTransport::new().route("/s?", 200, search_page(&[])));
        let c = components(transport.clone());

        let records =
            search_with_fallback(&c, Marketplace::Us, "a", &["b".to_string()]).await;
        assert!(records.is_empty());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn fan_out_returns_every_request() {
        let transport = Arc::new(
            RoutedTransport::new()
                .route("amazon.com/", 200, page_with_records(1))
                .route("amazon.ca/", 200, page_with_records(2)),
        );
        let c = components(transport.clone());

        let mut results = search_marketplaces(
            &c,
            vec![
                SearchRequest::new("US", "desk"),
                SearchRequest::new("CA", "desk"),
                SearchRequest::new("ZZ", "desk"),
            ],
            3,
        )
        .await;
        results.sort_by(|a, b| a.0.country.cmp(&b.0.country));

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0.country, "CA");
        assert_eq!(results[0].1.as_ref().unwrap().len(), 2);
        assert_eq!(results[1].1.as_ref().unwrap().len(), 1);
        assert!(results[2].1.is_err());
        assert_eq!(transport.calls(), 2);
        assert_eq!(c.gate.hosts(), 2);
    }

    #[tokio::test]
    async fn activity_is_logged_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ActivityLogger::at(dir.path().join("activity.log")).unwrap();
        let transport = Arc::new(RoutedTransport::new().route("/s?", 200, page_with_records(1)));
        let c = components(transport).with_logger(logger.clone());

        search(&c, &SearchRequest::new("DE", "buch")).await.unwrap();
        let _ = search(&c, &SearchRequest::new("XX", "buch")).await;

        let lines = logger.read_logs(None, false).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("search DE succeeded in"), "{}", lines[1]);
        assert!(lines[1].ends_with("1 records"));
        assert_eq!(logger.read_logs(None, true).unwrap().len(), 1);
    }
}
