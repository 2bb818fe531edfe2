use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{redirect, Client};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const REDIRECT_LIMIT: usize = 10;
const POOL_IDLE_TIMEOUT_SEC: u64 = 90;
const POOL_MAX_IDLE_PER_HOST: usize = 32;

/// Status line and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends a single GET. Implementations never retry; that belongs to the
/// fetch client.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse, TransportError>;
}

/// Production transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::limited(REDIRECT_LIMIT))
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SEC))
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status().as_u16();

        // Only a 200 body is ever parsed.
        let body = if status == 200 {
            response.text().await?
        } else {
            String::new()
        };
        Ok(RawResponse { status, body })
    }
}
