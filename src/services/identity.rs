//! Request identities
//!
//! Each attempt gets a fresh, immutable identity drawn from fixed pools. Nothing
//! is carried from one attempt to the next.

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER, USER_AGENT};

pub const USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Search engines we pretend to arrive from. The target's own origin is added
/// to this pool at pick time.
pub const REFERERS: [&str; 3] = [
    "https://www.google.com/",
    "https://www.bing.com/",
    "https://duckduckgo.com/",
];

/// Browser navigation headers sent with every identity. Accept-Encoding is left
/// to reqwest so decompression stays automatic.
const BROWSER_HEADERS: [(&str, &str); 8] = [
    ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    ("accept-language", "en-US,en;q=0.5"),
    ("connection", "keep-alive"),
    ("upgrade-insecure-requests", "1"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("cache-control", "max-age=0"),
];

/// Apparent origin of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_agent: String,
    referer: String,
    origin: String,
}

impl Identity {
    pub fn new(
        user_agent: impl Into<String>,
        referer: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            referer: referer.into(),
            origin: origin.into(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn referer(&self) -> &str {
        &self.referer
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Complete header map for this identity.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        for (k, v) in BROWSER_HEADERS {
            headers.insert(HeaderName::from_static(k), HeaderValue::from_static(v));
        }
        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
        headers.insert(HeaderName::from_static("sec-gpc"), HeaderValue::from_static("1"));

        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .unwrap_or(HeaderValue::from_static("Mozilla/5.0")),
        );
        // Unencodable referer/origin values are dropped rather than failing the attempt.
        if let Ok(value) = HeaderValue::from_str(&self.referer) {
            headers.insert(REFERER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.origin) {
            headers.insert(ORIGIN, value);
        }
        headers
    }
}

/// Fixed candidate pools. Never mutated after construction, so it can be shared
/// freely between concurrent searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPool {
    user_agents: Vec<String>,
    referers: Vec<String>,
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::new(
            USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            REFERERS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl IdentityPool {
    pub fn new(user_agents: Vec<String>, referers: Vec<String>) -> Self {
        Self {
            user_agents,
            referers,
        }
    }

    /// Draw a fresh identity for a request against `origin`
    /// (scheme + host, no trailing slash).
    pub fn pick(&self, origin: &str) -> Identity {
        let mut rng = rand::thread_rng();

        let user_agent = self
            .user_agents
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or("Mozilla/5.0");

        let self_referer = format!("{}/", origin);
        let referer = self
            .referers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self_referer.as_str()))
            .collect::<Vec<_>>()
            .choose(&mut rng)
            .copied()
            .unwrap_or(self_referer.as_str())
            .to_string();

        Identity::new(user_agent, referer, origin)
    }
}
