//! In-memory fakes shared by the service tests.

use crate::error::TransportError;
use crate::services::delay::Sleeper;
use crate::services::fetch::{RawResponse, Transport};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Records requested waits and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) -> Duration {
        self.waits.lock().unwrap().push(duration);
        duration
    }
}

/// Replays a fixed script of responses, one per call.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    urls: Mutex<Vec<String>>,
    headers: Mutex<Vec<HeaderMap>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// One response per status, each with a small body.
    pub fn statuses(statuses: &[u16]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|s| Ok(RawResponse::new(*s, format!("<html>status {}</html>", s))))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn headers(&self) -> Vec<HeaderMap> {
        self.headers.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse, TransportError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.headers.lock().unwrap().push(headers);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("script exhausted".into())))
    }
}

/// Answers by URL substring; anything unrouted is a 404.
#[derive(Debug, Default)]
pub struct RoutedTransport {
    routes: Vec<(String, RawResponse)>,
    urls: Mutex<Vec<String>>,
}

impl RoutedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, needle: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes
            .push((needle.to_string(), RawResponse::new(status, body.into())));
        self
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RoutedTransport {
    fn name(&self) -> &'static str {
        "routed"
    }

    async fn get(&self, url: &str, _headers: HeaderMap) -> Result<RawResponse, TransportError> {
        self.urls.lock().unwrap().push(url.to_string());
        let hit = self
            .routes
            .iter()
            .find(|(needle, _)| url.contains(needle.as_str()))
            .map(|(_, resp)| resp.clone());
        Ok(hit.unwrap_or_else(|| RawResponse::new(404, String::new())))
    }
}

/// One search-result card in the current storefront layout.
pub fn result_card(name: &str, price: &str, href: &str, img: &str) -> String {
    format!(
        r#"<div data-component-type="s-search-result" data-asin="X">
  <h2 class="a-size-mini"><a class="a-link-normal" href="{href}"><span>{name}</span></a></h2>
  <span class="a-price"><span class="a-offscreen">{price}</span></span>
  <img class="s-image" src="{img}">
</div>"#
    )
}

pub fn search_page(cards: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><body><div class=\"s-main-slot\">{}</div></body></html>",
        cards.join("\n")
    )
}

/// Page with `n` well-formed cards.
pub fn page_with_records(n: usize) -> String {
    let cards: Vec<String> = (1..=n)
        .map(|i| {
            result_card(
                &format!("Product {}", i),
                &format!("${}.99", i),
                &format!("/dp/B00{}", i),
                &format!("https://m.media-amazon.com/images/I/{}.jpg", i),
            )
        })
        .collect();
    search_page(&cards)
}
