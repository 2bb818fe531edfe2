//! Search-result records from a fetched page.

mod utils;


pub use utils::{image_source, normalize_link, sanitize_price};

use crate::marketplace::Marketplace;
use crate::selectors::ExtractionProfile;
use crate::services::locate::{locate_element, locate_text};
use crate::types::{Record, PRICE_UNAVAILABLE};
use scraper::{ElementRef, Html};
use std::fmt;
use std::sync::Arc;
use utils::{accepted_name, link_target};

pub const DEFAULT_MAX_CONTAINERS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingName,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingName => f.write_str("missing name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Accepted(Record),
    Rejected(RejectReason),
}

impl ExtractionOutcome {
    pub fn into_record(self) -> Option<Record> {
        match self {
            ExtractionOutcome::Accepted(record) => Some(record),
            ExtractionOutcome::Rejected(_) => None,
        }
    }
}

/// Turns result containers into records for one marketplace.
#[derive(Debug, Clone)]
pub struct Extractor {
    profile: Arc<ExtractionProfile>,
    origin: String,
    currency_symbol: String,
    max_containers: usize,
}

impl Extractor {
    pub fn new(
        profile: Arc<ExtractionProfile>,
        origin: impl Into<String>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            profile,
            origin: origin.into(),
            currency_symbol: currency_symbol.into(),
            max_containers: DEFAULT_MAX_CONTAINERS,
        }
    }

    pub fn for_marketplace(marketplace: Marketplace) -> Self {
        Self::new(
            ExtractionProfile::amazon(),
            marketplace.origin(),
            marketplace.currency_symbol(),
        )
    }

    pub fn with_max_containers(mut self, max_containers: usize) -> Self {
        self.max_containers = max_containers;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Build one record from a result container.
    ///
    /// Only the name is required; every other field degrades to its empty
    /// form.
    pub fn extract(&self, container: ElementRef<'_>) -> ExtractionOutcome {
        let Some(name) = accepted_name(locate_text(container, &self.profile.name)) else {
            return ExtractionOutcome::Rejected(RejectReason::MissingName);
        };

        let price = locate_text(container, &self.profile.price)
            .map(|raw| sanitize_price(&raw, &self.currency_symbol))
            .unwrap_or_else(|| PRICE_UNAVAILABLE.to_string());

        let link = locate_element(container, &self.profile.link)
            .map(|a| link_target(a, &self.origin))
            .unwrap_or_default();

        let image_url = locate_element(container, &self.profile.image)
            .map(|img| image_source(img, &self.origin))
            .unwrap_or_default();

        ExtractionOutcome::Accepted(Record::new(name, price, link, image_url))
    }

    pub fn parse_page(&self, html: &str) -> Vec<Record> {
        let doc = Html::parse_document(html);
        self.parse_document(&doc)
    }

    /// Records in document order.
    ///
    /// The first container strategy that matches anything is the only one used,
    /// even if none of its containers yields a record.
    pub fn parse_document(&self, doc: &Html) -> Vec<Record> {
        for (pattern, sel) in self.profile.containers.iter() {
            let containers: Vec<ElementRef<'_>> = doc.select(sel).collect();
            if containers.is_empty() {
                tracing::debug!(strategy = %pattern.to_css(), "no containers");
                continue;
            }
            tracing::info!(
                strategy = %pattern.to_css(),
                found = containers.len(),
                "found containers"
            );

            let mut records = Vec::new();
            for (index, container) in containers
                .into_iter()
                .take(self.max_containers)
                .enumerate()
            {
                match self.extract(container) {
                    ExtractionOutcome::Accepted(record) => records.push(record),
                    ExtractionOutcome::Rejected(reason) => {
                        tracing::debug!(index, %reason, "skipping container")
                    }
                }
            }

            tracing::info!(records = records.len(), "parsed records");
            return records;
        }

        tracing::info!("no container strategy matched");
        Vec::new()
    }
}
