use crate::error::{ErrorKind, MarketError};
use serde::{Deserialize, Serialize};

/// Shown in place of a price when none could be located or cleaned.
pub const PRICE_UNAVAILABLE: &str = "price unavailable";

/// One extracted search result.
///
/// Built once by the extractor and never mutated afterwards. Two records with the
/// same content are equal; there is no other identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    name: String,
    price: String,
    link: String,
    image_url: String,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        link: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            link: link.into(),
            image_url: image_url.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn has_price(&self) -> bool {
        self.price != PRICE_UNAVAILABLE
    }
}

/// Inbound search call: which marketplace, what to look for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub country: String,
    pub query: String,
}

impl SearchRequest {
    pub fn new(country: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}
impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
            kind: None,
        }
    }
    /// Failure envelope that also tells bad input apart from an unreachable marketplace.
    pub fn from_error(err: &MarketError) -> Self {
        Self {
            kind: Some(err.kind()),
            ..Self::err(err.to_string())
        }
    }
}
