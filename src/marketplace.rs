//! Supported marketplaces and their fixed origins.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marketplace {
    Us,
    Uk,
    Ca,
    #[default]
    In,
    De,
    Jp,
}

impl Marketplace {
    pub const ALL: [Marketplace; 6] = [
        Marketplace::Us,
        Marketplace::Uk,
        Marketplace::Ca,
        Marketplace::In,
        Marketplace::De,
        Marketplace::Jp,
    ];

    /// Resolve a country code. Unknown codes are an input error, never retried.
    pub fn from_country_code(code: &str) -> Result<Self, FetchError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::Us),
            "UK" => Ok(Self::Uk),
            "CA" => Ok(Self::Ca),
            "IN" => Ok(Self::In),
            "DE" => Ok(Self::De),
            "JP" => Ok(Self::Jp),
            _ => Err(FetchError::InvalidInput(format!(
                "unsupported country code: {}",
                code
            ))),
        }
    }

    pub fn country_code(&self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Uk => "UK",
            Self::Ca => "CA",
            Self::In => "IN",
            Self::De => "DE",
            Self::Jp => "JP",
        }
    }

    /// Base origin, without a trailing slash.
    pub fn origin(&self) -> &'static str {
        match self {
            Self::Us => "https://www.amazon.com",
            Self::Uk => "https://www.amazon.co.uk",
            Self::Ca => "https://www.amazon.ca",
            Self::In => "https://www.amazon.in",
            Self::De => "https://www.amazon.de",
            Self::Jp => "https://www.amazon.co.jp",
        }
    }

    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Self::Us | Self::Ca => "$",
            Self::Uk => "£",
            Self::In => "₹",
            Self::De => "€",
            Self::Jp => "¥",
        }
    }
}

impl FromStr for Marketplace {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_country_code(s)
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.country_code())
    }
}
