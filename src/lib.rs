#![doc = include_str!("../README.md")]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod output;
pub mod policy;
pub mod runtime;
pub mod selectors;
pub mod services;
pub mod types;

pub use config::SearchConfig;
pub use error::{FetchError, MarketError, Result};
pub use marketplace::Marketplace;
pub use policy::RetryPolicy;
pub use services::*;
pub use types::*;
