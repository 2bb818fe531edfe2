pub mod delay;
pub mod extract;
pub mod fetch;
pub mod gate;
pub mod identity;
pub mod locate;
pub mod log;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use delay::{DelayBounds, Sleeper, TokioSleeper};
pub use extract::{ExtractionOutcome, Extractor, RejectReason};
pub use fetch::{FetchAttempt, FetchClient, Page, RawResponse, ReqwestTransport, Transport};
pub use gate::HostGate;
pub use identity::{Identity, IdentityPool};
pub use log::ActivityLogger;
pub use search::{OrchestratorOutcome, Searcher};
