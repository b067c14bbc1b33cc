//! Local-business listing scraper.
//!
//! Queries multiple third-party directory sites (JustDial, Sulekha,
//! YellowPages, Yell), extracts structured business records from their
//! inconsistent HTML, deduplicates across sources, and reports session
//! stats. The public entry point is [`run_scrape`]; everything underneath
//! (fetch policy, adapters, field extractors) is also exposed for reuse
//! and testing.

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod query;
mod rate_limit;
pub mod session;
pub mod sources;
pub mod stats;
pub mod transport;

pub use aggregate::{aggregate, column_order};
pub use error::ScrapeError;
pub use fetch::FetchCoordinator;
pub use query::interpret;
pub use session::{run_scrape, run_scrape_with_transport, ScrapeOutcome, SourceSelector};
pub use stats::{ScrapeReport, ScrapeStats};
pub use transport::{HttpTransport, RawResponse, Transport};
