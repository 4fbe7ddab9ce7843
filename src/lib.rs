//! # Modemstat - Residential gateway status scraping
//!
//! Turns the HTML status pages of a residential gateway into typed records
//! and Prometheus gauges.
//!
//! ## Key Features
//!
//! - **Table tokenizer**: any page of label/value tables becomes a [`StatsTree`]
//! - **Typed extraction**: required and optional fields, integers, timestamps, durations
//! - **Record mappers**: system information, broadband status, LAN port statistics
//! - **TTL cache**: one cached value per source, refreshed lazily
//! - **Metric mapping**: records projected onto labelled gauges (feature `metrics`)
//!
//! ## Quick Start
//!
//! ```rust
//! use modemstat::extract::{get_int, get_string_upper, pivot_rows};
//! use modemstat::tokenize;
//!
//! let page = r#"
//!     <table summary="LAN Ethernet Statistics Table">
//!         <tr><th>State</th><td>up</td><td>down</td></tr>
//!         <tr><th>Transmit Speed</th><td>1000</td><td>0</td></tr>
//!     </table>"#;
//!
//! let stats = tokenize(page);
//! let ports = pivot_rows(&stats, "LAN Ethernet Statistics Table", 2).unwrap();
//!
//! assert_eq!(get_string_upper(&ports[0], "State").unwrap(), "UP");
//! assert_eq!(get_int(&ports[1], "Transmit Speed").unwrap(), 0);
//! ```
//!
//! ## Modules
//!
//! - [`table`]: HTML table tokenizer
//! - [`extract`]: Typed field extraction and pivoting
//! - [`sources`]: Per-page record mappers
//! - [`gatherer`]: Fetch, tokenize and map one page
//! - [`cache`]: Time-to-live cache for gatherers
//! - [`client`]: Device transport (HTTP or saved pages)
//! - [`export`]: JSON export boundary
//! - `metrics`: Registry and gauge projection (feature `metrics`)

// Modules
pub mod cache;
pub mod client;
pub mod error;
pub mod export;
pub mod extract;
pub mod gatherer;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod record;
pub mod sources;
pub mod table;

// Re-exports for convenient access
pub use cache::{CachingGatherer, DEFAULT_CACHE_DURATION};
pub use client::{DirectoryFetcher, ModemClient, ModemConfig, PageFetcher};
pub use error::{ExtractError, FetchError, MetricError, ModemError, Result};
pub use export::{DataExporter, GathererExporter};
pub use gatherer::{Gatherer, ModemGatherer, ModemSource, StatusPage};
pub use record::DomainRecord;
pub use sources::{
    BroadbandStatus, BroadbandStatusGatherer, HomeNetworkStatusGatherer, PortLanStatistics,
    SystemInformation, SystemInformationGatherer,
};
pub use table::{tokenize, StatsTree};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
