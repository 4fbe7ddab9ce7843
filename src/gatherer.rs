// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Data gatherers
//!
//! A [`Gatherer`] produces one record per call. [`ModemGatherer`] fetches a
//! device page, tokenizes it and hands the tree to the page's mapper; the
//! cache in [`crate::cache`] wraps any gatherer.

use crate::client::{ModemConfig, PageFetcher};
use crate::error::{ModemError, Result};
use crate::table::{tokenize, StatsTree};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, warn};

/// Something that produces a value on demand
pub trait Gatherer {
    /// Produced record type
    type Output;

    /// Produce a fresh (or cached) value
    fn gather(&self) -> Result<Self::Output>;

    /// Stable name, used for logging and endpoint naming
    fn name(&self) -> &str;
}

/// A source bound to one device
pub trait ModemSource {
    /// Configuration of the device the source reads from
    fn modem(&self) -> &ModemConfig;
}

impl<G: Gatherer + ?Sized> Gatherer for Arc<G> {
    type Output = G::Output;

    fn gather(&self) -> Result<Self::Output> {
        (**self).gather()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<G: ModemSource + ?Sized> ModemSource for Arc<G> {
    fn modem(&self) -> &ModemConfig {
        (**self).modem()
    }
}

/// One status page of the device
pub trait StatusPage {
    /// Record built from the page
    type Record: Debug;

    /// Gatherer name reported for this page
    const NAME: &'static str;

    /// Path of the page on the device
    const PATH: &'static str;

    /// Build the record; never returns a partial record
    fn map(tree: &StatsTree) -> Result<Self::Record>;
}

/// Fetches, tokenizes and maps one status page
pub struct ModemGatherer<P> {
    fetcher: Arc<dyn PageFetcher>,
    _page: PhantomData<fn() -> P>,
}

impl<P: StatusPage> ModemGatherer<P> {
    /// Create a gatherer reading through `fetcher`
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            _page: PhantomData,
        }
    }

    /// Page path on the device
    pub fn path(&self) -> &'static str {
        P::PATH
    }
}

impl<P: StatusPage> Gatherer for ModemGatherer<P> {
    type Output = P::Record;

    fn gather(&self) -> Result<P::Record> {
        let markup = self.fetcher.fetch(P::PATH)?;
        let stats = tokenize(&markup);
        if stats.is_empty() {
            warn!(gatherer = P::NAME, path = P::PATH, "No stats found");
            return Err(ModemError::EmptyPage {
                path: P::PATH.to_string(),
            });
        }
        let record = P::map(&stats)?;
        info!(gatherer = P::NAME, "Data -> {:?}", record);
        Ok(record)
    }

    fn name(&self) -> &str {
        P::NAME
    }
}

impl<P> ModemSource for ModemGatherer<P> {
    fn modem(&self) -> &ModemConfig {
        self.fetcher.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, FetchError};
    use crate::extract::{get_int, single_row};

    struct FixedPage {
        config: ModemConfig,
        markup: std::result::Result<String, FetchError>,
    }

    impl PageFetcher for FixedPage {
        fn fetch(&self, _path: &str) -> std::result::Result<String, FetchError> {
            self.markup.clone()
        }

        fn config(&self) -> &ModemConfig {
            &self.config
        }
    }

    struct MtuPage;

    impl StatusPage for MtuPage {
        type Record = i64;
        const NAME: &'static str = "MtuGatherer";
        const PATH: &'static str = "/cgi-bin/mtu.ha";

        fn map(tree: &StatsTree) -> Result<i64> {
            let row = single_row(tree, "WAN")?;
            Ok(get_int(&row, "MTU")?)
        }
    }

    fn gatherer(markup: std::result::Result<&str, FetchError>) -> ModemGatherer<MtuPage> {
        let fetcher = FixedPage {
            config: ModemConfig::new("test-modem", "http://192.168.1.254", None).unwrap(),
            markup: markup.map(str::to_string),
        };
        ModemGatherer::new(Arc::new(fetcher))
    }

    #[test]
    fn test_gather_maps_page() {
        let g = gatherer(Ok(r#"<table summary="WAN"><tr><td>MTU</td><td>1500</td></tr></table>"#));
        assert_eq!(g.gather().unwrap(), 1500);
        assert_eq!(g.name(), "MtuGatherer");
        assert_eq!(g.path(), "/cgi-bin/mtu.ha");
        assert_eq!(g.modem().id, "test-modem");
    }

    #[test]
    fn test_gather_empty_page() {
        let g = gatherer(Ok("<html><body>Test HTML</body></html>"));
        assert_eq!(
            g.gather(),
            Err(ModemError::EmptyPage {
                path: "/cgi-bin/mtu.ha".to_string()
            })
        );
    }

    #[test]
    fn test_gather_propagates_mapping_failure() {
        let g = gatherer(Ok(r#"<table summary="WAN"><tr><td>MTU</td><td>big</td></tr></table>"#));
        assert!(matches!(
            g.gather(),
            Err(ModemError::Extract(ExtractError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_gather_propagates_fetch_failure() {
        let g = gatherer(Err(FetchError::Timeout {
            url: "http://192.168.1.254/cgi-bin/mtu.ha".to_string(),
        }));
        assert!(matches!(g.gather(), Err(ModemError::Fetch(FetchError::Timeout { .. }))));
    }

    #[test]
    fn test_arc_delegates() {
        let g = Arc::new(gatherer(Ok(
            r#"<table summary="WAN"><tr><td>MTU</td><td>1492</td></tr></table>"#,
        )));
        assert_eq!(Gatherer::gather(&g).unwrap(), 1492);
        assert_eq!(Gatherer::name(&g), "MtuGatherer");
        assert_eq!(ModemSource::modem(&g).url, "http://192.168.1.254");
    }
}
