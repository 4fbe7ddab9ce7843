// Modemstat - Pipeline Tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! End-to-end tests over captured device pages.
//!
//! These tests verify:
//! - Tokenizing real pages
//! - Mapping each page through its gatherer
//! - Caching in front of a gatherer
//! - JSON export

use modemstat::export::endpoint_for;
use modemstat::table::ROOT_SECTION;
use modemstat::{
    BroadbandStatusGatherer, CachingGatherer, DataExporter, DirectoryFetcher, FetchError, Gatherer,
    GathererExporter, HomeNetworkStatusGatherer, ModemConfig, ModemError, ModemSource, PageFetcher,
    SystemInformationGatherer,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn fixtures() -> Arc<dyn PageFetcher> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let config = ModemConfig::new("att", "http://192.168.1.254", None).unwrap();
    Arc::new(DirectoryFetcher::new(config, dir))
}

/// Counts fetches and serves fixtures
struct CountingFetcher {
    inner: Arc<dyn PageFetcher>,
    fetches: AtomicUsize,
}

impl PageFetcher for CountingFetcher {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(path)
    }

    fn config(&self) -> &ModemConfig {
        self.inner.config()
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[test]
fn test_tokenize_lan_page() {
    let markup = fixtures().fetch("/cgi-bin/lanstatistics.ha").unwrap();
    let stats = modemstat::tokenize(&markup);

    let section = stats.section("LAN Ethernet Statistics Table").unwrap();
    assert_eq!(section.len(), 14);
    assert_eq!(section["State"], vec!["up", "down", "up", "down"]);
    // The header row has a blank first cell and is skipped
    assert!(stats.root().is_none());
}

#[test]
fn test_tokenize_broadband_page_sections() {
    let markup = fixtures().fetch("/cgi-bin/broadbandstatistics.ha").unwrap();
    let stats = modemstat::tokenize(&markup);

    let names: Vec<&str> = stats.sections().map(|(name, _)| name).collect();
    assert_eq!(names.len(), 5);
    assert!(!names.contains(&ROOT_SECTION));
    assert!(names.contains(&"IPv6 Statistics Table"));
}

// ============================================================================
// Gatherers
// ============================================================================

#[test]
fn test_system_information_gatherer() {
    let gatherer = SystemInformationGatherer::new(fixtures());
    let info = gatherer.gather().unwrap();

    assert_eq!(gatherer.name(), "SystemInformationGatherer");
    assert_eq!(info.model_number, "BGW320-505");
    assert_eq!(info.serial_number, "123456789012");
    assert_eq!(info.time_since_last_reboot, Duration::from_secs(1_047_845));
    assert_eq!(info.datapump_version, "N/A");
}

#[test]
fn test_broadband_status_gatherer() {
    let status = BroadbandStatusGatherer::new(fixtures()).gather().unwrap();

    let wan = &status.broadband_wan_information;
    assert_eq!(wan.connection_source, "FIBER");
    assert_eq!(wan.mac_address, "aa:bb:cc:dd:ee:01");
    assert_eq!(wan.primary_dns_name, None);
    assert_eq!(status.ethernet_statistics.current_speed_mbps, 1000);
    assert_eq!(status.ipv4_statistics.receive_bytes, 2_147_483_648);
    assert_eq!(status.ipv6_information.link_local_address, "fe80::aabb:ccff:fedd:ee01");
    assert_eq!(status.ipv6_statistics.transmit_packets, Some(20_481));
    assert_eq!(status.ipv6_statistics.receive_packets, None);
}

#[test]
fn test_home_network_status_gatherer() {
    let ports = HomeNetworkStatusGatherer::new(fixtures()).gather().unwrap();

    assert_eq!(ports.len(), 4);
    assert_eq!(ports[0].lan_port, 1);
    assert_eq!(ports[0].state, "UP");
    assert_eq!(ports[1].state, "DOWN");
    assert_eq!(ports[2].transmit_speed, 100);
    assert_eq!(ports[0].receive_dropped, 3);
}

#[test]
fn test_missing_page_is_fetch_error() {
    let dir = std::env::temp_dir().join("modemstat-no-such-dir");
    let fetcher = DirectoryFetcher::new(ModemConfig::default(), dir);
    let result = SystemInformationGatherer::new(Arc::new(fetcher)).gather();
    assert!(matches!(result, Err(ModemError::Fetch(FetchError::Io { .. }))));
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_cached_gatherer_fetches_once() {
    let counting = Arc::new(CountingFetcher {
        inner: fixtures(),
        fetches: AtomicUsize::new(0),
    });
    let cached = CachingGatherer::new(
        HomeNetworkStatusGatherer::new(counting.clone()),
        Duration::from_secs(60),
    );

    let first = cached.gather().unwrap();
    let second = cached.gather().unwrap();

    assert_eq!(first, second);
    assert_eq!(counting.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(cached.name(), "HomeNetworkStatusGatherer");
    assert_eq!(cached.modem().id, "att");
}

#[test]
fn test_shared_cache_serves_two_consumers() {
    let counting = Arc::new(CountingFetcher {
        inner: fixtures(),
        fetches: AtomicUsize::new(0),
    });
    let cached = Arc::new(CachingGatherer::new(
        SystemInformationGatherer::new(counting.clone()),
        Duration::from_secs(60),
    ));

    let exporter = GathererExporter::new(cached.clone());
    exporter.export().unwrap();
    cached.gather().unwrap();

    assert_eq!(counting.fetches.load(Ordering::SeqCst), 1);
}

// ============================================================================
// JSON export
// ============================================================================

#[test]
fn test_exporter_endpoints() {
    assert_eq!(
        GathererExporter::new(SystemInformationGatherer::new(fixtures())).endpoint(),
        "/api/system-information"
    );
    assert_eq!(
        GathererExporter::new(BroadbandStatusGatherer::new(fixtures())).endpoint(),
        "/api/broadband-status"
    );
    assert_eq!(endpoint_for("HomeNetworkStatusGatherer"), "/api/home-network-status");
}

#[test]
fn test_export_broadband_json() {
    let json = GathererExporter::new(BroadbandStatusGatherer::new(fixtures()))
        .export()
        .unwrap();

    assert_eq!(json["broadband_wan_information"]["mtu"], 1500);
    assert_eq!(json["broadband_wan_information"]["primary_dns_name"], serde_json::Value::Null);
    assert_eq!(json["ethernet_statistics"]["duplex_mode"], "FULL");
    assert_eq!(json["ipv6_statistics"]["transmit_bytes"], 3_276_800);
}

#[test]
fn test_export_lan_json() {
    let json = GathererExporter::new(HomeNetworkStatusGatherer::new(fixtures()))
        .export()
        .unwrap();

    let ports = json.as_array().unwrap();
    assert_eq!(ports.len(), 4);
    assert_eq!(ports[3]["lan_port"], 4);
    assert_eq!(ports[3]["state"], "DOWN");
}
