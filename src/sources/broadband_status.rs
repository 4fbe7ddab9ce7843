// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Broadband status page
//!
//! Five tables, five sub-records. Only the IPv6 counters are optional: the
//! device leaves them blank when IPv6 is not provisioned.

use crate::error::Result;
use crate::extract::{
    get_int, get_string, get_string_lower, get_string_upper, opt_int, opt_string,
    opt_string_lower, single_row, ExtractResult,
};
use crate::gatherer::{ModemGatherer, StatusPage};
use crate::record::DomainRecord;
use crate::table::StatsTree;
use serde::Serialize;

pub const WAN_INFORMATION_SECTION: &str = "Summary of the most important WAN information";
pub const ETHERNET_SECTION: &str = "Ethernet Statistics Table";
pub const IPV6_SECTION: &str = "IPv6 Table";
pub const IPV4_STATISTICS_SECTION: &str = "Ethernet IPv4 Statistics Table";
pub const IPV6_STATISTICS_SECTION: &str = "IPv6 Statistics Table";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadbandWanInformation {
    pub connection_source: String,
    pub connection: String,
    pub network_type: String,
    pub ipv4_address: String,
    pub gateway_ipv4_address: String,
    pub mac_address: String,
    pub primary_dns: String,
    pub primary_dns_name: Option<String>,
    pub secondary_dns: String,
    pub secondary_dns_name: Option<String>,
    pub mtu: i64,
}

impl BroadbandWanInformation {
    pub fn from_stats(tree: &StatsTree) -> ExtractResult<Self> {
        let data = single_row(tree, WAN_INFORMATION_SECTION)?;
        Ok(Self {
            connection_source: get_string_upper(&data, "Broadband Connection Source")?,
            connection: get_string_upper(&data, "Broadband Connection")?,
            network_type: get_string_upper(&data, "Broadband Network Type")?,
            ipv4_address: get_string_lower(&data, "Broadband IPv4 Address")?,
            gateway_ipv4_address: get_string_lower(&data, "Gateway IPv4 Address")?,
            mac_address: get_string_lower(&data, "MAC Address")?,
            primary_dns: get_string(&data, "Primary DNS")?,
            primary_dns_name: opt_string(&data, "Primary DNS Name", None)?,
            secondary_dns: get_string(&data, "Secondary DNS")?,
            secondary_dns_name: opt_string(&data, "Secondary DNS Name", None)?,
            mtu: get_int(&data, "MTU")?,
        })
    }
}

/// Physical link of the WAN port
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EthernetStatistics {
    pub line_state: String,
    pub current_speed_mbps: i64,
    pub duplex_mode: String,
}

impl EthernetStatistics {
    pub fn from_stats(tree: &StatsTree) -> ExtractResult<Self> {
        let data = single_row(tree, ETHERNET_SECTION)?;
        Ok(Self {
            line_state: get_string_upper(&data, "Line State")?,
            current_speed_mbps: get_int(&data, "Current Speed (Mbps)")?,
            duplex_mode: get_string_upper(&data, "Current Duplex")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ipv6Information {
    pub status: String,
    pub service_type: String,
    pub global_unicast_ipv6_address: String,
    pub link_local_address: String,
    pub default_ipv6_gateway_address: String,
    pub primary_dns: Option<String>,
    pub secondary_dns: Option<String>,
    pub mtu: i64,
}

impl Ipv6Information {
    pub fn from_stats(tree: &StatsTree) -> ExtractResult<Self> {
        let data = single_row(tree, IPV6_SECTION)?;
        Ok(Self {
            status: get_string_upper(&data, "Status")?,
            service_type: get_string_upper(&data, "Service Type")?,
            global_unicast_ipv6_address: get_string_lower(&data, "Global Unicast IPv6 Address")?,
            link_local_address: get_string_lower(&data, "Link Local Address")?,
            default_ipv6_gateway_address: get_string_lower(&data, "Default IPv6 Gateway Address")?,
            primary_dns: opt_string_lower(&data, "Primary DNS", None)?,
            secondary_dns: opt_string_lower(&data, "Secondary DNS", None)?,
            mtu: get_int(&data, "MTU")?,
        })
    }
}

/// WAN IPv4 traffic counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EthernetIpv4Statistics {
    pub receive_packets: i64,
    pub transmit_packets: i64,
    pub receive_bytes: i64,
    pub transmit_bytes: i64,
    pub receive_unicast: i64,
    pub transmit_unicast: i64,
    pub receive_multicast: i64,
    pub transmit_multicast: i64,
    pub receive_drops: i64,
    pub transmit_drops: i64,
    pub receive_errors: i64,
    pub transmit_errors: i64,
    pub collisions: i64,
}

impl EthernetIpv4Statistics {
    pub fn from_stats(tree: &StatsTree) -> ExtractResult<Self> {
        let data = single_row(tree, IPV4_STATISTICS_SECTION)?;
        Ok(Self {
            receive_packets: get_int(&data, "Receive Packets")?,
            transmit_packets: get_int(&data, "Transmit Packets")?,
            receive_bytes: get_int(&data, "Receive Bytes")?,
            transmit_bytes: get_int(&data, "Transmit Bytes")?,
            receive_unicast: get_int(&data, "Receive Unicast")?,
            transmit_unicast: get_int(&data, "Transmit Unicast")?,
            receive_multicast: get_int(&data, "Receive Multicast")?,
            transmit_multicast: get_int(&data, "Transmit Multicast")?,
            receive_drops: get_int(&data, "Receive Drops")?,
            transmit_drops: get_int(&data, "Transmit Drops")?,
            receive_errors: get_int(&data, "Receive Errors")?,
            transmit_errors: get_int(&data, "Transmit Errors")?,
            collisions: get_int(&data, "Collisions")?,
        })
    }
}

/// WAN IPv6 traffic counters, each absent when the device leaves it blank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EthernetIpv6Statistics {
    pub receive_packets: Option<i64>,
    pub transmit_packets: Option<i64>,
    pub receive_bytes: Option<i64>,
    pub transmit_bytes: Option<i64>,
    pub receive_discards: Option<i64>,
    pub transmit_discards: Option<i64>,
    pub receive_errors: Option<i64>,
    pub transmit_errors: Option<i64>,
}

impl EthernetIpv6Statistics {
    pub fn from_stats(tree: &StatsTree) -> ExtractResult<Self> {
        let data = single_row(tree, IPV6_STATISTICS_SECTION)?;
        Ok(Self {
            receive_packets: opt_int(&data, "Receive Packets", None)?,
            transmit_packets: opt_int(&data, "Transmit Packets", None)?,
            receive_bytes: opt_int(&data, "Receive Bytes", None)?,
            transmit_bytes: opt_int(&data, "Transmit Bytes", None)?,
            receive_discards: opt_int(&data, "Receive Discards", None)?,
            transmit_discards: opt_int(&data, "Transmit Discards", None)?,
            receive_errors: opt_int(&data, "Receive Errors", None)?,
            transmit_errors: opt_int(&data, "Transmit Errors", None)?,
        })
    }
}

/// Everything on the broadband status page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadbandStatus {
    pub broadband_wan_information: BroadbandWanInformation,
    pub ethernet_statistics: EthernetStatistics,
    pub ipv6_information: Ipv6Information,
    pub ipv4_statistics: EthernetIpv4Statistics,
    pub ipv6_statistics: EthernetIpv6Statistics,
}

impl BroadbandStatus {
    pub fn from_stats(tree: &StatsTree) -> ExtractResult<Self> {
        Ok(Self {
            broadband_wan_information: BroadbandWanInformation::from_stats(tree)?,
            ethernet_statistics: EthernetStatistics::from_stats(tree)?,
            ipv6_information: Ipv6Information::from_stats(tree)?,
            ipv4_statistics: EthernetIpv4Statistics::from_stats(tree)?,
            ipv6_statistics: EthernetIpv6Statistics::from_stats(tree)?,
        })
    }
}

impl DomainRecord for BroadbandStatus {}

pub struct BroadbandStatusPage;

impl StatusPage for BroadbandStatusPage {
    type Record = BroadbandStatus;
    const NAME: &'static str = "BroadbandStatusGatherer";
    const PATH: &'static str = "/cgi-bin/broadbandstatistics.ha";

    fn map(tree: &StatsTree) -> Result<BroadbandStatus> {
        Ok(BroadbandStatus::from_stats(tree)?)
    }
}

pub type BroadbandStatusGatherer = ModemGatherer<BroadbandStatusPage>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::table::tokenize;

    fn table(summary: &str, rows: &[(&str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(label, value)| format!("<tr><th>{label}</th><td>{value}</td></tr>"))
            .collect();
        format!(r#"<table summary="{summary}">{body}</table>"#)
    }

    fn wan_table(extra: &[(&str, &str)]) -> String {
        let mut rows = vec![
            ("Broadband Connection Source", "fiber"),
            ("Broadband Connection", "Up"),
            ("Broadband Network Type", "Dynamic"),
            ("Broadband IPv4 Address", "99.1.2.3"),
            ("Gateway IPv4 Address", "99.1.2.1"),
            ("MAC Address", "AA:BB:CC:DD:EE:01"),
            ("Primary DNS", "68.94.156.9"),
            ("Secondary DNS", "68.94.157.9"),
            ("MTU", "1500"),
        ];
        rows.extend_from_slice(extra);
        table(WAN_INFORMATION_SECTION, &rows)
    }

    fn ipv6_statistics_table(value: &str) -> String {
        table(
            IPV6_STATISTICS_SECTION,
            &[
                ("Receive Packets", value),
                ("Transmit Packets", value),
                ("Receive Bytes", value),
                ("Transmit Bytes", value),
                ("Receive Discards", value),
                ("Transmit Discards", value),
                ("Receive Errors", value),
                ("Transmit Errors", value),
            ],
        )
    }

    fn page(wan: String, ipv6_stats: String) -> String {
        let ethernet = table(
            ETHERNET_SECTION,
            &[
                ("Line State", "up"),
                ("Current Speed (Mbps)", "1000"),
                ("Current Duplex", "full"),
            ],
        );
        let ipv6 = table(
            IPV6_SECTION,
            &[
                ("Status", "Available"),
                ("Service Type", "slaac"),
                ("Global Unicast IPv6 Address", "2600:1700:ABCD::1"),
                ("Link Local Address", "FE80::1"),
                ("Default IPv6 Gateway Address", "FE80::FF"),
                ("Primary DNS", "2001:DB8::53"),
                ("MTU", "1500"),
            ],
        );
        let ipv4_stats = table(
            IPV4_STATISTICS_SECTION,
            &[
                ("Receive Packets", "1000"),
                ("Transmit Packets", "900"),
                ("Receive Bytes", "123456"),
                ("Transmit Bytes", "65432"),
                ("Receive Unicast", "990"),
                ("Transmit Unicast", "890"),
                ("Receive Multicast", "10"),
                ("Transmit Multicast", "10"),
                ("Receive Drops", "0"),
                ("Transmit Drops", "1"),
                ("Receive Errors", "2"),
                ("Transmit Errors", "3"),
                ("Collisions", "0"),
            ],
        );
        format!("<html><body>{wan}{ethernet}{ipv6}{ipv4_stats}{ipv6_stats}</body></html>")
    }

    #[test]
    fn test_maps_every_sub_record() {
        let tree = tokenize(&page(wan_table(&[]), ipv6_statistics_table("7")));
        let status = BroadbandStatus::from_stats(&tree).unwrap();

        let wan = &status.broadband_wan_information;
        assert_eq!(wan.connection_source, "FIBER");
        assert_eq!(wan.connection, "UP");
        assert_eq!(wan.network_type, "DYNAMIC");
        assert_eq!(wan.mac_address, "aa:bb:cc:dd:ee:01");
        assert_eq!(wan.primary_dns_name, None);
        assert_eq!(wan.mtu, 1500);

        assert_eq!(status.ethernet_statistics.line_state, "UP");
        assert_eq!(status.ethernet_statistics.current_speed_mbps, 1000);
        assert_eq!(status.ethernet_statistics.duplex_mode, "FULL");

        let ipv6 = &status.ipv6_information;
        assert_eq!(ipv6.status, "AVAILABLE");
        assert_eq!(ipv6.service_type, "SLAAC");
        assert_eq!(ipv6.global_unicast_ipv6_address, "2600:1700:abcd::1");
        assert_eq!(ipv6.primary_dns.as_deref(), Some("2001:db8::53"));
        assert_eq!(ipv6.secondary_dns, None);

        assert_eq!(status.ipv4_statistics.receive_bytes, 123_456);
        assert_eq!(status.ipv4_statistics.transmit_errors, 3);
        assert_eq!(status.ipv6_statistics.receive_packets, Some(7));
    }

    #[test]
    fn test_optional_dns_names() {
        let wan = wan_table(&[("Primary DNS Name", "dns1.att.net")]);
        let status =
            BroadbandStatus::from_stats(&tokenize(&page(wan, ipv6_statistics_table("0")))).unwrap();
        assert_eq!(
            status.broadband_wan_information.primary_dns_name.as_deref(),
            Some("dns1.att.net")
        );
        assert_eq!(status.broadband_wan_information.secondary_dns_name, None);
    }

    #[test]
    fn test_blank_ipv6_counters_are_absent() {
        let status =
            BroadbandStatus::from_stats(&tokenize(&page(wan_table(&[]), ipv6_statistics_table(""))))
                .unwrap();
        let stats = &status.ipv6_statistics;
        assert_eq!(stats.receive_packets, None);
        assert_eq!(stats.transmit_errors, None);
    }

    #[test]
    fn test_garbage_ipv6_counter_is_invalid() {
        let tree = tokenize(&page(wan_table(&[]), ipv6_statistics_table("n/a")));
        assert!(matches!(
            BroadbandStatus::from_stats(&tree),
            Err(ExtractError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_required_sub_record() {
        let markup = wan_table(&[]);
        assert_eq!(
            BroadbandStatus::from_stats(&tokenize(&markup)),
            Err(ExtractError::MissingField {
                label: ETHERNET_SECTION.to_string()
            })
        );
    }
}
