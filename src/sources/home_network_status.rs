// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Home network (LAN) status page

use crate::error::Result;
use crate::extract::{get_int, get_string_upper, pivot_rows, ExtractResult, Row};
use crate::gatherer::{ModemGatherer, StatusPage};
use crate::record::DomainRecord;
use crate::table::StatsTree;
use serde::Serialize;

pub const SECTION: &str = "LAN Ethernet Statistics Table";

/// Physical LAN ports on the gateway, one column each
pub const LAN_PORT_COUNT: usize = 4;

/// Link state and traffic counters of one LAN port
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortLanStatistics {
    /// 1-based port number
    pub lan_port: u8,
    /// `UP` when a link is established
    pub state: String,
    pub transmit_speed: i64,
    pub transmit_packets: i64,
    pub transmit_bytes: i64,
    pub transmit_unicast: i64,
    pub transmit_multicast: i64,
    pub transmit_dropped: i64,
    pub transmit_errors: i64,
    pub receive_packets: i64,
    pub receive_bytes: i64,
    pub receive_unicast: i64,
    pub receive_multicast: i64,
    pub receive_dropped: i64,
    pub receive_errors: i64,
}

impl PortLanStatistics {
    fn from_row(lan_port: u8, data: &Row) -> ExtractResult<Self> {
        Ok(Self {
            lan_port,
            state: get_string_upper(data, "State")?,
            transmit_speed: get_int(data, "Transmit Speed")?,
            transmit_packets: get_int(data, "Transmit Packets")?,
            transmit_bytes: get_int(data, "Transmit Bytes")?,
            transmit_unicast: get_int(data, "Transmit Unicast")?,
            transmit_multicast: get_int(data, "Transmit Multicast")?,
            transmit_dropped: get_int(data, "Transmit Dropped")?,
            transmit_errors: get_int(data, "Transmit Errors")?,
            receive_packets: get_int(data, "Receive Packets")?,
            receive_bytes: get_int(data, "Receive Bytes")?,
            receive_unicast: get_int(data, "Receive Unicast")?,
            receive_multicast: get_int(data, "Receive Multicast")?,
            receive_dropped: get_int(data, "Receive Dropped")?,
            receive_errors: get_int(data, "Receive Errors")?,
        })
    }

    /// True when the link is up
    pub fn is_up(&self) -> bool {
        self.state == "UP"
    }

    /// Map every port of the page, in port order
    pub fn from_stats(tree: &StatsTree) -> ExtractResult<Vec<Self>> {
        pivot_rows(tree, SECTION, LAN_PORT_COUNT)?
            .iter()
            .zip(1u8..)
            .map(|(row, port)| Self::from_row(port, row))
            .collect()
    }
}

impl DomainRecord for PortLanStatistics {}

impl DomainRecord for Vec<PortLanStatistics> {}

pub struct HomeNetworkStatusPage;

impl StatusPage for HomeNetworkStatusPage {
    type Record = Vec<PortLanStatistics>;
    const NAME: &'static str = "HomeNetworkStatusGatherer";
    const PATH: &'static str = "/cgi-bin/lanstatistics.ha";

    fn map(tree: &StatsTree) -> Result<Vec<PortLanStatistics>> {
        Ok(PortLanStatistics::from_stats(tree)?)
    }
}

pub type HomeNetworkStatusGatherer = ModemGatherer<HomeNetworkStatusPage>;
