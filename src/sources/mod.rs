// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-page record mappers
//!
//! Each page of the gateway maps onto one record type. Section names are the
//! literal `summary` attributes of the firmware's tables.
//!
//! | Page | Path | Gatherer |
//! |------|------|----------|
//! | System information | `/cgi-bin/sysinfo.ha` | [`SystemInformationGatherer`] |
//! | Broadband status | `/cgi-bin/broadbandstatistics.ha` | [`BroadbandStatusGatherer`] |
//! | Home network status | `/cgi-bin/lanstatistics.ha` | [`HomeNetworkStatusGatherer`] |

pub mod broadband_status;
pub mod home_network_status;
pub mod system_information;

pub use broadband_status::{
    BroadbandStatus, BroadbandStatusGatherer, BroadbandStatusPage, BroadbandWanInformation,
    EthernetIpv4Statistics, EthernetIpv6Statistics, EthernetStatistics, Ipv6Information,
};
pub use home_network_status::{
    HomeNetworkStatusGatherer, HomeNetworkStatusPage, PortLanStatistics, LAN_PORT_COUNT,
};
pub use system_information::{SystemInformation, SystemInformationGatherer, SystemInformationPage};
