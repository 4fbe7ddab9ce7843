// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics
//!
//! Every device metric is a gauge named `att_modem_<field>`, labelled with
//! `modem_id` and `modem_url`:
//!
//! | Record | Metrics | Extra labels |
//! |--------|---------|--------------|
//! | System information | `uptime_seconds` | manufacturer, model_number, serial_number, mac_address |
//! | Broadband status | `wan_ipv4_*`, `wan_ipv6_*` | |
//! | Home network status | `lan_*` (`lan_state` is 1 when up) | lan_port |
//!
//! The registry is injected: build one [`MetricRegistry`] at startup and hand
//! clones to every mapper.
//!
//! ## Example
//!
//! ```rust,ignore
//! use modemstat::metrics::{MetricMapper, MetricRegistry, SystemInformationMapper, SystemInformationProjector};
//!
//! let registry = MetricRegistry::new();
//! let mapper = SystemInformationMapper::new(cached_gatherer, SystemInformationProjector, registry.clone());
//! mapper.refresh()?;
//! println!("{}", registry.encode()?);
//! ```

mod mappers;
mod registry;

pub use mappers::{
    BroadbandStatusMapper, BroadbandStatusProjector, GaugeFields, HomeNetworkStatusMapper,
    HomeNetworkStatusProjector, MetricMapper, ModemGauges, ModemMetricMapper, RecordProjector,
    SystemInformationMapper, SystemInformationProjector, BASE_LABELS, METRIC_PREFIX,
};
pub use registry::{MetricKind, MetricRegistry};
