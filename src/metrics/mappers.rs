// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Projection of device records onto gauges

use super::registry::MetricRegistry;
use crate::client::ModemConfig;
use crate::error::{MetricError, Result};
use crate::gatherer::{Gatherer, ModemSource};
use crate::sources::{
    BroadbandStatus, EthernetIpv4Statistics, EthernetIpv6Statistics, PortLanStatistics,
    SystemInformation,
};
use prometheus::GaugeVec;
use tracing::warn;

/// Prefix of every device metric
pub const METRIC_PREFIX: &str = "att_modem";

/// Labels carried by every device metric
pub const BASE_LABELS: [&str; 2] = ["modem_id", "modem_url"];

/// Gauge factory bound to one device
#[derive(Clone)]
pub struct ModemGauges {
    registry: MetricRegistry,
    prefix: String,
    base_values: [String; 2],
}

impl ModemGauges {
    pub fn new(registry: MetricRegistry, modem: &ModemConfig) -> Self {
        Self {
            registry,
            prefix: METRIC_PREFIX.to_string(),
            base_values: [modem.id.clone(), modem.url.clone()],
        }
    }

    /// `att_modem_<name>`
    pub fn metric_name(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }

    /// `AT&T Modem <name with spaces>`
    pub fn metric_description(&self, name: &str) -> String {
        format!("AT&T Modem {}", name.replace('_', " "))
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Set gauge `name` for this device, with `extra` labels after the base ones
    pub fn set(&self, name: &str, extra: &[(&str, &str)], value: f64) -> Result<()> {
        let gauge = self.gauge(name, extra)?;
        self.write(&gauge, extra, value)
    }

    /// Drop this device's series of gauge `name`, if one was ever written
    pub fn clear(&self, name: &str, extra: &[(&str, &str)]) -> Result<()> {
        let Some(gauge) = self.registry.find_gauge(&self.metric_name(name)) else {
            return Ok(());
        };
        match gauge.remove_label_values(&self.label_values(extra)) {
            // missing label values: nothing to drop
            Ok(()) | Err(prometheus::Error::Msg(_)) => Ok(()),
            Err(e) => Err(MetricError::Prometheus(e.to_string()).into()),
        }
    }

    /// Project every field as `<group>_<field>`.
    ///
    /// All gauges are resolved before any value is written, so a registration
    /// conflict leaves the record's series untouched. Absent fields lose
    /// their series instead of keeping a value from an earlier refresh.
    pub fn set_fields<R: GaugeFields + ?Sized>(
        &self,
        group: &str,
        record: &R,
        extra: &[(&str, &str)],
    ) -> Result<()> {
        let mut present = Vec::new();
        let mut absent = Vec::new();
        for (field, value) in record.gauge_fields() {
            let name = format!("{group}_{field}");
            match value {
                Some(value) => present.push((self.gauge(&name, extra)?, value)),
                None => {
                    warn!("Skipping key with no value {}.{}", group, field);
                    absent.push(name);
                }
            }
        }

        for (gauge, value) in &present {
            self.write(gauge, extra, *value)?;
        }
        for name in &absent {
            self.clear(name, extra)?;
        }
        Ok(())
    }

    fn gauge(&self, name: &str, extra: &[(&str, &str)]) -> Result<GaugeVec> {
        let mut label_names: Vec<&str> = BASE_LABELS.to_vec();
        label_names.extend(extra.iter().map(|(label, _)| *label));
        self.registry.get_or_create_gauge(
            &self.metric_name(name),
            &self.metric_description(name),
            &label_names,
        )
    }

    fn write(&self, gauge: &GaugeVec, extra: &[(&str, &str)], value: f64) -> Result<()> {
        gauge
            .get_metric_with_label_values(&self.label_values(extra))
            .map_err(|e| MetricError::Prometheus(e.to_string()))?
            .set(value);
        Ok(())
    }

    fn label_values<'a>(&'a self, extra: &[(&str, &'a str)]) -> Vec<&'a str> {
        let mut values: Vec<&str> = self.base_values.iter().map(String::as_str).collect();
        values.extend(extra.iter().map(|(_, value)| *value));
        values
    }
}

/// Numeric view of a record, field name to value
pub trait GaugeFields {
    fn gauge_fields(&self) -> Vec<(&'static str, Option<f64>)>;
}

impl GaugeFields for EthernetIpv4Statistics {
    fn gauge_fields(&self) -> Vec<(&'static str, Option<f64>)> {
        [
            ("receive_packets", self.receive_packets),
            ("transmit_packets", self.transmit_packets),
            ("receive_bytes", self.receive_bytes),
            ("transmit_bytes", self.transmit_bytes),
            ("receive_unicast", self.receive_unicast),
            ("transmit_unicast", self.transmit_unicast),
            ("receive_multicast", self.receive_multicast),
            ("transmit_multicast", self.transmit_multicast),
            ("receive_drops", self.receive_drops),
            ("transmit_drops", self.transmit_drops),
            ("receive_errors", self.receive_errors),
            ("transmit_errors", self.transmit_errors),
            ("collisions", self.collisions),
        ]
        .into_iter()
        .map(|(field, value)| (field, Some(value as f64)))
        .collect()
    }
}

impl GaugeFields for EthernetIpv6Statistics {
    fn gauge_fields(&self) -> Vec<(&'static str, Option<f64>)> {
        [
            ("receive_packets", self.receive_packets),
            ("transmit_packets", self.transmit_packets),
            ("receive_bytes", self.receive_bytes),
            ("transmit_bytes", self.transmit_bytes),
            ("receive_discards", self.receive_discards),
            ("transmit_discards", self.transmit_discards),
            ("receive_errors", self.receive_errors),
            ("transmit_errors", self.transmit_errors),
        ]
        .into_iter()
        .map(|(field, value)| (field, value.map(|v| v as f64)))
        .collect()
    }
}

impl GaugeFields for PortLanStatistics {
    fn gauge_fields(&self) -> Vec<(&'static str, Option<f64>)> {
        let state = if self.is_up() { 1.0 } else { 0.0 };
        let counters = [
            ("transmit_speed", self.transmit_speed),
            ("transmit_packets", self.transmit_packets),
            ("transmit_bytes", self.transmit_bytes),
            ("transmit_unicast", self.transmit_unicast),
            ("transmit_multicast", self.transmit_multicast),
            ("transmit_dropped", self.transmit_dropped),
            ("transmit_errors", self.transmit_errors),
            ("receive_packets", self.receive_packets),
            ("receive_bytes", self.receive_bytes),
            ("receive_unicast", self.receive_unicast),
            ("receive_multicast", self.receive_multicast),
            ("receive_dropped", self.receive_dropped),
            ("receive_errors", self.receive_errors),
        ];
        std::iter::once(("state", Some(state)))
            .chain(counters.into_iter().map(|(field, value)| (field, Some(value as f64))))
            .collect()
    }
}

/// Writes one record type onto a device's gauges
pub trait RecordProjector {
    type Record;

    fn project(&self, record: &Self::Record, gauges: &ModemGauges) -> Result<()>;
}

/// `uptime_seconds`, labelled with the device identity
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInformationProjector;

impl RecordProjector for SystemInformationProjector {
    type Record = SystemInformation;

    fn project(&self, record: &SystemInformation, gauges: &ModemGauges) -> Result<()> {
        gauges.set(
            "uptime_seconds",
            &[
                ("manufacturer", record.manufacturer.as_str()),
                ("model_number", record.model_number.as_str()),
                ("serial_number", record.serial_number.as_str()),
                ("mac_address", record.mac_address.as_str()),
            ],
            record.time_since_last_reboot.as_secs_f64(),
        )
    }
}

/// WAN traffic counters as `wan_ipv4_*` and `wan_ipv6_*`
#[derive(Debug, Clone, Copy, Default)]
pub struct BroadbandStatusProjector;

impl RecordProjector for BroadbandStatusProjector {
    type Record = BroadbandStatus;

    fn project(&self, record: &BroadbandStatus, gauges: &ModemGauges) -> Result<()> {
        gauges.set_fields("wan_ipv4", &record.ipv4_statistics, &[])?;
        gauges.set_fields("wan_ipv6", &record.ipv6_statistics, &[])
    }
}

/// One `lan_*` series per port, told apart by the `lan_port` label
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeNetworkStatusProjector;

impl RecordProjector for HomeNetworkStatusProjector {
    type Record = Vec<PortLanStatistics>;

    fn project(&self, record: &Vec<PortLanStatistics>, gauges: &ModemGauges) -> Result<()> {
        for port in record {
            let lan_port = port.lan_port.to_string();
            gauges.set_fields("lan", port, &[("lan_port", lan_port.as_str())])?;
        }
        Ok(())
    }
}

/// Re-gathers a record and writes it to the registry
pub trait MetricMapper: Send + Sync {
    fn name(&self) -> &str;

    fn refresh(&self) -> Result<()>;
}

/// Pairs a (usually cached) device gatherer with a projector
pub struct ModemMetricMapper<G, P> {
    gatherer: G,
    projector: P,
    gauges: ModemGauges,
    name: String,
}

impl<G, P> ModemMetricMapper<G, P>
where
    G: Gatherer + ModemSource,
    P: RecordProjector<Record = G::Output>,
{
    /// Device identity is read through any cache or `Arc` wrapping `gatherer`
    pub fn new(gatherer: G, projector: P, registry: MetricRegistry) -> Self {
        let gauges = ModemGauges::new(registry, gatherer.modem());
        let name = format!("MetricMapper({})", gatherer.name());
        Self {
            gatherer,
            projector,
            gauges,
            name,
        }
    }

    pub fn gauges(&self) -> &ModemGauges {
        &self.gauges
    }
}

impl<G, P> MetricMapper for ModemMetricMapper<G, P>
where
    G: Gatherer + ModemSource + Send + Sync,
    P: RecordProjector<Record = G::Output> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn refresh(&self) -> Result<()> {
        let record = self.gatherer.gather()?;
        self.projector.project(&record, &self.gauges)
    }
}

pub type SystemInformationMapper<G> = ModemMetricMapper<G, SystemInformationProjector>;
pub type BroadbandStatusMapper<G> = ModemMetricMapper<G, BroadbandStatusProjector>;
pub type HomeNetworkStatusMapper<G> = ModemMetricMapper<G, HomeNetworkStatusProjector>;
