// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Injected metrics registry with per-name kind and label bookkeeping

use crate::error::{MetricError, Result};
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Kind of a registered metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
enum Collector {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

impl Collector {
    fn kind(&self) -> MetricKind {
        match self {
            Collector::Gauge(_) => MetricKind::Gauge,
            Collector::Counter(_) => MetricKind::Counter,
        }
    }
}

struct RegisteredMetric {
    collector: Collector,
    label_names: Vec<String>,
}

fn prometheus_error(err: prometheus::Error) -> MetricError {
    MetricError::Prometheus(err.to_string())
}

/// Handle over one prometheus registry.
///
/// A metric name is bound to exactly one kind and one label set for the
/// lifetime of the registry. Asking again with the same kind and labels
/// returns the existing collector. Clones share the same registry.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    registry: Registry,
    metrics: Arc<Mutex<HashMap<String, RegisteredMetric>>>,
}

impl MetricRegistry {
    /// Create an empty, isolated registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Gauge named `name`, registered on first use
    pub fn get_or_create_gauge(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<GaugeVec> {
        let collector = self.get_or_create(name, MetricKind::Gauge, label_names, || {
            let gauge =
                GaugeVec::new(Opts::new(name, help), label_names).map_err(prometheus_error)?;
            Ok(Collector::Gauge(gauge))
        })?;
        match collector {
            Collector::Gauge(gauge) => Ok(gauge),
            Collector::Counter(_) => {
                Err(self.kind_conflict(name, MetricKind::Counter, MetricKind::Gauge))
            }
        }
    }

    /// Counter named `name`, registered on first use
    pub fn get_or_create_counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<CounterVec> {
        let collector = self.get_or_create(name, MetricKind::Counter, label_names, || {
            let counter =
                CounterVec::new(Opts::new(name, help), label_names).map_err(prometheus_error)?;
            Ok(Collector::Counter(counter))
        })?;
        match collector {
            Collector::Counter(counter) => Ok(counter),
            Collector::Gauge(_) => {
                Err(self.kind_conflict(name, MetricKind::Gauge, MetricKind::Counter))
            }
        }
    }

    /// Gauge already registered under `name`, without registering one
    pub fn find_gauge(&self, name: &str) -> Option<GaugeVec> {
        match self.lock().get(name).map(|m| &m.collector) {
            Some(Collector::Gauge(gauge)) => Some(gauge.clone()),
            _ => None,
        }
    }

    /// Kind and label names registered under `name`
    pub fn describe(&self, name: &str) -> Option<(MetricKind, Vec<String>)> {
        self.lock()
            .get(name)
            .map(|m| (m.collector.kind(), m.label_names.clone()))
    }

    /// Number of registered metric names
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Encode every metric in the text exposition format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(prometheus_error)?;
        String::from_utf8(buffer).map_err(|e| MetricError::Prometheus(e.to_string()).into())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, RegisteredMetric>> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn kind_conflict(
        &self,
        name: &str,
        existing: MetricKind,
        requested: MetricKind,
    ) -> crate::error::ModemError {
        MetricError::KindConflict {
            name: name.to_string(),
            existing: existing.to_string(),
            requested: requested.to_string(),
        }
        .into()
    }

    fn get_or_create<F>(
        &self,
        name: &str,
        kind: MetricKind,
        label_names: &[&str],
        create: F,
    ) -> Result<Collector>
    where
        F: FnOnce() -> std::result::Result<Collector, MetricError>,
    {
        // Held across registration so two callers cannot register one name twice
        let mut metrics = self.lock();

        if let Some(existing) = metrics.get(name) {
            let existing_kind = existing.collector.kind();
            if existing_kind != kind {
                return Err(self.kind_conflict(name, existing_kind, kind));
            }
            if existing.label_names.iter().map(String::as_str).ne(label_names.iter().copied()) {
                return Err(MetricError::LabelConflict {
                    name: name.to_string(),
                    existing: existing.label_names.clone(),
                    requested: label_names.iter().map(|l| l.to_string()).collect(),
                }
                .into());
            }
            return Ok(existing.collector.clone());
        }

        let collector = create()?;
        let registration = match &collector {
            Collector::Gauge(gauge) => self.registry.register(Box::new(gauge.clone())),
            Collector::Counter(counter) => self.registry.register(Box::new(counter.clone())),
        };
        registration.map_err(prometheus_error)?;
        debug!(name, kind = %kind, labels = ?label_names, "Created metric");

        metrics.insert(
            name.to_string(),
            RegisteredMetric {
                collector: collector.clone(),
                label_names: label_names.iter().map(|l| l.to_string()).collect(),
            },
        );
        Ok(collector)
    }
}
