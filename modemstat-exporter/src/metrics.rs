// Modemstat Exporter - Prometheus endpoint
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus exposition of every device mapper.
//!
//! A scrape refreshes each mapper in turn, then encodes the shared registry.
//! A mapper that fails keeps its previous gauge values and bumps
//! `modemstat_exporter_scrape_errors_total`.

use modemstat::metrics::{MetricMapper, MetricRegistry};
use prometheus::CounterVec;
use tracing::{debug, error};

/// Failed refreshes, by mapper
pub const SCRAPE_ERRORS_TOTAL: &str = "modemstat_exporter_scrape_errors_total";

/// Endpoint served by [`PrometheusExporter`]
pub const METRICS_ENDPOINT: &str = "/metrics";

pub struct PrometheusExporter {
    registry: MetricRegistry,
    mappers: Vec<Box<dyn MetricMapper>>,
    scrape_errors: CounterVec,
}

impl PrometheusExporter {
    pub fn new(
        registry: MetricRegistry,
        mappers: Vec<Box<dyn MetricMapper>>,
    ) -> modemstat::Result<Self> {
        let scrape_errors = registry.get_or_create_counter(
            SCRAPE_ERRORS_TOTAL,
            "Failed metric refreshes by mapper",
            &["mapper"],
        )?;
        Ok(Self {
            registry,
            mappers,
            scrape_errors,
        })
    }

    pub fn name(&self) -> &str {
        "PrometheusExporter"
    }

    pub fn endpoint(&self) -> &str {
        METRICS_ENDPOINT
    }

    pub fn mapper_names(&self) -> Vec<&str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }

    /// Refresh every mapper and encode the registry
    pub fn export(&self) -> modemstat::Result<String> {
        for mapper in &self.mappers {
            match mapper.refresh() {
                Ok(()) => debug!(mapper = mapper.name(), "Refreshed"),
                Err(e) => {
                    error!(mapper = mapper.name(), "Refresh failed: {}", e);
                    self.scrape_errors.with_label_values(&[mapper.name()]).inc();
                }
            }
        }
        self.registry.encode()
    }
}
