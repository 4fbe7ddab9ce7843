// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! JSON export boundary

use crate::error::Result;
use crate::gatherer::Gatherer;
use crate::record::DomainRecord;
use serde_json::Value;

/// Something served on its own endpoint
pub trait DataExporter: Send + Sync {
    /// Exporter name, for logs
    fn name(&self) -> &str;

    /// Endpoint path, starting with `/`
    fn endpoint(&self) -> &str;

    /// Produce the document to serve
    fn export(&self) -> Result<Value>;
}

/// Serves the record of a gatherer as JSON
pub struct GathererExporter<G> {
    gatherer: G,
    name: String,
    endpoint: String,
}

impl<G: Gatherer> GathererExporter<G> {
    pub fn new(gatherer: G) -> Self {
        let name = format!("GathererExporter({})", gatherer.name());
        let endpoint = endpoint_for(gatherer.name());
        Self {
            gatherer,
            name,
            endpoint,
        }
    }

    pub fn gatherer(&self) -> &G {
        &self.gatherer
    }
}

impl<G> DataExporter for GathererExporter<G>
where
    G: Gatherer + Send + Sync,
    G::Output: DomainRecord,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn export(&self) -> Result<Value> {
        self.gatherer.gather()?.to_plain()
    }
}

/// `/api/` followed by the kebab-cased gatherer name without its `Gatherer`
/// suffix: `SystemInformationGatherer` becomes `/api/system-information`.
pub fn endpoint_for(gatherer_name: &str) -> String {
    let mut kebab = String::with_capacity(gatherer_name.len() + 4);
    for (i, c) in gatherer_name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            kebab.push('-');
        }
        kebab.extend(c.to_lowercase());
    }
    let kebab = kebab.replace("-gatherer", "");
    format!("/api/{kebab}")
}
