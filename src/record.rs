// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Serialization contract shared by every scraped record

use crate::error::{ModemError, Result};
use serde::Serialize;

/// A fully validated record built from one scraped page.
///
/// Exporters call [`DomainRecord::to_plain`] instead of serializing records
/// ad hoc, so every record reaches JSON through the same path.
pub trait DomainRecord: Serialize {
    /// Project the record onto plain JSON values
    fn to_plain(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ModemError::Serialize(e.to_string()))
    }
}

/// Serialize a [`std::time::Duration`] as fractional seconds
pub(crate) mod duration_seconds {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}
