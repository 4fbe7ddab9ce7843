// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Device transport
//!
//! [`PageFetcher`] is the only seam between the pipeline and the network.
//! [`ModemClient`] reads pages over HTTP; [`DirectoryFetcher`] replays pages
//! saved to disk.

use crate::error::{FetchError, ModemError, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error};

/// Default device identifier
pub const DEFAULT_MODEM_ID: &str = "att";

/// Default device address
pub const DEFAULT_MODEM_URL: &str = "http://192.168.1.254";

/// Request timeout for every page fetch
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static NONCE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[name="nonce"]"#)
        .expect("Failed to parse nonce selector - this is a bug")
});

/// Identity and address of one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModemConfig {
    /// Identifier reported in the `modem_id` label
    pub id: String,
    /// Base URL of the device's web interface
    pub url: String,
    /// Device access code, kept for a future login flow
    pub access_code: Option<String>,
}

impl ModemConfig {
    /// Build a configuration, rejecting an empty id or url
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        access_code: Option<String>,
    ) -> Result<Self> {
        let id = id.into();
        let url = url.into();
        if id.trim().is_empty() {
            return Err(ModemError::Config("id is required".to_string()));
        }
        if url.trim().is_empty() {
            return Err(ModemError::Config("url is required".to_string()));
        }
        Ok(Self {
            id,
            url,
            access_code: access_code.filter(|code| !code.is_empty()),
        })
    }
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_MODEM_ID.to_string(),
            url: DEFAULT_MODEM_URL.to_string(),
            access_code: None,
        }
    }
}

/// Retrieves the raw markup of one device page
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `path` (e.g. `/cgi-bin/sysinfo.ha`)
    fn fetch(&self, path: &str) -> std::result::Result<String, FetchError>;

    /// Device the pages come from
    fn config(&self) -> &ModemConfig;
}

/// HTTP client for the device's web interface
pub struct ModemClient {
    config: ModemConfig,
    base: Url,
    http: Client,
    nonce: Mutex<Option<String>>,
}

impl ModemClient {
    /// Create a client for `config`.
    ///
    /// Must be called outside of an async runtime: the blocking client owns
    /// its own runtime internally.
    pub fn new(config: ModemConfig) -> Result<Self> {
        let base = Url::parse(&config.url).map_err(|e| FetchError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Request {
                url: config.url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            config,
            base,
            http,
            nonce: Mutex::new(None),
        })
    }

    /// Last nonce seen on a fetched page
    pub fn nonce(&self) -> Option<String> {
        self.nonce
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url_for(&self, path: &str) -> std::result::Result<Url, FetchError> {
        self.base.join(path).map_err(|e| FetchError::InvalidUrl {
            url: format!("{}{}", self.config.url, path),
            reason: e.to_string(),
        })
    }

    fn classify(url: &Url, err: reqwest::Error) -> FetchError {
        let url = url.to_string();
        if err.is_timeout() {
            error!("Timeout connecting to {}", url);
            FetchError::Timeout { url }
        } else if err.is_connect() {
            error!("Connection error to {}: {}", url, err);
            FetchError::Connection {
                url,
                reason: err.to_string(),
            }
        } else {
            error!("Request failed for {}: {}", url, err);
            FetchError::Request {
                url,
                reason: err.to_string(),
            }
        }
    }
}

impl PageFetcher for ModemClient {
    fn fetch(&self, path: &str) -> std::result::Result<String, FetchError> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|e| Self::classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            error!("Request failed for {}: HTTP {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let markup = response.text().map_err(|e| Self::classify(&url, e))?;
        if let Some(nonce) = extract_nonce(&markup) {
            *self.nonce.lock().unwrap_or_else(PoisonError::into_inner) = Some(nonce);
        }
        Ok(markup)
    }

    fn config(&self) -> &ModemConfig {
        &self.config
    }
}

/// Value of the page's `<input name="nonce">`, if any
pub fn extract_nonce(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    document
        .select(&NONCE_SELECTOR)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

/// Serves device pages saved in a directory.
///
/// A page is looked up by the last segment of its path, so
/// `/cgi-bin/sysinfo.ha` reads `<dir>/sysinfo.ha`.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    config: ModemConfig,
    dir: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(config: ModemConfig, dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PageFetcher for DirectoryFetcher {
    fn fetch(&self, path: &str) -> std::result::Result<String, FetchError> {
        let file_name = path.rsplit('/').next().unwrap_or_default();
        if file_name.is_empty() {
            return Err(FetchError::Io {
                path: path.to_string(),
                reason: "path has no file name".to_string(),
            });
        }

        let file = self.dir.join(file_name);
        debug!("Reading {}", file.display());
        std::fs::read_to_string(&file).map_err(|e| {
            error!("Cannot read {}: {}", file.display(), e);
            FetchError::Io {
                path: file.display().to_string(),
                reason: e.to_string(),
            }
        })
    }

    fn config(&self) -> &ModemConfig {
        &self.config
    }
}
