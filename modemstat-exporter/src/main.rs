// Modemstat Exporter - Prometheus and JSON exporter for gateway status pages
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Modemstat Exporter
//!
//! Serves the status of a residential gateway as Prometheus metrics and as
//! JSON documents.
//!
//! ## Usage
//!
//! ```bash
//! # Scrape the gateway at its default address
//! modemstat-exporter
//!
//! # Custom device and port, one minute cache
//! modemstat-exporter --modem-url http://10.0.0.1 --port 9100 --cache-seconds 60
//!
//! # Replay pages saved to disk
//! modemstat-exporter --pages-dir ./tests/fixtures
//! ```

mod config;
mod metrics;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use config::{parse_level, Args};
use metrics::PrometheusExporter;
use modemstat::metrics::{
    BroadbandStatusMapper, BroadbandStatusProjector, HomeNetworkStatusMapper,
    HomeNetworkStatusProjector, MetricMapper, MetricRegistry, SystemInformationMapper,
    SystemInformationProjector,
};
use modemstat::{
    BroadbandStatusGatherer, CachingGatherer, DataExporter, DirectoryFetcher, GathererExporter,
    HomeNetworkStatusGatherer, ModemClient, ModemError, PageFetcher, SystemInformationGatherer,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Errors that stop the exporter
#[derive(Error, Debug)]
enum ExporterError {
    #[error("{0}")]
    Modem(#[from] ModemError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state shared across handlers.
struct AppState {
    exporters: Vec<Arc<dyn DataExporter>>,
    prometheus: Arc<PrometheusExporter>,
}

/// Wire fetcher, cached gatherers, JSON exporters and metric mappers.
///
/// Each page has one cache, shared by its JSON exporter and its mapper.
fn build_state(args: &Args) -> Result<AppState, ExporterError> {
    let modem = args.modem_config()?;
    info!(modem_id = %modem.id, modem_url = %modem.url, "Configured modem");

    let fetcher: Arc<dyn PageFetcher> = match &args.pages_dir {
        Some(dir) => {
            info!("Serving saved pages from {}", dir.display());
            Arc::new(DirectoryFetcher::new(modem, dir))
        }
        None => Arc::new(ModemClient::new(modem)?),
    };

    let ttl = args.cache_duration();
    let system_information = Arc::new(CachingGatherer::new(
        SystemInformationGatherer::new(Arc::clone(&fetcher)),
        ttl,
    ));
    let broadband_status = Arc::new(CachingGatherer::new(
        BroadbandStatusGatherer::new(Arc::clone(&fetcher)),
        ttl,
    ));
    let home_network_status = Arc::new(CachingGatherer::new(
        HomeNetworkStatusGatherer::new(fetcher),
        ttl,
    ));

    let registry = MetricRegistry::new();
    let mappers: Vec<Box<dyn MetricMapper>> = vec![
        Box::new(SystemInformationMapper::new(
            Arc::clone(&system_information),
            SystemInformationProjector,
            registry.clone(),
        )),
        Box::new(BroadbandStatusMapper::new(
            Arc::clone(&broadband_status),
            BroadbandStatusProjector,
            registry.clone(),
        )),
        Box::new(HomeNetworkStatusMapper::new(
            Arc::clone(&home_network_status),
            HomeNetworkStatusProjector,
            registry.clone(),
        )),
    ];
    let prometheus = PrometheusExporter::new(registry, mappers)?;
    info!(
        exporter = prometheus.name(),
        mappers = ?prometheus.mapper_names(),
        "Metrics ready"
    );

    let exporters: Vec<Arc<dyn DataExporter>> = vec![
        Arc::new(GathererExporter::new(system_information)),
        Arc::new(GathererExporter::new(broadband_status)),
        Arc::new(GathererExporter::new(home_network_status)),
    ];

    Ok(AppState {
        exporters,
        prometheus: Arc::new(prometheus),
    })
}

fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(root_handler))
        .route(state.prometheus.endpoint(), get(metrics_handler))
        .route("/endpoints", get(endpoints_handler))
        .route("/health", get(health_handler));

    for exporter in &state.exporters {
        let exporter = Arc::clone(exporter);
        let endpoint = exporter.endpoint().to_string();
        info!(exporter = exporter.name(), "Registering {}", endpoint);
        router = router.route(&endpoint, get(move || export_handler(exporter)));
    }

    router.with_state(state)
}

fn main() -> Result<(), ExporterError> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::from_default_env().add_directive(parse_level(&args.log_level).into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Modemstat Exporter v{}", env!("CARGO_PKG_VERSION"));

    // The blocking HTTP client must be built outside the async runtime
    let state = Arc::new(build_state(&args)?);
    let app = build_router(Arc::clone(&state));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let addr = args.bind_address();
        let listener = TcpListener::bind(addr.as_str()).await?;
        info!("Starting server on http://{}", addr);
        info!("Metrics endpoint: http://{}/metrics", addr);
        axum::serve(listener, app).await?;
        Ok::<(), ExporterError>(())
    })
}

/// Root handler - lists every endpoint.
async fn root_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let links: String = endpoint_list(&state)
        .iter()
        .map(|e| {
            format!(
                r#"        <div class="endpoint"><a href="{0}">{0}</a> - {1}</div>
"#,
                e.uri, e.media_type
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Modemstat Exporter</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }}
        h1 {{ color: #2c3e50; }}
        a {{ color: #3498db; text-decoration: none; }}
        .endpoints {{ background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0; }}
        .endpoint {{ margin: 10px 0; }}
    </style>
</head>
<body>
    <h1>Modemstat Exporter</h1>
    <p>Status of the residential gateway, as Prometheus metrics and JSON.</p>

    <div class="endpoints">
        <h2>Endpoints</h2>
{links}        <div class="endpoint"><a href="/health">/health</a> - Health check</div>
    </div>
</body>
</html>"#
    ))
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let prometheus = Arc::clone(&state.prometheus);
    match tokio::task::spawn_blocking(move || prometheus.export()).await {
        Ok(Ok(metrics)) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4; charset=utf-8")],
            metrics,
        )
            .into_response(),
        Ok(Err(e)) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!("Metrics task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// JSON handler for one exporter; a failed scrape is a 502.
async fn export_handler(exporter: Arc<dyn DataExporter>) -> Response {
    let name = exporter.name().to_string();
    match tokio::task::spawn_blocking(move || exporter.export()).await {
        Ok(Ok(document)) => Json(document).into_response(),
        Ok(Err(e)) => {
            error!(exporter = %name, "Export failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(exporter = %name, "Export task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// One served endpoint.
#[derive(Serialize, Debug, Clone, PartialEq)]
struct EndpointInfo {
    method: &'static str,
    uri: String,
    media_type: &'static str,
}

fn endpoint_list(state: &AppState) -> Vec<EndpointInfo> {
    std::iter::once(EndpointInfo {
        method: "GET",
        uri: state.prometheus.endpoint().to_string(),
        media_type: "text/plain",
    })
    .chain(state.exporters.iter().map(|exporter| EndpointInfo {
        method: "GET",
        uri: exporter.endpoint().to_string(),
        media_type: "application/json",
    }))
    .collect()
}

/// Endpoints handler - lists the data endpoints as JSON.
async fn endpoints_handler(State(state): State<Arc<AppState>>) -> Json<Vec<EndpointInfo>> {
    Json(endpoint_list(&state))
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
