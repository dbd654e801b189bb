use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total HTTP requests handled. Labels: route, status.
pub const REQUESTS_TOTAL: &str = "tourbook_requests_total";

/// Histogram: request latency in seconds. Labels: route.
pub const REQUEST_DURATION_SECONDS: &str = "tourbook_request_duration_seconds";

/// Counter: bookings successfully created.
pub const BOOKINGS_CREATED_TOTAL: &str = "tourbook_bookings_created_total";

/// Counter: booking attempts rejected as duplicate/slot conflicts.
pub const BOOKING_CONFLICTS_TOTAL: &str = "tourbook_booking_conflicts_total";

// ── USE metrics (storage) ───────────────────────────────────────

/// Histogram: full-collection rewrite duration in seconds. Labels: collection.
pub const STORE_SAVE_DURATION_SECONDS: &str = "tourbook_store_save_duration_seconds";

/// Gauge: records per collection after the last save. Labels: collection.
pub const STORE_RECORDS: &str = "tourbook_store_records";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
