use crate::error::LeilaoError;
use anyhow::Result;
use metrics::{counter, gauge, Counter, Gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, sync::LazyLock};
use tracing::{error, info};

// Global metrics
pub static EVENTS_RECEIVED_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("leilao_stream_events_received_total"));
pub static NOTIFICATION_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("leilao_notifications_total"));
pub static RECONNECT_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("leilao_stream_reconnects_total"));
pub static API_REQUEST_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("leilao_api_requests_total"));
pub static CONNECTED_GAUGE: LazyLock<Gauge> = LazyLock::new(|| gauge!("leilao_stream_connected"));

pub async fn setup_metrics(port: u16) -> Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", "leilao-cli")
        .add_global_label("version", env!("CARGO_PKG_VERSION"));

    match builder.install() {
        Ok(_handle) => {
            info!("Prometheus metrics exporter started on http://{}/metrics", addr);

            EVENTS_RECEIVED_COUNTER.absolute(0);
            NOTIFICATION_COUNTER.absolute(0);
            RECONNECT_COUNTER.absolute(0);
            API_REQUEST_COUNTER.absolute(0);
            CONNECTED_GAUGE.set(0.0);

            Ok(())
        }
        Err(e) => {
            error!("Failed to start metrics exporter: {}", e);
            Err(LeilaoError::Metrics(e.to_string()).into())
        }
    }
}

/// Periodic health snapshot logged while the stream is up.
#[derive(Debug)]
pub struct HealthStatus {
    pub is_connected: bool,
    pub last_event_age_secs: Option<u64>,
    pub events_received: u64,
    pub notifications_received: u64,
    pub parse_failures: u64,
    pub reconnect_count: u32,
    pub uptime_secs: u64,
}

impl HealthStatus {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": if self.is_connected { "connected" } else { "disconnected" },
            "last_event_age_secs": self.last_event_age_secs,
            "events_received": self.events_received,
            "notifications_received": self.notifications_received,
            "parse_failures": self.parse_failures,
            "reconnect_count": self.reconnect_count,
            "uptime_secs": self.uptime_secs,
        })
    }
}
