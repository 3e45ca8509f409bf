/// file: src/config.rs
/// description: runtime configuration built once from CLI arguments
use crate::cli::Args;
use crate::types::ClientId;
use anyhow::Result;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub client_id: ClientId,
    pub stream: StreamConfig,
    pub request: RequestConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub reconnect_delay: Duration,
    pub max_reconnects: u32,
    pub health_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let base_url = Url::parse(&args.base_url)?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "base URL must be an absolute http(s) address"
        );

        let client_id = match args.client_id {
            Some(id) => ClientId(id),
            None => ClientId::generate(),
        };

        Ok(Config {
            base_url,
            client_id,
            stream: StreamConfig {
                reconnect_delay: Duration::from_secs(args.reconnect_delay.max(1)),
                max_reconnects: args.max_reconnects,
                health_interval: Duration::from_secs(args.health_interval.max(1)),
            },
            request: RequestConfig {
                timeout: Duration::from_secs(args.timeout),
            },
            metrics: MetricsConfig {
                enabled: args.metrics,
                port: args.metrics_port,
            },
        })
    }
}
