// file: src/stream.rs
// description: long-lived SSE client for the leilao notification feed
// reference: https://html.spec.whatwg.org/multipage/server-sent-events.html

use crate::{
    client_state::SharedStreamState,
    config::Config,
    error::LeilaoError,
    events::{ClientEvent, EventSender},
    monitoring,
    types::ServerNotification,
};
use anyhow::Result;
use futures_util::StreamExt;
use reqwest::header;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info, trace, warn};

// Exponential backoff caps: exponent and absolute delay ceiling.
const MAX_BACKOFF_EXPONENT: u32 = 5;
const MAX_BACKOFF_SECS: u64 = 300;

pub struct EventStreamClient {
    config: Arc<Config>,
    http: reqwest::Client,
    event_sender: EventSender,
    state: SharedStreamState,
}

impl EventStreamClient {
    pub fn new(
        config: Arc<Config>,
        event_sender: EventSender,
        state: SharedStreamState,
    ) -> Result<Self, LeilaoError> {
        // No request timeout: the stream stays open for the session lifetime.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(1)
            .build()?;

        Ok(Self {
            config,
            http,
            event_sender,
            state,
        })
    }

    /// Runs the subscription loop until the reconnect budget is exhausted.
    pub async fn run(&self) -> Result<()> {
        self.send_event(ClientEvent::Starting).await;

        loop {
            match self.connect_and_listen().await {
                Ok(()) => {
                    info!("event stream ended by server");
                }
                Err(e) => {
                    warn!("event stream error: {}", e);
                }
            }

            self.send_event(ClientEvent::Disconnected).await;
            if let Err(e) = self.prepare_reconnect().await {
                self.send_event(ClientEvent::Stopping).await;
                return Err(e);
            }
        }
    }

    async fn connect_and_listen(&self) -> Result<()> {
        let url = self.listen_url()?;
        self.send_event(ClientEvent::Connecting {
            url: url.to_string(),
        })
        .await;

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(LeilaoError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let message = status
                .canonical_reason()
                .unwrap_or("subscription rejected")
                .to_string();
            return Err(LeilaoError::Backend {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let connection_id = {
            let mut state = self.state.lock().await;
            state.mark_connected();
            state.connection_id.clone()
        };
        monitoring::CONNECTED_GAUGE.set(1.0);
        info!(%connection_id, "event stream established at {}", url);
        self.send_event(ClientEvent::Connected { connection_id }).await;

        let mut chunks = response.bytes_stream();
        let mut parser = SseParser::new();
        let period = self.config.stream.health_interval;
        let mut health = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                chunk = chunks.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for record in parser.push(&bytes) {
                            self.handle_record(record).await;
                        }
                    }
                    Some(Err(e)) => {
                        self.mark_disconnected().await;
                        return Err(LeilaoError::Http(e).into());
                    }
                    None => {
                        self.mark_disconnected().await;
                        return Err(LeilaoError::StreamClosed.into());
                    }
                },
                _ = health.tick() => {
                    let snapshot = self.state.lock().await.snapshot();
                    info!(health = %snapshot.to_json(), "stream health");
                }
            }
        }
    }

    async fn handle_record(&self, record: SseRecord) {
        monitoring::EVENTS_RECEIVED_COUNTER.increment(1);
        trace!(channel = %record.event, "stream record: {}", record.data);

        let notification = {
            let mut state = self.state.lock().await;
            state.record_event();
            match parse_notification(&record.event, &record.data) {
                Some(notification) => {
                    state.record_notification();
                    notification
                }
                None => {
                    state.record_parse_failure();
                    return;
                }
            }
        };

        monitoring::NOTIFICATION_COUNTER.increment(1);
        self.send_event(ClientEvent::Notification(notification)).await;
    }

    async fn prepare_reconnect(&self) -> Result<()> {
        let attempt = {
            let mut state = self.state.lock().await;
            state.record_reconnect();
            state.reconnect_count
        };
        monitoring::RECONNECT_COUNTER.increment(1);

        let max = self.config.stream.max_reconnects;
        if max > 0 && attempt > max {
            warn!("maximum reconnection attempts ({}) reached", max);
            return Err(LeilaoError::MaxReconnectsExceeded.into());
        }

        let delay = backoff_delay(self.config.stream.reconnect_delay, attempt);
        warn!("reconnecting in {}s (attempt {})", delay.as_secs(), attempt);
        self.send_event(ClientEvent::Reconnecting {
            attempt,
            delay_secs: delay.as_secs(),
        })
        .await;

        sleep(delay).await;
        Ok(())
    }

    /// Best-effort detach on shutdown; the backend drops the announcer for
    /// this client id so it stops queueing notifications.
    pub async fn detach(&self) {
        let url = match self.unlisten_url() {
            Ok(url) => url,
            Err(_) => return,
        };

        match self
            .http
            .delete(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(_) => info!("notification stream detached"),
            Err(e) => debug!("failed to detach notification stream: {}", e),
        }
        self.send_event(ClientEvent::Stopping).await;
    }

    async fn mark_disconnected(&self) {
        monitoring::CONNECTED_GAUGE.set(0.0);
        self.state.lock().await.mark_disconnected();
    }

    async fn send_event(&self, event: ClientEvent) {
        if self.event_sender.send(event).await.is_err() {
            debug!("event receiver dropped, discarding event");
        }
    }

    fn listen_url(&self) -> Result<url::Url, LeilaoError> {
        let mut url = self.config.base_url.join("listen")?;
        url.set_query(Some(&format!("cli_id={}", self.config.client_id)));
        Ok(url)
    }

    fn unlisten_url(&self) -> Result<url::Url, LeilaoError> {
        let mut url = self.config.base_url.join("unlisten")?;
        url.set_query(Some(&format!("cli_id={}", self.config.client_id)));
        Ok(url)
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
    let secs = base.as_secs().saturating_mul(1u64 << exponent);
    Duration::from_secs(secs.min(MAX_BACKOFF_SECS))
}

/// Routes a named stream record to its typed notification.
///
/// Named channels with a malformed payload return `None` (counted, logged,
/// stream stays up). The default channel never fails: non-JSON payloads are
/// surfaced verbatim as `Raw`.
pub fn parse_notification(event: &str, data: &str) -> Option<ServerNotification> {
    fn typed<T, F>(channel: &str, data: &str, wrap: F) -> Option<ServerNotification>
    where
        T: serde::de::DeserializeOwned,
        F: FnOnce(T) -> ServerNotification,
    {
        match serde_json::from_str(data) {
            Ok(payload) => Some(wrap(payload)),
            Err(e) => {
                warn!(channel, "malformed payload on named channel: {}", e);
                None
            }
        }
    }

    match event {
        "lance_validado" => typed(event, data, ServerNotification::BidValidated),
        "lance_invalidado" => typed(event, data, ServerNotification::BidInvalidated),
        "leilao_vencedor" => typed(event, data, ServerNotification::AuctionWinner),
        "link_pagamento" => typed(event, data, ServerNotification::PaymentLink),
        "status_pagamento" => typed(event, data, ServerNotification::PaymentStatus),
        other => {
            if other != "message" {
                debug!(channel = other, "unrecognized channel, treating as opaque");
            }
            match serde_json::from_str::<serde_json::Value>(data) {
                Ok(value) => Some(ServerNotification::Opaque(value)),
                Err(_) => Some(ServerNotification::Raw(data.to_string())),
            }
        }
    }
}

/// One parsed server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseRecord {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
    pub retry: Option<u64>,
}

/// Incremental SSE parser. Chunk boundaries carry no meaning in the
/// protocol, so bytes are buffered until a blank line terminates a record.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseRecord> {
        let text = String::from_utf8_lossy(chunk);
        if text.contains('\r') {
            self.buffer.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
        } else {
            self.buffer.push_str(&text);
        }

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            let block: String = self.buffer.drain(..pos + 2).collect();
            if let Some(record) = Self::parse_block(&block) {
                records.push(record);
            }
        }
        records
    }

    fn parse_block(block: &str) -> Option<SseRecord> {
        let mut event = String::from("message");
        let mut data = String::new();
        let mut id = None;
        let mut retry = None;
        let mut saw_data = false;

        for line in block.lines() {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "event" => event = value.to_string(),
                "data" => {
                    if saw_data {
                        data.push('\n');
                    }
                    data.push_str(value);
                    saw_data = true;
                }
                "id" => id = Some(value.to_string()),
                "retry" => retry = value.parse().ok(),
                other => trace!(field = other, "ignoring unknown sse field"),
            }
        }

        // Records without data (e.g. keep-alive comments) are dropped.
        if !saw_data {
            return None;
        }

        Some(SseRecord {
            event,
            data,
            id,
            retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_str(parser: &mut SseParser, s: &str) -> Vec<SseRecord> {
        parser.push(s.as_bytes())
    }

    #[test]
    fn parses_named_event_record() {
        let mut parser = SseParser::new();
        let records = push_str(
            &mut parser,
            "event: lance_validado\ndata: {\"lei_id\": 1, \"cli_id\": 2, \"lance\": 3.0}\n\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, "lance_validado");
        assert!(records[0].data.starts_with('{'));
    }

    #[test]
    fn record_split_across_chunks_is_reassembled() {
        let mut parser = SseParser::new();
        assert!(push_str(&mut parser, "event: status_pag").is_empty());
        assert!(push_str(&mut parser, "amento\ndata: {\"lei_id\": 9, ").is_empty());
        let records = push_str(&mut parser, "\"cli_id\": 4, \"status\": \"aprovado\"}\n\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, "status_pagamento");
    }

    #[test]
    fn multiple_records_in_one_chunk() {
        let mut parser = SseParser::new();
        let records = push_str(&mut parser, "data: um\n\ndata: dois\n\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data, "um");
        assert_eq!(records[1].event, "message");
    }

    #[test]
    fn multi_line_data_joins_with_newline() {
        let mut parser = SseParser::new();
        let records = push_str(&mut parser, "data: linha 1\ndata: linha 2\n\n");
        assert_eq!(records[0].data, "linha 1\nlinha 2");
    }

    #[test]
    fn comments_and_dataless_blocks_are_dropped() {
        let mut parser = SseParser::new();
        assert!(push_str(&mut parser, ": keep-alive\n\n").is_empty());
        assert!(push_str(&mut parser, "event: lance_validado\n\n").is_empty());
    }

    #[test]
    fn id_and_retry_fields_are_captured() {
        let mut parser = SseParser::new();
        let records = push_str(&mut parser, "id: 17\nretry: 2500\ndata: pong\n\n");
        assert_eq!(records[0].id.as_deref(), Some("17"));
        assert_eq!(records[0].retry, Some(2500));
    }

    #[test]
    fn each_named_channel_maps_to_its_variant() {
        let bid = r#"{"lei_id": 1, "cli_id": 2, "lance": 10.0}"#;
        assert!(matches!(
            parse_notification("lance_validado", bid),
            Some(ServerNotification::BidValidated(_))
        ));
        assert!(matches!(
            parse_notification("lance_invalidado", bid),
            Some(ServerNotification::BidInvalidated(_))
        ));

        let winner = r#"{"lei_id": 1, "nome": "Vaso", "desc": "antigo", "cli_id": 2, "lance": 99.9}"#;
        assert!(matches!(
            parse_notification("leilao_vencedor", winner),
            Some(ServerNotification::AuctionWinner(_))
        ));

        let link = r#"{"lei_id": 1, "cli_id": 2, "link_pagamento": "http://127.0.0.1:6000/pagar/1"}"#;
        assert!(matches!(
            parse_notification("link_pagamento", link),
            Some(ServerNotification::PaymentLink(_))
        ));

        let status = r#"{"lei_id": 1, "cli_id": 2, "status": "aprovado"}"#;
        assert!(matches!(
            parse_notification("status_pagamento", status),
            Some(ServerNotification::PaymentStatus(_))
        ));
    }

    #[test]
    fn malformed_named_payload_is_skipped() {
        assert_eq!(parse_notification("lance_validado", "not json"), None);
    }

    #[test]
    fn default_channel_tolerates_non_json() {
        match parse_notification("message", "pong") {
            Some(ServerNotification::Raw(text)) => assert_eq!(text, "pong"),
            other => panic!("expected raw passthrough, got {:?}", other),
        }
    }

    #[test]
    fn default_channel_json_becomes_opaque() {
        match parse_notification("message", r#"{"abc": 123}"#) {
            Some(ServerNotification::Opaque(value)) => assert_eq!(value["abc"], 123),
            other => panic!("expected opaque json, got {:?}", other),
        }
    }

    #[test]
    fn unknown_named_channel_is_not_dropped() {
        assert!(matches!(
            parse_notification("leilao_cancelado", r#"{"lei_id": 5}"#),
            Some(ServerNotification::Opaque(_))
        ));
    }

    #[test]
    fn backoff_grows_and_caps() {
        let base = Duration::from_secs(5);
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(5));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(10));
        assert_eq!(backoff_delay(base, 4), Duration::from_secs(40));
        assert_eq!(backoff_delay(base, 50), Duration::from_secs(160));
        assert_eq!(
            backoff_delay(Duration::from_secs(60), 50),
            Duration::from_secs(300)
        );
    }
}
