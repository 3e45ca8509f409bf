/// file: src/client_state.rs
/// description: bookkeeping for the stream connection, separate from client logic
use crate::monitoring::HealthStatus;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub struct StreamState {
    pub connection_id: String,
    pub reconnect_count: u32,
    pub is_connected: bool,
    pub last_event_time: Option<Instant>,
    pub events_received: u64,
    pub notifications_received: u64,
    pub parse_failures: u64,
    pub started_at: Instant,
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            connection_id: uuid::Uuid::new_v4().to_string(),
            reconnect_count: 0,
            is_connected: false,
            last_event_time: None,
            events_received: 0,
            notifications_received: 0,
            parse_failures: 0,
            started_at: Instant::now(),
        }
    }
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a fresh connection. The reconnect counter is left alone here so
    /// that a server which accepts and immediately drops connections still
    /// exhausts the attempt budget; it resets once events actually flow.
    pub fn mark_connected(&mut self) {
        self.connection_id = uuid::Uuid::new_v4().to_string();
        self.is_connected = true;
        self.last_event_time = Some(Instant::now());
    }

    pub fn mark_disconnected(&mut self) {
        self.is_connected = false;
    }

    pub fn record_reconnect(&mut self) {
        self.reconnect_count += 1;
        self.is_connected = false;
    }

    pub fn record_event(&mut self) {
        self.events_received += 1;
        self.last_event_time = Some(Instant::now());
        self.reconnect_count = 0;
    }

    pub fn record_notification(&mut self) {
        self.notifications_received += 1;
    }

    pub fn record_parse_failure(&mut self) {
        self.parse_failures += 1;
    }

    pub fn snapshot(&self) -> HealthStatus {
        HealthStatus {
            is_connected: self.is_connected,
            last_event_age_secs: self.last_event_time.map(|t| t.elapsed().as_secs()),
            events_received: self.events_received,
            notifications_received: self.notifications_received,
            parse_failures: self.parse_failures,
            reconnect_count: self.reconnect_count,
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}

pub type SharedStreamState = Arc<Mutex<StreamState>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reset_the_reconnect_budget() {
        let mut state = StreamState::new();
        state.record_reconnect();
        state.record_reconnect();
        assert_eq!(state.reconnect_count, 2);

        state.mark_connected();
        assert_eq!(state.reconnect_count, 2);

        state.record_event();
        assert_eq!(state.reconnect_count, 0);
        assert_eq!(state.events_received, 1);
    }

    #[test]
    fn connection_ids_rotate_per_connection() {
        let mut state = StreamState::new();
        let first = state.connection_id.clone();
        state.mark_connected();
        assert_ne!(state.connection_id, first);
        assert!(state.is_connected);
    }
}
