/// file: src/events.rs
/// description: event bus decoupling the stream client from presentation
use crate::types::ServerNotification;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    Starting,
    Connecting { url: String },
    Connected { connection_id: String },
    Notification(ServerNotification),
    Reconnecting { attempt: u32, delay_secs: u64 },
    Disconnected,
    Stopping,
}

// Notifications arrive at human pace; a small bound is plenty while still
// absorbing bursts around auction close.
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub type EventSender = mpsc::Sender<ClientEvent>;
pub type EventReceiver = mpsc::Receiver<ClientEvent>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}
