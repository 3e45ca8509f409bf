// file: src/types.rs
// description: wire types for the leilao backend REST bodies and SSE payloads

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session identifier shared by every API call and the stream subscription.
///
/// Generated once at startup from the clock with a random suffix, matching
/// the id scheme the backend expects in `cli_id` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl ClientId {
    pub fn generate() -> Self {
        let now = Utc::now().timestamp().max(0) as u64;
        Self(now * 1000 + fastrand::u64(0..1000))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Auction lifecycle state as reported by `/consultar_leiloes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuctionStatus {
    #[serde(rename = "agendado")]
    Scheduled,
    #[serde(rename = "em andamento")]
    InProgress,
    #[serde(rename = "finalizado")]
    Finished,
    /// Status strings the backend may add later; tolerated, never an error.
    #[serde(untagged)]
    Other(String),
}

impl AuctionStatus {
    pub fn label(&self) -> &str {
        match self {
            AuctionStatus::Scheduled => "agendado",
            AuctionStatus::InProgress => "em andamento",
            AuctionStatus::Finished => "finalizado",
            AuctionStatus::Other(s) => s,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, AuctionStatus::Finished)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One auction as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionSummary {
    #[serde(rename = "lei_id")]
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "lance_inic")]
    pub starting_bid: f64,
    pub status: AuctionStatus,
    #[serde(rename = "data_inic")]
    pub starts_at: i64, // epoch seconds
    #[serde(rename = "data_fim")]
    pub ends_at: i64, // epoch seconds
}

impl AuctionSummary {
    pub fn starts_at_local(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.starts_at, 0).map(|dt| dt.with_timezone(&Local))
    }

    pub fn ends_at_local(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.ends_at, 0).map(|dt| dt.with_timezone(&Local))
    }
}

/// Payload of the `lance_validado` and `lance_invalidado` channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidEvent {
    #[serde(rename = "lei_id")]
    pub auction_id: i64,
    #[serde(rename = "cli_id")]
    pub client_id: u64,
    #[serde(rename = "lance")]
    pub amount: f64,
}

/// Payload of the `leilao_vencedor` channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionWinnerEvent {
    #[serde(rename = "lei_id")]
    pub auction_id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "cli_id")]
    pub client_id: u64,
    #[serde(rename = "lance")]
    pub amount: f64,
}

/// Payload of the `link_pagamento` channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLinkEvent {
    #[serde(rename = "lei_id")]
    pub auction_id: i64,
    #[serde(rename = "cli_id")]
    pub client_id: u64,
    #[serde(rename = "link_pagamento")]
    pub payment_link: String,
}

/// Payload of the `status_pagamento` channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusEvent {
    #[serde(rename = "lei_id")]
    pub auction_id: i64,
    #[serde(rename = "cli_id")]
    pub client_id: u64,
    pub status: String,
}

/// A decoded stream notification, one variant per named channel plus the
/// default channel in parsed and raw form.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerNotification {
    BidValidated(BidEvent),
    BidInvalidated(BidEvent),
    AuctionWinner(AuctionWinnerEvent),
    PaymentLink(PaymentLinkEvent),
    PaymentStatus(PaymentStatusEvent),
    /// Default-channel message that parsed as JSON.
    Opaque(serde_json::Value),
    /// Default-channel message that did not parse; surfaced verbatim.
    Raw(String),
}

impl ServerNotification {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerNotification::BidValidated(_) => "bid_validated",
            ServerNotification::BidInvalidated(_) => "bid_invalidated",
            ServerNotification::AuctionWinner(_) => "auction_winner",
            ServerNotification::PaymentLink(_) => "payment_link",
            ServerNotification::PaymentStatus(_) => "payment_status",
            ServerNotification::Opaque(_) => "opaque",
            ServerNotification::Raw(_) => "raw",
        }
    }
}

// Request bodies

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAuctionRequest {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "lance_inic")]
    pub starting_bid: f64,
    #[serde(rename = "data_inic")]
    pub starts_at: i64,
    #[serde(rename = "data_fim")]
    pub ends_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BidRequest {
    #[serde(rename = "lei_id")]
    pub auction_id: i64,
    #[serde(rename = "lance")]
    pub amount: f64,
    #[serde(rename = "cli_id")]
    pub client_id: ClientId,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterestRequest {
    #[serde(rename = "lei_id")]
    pub auction_id: i64,
    #[serde(rename = "cli_id")]
    pub client_id: ClientId,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "moeda")]
    pub currency: String,
}

// Response bodies

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedAuction {
    #[serde(rename = "lei_id")]
    pub id: i64,
}

/// Generic acknowledgement; the backend fills `message` on most endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Shape of backend failure bodies; `error` is optional by contract.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auction_summary_wire_names() {
        let json = r#"{
            "lei_id": 7,
            "nome": "Relogio",
            "desc": "Relogio de bolso",
            "lance_inic": 150.5,
            "status": "em andamento",
            "data_inic": 1700000000,
            "data_fim": 1700000600
        }"#;
        let auction: AuctionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(auction.id, 7);
        assert_eq!(auction.name, "Relogio");
        assert_eq!(auction.status, AuctionStatus::InProgress);
        assert_eq!(auction.starting_bid, 150.5);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let json = r#"{
            "lei_id": 1, "nome": "x", "desc": "y", "lance_inic": 1.0,
            "status": "cancelado", "data_inic": 0, "data_fim": 1
        }"#;
        let auction: AuctionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(auction.status, AuctionStatus::Other("cancelado".into()));
        assert!(!auction.status.is_finished());
    }

    #[test]
    fn bid_event_roundtrip() {
        let event: BidEvent =
            serde_json::from_str(r#"{"lei_id": 3, "cli_id": 1700000000123, "lance": 42.0}"#)
                .unwrap();
        assert_eq!(event.auction_id, 3);
        assert_eq!(event.client_id, 1700000000123);
        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["lei_id"], 3);
        assert_eq!(back["lance"], 42.0);
    }

    #[test]
    fn create_auction_request_uses_backend_field_names() {
        let request = CreateAuctionRequest {
            name: "Vaso".into(),
            description: "Vaso antigo".into(),
            starting_bid: 10.0,
            starts_at: 100,
            ends_at: 200,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["nome"], "Vaso");
        assert_eq!(value["desc"], "Vaso antigo");
        assert_eq!(value["lance_inic"], 10.0);
        assert_eq!(value["data_inic"], 100);
        assert_eq!(value["data_fim"], 200);
    }

    #[test]
    fn client_id_has_millisecond_shape() {
        let id = ClientId::generate();
        let now = Utc::now().timestamp() as u64;
        let seconds = id.0 / 1000;
        assert!(seconds >= now - 2 && seconds <= now + 2);
        assert!(id.0 % 1000 < 1000);
    }
}
