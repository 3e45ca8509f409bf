// file: src/api.rs
// description: request/response client for the leilao REST endpoints

use crate::{
    config::Config,
    error::LeilaoError,
    monitoring,
    types::{
        Ack, AuctionSummary, BidRequest, CreateAuctionRequest, CreatedAuction, ErrorBody,
        InterestRequest, PaymentRequest,
    },
};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

// Schedule applied when the caller omits both times.
const DEFAULT_START_OFFSET: Duration = Duration::from_secs(5);
const DEFAULT_END_OFFSET: Duration = Duration::from_secs(10);

/// A create-auction intent before validation. Times are optional as a pair:
/// give both or neither.
#[derive(Debug, Clone)]
pub struct NewAuction {
    pub name: String,
    pub description: String,
    pub starting_bid: f64,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl NewAuction {
    /// Validates the intent and resolves the schedule against `now`,
    /// producing the wire request. Never touches the network.
    pub fn resolve(self, now: DateTime<Utc>) -> Result<CreateAuctionRequest, LeilaoError> {
        ensure_text("nome", &self.name)?;
        ensure_text("descricao", &self.description)?;
        if !self.starting_bid.is_finite() || self.starting_bid < 0.0 {
            return Err(LeilaoError::InvalidInput(
                "lance inicial deve ser um valor nao-negativo".into(),
            ));
        }

        let (starts_at, ends_at) = match (self.starts_at, self.ends_at) {
            (Some(start), Some(end)) => (start.timestamp(), end.timestamp()),
            (None, None) => {
                let start = now + DEFAULT_START_OFFSET;
                let end = now + DEFAULT_END_OFFSET;
                (start.timestamp(), end.timestamp())
            }
            _ => {
                return Err(LeilaoError::InvalidInput(
                    "informe data de inicio e fim juntas, ou nenhuma das duas".into(),
                ))
            }
        };

        if starts_at >= ends_at {
            return Err(LeilaoError::InvalidInput(
                "data de inicio deve ser anterior a data de fim".into(),
            ));
        }

        Ok(CreateAuctionRequest {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            starting_bid: self.starting_bid,
            starts_at,
            ends_at,
        })
    }
}

pub struct ApiClient {
    config: Arc<Config>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: Arc<Config>) -> Result<Self, LeilaoError> {
        let http = reqwest::Client::builder()
            .timeout(config.request.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub async fn create_auction(&self, auction: NewAuction) -> Result<CreatedAuction, LeilaoError> {
        let body = auction.resolve(Utc::now())?;
        let created: CreatedAuction = self.post(self.endpoint("criar_leilao")?, &body).await?;
        info!(auction_id = created.id, "auction created");
        Ok(created)
    }

    pub async fn place_bid(&self, auction_id: i64, amount: f64) -> Result<Ack, LeilaoError> {
        ensure_positive_amount("lance", amount)?;
        let body = BidRequest {
            auction_id,
            amount,
            client_id: self.config.client_id,
        };
        self.post(self.endpoint("lance")?, &body).await
    }

    pub async fn list_auctions(&self) -> Result<Vec<AuctionSummary>, LeilaoError> {
        let url = self.endpoint("consultar_leiloes")?;
        debug!(%url, "fetching auction list");
        let response = self.http.get(url).send().await?;
        monitoring::API_REQUEST_COUNTER.increment(1);
        Self::decode(response).await
    }

    pub async fn register_interest(&self, auction_id: i64) -> Result<Ack, LeilaoError> {
        let body = InterestRequest {
            auction_id,
            client_id: self.config.client_id,
        };
        self.post(self.endpoint("registrar_interesse")?, &body).await
    }

    pub async fn cancel_interest(&self, auction_id: i64) -> Result<Ack, LeilaoError> {
        let body = InterestRequest {
            auction_id,
            client_id: self.config.client_id,
        };
        self.post(self.endpoint("cancelar_interesse")?, &body).await
    }

    /// Pays through the link delivered over the stream. The target is the
    /// caller-supplied URL, not the auction backend.
    pub async fn submit_payment(
        &self,
        link: &str,
        amount: f64,
        currency: &str,
    ) -> Result<Ack, LeilaoError> {
        ensure_positive_amount("valor", amount)?;
        ensure_text("moeda", currency)?;
        let url = Url::parse(link)
            .map_err(|e| LeilaoError::InvalidInput(format!("link de pagamento invalido: {}", e)))?;

        let body = PaymentRequest {
            amount,
            currency: currency.to_string(),
        };
        self.post(url, &body).await
    }

    async fn post<B, T>(&self, url: Url, body: &B) -> Result<T, LeilaoError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%url, "posting request");
        let response = self.http.post(url).json(body).send().await?;
        monitoring::API_REQUEST_COUNTER.increment(1);
        Self::decode(response).await
    }

    /// Success is 2xx; anything else yields the body's `error` field when
    /// present, the HTTP status text otherwise.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, LeilaoError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::backend_error(status, response).await)
    }

    async fn backend_error(status: StatusCode, response: reqwest::Response) -> LeilaoError {
        let fallback = status
            .canonical_reason()
            .unwrap_or("erro desconhecido")
            .to_string();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.unwrap_or(fallback),
            Err(_) => fallback,
        };
        LeilaoError::Backend {
            status: status.as_u16(),
            message,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, LeilaoError> {
        Ok(self.config.base_url.join(path)?)
    }
}

pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, LeilaoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LeilaoError::InvalidInput(format!("data invalida '{}': {}", value, e)))
}

fn ensure_text(label: &str, value: &str) -> Result<(), LeilaoError> {
    if value.trim().is_empty() {
        return Err(LeilaoError::InvalidInput(format!(
            "campo '{}' nao pode ser vazio",
            label
        )));
    }
    Ok(())
}

fn ensure_positive_amount(label: &str, value: f64) -> Result<(), LeilaoError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LeilaoError::InvalidInput(format!(
            "campo '{}' deve ser um valor positivo",
            label
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn intent() -> NewAuction {
        NewAuction {
            name: "Vaso".into(),
            description: "Vaso antigo".into(),
            starting_bid: 10.0,
            starts_at: None,
            ends_at: None,
        }
    }

    #[test]
    fn omitted_schedule_defaults_to_five_and_ten_seconds() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let request = intent().resolve(now).unwrap();
        assert_eq!(request.starts_at, now.timestamp() + 5);
        assert_eq!(request.ends_at, now.timestamp() + 10);
    }

    #[test]
    fn explicit_schedule_is_kept_as_epoch_seconds() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let request = NewAuction {
            starts_at: Some(start),
            ends_at: Some(end),
            ..intent()
        }
        .resolve(now)
        .unwrap();
        assert_eq!(request.starts_at, start.timestamp());
        assert_eq!(request.ends_at, end.timestamp());
    }

    #[test]
    fn one_sided_schedule_is_rejected_locally() {
        let now = Utc::now();
        let result = NewAuction {
            starts_at: Some(now),
            ..intent()
        }
        .resolve(now);
        assert!(matches!(result, Err(LeilaoError::InvalidInput(_))));
    }

    #[test]
    fn start_after_end_is_rejected() {
        let now = Utc::now();
        let result = NewAuction {
            starts_at: Some(now + Duration::from_secs(60)),
            ends_at: Some(now),
            ..intent()
        }
        .resolve(now);
        assert!(matches!(result, Err(LeilaoError::InvalidInput(_))));
    }

    #[test]
    fn empty_name_or_description_is_rejected() {
        let now = Utc::now();
        let no_name = NewAuction {
            name: "   ".into(),
            ..intent()
        };
        assert!(no_name.resolve(now).is_err());

        let no_desc = NewAuction {
            description: String::new(),
            ..intent()
        };
        assert!(no_desc.resolve(now).is_err());
    }

    #[test]
    fn non_finite_starting_bid_is_rejected() {
        let now = Utc::now();
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let result = NewAuction {
                starting_bid: bad,
                ..intent()
            }
            .resolve(now);
            assert!(result.is_err(), "expected rejection of {}", bad);
        }
    }

    #[test]
    fn amount_validation_rejects_non_positive_values() {
        assert!(ensure_positive_amount("lance", 10.0).is_ok());
        for bad in [0.0, -5.0, f64::NAN, f64::NEG_INFINITY] {
            assert!(ensure_positive_amount("lance", bad).is_err());
        }
    }

    #[test]
    fn rfc3339_parsing() {
        let parsed = parse_rfc3339("2024-06-01T10:00:00-03:00").unwrap();
        assert_eq!(parsed.timestamp(), 1717246800);
        assert!(parse_rfc3339("amanha de manha").is_err());
    }

    fn canned_response(status: u16, body: &str) -> reqwest::Response {
        let response = http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap();
        reqwest::Response::from(response)
    }

    #[tokio::test]
    async fn decode_accepts_2xx_json_body() {
        let ack: Ack = ApiClient::decode(canned_response(200, r#"{"message": "lance registrado"}"#))
            .await
            .unwrap();
        assert_eq!(ack.message.as_deref(), Some("lance registrado"));
    }

    #[tokio::test]
    async fn non_2xx_surfaces_the_body_error_field() {
        let err = ApiClient::decode::<Ack>(canned_response(
            400,
            r#"{"error": "lance abaixo do minimo"}"#,
        ))
        .await
        .unwrap_err();
        match err {
            LeilaoError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "lance abaixo do minimo");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_status_text() {
        let err = ApiClient::decode::<Ack>(canned_response(500, "<html>boom</html>"))
            .await
            .unwrap_err();
        match err {
            LeilaoError::Backend { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn error_body_without_error_field_falls_back_to_status_text() {
        let err = ApiClient::decode::<Ack>(canned_response(404, "{}"))
            .await
            .unwrap_err();
        match err {
            LeilaoError::Backend { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }
}
