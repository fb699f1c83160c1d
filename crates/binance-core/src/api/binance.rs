//! Binance USD-M futures REST client.
//!
//! Only the signed order endpoint is exposed. Requests are signed with
//! HMAC-SHA256 over the exact form-encoded payload, as the exchange requires.

use crate::config::BinanceConfig;
use crate::types::OrderRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use std::fmt;
use std::time::Duration as StdDuration;
use tracing::debug;

/// API credentials for signed endpoints.
#[derive(Clone)]
pub struct ApiCredentials {
    /// API key, sent in the `X-MBX-APIKEY` header.
    pub api_key: String,
    /// API secret, used only for HMAC signing.
    pub api_secret: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}

/// Acknowledgement returned by `POST /fapi/v1/order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: i64,
    pub status: String,
    pub executed_qty: Decimal,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default, rename = "type")]
    pub order_type: Option<String>,
    #[serde(default)]
    pub orig_qty: Option<Decimal>,
    #[serde(default)]
    pub avg_price: Option<Decimal>,
    #[serde(default)]
    pub update_time: Option<i64>,
}

impl fmt::Display for OrderAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{orderId: {}, status: {}, executedQty: {}",
            self.order_id, self.status, self.executed_qty
        )?;
        if let Some(symbol) = &self.symbol {
            write!(f, ", symbol: {}", symbol)?;
        }
        if let Some(side) = &self.side {
            write!(f, ", side: {}", side)?;
        }
        if let Some(order_type) = &self.order_type {
            write!(f, ", type: {}", order_type)?;
        }
        if let Some(orig_qty) = &self.orig_qty {
            write!(f, ", origQty: {}", orig_qty)?;
        }
        if let Some(avg_price) = &self.avg_price {
            write!(f, ", avgPrice: {}", avg_price)?;
        }
        if let Some(client_order_id) = &self.client_order_id {
            write!(f, ", clientOrderId: {}", client_order_id)?;
        }
        if let Some(update_time) = self.update_time {
            write!(f, ", updateTime: {}", update_time)?;
        }
        f.write_str("}")
    }
}

/// Error body the exchange attaches to rejected requests.
#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    code: i64,
    msg: String,
}

/// The single exchange operation the bot depends on.
#[async_trait]
pub trait FuturesExchange: Send + Sync {
    /// Create a futures order and return the exchange acknowledgement.
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderAck>;
}

/// Signed REST client for USD-M futures.
pub struct FuturesClient {
    base_url: String,
    credentials: ApiCredentials,
    recv_window: Option<u64>,
    testnet: bool,
    http_client: reqwest::Client,
}

impl FuturesClient {
    /// Order placement endpoint.
    pub const ORDER_PATH: &'static str = "/fapi/v1/order";

    /// Create a client against `base_url` (testnet when `None`).
    pub fn new(credentials: ApiCredentials, base_url: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .connect_timeout(StdDuration::from_secs(10))
            .build()?;
        let testnet = base_url.is_none();
        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| crate::config::TESTNET_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            credentials,
            recv_window: None,
            testnet,
            http_client,
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &BinanceConfig, credentials: ApiCredentials) -> Result<Self> {
        let mut client = Self::new(credentials, Some(config.base_url.clone()))?;
        client.testnet = config.testnet;
        client.recv_window = config.recv_window;
        Ok(client)
    }

    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window = Some(recv_window_ms);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    /// Form-encode `params`, append `recvWindow`/`timestamp`, and sign the result.
    pub fn signed_payload(&self, params: &[(&str, String)], timestamp_ms: i64) -> Result<String> {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            serializer.append_pair(key, value);
        }
        if let Some(recv_window) = self.recv_window {
            serializer.append_pair("recvWindow", &recv_window.to_string());
        }
        serializer.append_pair("timestamp", &timestamp_ms.to_string());
        let payload = serializer.finish();

        let signature = sign_payload(&self.credentials.api_secret, &payload)?;
        Ok(format!("{}&signature={}", payload, signature))
    }
}

#[async_trait]
impl FuturesExchange for FuturesClient {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let url = format!("{}{}", self.base_url, Self::ORDER_PATH);
        let body = self.signed_payload(&order.to_params(), current_timestamp_ms())?;

        debug!(url = %url, order = %order, "POST order request");

        let response = self
            .http_client
            .post(&url)
            .header("X-MBX-APIKEY", &self.credentials.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            let error = decode_error(status, &text);
            debug!(status, error = %error, "Order request failed");
            return Err(error);
        }

        match serde_json::from_str::<OrderAck>(&text) {
            Ok(ack) => {
                debug!(
                    order_id = ack.order_id,
                    status = %ack.status,
                    "Order accepted by exchange"
                );
                Ok(ack)
            }
            // A 2xx can still carry an error body.
            Err(parse_err) => match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => Err(classify_rejection(body.code, body.msg, Some(status))),
                Err(_) => Err(Error::Json(parse_err)),
            },
        }
    }
}

impl fmt::Debug for FuturesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuturesClient")
            .field("base_url", &self.base_url)
            .field("testnet", &self.testnet)
            .field("recv_window", &self.recv_window)
            .finish()
    }
}

/// Whether an exchange error code describes a problem with the order's parameters.
///
/// Covers filter failures (-1013), request parameter errors (-1100..=-1117,
/// -1130) and the futures order-validation block (-4000..=-4199). Everything
/// else, including -1121 (invalid symbol), is an API-level rejection.
pub fn is_order_constraint_code(code: i64) -> bool {
    matches!(code, -1013 | -1117..=-1100 | -1130 | -4199..=-4000)
}

/// Map an exchange error body onto the error taxonomy.
pub fn classify_rejection(code: i64, message: String, status: Option<u16>) -> Error {
    if is_order_constraint_code(code) {
        Error::OrderRejected { code, message }
    } else {
        Error::Api {
            code,
            message,
            status,
        }
    }
}

fn decode_error(status: u16, text: &str) -> Error {
    if status < 500 {
        if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
            return classify_rejection(body.code, body.msg, Some(status));
        }
    }
    let body = if text.len() > 500 {
        let mut end = 500;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    };
    Error::UnexpectedResponse { status, body }
}

/// Current Unix time in milliseconds.
fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Hex-encoded HMAC-SHA256 of `payload` keyed with `secret`.
pub fn sign_payload(secret: &str, payload: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|e| Error::Signing {
        message: format!("Failed to create HMAC: {}", e),
    })?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
