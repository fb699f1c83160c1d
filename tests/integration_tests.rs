//! Integration tests for component interactions.
//!
//! These tests drive the order builder, the signed payload and the submitter
//! through the public API of both crates.

use async_trait::async_trait;
use binance_core::api::{ApiCredentials, FuturesClient, FuturesExchange, OrderAck};
use binance_core::types::{OrderRequest, OrderSide, OrderType, ValidationError};
use hmac::{Hmac, Mac};
use order_bot::{OrderFields, OrderSubmitter, Prompter, SubmitError};
use rust_decimal::Decimal;
use sha2::Sha256;
use std::sync::{Arc, Mutex};

/// Exchange double that records every request and replies from a script.
struct ScriptedExchange {
    sent: Mutex<Vec<Vec<(&'static str, String)>>>,
    reply: fn() -> binance_core::Result<OrderAck>,
}

impl ScriptedExchange {
    fn new(reply: fn() -> binance_core::Result<OrderAck>) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            reply,
        })
    }

    fn sent(&self) -> Vec<Vec<(&'static str, String)>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl FuturesExchange for ScriptedExchange {
    async fn create_order(&self, order: &OrderRequest) -> binance_core::Result<OrderAck> {
        self.sent.lock().unwrap().push(order.to_params());
        (self.reply)()
    }
}

fn filled() -> binance_core::Result<OrderAck> {
    Ok(OrderAck {
        order_id: 4_051_209,
        status: "FILLED".to_string(),
        executed_qty: Decimal::new(1, 2),
        client_order_id: None,
        symbol: Some("BTCUSDT".to_string()),
        side: Some("BUY".to_string()),
        order_type: Some("MARKET".to_string()),
        orig_qty: Some(Decimal::new(1, 2)),
        avg_price: None,
        update_time: None,
    })
}

fn margin_rejected() -> binance_core::Result<OrderAck> {
    Err(binance_core::Error::Api {
        code: -2019,
        message: "Margin is insufficient.".to_string(),
        status: Some(400),
    })
}

fn fields(order_type: OrderType, price: Option<Decimal>) -> OrderFields {
    OrderFields {
        symbol: "btcusdt".to_string(),
        side: OrderSide::Buy,
        order_type,
        quantity: Decimal::new(1, 2),
        price,
        stop_price: None,
    }
}

/// Lowercase user input becomes a four-field market request.
#[test]
fn test_market_order_from_user_input() {
    let side: OrderSide = "buy".parse().unwrap();
    let order_type: OrderType = "market".parse().unwrap();

    let order =
        OrderRequest::build("BTCUSDT", side, order_type, Decimal::new(1, 2), None, None).unwrap();

    assert_eq!(
        order.to_params(),
        vec![
            ("symbol", "BTCUSDT".to_string()),
            ("side", "BUY".to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", "0.01".to_string()),
        ]
    );
}

/// Each order type demands exactly the prices it uses.
#[test]
fn test_required_fields_per_order_type() {
    let qty = Decimal::ONE;
    let price = Some(Decimal::new(30_000, 0));
    let stop = Some(Decimal::new(29_500, 0));

    let limit = OrderRequest::build("BTCUSDT", OrderSide::Sell, OrderType::Limit, qty, None, None);
    assert_eq!(limit.unwrap_err(), ValidationError::MissingField("price"));

    let stop_limit =
        OrderRequest::build("BTCUSDT", OrderSide::Sell, OrderType::StopLimit, qty, price, None);
    assert_eq!(stop_limit.unwrap_err(), ValidationError::MissingField("stop_price"));

    let stop_limit =
        OrderRequest::build("BTCUSDT", OrderSide::Sell, OrderType::StopLimit, qty, price, stop)
            .unwrap();
    let keys: Vec<&str> = stop_limit.to_params().iter().map(|(k, _)| *k).collect();
    assert_eq!(
        keys,
        vec!["symbol", "side", "type", "quantity", "price", "stopPrice", "timeInForce"]
    );
}

/// The signature covers the exact query string that precedes it.
#[test]
fn test_signed_payload_matches_independent_hmac() {
    let secret = "integration-secret";
    let client = FuturesClient::new(
        ApiCredentials::new("integration-key".to_string(), secret.to_string()),
        None,
    )
    .unwrap()
    .with_recv_window(5000);

    let order = OrderRequest::build(
        "ETHUSDT",
        OrderSide::Buy,
        OrderType::Limit,
        Decimal::new(5, 1),
        Some(Decimal::new(180_050, 2)),
        None,
    )
    .unwrap();

    let signed = client
        .signed_payload(&order.to_params(), 1_700_000_000_000)
        .unwrap();
    let (query, signature) = signed.split_once("&signature=").unwrap();

    assert_eq!(
        query,
        "symbol=ETHUSDT&side=BUY&type=LIMIT&quantity=0.5&price=1800.5\
         &timeInForce=GTC&recvWindow=5000&timestamp=1700000000000"
    );

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(query.as_bytes());
    assert_eq!(signature, hex::encode(mac.finalize().into_bytes()));
}

#[test]
fn test_client_defaults_to_testnet() {
    let client = FuturesClient::new(ApiCredentials::new("k".to_string(), "s".to_string()), None)
        .unwrap();
    assert_eq!(client.base_url(), "https://testnet.binancefuture.com");
    assert!(client.is_testnet());
}

#[tokio::test]
async fn test_submitter_places_order_through_exchange() {
    let exchange = ScriptedExchange::new(filled);
    let submitter = OrderSubmitter::new(exchange.clone());

    let result = submitter
        .submit(&fields(OrderType::Market, None))
        .await
        .unwrap();

    assert_eq!(result.order_id, 4_051_209);
    assert_eq!(result.status, "FILLED");
    assert_eq!(result.executed_qty, Decimal::new(1, 2));
    assert_eq!(exchange.sent().len(), 1);
    assert_eq!(exchange.sent()[0][0], ("symbol", "BTCUSDT".to_string()));
}

/// An invalid field set never reaches the exchange.
#[tokio::test]
async fn test_limit_without_price_is_not_sent() {
    let exchange = ScriptedExchange::new(filled);
    let submitter = OrderSubmitter::new(exchange.clone());

    let err = submitter
        .submit(&fields(OrderType::Limit, None))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitError::InvalidOrder(ValidationError::MissingField("price"))
    ));
    assert!(exchange.sent().is_empty());
}

#[tokio::test]
async fn test_api_rejection_surfaces_as_api_error() {
    let exchange = ScriptedExchange::new(margin_rejected);
    let submitter = OrderSubmitter::new(exchange.clone());

    let err = submitter
        .submit(&fields(OrderType::Market, None))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::ExchangeRejected(_)));
    assert_eq!(
        err.to_string(),
        "API Error: APIError(code=-2019): Margin is insufficient."
    );
}

/// A full session over scripted terminal input.
#[tokio::test]
async fn test_session_places_limit_order_from_terminal_input() {
    let exchange = ScriptedExchange::new(filled);
    let submitter = OrderSubmitter::new(exchange.clone());
    let input = "btcusdt\nhold\nbuy\nlimit\n-1\n0.01\n30000.00\nexit\n";
    let mut prompter = Prompter::new(input.as_bytes(), Vec::new());

    let summary = order_bot::session::run(&mut prompter, &submitter)
        .await
        .unwrap();
    assert_eq!(summary.placed, 1);

    let sent = exchange.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains(&("price", "30000".to_string())));
    assert!(sent[0].contains(&("timeInForce", "GTC".to_string())));

    let out = String::from_utf8(prompter.into_parts().1).unwrap();
    assert!(out.contains("Invalid input. Choose from [BUY, SELL]"));
    assert!(out.contains("Value must be positive."));
    assert!(out.contains("Order ID: 4051209"));
}
