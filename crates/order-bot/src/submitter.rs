//! Order submission: build the request, send it, classify the outcome.

use binance_core::api::{FuturesExchange, OrderAck};
use binance_core::types::{OrderRequest, OrderSide, OrderType, ValidationError};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Field set collected from the user for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFields {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
}

impl OrderFields {
    pub fn build(&self) -> Result<OrderRequest, ValidationError> {
        OrderRequest::build(
            &self.symbol,
            self.side,
            self.order_type,
            self.quantity,
            self.price,
            self.stop_price,
        )
    }
}

/// What the user is shown after a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderResult {
    pub order_id: i64,
    pub status: String,
    pub executed_qty: Decimal,
}

impl From<&OrderAck> for OrderResult {
    fn from(ack: &OrderAck) -> Self {
        Self {
            order_id: ack.order_id,
            status: ack.status.clone(),
            executed_qty: ack.executed_qty,
        }
    }
}

/// Failure classes surfaced to the user. `Display` is the one-line message.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The field set did not form a valid order; nothing was sent.
    #[error("Error: {0}")]
    InvalidOrder(#[from] ValidationError),

    /// The exchange rejected the request (symbol, margin, credentials...).
    #[error("API Error: {0}")]
    ExchangeRejected(String),

    /// The exchange flagged the order parameters as invalid.
    #[error("Order Error: {0}")]
    OrderConstraintViolation(String),

    /// Transport, decoding or anything else.
    #[error("Error: {0}")]
    Unexpected(String),
}

impl From<binance_core::Error> for SubmitError {
    fn from(err: binance_core::Error) -> Self {
        use binance_core::Error;

        match err {
            e @ Error::Api { .. } => SubmitError::ExchangeRejected(e.to_string()),
            e @ Error::OrderRejected { .. } => SubmitError::OrderConstraintViolation(e.to_string()),
            e => SubmitError::Unexpected(e.to_string()),
        }
    }
}

/// Sends one order at a time through an exchange client.
pub struct OrderSubmitter {
    exchange: Arc<dyn FuturesExchange>,
}

impl OrderSubmitter {
    pub fn new(exchange: Arc<dyn FuturesExchange>) -> Self {
        Self { exchange }
    }

    /// Build and place an order. No retries on any failure.
    pub async fn submit(&self, fields: &OrderFields) -> Result<OrderResult, SubmitError> {
        let order = fields.build().map_err(|e| {
            error!(symbol = %fields.symbol, order_type = %fields.order_type, "Invalid order: {}", e);
            SubmitError::from(e)
        })?;

        info!("Placing order: {}", order);

        match self.exchange.create_order(&order).await {
            Ok(ack) => {
                info!("Order placed successfully: {}", ack);
                Ok(OrderResult::from(&ack))
            }
            Err(e) => {
                let code = e.code();
                let err = SubmitError::from(e);
                match &err {
                    SubmitError::ExchangeRejected(detail) => {
                        error!(code, "Binance API Exception: {}", detail)
                    }
                    SubmitError::OrderConstraintViolation(detail) => {
                        error!(code, "Binance Order Exception: {}", detail)
                    }
                    SubmitError::InvalidOrder(detail) => error!("Invalid order: {}", detail),
                    SubmitError::Unexpected(detail) => error!("Unexpected error: {}", detail),
                }
                Err(err)
            }
        }
    }
}
