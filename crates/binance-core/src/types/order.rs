//! Order types and request construction for futures order placement.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Side of the order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub const ALL: [OrderSide; 2] = [OrderSide::Buy, OrderSide::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            _ => Err(ValidationError::UnknownValue {
                field: "side",
                value: s.to_string(),
            }),
        }
    }
}

/// Type of order accepted by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
    /// Limit order that only becomes active once the stop price trades.
    StopLimit,
}

impl OrderType {
    pub const ALL: [OrderType; 3] = [OrderType::Market, OrderType::Limit, OrderType::StopLimit];

    /// Token the user types and the log shows.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::StopLimit => "STOP_LIMIT",
        }
    }

    /// Value of the `type` parameter on the futures order endpoint.
    ///
    /// USD-M futures call a stop-limit order `STOP`.
    pub fn wire_type(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::StopLimit => "STOP",
        }
    }

    pub fn requires_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }

    pub fn requires_stop_price(&self) -> bool {
        matches!(self, OrderType::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            "STOP_LIMIT" => Ok(OrderType::StopLimit),
            _ => Err(ValidationError::UnknownValue {
                field: "order type",
                value: s.to_string(),
            }),
        }
    }
}

/// Time-in-force policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInForce {
    /// Good-till-cancelled.
    Gtc,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
        }
    }
}

/// Reasons an order cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must be specified")]
    MissingField(&'static str),

    #[error("{field} is not accepted for {order_type} orders")]
    UnexpectedField {
        field: &'static str,
        order_type: OrderType,
    },

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },
}

/// A well-formed futures order, built fresh for each submission.
///
/// Fields are private so a request can only come out of [`OrderRequest::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    symbol: String,
    side: OrderSide,
    order_type: OrderType,
    quantity: Decimal,
    price: Option<Decimal>,
    stop_price: Option<Decimal>,
    time_in_force: Option<TimeInForce>,
}

impl OrderRequest {
    /// Validate the field set against the rules of `order_type`.
    ///
    /// For STOP_LIMIT with both prices absent, `price` is reported.
    pub fn build(
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ValidationError::MissingField("symbol"));
        }
        ensure_positive("quantity", quantity)?;

        let price = match (order_type.requires_price(), price) {
            (true, None) => return Err(ValidationError::MissingField("price")),
            (true, Some(p)) => Some(ensure_positive("price", p)?),
            (false, Some(_)) => {
                return Err(ValidationError::UnexpectedField {
                    field: "price",
                    order_type,
                })
            }
            (false, None) => None,
        };

        let stop_price = match (order_type.requires_stop_price(), stop_price) {
            (true, None) => return Err(ValidationError::MissingField("stop_price")),
            (true, Some(p)) => Some(ensure_positive("stop_price", p)?),
            (false, Some(_)) => {
                return Err(ValidationError::UnexpectedField {
                    field: "stop_price",
                    order_type,
                })
            }
            (false, None) => None,
        };

        let time_in_force = order_type.requires_price().then_some(TimeInForce::Gtc);

        Ok(Self {
            symbol,
            side,
            order_type,
            quantity,
            price,
            stop_price,
            time_in_force,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn stop_price(&self) -> Option<Decimal> {
        self.stop_price
    }

    pub fn time_in_force(&self) -> Option<TimeInForce> {
        self.time_in_force
    }

    /// Outbound parameters in wire order. Absent fields are left out entirely.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", self.symbol.clone()),
            ("side", self.side.as_str().to_string()),
            ("type", self.order_type.wire_type().to_string()),
            ("quantity", format_decimal(self.quantity)),
        ];
        if let Some(price) = self.price {
            params.push(("price", format_decimal(price)));
        }
        if let Some(stop_price) = self.stop_price {
            params.push(("stopPrice", format_decimal(stop_price)));
        }
        if let Some(tif) = self.time_in_force {
            params.push(("timeInForce", tif.as_str().to_string()));
        }
        params
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.to_params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        f.write_str("}")
    }
}

fn ensure_positive(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositive(field));
    }
    Ok(value)
}

/// Render a decimal without trailing zeros (`0.0100` -> `0.01`).
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
