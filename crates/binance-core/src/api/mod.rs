//! API clients for external services.

pub mod binance;

pub use binance::{ApiCredentials, FuturesClient, FuturesExchange, OrderAck};
