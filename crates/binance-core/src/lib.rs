//! Futures Core Library
//!
//! Order types, request construction, configuration and the signed REST
//! client for the Binance USD-M futures testnet.

pub mod api;
pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
