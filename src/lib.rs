//! Testnet Bot: interactive order entry for the Binance USD-M futures testnet.
//!
//! This is the root crate that ties the workspace together for integration
//! tests. For actual functionality, use the individual crates directly:
//!
//! - `binance-core`: Order types, request builder, configuration, REST client
//! - `order-bot`: Prompt loop, order submission, session, log file setup

pub use binance_core as core;
pub use order_bot as bot;
