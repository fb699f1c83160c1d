//! Order Bot
//!
//! Interactive order entry for the Binance USD-M futures testnet: prompt,
//! build, submit, report.

pub mod logging;
pub mod prompt;
pub mod session;
pub mod submitter;

pub use prompt::{PromptError, Prompter};
pub use session::SessionSummary;
pub use submitter::{OrderFields, OrderResult, OrderSubmitter, SubmitError};
