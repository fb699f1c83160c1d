//! Interactive session: prompt for an order, submit it, report, repeat.

use crate::prompt::{PromptError, Prompter};
use crate::submitter::{OrderFields, OrderSubmitter};
use binance_core::types::{OrderSide, OrderType};
use std::io::Write;
use tokio::io::AsyncBufRead;
use tracing::info;

/// Symbol answer that ends the session.
pub const EXIT_TOKEN: &str = "exit";

/// Counters reported when the session ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub attempted: u32,
    pub placed: u32,
    pub failed: u32,
}

/// Run until the user types the exit token or input ends.
pub async fn run<R, W>(
    prompter: &mut Prompter<R, W>,
    submitter: &OrderSubmitter,
) -> Result<SessionSummary, PromptError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut summary = SessionSummary::default();

    loop {
        let fields = match collect_order(prompter).await {
            Ok(Some(fields)) => fields,
            Ok(None) | Err(PromptError::Closed) => break,
            Err(e) => return Err(e),
        };

        summary.attempted += 1;
        match submitter.submit(&fields).await {
            Ok(result) => {
                summary.placed += 1;
                prompter.say("Order placed successfully!")?;
                prompter.say(&format!("Order ID: {}", result.order_id))?;
                prompter.say(&format!("Status: {}", result.status))?;
                prompter.say(&format!("Executed Quantity: {}", result.executed_qty))?;
            }
            Err(e) => {
                summary.failed += 1;
                prompter.say(&e.to_string())?;
                prompter.say("Failed to place order. Check logs for details.")?;
            }
        }
    }

    prompter.say("Exiting...")?;
    info!(
        attempted = summary.attempted,
        placed = summary.placed,
        failed = summary.failed,
        "Session ended"
    );
    Ok(summary)
}

/// Collect one field set, or `None` when the user asks to exit.
pub async fn collect_order<R, W>(
    prompter: &mut Prompter<R, W>,
) -> Result<Option<OrderFields>, PromptError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    prompter.say("")?;
    prompter.say("Place a new order or type 'exit' to quit.")?;

    let symbol = loop {
        let symbol = prompter.line("Enter symbol (e.g., BTCUSDT): ").await?;
        if symbol.eq_ignore_ascii_case(EXIT_TOKEN) {
            return Ok(None);
        }
        if !symbol.is_empty() {
            break symbol.to_uppercase();
        }
    };

    let side = prompter
        .choice("Order side (BUY/SELL): ", &OrderSide::ALL)
        .await?;
    let order_type = prompter
        .choice("Order type (MARKET/LIMIT/STOP_LIMIT): ", &OrderType::ALL)
        .await?;
    let quantity = prompter.positive_decimal("Quantity: ").await?;

    let (price, stop_price) = match order_type {
        OrderType::Market => (None, None),
        OrderType::Limit => (Some(prompter.positive_decimal("Limit price: ").await?), None),
        OrderType::StopLimit => {
            let stop_price = prompter.positive_decimal("Stop price: ").await?;
            let price = prompter.positive_decimal("Limit price: ").await?;
            (Some(price), Some(stop_price))
        }
    };

    Ok(Some(OrderFields {
        symbol,
        side,
        order_type,
        quantity,
        price,
        stop_price,
    }))
}
