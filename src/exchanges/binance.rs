use serde_json::Value;

use super::{list_at, parse_book_list, payload, BookFields, QuoteAdapter, QuoteBatch};
use crate::error::ParseError;
use crate::models::ExchangeConfig;

/// Binance spot book tickers: top-level array of `{symbol, bidPrice, askPrice}`.
pub const REST_URL: &str = "https://api.binance.com/api/v3/ticker/bookTicker";
/// Taker fee when paying with BNB.
pub const FEE_PERCENT: f64 = 0.075;

pub struct BinanceAdapter;

impl QuoteAdapter for BinanceAdapter {
    fn id(&self) -> &'static str {
        "binance"
    }

    fn default_config(&self) -> ExchangeConfig {
        ExchangeConfig::new("Binance", REST_URL, FEE_PERCENT)
    }

    fn parse(&self, exchange: &str, payloads: &[Value]) -> Result<QuoteBatch, ParseError> {
        let items = list_at(payload(payloads, 0, 1)?, &[])?;
        Ok(parse_book_list(
            exchange,
            items,
            BookFields {
                symbol: "symbol",
                bid: "bidPrice",
                ask: "askPrice",
            },
        ))
    }
}
