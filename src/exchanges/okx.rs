use serde_json::Value;

use super::{list_at, parse_book_list, payload, BookFields, QuoteAdapter, QuoteBatch};
use crate::error::ParseError;
use crate::models::ExchangeConfig;

/// OKX spot tickers: `{data: [{instId: "BTC-USDT", bidPx, askPx}]}`.
pub const REST_URL: &str = "https://www.okx.com/api/v5/market/tickers?instType=SPOT";
/// Taker fee when paying with OKB.
pub const FEE_PERCENT: f64 = 0.08;

pub struct OkxAdapter;

impl QuoteAdapter for OkxAdapter {
    fn id(&self) -> &'static str {
        "okx"
    }

    fn default_config(&self) -> ExchangeConfig {
        ExchangeConfig::new("OKX", REST_URL, FEE_PERCENT)
    }

    fn parse(&self, exchange: &str, payloads: &[Value]) -> Result<QuoteBatch, ParseError> {
        let items = list_at(payload(payloads, 0, 1)?, &["data"])?;
        Ok(parse_book_list(
            exchange,
            items,
            BookFields {
                symbol: "instId",
                bid: "bidPx",
                ask: "askPx",
            },
        ))
    }
}
