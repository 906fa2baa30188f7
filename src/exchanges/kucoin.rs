use serde_json::Value;

use super::{list_at, parse_book_list, payload, BookFields, QuoteAdapter, QuoteBatch};
use crate::error::ParseError;
use crate::models::ExchangeConfig;

/// KuCoin all tickers: `{data: {ticker: [{symbol: "BTC-USDT", buy, sell}]}}`.
pub const REST_URL: &str = "https://api.kucoin.com/api/v1/market/allTickers";
/// Taker fee when paying with KCS.
pub const FEE_PERCENT: f64 = 0.08;

pub struct KucoinAdapter;

impl QuoteAdapter for KucoinAdapter {
    fn id(&self) -> &'static str {
        "kucoin"
    }

    fn default_config(&self) -> ExchangeConfig {
        ExchangeConfig::new("KuCoin", REST_URL, FEE_PERCENT)
    }

    fn parse(&self, exchange: &str, payloads: &[Value]) -> Result<QuoteBatch, ParseError> {
        let items = list_at(payload(payloads, 0, 1)?, &["data", "ticker"])?;
        Ok(parse_book_list(
            exchange,
            items,
            BookFields {
                symbol: "symbol",
                bid: "buy",
                ask: "sell",
            },
        ))
    }
}
