use serde_json::Value;

use super::{list_at, parse_book_list, payload, BookFields, QuoteAdapter, QuoteBatch};
use crate::error::ParseError;
use crate::models::ExchangeConfig;

/// Bybit v5 spot tickers: `{result: {list: [{symbol, bid1Price, ask1Price}]}}`.
pub const REST_URL: &str = "https://api.bybit.com/v5/market/tickers?category=spot";
pub const FEE_PERCENT: f64 = 0.06;

pub struct BybitAdapter;

impl QuoteAdapter for BybitAdapter {
    fn id(&self) -> &'static str {
        "bybit"
    }

    fn default_config(&self) -> ExchangeConfig {
        ExchangeConfig::new("Bybit", REST_URL, FEE_PERCENT)
    }

    fn parse(&self, exchange: &str, payloads: &[Value]) -> Result<QuoteBatch, ParseError> {
        let items = list_at(payload(payloads, 0, 1)?, &["result", "list"])?;
        Ok(parse_book_list(
            exchange,
            items,
            BookFields {
                symbol: "symbol",
                bid: "bid1Price",
                ask: "ask1Price",
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_result_list() {
        let raw = json!({
            "retCode": 0,
            "result": {"category": "spot", "list": [
                {"symbol": "ETHUSDT", "bid1Price": "3000.01", "ask1Price": "3000.02",
                 "lastPrice": "3000.01"},
                {"symbol": "ETHUSDC", "bid1Price": "", "ask1Price": "3000.5"}
            ]}
        });
        let batch = BybitAdapter.parse("Bybit", &[raw]).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.parse_skipped, 1);
        assert_eq!(batch.quotes["ETHUSDT"].ask, 3000.02);
    }
}
