use serde_json::Value;

use super::{build_quote, list_at, payload, price_field, str_field, QuoteAdapter, QuoteBatch};
use crate::error::{ParseError, RecordError};
use crate::models::{ExchangeConfig, Quote};

/// LBank tickers: top-level array of `{symbol: "btc_usdt", ticker: {...}}`.
pub const REST_URL: &str = "https://api.lbkex.com/v1/ticker.do?symbol=all";
pub const FEE_PERCENT: f64 = 0.08;

/// Half-spread put around `latest` when the ticker carries no book.
pub const SYNTHETIC_HALF_SPREAD: f64 = 0.001;

pub struct LbankAdapter;

fn parse_record(exchange: &str, item: &Value) -> Result<Quote, RecordError> {
    let symbol = str_field(item, "symbol")?;
    let ticker = item.get("ticker").ok_or(ParseError::MissingField("ticker"))?;

    let (bid, ask) = if ticker.get("bid").is_some() && ticker.get("ask").is_some() {
        (price_field(ticker, "bid")?, price_field(ticker, "ask")?)
    } else {
        let latest = price_field(ticker, "latest")?;
        (
            latest * (1.0 - SYNTHETIC_HALF_SPREAD),
            latest * (1.0 + SYNTHETIC_HALF_SPREAD),
        )
    };
    build_quote(exchange, symbol, bid, ask)
}

impl QuoteAdapter for LbankAdapter {
    fn id(&self) -> &'static str {
        "lbank"
    }

    fn default_config(&self) -> ExchangeConfig {
        ExchangeConfig::new("LBank", REST_URL, FEE_PERCENT)
    }

    fn parse(&self, exchange: &str, payloads: &[Value]) -> Result<QuoteBatch, ParseError> {
        let items = list_at(payload(payloads, 0, 1)?, &[])?;
        let mut batch = QuoteBatch::default();
        for item in items {
            batch.record(parse_record(exchange, item));
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_book_wins_over_latest() {
        let raw = json!([
            {"symbol": "eth_usdt", "ticker": {"bid": "3000", "ask": "3001", "latest": "2000"}}
        ]);
        let batch = LbankAdapter.parse("LBank", &[raw]).unwrap();
        let q = &batch.quotes["ETHUSDT"];
        assert_eq!(q.bid, 3000.0);
        assert_eq!(q.ask, 3001.0);
    }

    #[test]
    fn latest_only_gets_synthetic_spread() {
        let raw = json!([
            {"symbol": "btc_usdt", "ticker": {"latest": "100", "vol": "12"}},
            {"symbol": "bad_usdt", "ticker": {"vol": "12"}},
            {"symbol": "nop_usdt"}
        ]);
        let batch = LbankAdapter.parse("LBank", &[raw]).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.parse_skipped, 2);
        let q = &batch.quotes["BTCUSDT"];
        assert!((q.bid - 99.9).abs() < 1e-9);
        assert!((q.ask - 100.1).abs() < 1e-9);
        assert_eq!(q.original_symbol, "btc_usdt");
    }
}
