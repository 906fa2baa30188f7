use serde_json::Value;

use super::{list_at, parse_book_record, payload, BookFields, QuoteAdapter, QuoteBatch};
use crate::error::{ParseError, RecordError};
use crate::models::{ExchangeConfig, Quote};
use crate::pairs::normalize;

/// Bitget v1 spot tickers: `{data: [{symbol: "BTCUSDT_SPBL", buyOne, sellOne}]}`.
pub const REST_URL: &str = "https://api.bitget.com/api/spot/v1/market/tickers";
pub const FEE_PERCENT: f64 = 0.1;

/// Product-line suffix on v1 spot symbols.
const SPOT_SUFFIX: &str = "_SPBL";

pub struct BitgetAdapter;

fn parse_record(exchange: &str, item: &Value) -> Result<Quote, RecordError> {
    let mut quote = parse_book_record(
        exchange,
        item,
        BookFields {
            symbol: "symbol",
            bid: "buyOne",
            ask: "sellOne",
        },
    )?;
    let raw = quote.original_symbol.as_str();
    let trimmed = raw.strip_suffix(SPOT_SUFFIX).unwrap_or(raw);
    quote.canonical_pair = normalize(trimmed);
    Ok(quote)
}

impl QuoteAdapter for BitgetAdapter {
    fn id(&self) -> &'static str {
        "bitget"
    }

    fn default_config(&self) -> ExchangeConfig {
        ExchangeConfig::new("Bitget", REST_URL, FEE_PERCENT)
    }

    fn parse(&self, exchange: &str, payloads: &[Value]) -> Result<QuoteBatch, ParseError> {
        let items = list_at(payload(payloads, 0, 1)?, &["data"])?;
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
    fn strips_product_suffix() {
        let raw = json!({"code": "00000", "data": [
            {"symbol": "BTCUSDT_SPBL", "buyOne": "60000", "sellOne": "60001"},
            {"symbol": "ETHUSDT", "buyOne": "3000", "sellOne": "3000.3"}
        ]});
        let batch = BitgetAdapter.parse("Bitget", &[raw]).unwrap();
        assert_eq!(batch.len(), 2);
        let btc = &batch.quotes["BTCUSDT"];
        assert_eq!(btc.original_symbol, "BTCUSDT_SPBL");
        assert!(batch.quotes.contains_key("ETHUSDT"));
    }
}
