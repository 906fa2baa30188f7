use serde_json::Value;
use std::collections::HashMap;

use super::{list_at, parse_book_record, payload, str_field, BookFields, QuoteAdapter, QuoteBatch};
use crate::error::{ParseError, RecordError};
use crate::models::ExchangeConfig;

/// MEXC price listing; bid/ask live in the separate book listing.
pub const REST_URL: &str = "https://api.mexc.com/api/v3/ticker/price";
pub const BOOK_URL: &str = "https://api.mexc.com/api/v3/ticker/bookTicker";
pub const FEE_PERCENT: f64 = 0.2;
const PAYLOADS: usize = 2;

const BOOK_FIELDS: BookFields = BookFields {
    symbol: "symbol",
    bid: "bidPrice",
    ask: "askPrice",
};

/// Needs two payloads: `[price listing, book listing]`, joined by raw symbol.
pub struct MexcAdapter;

impl QuoteAdapter for MexcAdapter {
    fn id(&self) -> &'static str {
        "mexc"
    }

    fn default_config(&self) -> ExchangeConfig {
        ExchangeConfig::new("MEXC", REST_URL, FEE_PERCENT).with_book_endpoint(BOOK_URL)
    }

    fn payload_count(&self) -> usize {
        PAYLOADS
    }

    fn parse(&self, exchange: &str, payloads: &[Value]) -> Result<QuoteBatch, ParseError> {
        let prices = list_at(payload(payloads, 0, PAYLOADS)?, &[])?;
        let books = list_at(payload(payloads, 1, PAYLOADS)?, &[])?;

        let book_map: HashMap<&str, &Value> = books
            .iter()
            .filter_map(|b| b.get("symbol").and_then(|s| s.as_str()).map(|s| (s, b)))
            .collect();

        let mut batch = QuoteBatch::default();
        for item in prices {
            let outcome = str_field(item, "symbol")
                .map_err(RecordError::from)
                .and_then(|symbol| {
                    let book = book_map
                        .get(symbol)
                        .ok_or_else(|| ParseError::UnmatchedSymbol(symbol.to_string()))?;
                    parse_book_record(exchange, book, BOOK_FIELDS)
                });
            batch.record(outcome);
        }
        Ok(batch)
    }
}
