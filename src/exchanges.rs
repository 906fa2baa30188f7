use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ParseError, RecordError};
use crate::models::{ExchangeConfig, Quote, QuoteBook};
use crate::pairs::normalize;
use crate::utils::value_as_f64;
use crate::validator::check_book;

pub mod binance;
pub mod bitget;
pub mod bybit;
pub mod kucoin;
pub mod lbank;
pub mod mexc;
pub mod okx;

/// Translates one exchange's decoded payload(s) into canonical quotes.
///
/// `parse` fails only when the payload as a whole is unusable; a bad record
/// is counted in the returned batch and skipped.
pub trait QuoteAdapter: Send + Sync {
    /// Registry key, lowercase.
    fn id(&self) -> &'static str;

    /// Endpoint and fee used when no configuration overrides them.
    fn default_config(&self) -> ExchangeConfig;

    /// Number of endpoints `parse` expects payloads from.
    fn payload_count(&self) -> usize {
        1
    }

    fn parse(&self, exchange: &str, payloads: &[Value]) -> Result<QuoteBatch, ParseError>;
}

/// Quotes accepted from one payload plus counts of what was skipped.
#[derive(Debug, Default, Clone)]
pub struct QuoteBatch {
    pub quotes: QuoteBook,
    pub parse_skipped: usize,
    pub validation_skipped: usize,
}

impl QuoteBatch {
    /// Later records for an already seen canonical pair replace the earlier one.
    pub fn record(&mut self, outcome: Result<Quote, RecordError>) {
        match outcome {
            Ok(q) => {
                self.quotes.insert(q.canonical_pair.clone(), q);
            }
            Err(RecordError::Parse(e)) => {
                debug!("skipped record: {}", e);
                self.parse_skipped += 1;
            }
            Err(RecordError::Validation(e)) => {
                debug!("rejected quote: {}", e);
                self.validation_skipped += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Field names of a flat `{symbol, bid, ask}` ticker record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BookFields {
    pub symbol: &'static str,
    pub bid: &'static str,
    pub ask: &'static str,
}

pub(crate) fn payload(
    payloads: &[Value],
    index: usize,
    expected: usize,
) -> Result<&Value, ParseError> {
    if payloads.len() < expected {
        return Err(ParseError::MissingPayload {
            expected,
            got: payloads.len(),
        });
    }
    payloads.get(index).ok_or(ParseError::MissingPayload {
        expected,
        got: payloads.len(),
    })
}

/// Walks `path` through nested objects and returns the array found there.
/// An empty path means the payload itself must be the array.
pub(crate) fn list_at<'a>(
    root: &'a Value,
    path: &[&'static str],
) -> Result<&'a Vec<Value>, ParseError> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key).ok_or(ParseError::MissingList(*key))?;
    }
    cur.as_array()
        .ok_or(ParseError::MissingList(path.last().copied().unwrap_or("<root>")))
}

pub(crate) fn str_field<'a>(item: &'a Value, key: &'static str) -> Result<&'a str, ParseError> {
    item.get(key)
        .and_then(|v| v.as_str())
        .ok_or(ParseError::MissingField(key))
}

pub(crate) fn price_field(item: &Value, key: &'static str) -> Result<f64, ParseError> {
    let v = item.get(key).ok_or(ParseError::MissingField(key))?;
    value_as_f64(v).ok_or_else(|| ParseError::NotNumeric {
        field: key,
        raw: v.to_string(),
    })
}

/// Validates a book and builds the quote keyed by the normalized symbol.
pub(crate) fn build_quote(
    exchange: &str,
    raw_symbol: &str,
    bid: f64,
    ask: f64,
) -> Result<Quote, RecordError> {
    check_book(bid, ask)?;
    Ok(Quote {
        exchange: exchange.to_string(),
        canonical_pair: normalize(raw_symbol),
        bid,
        ask,
        original_symbol: raw_symbol.to_string(),
    })
}

pub(crate) fn parse_book_record(
    exchange: &str,
    item: &Value,
    fields: BookFields,
) -> Result<Quote, RecordError> {
    // all three fields must be present before any is parsed
    let symbol = str_field(item, fields.symbol)?;
    item.get(fields.bid).ok_or(ParseError::MissingField(fields.bid))?;
    item.get(fields.ask).ok_or(ParseError::MissingField(fields.ask))?;

    let bid = price_field(item, fields.bid)?;
    let ask = price_field(item, fields.ask)?;
    build_quote(exchange, symbol, bid, ask)
}

pub(crate) fn parse_book_list(exchange: &str, items: &[Value], fields: BookFields) -> QuoteBatch {
    let mut batch = QuoteBatch::default();
    for item in items {
        batch.record(parse_book_record(exchange, item, fields));
    }
    batch
}

/// Every built-in adapter, in the default display order.
pub fn default_adapters() -> Vec<Arc<dyn QuoteAdapter>> {
    vec![
        Arc::new(binance::BinanceAdapter),
        Arc::new(kucoin::KucoinAdapter),
        Arc::new(mexc::MexcAdapter),
        Arc::new(bybit::BybitAdapter),
        Arc::new(okx::OkxAdapter),
        Arc::new(lbank::LbankAdapter),
        Arc::new(bitget::BitgetAdapter),
    ]
}

/// Name-keyed adapter lookup, built once at startup.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn QuoteAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        for adapter in default_adapters() {
            reg.register(adapter);
        }
        reg
    }

    pub fn register(&mut self, adapter: Arc<dyn QuoteAdapter>) {
        self.adapters.insert(adapter.id().to_string(), adapter);
    }

    /// Case-insensitive lookup by exchange name.
    pub fn get(&self, exchange: &str) -> Option<Arc<dyn QuoteAdapter>> {
        self.adapters.get(&exchange.to_lowercase()).cloned()
    }

    pub fn contains(&self, exchange: &str) -> bool {
        self.adapters.contains_key(&exchange.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use serde_json::json;

    const FIELDS: BookFields = BookFields {
        symbol: "symbol",
        bid: "bid",
        ask: "ask",
    };

    #[test]
    fn bad_records_are_counted_not_fatal() {
        let items = vec![
            json!({"symbol": "BTC-USDT", "bid": "100", "ask": "100.5"}),
            json!({"symbol": "ETH-USDT", "bid": "abc", "ask": "1"}),
            json!({"symbol": "XRP-USDT", "ask": "1"}),
            json!({"symbol": "SOL-USDT", "bid": "100", "ask": "102"}),
            json!({"symbol": "DOGE-USDT", "bid": 0.1, "ask": 0.1001}),
        ];
        let batch = parse_book_list("Test", &items, FIELDS);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.parse_skipped, 2);
        assert_eq!(batch.validation_skipped, 1);
        assert!(batch.quotes.contains_key("BTCUSDT"));
        assert!(batch.quotes.contains_key("DOGEUSDT"));
    }

    #[test]
    fn colliding_pairs_keep_the_last_record() {
        let items = vec![
            json!({"symbol": "BTC-USDT", "bid": "100", "ask": "100.5"}),
            json!({"symbol": "BTC_USDT", "bid": "101", "ask": "101.5"}),
        ];
        let batch = parse_book_list("Test", &items, FIELDS);
        assert_eq!(batch.len(), 1);
        let q = &batch.quotes["BTCUSDT"];
        assert_eq!(q.bid, 101.0);
        assert_eq!(q.original_symbol, "BTC_USDT");
    }

    #[test]
    fn build_quote_validates() {
        let err = build_quote("Test", "BTCUSDT", 100.0, 99.0).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Validation(ValidationError::Crossed { .. })
        ));
    }

    #[test]
    fn registry_is_case_insensitive() {
        let reg = AdapterRegistry::with_defaults();
        assert!(reg.contains("Binance"));
        assert!(reg.contains("OKX"));
        assert!(reg.get("lbank").is_some());
        assert!(reg.get("gateio").is_none());
    }

    #[test]
    fn list_at_reports_missing_envelope() {
        let v = json!({"data": {"other": []}});
        assert_eq!(
            list_at(&v, &["data", "ticker"]).unwrap_err(),
            ParseError::MissingList("ticker")
        );
        assert!(list_at(&json!([]), &[]).is_ok());
        assert_eq!(
            list_at(&json!({}), &[]).unwrap_err(),
            ParseError::MissingList("<root>")
        );
    }
}
