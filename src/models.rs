use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Static description of one exchange, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeConfig {
    pub name: String,
    pub endpoint: String,
    /// Second listing for exchanges that split prices and order book.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_endpoint: Option<String>,
    /// Taker fee in percent (0.1 == 0.1%).
    pub fee_percent: f64,
}

impl ExchangeConfig {
    pub fn new(name: &str, endpoint: &str, fee_percent: f64) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            book_endpoint: None,
            fee_percent,
        }
    }

    pub fn with_book_endpoint(mut self, endpoint: &str) -> Self {
        self.book_endpoint = Some(endpoint.to_string());
        self
    }

    /// All endpoints to fetch for this exchange, in the order the adapter expects them.
    pub fn endpoints(&self) -> Vec<&str> {
        let mut out = vec![self.endpoint.as_str()];
        if let Some(book) = &self.book_endpoint {
            out.push(book.as_str());
        }
        out
    }
}

/// Best bid/ask of one exchange for one canonical pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub exchange: String,
    pub canonical_pair: String,
    pub bid: f64,
    pub ask: f64,
    pub original_symbol: String,
}

/// Quotes of a single exchange keyed by canonical pair.
pub type QuoteBook = HashMap<String, Quote>;

/// Every quote collected during one fetch cycle: exchange -> pair -> quote.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub cycle_id: u64,
    pub fetched_at: DateTime<Utc>,
    pub quotes: BTreeMap<String, QuoteBook>,
}

impl Snapshot {
    pub fn new(cycle_id: u64) -> Self {
        Self {
            cycle_id,
            fetched_at: Utc::now(),
            quotes: BTreeMap::new(),
        }
    }

    pub fn insert_exchange(&mut self, exchange: &str, book: QuoteBook) {
        self.quotes.insert(exchange.to_string(), book);
    }

    pub fn quote(&self, exchange: &str, pair: &str) -> Option<&Quote> {
        self.quotes.get(exchange).and_then(|book| book.get(pair))
    }

    pub fn quote_count(&self) -> usize {
        self.quotes.values().map(|b| b.len()).sum()
    }
}

/// Fee-adjusted buy-on-one, sell-on-another candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    /// Display form, `BASE/QUOTE` when the quote currency is recognised.
    pub pair: String,
    pub canonical_pair: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub profit_percent: f64,
    pub profit_amount: f64,
    pub investment: f64,
    pub buy_fee_percent: f64,
    pub sell_fee_percent: f64,
    pub coins_bought: f64,
    pub final_amount: f64,
    pub original_buy_symbol: String,
    pub original_sell_symbol: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Ok,
    Failed,
}

/// Per-exchange outcome of one cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeHealth {
    pub exchange: String,
    pub quote_count: usize,
    pub status: FetchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub parse_skipped: usize,
    pub validation_skipped: usize,
    pub elapsed_ms: u64,
}

impl ExchangeHealth {
    pub fn failed(exchange: &str, error: String, elapsed_ms: u64) -> Self {
        Self {
            exchange: exchange.to_string(),
            quote_count: 0,
            status: FetchStatus::Failed,
            error: Some(error),
            parse_skipped: 0,
            validation_skipped: 0,
            elapsed_ms,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }
}

/// Body of `POST /scan`. Numbers may arrive as strings, straight from a form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub investment: Option<serde_json::Value>,
    #[serde(default, alias = "minProfit")]
    pub min_profit: Option<serde_json::Value>,
    #[serde(default)]
    pub exchanges: Option<Vec<String>>,
}
