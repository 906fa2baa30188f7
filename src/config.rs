use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::exchanges::{default_adapters, AdapterRegistry};
use crate::models::{ExchangeConfig, Opportunity, ScanRequest};
use crate::pairs::DEFAULT_QUOTE_CURRENCIES;
use crate::utils::parse_f64;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_INVESTMENT: f64 = 1000.0;
pub const DEFAULT_MIN_PROFIT_PERCENT: f64 = 0.5;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Process-wide settings, read-only after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub exchanges: Vec<ExchangeConfig>,
    pub quote_currencies: Vec<String>,
    pub defaults: ScanParams,
    pub fetch_timeout: Duration,
}

/// Optional json file named by `ARB_CONFIG`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileConfig {
    exchanges: Option<Vec<ExchangeConfig>>,
    quote_currencies: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            exchanges: default_adapters().iter().map(|a| a.default_config()).collect(),
            quote_currencies: DEFAULT_QUOTE_CURRENCIES.iter().map(|s| s.to_string()).collect(),
            defaults: ScanParams::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env(registry: &AdapterRegistry) -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok(), registry)
    }

    /// Defaults, then `ARB_CONFIG` file, then individual variables.
    pub fn from_vars<F>(var: F, registry: &AdapterRegistry) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(path) = var("ARB_CONFIG") {
            cfg.apply_file(&path)?;
        }
        if let Some(v) = var("PORT") {
            cfg.port = v.trim().parse().map_err(|_| ConfigError::NotNumeric {
                field: "PORT",
                raw: v.clone(),
            })?;
        }
        if let Some(v) = var("ARB_INVESTMENT") {
            cfg.defaults.investment = positive_number("investment", &Value::String(v))?;
        }
        if let Some(v) = var("ARB_MIN_PROFIT") {
            cfg.defaults.filter.min_profit_percent =
                positive_number("minProfit", &Value::String(v))?;
        }
        if let Some(v) = var("ARB_FETCH_TIMEOUT_SECS") {
            let secs = positive_number("ARB_FETCH_TIMEOUT_SECS", &Value::String(v))?;
            cfg.fetch_timeout =
                Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::OutOfRange {
                    field: "ARB_FETCH_TIMEOUT_SECS",
                    value: secs,
                })?;
        }
        if let Some(v) = var("ARB_EXCHANGES") {
            let wanted: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            let keep = cfg.resolve_names(&wanted)?;
            cfg.exchanges.retain(|e| keep.contains(&e.name));
        }

        cfg.validate(registry)?;
        Ok(cfg)
    }

    fn apply_file(&mut self, path: &str) -> Result<(), ConfigError> {
        let file_err = |reason: String| ConfigError::File {
            path: path.to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
        let file: FileConfig = serde_json::from_str(&raw).map_err(|e| file_err(e.to_string()))?;
        if let Some(exchanges) = file.exchanges {
            self.exchanges = exchanges;
        }
        if let Some(quotes) = file.quote_currencies {
            self.quote_currencies = quotes.iter().map(|q| q.trim().to_uppercase()).collect();
        }
        Ok(())
    }

    /// Startup checks; any failure here stops the process from serving.
    pub fn validate(&self, registry: &AdapterRegistry) -> Result<(), ConfigError> {
        if self.quote_currencies.is_empty() {
            return Err(ConfigError::BadQuoteCurrencies("list is empty".to_string()));
        }
        if self.quote_currencies.iter().any(|q| q.is_empty()) {
            return Err(ConfigError::BadQuoteCurrencies("empty entry".to_string()));
        }

        let mut seen = HashSet::new();
        for ex in &self.exchanges {
            if !seen.insert(ex.name.to_lowercase()) {
                return Err(ConfigError::DuplicateExchange(ex.name.clone()));
            }
            let Some(adapter) = registry.get(&ex.name) else {
                return Err(ConfigError::NoAdapter(ex.name.clone()));
            };
            let got = ex.endpoints().len();
            if got != adapter.payload_count() {
                return Err(ConfigError::EndpointCount {
                    exchange: ex.name.clone(),
                    expected: adapter.payload_count(),
                    got,
                });
            }
            if !ex.fee_percent.is_finite() || ex.fee_percent < 0.0 {
                return Err(ConfigError::BadFee {
                    exchange: ex.name.clone(),
                    fee: ex.fee_percent,
                });
            }
            for endpoint in ex.endpoints() {
                Url::parse(endpoint).map_err(|e| ConfigError::BadEndpoint {
                    exchange: ex.name.clone(),
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(())
    }

    /// Maps user supplied names onto configured names, ignoring case.
    pub fn resolve_names(&self, names: &[String]) -> Result<Vec<String>, ConfigError> {
        names
            .iter()
            .map(|n| {
                self.exchanges
                    .iter()
                    .find(|e| e.name.eq_ignore_ascii_case(n.trim()))
                    .map(|e| e.name.clone())
                    .ok_or_else(|| ConfigError::UnknownExchange(n.clone()))
            })
            .collect()
    }

    /// Validates one scan request against this configuration. Missing fields
    /// fall back to the configured defaults.
    pub fn scan_params(&self, req: &ScanRequest) -> Result<ScanParams, ConfigError> {
        let investment = match &req.investment {
            Some(v) => positive_number("investment", v)?,
            None => self.defaults.investment,
        };
        let min_profit_percent = match &req.min_profit {
            Some(v) => positive_number("minProfit", v)?,
            None => self.defaults.filter.min_profit_percent,
        };
        let selected_exchanges = match &req.exchanges {
            Some(names) => Some(self.resolve_names(names)?),
            None => self.defaults.filter.selected_exchanges.clone(),
        };
        Ok(ScanParams {
            investment,
            filter: ViewFilter {
                min_profit_percent,
                selected_exchanges,
            },
        })
    }
}

/// Accepts a json number or a numeric string; must be finite and > 0.
pub fn positive_number(field: &'static str, v: &Value) -> Result<f64, ConfigError> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_f64(s),
        _ => None,
    };
    let value = parsed.ok_or_else(|| ConfigError::NotNumeric {
        field,
        raw: match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    })?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(value)
}

/// Presentation-level filter applied by the caller after ranking.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewFilter {
    pub min_profit_percent: f64,
    /// `None` keeps every exchange.
    pub selected_exchanges: Option<Vec<String>>,
}

impl ViewFilter {
    pub fn accepts(&self, op: &Opportunity) -> bool {
        let selected = |name: &str| {
            self.selected_exchanges
                .as_ref()
                .map_or(true, |s| s.iter().any(|e| e == name))
        };
        op.profit_percent >= self.min_profit_percent
            && selected(&op.buy_exchange)
            && selected(&op.sell_exchange)
    }

    /// Keeps ranking order.
    pub fn apply(&self, ranked: &[Opportunity]) -> Vec<Opportunity> {
        ranked.iter().filter(|op| self.accepts(op)).cloned().collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanParams {
    pub investment: f64,
    pub filter: ViewFilter,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            investment: DEFAULT_INVESTMENT,
            filter: ViewFilter {
                min_profit_percent: DEFAULT_MIN_PROFIT_PERCENT,
                selected_exchanges: None,
            },
        }
    }
}
