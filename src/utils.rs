use serde_json::Value;
use tracing_subscriber::EnvFilter;

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Numeric json field that exchanges send either as a string or as a number.
pub fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parses a user supplied number, accepting `"1000"` as well as `1000`.
pub fn parse_f64(s: &str) -> Option<f64> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}
