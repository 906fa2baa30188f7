/// Quote currencies recognised when splitting a canonical pair, in priority order.
pub const DEFAULT_QUOTE_CURRENCIES: [&str; 11] = [
    "USDT", "USDC", "BUSD", "DAI", "TUSD", "USDP", "USDD", "FDUSD", "PYUSD", "EURC", "EUROC",
];

const ANCHOR: &str = "USDT";

/// Canonical pair key shared by every exchange, e.g. `btc-usdt` -> `BTCUSDT`.
pub fn normalize(raw: &str) -> String {
    let pair: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | '/'))
        .collect();

    if pair.contains(ANCHOR) && !pair.ends_with(ANCHOR) {
        return format!("{}{}", pair.replace(ANCHOR, ""), ANCHOR);
    }
    pair
}

/// Splits a canonical pair into `BASE/QUOTE` using the first matching suffix.
/// Returns the pair unchanged when nothing matches.
pub fn display_split<S: AsRef<str>>(pair: &str, quote_currencies: &[S]) -> String {
    for quote in quote_currencies {
        let quote = quote.as_ref();
        if pair.len() > quote.len() && pair.ends_with(quote) {
            let base = &pair[..pair.len() - quote.len()];
            return format!("{}/{}", base, quote);
        }
    }
    pair.to_string()
}
