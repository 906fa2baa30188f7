use crate::error::ValidationError;

/// Exclusive upper bound for any accepted price.
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Widest accepted bid/ask spread, as a fraction of the bid.
pub const MAX_SPREAD: f64 = 0.01;
/// Widest accepted gap between two exchanges, in percent of their midpoint.
pub const MAX_CROSS_EXCHANGE_DIFF_PERCENT: f64 = 3.0;

pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0 && price < MAX_PRICE
}

/// Gaps above 3% between venues are treated as stale data, not opportunity.
pub fn is_realistic_price_difference(p1: f64, p2: f64) -> bool {
    if !(is_valid_price(p1) && is_valid_price(p2)) {
        return false;
    }
    let avg = (p1 + p2) / 2.0;
    let diff_percent = (p1 - p2).abs() / avg * 100.0;
    diff_percent <= MAX_CROSS_EXCHANGE_DIFF_PERCENT
}

/// Checks a single top-of-book: both sides in range, not crossed, spread <= 1%.
pub fn check_book(bid: f64, ask: f64) -> Result<(), ValidationError> {
    if !is_valid_price(bid) {
        return Err(ValidationError::PriceOutOfRange(bid));
    }
    if !is_valid_price(ask) {
        return Err(ValidationError::PriceOutOfRange(ask));
    }
    if bid >= ask {
        return Err(ValidationError::Crossed { bid, ask });
    }
    let spread = (ask - bid) / bid;
    if spread > MAX_SPREAD {
        return Err(ValidationError::SpreadTooWide {
            spread_percent: spread * 100.0,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_bounds() {
        assert!(!is_valid_price(0.0));
        assert!(!is_valid_price(-1.0));
        assert!(is_valid_price(999_999.99));
        assert!(!is_valid_price(1_000_000.0));
        assert!(!is_valid_price(1_000_001.0));
        assert!(!is_valid_price(f64::NAN));
        assert!(!is_valid_price(f64::INFINITY));
    }

    #[test]
    fn spread_limit() {
        assert!(check_book(100.0, 100.5).is_ok());
        assert!(matches!(
            check_book(100.0, 102.0),
            Err(ValidationError::SpreadTooWide { .. })
        ));
        assert!(matches!(
            check_book(100.0, 100.0),
            Err(ValidationError::Crossed { .. })
        ));
        assert!(matches!(
            check_book(0.0, 1.0),
            Err(ValidationError::PriceOutOfRange(_))
        ));
    }

    #[test]
    fn cross_exchange_realism() {
        assert!(is_realistic_price_difference(100.0, 102.0));
        assert!(!is_realistic_price_difference(100.0, 110.0));
        assert!(!is_realistic_price_difference(0.0, 100.0));
    }
}
