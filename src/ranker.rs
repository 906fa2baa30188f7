use std::cmp::Ordering;

use crate::models::Opportunity;

/// Highest profit first. Equal percentages fall back to canonical pair, then
/// buy exchange, then sell exchange, so output order never depends on map
/// iteration.
pub fn compare(a: &Opportunity, b: &Opportunity) -> Ordering {
    b.profit_percent
        .total_cmp(&a.profit_percent)
        .then_with(|| a.canonical_pair.cmp(&b.canonical_pair))
        .then_with(|| a.buy_exchange.cmp(&b.buy_exchange))
        .then_with(|| a.sell_exchange.cmp(&b.sell_exchange))
}

pub fn rank(mut opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
    opportunities.sort_by(compare);
    opportunities
}
