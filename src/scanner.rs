use std::collections::{BTreeMap, HashMap};

use crate::models::{ExchangeConfig, Opportunity, Snapshot};
use crate::pairs::display_split;
use crate::validator::is_realistic_price_difference;

/// Fee applied to exchanges missing from the schedule, in percent.
pub const DEFAULT_FEE_PERCENT: f64 = 0.1;
/// Profits above this are assumed to come from stale quotes.
pub const MAX_PROFIT_PERCENT: f64 = 3.0;

/// Taker fee per exchange, in percent.
#[derive(Debug, Clone, Default)]
pub struct FeeSchedule {
    fees: HashMap<String, f64>,
}

impl FeeSchedule {
    pub fn from_configs(configs: &[ExchangeConfig]) -> Self {
        Self {
            fees: configs
                .iter()
                .map(|c| (c.name.clone(), c.fee_percent))
                .collect(),
        }
    }

    pub fn fee_percent(&self, exchange: &str) -> f64 {
        self.fees.get(exchange).copied().unwrap_or(DEFAULT_FEE_PERCENT)
    }
}

/// Money flow of buying with `investment` on one venue and selling on another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitBreakdown {
    pub buy_amount: f64,
    pub coins_bought: f64,
    pub sell_amount: f64,
    pub profit_amount: f64,
    pub profit_percent: f64,
}

/// Fees are fractions here (0.001 == 0.1%).
pub fn compute_profit(
    investment: f64,
    buy_price: f64,
    sell_price: f64,
    buy_fee: f64,
    sell_fee: f64,
) -> ProfitBreakdown {
    let buy_amount = investment * (1.0 + buy_fee);
    let coins_bought = (investment / buy_price) * (1.0 - buy_fee);
    let sell_amount = coins_bought * sell_price * (1.0 - sell_fee);
    let profit_amount = sell_amount - buy_amount;
    let profit_percent = profit_amount / buy_amount * 100.0;
    ProfitBreakdown {
        buy_amount,
        coins_bought,
        sell_amount,
        profit_amount,
        profit_percent,
    }
}

/// Canonical pairs quoted by at least two exchanges, with those exchanges.
pub fn multi_exchange_pairs(snapshot: &Snapshot) -> BTreeMap<&str, Vec<&str>> {
    let mut holders: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (exchange, book) in &snapshot.quotes {
        for pair in book.keys() {
            holders.entry(pair.as_str()).or_default().push(exchange.as_str());
        }
    }
    holders.retain(|_, exchanges| exchanges.len() >= 2);
    holders
}

/// Every directed (buy, sell) exchange combination per shared pair, kept when
/// `0 < profit% <= 3`. Unsorted; see `ranker::rank`.
pub fn scan<S: AsRef<str>>(
    snapshot: &Snapshot,
    fees: &FeeSchedule,
    investment: f64,
    quote_currencies: &[S],
) -> Vec<Opportunity> {
    let mut out = Vec::new();

    for (pair, exchanges) in multi_exchange_pairs(snapshot) {
        for &buy_exchange in &exchanges {
            let Some(buy) = snapshot.quote(buy_exchange, pair) else {
                continue;
            };

            for &sell_exchange in &exchanges {
                if buy_exchange == sell_exchange {
                    continue;
                }
                let Some(sell) = snapshot.quote(sell_exchange, pair) else {
                    continue;
                };

                let buy_price = buy.ask;
                let sell_price = sell.bid;
                if !is_realistic_price_difference(buy_price, sell_price) {
                    continue;
                }

                let buy_fee = fees.fee_percent(buy_exchange) / 100.0;
                let sell_fee = fees.fee_percent(sell_exchange) / 100.0;
                let p = compute_profit(investment, buy_price, sell_price, buy_fee, sell_fee);

                if !(p.profit_percent > 0.0 && p.profit_percent <= MAX_PROFIT_PERCENT) {
                    continue;
                }

                out.push(Opportunity {
                    pair: display_split(pair, quote_currencies),
                    canonical_pair: pair.to_string(),
                    buy_exchange: buy_exchange.to_string(),
                    sell_exchange: sell_exchange.to_string(),
                    buy_price,
                    sell_price,
                    profit_percent: p.profit_percent,
                    profit_amount: p.profit_amount,
                    investment,
                    buy_fee_percent: buy_fee * 100.0,
                    sell_fee_percent: sell_fee * 100.0,
                    coins_bought: p.coins_bought,
                    final_amount: p.sell_amount,
                    original_buy_symbol: buy.original_symbol.clone(),
                    original_sell_symbol: sell.original_symbol.clone(),
                });
            }
        }
    }

    out
}
