use futures_util::future::{join_all, try_join_all};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{timeout, Duration, Instant};
use tracing::{info, warn};

use crate::error::TransportError;
use crate::exchanges::{AdapterRegistry, QuoteAdapter};
use crate::models::{ExchangeConfig, ExchangeHealth, FetchStatus, QuoteBook, Snapshot};
use crate::transport::Transport;

/// Result of one fetch cycle before scanning.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub snapshot: Snapshot,
    /// One entry per configured exchange, in configuration order.
    pub health: Vec<ExchangeHealth>,
}

/// Fans out one fetch task per exchange and assembles the snapshot.
pub struct Aggregator {
    exchanges: Vec<ExchangeConfig>,
    registry: AdapterRegistry,
    transport: Arc<dyn Transport>,
    fetch_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        exchanges: Vec<ExchangeConfig>,
        registry: AdapterRegistry,
        transport: Arc<dyn Transport>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            exchanges,
            registry,
            transport,
            fetch_timeout,
        }
    }

    pub fn exchanges(&self) -> &[ExchangeConfig] {
        &self.exchanges
    }

    /// Runs one cycle. Never fails: an exchange that cannot be fetched or
    /// parsed contributes an empty book and a failed health entry.
    pub async fn collect(&self, cycle_id: u64) -> CycleOutput {
        let handles: Vec<_> = self
            .exchanges
            .iter()
            .map(|cfg| {
                let cfg = cfg.clone();
                let adapter = self.registry.get(&cfg.name);
                let transport = self.transport.clone();
                let limit = self.fetch_timeout;
                tokio::spawn(async move { collect_exchange(cfg, adapter, transport, limit).await })
            })
            .collect();

        let joined = join_all(handles).await;

        // single writer: only this loop touches the snapshot
        let mut snapshot = Snapshot::new(cycle_id);
        let mut health = Vec::with_capacity(self.exchanges.len());
        for (cfg, res) in self.exchanges.iter().zip(joined) {
            let (book, h) = match res {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("{}: fetch task aborted: {}", cfg.name, e);
                    (QuoteBook::new(), ExchangeHealth::failed(&cfg.name, e.to_string(), 0))
                }
            };
            snapshot.insert_exchange(&cfg.name, book);
            health.push(h);
        }

        info!(
            "cycle {}: {} quotes from {}/{} exchanges",
            cycle_id,
            snapshot.quote_count(),
            health.iter().filter(|h| h.is_ok()).count(),
            health.len()
        );
        CycleOutput { snapshot, health }
    }
}

async fn fetch_payloads(
    cfg: &ExchangeConfig,
    transport: &dyn Transport,
) -> Result<Vec<Value>, TransportError> {
    try_join_all(cfg.endpoints().into_iter().map(|url| transport.fetch(url))).await
}

async fn collect_exchange(
    cfg: ExchangeConfig,
    adapter: Option<Arc<dyn QuoteAdapter>>,
    transport: Arc<dyn Transport>,
    limit: Duration,
) -> (QuoteBook, ExchangeHealth) {
    let started = Instant::now();
    let elapsed_ms = || started.elapsed().as_millis() as u64;

    let Some(adapter) = adapter else {
        warn!("{}: no adapter registered", cfg.name);
        return (
            QuoteBook::new(),
            ExchangeHealth::failed(&cfg.name, "no adapter registered".to_string(), 0),
        );
    };

    let payloads = match timeout(limit, fetch_payloads(&cfg, transport.as_ref())).await {
        Ok(Ok(p)) => p,
        Ok(Err(e)) => {
            warn!("{}: transport error: {}", cfg.name, e);
            let health = ExchangeHealth::failed(&cfg.name, e.to_string(), elapsed_ms());
            return (QuoteBook::new(), health);
        }
        Err(_) => {
            let e = TransportError::Timeout {
                url: cfg.endpoint.clone(),
                secs: limit.as_secs(),
            };
            warn!("{}: {}", cfg.name, e);
            let health = ExchangeHealth::failed(&cfg.name, e.to_string(), elapsed_ms());
            return (QuoteBook::new(), health);
        }
    };

    match adapter.parse(&cfg.name, &payloads) {
        Ok(batch) => {
            info!(
                "found {} valid pairs on {} ({} malformed, {} rejected)",
                batch.len(),
                cfg.name,
                batch.parse_skipped,
                batch.validation_skipped
            );
            let health = ExchangeHealth {
                exchange: cfg.name.clone(),
                quote_count: batch.len(),
                status: FetchStatus::Ok,
                error: None,
                parse_skipped: batch.parse_skipped,
                validation_skipped: batch.validation_skipped,
                elapsed_ms: elapsed_ms(),
            };
            (batch.quotes, health)
        }
        Err(e) => {
            warn!("{}: unusable payload: {}", cfg.name, e);
            (QuoteBook::new(), ExchangeHealth::failed(&cfg.name, e.to_string(), elapsed_ms()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapTransport(HashMap<String, Value>);

    #[async_trait]
    impl Transport for MapTransport {
        async fn fetch(&self, url: &str) -> Result<Value, TransportError> {
            self.0.get(url).cloned().ok_or(TransportError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    struct StallTransport;

    #[async_trait]
    impl Transport for StallTransport {
        async fn fetch(&self, _url: &str) -> Result<Value, TransportError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(json!([]))
        }
    }

    fn configs() -> Vec<ExchangeConfig> {
        vec![
            ExchangeConfig::new("Binance", "http://b.test/book", 0.1),
            ExchangeConfig::new("OKX", "http://o.test/tickers", 0.1),
        ]
    }

    #[tokio::test]
    async fn failed_exchange_yields_empty_book() {
        let mut payloads = HashMap::new();
        payloads.insert(
            "http://b.test/book".to_string(),
            json!([{"symbol": "BTCUSDT", "bidPrice": "100", "askPrice": "100.1"}]),
        );
        let agg = Aggregator::new(
            configs(),
            AdapterRegistry::with_defaults(),
            Arc::new(MapTransport(payloads)),
            Duration::from_secs(5),
        );
        let out = agg.collect(7).await;

        assert_eq!(out.snapshot.cycle_id, 7);
        assert_eq!(out.snapshot.quotes["Binance"].len(), 1);
        assert!(out.snapshot.quotes["OKX"].is_empty());
        assert_eq!(out.health[0].status, FetchStatus::Ok);
        assert_eq!(out.health[0].quote_count, 1);
        assert_eq!(out.health[1].status, FetchStatus::Failed);
        assert_eq!(out.health[1].quote_count, 0);
    }

    #[tokio::test]
    async fn unparseable_payload_marks_failure() {
        let mut payloads = HashMap::new();
        payloads.insert("http://b.test/book".to_string(), json!({"msg": "maintenance"}));
        payloads.insert("http://o.test/tickers".to_string(), json!({"data": []}));
        let agg = Aggregator::new(
            configs(),
            AdapterRegistry::with_defaults(),
            Arc::new(MapTransport(payloads)),
            Duration::from_secs(5),
        );
        let out = agg.collect(1).await;
        assert_eq!(out.health[0].status, FetchStatus::Failed);
        assert!(out.health[0].error.is_some());
        assert_eq!(out.health[1].status, FetchStatus::Ok);
    }

    #[tokio::test]
    async fn slow_exchange_times_out() {
        let agg = Aggregator::new(
            configs(),
            AdapterRegistry::with_defaults(),
            Arc::new(StallTransport),
            Duration::from_millis(50),
        );
        let out = agg.collect(1).await;
        assert!(out.health.iter().all(|h| h.status == FetchStatus::Failed));
        assert_eq!(out.snapshot.quote_count(), 0);
    }

    #[tokio::test]
    async fn stalled_exchanges_time_out_in_parallel() {
        let exchanges: Vec<_> = crate::exchanges::default_adapters()
            .iter()
            .map(|a| a.default_config())
            .collect();
        let n = exchanges.len() as u32;
        let limit = Duration::from_millis(200);
        let agg = Aggregator::new(
            exchanges,
            AdapterRegistry::with_defaults(),
            Arc::new(StallTransport),
            limit,
        );

        let started = Instant::now();
        let out = agg.collect(1).await;
        let elapsed = started.elapsed();

        assert_eq!(out.health.len(), n as usize);
        assert!(out.health.iter().all(|h| h.status == FetchStatus::Failed));
        // sequential fetching would need n * limit
        assert!(elapsed < limit * 3, "took {:?} for {} exchanges", elapsed, n);
        assert!(elapsed < limit * n);
    }

    #[tokio::test]
    async fn unknown_exchange_has_no_adapter() {
        let agg = Aggregator::new(
            vec![ExchangeConfig::new("Kraken", "http://k.test", 0.26)],
            AdapterRegistry::with_defaults(),
            Arc::new(MapTransport(HashMap::new())),
            Duration::from_secs(1),
        );
        let out = agg.collect(1).await;
        assert_eq!(out.health[0].error.as_deref(), Some("no adapter registered"));
    }
}
