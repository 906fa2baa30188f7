use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::config::{AppConfig, ScanParams};
use crate::exchanges::AdapterRegistry;
use crate::models::{ExchangeHealth, Opportunity, Snapshot};
use crate::ranker::rank;
use crate::scanner::{scan, FeeSchedule};
use crate::transport::Transport;
use crate::utils::round2;

/// Everything one completed cycle produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub cycle_id: u64,
    /// When the fan-out for this cycle started.
    pub fetched_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub params: ScanParams,
    pub health: Vec<ExchangeHealth>,
    /// Ranked, before the view filter.
    pub opportunities: Vec<Opportunity>,
    #[serde(skip)]
    pub snapshot: Arc<Snapshot>,
}

impl CycleReport {
    /// Opportunities that pass this cycle's own view filter.
    pub fn visible(&self) -> Vec<Opportunity> {
        self.params.filter.apply(&self.opportunities)
    }
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Published(Arc<CycleReport>),
    /// A newer cycle finished first; `latest` is what callers should show.
    Superseded { stale_id: u64, latest: Arc<CycleReport> },
}

impl CycleOutcome {
    pub fn report(&self) -> &Arc<CycleReport> {
        match self {
            CycleOutcome::Published(r) => r,
            CycleOutcome::Superseded { latest, .. } => latest,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, CycleOutcome::Superseded { .. })
    }
}

/// Hands out cycle ids at dispatch and keeps only the newest completed cycle.
#[derive(Debug, Default)]
pub struct CycleCoordinator {
    next_id: AtomicU64,
    latest: RwLock<Option<Arc<CycleReport>>>,
}

impl CycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic, starts at 1.
    pub fn begin(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Stores `report` unless an equal or newer cycle is already published.
    pub async fn publish(&self, report: CycleReport) -> CycleOutcome {
        let mut guard = self.latest.write().await;
        if let Some(current) = guard.as_ref() {
            if current.cycle_id >= report.cycle_id {
                warn!(
                    "cycle {} finished after cycle {}, discarding",
                    report.cycle_id, current.cycle_id
                );
                return CycleOutcome::Superseded {
                    stale_id: report.cycle_id,
                    latest: current.clone(),
                };
            }
        }
        let report = Arc::new(report);
        *guard = Some(report.clone());
        CycleOutcome::Published(report)
    }

    pub async fn latest(&self) -> Option<Arc<CycleReport>> {
        self.latest.read().await.clone()
    }
}

/// Pure core of a cycle: snapshot in, ranked opportunities out.
pub fn evaluate<S: AsRef<str>>(
    snapshot: &Snapshot,
    fees: &FeeSchedule,
    investment: f64,
    quote_currencies: &[S],
) -> Vec<Opportunity> {
    rank(scan(snapshot, fees, investment, quote_currencies))
}

/// Fetch -> adapt -> scan -> rank, guarded by the coordinator.
pub struct ScanService {
    aggregator: Aggregator,
    coordinator: CycleCoordinator,
    fees: FeeSchedule,
    quote_currencies: Vec<String>,
}

impl ScanService {
    pub fn new(
        config: &AppConfig,
        registry: AdapterRegistry,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(
                config.exchanges.clone(),
                registry,
                transport,
                config.fetch_timeout,
            ),
            coordinator: CycleCoordinator::new(),
            fees: FeeSchedule::from_configs(&config.exchanges),
            quote_currencies: config.quote_currencies.clone(),
        }
    }

    pub async fn run_cycle(&self, params: ScanParams) -> CycleOutcome {
        let cycle_id = self.coordinator.begin();
        info!("cycle {}: fetching {} exchanges", cycle_id, self.aggregator.exchanges().len());

        let out = self.aggregator.collect(cycle_id).await;
        let opportunities = evaluate(
            &out.snapshot,
            &self.fees,
            params.investment,
            self.quote_currencies.as_slice(),
        );

        if let Some(best) = opportunities.first() {
            info!(
                "cycle {}: {} opportunities, best {} ({} -> {}) {}%",
                cycle_id,
                opportunities.len(),
                best.pair,
                best.buy_exchange,
                best.sell_exchange,
                round2(best.profit_percent)
            );
        } else {
            info!("cycle {}: no profitable opportunities", cycle_id);
        }

        let report = CycleReport {
            cycle_id,
            fetched_at: out.snapshot.fetched_at,
            completed_at: Utc::now(),
            params,
            health: out.health,
            opportunities,
            snapshot: Arc::new(out.snapshot),
        };
        self.coordinator.publish(report).await
    }

    pub async fn latest(&self) -> Option<Arc<CycleReport>> {
        self.coordinator.latest().await
    }
}
