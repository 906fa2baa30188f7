use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;

use direct_arb_scan::config::AppConfig;
use direct_arb_scan::cycle_manager::ScanService;
use direct_arb_scan::exchanges::AdapterRegistry;
use direct_arb_scan::routes::{self, AppState};
use direct_arb_scan::transport::HttpTransport;
use direct_arb_scan::utils::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let registry = AdapterRegistry::with_defaults();
    let config = Arc::new(AppConfig::from_env(&registry).context("invalid configuration")?);
    let transport = HttpTransport::new(config.fetch_timeout).context("http client")?;
    let service = Arc::new(ScanService::new(&config, registry, Arc::new(transport)));

    let exchanges: Vec<&str> = config.exchanges.iter().map(|e| e.name.as_str()).collect();
    tracing::info!("configured exchanges: {}", exchanges.join(", "));

    let app = routes::router(Arc::new(AppState {
        config: config.clone(),
        service,
    }));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
