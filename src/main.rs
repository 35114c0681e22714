use omen::config::Config;
use omen::services::{SignalService, TickPoller, TickStore};
use omen::sources::BinanceClient;
use omen::{api, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omen=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Omen server on {}:{}", config.host, config.port);

    let binance = Arc::new(BinanceClient::new(
        config.binance_api_url.clone(),
        config.binance_api_key.clone(),
        config.fetch_retries,
        config.retry_delay(),
    ));

    // Sub-minute candles are only built while tick polling is enabled
    let ticks = config.tick_poll_interval().map(|interval| {
        let store = TickStore::new(config.sub_minute_bucket_secs, config.sub_minute_max_candles);
        let poller = TickPoller::new(
            binance.clone(),
            store.clone(),
            config.tracked_symbols.clone(),
            interval,
        );
        tokio::spawn(async move {
            poller.start_polling().await;
        });
        store
    });
    if ticks.is_none() {
        info!("Tick polling disabled, sub-minute signals will be omitted");
    }

    let service = Arc::new(SignalService::from_config(&config, binance, ticks));

    // Periodically drop stale cached analyses
    {
        let service = service.clone();
        let interval = config.cache_ttl().max(Duration::from_secs(1)) * 30;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                service.evict_stale();
            }
        });
    }

    let state = AppState {
        config: config.clone(),
        service,
    };

    let app = api::app(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Omen server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
