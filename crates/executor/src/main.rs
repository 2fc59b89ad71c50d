use std::sync::Arc;

use dotenvy::dotenv;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use broker::{AlpacaClient, BrokerClient};
use common::logger;
use common::models::Notification;
use engine::{DispatchConfig, OrderDispatcher};
use strategy::CombinedEvaluator;

mod services;

use services::webhook_service::WebhookService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();
    dotenv().ok();
    debug!("Dispatcher starting up...");

    let config = DispatchConfig::from_env();
    info!(
        symbols = ?config.watchlist,
        interval = ?config.cycle_interval,
        max_open_positions = config.max_open_positions,
        "startup config"
    );

    let client = Arc::new(AlpacaClient::from_env()?);

    // Log the account once at startup to prove connectivity.
    match client.get_account().await {
        Ok(account) => info!(
            "Broker account connected. Buying power: {:.2} {}",
            account.buying_power, account.currency
        ),
        Err(e) => error!("Failed to fetch account info: {}", e),
    }

    let (notify_tx, notify_rx) = broadcast::channel::<Notification>(256);
    tokio::spawn(WebhookService::from_env().start(notify_rx));

    let evaluator = Arc::new(CombinedEvaluator::new());
    let dispatcher =
        OrderDispatcher::new(client, evaluator, config).with_notifier(notify_tx);

    dispatcher.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");
    dispatcher.stop();

    Ok(())
}
