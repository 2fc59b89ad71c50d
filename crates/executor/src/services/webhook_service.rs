use std::env;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use common::models::Notification;

/// Drains dispatcher notifications. Every notification is logged; when
/// NOTIFY_WEBHOOK_URL is set, it is also POSTed there as JSON,
/// fire-and-forget.
pub struct WebhookService {
    client: Client,
    url: Option<String>,
}

impl WebhookService {
    pub fn from_env() -> Self {
        let url = env::var("NOTIFY_WEBHOOK_URL").ok();
        let client = Client::builder()
            .user_agent("order-dispatch-bot/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client.");
        Self { client, url }
    }

    pub async fn start(self, mut rx: broadcast::Receiver<Notification>) {
        match &self.url {
            Some(url) => info!("Starting notification service (webhook: {})", url),
            None => info!("Starting notification service (log only)"),
        }

        loop {
            match rx.recv().await {
                Ok(notification) => {
                    info!(
                        "[{:?}] {}: {}",
                        notification.severity, notification.title, notification.description
                    );
                    if let Some(url) = &self.url {
                        if let Err(e) = self
                            .client
                            .post(url)
                            .json(&notification)
                            .send()
                            .await
                        {
                            error!("Failed to deliver webhook notification: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Notification service lagged: missed {} notifications", n);
                }
                Err(_) => {
                    info!("Notification channel closed. Stopping service.");
                    break;
                }
            }
        }
    }
}
