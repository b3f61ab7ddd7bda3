//! Background job: hourly visibility sweep over expired share links.
//!
//! Tokens are never deleted or mutated on expiry — the validator checks
//! `expires_at` at lookup time. This job only logs how many links crossed
//! their expiry in the last window so dashboards and ops can see churn.

use std::time::Duration;

use tokio::time;

use crate::store::postgres::PgStore;

const SWEEP_WINDOW_HOURS: i32 = 1;

/// Spawn the sweep task. Call this once at startup.
pub fn spawn(store: PgStore) {
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(3600)); // every hour
        loop {
            interval.tick().await;
            if let Err(e) = sweep(&store).await {
                tracing::error!("expiry sweep failed: {}", e);
            }
        }
    });
}

async fn sweep(store: &PgStore) -> anyhow::Result<()> {
    let expired = store.count_newly_expired_tokens(SWEEP_WINDOW_HOURS).await?;
    if expired > 0 {
        tracing::info!(count = expired, "share links expired in the last hour");
    }
    Ok(())
}
