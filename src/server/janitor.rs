use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::info;

use crate::{common::types::now_ms, party::PartyService};

/// Periodically drops parties nobody has touched within the idle timeout.
/// Returns `None` when eviction is disabled.
pub fn spawn_eviction(service: Arc<PartyService>) -> Option<JoinHandle<()>> {
    let config = service.config();
    if config.idle_timeout_ms == 0 {
        info!("Idle party eviction disabled");
        return None;
    }
    let every = Duration::from_millis(config.eviction_interval_ms.max(1_000));
    info!(
        "Evicting parties idle for {}s, checking every {}s",
        config.idle_timeout_ms / 1000,
        every.as_secs()
    );

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let evicted = service.evict_idle(now_ms());
            if !evicted.is_empty() {
                info!(
                    "Evicted {} idle parties ({} remaining)",
                    evicted.len(),
                    service.table().len()
                );
            }
        }
    }))
}
