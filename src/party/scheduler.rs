//! End-of-track timer. Each playing party owns one task that sleeps until the
//! current track runs out, then asks the service for the next one.

use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use super::{service::PartyService, table::Party};

/// Starts the playback loop for `party`, replacing any loop already running.
pub(crate) fn spawn(service: Arc<PartyService>, party: &Arc<Party>) {
    let handle = tokio::spawn(playback_loop(service, Arc::downgrade(party)));
    party.replace_playback_task(handle);
}

async fn playback_loop(service: Arc<PartyService>, party: Weak<Party>) {
    loop {
        // Only a weak reference is kept while sleeping so an evicted party drops.
        let playing = {
            let Some(party) = party.upgrade() else {
                break;
            };
            let state = party.state.lock().await;
            match state.current() {
                Some(playing) => playing.clone(),
                None => break,
            }
        };

        tokio::time::sleep_until(playing.ends_at()).await;

        let Some(party) = party.upgrade() else {
            break;
        };
        match service.advance(&party, &playing).await {
            Ok(Some(next)) => debug!(
                "[{}] track {} ended, now playing {}",
                party.code, playing.track.track_id, next.track.track_id
            ),
            Ok(None) => debug!(
                "[{}] track {} was already replaced",
                party.code, playing.track.track_id
            ),
            Err(e) => {
                warn!("[{}] playback stopped, next selection failed: {}", party.code, e);
                break;
            }
        }
    }
}
