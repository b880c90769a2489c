use std::sync::Arc;

use tracing::{error, info};

use super::{
    PartyError, scheduler,
    selection::{self, SelectionParams},
    state::{PartyState, PlayingTrack},
    table::{Party, PartyTable},
};
use crate::{
    catalog::Catalog,
    common::types::{PartyCode, SessionId, now_ms},
    configs::PartyConfig,
    store::{Vote, VoteStore, VoteTally, VoteType},
};

/// Entry point for everything the API does to a party.
pub struct PartyService {
    catalog: Arc<Catalog>,
    store: Arc<dyn VoteStore>,
    table: PartyTable,
    config: PartyConfig,
}

impl PartyService {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn VoteStore>, config: PartyConfig) -> Self {
        Self {
            catalog,
            store,
            table: PartyTable::new(config.history_len),
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn table(&self) -> &PartyTable {
        &self.table
    }

    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    /// The party's current track, selecting one and starting playback if
    /// nothing is playing yet.
    pub async fn current_track(self: &Arc<Self>, code: &PartyCode) -> Result<PlayingTrack, PartyError> {
        let party = self.table.get_or_create(code, now_ms());
        let mut state = party.state.lock().await;
        if let Some(playing) = state.current() {
            return Ok(playing.clone());
        }

        let playing = self.select_locked(&party.code, &mut state).await?;
        scheduler::spawn(self.clone(), &party);
        Ok(playing)
    }

    /// Replaces whatever is playing with a fresh selection and rearms playback.
    pub async fn pick_next(self: &Arc<Self>, code: &PartyCode) -> Result<PlayingTrack, PartyError> {
        let party = self.table.get_or_create(code, now_ms());
        let mut state = party.state.lock().await;
        state.clear_current();

        let playing = self.select_locked(&party.code, &mut state).await?;
        scheduler::spawn(self.clone(), &party);
        Ok(playing)
    }

    /// Moves past `finished` if it is still the party's current track.
    /// Returns `None` when something else already replaced it.
    pub(crate) async fn advance(
        &self,
        party: &Party,
        finished: &PlayingTrack,
    ) -> Result<Option<PlayingTrack>, PartyError> {
        let mut state = party.state.lock().await;
        if state.current() != Some(finished) {
            return Ok(None);
        }
        state.clear_current();

        self.select_locked(&party.code, &mut state).await.map(Some)
    }

    /// Runs the selection engine and records the result. The caller holds the
    /// party lock for the whole call.
    async fn select_locked(
        &self,
        code: &PartyCode,
        state: &mut PartyState,
    ) -> Result<PlayingTrack, PartyError> {
        let scores = self.store.net_scores(code).await.map_err(|e| {
            error!("[{}] failed to load vote scores: {}", code, e);
            e
        })?;

        let (track, score, kind) = {
            let mut rng = rand::thread_rng();
            let selection = selection::choose(
                &self.catalog,
                &scores,
                state.history(),
                SelectionParams::from(&self.config),
                &mut rng,
            )
            .ok_or(PartyError::NoCandidates)?;
            (selection.track.clone(), selection.score, selection.kind)
        };

        state.push_history(track.track_id);
        let playing = PlayingTrack::start(track, now_ms());
        state.set_current(playing.clone());

        info!(
            "[{}] now playing {} \"{}\" by {} [{}] (score {}, {:?})",
            code,
            playing.track.track_id,
            playing.track.title,
            playing.track.artist,
            playing.track.category(),
            score,
            kind
        );
        Ok(playing)
    }

    /// The current track without triggering a selection.
    pub async fn playing(&self, code: &PartyCode) -> Option<PlayingTrack> {
        self.table.get(code)?.mark_active(now_ms());
        self.table.current_track(code).await
    }

    /// Up and down votes on the current track; zeros when nothing plays.
    pub async fn votes(&self, code: &PartyCode) -> Result<VoteTally, PartyError> {
        let Some(playing) = self.playing(code).await else {
            return Ok(VoteTally::default());
        };
        self.store
            .tally(code, playing.track.track_id)
            .await
            .map_err(|e| {
                error!("[{}] failed to tally votes: {}", code, e);
                e.into()
            })
    }

    pub async fn my_vote(
        &self,
        code: &PartyCode,
        session: &SessionId,
    ) -> Result<Option<VoteType>, PartyError> {
        let Some(playing) = self.playing(code).await else {
            return Ok(None);
        };
        self.store
            .session_vote(code, playing.track.track_id, session)
            .await
            .map_err(|e| {
                error!("[{}] failed to read vote of {}: {}", code, session, e);
                e.into()
            })
    }

    /// Records a vote on the current track.
    pub async fn vote(
        &self,
        code: &PartyCode,
        vote: Option<&str>,
        session: Option<&str>,
    ) -> Result<(), PartyError> {
        let vote_type = vote.and_then(VoteType::parse).ok_or_else(|| {
            PartyError::Validation("vote must be \"up\" or \"down\"".to_string())
        })?;
        let session = parse_session(session)?;

        let playing = self
            .playing(code)
            .await
            .ok_or_else(|| PartyError::NotFound("No track is currently playing".to_string()))?;

        let track_id = playing.track.track_id;
        self.store
            .cast_vote(Vote {
                party_code: code.clone(),
                track_id,
                session_id: session.clone(),
                vote_type,
                voted_at: now_ms(),
            })
            .await
            .map_err(|e| {
                error!("[{}] failed to store vote: {}", code, e);
                PartyError::from(e)
            })?;

        tracing::debug!("[{}] {} voted {} on {}", code, session, vote_type.as_str(), track_id);
        Ok(())
    }

    pub fn heartbeat(&self, code: &PartyCode, session: Option<&str>) -> Result<(), PartyError> {
        let session = parse_session(session)?;
        self.table.touch_member(code, session, now_ms());
        Ok(())
    }

    pub fn member_count(&self, code: &PartyCode) -> usize {
        let now = now_ms();
        if let Some(party) = self.table.get(code) {
            party.mark_active(now);
        }
        self.table
            .sweep_and_count_members(code, now, self.config.member_timeout_ms)
    }

    /// Drops idle parties. A zero idle timeout disables eviction.
    pub fn evict_idle(&self, now: u64) -> Vec<PartyCode> {
        if self.config.idle_timeout_ms == 0 {
            return Vec::new();
        }
        self.table.evict_idle(now, self.config.idle_timeout_ms)
    }
}

fn parse_session(session: Option<&str>) -> Result<SessionId, PartyError> {
    session
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SessionId::from)
        .ok_or_else(|| PartyError::Validation("sessionId is required".to_string()))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        catalog::Track,
        common::types::TrackId,
        store::{MemoryVoteStore, StoreError},
    };

    fn track(id: TrackId, artist: &str, duration: u64) -> Track {
        Track {
            track_id: id,
            title: format!("Track {}", id),
            artist: artist.to_string(),
            duration,
        }
    }

    fn big_catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(
                (0..8)
                    .map(|i| track(1000 * (i % 6 + 1) + i, &format!("artist{}", i), 60_000))
                    .collect(),
            )
            .unwrap(),
        )
    }

    fn service_with(catalog: Arc<Catalog>, store: Arc<dyn VoteStore>) -> Arc<PartyService> {
        Arc::new(PartyService::new(catalog, store, PartyConfig::default()))
    }

    struct FailingStore;

    #[async_trait]
    impl VoteStore for FailingStore {
        async fn cast_vote(&self, _vote: Vote) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn net_scores(&self, _party: &PartyCode) -> Result<HashMap<TrackId, i64>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn tally(&self, _party: &PartyCode, _track_id: TrackId) -> Result<VoteTally, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn session_vote(
            &self,
            _party: &PartyCode,
            _track_id: TrackId,
            _session: &SessionId,
        ) -> Result<Option<VoteType>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    /// Memory store whose score query can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryVoteStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl VoteStore for FlakyStore {
        async fn cast_vote(&self, vote: Vote) -> Result<(), StoreError> {
            self.inner.cast_vote(vote).await
        }

        async fn net_scores(&self, party: &PartyCode) -> Result<HashMap<TrackId, i64>, StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inner.net_scores(party).await
        }

        async fn tally(&self, party: &PartyCode, track_id: TrackId) -> Result<VoteTally, StoreError> {
            self.inner.tally(party, track_id).await
        }

        async fn session_vote(
            &self,
            party: &PartyCode,
            track_id: TrackId,
            session: &SessionId,
        ) -> Result<Option<VoteType>, StoreError> {
            self.inner.session_vote(party, track_id, session).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn current_track_is_stable_until_it_ends() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("IDEM");

        let first = service.current_track(&code).await.unwrap();
        let second = service.current_track(&code).await.unwrap();

        assert_eq!(first.track.track_id, second.track.track_id);
        assert_eq!(first.started_at, second.started_at);
        assert_eq!(service.table().history(&code).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_reads_select_once() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("RACE");

        let reads: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                let code = code.clone();
                tokio::spawn(async move { service.current_track(&code).await.unwrap() })
            })
            .collect();

        let mut ids = Vec::new();
        for read in reads {
            ids.push(read.await.unwrap().track.track_id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(service.table().history(&code).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn playback_advances_when_track_ends() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("AUTO");

        let first = service.current_track(&code).await.unwrap();
        tokio::time::sleep(Duration::from_millis(first.track.duration + 10)).await;

        let second = service.playing(&code).await.unwrap();
        assert_ne!(first.track.track_id, second.track.track_id);

        tokio::time::sleep(Duration::from_millis(second.track.duration + 10)).await;
        let history = service.table().history(&code).await;
        assert_eq!(history.len(), 3);
        assert_eq!(&history[..2], &[first.track.track_id, second.track.track_id]);
    }

    #[tokio::test(start_paused = true)]
    async fn history_never_exceeds_five() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("LONG");

        for _ in 0..12 {
            let playing = service.pick_next(&code).await.unwrap();
            let history = service.table().history(&code).await;
            assert!(history.len() <= 5);
            assert_eq!(history.last(), Some(&playing.track.track_id));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn liked_artist_wins_next_selection() {
        let catalog = Arc::new(
            Catalog::new(vec![
                track(1001, "X", 1000),
                track(2001, "Y", 1000),
                track(2002, "X", 1000),
            ])
            .unwrap(),
        );
        let store = Arc::new(MemoryVoteStore::new());
        let service = service_with(catalog, store.clone());
        let code = PartyCode::from("SCEN");

        service.table().append_history(&code, 1001, now_ms()).await;
        service
            .table()
            .set_current_track(&code, PlayingTrack::start(track(1001, "X", 1000), now_ms()), now_ms())
            .await;
        service.vote(&code, Some("up"), Some("s1")).await.unwrap();

        let next = service.pick_next(&code).await.unwrap();
        assert_eq!(next.track.track_id, 2002);
    }

    #[tokio::test(start_paused = true)]
    async fn vote_upsert_keeps_latest() {
        let store = Arc::new(MemoryVoteStore::new());
        let service = service_with(big_catalog(), store.clone());
        let code = PartyCode::from("UPSERT");
        let playing = service.current_track(&code).await.unwrap();

        service.vote(&code, Some("up"), Some("s1")).await.unwrap();
        service.vote(&code, Some("down"), Some("s1")).await.unwrap();

        let rows = store.rows(&code);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vote_type, VoteType::Down);
        assert_eq!(rows[0].track_id, playing.track.track_id);

        let tally = service.votes(&code).await.unwrap();
        assert_eq!(tally, VoteTally { upvotes: 0, downvotes: 1 });
        assert_eq!(
            service.my_vote(&code, &"s1".into()).await.unwrap(),
            Some(VoteType::Down)
        );
    }

    #[tokio::test]
    async fn vote_validation_precedes_state_checks() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("VAL");

        assert!(matches!(
            service.vote(&code, Some("meh"), Some("s1")).await,
            Err(PartyError::Validation(_))
        ));
        assert!(matches!(
            service.vote(&code, Some("up"), Some("  ")).await,
            Err(PartyError::Validation(_))
        ));
        assert!(matches!(
            service.vote(&code, None, Some("s1")).await,
            Err(PartyError::Validation(_))
        ));
        assert!(matches!(
            service.vote(&code, Some("up"), Some("s1")).await,
            Err(PartyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reads_without_current_track_are_empty() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("QUIET");

        assert_eq!(service.votes(&code).await.unwrap(), VoteTally::default());
        assert_eq!(service.my_vote(&code, &"s".into()).await.unwrap(), None);
        assert!(service.table().is_empty());
    }

    #[tokio::test]
    async fn store_failure_surfaces_from_selection() {
        let service = service_with(big_catalog(), Arc::new(FailingStore));
        let code = PartyCode::from("FAIL");

        let result = service.current_track(&code).await;
        assert!(matches!(result, Err(PartyError::Store(_))));
        assert!(service.playing(&code).await.is_none());
        assert!(service.table().history(&code).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reselection_idles_party_until_next_read() {
        let store = Arc::new(FlakyStore::default());
        let service = service_with(big_catalog(), store.clone());
        let code = PartyCode::from("FLAKY");

        let first = service.current_track(&code).await.unwrap();
        let party = service.table().get(&code).unwrap();
        assert!(party.is_playback_running());

        store.set_failing(true);
        tokio::time::sleep(Duration::from_millis(first.track.duration + 10)).await;
        for _ in 0..10 {
            if !party.is_playback_running() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(service.playing(&code).await.is_none());
        assert!(!party.is_playback_running());

        store.set_failing(false);
        let restarted = service.current_track(&code).await.unwrap();
        assert_ne!(restarted.track.track_id, first.track.track_id);
        assert!(party.is_playback_running());
        assert_eq!(service.playing(&code).await, Some(restarted));
    }

    #[tokio::test(start_paused = true)]
    async fn advance_ignores_track_that_was_already_replaced() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("SKIP");

        let first = service.current_track(&code).await.unwrap();
        let second = service.pick_next(&code).await.unwrap();
        let party = service.table().get(&code).unwrap();

        let advanced = service.advance(&party, &first).await.unwrap();
        assert!(advanced.is_none());
        assert_eq!(service.playing(&code).await, Some(second));
        assert_eq!(service.table().history(&code).await.len(), 2);
    }

    #[test]
    fn heartbeat_requires_session() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("BEAT");

        assert!(matches!(
            service.heartbeat(&code, None),
            Err(PartyError::Validation(_))
        ));
        service.heartbeat(&code, Some("A")).unwrap();
        service.heartbeat(&code, Some("B")).unwrap();
        assert_eq!(service.member_count(&code), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn eviction_stops_playback() {
        let service = service_with(big_catalog(), Arc::new(MemoryVoteStore::new()));
        let code = PartyCode::from("GONE");
        service.current_track(&code).await.unwrap();
        let party = service.table().get(&code).unwrap();
        assert!(party.is_playback_running());

        let later = party.last_activity() + service.config().idle_timeout_ms;
        let evicted = service.evict_idle(later);
        assert_eq!(evicted, vec![code.clone()]);
        assert!(!party.is_playback_running());
        assert!(service.table().get(&code).is_none());
    }
}
