use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::{mpsc, watch};

use scrimboard_channels::{
    BoardArtifact, ChannelError, MessageHandle, NotificationChannel, RenderedBoard,
};
use scrimboard_core::{BoardRefresh, Scrim, ScrimDraft};
use scrimboard_scheduler::{BoardRenderer, Reconciler, ReminderEngine, SchedulerError};
use scrimboard_store::{EventSource, ScrimStore, StoreError};

// ── fakes ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorded {
    next_id: u64,
    sent: Vec<(MessageHandle, String)>,
    deleted: Vec<MessageHandle>,
    boards: HashMap<String, RenderedBoard>,
    creates: usize,
    fail_sends: usize,
    /// Sends whose text starts with this name fail.
    fail_sends_for: Option<String>,
    fail_deletes: bool,
    fail_fetch: bool,
}

#[derive(Default)]
struct FakeChannel {
    rec: Mutex<Recorded>,
}

impl FakeChannel {
    fn fail_next_sends(&self, n: usize) {
        self.rec.lock().unwrap().fail_sends = n;
    }

    fn fail_sends_for(&self, name: &str) {
        self.rec.lock().unwrap().fail_sends_for = Some(name.to_string());
    }

    fn fail_deletes(&self, fail: bool) {
        self.rec.lock().unwrap().fail_deletes = fail;
    }

    fn sent_texts(&self) -> Vec<String> {
        self.rec.lock().unwrap().sent.iter().map(|(_, t)| t.clone()).collect()
    }

    fn live(&self) -> Vec<String> {
        let rec = self.rec.lock().unwrap();
        rec.sent
            .iter()
            .filter(|(h, _)| !rec.deleted.contains(h))
            .map(|(_, t)| t.clone())
            .collect()
    }

    fn creates(&self) -> usize {
        self.rec.lock().unwrap().creates
    }

    fn board(&self, id: &str) -> Option<RenderedBoard> {
        self.rec.lock().unwrap().boards.get(id).cloned()
    }
}

#[async_trait]
impl NotificationChannel for FakeChannel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn send(&self, text: &str) -> Result<MessageHandle, ChannelError> {
        let mut rec = self.rec.lock().unwrap();
        if rec.fail_sends > 0 {
            rec.fail_sends -= 1;
            return Err(ChannelError::SendFailed("rate limited".into()));
        }
        if rec.fail_sends_for.as_deref().is_some_and(|name| text.starts_with(name)) {
            return Err(ChannelError::SendFailed("missing permissions".into()));
        }
        rec.next_id += 1;
        let handle = MessageHandle(format!("msg-{}", rec.next_id));
        rec.sent.push((handle.clone(), text.to_string()));
        Ok(handle)
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), ChannelError> {
        let mut rec = self.rec.lock().unwrap();
        if rec.fail_deletes {
            return Err(ChannelError::DeleteFailed("503 service unavailable".into()));
        }
        rec.deleted.push(handle.clone());
        Ok(())
    }

    async fn fetch_board(&self, id: &str) -> Result<Option<BoardArtifact>, ChannelError> {
        let rec = self.rec.lock().unwrap();
        if rec.fail_fetch {
            return Err(ChannelError::BoardFailed("gateway timeout".into()));
        }
        Ok(rec.boards.contains_key(id).then(|| BoardArtifact { id: id.to_string() }))
    }

    async fn create_board(&self, initial: &RenderedBoard) -> Result<BoardArtifact, ChannelError> {
        let mut rec = self.rec.lock().unwrap();
        rec.next_id += 1;
        rec.creates += 1;
        let id = format!("board-{}", rec.next_id);
        rec.boards.insert(id.clone(), initial.clone());
        Ok(BoardArtifact { id })
    }

    async fn overwrite_board(
        &self,
        artifact: &BoardArtifact,
        body: &RenderedBoard,
    ) -> Result<(), ChannelError> {
        let mut rec = self.rec.lock().unwrap();
        match rec.boards.get_mut(&artifact.id) {
            Some(b) => {
                *b = body.clone();
                Ok(())
            }
            None => Err(ChannelError::BoardFailed("unknown message".into())),
        }
    }
}

struct DownStore;

impl EventSource for DownStore {
    fn list_active(&self, _now: DateTime<Utc>) -> scrimboard_store::Result<Vec<Scrim>> {
        Err(StoreError::Unavailable("disk I/O error".into()))
    }

    fn prune_expired(&self, _now: DateTime<Utc>) -> scrimboard_store::Result<usize> {
        Err(StoreError::Unavailable("disk I/O error".into()))
    }

    fn board_identity(&self) -> scrimboard_store::Result<Option<String>> {
        Ok(None)
    }

    fn set_board_identity(&self, _id: &str) -> scrimboard_store::Result<()> {
        Ok(())
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 23, 9, 0, 0).unwrap()
}

fn setup() -> (Arc<ScrimStore>, Arc<FakeChannel>, Reconciler) {
    let store = Arc::new(ScrimStore::open_in_memory().unwrap());
    let channel = Arc::new(FakeChannel::default());
    let reconciler = Reconciler::new(
        store.clone(),
        channel.clone(),
        BoardRenderer::new(chrono_tz::UTC),
        &[5, 30, 15],
    );
    (store, channel, reconciler)
}

fn add(store: &ScrimStore, name: &str, start: DateTime<Utc>) -> Scrim {
    let draft = ScrimDraft::new(name, start, start + Duration::hours(2), None, None).unwrap();
    store.add_scrim(&draft).unwrap()
}

// ── reminders ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn alpha_thirty_then_fifteen_then_start() {
    let (store, channel, mut rec) = setup();
    let alpha = add(&store, "Alpha", start());

    let report = rec.tick(start() - Duration::minutes(30)).await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(channel.live(), vec!["Alpha starting in 30 minutes"]);
    assert_eq!(rec.state().thresholds_for(alpha.id), vec![30]);

    let report = rec.tick(start() - Duration::minutes(15)).await.unwrap();
    assert_eq!((report.sent, report.retracted), (1, 1));
    assert_eq!(channel.live(), vec!["Alpha starting in 15 minutes"]);
    assert_eq!(rec.state().thresholds_for(alpha.id), vec![15]);

    let report = rec.tick(start()).await.unwrap();
    assert_eq!((report.sent, report.retracted), (0, 1));
    assert!(channel.live().is_empty());
    assert!(rec.state().is_empty());
}

#[tokio::test]
async fn ticks_between_thresholds_send_nothing() {
    let (store, channel, mut rec) = setup();
    add(&store, "Alpha", start());

    for minutes in [45, 29, 20, 14, 6] {
        rec.tick(start() - Duration::minutes(minutes)).await.unwrap();
    }
    assert!(channel.sent_texts().is_empty());
}

#[tokio::test]
async fn repeated_tick_in_window_sends_once() {
    let (store, channel, mut rec) = setup();
    add(&store, "Alpha", start());

    rec.tick(start() - Duration::minutes(30)).await.unwrap();
    rec.tick(start() - Duration::seconds(30 * 60 - 20)).await.unwrap();
    assert_eq!(channel.sent_texts().len(), 1);
    assert_eq!(rec.state().len(), 1);
}

#[tokio::test]
async fn failed_send_is_not_retried_and_later_threshold_still_fires() {
    let (store, channel, mut rec) = setup();
    let alpha = add(&store, "Alpha", start());

    channel.fail_next_sends(1);
    let report = rec.tick(start() - Duration::minutes(30)).await.unwrap();
    assert_eq!((report.sent, report.failures), (0, 1));
    assert!(rec.state().is_empty());

    rec.tick(start() - Duration::minutes(29)).await.unwrap();
    rec.tick(start() - Duration::minutes(15)).await.unwrap();

    assert_eq!(channel.sent_texts(), vec!["Alpha starting in 15 minutes"]);
    assert_eq!(rec.state().len(), 1);
    assert_eq!(rec.state().thresholds_for(alpha.id), vec![15]);
}

#[tokio::test]
async fn failed_deletes_still_drop_records_and_other_scrims_proceed() {
    let (store, channel, mut rec) = setup();
    // Same start: Bravo has the lower id and is evaluated first.
    let bravo = add(&store, "Bravo", start());
    let alpha = add(&store, "Alpha", start());

    let report = rec.tick(start() - Duration::minutes(30)).await.unwrap();
    assert_eq!(report.sent, 2);

    channel.fail_deletes(true);
    channel.fail_sends_for("Bravo");
    let report = rec.tick(start() - Duration::minutes(15)).await.unwrap();
    assert_eq!((report.sent, report.retracted, report.failures), (1, 0, 2));
    assert_eq!(rec.state().thresholds_for(alpha.id), vec![15]);
    assert_eq!(rec.state().thresholds_for(bravo.id), vec![30]);
    assert_eq!(rec.state().len(), 2);
    assert!(channel.sent_texts().contains(&"Alpha starting in 15 minutes".to_string()));

    let report = rec.tick(start()).await.unwrap();
    assert_eq!((report.retracted, report.failures), (0, 2));
    assert!(rec.state().is_empty());
}

#[tokio::test]
async fn deleted_scrim_reminders_are_retracted() {
    let (store, channel, mut rec) = setup();
    let alpha = add(&store, "Alpha", start());
    add(&store, "Bravo", start() + Duration::hours(5));

    rec.tick(start() - Duration::minutes(30)).await.unwrap();
    assert_eq!(channel.live().len(), 1);

    store.delete_scrim(alpha.id).unwrap();
    let report = rec.tick(start() - Duration::minutes(29)).await.unwrap();
    assert_eq!(report.retracted, 1);
    assert!(channel.live().is_empty());
    assert!(rec.state().is_empty());
}

#[tokio::test]
async fn started_scrim_never_gets_a_reminder() {
    let (store, channel, mut rec) = setup();
    add(&store, "Late", start());

    rec.tick(start() + Duration::minutes(10)).await.unwrap();
    assert!(channel.sent_texts().is_empty());
    assert!(rec.state().is_empty());
}

// ── pruning and store failures ───────────────────────────────────────────────

#[tokio::test]
async fn ended_scrims_are_pruned_before_listing() {
    let (store, _channel, mut rec) = setup();
    add(&store, "Old", start() - Duration::hours(3));
    add(&store, "Next", start());

    let report = rec.tick(start() - Duration::minutes(50)).await.unwrap();
    assert_eq!((report.pruned, report.active), (1, 1));
    let names: Vec<String> = store.list_all().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Next"]);
}

#[tokio::test]
async fn store_outage_aborts_tick_without_touching_channel() {
    let channel = Arc::new(FakeChannel::default());
    let mut rec = Reconciler::new(
        Arc::new(DownStore),
        channel.clone(),
        BoardRenderer::new(chrono_tz::UTC),
        &[30],
    );

    let err = rec.tick(start()).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Store(StoreError::Unavailable(_))));
    assert_eq!(channel.creates(), 0);
    assert!(channel.sent_texts().is_empty());
}

// ── board ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn board_is_created_once_then_overwritten() {
    let (store, channel, mut rec) = setup();
    add(&store, "Alpha", start());

    let report = rec.tick(start() - Duration::hours(1)).await.unwrap();
    assert!(report.board_published);
    let id = store.board_identity().unwrap().expect("board id persisted");
    let body = channel.board(&id).unwrap();
    assert_eq!(body.fields[1].name, "**ALPHA**");

    rec.tick(start() - Duration::minutes(59)).await.unwrap();
    assert_eq!(channel.creates(), 1);
    assert_eq!(store.board_identity().unwrap(), Some(id));
}

#[tokio::test]
async fn missing_board_is_recreated_and_identity_replaced() {
    let (store, channel, mut rec) = setup();
    store.set_board_identity("board-deleted-by-a-mod").unwrap();

    rec.tick(start()).await.unwrap();
    let id = store.board_identity().unwrap().unwrap();
    assert_ne!(id, "board-deleted-by-a-mod");
    assert_eq!(channel.creates(), 1);
    assert_eq!(channel.board(&id).unwrap().description, "No scrims scheduled");
}

#[tokio::test]
async fn board_fetch_error_falls_back_to_create() {
    let (_store, channel, mut rec) = setup();
    rec.tick(start()).await.unwrap();
    channel.rec.lock().unwrap().fail_fetch = true;

    rec.tick(start() + Duration::minutes(1)).await.unwrap();
    assert_eq!(channel.creates(), 2);
}

#[tokio::test]
async fn oversized_board_does_not_block_reminders() {
    let (store, channel, mut rec) = setup();
    for i in 0..30 {
        add(&store, &format!("Team {i}"), start() + Duration::minutes(i));
    }

    let report = rec.tick(start() - Duration::minutes(30)).await.unwrap();
    assert!(!report.board_published);
    assert_eq!(channel.sent_texts(), vec!["Team 0 starting in 30 minutes"]);
}

#[tokio::test]
async fn refresh_republishes_without_sending() {
    let (store, channel, rec) = setup();
    add(&store, "Alpha", start());

    rec.refresh_board(start() - Duration::minutes(30)).await.unwrap();
    let id = store.board_identity().unwrap().unwrap();
    assert_eq!(channel.board(&id).unwrap().fields.len(), 2);
    assert!(channel.sent_texts().is_empty());
}

// ── engine ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn engine_serves_refresh_and_stops_on_shutdown() {
    let (store, channel, rec) = setup();
    let (refresh_tx, refresh_rx) = mpsc::channel(4);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let engine = ReminderEngine::new(rec, StdDuration::from_secs(60)).with_refresh(refresh_rx);
    let handle = tokio::spawn(engine.run(shutdown_rx));

    tokio::time::sleep(StdDuration::from_secs(1)).await;
    assert_eq!(channel.creates(), 1);

    add(&store, "Bravo", Utc::now() + Duration::days(1));
    refresh_tx.send(BoardRefresh::new("test")).await.unwrap();
    tokio::time::sleep(StdDuration::from_secs(1)).await;
    let id = store.board_identity().unwrap().unwrap();
    assert_eq!(channel.board(&id).unwrap().fields[1].name, "**BRAVO**");

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
