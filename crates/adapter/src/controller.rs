//! Level lifecycle - loading, restarting and advancing levels around a session.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use match3_core::{BoardSnapshot, GridLayout, GridSettings, Viewport};
use match3_engine::{CascadeOutcome, EngineConfig, LevelSession, SnapshotSink, Subscription};
use match3_input::{validate_move, validate_swipe, SwipeRecognizer, SwipeRejected};
use match3_store::{LevelData, LevelStore};
use match3_types::{CellRecord, Direction, GridPos, SwapRequest, Vec2};

use crate::protocol::OutboundMessage;

/// Hands settled boards to the save writer.
///
/// `persist` runs under the board lock, so it only tags the snapshot with the
/// store's save epoch and queues it; the disk write happens on the writer.
struct StoreSink {
    store: Arc<LevelStore>,
    writes: mpsc::UnboundedSender<(u64, BoardSnapshot)>,
}

impl StoreSink {
    fn spawn(store: Arc<LevelStore>) -> Self {
        let (writes, mut rx) = mpsc::unbounded_channel::<(u64, BoardSnapshot)>();
        let writer_store = Arc::clone(&store);

        tokio::spawn(async move {
            while let Some((epoch, snapshot)) = rx.recv().await {
                let store = Arc::clone(&writer_store);
                let written =
                    tokio::task::spawn_blocking(move || store.save_snapshot_at(epoch, &snapshot)).await;
                if let Err(err) = written {
                    tracing::error!(%err, "snapshot write task failed");
                }
            }
            tracing::debug!("snapshot writer stopped");
        });

        Self { store, writes }
    }
}

impl SnapshotSink for StoreSink {
    fn persist(&self, snapshot: &BoardSnapshot) {
        let epoch = self.store.save_epoch();
        if self.writes.send((epoch, snapshot.clone())).is_err() {
            tracing::warn!("snapshot writer gone; board not saved");
        }
    }
}

/// The board as announced to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u32,
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<CellRecord>,
}

impl From<LevelInfo> for OutboundMessage {
    fn from(info: LevelInfo) -> Self {
        OutboundMessage::Level {
            level: info.level,
            rows: info.rows,
            columns: info.columns,
            cells: info.cells,
        }
    }
}

pub struct LevelController {
    store: Arc<LevelStore>,
    session: LevelSession,
    viewport: Viewport,
    settings: GridSettings,
    recognizer: Mutex<SwipeRecognizer>,
}

impl LevelController {
    /// Load the board to play and build a session around it.
    pub async fn start(store: Arc<LevelStore>, engine: EngineConfig, viewport: Viewport) -> Result<Self> {
        let settings = GridSettings::default();
        let data = store.level_data().await?;
        let board = data.build_board().context("building board from level data")?;
        let layout = GridLayout::fit(board.rows(), board.columns(), viewport, settings);

        let sink = Arc::new(StoreSink::spawn(Arc::clone(&store)));
        let session = LevelSession::new(board, layout, engine, sink);
        store.save(&LevelData::from_snapshot(store.current_level(), &session.snapshot().await));
        tracing::info!(level = store.current_level(), "level started");

        Ok(Self {
            store,
            session,
            viewport,
            settings,
            recognizer: Mutex::new(SwipeRecognizer::new()),
        })
    }

    pub fn session(&self) -> &LevelSession {
        &self.session
    }

    pub fn store(&self) -> &LevelStore {
        &self.store
    }

    pub fn subscribe(&self) -> Subscription {
        self.session.subscribe()
    }

    pub fn current_level(&self) -> u32 {
        self.store.current_level()
    }

    pub async fn level_info(&self) -> LevelInfo {
        let snapshot = self.session.snapshot().await;
        let (rows, columns) = snapshot.extents().unwrap_or((0, 0));
        LevelInfo {
            level: self.store.current_level(),
            rows,
            columns,
            cells: snapshot.cells,
        }
    }

    async fn load(&self) -> Result<LevelInfo> {
        let data = self.store.level_data().await?;
        let board = data.build_board().context("building board from level data")?;
        let layout = GridLayout::fit(board.rows(), board.columns(), self.viewport, self.settings);
        self.session.replace_board(board, layout).await;
        self.store.save_snapshot(&self.session.snapshot().await);

        tracing::info!(level = self.store.current_level(), "level loaded");
        Ok(self.level_info().await)
    }

    /// Drop progress on the current level and load it fresh.
    pub async fn restart(&self) -> Result<LevelInfo> {
        self.session.cancel_pending().await;
        self.store.delete_save();
        self.load().await
    }

    pub async fn next_level(&self) -> Result<LevelInfo> {
        self.session.cancel_pending().await;
        self.store.delete_save();
        let level = self.store.switch_to_next_level();
        tracing::info!(level, "advancing to next level");
        self.load().await
    }

    /// Advance when the settled board has been cleared.
    pub async fn on_cascade_complete(&self) -> Result<Option<LevelInfo>> {
        if !self.session.all_empty().await {
            return Ok(None);
        }
        tracing::info!(level = self.store.current_level(), "level cleared");
        self.next_level().await.map(Some)
    }

    pub fn request_swap(&self, request: SwapRequest) -> JoinHandle<CascadeOutcome> {
        self.session.request_swap(request)
    }

    /// Validate a directional swap against the current board and start it.
    pub async fn swap_cell(
        &self,
        row: usize,
        column: usize,
        direction: Direction,
    ) -> Result<JoinHandle<CascadeOutcome>, SwipeRejected> {
        let request = self
            .session
            .with_board(|board, _| validate_move(board, GridPos::new(row, column), direction))
            .await?;
        Ok(self.request_swap(request))
    }

    pub fn pointer_down(&self, pointer: u64, position: Vec2) {
        self.recognizer().pointer_down(pointer, position);
    }

    /// Finish a gesture; `None` when it was not a swipe.
    pub async fn pointer_up(
        &self,
        pointer: u64,
        position: Vec2,
    ) -> Option<Result<JoinHandle<CascadeOutcome>, SwipeRejected>> {
        let swipe = self.recognizer().pointer_up(pointer, position)?;
        let request = self
            .session
            .with_board(|board, layout| validate_swipe(board, layout, swipe))
            .await;
        Some(request.map(|r| self.request_swap(r)))
    }

    fn recognizer(&self) -> std::sync::MutexGuard<'_, SwipeRecognizer> {
        self.recognizer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
