//! Level session - one board and the machinery that animates it
//!
//! A [`LevelSession`] owns the shared board slot, the delay service, the event
//! bus and the resolver wired to all three. Swaps are resolved on spawned
//! tasks; restarts go through [`LevelSession::replace_board`], which cancels
//! every in-flight wait and installs the new board under one lock.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use match3_core::{Board, BoardSnapshot, GridLayout};
use match3_types::SwapRequest;

use crate::config::EngineConfig;
use crate::delay::{DelayGroup, DelayService};
use crate::events::{EventBus, Subscription};
use crate::resolver::{BoardSlot, CascadeOutcome, CascadeResolver, SharedBoard, SnapshotSink};

pub struct LevelSession {
    slot: SharedBoard,
    delays: DelayService,
    events: EventBus,
    resolver: CascadeResolver,
}

impl LevelSession {
    pub fn new(
        board: Board,
        layout: GridLayout,
        config: EngineConfig,
        sink: Arc<dyn SnapshotSink>,
    ) -> Self {
        let slot = Arc::new(Mutex::new(BoardSlot::new(board, layout)));
        let delays = DelayService::new();
        let events = EventBus::new();
        let resolver = CascadeResolver::new(
            Arc::clone(&slot),
            delays.clone(),
            events.clone(),
            config,
            sink,
        );

        Self {
            slot,
            delays,
            events,
            resolver,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn delays(&self) -> &DelayService {
        &self.delays
    }

    pub fn resolver(&self) -> &CascadeResolver {
        &self.resolver
    }

    /// Resolve `request` on a background task.
    pub fn request_swap(&self, request: SwapRequest) -> JoinHandle<CascadeOutcome> {
        tracing::debug!(?request, "swap requested");
        self.resolver.spawn_swap(request)
    }

    /// Resolve `request` on the calling task.
    pub async fn resolve_swap(&self, request: SwapRequest) -> CascadeOutcome {
        self.resolver.resolve_swap(request).await
    }

    /// Abandon every cascade on the current board.
    ///
    /// Pending waits are cancelled and the generation bumped under the board
    /// lock, so no cascade can register another wait or touch the board
    /// afterwards. The board keeps whatever blocked flags those cascades left.
    pub async fn cancel_pending(&self) -> usize {
        let mut slot = self.slot.lock().await;
        self.retire(&mut slot)
    }

    /// Install a new board, abandoning whatever the old one was doing.
    pub async fn replace_board(&self, board: Board, layout: GridLayout) {
        let mut slot = self.slot.lock().await;
        let cancelled = self.retire(&mut slot);
        slot.board = board;
        slot.layout = layout;
        tracing::info!(
            generation = slot.generation,
            rows = slot.board.rows(),
            columns = slot.board.columns(),
            cancelled,
            "board replaced"
        );
    }

    fn retire(&self, slot: &mut BoardSlot) -> usize {
        slot.generation += 1;
        self.delays.cancel_group(DelayGroup::BoardMutation)
    }

    /// Run `f` against the current board and layout.
    pub async fn with_board<R>(&self, f: impl FnOnce(&Board, &GridLayout) -> R) -> R {
        let slot = self.slot.lock().await;
        f(&slot.board, &slot.layout)
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        self.slot.lock().await.board.snapshot()
    }

    pub async fn all_empty(&self) -> bool {
        self.slot.lock().await.board.all_empty()
    }

    pub async fn layout(&self) -> GridLayout {
        self.slot.lock().await.layout
    }

    /// No cascade in flight and no wait pending.
    pub fn is_idle(&self) -> bool {
        self.resolver.is_idle() && !self.delays.has_pending(DelayGroup::BoardMutation)
    }
}
