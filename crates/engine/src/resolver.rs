//! Cascade resolver - swap, fall, match and destroy until the board is stable
//!
//! One cascade runs as a chain of mutation bursts separated by animation
//! waits:
//!
//! ```text
//! Swapping -> SettlingMatches -> Falling -> SettlingMatches -> Destroying -> ... -> Idle
//! ```
//!
//! Each burst takes the board lock, mutates, marks the touched cells blocked,
//! emits its notifications and registers its wait under
//! [`DelayGroup::BoardMutation`] before releasing the lock. The lock is never
//! held across a wait. After the wait the burst's cells are unblocked and the
//! next step runs.
//!
//! Cancelling the board-mutation group abandons every cascade parked on a
//! wait: the post-wait unblock never runs and no further events are emitted.
//! Replacing the board bumps its generation, so a cascade that wakes up after
//! the replacement also stops at its next step.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arrayvec::ArrayVec;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::Instrument;

use match3_core::{apply_moves, find_matches, normalization_moves, Board, BoardError, BoardSnapshot, GridLayout};
use match3_types::{Element, GridPos, SwapRequest};

use crate::config::EngineConfig;
use crate::delay::{Cancelled, DelayGroup, DelayService};
use crate::events::{BoardEvent, EventBus};

/// Receives the board once a cascade settles.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: &BoardSnapshot);
}

/// Sink that drops every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl SnapshotSink for NoopSink {
    fn persist(&self, _snapshot: &BoardSnapshot) {}
}

/// The board plus the layout it is drawn with, replaced together.
#[derive(Debug)]
pub struct BoardSlot {
    pub board: Board,
    pub layout: GridLayout,
    pub(crate) generation: u64,
}

impl BoardSlot {
    pub fn new(board: Board, layout: GridLayout) -> Self {
        Self {
            board,
            layout,
            generation: 0,
        }
    }

    /// Incremented every time the board is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub type SharedBoard = Arc<Mutex<BoardSlot>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePhase {
    Idle,
    Swapping,
    SettlingMatches,
    Destroying,
    Falling,
}

/// Why a swap request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SwapRejection {
    #[error("position ({}, {}) is outside the board", .0.row, .0.column)]
    OutOfBounds(GridPos),
    #[error("cell ({}, {}) is busy animating", .0.row, .0.column)]
    Blocked(GridPos),
    #[error("cell ({}, {}) cannot swap with itself", .0.row, .0.column)]
    SameCell(GridPos),
}

impl SwapRejection {
    pub fn code(&self) -> &'static str {
        match self {
            SwapRejection::OutOfBounds(_) => "out_of_bounds",
            SwapRejection::Blocked(_) => "blocked",
            SwapRejection::SameCell(_) => "same_cell",
        }
    }
}

/// Totals for one settled cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    /// Destroy cycles; above 1 means chained matches.
    pub chains: u32,
    /// Cells cleared across all cycles.
    pub cleared: usize,
    /// Normalization passes that moved at least one piece.
    pub falls: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeOutcome {
    Rejected(SwapRejection),
    Settled(CascadeReport),
    /// A restart or level change abandoned the cascade.
    Cancelled,
    Failed(BoardError),
}

#[derive(Debug, thiserror::Error)]
enum CascadeError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("board was replaced")]
    Superseded,
    #[error(transparent)]
    Board(#[from] BoardError),
}

struct Inner {
    slot: SharedBoard,
    delays: DelayService,
    events: EventBus,
    config: EngineConfig,
    sink: Arc<dyn SnapshotSink>,
    active: AtomicUsize,
}

/// Counts a cascade as active for as long as it lives.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl<'a> ActiveGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct CascadeResolver {
    inner: Arc<Inner>,
}

impl CascadeResolver {
    pub fn new(
        slot: SharedBoard,
        delays: DelayService,
        events: EventBus,
        config: EngineConfig,
        sink: Arc<dyn SnapshotSink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                slot,
                delays,
                events,
                config,
                sink,
                active: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Cascades currently in flight.
    pub fn active_cascades(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.active_cascades() == 0
    }

    /// Run the cascade for `request` on its own task.
    pub fn spawn_swap(&self, request: SwapRequest) -> JoinHandle<CascadeOutcome> {
        let resolver = self.clone();
        tokio::spawn(async move { resolver.resolve_swap(request).await })
    }

    /// Run the full cascade for `request` and report how it ended.
    pub async fn resolve_swap(&self, request: SwapRequest) -> CascadeOutcome {
        let _active = ActiveGuard::new(&self.inner.active);
        let span = tracing::debug_span!(
            "cascade",
            source = ?request.source,
            target = ?request.target
        );

        let result = self.swap_and_settle(request).instrument(span).await;
        match result {
            Ok(outcome) => outcome,
            Err(CascadeError::Cancelled(_)) | Err(CascadeError::Superseded) => {
                tracing::debug!(?request, "cascade abandoned");
                CascadeOutcome::Cancelled
            }
            Err(CascadeError::Board(err)) => {
                tracing::error!(?request, %err, "cascade hit a board contract violation");
                CascadeOutcome::Failed(err)
            }
        }
    }

    async fn lock_current(&self, generation: u64) -> Result<MutexGuard<'_, BoardSlot>, CascadeError> {
        let slot = self.inner.slot.lock().await;
        if slot.generation != generation {
            return Err(CascadeError::Superseded);
        }
        Ok(slot)
    }

    async fn swap_and_settle(&self, request: SwapRequest) -> Result<CascadeOutcome, CascadeError> {
        let (generation, columns, wait) = {
            let mut slot = self.inner.slot.lock().await;
            let generation = slot.generation;
            let BoardSlot { board, layout, .. } = &mut *slot;

            if let Err(rejection) = check_swappable(board, request) {
                tracing::debug!(%rejection, "swap rejected");
                return Ok(CascadeOutcome::Rejected(rejection));
            }

            tracing::debug!(phase = ?CascadePhase::Swapping);
            let columns = affected_columns(request);
            for &column in &columns {
                board.set_column_blocked(column, true)?;
            }

            let (source, target) = (request.source, request.target);
            board.swap(source.row, source.column, target.row, target.column);

            for pos in [target, source] {
                let cell = board.get(pos.row, pos.column)?;
                self.inner.events.emit(BoardEvent::Moved {
                    cell_id: cell.id(),
                    position: layout.world_position(pos),
                });
            }

            let wait = self
                .inner
                .delays
                .wait(DelayGroup::BoardMutation, self.inner.config.swap_duration);
            (generation, columns, wait)
        };

        wait.await?;

        {
            let mut slot = self.lock_current(generation).await?;
            for &column in &columns {
                slot.board.set_column_blocked(column, false)?;
            }
        }

        let report = self.settle(generation).await?;
        Ok(CascadeOutcome::Settled(report))
    }

    /// Fall, match, destroy; repeat until a match scan comes back empty.
    async fn settle(&self, generation: u64) -> Result<CascadeReport, CascadeError> {
        let mut report = CascadeReport::default();

        loop {
            report.falls += self.fall(generation).await?;

            let (matched, wait) = {
                let mut slot = self.lock_current(generation).await?;
                tracing::debug!(phase = ?CascadePhase::SettlingMatches);

                let matched = find_matches(&slot.board);
                if matched.is_empty() {
                    self.finalize(&slot.board);
                    tracing::debug!(phase = ?CascadePhase::Idle, ?report);
                    return Ok(report);
                }

                tracing::debug!(phase = ?CascadePhase::Destroying, cells = matched.len());
                for pos in &matched {
                    slot.board.set_element(pos.row, pos.column, Element::Empty)?;
                    slot.board.set_blocked(pos.row, pos.column, true)?;
                    let cell_id = slot.board.get(pos.row, pos.column)?.id();
                    self.inner.events.emit(BoardEvent::Destroyed { cell_id });
                }

                report.chains += 1;
                report.cleared += matched.len();

                let wait = self
                    .inner
                    .delays
                    .wait(DelayGroup::BoardMutation, self.inner.config.destroy_duration);
                (matched, wait)
            };

            wait.await?;

            let mut slot = self.lock_current(generation).await?;
            for pos in &matched {
                slot.board.set_blocked(pos.row, pos.column, false)?;
            }
        }
    }

    /// Run normalization passes until one produces no moves.
    ///
    /// Returns the number of passes that moved something.
    async fn fall(&self, generation: u64) -> Result<u32, CascadeError> {
        let mut passes = 0;

        loop {
            let (touched, wait) = {
                let mut slot = self.lock_current(generation).await?;
                let BoardSlot { board, layout, .. } = &mut *slot;

                let moves = normalization_moves(board);
                if moves.is_empty() {
                    return Ok(passes);
                }

                tracing::debug!(phase = ?CascadePhase::Falling, moves = moves.len());
                let touched: BTreeSet<GridPos> = moves
                    .iter()
                    .flat_map(|m| [m.source(), m.target()])
                    .collect();
                for pos in &touched {
                    board.set_blocked(pos.row, pos.column, true)?;
                }

                apply_moves(board, &moves);

                for &pos in &touched {
                    let cell = board.get(pos.row, pos.column)?;
                    self.inner.events.emit(BoardEvent::Fell {
                        cell_id: cell.id(),
                        position: layout.world_position(pos),
                    });
                }

                let wait = self
                    .inner
                    .delays
                    .wait(DelayGroup::BoardMutation, self.inner.config.fall_duration);
                (touched, wait)
            };

            wait.await?;

            let mut slot = self.lock_current(generation).await?;
            for pos in &touched {
                slot.board.set_blocked(pos.row, pos.column, false)?;
            }
            passes += 1;
        }
    }

    /// Persist and announce completion once nothing else is in flight.
    fn finalize(&self, board: &Board) {
        if self.inner.delays.has_pending(DelayGroup::BoardMutation) {
            tracing::debug!("another cascade still in flight; skipping finalize");
            return;
        }

        if !board.all_empty() {
            self.inner.sink.persist(&board.snapshot());
        }
        self.inner.events.emit(BoardEvent::CascadeComplete);
    }
}

fn check_swappable(board: &Board, request: SwapRequest) -> Result<(), SwapRejection> {
    if request.source == request.target {
        return Err(SwapRejection::SameCell(request.source));
    }
    for pos in [request.source, request.target] {
        let cell = board
            .get(pos.row, pos.column)
            .map_err(|_| SwapRejection::OutOfBounds(pos))?;
        if cell.is_blocked() {
            return Err(SwapRejection::Blocked(pos));
        }
    }
    Ok(())
}

fn affected_columns(request: SwapRequest) -> ArrayVec<usize, 2> {
    let mut columns = ArrayVec::new();
    columns.push(request.source.column);
    if request.target.column != request.source.column {
        columns.push(request.target.column);
    }
    columns
}
