//! Cascade tests - end-to-end swaps through a level session on virtual time

use std::sync::{Arc, Mutex};
use std::time::Duration;

use match3::core::{Board, BoardSnapshot, GridLayout};
use match3::engine::{
    BoardEvent, CascadeOutcome, CascadeReport, DelayGroup, EngineConfig, LevelSession, SnapshotSink,
    SwapRejection,
};
use match3::types::Element::{Empty, Fire, Water};
use match3::types::{CellId, Element, GridPos, SwapRequest, Vec2};

#[derive(Default)]
struct RecordingSink {
    saved: Mutex<Vec<BoardSnapshot>>,
}

impl RecordingSink {
    fn saved(&self) -> Vec<BoardSnapshot> {
        self.saved.lock().unwrap().clone()
    }
}

impl SnapshotSink for RecordingSink {
    fn persist(&self, snapshot: &BoardSnapshot) {
        self.saved.lock().unwrap().push(snapshot.clone());
    }
}

fn column(elements: &[Element]) -> Board {
    let grid: Vec<[Element; 1]> = elements.iter().map(|&e| [e]).collect();
    Board::from_grid(&grid).unwrap()
}

fn session(board: Board) -> (LevelSession, Arc<RecordingSink>) {
    let layout = GridLayout::new(board.rows(), board.columns(), 1.0, Vec2::new(0.5, 0.5));
    let sink = Arc::new(RecordingSink::default());
    let session = LevelSession::new(
        board,
        layout,
        EngineConfig::uniform(Duration::from_millis(100)),
        sink.clone(),
    );
    (session, sink)
}

fn column_of(session_board: &Board) -> Vec<Element> {
    session_board.column_elements(0)
}

#[tokio::test(start_paused = true)]
async fn test_swap_without_match_settles_quietly() {
    let (session, sink) = session(column(&[Water, Fire, Fire, Fire]));
    let mut events = session.subscribe();

    let outcome = session.resolve_swap(SwapRequest::new(0, 0, 1, 0)).await;
    assert_eq!(outcome, CascadeOutcome::Settled(CascadeReport::default()));

    let board = session.with_board(|b, _| b.clone()).await;
    assert_eq!(column_of(&board), vec![Fire, Water, Fire, Fire]);
    assert!(board.is_quiet());

    let seen = events.drain();
    assert_eq!(seen.len(), 3);
    assert!(matches!(seen[0], BoardEvent::Moved { .. }));
    assert!(matches!(seen[1], BoardEvent::Moved { .. }));
    assert_eq!(seen[2], BoardEvent::CascadeComplete);

    assert_eq!(sink.saved(), vec![board.snapshot()]);
}

#[tokio::test(start_paused = true)]
async fn test_swap_into_run_clears_it() {
    let (session, sink) = session(column(&[Fire, Fire, Water, Fire, Fire]));
    let mut events = session.subscribe();

    let outcome = session.resolve_swap(SwapRequest::new(1, 0, 2, 0)).await;
    assert_eq!(
        outcome,
        CascadeOutcome::Settled(CascadeReport {
            chains: 1,
            cleared: 3,
            falls: 0,
        })
    );

    let board = session.with_board(|b, _| b.clone()).await;
    assert_eq!(column_of(&board), vec![Fire, Water, Empty, Empty, Empty]);
    assert!(board.is_quiet());

    // Ids are row-major; the swap moved id 1 up to row 2 and id 2 down to row 1.
    let layout = session.layout().await;
    let seen = events.drain();
    assert_eq!(
        seen,
        vec![
            BoardEvent::Moved {
                cell_id: CellId(1),
                position: layout.world_position(GridPos::new(2, 0)),
            },
            BoardEvent::Moved {
                cell_id: CellId(2),
                position: layout.world_position(GridPos::new(1, 0)),
            },
            BoardEvent::Destroyed { cell_id: CellId(1) },
            BoardEvent::Destroyed { cell_id: CellId(3) },
            BoardEvent::Destroyed { cell_id: CellId(4) },
            BoardEvent::CascadeComplete,
        ]
    );

    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(Board::from_snapshot(&saved[0]).unwrap().elements(), board.elements());
}

#[tokio::test(start_paused = true)]
async fn test_clear_then_fall_then_chain() {
    // Clearing rows 1..=3 drops the two Fires from rows 4 and 5 onto the Fire at
    // row 0, which forms a second run.
    let (session, _sink) = session(column(&[Fire, Water, Water, Fire, Fire, Water, Water]));
    let mut events = session.subscribe();

    let outcome = session.resolve_swap(SwapRequest::new(3, 0, 5, 0)).await;
    // Not adjacent, but the resolver only checks bounds and blocking.
    let CascadeOutcome::Settled(report) = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert_eq!(report.chains, 2);
    assert_eq!(report.cleared, 6);
    assert!(report.falls >= 1);

    let board = session.with_board(|b, _| b.clone()).await;
    assert_eq!(column_of(&board), vec![Water, Empty, Empty, Empty, Empty, Empty, Empty]);
    assert!(board.is_quiet());

    let seen = events.drain();
    assert!(seen.iter().any(|e| matches!(e, BoardEvent::Fell { .. })));
    assert_eq!(seen.iter().filter(|e| matches!(e, BoardEvent::Destroyed { .. })).count(), 6);
    assert_eq!(seen.last(), Some(&BoardEvent::CascadeComplete));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_fall_stops_the_cascade() {
    let (session, sink) = session(column(&[Water, Fire, Fire, Water, Fire]));
    let mut events = session.subscribe();

    let handle = session.request_swap(SwapRequest::new(3, 0, 4, 0));

    // Swap wait ends at 100ms, destroy wait at 200ms, fall wait at 300ms.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(session.delays().pending(DelayGroup::BoardMutation), 1);
    assert_eq!(session.cancel_pending().await, 1);

    assert_eq!(handle.await.unwrap(), CascadeOutcome::Cancelled);

    let seen = events.drain();
    assert_eq!(seen.iter().filter(|e| matches!(e, BoardEvent::Destroyed { .. })).count(), 3);
    assert_eq!(seen.iter().filter(|e| matches!(e, BoardEvent::Fell { .. })).count(), 2);
    assert!(!seen.contains(&BoardEvent::CascadeComplete));

    // The fall landed but its unblock never ran.
    let board = session.with_board(|b, _| b.clone()).await;
    assert_eq!(column_of(&board), vec![Water, Water, Empty, Empty, Empty]);
    assert!(board.get(1, 0).unwrap().is_blocked());
    assert!(board.get(4, 0).unwrap().is_blocked());
    assert!(sink.saved().is_empty());

    // Nothing else happens later either.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(events.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_swap_on_busy_column_is_rejected() {
    let (session, _sink) = session(Board::from_grid(&[[Fire, Water], [Water, Fire]]).unwrap());

    let first = session.request_swap(SwapRequest::new(0, 0, 1, 0));
    tokio::task::yield_now().await;

    let second = session.resolve_swap(SwapRequest::new(1, 0, 1, 1)).await;
    assert_eq!(
        second,
        CascadeOutcome::Rejected(SwapRejection::Blocked(GridPos::new(1, 0)))
    );

    assert!(matches!(first.await.unwrap(), CascadeOutcome::Settled(_)));
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_cascades_complete_once() {
    let (session, sink) = session(
        Board::from_grid(&[[Fire, Water, Fire, Water], [Water, Fire, Water, Fire]]).unwrap(),
    );
    let mut events = session.subscribe();

    let a = session.request_swap(SwapRequest::new(0, 0, 1, 0));
    let b = session.request_swap(SwapRequest::new(0, 3, 1, 3));

    assert!(matches!(a.await.unwrap(), CascadeOutcome::Settled(_)));
    assert!(matches!(b.await.unwrap(), CascadeOutcome::Settled(_)));

    let seen = events.drain();
    assert_eq!(seen.iter().filter(|e| **e == BoardEvent::CascadeComplete).count(), 1);
    assert_eq!(seen.last(), Some(&BoardEvent::CascadeComplete));
    assert_eq!(sink.saved().len(), 1);
    assert!(session.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_cleared_board_is_not_persisted() {
    let (session, sink) = session(Board::from_grid(&[[Fire, Fire, Empty, Fire]]).unwrap());
    let mut events = session.subscribe();

    let outcome = session.resolve_swap(SwapRequest::new(0, 3, 0, 2)).await;
    assert!(matches!(outcome, CascadeOutcome::Settled(CascadeReport { cleared: 3, .. })));
    assert!(session.all_empty().await);
    assert!(sink.saved().is_empty());
    assert_eq!(events.drain().last(), Some(&BoardEvent::CascadeComplete));
}
