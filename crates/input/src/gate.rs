//! Swipe validation against the current board.

use match3_core::{Board, GridLayout};
use match3_types::{Direction, GridPos, SwapRequest};

use crate::swipe::Swipe;

/// Why a swipe did not become a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SwipeRejected {
    #[error("swipe started outside the grid")]
    OutsideGrid,
    #[error("cell ({}, {}) is empty", .0.row, .0.column)]
    EmptySource(GridPos),
    #[error("cell ({}, {}) is busy animating", .0.row, .0.column)]
    BlockedSource(GridPos),
    #[error("swipe leaves the grid")]
    TargetOutOfBounds,
    #[error("cell ({}, {}) is busy animating", .0.row, .0.column)]
    BlockedTarget(GridPos),
    #[error("cannot swap a piece up into an empty cell")]
    UpIntoEmpty,
}

impl SwipeRejected {
    /// Short machine-readable tag.
    pub fn code(&self) -> &'static str {
        match self {
            SwipeRejected::OutsideGrid => "outside_grid",
            SwipeRejected::EmptySource(_) => "empty_source",
            SwipeRejected::BlockedSource(_) => "blocked_source",
            SwipeRejected::TargetOutOfBounds => "target_out_of_bounds",
            SwipeRejected::BlockedTarget(_) => "blocked_target",
            SwipeRejected::UpIntoEmpty => "up_into_empty",
        }
    }
}

/// Turn a recognized swipe into a swap request.
pub fn validate_swipe(board: &Board, layout: &GridLayout, swipe: Swipe) -> Result<SwapRequest, SwipeRejected> {
    let source = layout
        .grid_coordinate(swipe.start)
        .ok_or(SwipeRejected::OutsideGrid)?;
    validate_move(board, source, swipe.direction)
}

/// Check a swap of the cell at `source` with its neighbor in `direction`.
pub fn validate_move(board: &Board, source: GridPos, direction: Direction) -> Result<SwapRequest, SwipeRejected> {
    let cell = board
        .get(source.row, source.column)
        .map_err(|_| SwipeRejected::OutsideGrid)?;
    if cell.is_empty() {
        return Err(SwipeRejected::EmptySource(source));
    }
    if cell.is_blocked() {
        return Err(SwipeRejected::BlockedSource(source));
    }

    let target = source
        .step(direction)
        .filter(|pos| board.contains(*pos))
        .ok_or(SwipeRejected::TargetOutOfBounds)?;
    let other = board
        .get(target.row, target.column)
        .map_err(|_| SwipeRejected::TargetOutOfBounds)?;

    if direction == Direction::Up && other.is_empty() {
        return Err(SwipeRejected::UpIntoEmpty);
    }
    if other.is_blocked() {
        return Err(SwipeRejected::BlockedTarget(target));
    }

    Ok(SwapRequest { source, target })
}
