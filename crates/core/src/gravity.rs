//! Column normalization - compacts pieces toward row 0 after clears
//!
//! For every column the rows are walked in increasing order while tracking the
//! next free target row. Each non-empty, unblocked cell whose row differs from
//! the target (and whose target slot is not blocked) yields a move. The target
//! advances past every such cell, moved or not.
//!
//! Applying the moves of one column in order with [`Board::swap`] compacts it:
//! each move exchanges a falling piece with the empty cell at its target.

use match3_types::GridPos;

use crate::board::Board;

/// One piece's drop inside a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NormalizationMove {
    pub source_row: usize,
    pub column: usize,
    pub target_row: usize,
}

impl NormalizationMove {
    pub fn source(&self) -> GridPos {
        GridPos::new(self.source_row, self.column)
    }

    pub fn target(&self) -> GridPos {
        GridPos::new(self.target_row, self.column)
    }
}

/// Moves for a single column.
pub fn column_moves(board: &Board, column: usize) -> Vec<NormalizationMove> {
    let mut moves = Vec::new();
    if column >= board.columns() {
        return moves;
    }

    let mut target_row = 0;
    for row in 0..board.rows() {
        let cell = board.cell_at(GridPos::new(row, column));
        if !cell.is_match_candidate() {
            continue;
        }

        let target = board.cell_at(GridPos::new(target_row, column));
        if row != target_row && !target.is_blocked() {
            moves.push(NormalizationMove {
                source_row: row,
                column,
                target_row,
            });
        }
        target_row += 1;
    }

    moves
}

/// Moves for every column, left to right.
pub fn normalization_moves(board: &Board) -> Vec<NormalizationMove> {
    (0..board.columns())
        .flat_map(|column| column_moves(board, column))
        .collect()
}

/// Apply moves in order. Returns how many swaps landed.
pub fn apply_moves(board: &mut Board, moves: &[NormalizationMove]) -> usize {
    moves
        .iter()
        .filter(|m| board.swap(m.source_row, m.column, m.target_row, m.column))
        .count()
}
