//! Match finder - detects runs of identical elements
//!
//! Each row is scanned left to right and each column bottom to top, collapsing
//! maximal runs of cells that are non-empty, unblocked and share their
//! predecessor's element. Runs of [`MATCH_LENGTH`] or more are reported.
//!
//! Blocked cells end a run exactly like empty cells do, so nothing is ever
//! matched across a cell that is mid-animation.

use std::collections::BTreeSet;

use match3_types::{Element, GridPos, MATCH_LENGTH};

use crate::board::Board;

/// Scan direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

/// One contiguous run of matching cells, in increasing index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRun {
    pub axis: Axis,
    pub element: Element,
    pub cells: Vec<GridPos>,
}

impl MatchRun {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Every run on the board, row runs first, then column runs.
///
/// A cell at the crossing of a row run and a column run shows up in both.
pub fn find_runs(board: &Board) -> Vec<MatchRun> {
    let mut runs = Vec::new();

    for row in 0..board.rows() {
        let line = (0..board.columns()).map(|column| GridPos::new(row, column));
        scan_line(board, Axis::Row, line, &mut runs);
    }

    for column in 0..board.columns() {
        let line = (0..board.rows()).map(|row| GridPos::new(row, column));
        scan_line(board, Axis::Column, line, &mut runs);
    }

    runs
}

/// Union of all runs as a deduplicated coordinate set.
pub fn find_matches(board: &Board) -> BTreeSet<GridPos> {
    find_runs(board)
        .into_iter()
        .flat_map(|run| run.cells)
        .collect()
}

fn scan_line(
    board: &Board,
    axis: Axis,
    line: impl Iterator<Item = GridPos>,
    runs: &mut Vec<MatchRun>,
) {
    let mut current: Vec<GridPos> = Vec::new();
    let mut current_element: Option<Element> = None;

    for pos in line {
        let cell = board.cell_at(pos);
        if !cell.is_match_candidate() {
            flush_run(axis, &mut current, &mut current_element, runs);
            continue;
        }

        if current_element != Some(cell.element()) {
            flush_run(axis, &mut current, &mut current_element, runs);
            current_element = Some(cell.element());
        }
        current.push(pos);
    }

    flush_run(axis, &mut current, &mut current_element, runs);
}

fn flush_run(
    axis: Axis,
    current: &mut Vec<GridPos>,
    current_element: &mut Option<Element>,
    runs: &mut Vec<MatchRun>,
) {
    if let Some(element) = current_element.take() {
        if current.len() >= MATCH_LENGTH {
            runs.push(MatchRun {
                axis,
                element,
                cells: std::mem::take(current),
            });
        }
    }
    current.clear();
}
