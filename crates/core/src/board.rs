//! Board module - owns the grid of cells
//!
//! The board is a dense `rows x columns` grid stored as a flat row-major
//! vector. Every slot always holds a [`Cell`]; a cleared slot holds a cell whose
//! element is [`Element::Empty`].
//!
//! The board is pure data. It raises no events and knows nothing about
//! animations: the `blocked` flag is stored here but only the cascade engine
//! decides when to set it.

use match3_types::{CellId, CellRecord, Element, GridPos};

use crate::snapshot::BoardSnapshot;

/// Errors raised by direct board access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Level data had no cells, or its extents are too large to hold.
    #[error("invalid level data: no usable grid extents")]
    InvalidLevelData,
    #[error("position ({row}, {column}) is outside the board")]
    OutOfBounds { row: usize, column: usize },
}

/// A single grid cell
///
/// `row`/`column` always mirror the cell's slot in the board; the board
/// rewrites them on every swap. `id` never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    id: CellId,
    element: Element,
    row: usize,
    column: usize,
    blocked: bool,
}

impl Cell {
    fn new(id: CellId, element: Element, row: usize, column: usize) -> Self {
        Self {
            id,
            element,
            row,
            column,
            blocked: false,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn pos(&self) -> GridPos {
        GridPos::new(self.row, self.column)
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn is_empty(&self) -> bool {
        self.element.is_empty()
    }

    /// Non-empty and not owned by an animation.
    pub fn is_match_candidate(&self) -> bool {
        !self.is_empty() && !self.blocked
    }
}

/// Upper bound on `rows * columns` accepted from level data.
pub const MAX_CELLS: usize = 1 << 16;

/// The game board - `rows x columns` cells in row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    columns: usize,
    /// Flat array of cells, row-major order (row * columns + column)
    cells: Vec<Cell>,
}

impl Board {
    /// Build a board from level data.
    ///
    /// Extents are `max(row) + 1` by `max(column) + 1`. Slots the records do
    /// not mention hold an empty cell; a later record for the same slot wins.
    /// Cell ids are assigned in row-major order.
    pub fn from_records(records: &[CellRecord]) -> Result<Self, BoardError> {
        let extent = |max: Option<usize>| {
            max.and_then(|m| m.checked_add(1))
                .ok_or(BoardError::InvalidLevelData)
        };
        let rows = extent(records.iter().map(|r| r.row).max())?;
        let columns = extent(records.iter().map(|r| r.column).max())?;
        match rows.checked_mul(columns) {
            Some(total) if total <= MAX_CELLS => {}
            _ => return Err(BoardError::InvalidLevelData),
        }

        let mut cells = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                let id = CellId((row * columns + column) as u32);
                cells.push(Cell::new(id, Element::Empty, row, column));
            }
        }

        let mut board = Self {
            rows,
            columns,
            cells,
        };
        for record in records {
            let idx = record.row * columns + record.column;
            board.cells[idx].element = record.element;
        }
        Ok(board)
    }

    /// Build a board from element rows, `grid[row][column]`.
    ///
    /// Row 0 is the bottom row. Rows shorter than the widest row are padded
    /// with empty cells.
    pub fn from_grid<R: AsRef<[Element]>>(grid: &[R]) -> Result<Self, BoardError> {
        let records: Vec<CellRecord> = grid
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                line.as_ref()
                    .iter()
                    .enumerate()
                    .map(move |(column, &element)| CellRecord::new(row, column, element))
            })
            .collect();
        Self::from_records(&records)
    }

    /// Rebuild a board from a persisted snapshot.
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, BoardError> {
        Self::from_records(&snapshot.cells)
    }

    #[inline(always)]
    fn index(&self, row: usize, column: usize) -> Option<usize> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(row * self.columns + column)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.index(pos.row, pos.column).is_some()
    }

    /// Get the cell at `(row, column)`.
    pub fn get(&self, row: usize, column: usize) -> Result<&Cell, BoardError> {
        self.index(row, column)
            .map(|idx| &self.cells[idx])
            .ok_or(BoardError::OutOfBounds { row, column })
    }

    /// Unchecked-by-contract access for scans that only walk in-bounds positions.
    #[inline(always)]
    pub(crate) fn cell_at(&self, pos: GridPos) -> &Cell {
        &self.cells[pos.row * self.columns + pos.column]
    }

    fn get_mut(&mut self, row: usize, column: usize) -> Result<&mut Cell, BoardError> {
        match self.index(row, column) {
            Some(idx) => Ok(&mut self.cells[idx]),
            None => Err(BoardError::OutOfBounds { row, column }),
        }
    }

    /// Exchange the cells at two positions.
    ///
    /// Returns false (and leaves the board untouched) when either position is
    /// out of bounds. The `blocked` flag is not consulted.
    pub fn swap(&mut self, row_a: usize, column_a: usize, row_b: usize, column_b: usize) -> bool {
        let (Some(a), Some(b)) = (self.index(row_a, column_a), self.index(row_b, column_b)) else {
            return false;
        };

        self.cells.swap(a, b);
        self.cells[a].row = row_a;
        self.cells[a].column = column_a;
        self.cells[b].row = row_b;
        self.cells[b].column = column_b;
        true
    }

    pub fn set_blocked(&mut self, row: usize, column: usize, blocked: bool) -> Result<(), BoardError> {
        self.get_mut(row, column)?.blocked = blocked;
        Ok(())
    }

    /// Set the blocked flag on every cell of a column.
    pub fn set_column_blocked(&mut self, column: usize, blocked: bool) -> Result<(), BoardError> {
        if column >= self.columns {
            return Err(BoardError::OutOfBounds { row: 0, column });
        }
        for row in 0..self.rows {
            let idx = row * self.columns + column;
            self.cells[idx].blocked = blocked;
        }
        Ok(())
    }

    pub fn set_element(&mut self, row: usize, column: usize, element: Element) -> Result<(), BoardError> {
        self.get_mut(row, column)?.element = element;
        Ok(())
    }

    /// True iff every cell holds [`Element::Empty`].
    pub fn all_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// True iff no cell is currently blocked.
    pub fn is_quiet(&self) -> bool {
        self.cells.iter().all(|c| !c.blocked)
    }

    /// Current slot of the cell with the given id.
    pub fn position_of(&self, id: CellId) -> Option<GridPos> {
        self.cells.iter().find(|c| c.id == id).map(Cell::pos)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Elements of one column, bottom row first.
    pub fn column_elements(&self, column: usize) -> Vec<Element> {
        (0..self.rows)
            .filter_map(|row| self.index(row, column))
            .map(|idx| self.cells[idx].element)
            .collect()
    }

    /// Elements as `grid[row][column]`.
    pub fn elements(&self) -> Vec<Vec<Element>> {
        self.cells
            .chunks(self.columns)
            .map(|line| line.iter().map(Cell::element).collect())
            .collect()
    }

    /// Persistable copy of the grid, column by column.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut cells = Vec::with_capacity(self.cells.len());
        for column in 0..self.columns {
            for row in 0..self.rows {
                let cell = &self.cells[row * self.columns + column];
                cells.push(CellRecord::new(row, column, cell.element));
            }
        }
        BoardSnapshot { cells }
    }
}
