//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no behavior beyond parsing and formatting,
//! making them usable in any context (board logic, cascade engine, wire protocol,
//! level files).
//!
//! # Coordinates
//!
//! Grid positions are `(row, column)` pairs:
//!
//! - **Row 0** is the bottom row in world space; world `y` grows with the row index
//! - **Column 0** is the leftmost column; world `x` grows with the column index
//! - Gravity compacts every column toward row 0
//!
//! # Timing Constants
//!
//! Animation windows the engine waits for, in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SWAP_MS` | 100 | Swap animation window |
//! | `FALL_MS` | 100 | Fall animation window (one compaction pass) |
//! | `DESTROY_MS` | 500 | Clear animation length |
//!
//! # Examples
//!
//! ```
//! use match3_types::{Direction, Element, GridPos};
//!
//! assert_eq!(Element::from_str("FIRE"), Some(Element::Fire));
//! assert!(Element::Empty.is_empty());
//!
//! let from = GridPos::new(2, 3);
//! assert_eq!(from.step(Direction::Up), Some(GridPos::new(3, 3)));
//! assert_eq!(GridPos::new(0, 0).step(Direction::Down), None);
//! ```

use serde::{Deserialize, Serialize};

/// Swap animation window (100ms).
pub const SWAP_MS: u64 = 100;

/// Fall animation window for one compaction pass (100ms).
pub const FALL_MS: u64 = 100;

/// Clear animation length (500ms).
pub const DESTROY_MS: u64 = 500;

/// Minimum run length that counts as a match.
pub const MATCH_LENGTH: usize = 3;

/// Minimum pointer travel, in world units, for a gesture to count as a swipe.
pub const SWIPE_THRESHOLD: f32 = 0.1;

/// Space kept free under the grid, in world units.
pub const GRID_BOTTOM_OFFSET: f32 = 1.0;

/// Share of the viewport width the grid may occupy.
pub const GRID_MAX_WIDTH_RATIO: f32 = 0.9;

/// Share of the viewport height the grid may occupy.
pub const GRID_MAX_HEIGHT_RATIO: f32 = 0.75;

/// The value held by a grid cell
///
/// `Empty` is a regular element value: the grid is always dense and a cleared
/// cell keeps existing with `Element::Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Empty,
    Fire,
    Water,
}

impl Element {
    /// Parse element from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::Element;
    ///
    /// assert_eq!(Element::from_str("water"), Some(Element::Water));
    /// assert_eq!(Element::from_str("Empty"), Some(Element::Empty));
    /// assert_eq!(Element::from_str("lava"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "empty" => Some(Element::Empty),
            "fire" => Some(Element::Fire),
            "water" => Some(Element::Water),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Empty => "empty",
            Element::Fire => "fire",
            Element::Water => "water",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Element::Empty)
    }
}

impl Default for Element {
    fn default() -> Self {
        Element::Empty
    }
}

/// Stable identity of a cell, independent of its current grid slot.
///
/// Views key their sprites by this id; it survives swaps and falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u32);

/// A `(row, column)` grid coordinate.
///
/// Ordering is row-major, so sets of positions iterate bottom row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub row: usize,
    pub column: usize,
}

impl GridPos {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Neighbor one step in `direction`, or `None` when it would go below zero.
    ///
    /// Upper bounds are the board's business.
    pub fn step(self, direction: Direction) -> Option<GridPos> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr as isize)?;
        let column = self.column.checked_add_signed(dc as isize)?;
        Some(GridPos { row, column })
    }

    /// True when the two positions share an edge.
    pub fn is_adjacent(self, other: GridPos) -> bool {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column) == 1
    }
}

/// Swipe / swap directions
///
/// - **Up**: toward higher rows
/// - **Down**: toward row 0
/// - **Left** / **Right**: along the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `(row, column)` delta for one step.
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (1, 0),
            Direction::Down => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Parse direction from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "up" | "u", "down" | "d", "left" | "l", "right" | "r"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// A swap of two cells requested by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapRequest {
    pub source: GridPos,
    pub target: GridPos,
}

impl SwapRequest {
    pub const fn new(source_row: usize, source_col: usize, target_row: usize, target_col: usize) -> Self {
        Self {
            source: GridPos::new(source_row, source_col),
            target: GridPos::new(target_row, target_col),
        }
    }
}

/// One cell as stored in level files and save files.
///
/// Serialized as `{"row":0,"column":2,"element":"fire"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRecord {
    pub row: usize,
    pub column: usize,
    pub element: Element,
}

impl CellRecord {
    pub const fn new(row: usize, column: usize, element: Element) -> Self {
        Self {
            row,
            column,
            element,
        }
    }
}

/// A 2D point in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Where a view should place a cell. `z` keeps lower rows in front.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_serializes_lowercase() {
        let record = CellRecord::new(1, 2, Element::Water);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"row":1,"column":2,"element":"water"}"#);

        let back: CellRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn grid_pos_step_and_adjacency() {
        let p = GridPos::new(1, 1);
        assert_eq!(p.step(Direction::Up), Some(GridPos::new(2, 1)));
        assert_eq!(p.step(Direction::Down), Some(GridPos::new(0, 1)));
        assert_eq!(p.step(Direction::Left), Some(GridPos::new(1, 0)));
        assert_eq!(p.step(Direction::Right), Some(GridPos::new(1, 2)));
        assert_eq!(GridPos::new(0, 0).step(Direction::Left), None);

        assert!(p.is_adjacent(GridPos::new(1, 2)));
        assert!(!p.is_adjacent(GridPos::new(2, 2)));
        assert!(!p.is_adjacent(p));
    }

    #[test]
    fn grid_pos_orders_row_major() {
        assert!(GridPos::new(0, 5) < GridPos::new(1, 0));
        assert!(GridPos::new(1, 0) < GridPos::new(1, 1));
    }

    #[test]
    fn direction_parse_roundtrip() {
        for d in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(Direction::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Direction::from_str("R"), Some(Direction::Right));
        assert_eq!(Direction::from_str("sideways"), None);
    }

    #[test]
    fn default_timings() {
        assert_eq!(SWAP_MS, 100);
        assert_eq!(FALL_MS, SWAP_MS);
        assert_eq!(DESTROY_MS, 500);
        assert_eq!(MATCH_LENGTH, 3);
    }
}
