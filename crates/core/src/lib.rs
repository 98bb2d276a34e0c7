//! Core board logic - pure, deterministic, and testable
//!
//! This crate contains the match-3 board model and the pure algorithms that
//! run over it. It has **no dependencies** on timing, async runtimes or I/O:
//!
//! - **Deterministic**: the same board always yields the same matches and moves
//! - **Testable**: every rule is a plain function over a [`Board`]
//!
//! # Module Structure
//!
//! - [`board`]: dense grid of identified cells with invariant-preserving mutators
//! - [`matcher`]: run detection along rows and columns
//! - [`gravity`]: column normalization moves toward row 0
//! - [`layout`]: grid to world-position mapping for views and input
//! - [`snapshot`]: persistable board state
//!
//! # Example
//!
//! ```
//! use match3_core::{find_matches, normalization_moves, Board};
//! use match3_types::Element::{Empty, Fire, Water};
//!
//! // One column, bottom row first.
//! let mut board = Board::from_grid(&[[Fire], [Water], [Fire], [Fire], [Fire]]).unwrap();
//! let matches = find_matches(&board);
//! assert_eq!(matches.len(), 3);
//!
//! for pos in &matches {
//!     board.set_element(pos.row, pos.column, Empty).unwrap();
//! }
//! assert!(normalization_moves(&board).is_empty());
//! ```

pub mod board;
pub mod gravity;
pub mod layout;
pub mod matcher;
pub mod snapshot;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError, Cell, MAX_CELLS};
pub use gravity::{apply_moves, column_moves, normalization_moves, NormalizationMove};
pub use layout::{GridLayout, GridSettings, Viewport};
pub use matcher::{find_matches, find_runs, Axis, MatchRun};
pub use snapshot::BoardSnapshot;
