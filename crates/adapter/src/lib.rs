//! Adapter module - level lifecycle and a JSON line protocol
//!
//! This crate wires the store, the cascade engine and input validation into a
//! playable level, and exposes it to an external view or agent over any async
//! byte stream.
//!
//! # Protocol Overview
//!
//! One JSON object per line, each tagged with `type`.
//!
//! ## Client → Game
//!
//! - **swap**: `{row, col, direction}` swap with a neighbor
//! - **swipe**: `{pointer, from: [x, y], to: [x, y]}` gesture in world units
//! - **restart** / **next_level**: reload the current level or advance
//! - **snapshot**: request the full board
//!
//! ## Game → Client
//!
//! - **level**: full board (on start, on level change, on request)
//! - **move** / **fall**: animate a cell to a world position
//! - **destroy**: play a cell's clear animation
//! - **cascade_complete**: the board settled
//! - **rejected**: a swap or swipe was refused, with a reason code
//! - **error**: malformed input or a failed level load
//!
//! # Environment Variables
//!
//! - `MATCH3_WORLD_WIDTH` / `MATCH3_WORLD_HEIGHT`: viewport the grid is fitted into

pub mod controller;
pub mod protocol;
pub mod runtime;

pub use controller::{LevelController, LevelInfo};
pub use protocol::{parse_message, ErrorCode, InboundMessage, OutboundMessage, ParsedMessage};
pub use runtime::{run, AdapterConfig};
