//! Pointer input module (engine-facing).
//!
//! Independent of any windowing framework: callers feed pointer positions in
//! world units, [`SwipeRecognizer`] turns them into swipes, and
//! [`validate_swipe`] checks a swipe against the board before it becomes a
//! [`SwapRequest`](match3_types::SwapRequest).

pub mod gate;
pub mod swipe;

pub use match3_types as types;

pub use gate::{validate_move, validate_swipe, SwipeRejected};
pub use swipe::{Swipe, SwipeRecognizer};
