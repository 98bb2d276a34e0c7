//! Match-3 cascade engine (workspace facade crate).
//!
//! Re-exports the member crates under short names so applications and the
//! integration tests can use `match3::{core, engine, ...}` while the
//! implementation lives in dedicated crates under `crates/`.

pub use match3_adapter as adapter;
pub use match3_core as core;
pub use match3_engine as engine;
pub use match3_input as input;
pub use match3_store as store;
pub use match3_types as types;
