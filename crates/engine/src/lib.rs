//! Cascade engine - timed resolution of swaps into a stable board
//!
//! This crate drives the board from `match3-core` through animated cascades:
//!
//! - [`delay`]: cancellable timed waits keyed by group
//! - [`events`]: notifications for render collaborators
//! - [`resolver`]: the swap, fall, match and destroy state machine
//! - [`session`]: one board plus the services that animate it
//! - [`config`]: animation timings
//!
//! Everything runs on the tokio runtime. Board mutation happens in short
//! bursts under a lock; waits happen outside it, so several cascades can
//! overlap as long as they touch unblocked cells.

pub mod config;
pub mod delay;
pub mod events;
pub mod resolver;
pub mod session;

pub use config::EngineConfig;
pub use delay::{Cancelled, DelayGroup, DelayService};
pub use events::{BoardEvent, EventBus, SubscriberId, Subscription};
pub use resolver::{
    BoardSlot, CascadeOutcome, CascadePhase, CascadeReport, CascadeResolver, NoopSink,
    SharedBoard, SnapshotSink, SwapRejection,
};
pub use session::LevelSession;
