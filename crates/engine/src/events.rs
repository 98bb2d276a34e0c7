//! Board notifications for render collaborators.
//!
//! The cascade engine publishes [`BoardEvent`]s through an [`EventBus`].
//! Consumers subscribe explicitly and get their own unbounded queue; dropping
//! the [`Subscription`] (or calling [`EventBus::unsubscribe`]) removes them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use match3_types::{CellId, WorldPos};

/// Instruction for the render layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardEvent {
    /// A swapped cell should animate to `position`.
    Moved { cell_id: CellId, position: WorldPos },
    /// A cell dropped during normalization should animate to `position`.
    Fell { cell_id: CellId, position: WorldPos },
    /// A matched cell should play its clear animation.
    Destroyed { cell_id: CellId },
    /// The board settled with nothing left in flight.
    CascadeComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscribers = Vec<(SubscriberId, mpsc::UnboundedSender<BoardEvent>)>;

#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Subscribers>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers().push((id, tx));
        Subscription {
            id,
            rx,
            bus: self.clone(),
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers().retain(|(sid, _)| *sid != id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    /// Deliver to every live subscriber; closed queues are pruned.
    pub fn emit(&self, event: BoardEvent) {
        self.subscribers()
            .retain(|(_, tx)| tx.send(event).is_ok());
    }
}

/// A registered consumer. Unsubscribes on drop.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<BoardEvent>,
    bus: EventBus,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub async fn recv(&mut self) -> Option<BoardEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<BoardEvent> {
        self.rx.try_recv().ok()
    }

    /// Everything queued right now.
    pub fn drain(&mut self) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}
