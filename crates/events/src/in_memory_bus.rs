//! Process-local event bus for tests/dev.

use std::sync::{Mutex, mpsc};

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InMemoryBusError {
    /// A publisher panicked while holding the subscriber list.
    Poisoned,
}

/// Broadcast over `mpsc` channels: one sender per subscriber.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    senders: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscribers (dropped ones are pruned on the next publish).
    pub fn subscriber_count(&self) -> usize {
        self.senders.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut senders = self.senders.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        senders.retain(|tx| tx.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut senders) = self.senders.lock() {
            senders.push(tx);
        }
        Subscription::new(rx)
    }
}
