//! Fan-out of committed events to downstream consumers.
//!
//! ```text
//! Load events appended → EventBus::publish_all → Subscription
//!                                                 ├─ stock reservation
//!                                                 └─ picking UI
//! ```
//!
//! Delivery is at-least-once: publication happens after the append, so a
//! failed publish is repeated from the store and consumers skip envelopes
//! whose `event_id` they have already handled.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// Receiving end of a subscription. Sees every message published after it
/// was created, in publication order.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block for the next message; `None` once the bus is gone.
    pub fn wait(&self) -> Option<M> {
        self.receiver.recv().ok()
    }

    /// Next message if one is buffered.
    pub fn poll(&self) -> Option<M> {
        match self.receiver.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<M> {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Everything currently buffered, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;

    /// Publish in order, stopping at the first failure. On error, returns
    /// how many messages went out before it.
    fn publish_all<I>(&self, messages: I) -> Result<usize, (usize, Self::Error)>
    where
        I: IntoIterator<Item = M>,
        Self: Sized,
    {
        let mut sent = 0;
        for message in messages {
            self.publish(message).map_err(|e| (sent, e))?;
            sent += 1;
        }
        Ok(sent)
    }
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
