//! Results-changed notifications
//!
//! A payload-free signal from the sampling thread to any number of
//! consumers. Each subscriber owns a one-slot crossbeam channel: if the slot
//! is still full when the next signal arrives the consumer has not re-read
//! state yet, so the new signal is folded into the pending one.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::{Arc, Mutex};

/// Fan-out of "state may have changed" signals
#[derive(Clone, Default)]
pub struct NotificationHub {
    subscribers: Arc<Mutex<Vec<Sender<()>>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer. Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> Receiver<()> {
        let (tx, rx) = bounded(1);
        self.lock().push(tx);
        rx
    }

    /// Signal every live subscriber without blocking
    pub fn notify(&self) {
        self.lock().retain(|tx| match tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<()>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_coalesce_per_subscriber() {
        let hub = NotificationHub::new();
        let rx = hub.subscribe();

        hub.notify();
        hub.notify();
        hub.notify();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_every_subscriber_is_signalled() {
        let hub = NotificationHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();

        hub.notify();

        assert!(a.try_recv().is_ok());
        assert!(b.try_recv().is_ok());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let hub = NotificationHub::new();
        let kept = hub.subscribe();
        drop(hub.subscribe());
        assert_eq!(hub.subscriber_count(), 2);

        hub.notify();

        assert_eq!(hub.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
