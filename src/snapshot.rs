//! Immutable snapshot publishing.
//!
//! Models publish a fresh snapshot whenever their state changes; the
//! presentation layer holds a receiver and re-renders on each message.
//! A new subscriber immediately receives the latest snapshot so it never
//! renders from a blank state.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug)]
pub struct Publisher<T> {
    latest: Option<Arc<T>>,
    subscribers: Vec<Sender<Arc<T>>>,
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self {
            latest: None,
            subscribers: Vec::new(),
        }
    }
}

impl<T> Publisher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<Arc<T>> {
        let (tx, rx) = mpsc::channel();
        if let Some(latest) = &self.latest {
            let _ = tx.send(Arc::clone(latest));
        }
        self.subscribers.push(tx);
        rx
    }

    /// Send `snapshot` to every live subscriber. Subscribers whose receiver
    /// was dropped are forgotten.
    pub fn publish(&mut self, snapshot: T) -> Arc<T> {
        let snapshot = Arc::new(snapshot);
        self.subscribers
            .retain(|tx| tx.send(Arc::clone(&snapshot)).is_ok());
        self.latest = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn latest(&self) -> Option<Arc<T>> {
        self.latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_publications() {
        let mut publisher = Publisher::new();
        let rx = publisher.subscribe();
        publisher.publish(1);
        publisher.publish(2);
        assert_eq!(*rx.try_recv().unwrap(), 1);
        assert_eq!(*rx.try_recv().unwrap(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn late_subscriber_gets_latest_only() {
        let mut publisher = Publisher::new();
        publisher.publish("old");
        publisher.publish("new");
        let rx = publisher.subscribe();
        assert_eq!(*rx.try_recv().unwrap(), "new");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut publisher = Publisher::new();
        let keep = publisher.subscribe();
        drop(publisher.subscribe());
        assert_eq!(publisher.subscriber_count(), 2);

        publisher.publish(());
        assert_eq!(publisher.subscriber_count(), 1);
        assert!(keep.try_recv().is_ok());
    }
}
