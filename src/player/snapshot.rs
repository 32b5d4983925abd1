//! Polling adapter for transports that expose state instead of events.
//!
//! A [`SnapshotSource`] is sampled on a fixed interval and every change is
//! translated into the same [`PlayerEvent`]s a push-based transport emits.

use crate::app::events::{Event, PlayerEvent};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransportSnapshot {
    pub position: f64,
    pub duration: f64,
    pub paused: bool,
    pub ended: bool,
}

pub trait SnapshotSource: Send + Sync + 'static {
    /// Current state, `None` while the transport is unavailable
    fn snapshot(&self) -> Option<TransportSnapshot>;
}

/// Snapshot written by a backend and read by the polling feed
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot(Arc<Mutex<TransportSnapshot>>);

impl SharedSnapshot {
    pub fn update(&self, f: impl FnOnce(&mut TransportSnapshot)) {
        if let Ok(mut s) = self.0.lock() {
            f(&mut s);
        }
    }
}

impl SnapshotSource for SharedSnapshot {
    fn snapshot(&self) -> Option<TransportSnapshot> {
        self.0.lock().ok().map(|s| *s)
    }
}

/// Events implied by going from `prev` to `next`.
pub fn diff(prev: Option<TransportSnapshot>, next: TransportSnapshot) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    let prev_paused = prev.map(|p| p.paused);
    if prev_paused != Some(next.paused) {
        events.push(if next.paused {
            PlayerEvent::Paused
        } else {
            PlayerEvent::Started
        });
    }
    if prev.map(|p| p.duration) != Some(next.duration) {
        events.push(PlayerEvent::Duration {
            seconds: next.duration,
        });
    }
    if prev.map(|p| p.position) != Some(next.position) {
        events.push(PlayerEvent::Position {
            seconds: next.position,
        });
    }
    if next.ended && !prev.is_some_and(|p| p.ended) {
        events.push(PlayerEvent::Ended);
    }
    events
}

pub fn spawn_feed<S: SnapshotSource>(
    source: Arc<S>,
    every: Duration,
    tx: mpsc::Sender<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        let mut last = None;
        loop {
            ticker.tick().await;
            let Some(now) = source.snapshot() else {
                continue;
            };
            for ev in diff(last, now) {
                if tx.send(Event::Player(ev)).await.is_err() {
                    return;
                }
            }
            last = Some(now);
        }
    })
}
