//! Periodic discovery loop.
//!
//! One timer task per source. Every tick spawns its own scan so a slow scan
//! never delays the next one; results carry the generation they were started
//! under and the session drops results from an older generation.

use super::{DiscoveryError, DiscoverySource, TrackDescriptor};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Outcome of one scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub generation: u64,
    pub folder: String,
    pub result: Result<Vec<TrackDescriptor>, DiscoveryError>,
}

#[derive(Debug, Default)]
pub struct Poller {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation; reports tagged with anything else are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel any running loop, then scan `folder` now and every `interval`.
    pub fn start<S, T, F>(
        &mut self,
        source: Arc<S>,
        folder: String,
        interval: Duration,
        tx: mpsc::Sender<T>,
        wrap: F,
    ) -> u64
    where
        S: DiscoverySource,
        T: Send + 'static,
        F: Fn(ScanReport) -> T + Send + Sync + 'static,
    {
        self.stop();
        let generation = self.generation;
        let wrap = Arc::new(wrap);

        tracing::info!(folder = %folder, interval_ms = interval.as_millis() as u64, generation, "polling started");

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(10)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                let source = Arc::clone(&source);
                let folder = folder.clone();
                let tx = tx.clone();
                let wrap = Arc::clone(&wrap);
                tokio::spawn(async move {
                    let result = source.scan(&folder).await;
                    if let Err(e) = &result {
                        tracing::debug!(folder = %folder, error = %e, "scan failed");
                    }
                    let report = ScanReport {
                        generation,
                        folder,
                        result,
                    };
                    let _ = tx.send(wrap(report)).await;
                });
            }
        }));
        generation
    }

    /// Cancel the timer. Scans already in flight finish but become stale.
    pub fn stop(&mut self) {
        self.generation += 1;
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(generation = self.generation, "polling stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl DiscoverySource for CountingSource {
        async fn scan(&self, folder: &str) -> Result<Vec<TrackDescriptor>, DiscoveryError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![TrackDescriptor {
                path: format!("{folder}/{n}.mp3"),
                url: format!("{folder}/{n}.mp3"),
                lrc_url: None,
                filename: format!("{n}.mp3"),
                mtime: n as f64,
            }])
        }
    }

    #[tokio::test]
    async fn test_polls_immediately_and_repeatedly() {
        let (tx, mut rx) = mpsc::channel(16);
        let source = Arc::new(CountingSource::default());
        let mut poller = Poller::new();
        let generation = poller.start(source.clone(), "a".into(), Duration::from_millis(20), tx, |r| r);

        for _ in 0..3 {
            let report = rx.recv().await.unwrap();
            assert_eq!(report.generation, generation);
            assert_eq!(report.folder, "a");
            assert!(report.result.is_ok());
        }
        assert!(poller.is_running());
        poller.stop();
        assert!(poller.generation() > generation);
    }

    #[tokio::test]
    async fn test_restart_cancels_previous_loop() {
        let (tx, mut rx) = mpsc::channel(64);
        let source = Arc::new(CountingSource::default());
        let mut poller = Poller::new();
        let first = poller.start(source.clone(), "old".into(), Duration::from_millis(10), tx.clone(), |r| r);
        let second = poller.start(source, "new".into(), Duration::from_millis(10), tx, |r| r);
        assert_ne!(first, second);

        tokio::time::sleep(Duration::from_millis(80)).await;
        poller.stop();

        let mut fresh = 0;
        while let Ok(report) = rx.try_recv() {
            if report.generation == second {
                assert_eq!(report.folder, "new");
                fresh += 1;
            } else {
                // At most the single immediate tick of the old loop can slip through.
                assert_eq!(report.generation, first);
            }
        }
        assert!(fresh >= 2);
    }
}
