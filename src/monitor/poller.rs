use quotacard_core::{read_snapshot, ParseFailure, QuotaSnapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

use crate::config::Settings;

/// Message sent from poller to main loop
#[derive(Debug)]
pub enum PollMessage {
    /// Result of re-reading the snapshot file
    Snapshot(Result<QuotaSnapshot, ParseFailure>),
}

/// Periodically re-reads the collector's snapshot file
pub struct SnapshotPoller {
    data_path: PathBuf,
    interval: Duration,
    refresh: Arc<Notify>,
}

impl SnapshotPoller {
    /// Create a new poller
    pub fn new(settings: &Settings) -> Self {
        Self {
            data_path: settings.data_path.clone(),
            interval: Duration::from_millis(settings.refresh_interval_ms),
            refresh: Arc::new(Notify::new()),
        }
    }

    /// Handle that triggers an immediate re-read
    pub fn refresh_handle(&self) -> Arc<Notify> {
        self.refresh.clone()
    }

    /// Start polling in a background task
    pub fn start(self) -> mpsc::Receiver<PollMessage> {
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(async move {
            self.run(tx).await;
        });

        rx
    }

    /// Run the polling loop. The first tick fires immediately.
    async fn run(self, tx: mpsc::Sender<PollMessage>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.refresh.notified() => {
                    tracing::debug!("Manual refresh requested");
                    ticker.reset();
                }
            }

            let result = poll_once(&self.data_path).await;
            if let Err(e) = &result {
                tracing::debug!("Snapshot unavailable: {}", e);
            }

            if tx.send(PollMessage::Snapshot(result)).await.is_err() {
                break; // Receiver dropped
            }
        }
    }
}

/// Read and parse the snapshot file once, off the async workers
pub async fn poll_once(path: &Path) -> Result<QuotaSnapshot, ParseFailure> {
    let owned = path.to_path_buf();
    match tokio::task::spawn_blocking(move || read_snapshot(&owned)).await {
        Ok(result) => result,
        Err(e) => Err(ParseFailure::Unreadable {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        }),
    }
}
