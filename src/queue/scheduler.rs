//! Periodic queue polling
//!
//! The queue itself never blocks; this module supplies the fixed-tick
//! driver the design calls for. One tokio task per mode polls
//! `pop_match` on an interval, drains every formable group, and hands
//! them to a [`MatchSink`]. Modes stay independent: each task only
//! touches its own mode's pool.

use crate::error::{LadderError, Result};
use crate::queue::matchmaker::MatchmakingQueue;
use crate::types::{GameMode, MatchGroup};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Receiver of fully formed match groups
#[async_trait]
pub trait MatchSink: Send + Sync {
    async fn deliver(&self, group: MatchGroup) -> Result<()>;
}

/// Sink that forwards groups over a tokio channel
pub struct ChannelMatchSink {
    sender: mpsc::Sender<MatchGroup>,
}

impl ChannelMatchSink {
    /// Create a sink plus the receiving end for the caller
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MatchGroup>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl MatchSink for ChannelMatchSink {
    async fn deliver(&self, group: MatchGroup) -> Result<()> {
        self.sender
            .send(group)
            .await
            .map_err(|_| LadderError::InternalError {
                message: "match group receiver dropped".to_string(),
            })?;
        Ok(())
    }
}

/// Configuration for the queue scheduler
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Poll interval per mode in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(LadderError::ConfigurationError {
                message: "tick_interval_ms must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Drives per-mode polling tasks over a shared queue
pub struct QueueScheduler {
    queue: Arc<MatchmakingQueue>,
    sink: Arc<dyn MatchSink>,
    config: SchedulerConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl QueueScheduler {
    pub fn new(
        queue: Arc<MatchmakingQueue>,
        sink: Arc<dyn MatchSink>,
        config: SchedulerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            queue,
            sink,
            config,
            shutdown_tx,
        })
    }

    /// Start the polling task for one mode.
    ///
    /// Every tick drains the mode: `pop_match` runs until it reports no
    /// match, and each group goes to the sink. A delivery failure ends
    /// the tick's drain but never the task.
    pub fn spawn_mode(&self, mode: impl Into<GameMode>, required_size: usize) -> JoinHandle<()> {
        let mode = mode.into();
        let queue = self.queue.clone();
        let sink = self.sink.clone();
        let tick = Duration::from_millis(self.config.tick_interval_ms);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            info!(mode = %mode, required_size, "queue polling started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!(mode = %mode, "queue polling stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        Self::drain_mode(&queue, &sink, &mode, required_size).await;
                    }
                }
            }
        })
    }

    async fn drain_mode(
        queue: &MatchmakingQueue,
        sink: &Arc<dyn MatchSink>,
        mode: &str,
        required_size: usize,
    ) {
        loop {
            match queue.pop_match(mode, required_size) {
                Ok(Some(group)) => {
                    if let Err(e) = sink.deliver(group).await {
                        warn!(mode, error = %e, "match delivery failed, ending drain");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!(mode, error = %e, "queue scan failed");
                    break;
                }
            }
        }
    }

    /// Signal every polling task to stop
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::policy::BestPairPolicy;
    use crate::queue::ticket::MatchTicket;
    use tokio::time::timeout;

    fn fast_scheduler(
        queue: Arc<MatchmakingQueue>,
    ) -> (QueueScheduler, mpsc::Receiver<MatchGroup>) {
        let (sink, receiver) = ChannelMatchSink::new(16);
        let scheduler = QueueScheduler::new(
            queue,
            Arc::new(sink),
            SchedulerConfig {
                tick_interval_ms: 10,
            },
        )
        .unwrap();
        (scheduler, receiver)
    }

    #[tokio::test]
    async fn test_scheduler_delivers_matches() {
        let queue = Arc::new(MatchmakingQueue::new());
        queue.set_mode_policy("ranked_1v1", Arc::new(BestPairPolicy::default()));
        let (scheduler, mut receiver) = fast_scheduler(queue.clone());

        let handle = scheduler.spawn_mode("ranked_1v1", 2);

        queue
            .enqueue(MatchTicket::new("p1", 1500.0, "ranked_1v1", 20))
            .unwrap();
        queue
            .enqueue(MatchTicket::new("p2", 1520.0, "ranked_1v1", 20))
            .unwrap();

        let group = timeout(Duration::from_secs(2), receiver.recv())
            .await
            .expect("scheduler should deliver in time")
            .expect("channel open");

        assert_eq!(group.len(), 2);
        assert_eq!(queue.queue_size("ranked_1v1"), 0);

        scheduler.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_scheduler_drains_all_groups_without_duplicates() {
        let queue = Arc::new(MatchmakingQueue::new());
        queue.set_mode_policy("ranked_1v1", Arc::new(BestPairPolicy::default()));
        let (scheduler, mut receiver) = fast_scheduler(queue.clone());

        for (id, rating) in [("a", 1500.0), ("b", 1505.0), ("c", 1495.0), ("d", 1502.0)] {
            queue
                .enqueue(MatchTicket::new(id, rating, "ranked_1v1", 20))
                .unwrap();
        }

        let handle = scheduler.spawn_mode("ranked_1v1", 2);

        let mut players = Vec::new();
        for _ in 0..2 {
            let group = timeout(Duration::from_secs(2), receiver.recv())
                .await
                .expect("scheduler should deliver in time")
                .expect("channel open");
            players.extend(group.player_ids());
        }

        players.sort();
        players.dedup();
        assert_eq!(players.len(), 4);

        scheduler.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_polling() {
        let queue = Arc::new(MatchmakingQueue::new());
        let (scheduler, _receiver) = fast_scheduler(queue);

        let handle = scheduler.spawn_mode("party_4p", 4);
        scheduler.shutdown();

        timeout(Duration::from_secs(2), handle)
            .await
            .expect("task should stop after shutdown")
            .unwrap();
    }

    #[test]
    fn test_scheduler_config_validation() {
        assert!(SchedulerConfig::default().validate().is_ok());
        assert!(SchedulerConfig {
            tick_interval_ms: 0
        }
        .validate()
        .is_err());
    }
}
