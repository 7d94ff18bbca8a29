//! Metrics collection using Prometheus
//!
//! Metrics for the two halves of the crate: queue activity (tickets,
//! matches, wait times) and rating calculations.

use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the rating and matchmaking core
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,
    queue_metrics: QueueMetrics,
    rating_metrics: RatingMetrics,
}

/// Queue-related metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Total tickets admitted, by mode
    pub tickets_enqueued_total: IntCounterVec,

    /// Total tickets withdrawn before matching, by mode
    pub tickets_withdrawn_total: IntCounterVec,

    /// Total matches formed, by mode
    pub matches_formed_total: IntCounterVec,

    /// Tickets currently waiting, by mode
    pub queue_depth: IntGaugeVec,

    /// Wait time of tickets at the moment they matched, by mode
    pub matched_wait_seconds: HistogramVec,
}

/// Rating calculation metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Total rating updates, by system (elo, glicko2, multiplayer)
    pub updates_total: IntCounterVec,

    /// Rating update duration
    pub update_duration_seconds: Histogram,
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let tickets_enqueued_total = IntCounterVec::new(
            Opts::new(
                "arena_ladder_tickets_enqueued_total",
                "Total tickets admitted to the queue",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(tickets_enqueued_total.clone()))?;

        let tickets_withdrawn_total = IntCounterVec::new(
            Opts::new(
                "arena_ladder_tickets_withdrawn_total",
                "Total tickets withdrawn before matching",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(tickets_withdrawn_total.clone()))?;

        let matches_formed_total = IntCounterVec::new(
            Opts::new(
                "arena_ladder_matches_formed_total",
                "Total match groups formed",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(matches_formed_total.clone()))?;

        let queue_depth = IntGaugeVec::new(
            Opts::new("arena_ladder_queue_depth", "Tickets currently waiting"),
            &["mode"],
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        let matched_wait_seconds = HistogramVec::new(
            HistogramOpts::new(
                "arena_ladder_matched_wait_seconds",
                "Ticket wait time at the moment of matching",
            )
            .buckets(vec![1.0, 5.0, 10.0, 20.0, 40.0, 60.0, 120.0, 300.0]),
            &["mode"],
        )?;
        registry.register(Box::new(matched_wait_seconds.clone()))?;

        Ok(Self {
            tickets_enqueued_total,
            tickets_withdrawn_total,
            matches_formed_total,
            queue_depth,
            matched_wait_seconds,
        })
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let updates_total = IntCounterVec::new(
            Opts::new(
                "arena_ladder_rating_updates_total",
                "Total rating updates by system",
            ),
            &["system"],
        )?;
        registry.register(Box::new(updates_total.clone()))?;

        let update_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "arena_ladder_rating_update_duration_seconds",
                "Time spent in rating calculations",
            )
            .buckets(vec![1e-6, 1e-5, 1e-4, 1e-3, 1e-2]),
        )?;
        registry.register(Box::new(update_duration_seconds.clone()))?;

        Ok(Self {
            updates_total,
            update_duration_seconds,
        })
    }
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector on an existing registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let queue_metrics = QueueMetrics::new(&registry)?;
        let rating_metrics = RatingMetrics::new(&registry)?;

        Ok(Self {
            registry,
            queue_metrics,
            rating_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    /// Record a ticket admission
    pub fn record_enqueue(&self, mode: &str) {
        self.queue_metrics
            .tickets_enqueued_total
            .with_label_values(&[mode])
            .inc();
    }

    /// Record a withdrawal
    pub fn record_withdraw(&self, mode: &str) {
        self.queue_metrics
            .tickets_withdrawn_total
            .with_label_values(&[mode])
            .inc();
    }

    /// Record a formed match and the wait its tickets accumulated
    pub fn record_match_formed(&self, mode: &str, wait_times: &[Duration]) {
        self.queue_metrics
            .matches_formed_total
            .with_label_values(&[mode])
            .inc();

        for wait in wait_times {
            self.queue_metrics
                .matched_wait_seconds
                .with_label_values(&[mode])
                .observe(wait.as_secs_f64());
        }
    }

    /// Update the waiting-ticket gauge for a mode
    pub fn set_queue_depth(&self, mode: &str, depth: usize) {
        self.queue_metrics
            .queue_depth
            .with_label_values(&[mode])
            .set(depth as i64);
    }

    /// Record one rating update and its duration
    pub fn record_rating_update(&self, system: &str, duration: Duration) {
        self.rating_metrics
            .updates_total
            .with_label_values(&[system])
            .inc();
        self.rating_metrics
            .update_duration_seconds
            .observe(duration.as_secs_f64());
    }
}
