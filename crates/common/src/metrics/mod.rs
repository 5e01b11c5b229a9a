//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ECE-Vision Hub metrics
pub const METRICS_PREFIX: &str = "ecevision";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.075,  // 75ms
    0.100,  // 100ms
    0.150,  // 150ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Domain metrics
    describe_counter!(
        format!("{}_ideas_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total ideas submitted"
    );

    describe_counter!(
        format!("{}_idea_upvotes_total", METRICS_PREFIX),
        Unit::Count,
        "Total idea upvotes recorded"
    );

    describe_counter!(
        format!("{}_suggestions_total", METRICS_PREFIX),
        Unit::Count,
        "Total suggestions posted"
    );

    describe_counter!(
        format!("{}_connections_total", METRICS_PREFIX),
        Unit::Count,
        "Total follow edges created"
    );

    describe_counter!(
        format!("{}_notifications_sent_total", METRICS_PREFIX),
        Unit::Count,
        "Total notifications dispatched"
    );

    describe_counter!(
        format!("{}_moderation_actions_total", METRICS_PREFIX),
        Unit::Count,
        "Total admin moderation actions"
    );

    describe_histogram!(
        format!("{}_feed_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Merged feed assembly latency in seconds"
    );

    describe_gauge!(
        format!("{}_feed_items_count", METRICS_PREFIX),
        Unit::Count,
        "Number of items returned by the merged feed"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record an idea submission
pub fn record_idea_submitted(category: &str) {
    counter!(
        format!("{}_ideas_submitted_total", METRICS_PREFIX),
        "category" => category.to_string()
    )
    .increment(1);
}

/// Helper to record an idea upvote
pub fn record_idea_upvote() {
    counter!(format!("{}_idea_upvotes_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record a posted suggestion
pub fn record_suggestion() {
    counter!(format!("{}_suggestions_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record a new follow edge
pub fn record_connection() {
    counter!(format!("{}_connections_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record a dispatched notification
pub fn record_notification(broadcast: bool) {
    let target = if broadcast { "broadcast" } else { "targeted" };
    counter!(
        format!("{}_notifications_sent_total", METRICS_PREFIX),
        "target" => target.to_string()
    )
    .increment(1);
}

/// Helper to record an admin moderation action
pub fn record_moderation(action: &str) {
    counter!(
        format!("{}_moderation_actions_total", METRICS_PREFIX),
        "action" => action.to_string()
    )
    .increment(1);
}

/// Helper to record feed assembly latency
pub fn record_feed(duration_secs: f64, item_count: usize) {
    histogram!(format!("{}_feed_duration_seconds", METRICS_PREFIX)).record(duration_secs);

    gauge!(format!("{}_feed_items_count", METRICS_PREFIX)).set(item_count as f64);
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    if hit {
        counter!(
            format!("{}_cache_hits_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    } else {
        counter!(
            format!("{}_cache_misses_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // P50 target (50ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.050));
        // P99 target (250ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.250));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/v1/ideas");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }
}
