use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing analytics activity.
#[derive(Default)]
pub struct AnalyticsMetrics {
    requests_served: AtomicU64,
    documents_analyzed: AtomicU64,
    records_indexed: AtomicU64,
    last_batch_size: AtomicU64,
}

impl AnalyticsMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one served request over a batch of `documents` inputs.
    pub fn record_batch(&self, documents: u64) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.documents_analyzed
            .fetch_add(documents, Ordering::Relaxed);
        self.last_batch_size.store(documents, Ordering::Relaxed);
    }

    /// Record result records persisted to the search index.
    pub fn record_indexed(&self, records: u64) {
        self.records_indexed.fetch_add(records, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_served: self.requests_served.load(Ordering::Relaxed),
            documents_analyzed: self.documents_analyzed.load(Ordering::Relaxed),
            records_indexed: self.records_indexed.load(Ordering::Relaxed),
            last_batch_size: self.last_batch_size.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of the counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    /// Analytic requests completed since startup.
    pub requests_served: u64,
    /// Documents or rows consumed across all requests.
    pub documents_analyzed: u64,
    /// Result records written to the search index.
    pub records_indexed: u64,
    /// Size of the most recent batch.
    pub last_batch_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_batches_and_index_writes() {
        let metrics = AnalyticsMetrics::new();
        metrics.record_batch(4);
        metrics.record_batch(2);
        metrics.record_indexed(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_served, 2);
        assert_eq!(snapshot.documents_analyzed, 6);
        assert_eq!(snapshot.last_batch_size, 2);
        assert_eq!(snapshot.records_indexed, 3);
    }

    #[test]
    fn fresh_counters_are_zero() {
        assert_eq!(AnalyticsMetrics::new().snapshot(), MetricsSnapshot::default());
    }
}
