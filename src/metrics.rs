//! Metrics collection for key generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks key generation metrics like cycles cut and layout cache hits.
///
/// With the `metrics` feature enabled every counter is also forwarded to the
/// `metrics` facade under the `deepkey.` prefix.
#[derive(Debug, Default)]
pub struct KeyMetrics {
    keys_generated: AtomicU64,
    cycles_detected: AtomicU64,
    objects_reflected: AtomicU64,
    opaque_values: AtomicU64,
    layout_hits: AtomicU64,
    layout_misses: AtomicU64,
}

macro_rules! forward {
    ($name:literal) => {
        #[cfg(feature = "metrics")]
        ::metrics::increment_counter!($name);
    };
}

impl KeyMetrics {
    /// Creates a new `KeyMetrics` instance with all counters set to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed key.
    pub fn record_key(&self) {
        self.keys_generated.fetch_add(1, Ordering::Relaxed);
        forward!("deepkey.keys_generated");
    }

    /// Records a cycle marker emitted in place of a revisited value.
    pub fn record_cycle(&self) {
        self.cycles_detected.fetch_add(1, Ordering::Relaxed);
        forward!("deepkey.cycles_detected");
    }

    /// Records an object decomposed field by field.
    pub fn record_reflected(&self) {
        self.objects_reflected.fetch_add(1, Ordering::Relaxed);
        forward!("deepkey.objects_reflected");
    }

    /// Records a value used through its own equality and hash.
    pub fn record_opaque(&self) {
        self.opaque_values.fetch_add(1, Ordering::Relaxed);
        forward!("deepkey.opaque_values");
    }

    /// Records a field layout served from cache.
    pub fn record_layout_hit(&self) {
        self.layout_hits.fetch_add(1, Ordering::Relaxed);
        forward!("deepkey.layout_hits");
    }

    /// Records a field layout that had to be computed.
    pub fn record_layout_miss(&self) {
        self.layout_misses.fetch_add(1, Ordering::Relaxed);
        forward!("deepkey.layout_misses");
    }

    /// Returns the number of keys generated.
    pub fn keys_generated(&self) -> u64 {
        self.keys_generated.load(Ordering::Relaxed)
    }

    /// Returns the number of cycle markers emitted.
    pub fn cycles_detected(&self) -> u64 {
        self.cycles_detected.load(Ordering::Relaxed)
    }

    /// Returns the number of objects decomposed through reflection.
    pub fn objects_reflected(&self) -> u64 {
        self.objects_reflected.load(Ordering::Relaxed)
    }

    /// Returns the number of opaque values encountered.
    pub fn opaque_values(&self) -> u64 {
        self.opaque_values.load(Ordering::Relaxed)
    }

    /// Returns the layout cache hit count.
    pub fn layout_hits(&self) -> u64 {
        self.layout_hits.load(Ordering::Relaxed)
    }

    /// Returns the layout cache miss count.
    pub fn layout_misses(&self) -> u64 {
        self.layout_misses.load(Ordering::Relaxed)
    }

    /// Returns the layout cache hit rate as a float between 0.0 and 1.0.
    pub fn layout_hit_rate(&self) -> f64 {
        let hits = self.layout_hits();
        let misses = self.layout_misses();

        if hits + misses == 0 {
            0.0
        } else {
            hits as f64 / (hits + misses) as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counting() {
        let metrics = KeyMetrics::new();

        assert_eq!(metrics.keys_generated(), 0);
        assert_eq!(metrics.cycles_detected(), 0);
        assert_eq!(metrics.objects_reflected(), 0);
        assert_eq!(metrics.opaque_values(), 0);

        metrics.record_key();
        metrics.record_cycle();
        metrics.record_reflected();
        metrics.record_opaque();

        assert_eq!(metrics.keys_generated(), 1);
        assert_eq!(metrics.cycles_detected(), 1);
        assert_eq!(metrics.objects_reflected(), 1);
        assert_eq!(metrics.opaque_values(), 1);
    }

    #[test]
    fn test_layout_hit_rate_edge_cases() {
        let metrics = KeyMetrics::new();
        assert_eq!(metrics.layout_hit_rate(), 0.0);

        metrics.record_layout_miss();
        assert_eq!(metrics.layout_hit_rate(), 0.0);

        metrics.record_layout_hit();
        assert_eq!(metrics.layout_hit_rate(), 0.5);

        let metrics = KeyMetrics::new();
        metrics.record_layout_hit();
        assert_eq!(metrics.layout_hit_rate(), 1.0);
    }
}
