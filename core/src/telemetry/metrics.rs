use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Counters for one engine instance.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub frequency_bins: usize,
    pub bands: usize,
    pub empty_bands: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_bins(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frequency_bins += count;
        }
    }

    pub fn record_band(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.bands += 1;
        }
    }

    pub fn record_empty_band(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.bands += 1;
            metrics.empty_bands += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
