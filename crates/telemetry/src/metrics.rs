//! In-process metrics: counters, gauges and duration histograms.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Samples kept per histogram; older samples are dropped first.
pub const HISTOGRAM_WINDOW: usize = 1024;

/// Process-wide metrics store.
///
/// Lock poisoning is ignored; a metric write never panics the caller.
pub struct MetricsRegistry {
    enabled: AtomicBool,
    counters: RwLock<HashMap<String, AtomicU64>>,
    gauges: RwLock<HashMap<String, AtomicU64>>,
    histograms: RwLock<HashMap<String, VecDeque<f64>>>,
    histogram_window: usize,
    start_time: Instant,
}

impl MetricsRegistry {
    pub(crate) fn new() -> Self {
        Self::with_histogram_window(HISTOGRAM_WINDOW)
    }

    pub(crate) fn with_histogram_window(window: usize) -> Self {
        Self {
            enabled: AtomicBool::new(true),
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            histogram_window: window.max(1),
            start_time: Instant::now(),
        }
    }

    /// Turn recording on or off. Reads are unaffected.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Increment a counter by one.
    pub fn increment(&self, name: &str) {
        self.increment_by(name, 1);
    }

    /// Increment a counter.
    pub fn increment_by(&self, name: &str, value: u64) {
        if !self.enabled() {
            return;
        }
        {
            let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(counter) = counters.get(name) {
                counter.fetch_add(value, Ordering::Relaxed);
                return;
            }
        }
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }

    /// Current counter value; zero if never incremented.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Set a gauge.
    pub fn gauge(&self, name: &str, value: u64) {
        if !self.enabled() {
            return;
        }
        self.gauges
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .store(value, Ordering::Relaxed);
    }

    /// Record one histogram sample, evicting the oldest once the window is full.
    pub fn histogram(&self, name: &str, value: f64) {
        if !self.enabled() {
            return;
        }
        let mut histograms = self.histograms.write().unwrap_or_else(PoisonError::into_inner);
        let samples = histograms.entry(name.to_string()).or_default();
        if samples.len() >= self.histogram_window {
            samples.pop_front();
        }
        samples.push_back(value);
    }

    /// Summary of the most recent samples of one histogram, if any.
    pub fn histogram_stats(&self, name: &str) -> Option<HistogramStats> {
        self.histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .and_then(|v| HistogramStats::from_values(v))
    }

    /// Seconds since the registry was created.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Everything recorded so far, with sorted keys.
    pub fn export_json(&self) -> serde_json::Value {
        let counters: BTreeMap<String, u64> = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();
        let gauges: BTreeMap<String, u64> = self
            .gauges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();
        let histograms: BTreeMap<String, HistogramStats> = self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|(k, v)| HistogramStats::from_values(v).map(|s| (k.clone(), s)))
            .collect();

        serde_json::json!({
            "session_id": crate::session_id(),
            "uptime_secs": self.uptime_secs(),
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }
}

/// Histogram summary in the units recorded (milliseconds for timers).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
}

impl HistogramStats {
    fn from_values<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().copied().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();

        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sorted.iter().sum::<f64>() / count as f64,
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
        })
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Records its lifetime into the global registry as a histogram sample.
///
/// The sample is written once, by `stop` or on drop.
pub struct Timer {
    name: &'static str,
    start: Instant,
    recorded: bool,
}

impl Timer {
    /// Start timing `name`.
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
            recorded: false,
        }
    }

    /// Stop and record.
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let duration = self.start.elapsed();
        if !self.recorded {
            self.recorded = true;
            crate::metrics().histogram(self.name, duration.as_secs_f64() * 1000.0);
            tracing::trace!(metric = self.name, duration_ms = duration.as_millis() as u64, "Timer completed");
        }
        duration
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.record();
    }
}
