//! Lightweight performance aggregation utilities.
//!
//! Coarse timings and counters for the audio pipeline, printed as an
//! end-of-run summary when the CLI runs with `--verbose`.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    Duration,
    Counter,
}

/// Named metrics tracked by the perf collector.
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum Metric {
    Decode,
    Encode,
    Validate,
    Normalize,
    Resample,
    EngineSynthesize,
    DecodedFrames,
    EngineCalls,
}

impl Metric {
    const COUNT: usize = 8;

    const ALL: [Metric; Metric::COUNT] = [
        Metric::Decode,
        Metric::Encode,
        Metric::Validate,
        Metric::Normalize,
        Metric::Resample,
        Metric::EngineSynthesize,
        Metric::DecodedFrames,
        Metric::EngineCalls,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Metric::Decode => "audio.decode",
            Metric::Encode => "audio.encode",
            Metric::Validate => "gate.validate",
            Metric::Normalize => "normalizer.normalize",
            Metric::Resample => "audio.resample",
            Metric::EngineSynthesize => "engine.synthesize",
            Metric::DecodedFrames => "audio.decoded_frames",
            Metric::EngineCalls => "engine.calls",
        }
    }

    fn kind(self) -> MetricKind {
        match self {
            Metric::DecodedFrames | Metric::EngineCalls => MetricKind::Counter,
            _ => MetricKind::Duration,
        }
    }
}

struct PerfCollector {
    start: Instant,
    totals_us: [AtomicU64; Metric::COUNT],
    counts: [AtomicU64; Metric::COUNT],
}

impl PerfCollector {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            totals_us: std::array::from_fn(|_| AtomicU64::new(0)),
            counts: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    fn add_duration(&self, metric: Metric, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        let index = metric.index();
        self.totals_us[index].fetch_add(micros, Ordering::Relaxed);
        self.counts[index].fetch_add(1, Ordering::Relaxed);
    }

    fn add_count(&self, metric: Metric, delta: u64) {
        self.counts[metric.index()].fetch_add(delta, Ordering::Relaxed);
    }
}

static COLLECTOR: OnceLock<PerfCollector> = OnceLock::new();

fn collector() -> &'static PerfCollector {
    COLLECTOR.get_or_init(PerfCollector::new)
}

/// A RAII timer that records its duration when dropped.
pub struct PerfSpan {
    metric: Metric,
    start: Instant,
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        collector().add_duration(self.metric, self.start.elapsed());
    }
}

/// Begin a named timing span.
pub fn span(metric: Metric) -> PerfSpan {
    PerfSpan {
        metric,
        start: Instant::now(),
    }
}

/// Record a counter delta for a named metric.
pub fn add_count(metric: Metric, delta: u64) {
    collector().add_count(metric, delta);
}

/// Format a report of all collected metrics.
pub fn report() -> String {
    let collector = collector();
    let mut output = String::new();
    let _ = writeln!(
        &mut output,
        "Performance summary (uptime: {:.3}s)",
        collector.start.elapsed().as_secs_f64()
    );

    let mut rows = 0;
    for metric in Metric::ALL {
        let total_us = collector.totals_us[metric.index()].load(Ordering::Relaxed);
        let count = collector.counts[metric.index()].load(Ordering::Relaxed);
        if count == 0 {
            continue;
        }
        rows += 1;
        match metric.kind() {
            MetricKind::Duration => {
                let avg_ms = total_us as f64 / count as f64 / 1000.0;
                let _ = writeln!(
                    &mut output,
                    "  {:<24} {:>10.3}s {:>6} {:>10.3}ms",
                    metric.name(),
                    total_us as f64 / 1_000_000.0,
                    count,
                    avg_ms
                );
            }
            MetricKind::Counter => {
                let _ = writeln!(&mut output, "  {:<24} {}", metric.name(), count);
            }
        }
    }
    if rows == 0 {
        let _ = writeln!(&mut output, "No performance data recorded.");
    }
    output
}
