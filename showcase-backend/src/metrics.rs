//! Tier operation metrics.
//!
//! Enable the `metrics` feature to record:
//!
//! - `showcase_cache_reads_total` - reads per backend, labelled by `result`
//!   (`hit`, `miss`, `error`)
//! - `showcase_cache_writes_total` - writes per backend, labelled by `result`
//!   (`ok`, `error`)
//!
//! Without the feature every function here is a no-op.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Metric name for the tier read counter.
    pub static ref CACHE_READS: &'static str = {
        metrics::describe_counter!(
            "showcase_cache_reads_total",
            "Showcase cache tier reads by backend and result."
        );
        "showcase_cache_reads_total"
    };

    /// Metric name for the tier write counter.
    pub static ref CACHE_WRITES: &'static str = {
        metrics::describe_counter!(
            "showcase_cache_writes_total",
            "Showcase cache tier writes by backend and result."
        );
        "showcase_cache_writes_total"
    };
}

/// Outcome of a tier read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    /// Value found and admitted.
    Hit,
    /// Nothing usable stored.
    Miss,
    /// The tier failed.
    Error,
}

impl ReadResult {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            ReadResult::Hit => "hit",
            ReadResult::Miss => "miss",
            ReadResult::Error => "error",
        }
    }
}

/// Record a tier read.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_read(backend: &str, result: ReadResult) {
    metrics::counter!(*CACHE_READS, "backend" => backend.to_string(), "result" => result.as_str())
        .increment(1);
}

/// Record a tier read (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_read(_backend: &str, _result: ReadResult) {}

/// Record a tier write.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_write(backend: &str, success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!(*CACHE_WRITES, "backend" => backend.to_string(), "result" => result)
        .increment(1);
}

/// Record a tier write (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_write(_backend: &str, _success: bool) {}
