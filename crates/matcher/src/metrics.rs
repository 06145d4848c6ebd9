// Callers install a global `SearchMetrics` implementation via
// [`set_search_metrics`]; every successful `Searcher::search` then reports its
// latency and counts.
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

/// Observer for completed searches.
pub trait SearchMetrics: Send + Sync {
    /// `candidates_fetched` is what the index returned after over-fetch;
    /// `hits_returned` is what survived filtering and hydration.
    fn record_search(&self, latency: Duration, candidates_fetched: usize, hits_returned: usize);
}

/// Installs (or clears, with `None`) the process-wide search observer.
pub fn set_search_metrics(recorder: Option<Arc<dyn SearchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn SearchMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn SearchMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn SearchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}
