/// Per-run API call accounting
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counts every request attempt handed to the transport, retries included.
/// Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct ApiCallCounter {
    calls: Arc<AtomicU64>,
}

impl ApiCallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.calls.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_count() {
        let counter = ApiCallCounter::new();
        let other = counter.clone();
        counter.increment();
        other.increment();
        assert_eq!(counter.get(), 2);
    }
}
