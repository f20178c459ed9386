use std::sync::atomic::{AtomicU64, Ordering};

/// Number of successful invocations served by one execution environment.
///
/// Owned by whoever hosts the handler and passed in by reference; nothing is
/// persisted across cold starts.
#[derive(Debug, Default)]
pub struct InvocationCounter {
    count: AtomicU64,
}

impl InvocationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Records one invocation and returns the count before it was recorded.
    pub fn record(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn record_returns_previous_count() {
        let counter = InvocationCounter::new();

        assert_eq!(counter.record(), 0);
        assert_eq!(counter.record(), 1);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let counter = Arc::new(InvocationCounter::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..250 {
                        counter.record();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker thread should not panic");
        }

        assert_eq!(counter.current(), 1_000);
    }
}
