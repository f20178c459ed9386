use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// Shutdown was requested while the worker was suspended.
    Signalled,
    /// The invocation deadline arrives before the requested duration elapses.
    BudgetExhausted { budget: Duration },
}

impl std::fmt::Display for Interruption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signalled => f.write_str("suspension interrupted by shutdown signal"),
            Self::BudgetExhausted { budget } => write!(
                f,
                "invocation budget of {}ms exhausted before the requested duration",
                budget.as_millis()
            ),
        }
    }
}

impl std::error::Error for Interruption {}

pub trait Suspender {
    /// Blocks the calling thread for `duration`, waking early when the
    /// optional `budget` is shorter or when interrupted.
    fn suspend(&self, duration: Duration, budget: Option<Duration>) -> Result<(), Interruption>;
}

/// Condvar-backed sleeper that can be woken from another thread.
///
/// `interrupt` only affects suspensions that are already waiting; a
/// suspension started afterwards runs to completion.
#[derive(Debug, Default)]
pub struct InterruptibleSleeper {
    generation: Mutex<u64>,
    wake: Condvar,
}

impl InterruptibleSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        let mut generation = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *generation = generation.wrapping_add(1);
        self.wake.notify_all();
    }
}

impl Suspender for InterruptibleSleeper {
    fn suspend(&self, duration: Duration, budget: Option<Duration>) -> Result<(), Interruption> {
        let wait = budget.map_or(duration, |budget| budget.min(duration));
        let guard = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let started = *guard;
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, wait, |generation| *generation == started)
            .unwrap_or_else(PoisonError::into_inner);

        if *guard != started {
            return Err(Interruption::Signalled);
        }
        if wait < duration {
            return Err(Interruption::BudgetExhausted { budget: wait });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Instant;

    use super::*;

    #[test]
    fn sleeps_for_at_least_the_requested_duration() {
        let sleeper = InterruptibleSleeper::new();
        let started_at = Instant::now();

        sleeper
            .suspend(Duration::from_millis(25), None)
            .expect("suspension should complete");

        assert!(started_at.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn shorter_budget_ends_suspension_early() {
        let sleeper = InterruptibleSleeper::new();
        let started_at = Instant::now();

        let error = sleeper
            .suspend(Duration::from_secs(30), Some(Duration::from_millis(20)))
            .expect_err("budget should be exhausted");

        assert_eq!(
            error,
            Interruption::BudgetExhausted {
                budget: Duration::from_millis(20)
            }
        );
        assert!(started_at.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn budget_equal_to_duration_is_not_an_interruption() {
        let sleeper = InterruptibleSleeper::new();
        sleeper
            .suspend(Duration::from_millis(5), Some(Duration::from_millis(5)))
            .expect("suspension should complete within budget");
        sleeper
            .suspend(Duration::from_millis(5), Some(Duration::from_secs(5)))
            .expect("suspension should complete within budget");
    }

    #[test]
    fn interrupt_wakes_a_sleeping_thread() {
        let sleeper = InterruptibleSleeper::new();
        let done = AtomicBool::new(false);
        let started_at = Instant::now();

        let outcome = thread::scope(|scope| {
            scope.spawn(|| {
                while !done.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(10));
                    sleeper.interrupt();
                }
            });
            let outcome = sleeper.suspend(Duration::from_secs(30), None);
            done.store(true, Ordering::SeqCst);
            outcome
        });

        assert_eq!(outcome, Err(Interruption::Signalled));
        assert!(started_at.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn suspensions_started_after_an_interrupt_complete() {
        let sleeper = InterruptibleSleeper::new();
        sleeper.interrupt();

        for _ in 0..3 {
            sleeper
                .suspend(Duration::from_millis(5), None)
                .expect("later suspension should not see the old interrupt");
        }
    }
}
