//! Timing utilities

use std::time::{Duration, Instant};
use tracing::debug;

/// Timer for measuring execution time
#[derive(Debug)]
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Stop and log the timer
    pub fn stop(self) -> Duration {
        let elapsed = self.start.elapsed();
        debug!(
            timer = %self.name,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "timer stopped"
        );
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_monotonic() {
        let timer = Timer::start("explain");
        let first = timer.elapsed_ms();
        let second = timer.elapsed_ms();
        assert!(second >= first);
        assert!(timer.stop() >= Duration::ZERO);
    }
}
