//! Check progress reporting.

use std::time::{Duration, Instant};

/// Progress information during a link check.
#[derive(Debug, Clone)]
pub struct CheckProgress {
    /// Number of URLs probed so far.
    pub checked: usize,
    /// Number of URLs selected for probing.
    pub total: usize,
    /// Number of broken links found so far.
    pub broken: usize,
    /// URL whose result arrived last.
    pub current_url: String,
    /// Time elapsed since the run started.
    pub elapsed: Duration,
}

impl CheckProgress {
    /// Create initial progress state.
    pub fn new(total: usize) -> Self {
        Self {
            checked: 0,
            total,
            broken: 0,
            current_url: String::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Fraction of URLs already probed, between 0 and 1.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.checked as f64 / self.total as f64
        }
    }

    /// Probe rate in URLs per second.
    pub fn urls_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.checked as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Check if every selected URL has been probed.
    pub fn is_complete(&self) -> bool {
        self.checked >= self.total
    }
}

impl Default for CheckProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    total: usize,
    checked: usize,
    broken: usize,
    current_url: String,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            start_time: Instant::now(),
            total,
            checked: 0,
            broken: 0,
            current_url: String::new(),
        }
    }

    pub fn record(&mut self, url: &str, broken: bool) {
        self.checked += 1;
        if broken {
            self.broken += 1;
        }
        self.current_url.clear();
        self.current_url.push_str(url);
    }

    pub fn snapshot(&self) -> CheckProgress {
        CheckProgress {
            checked: self.checked,
            total: self.total,
            broken: self.broken,
            current_url: self.current_url.clone(),
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_snapshot() {
        let mut tracker = ProgressTracker::new(3);
        tracker.record("https://a.example", false);
        tracker.record("https://b.example", true);

        let progress = tracker.snapshot();
        assert_eq!(progress.checked, 2);
        assert_eq!(progress.broken, 1);
        assert_eq!(progress.current_url, "https://b.example");
        assert!(!progress.is_complete());
        assert!((progress.fraction() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_run_is_complete() {
        let progress = CheckProgress::default();
        assert!(progress.is_complete());
        assert_eq!(progress.fraction(), 1.0);
    }
}
