//! Bounded polling.
//!
//! Every waiting step (visibility and URL assertions, selector resolution)
//! goes through a [`Poller`]: check, and if the condition does not hold yet,
//! sleep one interval and check again until the deadline. The outcome is a
//! value, [`PollOutcome`], never an error; callers decide which error a
//! timeout becomes.
//!
//! ```ignore
//! let mut poller = Poller::start(&options);
//! let outcome = loop {
//!     let url = driver.current_url().await?;
//!     if url.contains("/home") {
//!         break poller.ready(url);
//!     }
//!     if !poller.next_attempt().await {
//!         break poller.timed_out(url);
//!     }
//! };
//! ```

use std::time::Duration;
use tokio::time::Instant;

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The condition held
    Ready {
        /// Value produced by the successful check
        value: T,
        /// Time spent waiting
        elapsed: Duration,
        /// Number of checks made
        attempts: u32,
    },
    /// The deadline passed first
    TimedOut {
        /// What the last check observed
        last_observed: String,
        /// Time spent waiting
        elapsed: Duration,
        /// Number of checks made
        attempts: u32,
    },
}

impl<T> PollOutcome<T> {
    /// Whether the condition held
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Number of checks made
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. } | Self::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Time spent waiting
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Ready { elapsed, .. } | Self::TimedOut { elapsed, .. } => *elapsed,
        }
    }
}

/// Deadline and pacing for one polling loop.
///
/// The first check happens immediately; [`Poller::next_attempt`] sleeps until
/// the next check is due. A check always runs at the deadline itself, so a
/// condition that becomes true exactly at the timeout still passes.
#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    start: Instant,
    deadline: Instant,
    attempts: u32,
}

impl Poller {
    /// Start the clock
    #[must_use]
    pub fn start(options: &WaitOptions) -> Self {
        let start = Instant::now();
        Self {
            interval: options.poll_interval().max(Duration::from_millis(1)),
            start,
            deadline: start + options.timeout(),
            attempts: 1,
        }
    }

    /// Sleep until the next check is due.
    ///
    /// Returns `false` once the deadline has passed and no check remains.
    pub async fn next_attempt(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.deadline {
            return false;
        }
        tokio::time::sleep_until((now + self.interval).min(self.deadline)).await;
        self.attempts += 1;
        true
    }

    /// Checks made so far
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Time since the clock started
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finish with the condition satisfied
    #[must_use]
    pub fn ready<T>(&self, value: T) -> PollOutcome<T> {
        PollOutcome::Ready {
            value,
            elapsed: self.elapsed(),
            attempts: self.attempts,
        }
    }

    /// Finish at the deadline
    #[must_use]
    pub fn timed_out<T>(&self, last_observed: impl Into<String>) -> PollOutcome<T> {
        PollOutcome::TimedOut {
            last_observed: last_observed.into(),
            elapsed: self.elapsed(),
            attempts: self.attempts,
        }
    }
}
