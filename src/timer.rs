use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Enumerated test lengths offered to the user.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum TestDuration {
    #[strum(serialize = "1 min")]
    Min1,
    #[strum(serialize = "2 min")]
    Min2,
    #[strum(serialize = "5 min")]
    Min5,
}

impl TestDuration {
    pub fn as_secs(&self) -> u64 {
        match self {
            TestDuration::Min1 => 60,
            TestDuration::Min2 => 120,
            TestDuration::Min5 => 300,
        }
    }

    /// Cycle to the next choice (Idle-state duration key).
    pub fn next(&self) -> TestDuration {
        match self {
            TestDuration::Min1 => TestDuration::Min2,
            TestDuration::Min2 => TestDuration::Min5,
            TestDuration::Min5 => TestDuration::Min1,
        }
    }
}

impl Default for TestDuration {
    fn default() -> Self {
        TestDuration::Min2
    }
}

/// One-shot countdown with 1-second tick granularity.
///
/// Does nothing until started; after expiry or cancellation further ticks
/// are no-ops, so the expiry signal fires at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    duration_secs: u64,
    remaining_secs: u64,
    running: bool,
}

impl Countdown {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            running: false,
        }
    }

    /// Re-entrant: starting an already-running countdown is a no-op.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Advance one second. Returns true exactly once, on the tick that
    /// reaches zero; the countdown stops itself at that point.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Idempotent: cancelling a stopped countdown is a no-op.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Remaining time as `M:SS`, seconds zero-padded.
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}
