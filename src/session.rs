use std::time::SystemTime;

use crate::compare::{classify, CharState, Classification};
use crate::score::{self, ScoreResult};
use crate::timer::{Countdown, TestDuration};

/// One-directional lifecycle of a typing attempt. No pause, no resume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Completed(EndReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    TextCompleted,
    TimeExpired,
    ManualSubmit,
}

/// Render-ready output emitted by every handler: the annotated reference
/// text, the current score, and the formatted remaining time. Pure data,
/// nothing here knows how it gets drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub chars: Vec<(char, CharState)>,
    pub score: ScoreResult,
    pub time_display: String,
    pub phase: Phase,
}

/// A typing session: owns the reference text, the live input, the countdown
/// and all counters. Built fresh for every text load; there is no reset.
#[derive(Debug)]
pub struct Session {
    reference: String,
    input: String,
    classification: Classification,
    countdown: Countdown,
    duration: TestDuration,
    started_at: Option<SystemTime>,
    phase: Phase,
    final_score: Option<ScoreResult>,
}

impl Session {
    pub fn new(reference: String, duration: TestDuration) -> Self {
        let classification = classify(&reference, "");
        Self {
            reference,
            input: String::new(),
            classification,
            countdown: Countdown::new(duration.as_secs()),
            duration,
            started_at: None,
            phase: Phase::Idle,
            final_score: None,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn duration(&self) -> TestDuration {
        self.duration
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Completed(_))
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.phase {
            Phase::Completed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Duration selection is only honored while Idle; once the countdown is
    /// live the choice is locked in.
    pub fn set_duration(&mut self, duration: TestDuration) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.duration = duration;
        self.countdown = Countdown::new(duration.as_secs());
        true
    }

    /// Input-changed handler. The first event transitions Idle to Running
    /// (timestamp recorded, countdown started); after completion the input
    /// surface is dead and events are ignored.
    pub fn on_input_changed(&mut self, new_value: &str) -> Snapshot {
        match self.phase {
            Phase::Completed(_) => return self.snapshot(),
            Phase::Idle => {
                self.started_at = Some(SystemTime::now());
                self.countdown.start();
                self.phase = Phase::Running;
            }
            Phase::Running => {}
        }

        self.input.clear();
        self.input.push_str(new_value);
        self.classification = classify(&self.reference, &self.input);

        if self.classification.is_complete() {
            self.complete(EndReason::TextCompleted);
        }

        self.snapshot()
    }

    /// One-second tick. Only a running session counts down; expiry forces
    /// completion regardless of how much text was typed.
    pub fn on_tick(&mut self) -> Snapshot {
        if self.phase == Phase::Running && self.countdown.tick() {
            self.complete(EndReason::TimeExpired);
        }
        self.snapshot()
    }

    /// Manual submit: ends the session whatever state the text is in. A
    /// submit before the first keystroke yields the zero-score sentinel.
    pub fn on_submit(&mut self) -> Snapshot {
        if !self.is_completed() {
            self.complete(EndReason::ManualSubmit);
        }
        self.snapshot()
    }

    fn complete(&mut self, reason: EndReason) {
        self.countdown.cancel();
        self.final_score = Some(self.live_score());
        self.phase = Phase::Completed(reason);
    }

    /// Score recomputed from the counters and wall clock. After completion
    /// the value frozen at transition time is returned instead.
    pub fn score(&self) -> ScoreResult {
        self.final_score.unwrap_or_else(|| self.live_score())
    }

    fn live_score(&self) -> ScoreResult {
        let elapsed = self.started_at.and_then(|t| t.elapsed().ok());
        score::compute(
            self.classification.correct_chars,
            self.classification.total_chars,
            elapsed,
        )
    }

    pub fn time_display(&self) -> String {
        self.countdown.display()
    }

    pub fn snapshot(&self) -> Snapshot {
        let chars = self
            .reference
            .chars()
            .zip(self.classification.states.iter().copied())
            .collect();
        Snapshot {
            chars,
            score: self.score(),
            time_display: self.time_display(),
            phase: self.phase,
        }
    }
}
