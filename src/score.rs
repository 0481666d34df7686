use std::time::Duration;

/// Point-in-time score for a session. Never cached across input events;
/// callers recompute whenever counters or elapsed time change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreResult {
    pub wpm: f64,
    pub accuracy: f64,
}

impl ScoreResult {
    pub const ZERO: ScoreResult = ScoreResult {
        wpm: 0.0,
        accuracy: 0.0,
    };
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Standard convention: one word is 5 correct characters.
const CHARS_PER_WORD: f64 = 5.0;

/// Compute wpm and accuracy from session counters.
///
/// `elapsed` is None when the session never started. Zero elapsed time and
/// zero typed characters both resolve to a 0 sentinel rather than letting
/// NaN or Infinity reach the display layer.
pub fn compute(correct_chars: usize, total_chars: usize, elapsed: Option<Duration>) -> ScoreResult {
    let wpm = match elapsed {
        Some(e) if e.as_secs_f64() > 0.0 => {
            let minutes = e.as_secs_f64() / 60.0;
            (correct_chars as f64 / CHARS_PER_WORD) / minutes
        }
        _ => 0.0,
    };

    let accuracy = if total_chars > 0 {
        round2((correct_chars as f64 / total_chars as f64) * 100.0)
    } else {
        0.0
    };

    ScoreResult { wpm, accuracy }
}
