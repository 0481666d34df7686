/// Per-position verdict for a reference character against the live input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Pending,
}

/// Full classification of the reference text against one input snapshot.
///
/// Recomputed from scratch on every input event. `states` always has one
/// entry per reference character; `total_chars` tracks the raw input length,
/// which may exceed the reference length.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub states: Vec<CharState>,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub total_chars: usize,
}

impl Classification {
    /// The session is complete only when the input covers the whole
    /// reference and every scored position matched.
    pub fn is_complete(&self) -> bool {
        self.total_chars == self.states.len()
            && self.states.iter().all(|s| *s == CharState::Correct)
    }
}

/// Classify every reference position against the input.
///
/// Positions past the end of the input are Pending. Input past the end of
/// the reference is not scored at all, but still counts toward
/// `total_chars` (and therefore lowers accuracy).
pub fn classify(reference: &str, input: &str) -> Classification {
    let typed: Vec<char> = input.chars().collect();

    let mut correct_chars = 0;
    let mut incorrect_chars = 0;

    let states = reference
        .chars()
        .enumerate()
        .map(|(idx, expected)| match typed.get(idx) {
            Some(c) if *c == expected => {
                correct_chars += 1;
                CharState::Correct
            }
            Some(_) => {
                incorrect_chars += 1;
                CharState::Incorrect
            }
            None => CharState::Pending,
        })
        .collect();

    Classification {
        states,
        correct_chars,
        incorrect_chars,
        total_chars: typed.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let c = classify("cat", "cat");
        assert_eq!(
            c.states,
            vec![CharState::Correct, CharState::Correct, CharState::Correct]
        );
        assert_eq!(c.correct_chars, 3);
        assert_eq!(c.incorrect_chars, 0);
        assert_eq!(c.total_chars, 3);
        assert!(c.is_complete());
    }

    #[test]
    fn test_single_mismatch_blocks_completion() {
        let c = classify("cat", "cut");
        assert_eq!(
            c.states,
            vec![
                CharState::Correct,
                CharState::Incorrect,
                CharState::Correct
            ]
        );
        assert_eq!(c.correct_chars, 2);
        assert_eq!(c.incorrect_chars, 1);
        assert!(!c.is_complete());
    }

    #[test]
    fn test_empty_input_is_all_pending() {
        let c = classify("hello", "");
        assert_eq!(c.states, vec![CharState::Pending; 5]);
        assert_eq!(c.correct_chars, 0);
        assert_eq!(c.incorrect_chars, 0);
        assert_eq!(c.total_chars, 0);
        assert!(!c.is_complete());
    }

    #[test]
    fn test_partial_input() {
        let c = classify("hello", "hel");
        assert_eq!(
            c.states,
            vec![
                CharState::Correct,
                CharState::Correct,
                CharState::Correct,
                CharState::Pending,
                CharState::Pending
            ]
        );
        assert_eq!(c.total_chars, 3);
        assert!(!c.is_complete());
    }

    #[test]
    fn test_counters_cover_input_exactly_when_not_overlong() {
        let cases = [("hello", ""), ("hello", "h"), ("hello", "hxl"), ("hello", "hello")];
        for (reference, input) in cases {
            let c = classify(reference, input);
            assert_eq!(
                c.correct_chars + c.incorrect_chars,
                input.chars().count(),
                "reference={reference:?} input={input:?}"
            );
        }
    }

    #[test]
    fn test_overlong_input_not_scored_but_counted() {
        let c = classify("hi", "hixyz");
        assert_eq!(c.states, vec![CharState::Correct, CharState::Correct]);
        assert_eq!(c.correct_chars, 2);
        assert_eq!(c.incorrect_chars, 0);
        assert_eq!(c.total_chars, 5);
        // Both positions matched but the lengths differ, so not complete.
        assert!(!c.is_complete());
    }

    #[test]
    fn test_classification_length_matches_reference() {
        for input in ["", "x", "quick", "quick brown fox and then some"] {
            let c = classify("quick brown fox", input);
            assert_eq!(c.states.len(), "quick brown fox".chars().count());
        }
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let a = classify("some text", "some txt");
        let b = classify("some text", "some txt");
        assert_eq!(a, b);
    }

    #[test]
    fn test_deletion_recomputes_without_drift() {
        // Simulates typing ahead and then backspacing: each snapshot is
        // classified independently, so counters never drift.
        let after_typing = classify("cat", "cut");
        assert_eq!(after_typing.incorrect_chars, 1);

        let after_backspace = classify("cat", "c");
        assert_eq!(after_backspace.incorrect_chars, 0);
        assert_eq!(after_backspace.correct_chars, 1);
        assert_eq!(after_backspace.total_chars, 1);
    }

    #[test]
    fn test_multibyte_chars_compare_per_char() {
        let c = classify("café", "café");
        assert!(c.is_complete());
        assert_eq!(c.total_chars, 4);

        let c = classify("café", "cafe");
        assert_eq!(c.states[3], CharState::Incorrect);
    }

    #[test]
    fn test_empty_reference() {
        let c = classify("", "");
        assert!(c.states.is_empty());
        assert!(c.is_complete());

        let c = classify("", "x");
        assert_eq!(c.total_chars, 1);
        assert!(!c.is_complete());
    }
}
