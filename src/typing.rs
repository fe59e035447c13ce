//! Per-word typing state and the pure transitions over it.
//!
//! [`apply`] takes the current [`WordTypingState`] by value together with an
//! event and hands back the next state plus any signals the transition
//! produced. Nothing else writes to the keystroke array.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, trace};

/// Share of letters left visible by the random dictation mask.
const VISIBLE_LETTER_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeystrokeState {
    #[default]
    Untyped,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Typing,
    WrongPause,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingOptions {
    pub ignore_case: bool,
    /// Wrong keystrokes on one word before the reveal signal fires; 0 disables it.
    pub reveal_threshold: usize,
}

impl Default for TypingOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            reveal_threshold: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingEvent {
    Key { ch: char, at: DateTime<Utc> },
    PauseElapsed,
}

/// Record handed to persistence once a word is typed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub headword: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub count_input: usize,
    pub count_correct: usize,
    pub count_typo: usize,
    pub letter_time_array: Vec<i64>,
    pub letter_mistake: BTreeMap<usize, Vec<char>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongAttempt {
    pub wrong_count: usize,
    pub position: usize,
    pub observed: char,
    pub expected: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Completed(CompletionRecord),
    WrongAttempt(WrongAttempt),
    Reveal { headword: String, wrong_count: usize },
}

/// Receiver for the signals produced while typing.
pub trait SignalSink {
    fn emit(&mut self, signal: Signal);
}

impl SignalSink for Vec<Signal> {
    fn emit(&mut self, signal: Signal) {
        self.push(signal);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordTypingState {
    pub headword: String,
    expected: Vec<char>,
    pub input: String,
    pub keystrokes: Vec<KeystrokeState>,
    pub correct_count: usize,
    pub wrong_count: usize,
    /// Keystroke index to the wrong characters seen there.
    pub letter_mistake: BTreeMap<usize, Vec<char>>,
    /// Millisecond timestamps of the current streak of correct keystrokes.
    pub letter_time: Vec<i64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub phase: Phase,
    pub reveal_signalled: bool,
    pub letter_visible: Vec<bool>,
}

impl WordTypingState {
    pub fn new(
        headword: impl Into<String>,
        expected: impl IntoIterator<Item = char>,
        started_at: DateTime<Utc>,
        visibility_seed: u64,
    ) -> Self {
        let expected: Vec<char> = expected.into_iter().collect();
        let mut rng = StdRng::seed_from_u64(visibility_seed);
        let letter_visible = expected
            .iter()
            .map(|_| rng.gen_bool(VISIBLE_LETTER_RATIO))
            .collect();

        Self {
            headword: headword.into(),
            keystrokes: vec![KeystrokeState::Untyped; expected.len()],
            expected,
            input: String::new(),
            correct_count: 0,
            wrong_count: 0,
            letter_mistake: BTreeMap::new(),
            letter_time: Vec::new(),
            started_at,
            ended_at: None,
            phase: Phase::Idle,
            reveal_signalled: false,
            letter_visible,
        }
    }

    /// Placeholder used before any word is presented, or for a word that
    /// could not be read. It never finishes.
    pub fn empty() -> Self {
        Self::new("", std::iter::empty(), Utc::now(), 0)
    }

    pub fn cursor(&self) -> usize {
        self.input.chars().count()
    }

    pub fn total(&self) -> usize {
        self.expected.len()
    }

    pub fn expected(&self) -> &[char] {
        &self.expected
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.expected.get(idx).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn has_wrong(&self) -> bool {
        self.phase == Phase::WrongPause
    }

    pub fn completion_record(&self) -> Option<CompletionRecord> {
        let time_end = self.ended_at?;
        Some(CompletionRecord {
            headword: self.headword.clone(),
            time_start: self.started_at,
            time_end,
            count_input: self.correct_count + self.wrong_count,
            count_correct: self.correct_count,
            count_typo: self.wrong_count,
            letter_time_array: self.letter_time.clone(),
            letter_mistake: self.letter_mistake.clone(),
        })
    }
}

impl Default for WordTypingState {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: WordTypingState,
    pub signals: Vec<Signal>,
}

impl Transition {
    fn unchanged(state: WordTypingState) -> Self {
        Self {
            state,
            signals: Vec::new(),
        }
    }
}

pub fn apply(state: WordTypingState, event: TypingEvent, options: &TypingOptions) -> Transition {
    match event {
        TypingEvent::Key { ch, at } => type_key(state, ch, at, options),
        TypingEvent::PauseElapsed => resolve_pause(state),
    }
}

fn chars_match(typed: char, expected: char, ignore_case: bool) -> bool {
    if ignore_case {
        typed.to_lowercase().eq(expected.to_lowercase())
    } else {
        typed == expected
    }
}

fn type_key(
    mut state: WordTypingState,
    ch: char,
    at: DateTime<Utc>,
    options: &TypingOptions,
) -> Transition {
    match state.phase {
        Phase::WrongPause => {
            trace!(%ch, "keystroke dropped during wrong pause");
            return Transition::unchanged(state);
        }
        Phase::Finished => {
            debug!(%ch, headword = %state.headword, "keystroke after word finished");
            return Transition::unchanged(state);
        }
        Phase::Idle | Phase::Typing => {}
    }

    let idx = state.cursor();
    let Some(expected) = state.expected_char(idx) else {
        debug!(%ch, idx, "no keystroke expected; waiting for a new word");
        return Transition::unchanged(state);
    };

    state.input.push(ch);
    let mut signals = Vec::new();

    if chars_match(ch, expected, options.ignore_case) {
        state.keystrokes[idx] = KeystrokeState::Correct;
        state.correct_count += 1;
        state.letter_time.push(at.timestamp_millis());

        if idx + 1 == state.total() {
            state.phase = Phase::Finished;
            state.ended_at = Some(at);
            if let Some(record) = state.completion_record() {
                signals.push(Signal::Completed(record));
            }
        } else {
            state.phase = Phase::Typing;
        }
    } else {
        state.keystrokes[idx] = KeystrokeState::Wrong;
        state.wrong_count += 1;
        state.letter_mistake.entry(idx).or_default().push(ch);
        state.letter_time.clear();
        state.phase = Phase::WrongPause;

        signals.push(Signal::WrongAttempt(WrongAttempt {
            wrong_count: state.wrong_count,
            position: idx,
            observed: ch,
            expected,
        }));

        if options.reveal_threshold > 0
            && state.wrong_count >= options.reveal_threshold
            && !state.reveal_signalled
        {
            state.reveal_signalled = true;
            signals.push(Signal::Reveal {
                headword: state.headword.clone(),
                wrong_count: state.wrong_count,
            });
        }
    }

    Transition { state, signals }
}

/// Clears the typed input after a wrong keystroke. Counters and the mistake
/// log survive.
fn resolve_pause(mut state: WordTypingState) -> Transition {
    if state.phase != Phase::WrongPause {
        debug!(phase = %state.phase, "pause elapsed outside of wrong pause");
        return Transition::unchanged(state);
    }

    state.input.clear();
    state.keystrokes.fill(KeystrokeState::Untyped);
    state.phase = Phase::Typing;
    Transition::unchanged(state)
}
