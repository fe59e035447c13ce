//! Stateful driver of the per-word typing state machine.
//!
//! The controller is the only writer of [`WordTypingState`]. Each keystroke
//! is one call to [`typing::apply`]; the state is swapped out, advanced and
//! stored back before the next event is accepted. A wrong keystroke arms a
//! [`PauseTimer`] that the owner resolves by calling [`tick`] regularly.
//!
//! [`tick`]: TypingProgressController::tick

use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::KeyEvent;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::Config;
use crate::input::{self, InputError};
use crate::notation::{self, Segment};
use crate::timer::PauseTimer;
use crate::typing::{
    self, KeystrokeState, Phase, SignalSink, Transition, TypingEvent, TypingOptions,
    WordTypingState,
};
use crate::word::Word;

pub const DEFAULT_PAUSE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub options: TypingOptions,
    pub pause_delay: Duration,
    /// Seed for the per-word visibility masks; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            options: TypingOptions::default(),
            pause_delay: DEFAULT_PAUSE_DELAY,
            seed: None,
        }
    }
}

impl From<&Config> for ControllerSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            options: TypingOptions {
                ignore_case: cfg.ignore_case,
                reveal_threshold: cfg.reveal_threshold,
            },
            pause_delay: Duration::from_millis(cfg.wrong_pause_ms),
            seed: cfg.seed,
        }
    }
}

#[derive(Debug)]
pub struct TypingProgressController {
    settings: ControllerSettings,
    state: WordTypingState,
    pending_reset: Option<PauseTimer>,
    seeds: StdRng,
}

impl TypingProgressController {
    pub fn new(settings: ControllerSettings) -> Self {
        let seeds = settings
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            settings,
            state: WordTypingState::empty(),
            pending_reset: None,
            seeds,
        }
    }

    /// Starts a fresh word, dropping any pause left over from the previous one.
    ///
    /// The keystrokes to type are the headword when it spells the segments'
    /// romaji (ASCII case aside), otherwise the segments' own romaji. With no
    /// segments the headword is typed as written.
    pub fn reset(&mut self, word: &Word, segments: &[Segment]) {
        self.cancel_pending();

        let headword = word.headword();
        let typed = notation::keystroke_text(segments);
        let expected: Vec<char> = if segments.is_empty() || headword.eq_ignore_ascii_case(&typed) {
            headword.chars().collect()
        } else {
            warn!(
                %headword,
                %typed,
                "headword does not spell its notation; typing the notation"
            );
            typed.chars().collect()
        };

        self.state = WordTypingState::new(headword, expected, Utc::now(), self.seeds.gen());
        debug!(headword = %self.state.headword, total = self.state.total(), "word presented");
    }

    pub fn append(&mut self, ch: char, sink: &mut impl SignalSink) {
        self.append_at(ch, Instant::now(), sink);
    }

    pub fn append_at(&mut self, ch: char, now: Instant, sink: &mut impl SignalSink) {
        let was_paused = self.state.has_wrong();
        self.step(TypingEvent::Key { ch, at: Utc::now() }, sink);

        if !was_paused && self.state.has_wrong() {
            self.pending_reset = Some(PauseTimer::start(now, self.settings.pause_delay));
        }
    }

    /// Feeds a terminal key event. Keys that do not type a character leave
    /// the state untouched.
    pub fn handle_key(&mut self, key: &KeyEvent, sink: &mut impl SignalSink) {
        match input::typed_char(key) {
            Ok(ch) => self.append(ch, sink),
            Err(err @ InputError::NotAPress(_)) => debug!(%err, "key ignored"),
            Err(err) => warn!(%err, "key ignored"),
        }
    }

    pub fn tick(&mut self, sink: &mut impl SignalSink) {
        self.tick_at(Instant::now(), sink);
    }

    /// Applies the pending wrong-pause reset once its deadline has passed.
    pub fn tick_at(&mut self, now: Instant, sink: &mut impl SignalSink) {
        if self.pending_reset.as_ref().is_some_and(|t| t.is_due(now)) {
            self.pending_reset = None;
            self.step(TypingEvent::PauseElapsed, sink);
        }
    }

    /// Cancels a pending pause without applying it.
    pub fn abort(&mut self) {
        self.cancel_pending();
    }

    fn cancel_pending(&mut self) {
        if let Some(timer) = self.pending_reset.take() {
            timer.cancel();
        }
    }

    fn step(&mut self, event: TypingEvent, sink: &mut impl SignalSink) {
        let state = std::mem::take(&mut self.state);
        let Transition { state, signals } = typing::apply(state, event, &self.settings.options);
        self.state = state;
        for signal in signals {
            sink.emit(signal);
        }
    }

    pub fn state(&self) -> &WordTypingState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn cursor(&self) -> usize {
        self.state.cursor()
    }

    pub fn keystrokes(&self) -> &[KeystrokeState] {
        &self.state.keystrokes
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn pause_pending(&self) -> bool {
        self.pending_reset.is_some()
    }

    pub fn pause_remaining(&self, now: Instant) -> Option<Duration> {
        self.pending_reset.as_ref().map(|t| t.remaining(now))
    }
}

impl Drop for TypingProgressController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
