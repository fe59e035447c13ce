//! A practice run over a list of dictionary words.

use std::time::Instant;

use crossterm::event::KeyEvent;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::controller::{ControllerSettings, TypingProgressController};
use crate::notation::{NotationParser, Segment};
use crate::typing::{CompletionRecord, Signal};
use crate::util::{intervals, mean, std_dev};
use crate::word::{Dictionary, Word};

/// Picks the words for one run: shuffled when `random_order` is set, then cut
/// to `number_of_words` (0 keeps them all).
pub fn select_words(dictionary: &Dictionary, cfg: &Config) -> Vec<Word> {
    let mut words = dictionary.words.clone();
    if cfg.random_order {
        let mut rng = cfg
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        words.shuffle(&mut rng);
    }
    if cfg.number_of_words > 0 {
        words.truncate(cfg.number_of_words);
    }
    words
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub words_completed: usize,
    pub words_skipped: usize,
    pub total_typos: usize,
    pub mean_interval_ms: Option<f64>,
    pub interval_std_dev_ms: Option<f64>,
}

pub struct PracticeSession {
    words: Vec<Word>,
    index: usize,
    parser: NotationParser,
    controller: TypingProgressController,
    segments: Vec<Segment>,
    records: Vec<CompletionRecord>,
    skipped: usize,
    reveal_available: bool,
    hint_threshold: usize,
}

impl PracticeSession {
    pub fn new(words: Vec<Word>, cfg: &Config) -> Self {
        let mut session = Self {
            words,
            index: 0,
            parser: NotationParser::new(),
            controller: TypingProgressController::new(ControllerSettings::from(cfg)),
            segments: Vec::new(),
            records: Vec::new(),
            skipped: 0,
            reveal_available: false,
            hint_threshold: cfg.hint_threshold,
        };
        session.present();
        session
    }

    pub fn from_dictionary(dictionary: &Dictionary, cfg: &Config) -> Self {
        Self::new(select_words(dictionary, cfg), cfg)
    }

    /// Loads the word at `index`, passing over entries with nothing to type.
    fn present(&mut self) {
        self.reveal_available = false;

        while let Some(word) = self.words.get(self.index) {
            let headword = word.headword();
            if headword.is_empty() {
                warn!(index = self.index, "dictionary entry has an empty headword, skipping");
                self.index += 1;
                continue;
            }

            self.segments = self
                .parser
                .parse(word.notation.as_deref().unwrap_or_default(), &headword);
            self.controller.reset(word, &self.segments);
            return;
        }

        self.segments.clear();
        self.controller.abort();
        info!(
            completed = self.records.len(),
            skipped = self.skipped,
            "practice session finished"
        );
    }

    fn advance(&mut self) {
        self.index += 1;
        self.present();
    }

    fn absorb(&mut self, signals: &[Signal]) {
        for signal in signals {
            match signal {
                Signal::Completed(record) => {
                    debug!(headword = %record.headword, typos = record.count_typo, "word completed");
                    self.records.push(record.clone());
                    self.advance();
                }
                Signal::WrongAttempt(attempt) => {
                    debug!(
                        position = attempt.position,
                        observed = %attempt.observed,
                        expected = %attempt.expected,
                        "wrong keystroke"
                    );
                }
                Signal::Reveal { headword, .. } => {
                    debug!(%headword, "answer may now be revealed");
                    self.reveal_available = true;
                }
            }
        }
    }

    pub fn type_char(&mut self, ch: char) -> Vec<Signal> {
        self.type_char_at(ch, Instant::now())
    }

    pub fn type_char_at(&mut self, ch: char, now: Instant) -> Vec<Signal> {
        let mut signals = Vec::new();
        if self.is_finished() {
            return signals;
        }
        self.controller.append_at(ch, now, &mut signals);
        self.absorb(&signals);
        signals
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Vec<Signal> {
        let mut signals = Vec::new();
        if self.is_finished() {
            return signals;
        }
        self.controller.handle_key(key, &mut signals);
        self.absorb(&signals);
        signals
    }

    pub fn tick(&mut self) -> Vec<Signal> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Vec<Signal> {
        let mut signals = Vec::new();
        self.controller.tick_at(now, &mut signals);
        self.absorb(&signals);
        signals
    }

    /// Gives up on the current word. Only allowed once the reveal signal fired.
    pub fn skip(&mut self) -> bool {
        if !self.reveal_available || self.is_finished() {
            return false;
        }
        info!(headword = %self.controller.state().headword, "word skipped");
        self.skipped += 1;
        self.advance();
        true
    }

    pub fn can_skip(&self) -> bool {
        self.reveal_available
    }

    pub fn show_hint(&self) -> bool {
        !self.is_finished() && self.controller.state().wrong_count >= self.hint_threshold
    }

    /// The keystrokes of the current word, once enough mistakes were made.
    pub fn hint(&self) -> Option<String> {
        self.show_hint()
            .then(|| self.controller.state().expected().iter().collect())
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.words.len()
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.words.get(self.index)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn controller(&self) -> &TypingProgressController {
        &self.controller
    }

    /// Zero-based index of the current word and the number of words.
    pub fn position(&self) -> (usize, usize) {
        (self.index.min(self.words.len()), self.words.len())
    }

    pub fn records(&self) -> &[CompletionRecord] {
        &self.records
    }

    pub fn summary(&self) -> SessionSummary {
        let gaps: Vec<f64> = self
            .records
            .iter()
            .flat_map(|r| intervals(&r.letter_time_array))
            .collect();

        SessionSummary {
            words_completed: self.records.len(),
            words_skipped: self.skipped,
            total_typos: self.records.iter().map(|r| r.count_typo).sum(),
            mean_interval_ms: mean(&gaps),
            interval_std_dev_ms: std_dev(&gaps),
        }
    }
}
