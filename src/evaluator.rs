//! Display state of segments and moras, derived from keystroke states.

use crate::notation::{Mora, Segment};
use crate::typing::KeystrokeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pending,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoraStatus {
    pub typed: bool,
    pub errored: bool,
    pub complete: bool,
}

impl MoraStatus {
    pub fn tone(&self) -> Tone {
        if self.complete {
            Tone::Correct
        } else if self.errored {
            Tone::Wrong
        } else {
            Tone::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentStatus {
    pub moras: Vec<MoraStatus>,
    pub has_error: bool,
    pub complete: bool,
    /// Cursor is inside the segment and every keystroke so far is correct.
    pub provisionally_correct: bool,
    phonetic_only: bool,
}

impl SegmentStatus {
    /// Tone of the literal glyph, or `None` for phonetic-only segments whose
    /// rendering is driven by their moras alone.
    pub fn literal_tone(&self) -> Option<Tone> {
        if self.phonetic_only {
            None
        } else if self.has_error {
            Some(Tone::Wrong)
        } else if self.complete {
            Some(Tone::Correct)
        } else {
            Some(Tone::Pending)
        }
    }
}

/// Evaluates one segment. `states` covers the segment's own keystroke range
/// and `cursor` is the number of keystrokes committed for the whole word.
pub fn evaluate_segment(segment: &Segment, states: &[KeystrokeState], cursor: usize) -> SegmentStatus {
    let moras: Vec<MoraStatus> = segment
        .moras
        .iter()
        .map(|mora| evaluate_mora(segment, mora, states, cursor))
        .collect();

    let start = segment.keystroke_start;
    let end = segment.keystroke_end();
    let provisionally_correct = cursor > start && cursor <= end && {
        let typed = (cursor - start).min(states.len());
        states[..typed]
            .iter()
            .all(|s| *s == KeystrokeState::Correct)
    };

    SegmentStatus {
        has_error: moras.iter().any(|m| m.errored),
        complete: moras.iter().all(|m| m.complete),
        provisionally_correct,
        phonetic_only: segment.is_phonetic_only(),
        moras,
    }
}

fn evaluate_mora(
    segment: &Segment,
    mora: &Mora,
    states: &[KeystrokeState],
    cursor: usize,
) -> MoraStatus {
    let start = segment.keystroke_start + mora.start_offset;
    let end = start + mora.length;
    let sub = states
        .get(mora.start_offset..mora.end_offset().min(states.len()))
        .unwrap_or_default();

    let complete = if mora.length == 0 {
        cursor >= start
    } else {
        cursor >= end
            && sub.len() == mora.length
            && sub.iter().all(|s| *s == KeystrokeState::Correct)
    };

    MoraStatus {
        typed: cursor > start,
        errored: sub.contains(&KeystrokeState::Wrong),
        complete,
    }
}

/// Evaluates every segment against the word-wide keystroke states.
pub fn evaluate_word(
    segments: &[Segment],
    states: &[KeystrokeState],
    cursor: usize,
) -> Vec<SegmentStatus> {
    segments
        .iter()
        .map(|segment| {
            let start = segment.keystroke_start.min(states.len());
            let end = segment.keystroke_end().min(states.len());
            evaluate_segment(segment, &states[start..end], cursor)
        })
        .collect()
}
