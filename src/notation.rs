//! Segmentation of furigana notation into keystroke aligned moras.
//!
//! A notation string such as `日(に)本(ほん)` is turned into [`Segment`]s,
//! each holding the [`Mora`]s it is typed as. Segments tile the word's
//! keystroke range without gaps, so the flat per-keystroke state kept by the
//! controller can be sliced per segment for display.

use thiserror::Error;
use tracing::warn;

use crate::kana::{gemination_consonant, split_moras, MoraKind, RawMora};
use crate::romaji::{Hepburn, Transliterator};

const OPEN_MARKERS: [char; 2] = ['(', '（'];
const CLOSE_MARKERS: [char; 2] = [')', '）'];

/// Smallest typed unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mora {
    pub text: String,
    pub keystroke_text: String,
    /// Offset of the first keystroke, relative to the owning segment.
    pub start_offset: usize,
    pub length: usize,
    pub kind: MoraKind,
}

impl Mora {
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A literal glyph run with its phonetic guide.
    Annotated,
    /// A single mora of phonetic script shown as itself.
    Phonetic,
    /// A character outside the phonetic script, typed verbatim.
    PassThrough,
}

/// Display unit: one literal/guide pair or a single kana or symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub literal: String,
    pub guide: String,
    pub keystroke_start: usize,
    pub keystroke_length: usize,
    pub moras: Vec<Mora>,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn keystroke_end(&self) -> usize {
        self.keystroke_start + self.keystroke_length
    }

    /// True when the literal has no separate guide to recolor.
    pub fn is_phonetic_only(&self) -> bool {
        self.kind != SegmentKind::Annotated
    }

    pub fn keystroke_text(&self) -> String {
        self.moras.iter().map(|m| m.keystroke_text.as_str()).collect()
    }
}

pub fn total_keystrokes(segments: &[Segment]) -> usize {
    segments.last().map_or(0, Segment::keystroke_end)
}

/// The characters to type for the whole word, in order.
pub fn keystroke_text(segments: &[Segment]) -> String {
    segments.iter().map(Segment::keystroke_text).collect()
}

/// Recoverable problems found while parsing. None of them stop the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDiagnostic {
    #[error("unbalanced grouping markers; characters from offset {offset} typed verbatim")]
    UnbalancedMarkers { offset: usize },
    #[error("no romanization for '{text}'; it takes no keystrokes")]
    UnmappableMora { text: String },
    #[error("notation types {actual} keystrokes but '{full_word}' has {expected}")]
    LengthMismatch {
        full_word: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedNotation {
    pub segments: Vec<Segment>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Run(&'a str),
    Group { literal: &'a str, guide: &'a str },
    Degraded(&'a str),
}

/// Splits on grouping markers. The literal of a group is everything since
/// the previous group closed. On a nested open, stray close or unterminated
/// group the rest of the input, from the start of that literal, is returned
/// as a single degraded chunk.
fn split_groups(notation: &str) -> (Vec<Chunk<'_>>, Option<usize>) {
    let mut chunks = Vec::new();
    let mut literal_start = 0;
    let mut open: Option<(usize, usize)> = None;

    for (idx, c) in notation.char_indices() {
        let is_open = OPEN_MARKERS.contains(&c);
        let is_close = CLOSE_MARKERS.contains(&c);

        match open {
            None if is_open => open = Some((idx, idx + c.len_utf8())),
            Some((marker, guide_start)) if is_close => {
                let literal = &notation[literal_start..marker];
                let guide = &notation[guide_start..idx];
                match (literal.is_empty(), guide.is_empty()) {
                    (_, true) => chunks.push(Chunk::Run(literal)),
                    (true, false) => chunks.push(Chunk::Run(guide)),
                    (false, false) => chunks.push(Chunk::Group { literal, guide }),
                }
                literal_start = idx + c.len_utf8();
                open = None;
            }
            Some(_) if is_open => {
                chunks.push(Chunk::Degraded(&notation[literal_start..]));
                return (chunks, Some(literal_start));
            }
            None if is_close => {
                chunks.push(Chunk::Degraded(&notation[literal_start..]));
                return (chunks, Some(literal_start));
            }
            _ => {}
        }
    }

    if open.is_some() {
        chunks.push(Chunk::Degraded(&notation[literal_start..]));
        return (chunks, Some(literal_start));
    }

    if literal_start < notation.len() {
        chunks.push(Chunk::Run(&notation[literal_start..]));
    }

    (chunks, None)
}

/// A segment before keystroke offsets are known.
struct Draft {
    literal: String,
    guide: String,
    kind: SegmentKind,
    moras: Vec<Mora>,
}

pub struct NotationParser<T = Hepburn> {
    transliterator: T,
}

impl NotationParser<Hepburn> {
    pub fn new() -> Self {
        Self {
            transliterator: Hepburn,
        }
    }
}

impl Default for NotationParser<Hepburn> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transliterator> NotationParser<T> {
    pub fn with_transliterator(transliterator: T) -> Self {
        Self { transliterator }
    }

    pub fn transliterator(&self) -> &T {
        &self.transliterator
    }

    /// Parses `notation` into segments, logging any diagnostics. An empty
    /// notation falls back to segmenting `full_word` itself.
    pub fn parse(&self, notation: &str, full_word: &str) -> Vec<Segment> {
        let parsed = self.parse_detailed(notation, full_word);
        for diagnostic in &parsed.diagnostics {
            warn!(%notation, %full_word, "{diagnostic}");
        }
        parsed.segments
    }

    pub fn parse_detailed(&self, notation: &str, full_word: &str) -> ParsedNotation {
        let mut diagnostics = Vec::new();
        let source = if notation.trim().is_empty() {
            full_word
        } else {
            notation
        };

        let (chunks, degraded_at) = split_groups(source);
        if let Some(offset) = degraded_at {
            diagnostics.push(ParseDiagnostic::UnbalancedMarkers {
                offset: source[..offset].chars().count(),
            });
        }

        let mut drafts = Vec::new();
        for chunk in chunks {
            match chunk {
                Chunk::Run(text) => {
                    for raw in split_moras(text) {
                        let mora = self.draft_mora(raw, &mut diagnostics);
                        let kind = if raw.kind == MoraKind::PassThrough {
                            SegmentKind::PassThrough
                        } else {
                            SegmentKind::Phonetic
                        };
                        let guide = match kind {
                            SegmentKind::PassThrough => raw.text.to_string(),
                            _ => String::new(),
                        };
                        drafts.push(Draft {
                            literal: raw.text.to_string(),
                            guide,
                            kind,
                            moras: vec![mora],
                        });
                    }
                }
                Chunk::Group { literal, guide } => {
                    let moras = split_moras(guide)
                        .into_iter()
                        .map(|raw| self.draft_mora(raw, &mut diagnostics))
                        .collect();
                    drafts.push(Draft {
                        literal: literal.to_string(),
                        guide: guide.to_string(),
                        kind: SegmentKind::Annotated,
                        moras,
                    });
                }
                Chunk::Degraded(text) => {
                    drafts.extend(text.chars().map(|c| {
                        let text = c.to_string();
                        Draft {
                            literal: text.clone(),
                            guide: text.clone(),
                            kind: SegmentKind::PassThrough,
                            moras: vec![pass_through_mora(text)],
                        }
                    }));
                }
            }
        }

        resolve_gemination(&mut drafts);
        let segments = assign_offsets(drafts);

        let actual = total_keystrokes(&segments);
        if !full_word.is_empty() {
            let expected = self.transliterator.romanize(full_word).chars().count();
            if expected != actual {
                diagnostics.push(ParseDiagnostic::LengthMismatch {
                    full_word: full_word.to_string(),
                    expected,
                    actual,
                });
            }
        }

        ParsedNotation {
            segments,
            diagnostics,
        }
    }

    fn draft_mora(&self, raw: RawMora<'_>, diagnostics: &mut Vec<ParseDiagnostic>) -> Mora {
        match raw.kind {
            MoraKind::PassThrough => pass_through_mora(raw.text.to_string()),
            // filled in once the following mora is known
            MoraKind::Gemination => new_mora(raw.text.to_string(), String::new(), raw.kind),
            MoraKind::Plain | MoraKind::Contracted => {
                let keystroke_text = self.transliterator.romanize(raw.text);
                if keystroke_text.is_empty() {
                    diagnostics.push(ParseDiagnostic::UnmappableMora {
                        text: raw.text.to_string(),
                    });
                }
                new_mora(raw.text.to_string(), keystroke_text, raw.kind)
            }
        }
    }
}

fn new_mora(text: String, keystroke_text: String, kind: MoraKind) -> Mora {
    Mora {
        length: keystroke_text.chars().count(),
        text,
        keystroke_text,
        start_offset: 0,
        kind,
    }
}

fn pass_through_mora(text: String) -> Mora {
    new_mora(text.clone(), text, MoraKind::PassThrough)
}

/// Gemination looks ahead across segment boundaries: `切(きっ)手(て)`
/// borrows the `t` of the next group.
fn resolve_gemination(drafts: &mut [Draft]) {
    let mut next: Option<String> = None;
    let moras = drafts
        .iter_mut()
        .rev()
        .flat_map(|draft| draft.moras.iter_mut().rev());

    for mora in moras {
        if mora.kind == MoraKind::Gemination {
            mora.keystroke_text = next
                .as_deref()
                .and_then(gemination_consonant)
                .map(String::from)
                .unwrap_or_default();
            mora.length = mora.keystroke_text.chars().count();
        }
        next = Some(mora.keystroke_text.clone());
    }
}

fn assign_offsets(drafts: Vec<Draft>) -> Vec<Segment> {
    let mut keystroke_start = 0;
    drafts
        .into_iter()
        .map(|draft| {
            let mut moras = draft.moras;
            let mut offset = 0;
            for mora in &mut moras {
                mora.start_offset = offset;
                offset += mora.length;
            }

            let segment = Segment {
                literal: draft.literal,
                guide: draft.guide,
                keystroke_start,
                keystroke_length: offset,
                moras,
                kind: draft.kind,
            };
            keystroke_start += offset;
            segment
        })
        .collect()
}
