use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use furitype::controller::{ControllerSettings, TypingProgressController, DEFAULT_PAUSE_DELAY};
use furitype::kana::MoraKind;
use furitype::notation::{self, NotationParser, SegmentKind};
use furitype::romaji::{Hepburn, Transliterator};
use furitype::typing::{KeystrokeState, Phase, Signal};
use furitype::word::Word;

fn nihon() -> (Word, Vec<notation::Segment>) {
    let word = Word::new("nihon", Some("日(に)本(ほん)"));
    let segments = NotationParser::new().parse("日(に)本(ほん)", "nihon");
    (word, segments)
}

fn controller() -> TypingProgressController {
    TypingProgressController::new(ControllerSettings {
        seed: Some(42),
        ..ControllerSettings::default()
    })
}

#[test]
fn annotated_word_splits_into_guided_segments() {
    let (_, segments) = nihon();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].literal, "日");
    assert_eq!(segments[0].guide, "に");
    assert_eq!(segments[0].keystroke_length, 2);
    assert_eq!(segments[0].keystroke_text(), "ni");

    assert_eq!(segments[1].literal, "本");
    assert_eq!(segments[1].guide, "ほん");
    assert_eq!(segments[1].keystroke_start, 2);
    assert_eq!(segments[1].keystroke_length, 3);
    let moras: Vec<_> = segments[1]
        .moras
        .iter()
        .map(|m| (m.text.as_str(), m.keystroke_text.as_str()))
        .collect();
    assert_eq!(moras, vec![("ほ", "ho"), ("ん", "n")]);

    assert_eq!(notation::total_keystrokes(&segments), "nihon".len());
}

#[test]
fn kana_word_with_gemination() {
    let segments = NotationParser::new().parse("がっこう", "がっこう");
    let parts: Vec<_> = segments
        .iter()
        .map(|s| (s.literal.as_str(), s.keystroke_text(), s.keystroke_length))
        .collect();

    assert_eq!(
        parts,
        vec![
            ("が", "ga".to_string(), 2),
            ("っ", "k".to_string(), 1),
            ("こ", "ko".to_string(), 2),
            ("う", "u".to_string(), 1),
        ]
    );
    assert!(segments.iter().all(|s| s.kind == SegmentKind::Phonetic));
    assert_eq!(notation::total_keystrokes(&segments), 6);
    assert_eq!(Hepburn.romanize("がっこう"), "gakkou");
}

#[test]
fn contracted_sound_is_one_mora() {
    assert_eq!(Hepburn.romanize("きゃ"), "kya");

    let segments = NotationParser::new().parse("きゃ", "kya");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].moras.len(), 1);
    assert_eq!(segments[0].moras[0].kind, MoraKind::Contracted);
    assert_eq!(segments[0].moras[0].keystroke_text, "kya");
}

#[test]
fn typing_word_correctly_finishes() {
    let (word, segments) = nihon();
    let mut ctl = controller();
    ctl.reset(&word, &segments);

    let mut signals = Vec::new();
    for c in "nihon".chars() {
        ctl.append(c, &mut signals);
    }

    assert_eq!(ctl.phase(), Phase::Finished);
    assert!(ctl.keystrokes().iter().all(|k| *k == KeystrokeState::Correct));
    assert_matches!(
        signals.as_slice(),
        [Signal::Completed(record)] if record.count_correct == 5 && record.count_typo == 0
    );
}

#[test]
fn wrong_keystroke_pauses_then_resets() {
    let (word, segments) = nihon();
    let mut ctl = controller();
    ctl.reset(&word, &segments);

    let start = Instant::now();
    let mut signals = Vec::new();
    ctl.append_at('x', start, &mut signals);

    assert_eq!(ctl.phase(), Phase::WrongPause);
    assert_eq!(ctl.state().wrong_count, 1);
    assert_eq!(ctl.state().letter_mistake.get(&0), Some(&vec!['x']));
    assert_eq!(ctl.keystrokes()[0], KeystrokeState::Wrong);

    // swallowed while the mistake is on screen
    ctl.append_at('n', start + Duration::from_millis(50), &mut signals);
    assert_eq!(ctl.cursor(), 1);

    ctl.tick_at(start + DEFAULT_PAUSE_DELAY, &mut signals);
    assert_eq!(ctl.cursor(), 0);
    assert!(ctl.keystrokes().iter().all(|k| *k == KeystrokeState::Untyped));
    assert_eq!(ctl.state().wrong_count, 1);

    for c in "nihon".chars() {
        ctl.append(c, &mut signals);
    }
    assert_eq!(ctl.phase(), Phase::Finished);
    assert_matches!(
        signals.last(),
        Some(Signal::Completed(record)) if record.count_typo == 1 && record.count_correct == 5
    );
}

#[test]
fn replaying_keystrokes_is_deterministic() {
    let (word, segments) = nihon();
    let run = || {
        let mut ctl = controller();
        ctl.reset(&word, &segments);
        let mut signals = Vec::new();
        let now = Instant::now();
        for c in "nix".chars() {
            ctl.append_at(c, now, &mut signals);
        }
        (ctl.keystrokes().to_vec(), ctl.phase(), ctl.state().letter_visible.clone())
    };

    assert_eq!(run(), run());
}

#[test]
fn malformed_notation_degrades_to_pass_through() {
    let parsed = NotationParser::new().parse_detailed("日(に本", "");

    assert!(parsed
        .segments
        .iter()
        .all(|s| s.kind == SegmentKind::PassThrough && s.keystroke_length == 1));
    let literals: String = parsed.segments.iter().map(|s| s.literal.as_str()).collect();
    assert_eq!(literals, "日(に本");
    assert_matches!(
        parsed.diagnostics.as_slice(),
        [notation::ParseDiagnostic::UnbalancedMarkers { offset: 0 }]
    );
}
