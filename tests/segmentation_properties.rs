use chrono::{TimeZone, Utc};
use furitype::kana::{gemination_consonant, is_contracting_mark, MoraKind};
use furitype::notation::{self, Mora, NotationParser};
use furitype::romaji::{Hepburn, Transliterator};
use furitype::typing::{self, TypingEvent, TypingOptions, WordTypingState};
use proptest::prelude::*;

// Whole moras only, so no chunk ever starts with a dangling contracting mark.
const MORAS: &[&str] = &[
    "あ", "う", "か", "き", "こ", "し", "ち", "つ", "に", "ほ", "ん", "が", "っ", "きゃ", "しょ",
    "ちゅ", "じょ", "ふぁ", "カ", "ッ", "テ",
];
const LITERALS: &[&str] = &["日", "本", "学", "校", "切", "手", "茶"];

#[derive(Debug, Clone)]
enum Chunk {
    Run(String),
    Group { literal: String, guide: String },
}

fn kana_run() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(MORAS), 1..4).prop_map(|m| m.concat())
}

fn chunk() -> impl Strategy<Value = Chunk> {
    prop_oneof![
        kana_run().prop_map(Chunk::Run),
        (prop::sample::select(LITERALS), kana_run()).prop_map(|(literal, guide)| Chunk::Group {
            literal: literal.to_string(),
            guide,
        }),
    ]
}

/// Notation string and the kana reading it spells.
fn annotated_word() -> impl Strategy<Value = (String, String)> {
    prop::collection::vec(chunk(), 1..5).prop_map(|chunks| {
        let mut notation = String::new();
        let mut reading = String::new();
        for chunk in chunks {
            match chunk {
                Chunk::Run(text) => {
                    notation.push_str(&text);
                    reading.push_str(&text);
                }
                Chunk::Group { literal, guide } => {
                    notation.push_str(&format!("{literal}({guide})"));
                    reading.push_str(&guide);
                }
            }
        }
        (notation, reading)
    })
}

proptest! {
    #[test]
    fn keystroke_total_matches_romanized_reading((notation, reading) in annotated_word()) {
        let parsed = NotationParser::new().parse_detailed(&notation, &reading);

        prop_assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        prop_assert_eq!(
            notation::total_keystrokes(&parsed.segments),
            Hepburn.romanize(&reading).chars().count()
        );
        prop_assert_eq!(notation::keystroke_text(&parsed.segments), Hepburn.romanize(&reading));
    }

    #[test]
    fn segments_tile_the_keystroke_range((notation, reading) in annotated_word()) {
        let segments = NotationParser::new().parse(&notation, &reading);

        let mut next = 0;
        for segment in &segments {
            prop_assert_eq!(segment.keystroke_start, next);
            let mut offset = 0;
            for mora in &segment.moras {
                prop_assert_eq!(mora.start_offset, offset);
                offset += mora.length;
            }
            prop_assert_eq!(offset, segment.keystroke_length);
            next += segment.keystroke_length;
        }
        prop_assert_eq!(next, notation::total_keystrokes(&segments));
    }

    #[test]
    fn contracted_sounds_stay_whole((notation, reading) in annotated_word()) {
        let segments = NotationParser::new().parse(&notation, &reading);

        for mora in segments.iter().flat_map(|s| &s.moras) {
            let first = mora.text.chars().next();
            prop_assert!(!first.is_some_and(is_contracting_mark), "split mora {:?}", mora.text);
            if mora.kind == MoraKind::Contracted {
                prop_assert_eq!(mora.text.chars().count(), 2);
            }
        }
    }

    #[test]
    fn gemination_borrows_following_consonant((notation, reading) in annotated_word()) {
        let segments = NotationParser::new().parse(&notation, &reading);
        let moras: Vec<&Mora> = segments.iter().flat_map(|s| &s.moras).collect();

        for (idx, mora) in moras.iter().enumerate() {
            if mora.kind != MoraKind::Gemination {
                continue;
            }
            let borrowed = moras
                .get(idx + 1)
                .and_then(|next| gemination_consonant(&next.keystroke_text));
            match borrowed {
                Some(c) => {
                    prop_assert_eq!(mora.length, 1);
                    prop_assert_eq!(mora.keystroke_text.clone(), c.to_string());
                }
                None => prop_assert_eq!(mora.length, 0),
            }
        }
    }

    #[test]
    fn replay_is_deterministic(
        (notation, reading) in annotated_word(),
        keys in prop::collection::vec(prop::sample::select(vec!['a', 'k', 'n', 'o', 's', 'x']), 0..12),
        seed in any::<u64>(),
    ) {
        let segments = NotationParser::new().parse(&notation, &reading);
        let expected = notation::keystroke_text(&segments);
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let options = TypingOptions::default();

        let run = || {
            let mut state = WordTypingState::new("w", expected.chars(), at, seed);
            for &ch in &keys {
                state = typing::apply(state, TypingEvent::Key { ch, at }, &options).state;
                if state.has_wrong() {
                    state = typing::apply(state, TypingEvent::PauseElapsed, &options).state;
                }
            }
            (state.keystrokes.clone(), state.phase, state.wrong_count, state.letter_visible.clone())
        };

        prop_assert_eq!(run(), run());
    }
}
