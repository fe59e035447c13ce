use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use furitype::config::Config;
use furitype::runtime::{ChannelEventSource, Runner, TrainerEvent};
use furitype::session::PracticeSession;
use furitype::typing::{Phase, Signal};
use furitype::word::{Dictionary, Word};

fn key(c: char) -> TrainerEvent {
    TrainerEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the runtime + PracticeSession without a TTY
#[test]
fn headless_typing_flow_completes() {
    let mut session = PracticeSession::new(
        vec![
            Word::new("nihon", Some("日(に)本(ほん)")),
            Word::new("kitte", Some("切(きっ)手(て)")),
        ],
        &Config::default(),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    for c in "nihonkitte".chars() {
        tx.send(key(c)).unwrap();
    }

    let mut completed = Vec::new();
    for _ in 0..100u32 {
        let (_, signals) = runner.drive(&mut session);
        for signal in signals {
            if let Signal::Completed(record) = signal {
                completed.push(record.headword);
            }
        }
        if session.is_finished() {
            break;
        }
    }

    assert!(session.is_finished(), "session should have finished");
    assert_eq!(completed, vec!["nihon", "kitte"]);
    assert_eq!(session.summary().total_typos, 0);
}

#[test]
fn headless_wrong_pause_resolves_on_tick() {
    let cfg = Config {
        wrong_pause_ms: 20,
        ..Config::default()
    };
    let mut session = PracticeSession::new(vec![Word::new("ka", Some("か"))], &cfg);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    tx.send(key('x')).unwrap();
    runner.drive(&mut session);
    assert_eq!(session.controller().phase(), Phase::WrongPause);

    // no events queued: the runner ticks until the pause deadline passes
    for _ in 0..200u32 {
        runner.drive(&mut session);
        if session.controller().phase() != Phase::WrongPause {
            break;
        }
    }

    assert_eq!(session.controller().phase(), Phase::Typing);
    assert_eq!(session.controller().cursor(), 0);

    for c in "ka".chars() {
        tx.send(key(c)).unwrap();
        runner.drive(&mut session);
    }
    assert!(session.is_finished());
    assert_eq!(session.records()[0].count_typo, 1);
}

#[test]
fn headless_bundled_dictionary_session() {
    let dict = Dictionary::bundled("kana").unwrap();
    let cfg = Config {
        random_order: false,
        number_of_words: 3,
        ..Config::default()
    };
    let mut session = PracticeSession::from_dictionary(&dict, &cfg);

    while !session.is_finished() {
        let answer: String = session.controller().state().expected().iter().collect();
        assert!(!answer.is_empty());
        for c in answer.chars() {
            session.type_char(c);
        }
    }

    assert_eq!(session.records().len(), 3);
    let headwords: Vec<_> = session.records().iter().map(|r| r.headword.as_str()).collect();
    let expected: Vec<_> = dict.words[..3].iter().map(|w| w.name.as_str()).collect();
    assert_eq!(headwords, expected);
}
