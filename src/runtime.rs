//! Feeds terminal input and a steady tick clock into a [`PracticeSession`].

use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::{trace, warn};

use crate::session::PracticeSession;
use crate::typing::Signal;

#[derive(Clone, Debug)]
pub enum TrainerEvent {
    /// A key press. Releases and repeats never reach the session.
    Key(KeyEvent),
    Resize,
    /// The input stayed quiet for a whole tick; carries the instant it fired.
    Tick(Instant),
}

impl TrainerEvent {
    /// Routes the event into the session. A tick resolves a wrong pause whose
    /// deadline is at or before the tick's instant.
    pub fn feed(&self, session: &mut PracticeSession) -> Vec<Signal> {
        match self {
            Self::Key(key) => session.handle_key(key),
            Self::Tick(at) => session.tick_at(*at),
            Self::Resize => Vec::new(),
        }
    }
}

/// Where key presses and resizes come from.
pub trait EventSource: Send + 'static {
    /// Waits up to `timeout` for input. `None` when nothing arrived.
    fn next_event(&self, timeout: Duration) -> Option<TrainerEvent>;
}

/// Reads the terminal on a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<TrainerEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let event = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => TrainerEvent::Key(key),
                Ok(CtEvent::Key(key)) => {
                    trace!(code = ?key.code, kind = ?key.kind, "key event dropped");
                    continue;
                }
                Ok(CtEvent::Resize(_, _)) => TrainerEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    warn!(%err, "terminal event stream closed");
                    break;
                }
            };
            if tx.send(event).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn next_event(&self, timeout: Duration) -> Option<TrainerEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Replays events pushed into a channel, for driving a session without a tty.
pub struct ChannelEventSource {
    rx: Receiver<TrainerEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<TrainerEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn next_event(&self, timeout: Duration) -> Option<TrainerEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Turns an event source into the session's input: each step yields the next
/// event, or a tick once `tick_rate` passes without one.
pub struct Runner<E: EventSource> {
    source: E,
    tick_rate: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(source: E, tick_rate: Duration) -> Self {
        Self { source, tick_rate }
    }

    pub fn step(&self) -> TrainerEvent {
        self.source
            .next_event(self.tick_rate)
            .unwrap_or_else(|| TrainerEvent::Tick(Instant::now()))
    }

    /// Steps once and feeds the event straight into the session.
    pub fn drive(&self, session: &mut PracticeSession) -> (TrainerEvent, Vec<Signal>) {
        let event = self.step();
        let signals = event.feed(session);
        (event, signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::typing::Phase;
    use crate::word::Word;
    use assert_matches::assert_matches;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(c: char) -> TrainerEvent {
        TrainerEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn session(wrong_pause_ms: u64) -> PracticeSession {
        PracticeSession::new(
            vec![Word::new("ka", Some("か"))],
            &Config {
                wrong_pause_ms,
                ..Config::default()
            },
        )
    }

    #[test]
    fn step_ticks_when_source_is_quiet() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

        let before = Instant::now();
        assert_matches!(runner.step(), TrainerEvent::Tick(at) if at >= before);
    }

    #[test]
    fn step_ticks_after_source_hangs_up() {
        let (tx, rx) = mpsc::channel();
        drop(tx);
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

        assert_matches!(runner.step(), TrainerEvent::Tick(_));
    }

    #[test]
    fn step_passes_events_through() {
        let (tx, rx) = mpsc::channel();
        tx.send(TrainerEvent::Resize).unwrap();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(10));

        assert_matches!(runner.step(), TrainerEvent::Resize);
    }

    #[test]
    fn feed_routes_keys_and_ignores_resize() {
        let mut session = session(300);

        let signals = key('k').feed(&mut session);
        assert!(signals.is_empty());
        assert_eq!(session.controller().cursor(), 1);

        assert!(TrainerEvent::Resize.feed(&mut session).is_empty());
        assert_eq!(session.controller().cursor(), 1);
    }

    #[test]
    fn tick_before_deadline_keeps_pause() {
        let mut session = session(300);
        let typed_at = Instant::now();
        session.type_char_at('x', typed_at);

        let early = TrainerEvent::Tick(typed_at + Duration::from_millis(299));
        early.feed(&mut session);
        assert_eq!(session.controller().phase(), Phase::WrongPause);
        assert_eq!(session.controller().cursor(), 1);

        let late = TrainerEvent::Tick(typed_at + Duration::from_millis(300));
        late.feed(&mut session);
        assert_eq!(session.controller().phase(), Phase::Typing);
        assert_eq!(session.controller().cursor(), 0);
        assert_eq!(session.controller().state().wrong_count, 1);
    }

    #[test]
    fn drive_completes_a_word() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));
        let mut session = session(300);

        tx.send(key('k')).unwrap();
        tx.send(key('a')).unwrap();

        let (_, first) = runner.drive(&mut session);
        assert!(first.is_empty());
        let (event, second) = runner.drive(&mut session);
        assert_matches!(event, TrainerEvent::Key(_));
        assert_matches!(second.as_slice(), [Signal::Completed(record)] if record.headword == "ka");
        assert!(session.is_finished());
    }
}
