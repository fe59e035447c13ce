// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod evaluator;
pub mod input;
pub mod kana;
pub mod logging;
pub mod notation;
pub mod romaji;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod typing;
pub mod util;
pub mod word;

pub use controller::{ControllerSettings, TypingProgressController};
pub use notation::{Mora, NotationParser, Segment};
pub use romaji::{Hepburn, Transliterator};
pub use session::PracticeSession;
pub use typing::{CompletionRecord, Signal, SignalSink};
