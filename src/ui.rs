use furitype::{
    evaluator::{self, SegmentStatus, Tone},
    notation::{Segment, SegmentKind},
    session::PracticeSession,
    typing::KeystrokeState,
};
use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

struct Styles {
    bold: Style,
    correct: Style,
    wrong: Style,
    pending: Style,
    provisional: Style,
    italic: Style,
}

impl Styles {
    fn new() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        Self {
            bold,
            correct: bold.fg(Color::Green),
            wrong: bold.fg(Color::Red),
            pending: bold.add_modifier(Modifier::DIM),
            provisional: bold.fg(Color::Cyan),
            italic: Style::default().add_modifier(Modifier::ITALIC),
        }
    }

    fn tone(&self, tone: Tone) -> Style {
        match tone {
            Tone::Pending => self.pending,
            Tone::Correct => self.correct,
            Tone::Wrong => self.wrong,
        }
    }
}

fn pad(width: usize) -> Span<'static> {
    Span::raw(" ".repeat(width))
}

/// Guide line and literal line for the word, each segment padded so its
/// reading sits over its characters.
fn ruby_lines(
    segments: &[Segment],
    statuses: &[SegmentStatus],
    cursor: usize,
    styles: &Styles,
) -> (Line<'static>, Line<'static>) {
    let mut top = Vec::new();
    let mut bottom = Vec::new();

    for (segment, status) in segments.iter().zip(statuses) {
        let mora_spans = segment
            .moras
            .iter()
            .zip(&status.moras)
            .map(|(mora, mora_status)| {
                let start = segment.keystroke_start + mora.start_offset;
                let mut style = styles.tone(mora_status.tone());
                if cursor >= start && cursor < start + mora.length {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                Span::styled(mora.text.clone(), style)
            })
            .collect::<Vec<_>>();
        let moras_width: usize = segment.moras.iter().map(|m| m.text.width()).sum();

        match (segment.kind, status.literal_tone()) {
            (SegmentKind::Annotated, Some(tone)) => {
                let literal_style = if tone == Tone::Pending && status.provisionally_correct {
                    styles.provisional
                } else {
                    styles.tone(tone)
                };
                let literal_width = segment.literal.width();
                let width = literal_width.max(moras_width);

                top.extend(mora_spans);
                top.push(pad(width - moras_width));
                bottom.push(Span::styled(segment.literal.clone(), literal_style));
                bottom.push(pad(width - literal_width));
            }
            _ => {
                top.push(pad(moras_width));
                bottom.extend(mora_spans);
            }
        }
    }

    (Line::from(top), Line::from(bottom))
}

/// What has been typed so far. Untyped letters stay hidden until the first
/// mistake, after which the visible share of them is shown dimmed.
fn keystroke_line(session: &PracticeSession, styles: &Styles) -> Line<'static> {
    let state = session.controller().state();
    let typed: Vec<char> = state.input.chars().collect();
    let cursor = state.cursor();

    let spans = state
        .keystrokes
        .iter()
        .enumerate()
        .map(|(idx, keystroke)| {
            let expected = state.expected_char(idx).unwrap_or(' ');
            match keystroke {
                KeystrokeState::Correct => Span::styled(expected.to_string(), styles.correct),
                KeystrokeState::Wrong => Span::styled(
                    match typed.get(idx) {
                        Some(' ') => "·".to_owned(),
                        Some(c) => c.to_string(),
                        None => "?".to_owned(),
                    },
                    styles.wrong,
                ),
                KeystrokeState::Untyped => {
                    let shown = state.wrong_count > 0
                        && state.letter_visible.get(idx).copied().unwrap_or(false);
                    let mut style = styles.pending;
                    if idx == cursor {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    Span::styled(if shown { expected.to_string() } else { "_".into() }, style)
                }
            }
        })
        .collect::<Vec<_>>();

    Line::from(spans)
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer, styles: &Styles) {
    let session = &app.session;
    let controller = session.controller();
    let statuses = evaluator::evaluate_word(
        session.segments(),
        controller.keystrokes(),
        controller.cursor(),
    );
    let (guide, literal) = ruby_lines(session.segments(), &statuses, controller.cursor(), styles);

    let (index, total) = session.position();
    let trans = session
        .current_word()
        .map(|w| w.trans.iter().join("; "))
        .unwrap_or_default();

    let mut lines = vec![
        Line::from(Span::styled(format!("{} / {}", index + 1, total), styles.pending)),
        Line::from(Span::styled(trans, styles.italic)),
        Line::default(),
        guide,
        literal,
        Line::default(),
        keystroke_line(session, styles),
    ];
    if let Some(hint) = session.hint() {
        lines.push(Line::from(Span::styled(
            format!("romaji: {hint}"),
            Style::default().fg(Color::Yellow),
        )));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(lines.len() as u16 + 1) / 2),
            Constraint::Length(lines.len() as u16),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let legend = if session.can_skip() {
        "(tab) skip / (←) restart / (→) new / (esc)ape"
    } else {
        "(←) restart / (→) new / (esc)ape"
    };
    Paragraph::new(Span::styled(legend, styles.italic)).render(chunks[3], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer, styles: &Styles) {
    let summary = app.session.summary();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let stats = format!(
        "{} words   {} skipped   {} typos   {} ms/key   {} sd",
        summary.words_completed,
        summary.words_skipped,
        summary.total_typos,
        summary
            .mean_interval_ms
            .map_or_else(|| "-".to_string(), |m| format!("{m:.0}")),
        summary
            .interval_std_dev_ms
            .map_or_else(|| "-".to_string(), |sd| format!("{sd:.1}")),
    );
    Paragraph::new(Span::styled(stats, styles.bold))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let rows = app
        .session
        .records()
        .iter()
        .map(|record| {
            let style = if record.count_typo == 0 {
                styles.correct
            } else {
                styles.wrong
            };
            Line::from(vec![
                Span::styled(record.headword.clone(), styles.bold),
                Span::raw("  "),
                Span::styled(format!("{} typos", record.count_typo), style),
            ])
        })
        .collect::<Vec<_>>();
    Paragraph::new(rows)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    Paragraph::new(Span::styled("(r)etry / (n)ew / (esc)ape", styles.italic))
        .render(chunks[3], buf);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let styles = Styles::new();
        match self.state {
            AppState::Typing => render_typing(self, area, buf, &styles),
            AppState::Results => render_results(self, area, buf, &styles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use furitype::{config::Config, notation::NotationParser, word::Word};

    fn create_test_app(words: Vec<Word>) -> App {
        App::with_words(
            Config {
                seed: Some(1),
                ..Config::default()
            },
            words,
        )
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_ruby_lines_align_guide_over_literal() {
        let segments = NotationParser::new().parse("日(に)本(ほん)", "nihon");
        let statuses = evaluator::evaluate_word(&segments, &[KeystrokeState::Untyped; 5], 0);
        let (top, bottom) = ruby_lines(&segments, &statuses, 0, &Styles::new());

        assert_eq!(top.width(), bottom.width());
        assert_eq!(top.to_string(), "にほん");
        assert_eq!(bottom.to_string().trim_end(), "日本");
    }

    #[test]
    fn test_ruby_lines_phonetic_only_on_bottom() {
        let segments = NotationParser::new().parse("ねこ", "neko");
        let statuses = evaluator::evaluate_word(&segments, &[KeystrokeState::Untyped; 4], 0);
        let (top, bottom) = ruby_lines(&segments, &statuses, 0, &Styles::new());

        assert_eq!(top.to_string().trim(), "");
        assert_eq!(bottom.to_string(), "ねこ");
    }

    #[test]
    fn test_ruby_lines_mark_wrong_literal() {
        let segments = NotationParser::new().parse("本(ほん)", "hon");
        let states = [KeystrokeState::Wrong, KeystrokeState::Untyped, KeystrokeState::Untyped];
        let statuses = evaluator::evaluate_word(&segments, &states, 1);
        let styles = Styles::new();
        let (_, bottom) = ruby_lines(&segments, &statuses, 1, &styles);

        assert_eq!(bottom.spans[0].style, styles.wrong);
    }

    #[test]
    fn test_typing_screen_renders_word() {
        let app = create_test_app(vec![Word {
            trans: vec!["Japan".into()],
            ..Word::new("nihon", Some("日(に)本(ほん)"))
        }]);
        let rendered = render(&app, 80, 24);

        assert!(rendered.contains("1 / 1"));
        assert!(rendered.contains("Japan"));
        assert!(rendered.contains("日"));
        assert!(rendered.contains("_____"));
        assert!(!rendered.contains("romaji"));
    }

    #[test]
    fn test_typing_screen_shows_hint_after_mistakes() {
        let mut app = create_test_app(vec![Word::new("nihon", Some("日(に)本(ほん)"))]);
        app.config.hint_threshold = 1;
        app.reset(false);
        app.session.type_char('x');

        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("romaji: nihon"));
    }

    #[test]
    fn test_results_screen() {
        let mut app = create_test_app(vec![Word::new("ka", Some("か"))]);
        app.session.type_char('k');
        app.session.type_char('a');
        app.state = AppState::Results;

        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("1 words"));
        assert!(rendered.contains("0 typos"));
        assert!(rendered.contains("(r)etry"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let app = create_test_app(vec![Word::new("nihon", Some("日(に)本(ほん)"))]);
        render(&app, 12, 3);
    }
}
