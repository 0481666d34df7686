use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::compare::CharState;
use crate::session::{EndReason, Phase, Session};
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading => render_notice(
                "fetching sample text...",
                Style::default().add_modifier(Modifier::ITALIC),
                area,
                buf,
            ),
            AppState::LoadFailed(msg) => render_load_failed(msg, area, buf),
            AppState::Typing | AppState::Results => {
                if let Some(session) = &self.session {
                    if session.is_completed() {
                        render_results(session, area, buf);
                    } else {
                        render_typing(session, area, buf);
                    }
                }
            }
        }
    }
}

fn render_notice(text: &str, style: Style, area: Rect, buf: &mut Buffer) {
    let widget = Paragraph::new(Span::styled(text.to_string(), style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    widget.render(centered_line(area), buf);
}

fn centered_line(area: Rect) -> Rect {
    let y = area.y + area.height / 2;
    Rect::new(area.x, y.min(area.y + area.height.saturating_sub(1)), area.width, 1)
}

fn render_load_failed(msg: &str, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height / 2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let error = Paragraph::new(Span::styled(
        format!("could not load a sample text: {msg}"),
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    error.render(chunks[1], buf);

    let hint = Paragraph::new(Span::styled(
        "(esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    hint.render(chunks[2], buf);
}

fn render_typing(session: &Session, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let snapshot = session.snapshot();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let mut prompt_occupied_lines =
        ((session.reference().width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
    if session.reference().width() <= max_chars_per_line as usize {
        prompt_occupied_lines = 1;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(
                ((area.height as f64 - prompt_occupied_lines as f64) / 2.0) as u16,
            ),
            Constraint::Length(2),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let timer = Paragraph::new(Span::styled(snapshot.time_display.clone(), dim_bold_style))
        .alignment(Alignment::Center);
    timer.render(chunks[1], buf);

    let cursor = snapshot
        .chars
        .iter()
        .position(|(_, state)| *state == CharState::Pending);

    let spans = snapshot
        .chars
        .iter()
        .enumerate()
        .map(|(idx, (c, state))| {
            // A red space is invisible; show a middle dot instead.
            let shown = match (c, state) {
                (' ', CharState::Incorrect) => "·".to_owned(),
                (c, _) => c.to_string(),
            };
            match state {
                CharState::Correct => Span::styled(shown, green_bold_style),
                CharState::Incorrect => Span::styled(shown, red_bold_style),
                CharState::Pending if cursor == Some(idx) => {
                    Span::styled(shown, underlined_dim_bold_style)
                }
                CharState::Pending => Span::styled(shown, dim_bold_style),
            }
        })
        .collect::<Vec<Span>>();

    let prompt = Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(chunks[2], buf);

    let status = match snapshot.phase {
        Phase::Idle => Span::styled(
            format!(
                "press any key to start · (tab) duration: {}",
                session.duration()
            ),
            italic_style,
        ),
        _ => Span::styled(
            format!(
                "{:.2} wpm   {:.2}% acc",
                snapshot.score.wpm, snapshot.score.accuracy
            ),
            bold_style,
        ),
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn render_results(session: &Session, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height / 2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let score = session.score();
    let stats = Paragraph::new(Span::styled(
        format!("{:.2} wpm   {:.2}% acc", score.wpm, score.accuracy),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let reason = match session.end_reason() {
        Some(EndReason::TextCompleted) => "text completed",
        Some(EndReason::TimeExpired) => "time expired",
        Some(EndReason::ManualSubmit) => "submitted",
        None => "",
    };
    Paragraph::new(Span::styled(reason, italic_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled("(r)etry / (n)ew / (esc)ape", italic_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TestDuration;
    use clap::Parser;
    use ratatui::{buffer::Buffer, layout::Rect};

    fn test_app(text: &str) -> App {
        let cli = crate::Cli::parse_from(["typr"]);
        let mut app = App::new(cli, TestDuration::Min2);
        app.on_text_loaded(Ok(text.to_string()));
        app
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_loading_screen() {
        let cli = crate::Cli::parse_from(["typr"]);
        let app = App::new(cli, TestDuration::Min2);
        let out = rendered(&app, 80, 24);
        assert!(out.contains("fetching sample text"));
    }

    #[test]
    fn test_load_failed_screen_shows_error() {
        let cli = crate::Cli::parse_from(["typr"]);
        let mut app = App::new(cli, TestDuration::Min2);
        app.on_text_loaded(Err(crate::provider::FetchError::NoSamples));
        let out = rendered(&app, 80, 24);
        assert!(out.contains("could not load a sample text"));
        assert!(out.contains("no .txt samples found"));
    }

    #[test]
    fn test_typing_screen_shows_prompt_and_timer() {
        let app = test_app("hello world");
        let out = rendered(&app, 80, 24);
        assert!(out.contains("hello world"));
        assert!(out.contains("2:00"));
        assert!(out.contains("press any key to start"));
    }

    #[test]
    fn test_running_screen_shows_live_score() {
        let mut app = test_app("hello");
        app.input_buffer.push('h');
        app.session
            .as_mut()
            .unwrap()
            .on_input_changed("h");
        let out = rendered(&app, 80, 24);
        assert!(out.contains("wpm"));
        assert!(out.contains("acc"));
    }

    #[test]
    fn test_results_screen_shows_final_score_and_legend() {
        let mut app = test_app("hi");
        {
            let session = app.session.as_mut().unwrap();
            session.on_input_changed("hi");
        }
        app.state = AppState::Results;
        let out = rendered(&app, 80, 24);
        assert!(out.contains("wpm"));
        assert!(out.contains("text completed"));
        assert!(out.contains("(r)etry / (n)ew / (esc)ape"));
    }

    #[test]
    fn test_render_survives_small_areas() {
        let app = test_app("a reasonably long passage to wrap around the margins");
        for (w, h) in [(10, 3), (20, 5), (200, 2), (5, 50)] {
            let area = Rect::new(0, 0, w, h);
            let mut buffer = Buffer::empty(area);
            app.render(area, &mut buffer);
            assert_eq!(*buffer.area(), area);
        }
    }

    #[test]
    fn test_incorrect_space_rendered_visibly() {
        let mut app = test_app("a b");
        app.session.as_mut().unwrap().on_input_changed("axb");
        let out = rendered(&app, 80, 24);
        assert!(out.contains('·'));
    }

    #[test]
    fn test_empty_session_states_do_not_panic() {
        let cli = crate::Cli::parse_from(["typr"]);
        let mut app = App::new(cli, TestDuration::Min2);
        app.state = AppState::Typing; // no session attached
        let out = rendered(&app, 80, 24);
        assert!(out.len() >= 80 * 24);
    }
}
