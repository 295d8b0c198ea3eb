use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use nexohub_core::auth::validation::{email_hint, password_hint};

use crate::app::{App, AppState, LoginFocus};

use super::{home, styles};

/// Visible width of the text inside a form field
const FIELD_WIDTH: usize = 24;

/// Outer width of the login dialog
const DIALOG_WIDTH: u16 = 48;

/// Rows of the login dialog without an error message
const DIALOG_BASE_HEIGHT: u16 = 15;

const LOGO: [&str; 3] = [
    "   ╔╗╔╔═╗═╗ ╦╔═╗╦ ╦╦ ╦╔╗ ",
    "   ║║║║╣ ╔╩╦╝║ ║╠═╣║ ║╠╩╗",
    "   ╝╚╝╚═╝╩ ╚═╚═╝╩ ╩╚═╝╚═╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);

    let on_home = match app.state {
        AppState::Home => true,
        AppState::ConfirmingQuit => app.session.is_authenticated(),
        AppState::LoggingIn | AppState::Quitting => false,
    };
    if on_home {
        home::render_home(frame, chunks[1]);
    } else {
        render_login_form(frame, app, chunks[1]);
    }

    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  NexoHub Console";
    let hint = if app.state == AppState::Home {
        "[l] Sign out  [q] Quit"
    } else {
        "[Esc] Quit"
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + hint.len() as u16 + 4) as usize,
        )),
        Span::styled(hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let text = if let Some(ref message) = app.status_message {
        message.clone()
    } else {
        app.session_summary()
    };

    let line = Line::from(vec![Span::raw(" "), Span::raw(text)]);
    frame.render_widget(
        Paragraph::new(line).style(styles::status_bar_style()),
        area,
    );
}

/// Text of a field: left-aligned, showing the tail when it overflows.
fn field_text(value: &str) -> String {
    let count = value.chars().count();
    let visible: String = if count > FIELD_WIDTH {
        value.chars().skip(count - FIELD_WIDTH).collect()
    } else {
        value.to_string()
    };
    format!("{:<width$}", visible, width = FIELD_WIDTH)
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::body_style()
    };
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(format!("{}{}", field_text(&value), cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn hint_line(hint: Option<&'static str>) -> Line<'static> {
    match hint {
        Some(text) => Line::from(Span::styled(format!("            {}", text), styles::hint_style())),
        None => Line::from(""),
    }
}

fn render_login_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let error_text = form.error().map(|error| format!(" {}", error));
    let height = match error_text {
        // Blank separator plus the wrapped message
        Some(ref text) => {
            DIALOG_BASE_HEIGHT + 1 + wrapped_line_count(text, (DIALOG_WIDTH - 2) as usize) as u16
        }
        None => DIALOG_BASE_HEIGHT,
    };
    let dialog = centered_rect_fixed(DIALOG_WIDTH, height, area);

    frame.render_widget(Clear, dialog);

    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect();
    lines.push(Line::from(vec![
        Span::raw("          "),
        Span::styled("CupoYa", styles::brand_style()),
        Span::styled(" • ", styles::muted_style()),
        Span::styled("CajaCero", styles::brand_style()),
    ]));
    lines.push(Line::from(""));

    lines.push(field_line(
        "  Email:    ",
        form.email().to_string(),
        app.login_focus == LoginFocus::Email,
    ));
    lines.push(hint_line(email_hint(form.email())));

    let masked = "*".repeat(form.password().chars().count());
    lines.push(field_line(
        "  Password: ",
        masked,
        app.login_focus == LoginFocus::Password,
    ));
    lines.push(hint_line(password_hint(form.password())));

    // Submit control, centered
    let enabled = form.can_submit();
    let focused = app.login_focus == LoginFocus::Button;
    let label = if focused && enabled {
        format!(" ▶ {} ◀ ", form.submit_label())
    } else {
        format!("   {}   ", form.submit_label())
    };
    let pad = ((DIALOG_WIDTH - 2) as usize).saturating_sub(label.chars().count() + 2) / 2;
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(pad)),
        Span::raw("["),
        Span::styled(label, styles::button_style(enabled, focused)),
        Span::raw("]"),
    ]));

    if let Some(text) = error_text {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(text, styles::error_style())));
    }

    let block = Block::default()
        .title(Span::styled(" Sign in ", styles::heading_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        dialog,
    );
}

/// Rows `text` takes when word-wrapped to `width` columns.
/// Words longer than a row are split across rows.
fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    let mut rows = 1;
    let mut used = 0;
    for word in text.split(' ') {
        let len = word.chars().count();
        let needed = if used == 0 { len } else { used + 1 + len };
        if needed <= width {
            used = needed;
        } else if len <= width {
            rows += 1;
            used = len;
        } else {
            // Long word starts on its own row and spills over
            if used > 0 {
                rows += 1;
            }
            rows += (len - 1) / width;
            used = (len - 1) % width + 1;
        }
    }
    rows
}

/// Create a centered rectangle with fixed dimensions
pub(crate) fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(48, 9, frame.area());

    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::heading_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
