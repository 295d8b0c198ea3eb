use ratatui::style::{Color, Modifier, Style};

// Brand palette
pub const NAVY: Color = Color::Rgb(2, 5, 24);
pub const NEXO_BLUE: Color = Color::Rgb(9, 99, 202);
pub const RADAR_CYAN: Color = Color::Rgb(20, 199, 221);
pub const CUPO_GREEN: Color = Color::Rgb(68, 221, 105);
pub const MINT: Color = Color::Rgb(161, 239, 132);
pub const ICE: Color = Color::Rgb(238, 243, 247);
pub const ERROR: Color = Color::Rgb(220, 70, 70);
pub const MUTED: Color = Color::Rgb(128, 136, 150);
pub const HIGHLIGHT: Color = Color::Rgb(20, 36, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(RADAR_CYAN).add_modifier(Modifier::BOLD)
}

pub fn brand_style() -> Style {
    Style::default().fg(CUPO_GREEN).add_modifier(Modifier::BOLD)
}

pub fn heading_style() -> Style {
    Style::default().fg(ICE).add_modifier(Modifier::BOLD)
}

pub fn body_style() -> Style {
    Style::default().fg(ICE)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .fg(ICE)
        .add_modifier(Modifier::BOLD)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn hint_style() -> Style {
    Style::default().fg(MINT)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn key_style() -> Style {
    Style::default()
        .fg(RADAR_CYAN)
        .add_modifier(Modifier::BOLD)
}

/// Submit control. A disabled button is dimmed; focus only shows when enabled.
pub fn button_style(enabled: bool, focused: bool) -> Style {
    match (enabled, focused) {
        (false, _) => Style::default().fg(MUTED).add_modifier(Modifier::DIM),
        (true, true) => Style::default()
            .bg(CUPO_GREEN)
            .fg(NAVY)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(CUPO_GREEN).add_modifier(Modifier::BOLD),
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(NEXO_BLUE)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(NAVY).fg(ICE)
}
