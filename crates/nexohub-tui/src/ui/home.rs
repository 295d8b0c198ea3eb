//! Landing screen shown once signed in: the CupoYa and CajaCero pitch.

use chrono::{Datelike, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::styles;

pub const WHATSAPP_URL: &str =
    "https://wa.me/573003803408?text=Hola%20quiero%20unirme%20al%20piloto%20CupoYa%20en%20Oca%C3%B1a";

const SUBTITLE: &str = "Technology initiative for drivers and parking lot owners";

const HERO_TITLE: &str = "Parking in Ocaña shouldn't be a lottery.";

const HERO_BODY: &str = "Tired of circling, losing time and ending up parked \"wherever you can\"? \
CupoYa helps you find parking with clarity and confidence: fewer laps, less stress, more control.";

const HERO_OPERATORS: &str = "And if you run a parking lot, CajaCero turns chaos into operation: \
higher occupancy, orderly entries and exits, and an experience that brings customers back.";

struct Product {
    name: &'static str,
    title: &'static str,
    pitch: &'static str,
    bullets: [(&'static str, &'static str); 3],
}

const CUPOYA: Product = Product {
    name: "CupoYa",
    title: "App for drivers",
    pitch: "Circling to park isn't normal: it's lost time, wasted fuel and stress. \
CupoYa helps you find options so you arrive faster, with less uncertainty.",
    bullets: [
        ("No more \"let's see if a spot shows up\"", "fewer laps and faster decisions."),
        ("Less risk, more peace of mind", "avoid awkward areas and last-minute searching."),
        ("Built for your routine", "hourly or monthly, subject to availability."),
    ],
};

const CAJACERO: Product = Product {
    name: "CajaCero",
    title: "App for parking lots",
    pitch: "Empty spots at peak hours, messy entries and exits, annoyed customers: \
that is money slipping away every day. CajaCero turns capacity into real income.",
    bullets: [
        ("More occupancy, fewer gaps", "use your capacity and cut dead time."),
        ("Clearer operation", "less confusion, less friction, better control."),
        ("Better experience = more return", "when service is quick, customers come back."),
    ],
};

pub fn footer_text(year: i32) -> String {
    format!("© {} CupoYa • Ocaña tech initiative  |  Operated by NexoHub", year)
}

pub fn render_home(frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(6), // Hero
            Constraint::Min(9),    // Product cards
            Constraint::Length(4), // Waitlist
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, chunks[0]);
    render_hero(frame, chunks[1]);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_product(frame, &CUPOYA, cards[0]);
    render_product(frame, &CAJACERO, cards[1]);

    render_waitlist(frame, chunks[3]);

    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text(Local::now().year()),
        styles::muted_style(),
    )));
    frame.render_widget(footer, chunks[4]);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(" Zona ", styles::heading_style()),
            Span::styled("CupoYa", styles::brand_style()),
            Span::styled(" • Ocaña", styles::muted_style()),
        ]),
        Line::from(Span::styled(format!(" {}", SUBTITLE), styles::body_style())),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_hero(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(HERO_TITLE, styles::heading_style())),
        Line::from(Span::styled(HERO_BODY, styles::body_style())),
        Line::from(Span::styled(HERO_OPERATORS, styles::body_style())),
    ];
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(paragraph, area);
}

fn render_product(frame: &mut Frame, product: &Product, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(product.title, styles::heading_style())),
        Line::from(Span::styled(product.pitch, styles::body_style())),
        Line::from(""),
    ];
    for (lead, rest) in product.bullets {
        lines.push(Line::from(vec![
            Span::styled(format!("• {}: ", lead), styles::brand_style()),
            Span::styled(rest, styles::body_style()),
        ]));
    }

    let block = Block::default()
        .title(Span::styled(format!(" {} ", product.name), styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn render_waitlist(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Waitlist", styles::heading_style())),
        Line::from(Span::styled(
            "Leave your details and we'll contact you to set up a pilot in Ocaña.",
            styles::body_style(),
        )),
        Line::from(vec![
            Span::styled("Contact us: ", styles::muted_style()),
            Span::styled(WHATSAPP_URL, styles::key_style()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}
