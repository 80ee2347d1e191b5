//! UI rendering for the trace viewer.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::binary::fixed::format_value;
use crate::cpu::RegisterView;
use super::app::ViewerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &ViewerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    // Left side: display, registers, wires, status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_display(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_wires(frame, left_chunks[2], app);
    draw_status(frame, left_chunks[3], app);

    // Right side: memory and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(18),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the calculator display.
fn draw_display(frame: &mut Frame, area: Rect, app: &ViewerApp) {
    let text = &app.current().display;
    let style = if app.sim.outcome.is_error() && !text.is_empty() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let display = Paragraph::new(text.as_str())
        .style(style)
        .alignment(Alignment::Right)
        .block(Block::default()
            .title(format!(" {} ", app.sim.tokens.join(" ")))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)));

    frame.render_widget(display, area);
}

fn lit_style(lit: bool) -> Style {
    if lit {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn register_line<T: std::fmt::Display>(name: &str, view: &RegisterView<T>, note: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{:<4}", name)),
        Span::styled(format!("{:>8}", view.value), lit_style(view.lit)),
        Span::raw(note),
    ])
}

/// Draw the control unit and ALU registers.
fn draw_registers(frame: &mut Frame, area: Rect, app: &ViewerApp) {
    let s = app.current();

    let content = vec![
        register_line("PC", &s.pc, String::new()),
        register_line("MAR", &s.mar, String::new()),
        register_line("IBR", &s.ibr, String::new()),
        register_line("IR", &s.ir, String::new()),
        Line::from(vec![
            Span::raw("OP  "),
            Span::styled(format!("{:>8}", s.opcode_symbol()), lit_style(s.opcode_lit)),
            Span::raw("   ALU: "),
            Span::styled(
                if s.alu_on { "ON" } else { "off" },
                if s.alu_on { Style::default().fg(Color::Green) } else { Style::default().fg(Color::DarkGray) },
            ),
        ]),
        register_line("OPND", &s.operand, format!(" = {}", format_value(s.operand.value.value()))),
        register_line("AC", &s.ac, format!(" = {}", format_value(s.ac.value.value()))),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw the data paths, active ones highlighted.
fn draw_wires(frame: &mut Frame, area: Rect, app: &ViewerApp) {
    let items: Vec<ListItem> = app
        .current()
        .wires
        .labeled()
        .iter()
        .map(|(name, on)| {
            let style = if *on {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(format!("{} {}", if *on { "●" } else { "○" }, name)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Wires ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw memory view.
fn draw_memory(frame: &mut Frame, area: Rect, app: &ViewerApp) {
    let items: Vec<ListItem> = app
        .memory_rows()
        .into_iter()
        .map(|(addr, text, lit)| {
            let style = if lit {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if text.starts_with('-') {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{}: {}", addr, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &ViewerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("←/→: Step  p: Play  Home/End: Jump  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
