// Widgets for the workbench panes

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::layout::{LabColors, WorkbenchLayout};
use crate::matrix::{Focus, MatrixSession, Position, ResultView, Slot};

const CELL_WIDTH: usize = 7;

fn field_span(label: &str, text: &str, focused: bool, selected: bool) -> Vec<Span<'static>> {
    let style = match (focused, selected) {
        (true, true) => Style::default().fg(LabColors::CELL_SELECTED).add_modifier(Modifier::REVERSED),
        (true, false) => Style::default().fg(LabColors::CELL_FOCUSED).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(LabColors::TEXT_PRIMARY),
    };
    vec![
        Span::styled(format!("{}: ", label), Style::default().fg(LabColors::TEXT_MUTED)),
        Span::styled(format!("[{:>2}]", text), style),
        Span::raw("  "),
    ]
}

pub fn render_grid(frame: &mut Frame, area: Rect, session: &MatrixSession, slot: Slot) {
    let focus = session.focus();
    let selected = session.is_selected();
    let grid = session.grids().get(slot);

    let title = match grid {
        Some(grid) => format!(
            " Matrix {} ({} × {}) ",
            slot.label(),
            grid.dimensions().rows(),
            grid.dimensions().cols()
        ),
        None => format!(" Matrix {} ", slot.label()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(WorkbenchLayout::border_style(focus.slot() == slot));

    let mut header = field_span(
        "Rows",
        session.rows_field(slot),
        focus == Focus::Rows(slot),
        selected,
    );
    header.extend(field_span(
        "Cols",
        session.cols_field(slot),
        focus == Focus::Cols(slot),
        selected,
    ));
    let mut lines = vec![Line::from(header), Line::default()];

    match grid {
        Some(grid) => {
            for (row, texts) in grid.text_rows().into_iter().enumerate() {
                let mut spans = Vec::with_capacity(texts.len() * 2);
                for (col, text) in texts.into_iter().enumerate() {
                    let position = Position::new(row, col);
                    let is_focused = focus == Focus::Cell(slot, position);
                    let shown = if text.is_empty() {
                        position.placeholder()
                    } else {
                        text.to_string()
                    };
                    let style = if is_focused && selected {
                        Style::default().fg(LabColors::CELL_SELECTED).add_modifier(Modifier::REVERSED)
                    } else if is_focused {
                        Style::default().fg(LabColors::CELL_FOCUSED).add_modifier(Modifier::BOLD)
                    } else if text.is_empty() {
                        Style::default().fg(LabColors::TEXT_MUTED)
                    } else {
                        Style::default().fg(LabColors::TEXT_PRIMARY)
                    };
                    spans.push(Span::styled(format!("{:>width$}", shown, width = CELL_WIDTH), style));
                    spans.push(Span::raw(" "));
                }
                lines.push(Line::from(spans));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "Set the dimensions and press Enter",
            Style::default().fg(LabColors::TEXT_MUTED),
        ))),
    }

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

pub fn render_results(frame: &mut Frame, area: Rect, result: &ResultView) {
    let style = match result {
        ResultView::Placeholder => Style::default().fg(LabColors::TEXT_MUTED),
        ResultView::Processing(_) => Style::default().fg(LabColors::STATUS_WARNING),
        ResultView::Error(_) => Style::default().fg(LabColors::STATUS_ERROR),
        ResultView::Matrix { .. } | ResultView::Scalar(_) => {
            Style::default().fg(LabColors::STATUS_SUCCESS)
        }
    };

    let lines: Vec<Line> = result
        .to_lines()
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            // only the banner line carries the status color
            if i == 0 {
                Line::from(Span::styled(line, style))
            } else {
                Line::from(Span::styled(line, Style::default().fg(LabColors::TEXT_PRIMARY)))
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Result ")
        .border_style(Style::default().fg(LabColors::BORDER));
    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

pub fn render_status(frame: &mut Frame, area: Rect, session: &MatrixSession) {
    let mut spans = Vec::new();
    match session.status() {
        Some(status) => {
            let color = if status.is_error {
                LabColors::STATUS_ERROR
            } else {
                LabColors::STATUS_SUCCESS
            };
            spans.push(Span::styled(status.text.clone(), Style::default().fg(color)));
        }
        None => spans.push(Span::styled("Ready", Style::default().fg(LabColors::TEXT_MUTED))),
    }
    if session.in_flight() > 0 {
        spans.push(Span::styled(
            format!("  ({} request(s) in flight)", session.in_flight()),
            Style::default().fg(LabColors::STATUS_WARNING),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Status ")
        .border_style(Style::default().fg(LabColors::BORDER));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

pub fn render_help(frame: &mut Frame, area: Rect) {
    let help = "Tab fields · Arrows/Enter move · F5 add · F6 subtract · F7 multiply · F8 transpose · F9 det · Esc quit";
    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(LabColors::TEXT_MUTED))),
        area,
    );
}
