// Workbench layout: two grid panes, the result panel, status and help bars

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
};

/// Dark terminal color scheme
pub struct LabColors;

impl LabColors {
    pub const BORDER: Color = Color::Rgb(64, 64, 64);
    pub const BORDER_FOCUSED: Color = Color::Rgb(58, 128, 200);
    pub const TEXT_PRIMARY: Color = Color::Rgb(240, 240, 240);
    pub const TEXT_MUTED: Color = Color::Rgb(120, 120, 120);
    pub const CELL_FOCUSED: Color = Color::Rgb(58, 128, 200);
    pub const CELL_SELECTED: Color = Color::Rgb(200, 160, 58);
    pub const STATUS_SUCCESS: Color = Color::Rgb(140, 200, 140);
    pub const STATUS_WARNING: Color = Color::Rgb(200, 180, 100);
    pub const STATUS_ERROR: Color = Color::Rgb(200, 100, 100);
}

#[derive(Debug)]
pub struct WorkbenchLayout {
    pub matrix_a: Rect,
    pub matrix_b: Rect,
    pub results: Rect,
    pub status_bar: Rect,
    pub help_bar: Rect,
}

impl WorkbenchLayout {
    pub fn new(area: Rect) -> Self {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Grids and results
                Constraint::Length(3), // Status bar
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        if Self::is_compact_mode(area) {
            let content = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Percentage(33),
                    Constraint::Percentage(33),
                    Constraint::Percentage(34),
                ])
                .split(main_chunks[0]);
            return Self {
                matrix_a: content[0],
                matrix_b: content[1],
                results: content[2],
                status_bar: main_chunks[1],
                help_bar: main_chunks[2],
            };
        }

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Both grids
                Constraint::Percentage(40), // Results
            ])
            .split(main_chunks[0]);
        let grids = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(content[0]);

        Self {
            matrix_a: grids[0],
            matrix_b: grids[1],
            results: content[1],
            status_bar: main_chunks[1],
            help_bar: main_chunks[2],
        }
    }

    /// Narrow terminals stack every pane vertically
    pub fn is_compact_mode(area: Rect) -> bool {
        area.width < 80
    }

    pub fn border_style(focused: bool) -> Style {
        if focused {
            Style::default().fg(LabColors::BORDER_FOCUSED)
        } else {
            Style::default().fg(LabColors::BORDER)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_layout_puts_results_beside_grids() {
        let layout = WorkbenchLayout::new(Rect::new(0, 0, 120, 40));
        assert!(layout.results.x > layout.matrix_a.x);
        assert_eq!(layout.matrix_a.x, layout.matrix_b.x);
        assert!(layout.matrix_b.y > layout.matrix_a.y);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn test_compact_layout_stacks_panes() {
        let layout = WorkbenchLayout::new(Rect::new(0, 0, 60, 40));
        assert_eq!(layout.matrix_a.x, layout.results.x);
        assert!(layout.results.y > layout.matrix_b.y);
    }
}
