//! Keyboard navigation between cells of one grid.
//!
//! Arrow keys move one cell and saturate at the edges, with three wraps:
//! Left from the first column goes to the end of the previous row, Right from
//! the last column goes to the start of the next row, and Shift+Down from the
//! last row goes back to the top of the same column. Enter behaves like Right.

use super::grid::{Dimensions, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
}

/// Result of offering a key press to the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Focus moves; the key's default effect is suppressed
    MoveTo(Position),
    /// A navigation key at a boundary; nothing happens
    Stay,
}

/// Compute the focus transition for `key` pressed at `from`.
pub fn navigate(from: Position, key: NavKey, shift: bool, dims: Dimensions) -> Navigation {
    let last_row = dims.rows() - 1;
    let last_col = dims.cols() - 1;
    let Position { row, col } = from;

    let target = match key {
        NavKey::Up if row > 0 => Some(Position::new(row - 1, col)),
        NavKey::Down if row < last_row => Some(Position::new(row + 1, col)),
        NavKey::Down if shift => Some(Position::new(0, col)),
        NavKey::Left if col > 0 => Some(Position::new(row, col - 1)),
        NavKey::Left if row > 0 => Some(Position::new(row - 1, last_col)),
        NavKey::Right | NavKey::Enter if col < last_col => Some(Position::new(row, col + 1)),
        NavKey::Right | NavKey::Enter if row < last_row => Some(Position::new(row + 1, 0)),
        _ => None,
    };

    // Shift+Down on a single-row grid targets the cell itself, which still
    // counts as a move: the key is consumed and the text reselected
    match target {
        Some(to) => Navigation::MoveTo(to),
        None => Navigation::Stay,
    }
}
