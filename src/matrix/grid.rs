// Editable matrix grids: building, cell editing and value extraction

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LabError, LabResult};

pub const MIN_DIMENSION: usize = 1;
pub const MAX_DIMENSION: usize = 10;

/// A semantic matrix: `rows` sequences of `cols` numbers
pub type Matrix = Vec<Vec<f64>>;

/// One of the two matrix identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::One, Slot::Two];

    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }

    pub fn from_number(number: u8) -> LabResult<Self> {
        match number {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(LabError::validation(format!(
                "Matrix slot must be 1 or 2, got {}",
                other
            ))),
        }
    }

    /// Name used when rendering results for this slot
    pub fn label(self) -> &'static str {
        match self {
            Slot::One => "A",
            Slot::Two => "B",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Validated grid dimensions, each in `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    rows: usize,
    cols: usize,
}

impl Dimensions {
    pub fn new(rows: usize, cols: usize) -> LabResult<Self> {
        let valid = |n: usize| (MIN_DIMENSION..=MAX_DIMENSION).contains(&n);
        if !valid(rows) || !valid(cols) {
            return Err(LabError::validation(format!(
                "Matrix dimensions must be between {} and {}",
                MIN_DIMENSION, MAX_DIMENSION
            )));
        }
        Ok(Self { rows, cols })
    }

    /// Parse the text of a rows/cols form field pair
    pub fn parse(rows: &str, cols: &str) -> LabResult<Self> {
        let parse = |text: &str| {
            text.trim().parse::<usize>().map_err(|_| {
                LabError::validation(format!(
                    "Matrix dimensions must be between {} and {}",
                    MIN_DIMENSION, MAX_DIMENSION
                ))
            })
        };
        Self::new(parse(rows)?, parse(cols)?)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Shown in place of an empty cell
    pub fn placeholder(self) -> String {
        format!("[{},{}]", self.row, self.col)
    }
}

/// One editable numeric input
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub slot: Slot,
    pub position: Position,
    pub text: String,
}

impl Cell {
    fn new(slot: Slot, row: usize, col: usize) -> Self {
        Self {
            slot,
            position: Position::new(row, col),
            text: "0".to_string(),
        }
    }

    /// Numeric value of the cell; anything unparsable or non-finite reads as 0
    pub fn value(&self) -> f64 {
        match self.text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v != 0.0 => v,
            _ => 0.0,
        }
    }
}

/// A fully built grid for one slot
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixGrid {
    slot: Slot,
    dimensions: Dimensions,
    cells: Vec<Cell>,
}

impl MatrixGrid {
    /// Materialize `rows × cols` cells in row-major order, all reading "0"
    pub fn build(slot: Slot, dimensions: Dimensions) -> Self {
        let mut cells = Vec::with_capacity(dimensions.cell_count());
        for row in 0..dimensions.rows() {
            for col in 0..dimensions.cols() {
                cells.push(Cell::new(slot, row, col));
            }
        }
        Self {
            slot,
            dimensions,
            cells,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.dimensions.rows() && position.col < self.dimensions.cols()
    }

    fn index(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.row * self.dimensions.cols() + position.col)
        } else {
            None
        }
    }

    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.index(position).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        self.index(position).map(move |i| &mut self.cells[i])
    }

    /// Overwrite a cell's text; positions outside the grid are ignored
    pub fn set_text(&mut self, position: Position, text: impl Into<String>) -> bool {
        match self.cell_mut(position) {
            Some(cell) => {
                cell.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Read the grid into a semantic matrix
    pub fn values(&self) -> Matrix {
        self.cells
            .chunks(self.dimensions.cols())
            .map(|row| row.iter().map(Cell::value).collect())
            .collect()
    }

    /// Rows of cell text, for drawing
    pub fn text_rows(&self) -> Vec<Vec<&str>> {
        self.cells
            .chunks(self.dimensions.cols())
            .map(|row| row.iter().map(|c| c.text.as_str()).collect())
            .collect()
    }
}

/// The two grids of the matrix tool; a slot stays `None` until first built
#[derive(Debug, Clone, Default)]
pub struct GridSet {
    one: Option<MatrixGrid>,
    two: Option<MatrixGrid>,
}

impl GridSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&MatrixGrid> {
        match slot {
            Slot::One => self.one.as_ref(),
            Slot::Two => self.two.as_ref(),
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut MatrixGrid> {
        match slot {
            Slot::One => self.one.as_mut(),
            Slot::Two => self.two.as_mut(),
        }
    }

    /// Validate and rebuild a slot. On error the existing grid is untouched.
    pub fn build(&mut self, slot: Slot, rows: usize, cols: usize) -> LabResult<&MatrixGrid> {
        let dimensions = Dimensions::new(rows, cols)?;
        let grid = MatrixGrid::build(slot, dimensions);
        let entry = match slot {
            Slot::One => &mut self.one,
            Slot::Two => &mut self.two,
        };
        Ok(entry.insert(grid))
    }

    /// Read a slot into a matrix, or `None` when it was never built
    pub fn extract(&self, slot: Slot) -> Option<Matrix> {
        self.get(slot).map(MatrixGrid::values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_produces_rows_times_cols_zero_cells() {
        for rows in MIN_DIMENSION..=MAX_DIMENSION {
            for cols in MIN_DIMENSION..=MAX_DIMENSION {
                let mut grids = GridSet::new();
                let grid = grids.build(Slot::One, rows, cols).unwrap();
                assert_eq!(grid.cells().len(), rows * cols);
                assert!(grid.cells().iter().all(|c| c.text == "0"));
                assert!(grid.cells().iter().all(|c| c.slot == Slot::One));
            }
        }
    }

    #[test]
    fn test_text_rows_follow_the_grid_shape() {
        let mut grid = MatrixGrid::build(Slot::One, Dimensions::new(2, 3).unwrap());
        grid.set_text(Position::new(1, 2), "4.5");
        grid.set_text(Position::new(0, 1), "");

        let rows = grid.text_rows();
        assert_eq!(rows, vec![vec!["0", "", "0"], vec!["0", "0", "4.5"]]);
    }

    #[test]
    fn test_cells_are_row_major_and_tagged() {
        let grid = MatrixGrid::build(Slot::Two, Dimensions::new(2, 3).unwrap());
        let coords: Vec<(usize, usize)> = grid
            .cells()
            .iter()
            .map(|c| (c.position.row, c.position.col))
            .collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        assert_eq!(grid.cells()[4].position.placeholder(), "[1,1]");
    }

    #[test]
    fn test_out_of_range_dimensions_leave_prior_grid() {
        let mut grids = GridSet::new();
        grids.build(Slot::One, 2, 2).unwrap();
        grids
            .get_mut(Slot::One)
            .unwrap()
            .set_text(Position::new(1, 1), "7");

        for (rows, cols) in [(0, 2), (2, 0), (11, 1), (1, 11)] {
            let err = grids.build(Slot::One, rows, cols).unwrap_err();
            assert_eq!(err.to_string(), "Matrix dimensions must be between 1 and 10");
        }

        let grid = grids.get(Slot::One).unwrap();
        assert_eq!(grid.dimensions(), Dimensions::new(2, 2).unwrap());
        assert_eq!(grids.extract(Slot::One), Some(vec![vec![0.0, 0.0], vec![0.0, 7.0]]));
    }

    #[test]
    fn test_rejected_build_on_empty_slot_stays_empty() {
        let mut grids = GridSet::new();
        assert!(grids.build(Slot::Two, 0, 3).is_err());
        assert!(grids.get(Slot::Two).is_none());
    }

    #[test]
    fn test_rebuild_discards_stale_cells() {
        let mut grids = GridSet::new();
        grids.build(Slot::One, 3, 3).unwrap();
        grids
            .get_mut(Slot::One)
            .unwrap()
            .set_text(Position::new(2, 2), "9");
        let grid = grids.build(Slot::One, 1, 2).unwrap();
        assert_eq!(grid.cells().len(), 2);
        assert_eq!(grids.extract(Slot::One), Some(vec![vec![0.0, 0.0]]));
    }

    #[test]
    fn test_extract_unbuilt_slot_is_none() {
        let grids = GridSet::new();
        assert_eq!(grids.extract(Slot::One), None);
    }

    #[test]
    fn test_extract_coerces_unparsable_to_zero() {
        let mut grids = GridSet::new();
        grids.build(Slot::One, 2, 3).unwrap();
        let grid = grids.get_mut(Slot::One).unwrap();
        grid.set_text(Position::new(0, 0), "1.5");
        grid.set_text(Position::new(0, 1), "abc");
        grid.set_text(Position::new(0, 2), "");
        grid.set_text(Position::new(1, 0), " -4 ");
        grid.set_text(Position::new(1, 1), "1e3");
        grid.set_text(Position::new(1, 2), "NaN");

        let expected = vec![vec![1.5, 0.0, 0.0], vec![-4.0, 1000.0, 0.0]];
        assert_eq!(grids.extract(Slot::One), Some(expected.clone()));
        // pure read
        assert_eq!(grids.extract(Slot::One), Some(expected));
    }

    #[test]
    fn test_infinite_and_negative_zero_read_as_zero() {
        let mut grid = MatrixGrid::build(Slot::One, Dimensions::new(1, 2).unwrap());
        grid.set_text(Position::new(0, 0), "inf");
        grid.set_text(Position::new(0, 1), "-0");
        let values = grid.values();
        assert_eq!(values, vec![vec![0.0, 0.0]]);
        assert!(values[0][1].is_sign_positive());
    }

    #[test]
    fn test_set_text_outside_grid_is_ignored() {
        let mut grid = MatrixGrid::build(Slot::One, Dimensions::new(1, 1).unwrap());
        assert!(!grid.set_text(Position::new(1, 0), "5"));
        assert_eq!(grid.values(), vec![vec![0.0]]);
    }

    #[test]
    fn test_dimension_fields_parse() {
        assert_eq!(Dimensions::parse(" 4", "2 ").unwrap(), Dimensions::new(4, 2).unwrap());
        assert!(Dimensions::parse("x", "2").is_err());
        assert!(Dimensions::parse("-1", "2").is_err());
    }

    #[test]
    fn test_slot_labels() {
        assert_eq!(Slot::One.label(), "A");
        assert_eq!(Slot::Two.label(), "B");
        assert_eq!(Slot::from_number(2).unwrap(), Slot::Two);
        assert!(Slot::from_number(3).is_err());
    }
}
