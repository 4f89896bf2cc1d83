// Matrix tool session: the two grids, their dimension fields, focus and the
// latest result. The TUI renders straight from this state.

use tracing::{debug, info};

use super::grid::{Dimensions, GridSet, Position, Slot};
use super::navigation::{navigate, NavKey, Navigation};
use super::operation::{Operation, OperationOutcome, OperationRequest, ResultView};
use crate::error::{LabError, LabResult};

/// Where keyboard input goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Rows(Slot),
    Cols(Slot),
    Cell(Slot, Position),
}

impl Focus {
    pub fn slot(self) -> Slot {
        match self {
            Focus::Rows(slot) | Focus::Cols(slot) | Focus::Cell(slot, _) => slot,
        }
    }

    /// Tab order: rows, cols, grid for slot 1, then the same for slot 2
    fn order_index(self) -> usize {
        let base = match self.slot() {
            Slot::One => 0,
            Slot::Two => 3,
        };
        base + match self {
            Focus::Rows(_) => 0,
            Focus::Cols(_) => 1,
            Focus::Cell(..) => 2,
        }
    }

    fn from_order_index(index: usize) -> Self {
        let slot = if index % 6 < 3 { Slot::One } else { Slot::Two };
        match index % 3 {
            0 => Focus::Rows(slot),
            1 => Focus::Cols(slot),
            _ => Focus::Cell(slot, Position::new(0, 0)),
        }
    }
}

/// Key input after terminal-specific decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridInput {
    Nav { key: NavKey, shift: bool },
    Char(char),
    Backspace,
    NextField,
    PrevField,
}

#[derive(Debug)]
pub enum InputOutcome {
    /// Focus moved to another cell or field
    Moved,
    /// Text of a cell or field changed
    Edited,
    /// Enter in a dimension field rebuilt the grid
    Rebuilt(Slot),
    /// Rebuild was refused; the grid is unchanged
    Rejected(LabError),
    /// The key was not intercepted
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone)]
struct DimensionFields {
    rows: String,
    cols: String,
}

#[derive(Debug)]
pub struct MatrixSession {
    grids: GridSet,
    fields: [DimensionFields; 2],
    focus: Focus,
    /// Next typed character replaces the focused cell's text
    selected: bool,
    result: ResultView,
    status: Option<StatusLine>,
    in_flight: usize,
}

fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::One => 0,
        Slot::Two => 1,
    }
}

fn accepts_numeric(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

impl MatrixSession {
    /// Start a session with both grids built at `rows × cols`
    pub fn new(rows: usize, cols: usize) -> LabResult<Self> {
        let mut session = Self {
            grids: GridSet::new(),
            fields: [
                DimensionFields {
                    rows: rows.to_string(),
                    cols: cols.to_string(),
                },
                DimensionFields {
                    rows: rows.to_string(),
                    cols: cols.to_string(),
                },
            ],
            focus: Focus::Cell(Slot::One, Position::new(0, 0)),
            selected: true,
            result: ResultView::Placeholder,
            status: None,
            in_flight: 0,
        };
        for slot in Slot::ALL {
            session.rebuild(slot)?;
        }
        session.focus = Focus::Cell(Slot::One, Position::new(0, 0));
        session.status = None;
        Ok(session)
    }

    pub fn grids(&self) -> &GridSet {
        &self.grids
    }

    pub fn grids_mut(&mut self) -> &mut GridSet {
        &mut self.grids
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn result(&self) -> &ResultView {
        &self.result
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn rows_field(&self, slot: Slot) -> &str {
        &self.fields[slot_index(slot)].rows
    }

    pub fn cols_field(&self, slot: Slot) -> &str {
        &self.fields[slot_index(slot)].cols
    }

    pub fn set_dimension_fields(&mut self, slot: Slot, rows: &str, cols: &str) {
        let fields = &mut self.fields[slot_index(slot)];
        fields.rows = rows.to_string();
        fields.cols = cols.to_string();
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error,
        });
    }

    /// Rebuild a slot from its dimension fields. Invalid fields leave the
    /// existing grid (and focus) alone.
    pub fn rebuild(&mut self, slot: Slot) -> LabResult<Dimensions> {
        let fields = &self.fields[slot_index(slot)];
        let dims = Dimensions::parse(&fields.rows, &fields.cols).map_err(|e| {
            self.status = Some(StatusLine {
                text: e.user_message(),
                is_error: true,
            });
            e
        })?;

        self.grids.build(slot, dims.rows(), dims.cols())?;
        info!(slot = slot.number(), rows = dims.rows(), cols = dims.cols(), "matrix grid built");

        if let Focus::Cell(focused, _) = self.focus {
            if focused == slot {
                self.focus = Focus::Cell(slot, Position::new(0, 0));
                self.selected = true;
            }
        }
        self.set_status(
            format!("Matrix {} is {} × {}", slot.label(), dims.rows(), dims.cols()),
            false,
        );
        Ok(dims)
    }

    pub fn focus_cell(&mut self, slot: Slot, position: Position) -> bool {
        match self.grids.get(slot) {
            Some(grid) if grid.contains(position) => {
                self.focus = Focus::Cell(slot, position);
                self.selected = true;
                true
            }
            _ => false,
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let current = self.focus.order_index();
        let next = if forward { current + 1 } else { current + 5 };
        self.focus = Focus::from_order_index(next);
        self.selected = true;
    }

    pub fn handle_input(&mut self, input: GridInput) -> InputOutcome {
        match input {
            GridInput::NextField => {
                self.cycle_focus(true);
                return InputOutcome::Moved;
            }
            GridInput::PrevField => {
                self.cycle_focus(false);
                return InputOutcome::Moved;
            }
            _ => {}
        }

        match self.focus {
            Focus::Cell(slot, position) => self.handle_cell_input(slot, position, input),
            Focus::Rows(slot) | Focus::Cols(slot) => self.handle_field_input(slot, input),
        }
    }

    fn handle_cell_input(&mut self, slot: Slot, position: Position, input: GridInput) -> InputOutcome {
        let Some(grid) = self.grids.get_mut(slot) else {
            return InputOutcome::Ignored;
        };

        match input {
            GridInput::Nav { key, shift } => match navigate(position, key, shift, grid.dimensions()) {
                Navigation::MoveTo(target) => {
                    debug!(slot = slot.number(), ?position, ?target, "focus moved");
                    self.focus = Focus::Cell(slot, target);
                    self.selected = true;
                    InputOutcome::Moved
                }
                // Boundary: swallow nothing, change nothing
                Navigation::Stay => InputOutcome::Ignored,
            },
            GridInput::Char(c) if accepts_numeric(c) => {
                let Some(cell) = grid.cell_mut(position) else {
                    return InputOutcome::Ignored;
                };
                if self.selected {
                    cell.text.clear();
                    self.selected = false;
                }
                cell.text.push(c);
                InputOutcome::Edited
            }
            GridInput::Backspace => {
                let Some(cell) = grid.cell_mut(position) else {
                    return InputOutcome::Ignored;
                };
                if self.selected {
                    cell.text.clear();
                    self.selected = false;
                } else {
                    cell.text.pop();
                }
                InputOutcome::Edited
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn handle_field_input(&mut self, slot: Slot, input: GridInput) -> InputOutcome {
        let is_rows = matches!(self.focus, Focus::Rows(_));
        let selected = self.selected;
        let fields = &mut self.fields[slot_index(slot)];
        let field = if is_rows { &mut fields.rows } else { &mut fields.cols };

        match input {
            GridInput::Char(c) if c.is_ascii_digit() => {
                if selected {
                    field.clear();
                }
                if field.len() < 2 {
                    field.push(c);
                }
                self.selected = false;
                InputOutcome::Edited
            }
            GridInput::Backspace => {
                if selected {
                    field.clear();
                } else {
                    field.pop();
                }
                self.selected = false;
                InputOutcome::Edited
            }
            GridInput::Nav { key: NavKey::Enter, .. } => match self.rebuild(slot) {
                Ok(_) => InputOutcome::Rebuilt(slot),
                Err(e) => InputOutcome::Rejected(e),
            },
            _ => InputOutcome::Ignored,
        }
    }

    /// The slot a unary operation targets: whichever slot has focus
    pub fn target_slot(&self) -> Slot {
        self.focus.slot()
    }

    /// Build the request for `operation` and mark it in flight. Local
    /// failures are shown in the result panel and nothing is sent.
    pub fn begin_operation(&mut self, operation: Operation) -> LabResult<OperationRequest> {
        match OperationRequest::prepare(&self.grids, operation, self.target_slot()) {
            Ok(request) => {
                self.in_flight += 1;
                self.result = ResultView::Processing(operation);
                Ok(request)
            }
            Err(e) => {
                self.result = ResultView::failure(&e);
                Err(e)
            }
        }
    }

    /// Record the outcome of a request started with `begin_operation`
    pub fn finish_operation(&mut self, request: &OperationRequest, outcome: &LabResult<OperationOutcome>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.result = match outcome {
            Ok(outcome) => ResultView::success(request, outcome),
            Err(e) => ResultView::failure(e),
        };
    }
}
