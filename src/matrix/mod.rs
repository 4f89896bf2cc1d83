// Matrix tool: two editable grids, keyboard navigation and remote operations

pub mod grid;
pub mod navigation;
pub mod operation;
pub mod session;

pub use grid::{Dimensions, GridSet, Matrix, MatrixGrid, Position, Slot};
pub use navigation::{navigate, NavKey, Navigation};
pub use operation::{dispatch, format_number, Operation, OperationOutcome, OperationRequest, ResultView};
pub use session::{Focus, GridInput, InputOutcome, MatrixSession};
