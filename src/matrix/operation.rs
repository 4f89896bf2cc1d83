// Matrix operations: request shaping, dispatch and result rendering

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use super::grid::{GridSet, Matrix, Slot};
use crate::client::{FailureText, ServiceClient};
use crate::error::{LabError, LabResult};
use crate::logging::PerformanceTimer;

const OPERATION_TEXT: FailureText = FailureText {
    transport: "Request failed",
    fallback: "Operation failed",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Transpose,
    Determinant,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Transpose,
        Operation::Determinant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Transpose => "transpose",
            Operation::Determinant => "determinant",
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operation::Transpose | Operation::Determinant)
    }

    pub fn endpoint(self) -> String {
        format!("/api/{}", self.name())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LabError::validation(format!("Unknown operation: {}", s)))
    }
}

#[derive(Debug, Serialize)]
struct UnaryBody<'a> {
    matrix: &'a Matrix,
}

#[derive(Debug, Serialize)]
struct BinaryBody<'a> {
    matrix1: &'a Matrix,
    matrix2: &'a Matrix,
}

/// One request to the service, built fresh for a single user action
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    Unary {
        operation: Operation,
        slot: Slot,
        matrix: Matrix,
    },
    Binary {
        operation: Operation,
        matrix1: Matrix,
        matrix2: Matrix,
    },
}

impl OperationRequest {
    /// Read the grids the operation needs. Fails locally when a required
    /// slot was never built. `slot` is only consulted for unary operations.
    pub fn prepare(grids: &GridSet, operation: Operation, slot: Slot) -> LabResult<Self> {
        if operation.is_unary() {
            let matrix = grids.extract(slot).ok_or_else(|| {
                LabError::validation(format!("Please create Matrix {} first", slot.number()))
            })?;
            Ok(OperationRequest::Unary {
                operation,
                slot,
                matrix,
            })
        } else {
            match (grids.extract(Slot::One), grids.extract(Slot::Two)) {
                (Some(matrix1), Some(matrix2)) => Ok(OperationRequest::Binary {
                    operation,
                    matrix1,
                    matrix2,
                }),
                _ => Err(LabError::validation("Please create both matrices first")),
            }
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            OperationRequest::Unary { operation, .. } => *operation,
            OperationRequest::Binary { operation, .. } => *operation,
        }
    }

    /// Label the result is rendered under ("A" / "B" for unary requests)
    pub fn label(&self) -> &'static str {
        match self {
            OperationRequest::Unary { slot, .. } => slot.label(),
            OperationRequest::Binary { .. } => "Result",
        }
    }

    pub fn body(&self) -> Value {
        let body = match self {
            OperationRequest::Unary { matrix, .. } => serde_json::to_value(UnaryBody { matrix }),
            OperationRequest::Binary { matrix1, matrix2, .. } => {
                serde_json::to_value(BinaryBody { matrix1, matrix2 })
            }
        };
        // Matrices of finite f64 always serialize
        body.unwrap_or(Value::Null)
    }
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    result: Value,
    #[serde(default)]
    shape: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Matrix { result: Matrix, shape: (usize, usize) },
    Scalar(f64),
}

impl OperationOutcome {
    fn from_response(operation: Operation, response: OperationResponse) -> LabResult<Self> {
        if operation == Operation::Determinant {
            let value = response.result.as_f64().ok_or_else(|| {
                LabError::malformed(OPERATION_TEXT.transport, "determinant result is not a number")
            })?;
            return Ok(OperationOutcome::Scalar(value));
        }

        let result: Matrix = serde_json::from_value(response.result)
            .map_err(|e| LabError::malformed(OPERATION_TEXT.transport, e.to_string()))?;
        let shape = match response.shape.as_deref() {
            Some([rows, cols]) => (*rows, *cols),
            _ => (result.len(), result.first().map(Vec::len).unwrap_or(0)),
        };
        Ok(OperationOutcome::Matrix { result, shape })
    }
}

/// Send a prepared request and decode the outcome
pub async fn dispatch(client: &ServiceClient, request: &OperationRequest) -> LabResult<OperationOutcome> {
    let operation = request.operation();
    let _timer = PerformanceTimer::start(format!("{} request", operation));
    match request {
        OperationRequest::Unary { slot, matrix, .. } => info!(
            %operation,
            slot = slot.number(),
            rows = matrix.len(),
            cols = matrix.first().map(Vec::len).unwrap_or(0),
            "dispatching unary operation"
        ),
        OperationRequest::Binary { matrix1, matrix2, .. } => info!(
            %operation,
            lhs = ?(matrix1.len(), matrix1.first().map(Vec::len).unwrap_or(0)),
            rhs = ?(matrix2.len(), matrix2.first().map(Vec::len).unwrap_or(0)),
            "dispatching binary operation"
        ),
    }

    let response: OperationResponse = client
        .post_json(&operation.endpoint(), &request.body(), OPERATION_TEXT)
        .await
        .map_err(|e| {
            warn!(%operation, error = %e, "operation failed");
            e
        })?;
    OperationOutcome::from_response(operation, response)
}

/// Integers (or values within 1e-10 of one) print without a fraction;
/// magnitudes of 1e21 and up, or below 1e-6, use exponent notation ("1e+21", "2.5e-7")
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.abs() >= 1e21 {
        return exponent_form(value);
    }
    let rounded = value.round();
    if (value - rounded).abs() < 1e-10 {
        // avoids "-0"
        format!("{}", rounded + 0.0)
    } else if value.abs() < 1e-6 {
        exponent_form(value)
    } else {
        format!("{}", value)
    }
}

fn exponent_form(value: f64) -> String {
    let text = format!("{:e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
        _ => text,
    }
}

/// What the result panel shows after an operation
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Placeholder,
    Processing(Operation),
    Matrix {
        heading: String,
        rows: Vec<Vec<String>>,
    },
    Scalar(String),
    Error(String),
}

impl ResultView {
    pub fn success(request: &OperationRequest, outcome: &OperationOutcome) -> Self {
        match outcome {
            OperationOutcome::Scalar(value) => {
                ResultView::Scalar(format!("det({}) = {}", request.label(), format_number(*value)))
            }
            OperationOutcome::Matrix { result, shape } => {
                let heading = match request.operation() {
                    Operation::Transpose => {
                        format!("{}ᵀ Shape: {} × {}", request.label(), shape.0, shape.1)
                    }
                    _ => format!("Result Shape: {} × {}", shape.0, shape.1),
                };
                ResultView::Matrix {
                    heading,
                    rows: result
                        .iter()
                        .map(|row| row.iter().map(|v| format_number(*v)).collect())
                        .collect(),
                }
            }
        }
    }

    pub fn failure(error: &LabError) -> Self {
        ResultView::Error(error.user_message())
    }

    /// Plain-text rendering, used by the `op` command
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            ResultView::Placeholder => vec!["Results will appear here".to_string()],
            ResultView::Processing(_) => vec!["Processing...".to_string()],
            ResultView::Scalar(text) => vec!["✓ Operation Successful!".to_string(), text.clone()],
            ResultView::Error(message) => vec![format!("Error: {}", message)],
            ResultView::Matrix { heading, rows } => {
                let width = rows
                    .iter()
                    .flatten()
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(1);
                let mut lines = vec!["✓ Operation Successful!".to_string(), heading.clone()];
                for row in rows {
                    let cells: Vec<String> = row.iter().map(|c| format!("{:>width$}", c)).collect();
                    lines.push(format!("[ {} ]", cells.join("  ")));
                }
                lines
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{RecordedCall, RecordingTransport};
    use crate::matrix::grid::Position;
    use serde_json::json;
    use std::sync::Arc;

    fn grids_with(slot_one: Option<(usize, usize)>, slot_two: Option<(usize, usize)>) -> GridSet {
        let mut grids = GridSet::new();
        if let Some((r, c)) = slot_one {
            grids.build(Slot::One, r, c).unwrap();
        }
        if let Some((r, c)) = slot_two {
            grids.build(Slot::Two, r, c).unwrap();
        }
        grids
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
        assert!("divide".parse::<Operation>().is_err());
        assert_eq!(Operation::Determinant.endpoint(), "/api/determinant");
    }

    #[test]
    fn test_unary_request_body() {
        let mut grids = grids_with(Some((1, 2)), None);
        grids.get_mut(Slot::One).unwrap().set_text(Position::new(0, 1), "3");
        let request = OperationRequest::prepare(&grids, Operation::Transpose, Slot::One).unwrap();
        assert_eq!(request.body(), json!({"matrix": [[0.0, 3.0]]}));
        assert_eq!(request.label(), "A");
    }

    #[test]
    fn test_binary_request_body() {
        let grids = grids_with(Some((1, 1)), Some((1, 1)));
        let request = OperationRequest::prepare(&grids, Operation::Add, Slot::Two).unwrap();
        assert_eq!(request.body(), json!({"matrix1": [[0.0]], "matrix2": [[0.0]]}));
    }

    #[test]
    fn test_missing_matrices_fail_locally() {
        let grids = grids_with(Some((2, 2)), None);
        let err = OperationRequest::prepare(&grids, Operation::Multiply, Slot::One).unwrap_err();
        assert_eq!(err.to_string(), "Please create both matrices first");

        let err = OperationRequest::prepare(&grids, Operation::Determinant, Slot::Two).unwrap_err();
        assert_eq!(err.to_string(), "Please create Matrix 2 first");
        assert!(err.is_local());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-2.0000000000001), "-2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(format_number(123456789.0), "123456789");
    }

    #[test]
    fn test_format_number_exponent_range() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e22), "-1.5e+22");
        assert_eq!(format_number(2.5e-7), "2.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[tokio::test]
    async fn test_dispatch_determinant() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, json!({"success": true, "result": -2.0000000000000004}));
        let client = ServiceClient::new(transport.clone());

        let mut grids = grids_with(Some((2, 2)), None);
        let grid = grids.get_mut(Slot::One).unwrap();
        for (pos, text) in [((0, 0), "1"), ((0, 1), "2"), ((1, 0), "3"), ((1, 1), "4")] {
            grid.set_text(Position::new(pos.0, pos.1), text);
        }

        let request = OperationRequest::prepare(&grids, Operation::Determinant, Slot::One).unwrap();
        let outcome = dispatch(&client, &request).await.unwrap();
        assert_eq!(
            ResultView::success(&request, &outcome),
            ResultView::Scalar("det(A) = -2".to_string())
        );
        assert_eq!(
            transport.calls(),
            vec![RecordedCall::Json {
                path: "/api/determinant".to_string(),
                body: json!({"matrix": [[1.0, 2.0], [3.0, 4.0]]}),
            }]
        );
    }

    #[tokio::test]
    async fn test_dispatch_transpose_renders_shape() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(
            200,
            json!({"success": true, "result": [[1.0], [2.5]], "shape": [2, 1]}),
        );
        let client = ServiceClient::new(transport);
        let grids = grids_with(None, Some((1, 2)));

        let request = OperationRequest::prepare(&grids, Operation::Transpose, Slot::Two).unwrap();
        let outcome = dispatch(&client, &request).await.unwrap();
        let view = ResultView::success(&request, &outcome);
        assert_eq!(
            view,
            ResultView::Matrix {
                heading: "Bᵀ Shape: 2 × 1".to_string(),
                rows: vec![vec!["1".to_string()], vec!["2.5".to_string()]],
            }
        );
        assert_eq!(view.to_lines()[2], "[   1 ]");
    }

    #[tokio::test]
    async fn test_dispatch_remote_error_message() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(
            400,
            json!({"error": "Matrices must have the same dimensions for addition"}),
        );
        let client = ServiceClient::new(transport);
        let grids = grids_with(Some((1, 2)), Some((2, 2)));

        let request = OperationRequest::prepare(&grids, Operation::Add, Slot::One).unwrap();
        let err = dispatch(&client, &request).await.unwrap_err();
        assert_eq!(
            ResultView::failure(&err),
            ResultView::Error("Matrices must have the same dimensions for addition".to_string())
        );
    }

    #[tokio::test]
    async fn test_dispatch_without_error_text_uses_fallback() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(500, json!({}));
        let client = ServiceClient::new(transport);
        let grids = grids_with(Some((1, 1)), Some((1, 1)));

        let request = OperationRequest::prepare(&grids, Operation::Multiply, Slot::One).unwrap();
        let err = dispatch(&client, &request).await.unwrap_err();
        assert_eq!(err.user_message(), "Operation failed");
    }
}
