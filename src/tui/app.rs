// Workbench application: owns the matrix session and the channel that
// finished requests come back on

use anyhow::Result;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::components;
use super::events::MatrixAction;
use super::layout::WorkbenchLayout;
use crate::client::ServiceClient;
use crate::error::LabResult;
use crate::matrix::{dispatch, InputOutcome, MatrixSession, Operation, OperationOutcome, OperationRequest, Slot};

type Finished = (OperationRequest, LabResult<OperationOutcome>);

pub struct WorkbenchApp {
    session: MatrixSession,
    client: ServiceClient,
    results_tx: mpsc::UnboundedSender<Finished>,
    results_rx: mpsc::UnboundedReceiver<Finished>,
}

impl WorkbenchApp {
    pub fn new(session: MatrixSession, client: ServiceClient) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            session,
            client,
            results_tx,
            results_rx,
        }
    }

    pub fn session(&self) -> &MatrixSession {
        &self.session
    }

    pub fn render(&self, frame: &mut Frame) {
        let layout = WorkbenchLayout::new(frame.size());
        components::render_grid(frame, layout.matrix_a, &self.session, Slot::One);
        components::render_grid(frame, layout.matrix_b, &self.session, Slot::Two);
        components::render_results(frame, layout.results, self.session.result());
        components::render_status(frame, layout.status_bar, &self.session);
        components::render_help(frame, layout.help_bar);
    }

    /// Returns true when the app should exit
    pub async fn handle_action(&mut self, action: MatrixAction) -> Result<bool> {
        match action {
            MatrixAction::Quit => return Ok(true),
            MatrixAction::Input(input) => match self.session.handle_input(input) {
                InputOutcome::Rejected(e) => debug!(error = %e, "grid rebuild refused"),
                InputOutcome::Rebuilt(slot) => debug!(slot = slot.number(), "grid rebuilt"),
                _ => {}
            },
            MatrixAction::Dispatch(operation) => self.start_operation(operation),
            MatrixAction::Tick => {}
        }
        Ok(false)
    }

    fn start_operation(&mut self, operation: Operation) {
        let request = match self.session.begin_operation(operation) {
            Ok(request) => request,
            Err(e) => {
                debug!(%operation, error = %e, "operation refused locally");
                return;
            }
        };

        let client = self.client.clone();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let outcome = dispatch(&client, &request).await;
            // receiver is gone once the UI has exited
            let _ = tx.send((request, outcome));
        });
    }

    /// Apply every request that finished since the last frame, in arrival order
    pub async fn update(&mut self) -> Result<()> {
        while let Ok((request, outcome)) = self.results_rx.try_recv() {
            self.apply(request, outcome);
        }
        Ok(())
    }

    fn apply(&mut self, request: OperationRequest, outcome: LabResult<OperationOutcome>) {
        match &outcome {
            Ok(_) => {
                info!(operation = %request.operation(), "operation completed");
                self.session
                    .set_status(format!("{} completed", request.operation()), false);
            }
            Err(e) => self.session.set_status(e.user_message(), true),
        }
        self.session.finish_operation(&request, &outcome);
    }

    /// Wait for the next finished request
    #[cfg(test)]
    async fn settle(&mut self) {
        if let Some((request, outcome)) = self.results_rx.recv().await {
            self.apply(request, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{RecordedCall, RecordingTransport};
    use crate::matrix::{GridInput, NavKey, Position, ResultView};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use std::sync::Arc;

    fn app_with(transport: &Arc<RecordingTransport>, rows: usize, cols: usize) -> WorkbenchApp {
        let session = MatrixSession::new(rows, cols).unwrap();
        WorkbenchApp::new(session, ServiceClient::new(transport.clone()))
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn test_renders_both_grids_and_placeholder() {
        let transport = Arc::new(RecordingTransport::new());
        let app = app_with(&transport, 2, 2);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Matrix A (2 × 2)"));
        assert!(text.contains("Matrix B (2 × 2)"));
        assert!(text.contains("Results will appear here"));
    }

    #[tokio::test]
    async fn test_empty_cell_shows_its_coordinates() {
        let transport = Arc::new(RecordingTransport::new());
        let mut app = app_with(&transport, 2, 2);
        app.session
            .grids_mut()
            .get_mut(Slot::Two)
            .unwrap()
            .set_text(Position::new(1, 0), "");

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("[1,0]"));
        assert!(!text.contains("[0,0]"));
    }

    #[tokio::test]
    async fn test_determinant_round_trip_updates_result() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, json!({"success": true, "result": -2.0}));
        let mut app = app_with(&transport, 2, 2);

        app.handle_action(MatrixAction::Input(GridInput::Char('1')))
            .await
            .unwrap();
        app.handle_action(MatrixAction::Dispatch(Operation::Determinant))
            .await
            .unwrap();
        assert_eq!(app.session().result(), &ResultView::Processing(Operation::Determinant));
        assert_eq!(app.session().in_flight(), 1);

        app.settle().await;
        assert_eq!(app.session().result(), &ResultView::Scalar("det(A) = -2".to_string()));
        assert_eq!(app.session().in_flight(), 0);
        assert_eq!(
            transport.calls(),
            vec![RecordedCall::Json {
                path: "/api/determinant".to_string(),
                body: json!({"matrix": [[1.0, 0.0], [0.0, 0.0]]}),
            }]
        );
    }

    #[tokio::test]
    async fn test_remote_error_lands_in_status_and_result() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(400, json!({"success": false, "error": "Matrix must be square"}));
        let mut app = app_with(&transport, 2, 3);

        app.handle_action(MatrixAction::Dispatch(Operation::Determinant))
            .await
            .unwrap();
        app.settle().await;

        assert_eq!(
            app.session().result(),
            &ResultView::Error("Matrix must be square".to_string())
        );
        let status = app.session().status().unwrap();
        assert!(status.is_error);
    }

    #[tokio::test]
    async fn test_quit_and_navigation() {
        let transport = Arc::new(RecordingTransport::new());
        let mut app = app_with(&transport, 2, 2);

        let quit = app
            .handle_action(MatrixAction::Input(GridInput::Nav {
                key: NavKey::Right,
                shift: false,
            }))
            .await
            .unwrap();
        assert!(!quit);
        assert!(app.handle_action(MatrixAction::Quit).await.unwrap());
        assert!(transport.calls().is_empty());
    }
}
