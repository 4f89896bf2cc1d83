use base64::Engine;
use std::path::Path;
use tracing::{info, instrument};

use super::models::{
    AnalyzeBody, AnalyzeResponse, DatasetInfo, FilenameBody, InsightsResponse, Plot, PlotKind,
    UploadResponse, VisualizeBody, VisualizeResponse,
};
use crate::client::{FailureText, ServiceClient, UploadFile};
use crate::error::{LabError, LabResult};
use crate::logging::PerformanceTimer;

const UPLOAD_TEXT: FailureText = FailureText {
    transport: "Error uploading file",
    fallback: "Upload failed",
};

const ANALYZE_TEXT: FailureText = FailureText {
    transport: "Error analyzing data",
    fallback: "Analysis failed",
};

const CHART_TEXT: FailureText = FailureText {
    transport: "Error generating chart",
    fallback: "Failed to generate chart",
};

const HEATMAP_TEXT: FailureText = FailureText {
    transport: "Error generating heatmap",
    fallback: "Failed to generate heatmap",
};

const INSIGHTS_TEXT: FailureText = FailureText {
    transport: "Error generating insights",
    fallback: "Failed to generate insights",
};

/// State of one CSV analysis: which file the service holds and what it said
/// about it.
pub struct AnalysisSession {
    client: ServiceClient,
    current_filename: Option<String>,
    dataset: Option<DatasetInfo>,
}

impl AnalysisSession {
    pub fn new(client: ServiceClient) -> Self {
        Self {
            client,
            current_filename: None,
            dataset: None,
        }
    }

    pub fn current_filename(&self) -> Option<&str> {
        self.current_filename.as_deref()
    }

    pub fn dataset(&self) -> Option<&DatasetInfo> {
        self.dataset.as_ref()
    }

    /// Upload a CSV file. The name check happens before anything is read or
    /// sent; a failed upload keeps the previous dataset.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn upload(&mut self, path: &Path) -> LabResult<&DatasetInfo> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| n.ends_with(".csv"))
            .ok_or_else(|| LabError::validation("Please upload a CSV file"))?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LabError::file_io(path.display().to_string(), e))?;

        let _timer = PerformanceTimer::start(format!("upload {}", file_name));
        let response: UploadResponse = self
            .client
            .post_file("/upload", UploadFile { file_name, bytes }, UPLOAD_TEXT)
            .await?;

        info!(
            filename = %response.filename,
            rows = response.info.rows,
            columns = response.info.columns,
            "dataset uploaded"
        );
        self.current_filename = Some(response.filename);
        Ok(self.dataset.insert(response.info))
    }

    fn require_filename(&self) -> LabResult<&str> {
        self.current_filename
            .as_deref()
            .ok_or_else(|| LabError::validation("Please upload a CSV file first"))
    }

    #[instrument(skip(self))]
    pub async fn analyze(&self, column: &str) -> LabResult<AnalyzeResponse> {
        if column.trim().is_empty() {
            return Err(LabError::validation("Please select a column"));
        }
        let filename = self.require_filename()?;

        let _timer = PerformanceTimer::start(format!("analyze {}", column));
        self.client
            .post_json("/analyze", &AnalyzeBody { filename, column }, ANALYZE_TEXT)
            .await
    }

    #[instrument(skip(self))]
    pub async fn visualize(&self, kind: PlotKind) -> LabResult<Plot> {
        let text = match &kind {
            PlotKind::Bar { column } => {
                if column.trim().is_empty() {
                    return Err(LabError::validation("Please select a column"));
                }
                CHART_TEXT
            }
            PlotKind::Scatter { x_column, y_column } => {
                if x_column.trim().is_empty() || y_column.trim().is_empty() {
                    return Err(LabError::validation("Please select both X and Y columns"));
                }
                CHART_TEXT
            }
            PlotKind::Heatmap => HEATMAP_TEXT,
        };
        let filename = self.require_filename()?;

        let _timer = PerformanceTimer::start(format!("{} plot", kind.name()));
        let response: VisualizeResponse = self
            .client
            .post_json("/visualize", &VisualizeBody { filename, kind: &kind }, text)
            .await?;

        let png = base64::engine::general_purpose::STANDARD
            .decode(response.plot.trim())
            .map_err(|e| LabError::malformed(text.transport, format!("plot is not base64: {}", e)))?;
        Ok(Plot { kind, png })
    }

    #[instrument(skip(self))]
    pub async fn insights(&self) -> LabResult<Vec<String>> {
        let filename = self.require_filename()?;
        let _timer = PerformanceTimer::start("insights");
        let response: InsightsResponse = self
            .client
            .post_json("/insights", &FilenameBody { filename }, INSIGHTS_TEXT)
            .await?;
        Ok(response.insights)
    }
}
