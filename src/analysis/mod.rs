// CSV upload, column statistics, charts and insights

pub mod models;
pub mod render;
pub mod session;

pub use models::{AnalyzeResponse, ColumnStatistics, DatasetInfo, Plot, PlotKind};
pub use session::AnalysisSession;
