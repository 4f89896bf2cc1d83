use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::{render, AnalysisSession, Plot, PlotKind};
use crate::client::ServiceClient;
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::log_error;
use crate::matrix::{dispatch, Dimensions, GridSet, Matrix, Operation, OperationRequest, Position, ResultView, Slot};

const INSIGHT_WIDTH: usize = 80;

/// Fill `slot` from a JSON matrix such as `[[1, 2], [3, 4]]`
pub fn load_matrix(grids: &mut GridSet, slot: Slot, json: &str) -> LabResult<()> {
    let values: Matrix = serde_json::from_str(json).map_err(|e| {
        LabError::validation(format!("Matrix {} is not a JSON array of rows: {}", slot.label(), e))
    })?;

    let cols = values.first().map(Vec::len).unwrap_or(0);
    if values.iter().any(|row| row.len() != cols) {
        return Err(LabError::validation(format!(
            "Matrix {} rows must all have the same length",
            slot.label()
        )));
    }
    let dims = Dimensions::new(values.len(), cols)?;

    grids.build(slot, dims.rows(), dims.cols())?;
    if let Some(grid) = grids.get_mut(slot) {
        for (r, row) in values.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                grid.set_text(Position::new(r, c), value.to_string());
            }
        }
    }
    Ok(())
}

/// Run one matrix operation and print the rendered result
pub async fn op_command(
    client: ServiceClient,
    operation: Operation,
    slot: Slot,
    matrix1: Option<String>,
    matrix2: Option<String>,
) -> Result<()> {
    let mut grids = GridSet::new();
    if let Some(json) = matrix1.as_deref() {
        load_matrix(&mut grids, Slot::One, json)?;
    }
    if let Some(json) = matrix2.as_deref() {
        load_matrix(&mut grids, Slot::Two, json)?;
    }

    let request = OperationRequest::prepare(&grids, operation, slot)?;
    info!(%operation, "running operation from the command line");
    let outcome = dispatch(&client, &request).await?;

    for line in ResultView::success(&request, &outcome).to_lines() {
        println!("{}", line);
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct DatasetArgs {
    pub file: PathBuf,
    pub analyze: Option<String>,
    pub bar: Option<String>,
    pub scatter: Option<(String, String)>,
    pub heatmap: bool,
    pub insights: bool,
    pub out_dir: PathBuf,
}

pub fn plot_file_name(kind: &PlotKind, timestamp: &str) -> String {
    format!("{}_{}.png", kind.name(), timestamp)
}

async fn save_plot(plot: &Plot, out_dir: &Path) -> LabResult<PathBuf> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| LabError::file_io(out_dir.display().to_string(), e))?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let path = out_dir.join(plot_file_name(&plot.kind, &timestamp));
    tokio::fs::write(&path, &plot.png)
        .await
        .map_err(|e| LabError::file_io(path.display().to_string(), e))?;
    Ok(path)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Upload a CSV and run the requested follow-ups in one analysis session.
/// A failing follow-up is reported and the rest still run.
pub async fn dataset_command(client: ServiceClient, args: DatasetArgs) -> Result<()> {
    let mut session = AnalysisSession::new(client);

    let info = session.upload(&args.file).await?.clone();
    let filename = session.current_filename().unwrap_or_default().to_string();
    print_lines(&render::upload_banner(&filename, &info));
    println!();
    print_lines(&render::dataset_summary(&info));
    println!();
    print_lines(&render::column_table(&info));
    if !info.sample_data.is_empty() {
        println!();
        println!("Sample Data");
        print_lines(&render::sample_table(&info));
    }

    let mut failures = 0usize;
    let mut report = |context: &str, error: LabError| {
        log_error!(error, context);
        eprintln!("Error: {}", error.user_message());
        failures += 1;
    };

    if let Some(column) = args.analyze.as_deref() {
        match session.analyze(column).await {
            Ok(response) => {
                println!();
                print_lines(&render::statistics(&response.column, &response.statistics));
            }
            Err(e) => report("analyze", e),
        }
    }

    let mut plots = Vec::new();
    if let Some(column) = args.bar.clone() {
        plots.push(PlotKind::Bar { column });
    }
    if let Some((x_column, y_column)) = args.scatter.clone() {
        plots.push(PlotKind::Scatter { x_column, y_column });
    }
    if args.heatmap {
        plots.push(PlotKind::Heatmap);
    }
    for kind in plots {
        let saved = match session.visualize(kind).await {
            Ok(plot) => save_plot(&plot, &args.out_dir).await,
            Err(e) => Err(e),
        };
        match saved {
            Ok(path) => println!("Chart saved to {}", path.display()),
            Err(e) => report("visualize", e),
        }
    }

    if args.insights {
        match session.insights().await {
            Ok(items) => {
                println!();
                println!("Insights");
                print_lines(&render::insights(&items, INSIGHT_WIDTH));
            }
            Err(e) => report("insights", e),
        }
    }

    if failures > 0 {
        return Err(anyhow::anyhow!("{} dataset action(s) failed", failures));
    }
    Ok(())
}

/// Print the effective configuration, or write it to `write`
pub fn config_command(config: &LabConfig, write: Option<PathBuf>) -> Result<()> {
    match write {
        Some(path) => {
            config.save_to_file(&path)?;
            println!("Configuration written to {}", path.display());
        }
        None => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}
