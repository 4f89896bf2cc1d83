// Plain-text rendering of dataset metadata, statistics and insights

use serde_json::Value;

use super::models::{ColumnStatistics, DatasetInfo};

const SAMPLE_ROWS: usize = 10;

/// Group digits in threes: 1234567 -> "1,234,567"
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn upload_banner(filename: &str, info: &DatasetInfo) -> Vec<String> {
    vec![
        "✓ File uploaded successfully!".to_string(),
        format!("File: {}", filename),
        format!("Rows: {} | Columns: {}", info.rows, info.columns),
    ]
}

pub fn dataset_summary(info: &DatasetInfo) -> Vec<String> {
    vec![
        format!("Total Rows:     {}", thousands(info.rows)),
        format!("Total Columns:  {}", thousands(info.columns)),
        format!("Missing Values: {}", thousands(info.total_missing())),
    ]
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Left-aligned table with a header rule
fn table(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(header));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(rows.iter().map(|r| line(r.as_slice())));
    out
}

pub fn column_table(info: &DatasetInfo) -> Vec<String> {
    let header = ["Column", "Type", "Missing"].map(String::from);
    let rows: Vec<Vec<String>> = info
        .column_names
        .iter()
        .map(|name| {
            vec![
                name.clone(),
                info.data_types.get(name).cloned().unwrap_or_default(),
                info.missing_values.get(name).copied().unwrap_or(0).to_string(),
            ]
        })
        .collect();
    table(&header, &rows)
}

pub fn sample_table(info: &DatasetInfo) -> Vec<String> {
    let rows: Vec<Vec<String>> = info
        .sample_data
        .iter()
        .take(SAMPLE_ROWS)
        .map(|record| {
            info.column_names
                .iter()
                .map(|name| cell_text(record.get(name)))
                .collect()
        })
        .collect();
    table(&info.column_names, &rows)
}

fn two_decimals(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}

pub fn statistics(column: &str, stats: &ColumnStatistics) -> Vec<String> {
    let mut out = vec![format!("Statistics for \"{}\"", column)];
    match stats {
        ColumnStatistics::Numeric {
            mean,
            median,
            std,
            min,
            max,
            count,
        } => {
            out.push(format!("Mean:    {}", two_decimals(*mean)));
            out.push(format!("Median:  {}", two_decimals(*median)));
            out.push(format!("Std Dev: {}", two_decimals(*std)));
            out.push(format!("Min:     {}", two_decimals(*min)));
            out.push(format!("Max:     {}", two_decimals(*max)));
            out.push(format!("Count:   {}", thousands(*count)));
        }
        ColumnStatistics::Categorical {
            count,
            unique,
            most_frequent,
        } => {
            out.push(format!("Count:         {}", thousands(*count)));
            out.push(format!("Unique Values: {}", thousands(*unique)));
            out.push(format!(
                "Most Frequent: {}",
                most_frequent.as_deref().unwrap_or("N/A")
            ));
        }
    }
    out
}

/// One bullet per insight, continuation lines indented under the text
pub fn insights(items: &[String], width: usize) -> Vec<String> {
    let options = textwrap::Options::new(width.max(8))
        .initial_indent("• ")
        .subsequent_indent("  ");
    items
        .iter()
        .flat_map(|item| {
            textwrap::wrap(item, &options)
                .into_iter()
                .map(|line| line.into_owned())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> DatasetInfo {
        serde_json::from_value(json!({
            "rows": 1234567, "columns": 2,
            "column_names": ["city", "temp"],
            "data_types": {"city": "object", "temp": "float64"},
            "missing_values": {"city": 1000, "temp": 2},
            "sample_data": [
                {"city": "Oslo", "temp": 3},
                {"city": null, "temp": -1.5},
                {"temp": 20.25}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_summary_and_banner() {
        let info = info();
        assert_eq!(
            dataset_summary(&info),
            vec![
                "Total Rows:     1,234,567",
                "Total Columns:  2",
                "Missing Values: 1,002",
            ]
        );
        let banner = upload_banner("weather.csv", &info);
        assert_eq!(banner[0], "✓ File uploaded successfully!");
        assert_eq!(banner[2], "Rows: 1234567 | Columns: 2");
    }

    #[test]
    fn test_column_table_lists_types_and_missing() {
        let lines = column_table(&info());
        assert_eq!(lines[0], "Column | Type    | Missing");
        assert_eq!(lines[2], "city   | object  | 1000");
        assert_eq!(lines[3], "temp   | float64 | 2");
    }

    #[test]
    fn test_sample_table_blanks_missing_cells() {
        let lines = sample_table(&info());
        assert_eq!(lines[0], "city | temp");
        assert_eq!(lines[2], "Oslo | 3");
        assert_eq!(lines[3], "     | -1.5");
        assert_eq!(lines[4], "     | 20.25");
    }

    #[test]
    fn test_numeric_statistics_two_decimals() {
        let stats = ColumnStatistics::Numeric {
            mean: Some(2.0 / 3.0),
            median: Some(1.0),
            std: None,
            min: Some(-4.256),
            max: Some(10.0),
            count: 1500,
        };
        let lines = statistics("temp", &stats);
        assert_eq!(lines[0], "Statistics for \"temp\"");
        assert_eq!(lines[1], "Mean:    0.67");
        assert_eq!(lines[3], "Std Dev: N/A");
        assert_eq!(lines[4], "Min:     -4.26");
        assert_eq!(lines[6], "Count:   1,500");
    }

    #[test]
    fn test_categorical_statistics_without_mode() {
        let stats = ColumnStatistics::Categorical {
            count: 3,
            unique: 3,
            most_frequent: None,
        };
        let lines = statistics("city", &stats);
        assert_eq!(lines.last().map(String::as_str), Some("Most Frequent: N/A"));
    }

    #[test]
    fn test_insights_wrap_under_bullet() {
        let items = vec![
            "short".to_string(),
            "Column temp has a strong positive correlation with sales".to_string(),
        ];
        let lines = insights(&items, 30);
        assert_eq!(lines[0], "• short");
        assert!(lines[1].starts_with("• Column"));
        assert!(lines.len() > 2);
        assert!(lines[2..].iter().all(|l| l.starts_with("  ")));
    }
}
