use crate::error::{DataLoadError, SchemaError};
use crate::types::{Dashboard, KpiResult, Metric, Series, TableSource};
use crate::util::{format_currency, format_int, format_number, format_percent};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

const BAR_WIDTH: usize = 30;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Console row for one series point.
#[derive(Debug, Clone, Tabled)]
pub struct SeriesRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Bar")]
    pub bar: String,
}

pub fn series_rows(series: &Series) -> Vec<SeriesRow> {
    let max_abs = series
        .points
        .iter()
        .map(|p| p.value.abs())
        .fold(0.0_f64, f64::max);
    series
        .points
        .iter()
        .map(|p| SeriesRow {
            key: p.key.clone(),
            value: format_number(p.value, 2),
            bar: bar(p.value, max_abs),
        })
        .collect()
}

/// Proportional text bar; negative values are drawn with a lighter glyph.
pub fn bar(value: f64, max_abs: f64) -> String {
    if max_abs <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = ((value.abs() / max_abs) * BAR_WIDTH as f64).round() as usize;
    let glyph = if value < 0.0 { "░" } else { "█" };
    glyph.repeat(len.min(BAR_WIDTH))
}

pub fn metric_text(metric: Metric) -> String {
    metric
        .value()
        .map(format_percent)
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn kpi_lines(kpis: &KpiResult) -> [String; 2] {
    [
        format!("Total Sales: {}", format_currency(kpis.total_sales)),
        format!(
            "Average Profit Margin: {}",
            metric_text(kpis.average_profit_margin)
        ),
    ]
}

pub fn print_dashboard(dashboard: &Dashboard, preview_rows: usize) {
    println!(
        "Showing {} of {} rows\n",
        format_int(dashboard.filtered_rows),
        format_int(dashboard.total_rows)
    );
    for line in kpi_lines(&dashboard.kpis) {
        println!("{}", line);
    }
    println!();

    for series in &dashboard.series {
        let scope = match series.source {
            TableSource::Filtered => "filtered",
            TableSource::Unfiltered => "all rows",
        };
        println!("{} ({})", series.title, scope);
        let rows = series_rows(series);
        preview_table_rows(&rows, preview_rows);
        if rows.len() > preview_rows {
            println!("({} more not shown)\n", format_int(rows.len() - preview_rows));
        }
        println!("---\n");
    }
}

/// What to tell the user when the file could not be loaded.
pub fn load_failure_message(err: &DataLoadError) -> String {
    match err {
        DataLoadError::Io { path, .. } => {
            format!("Failed to load data: could not open '{}'. Check the data_path setting.", path)
        }
        DataLoadError::Csv(e) => format!("Failed to load data: the file is not valid CSV ({}).", e),
        DataLoadError::MissingColumn(column) => format!(
            "Failed to load data: the header row has no '{}' column.",
            column
        ),
        DataLoadError::InvalidNumber { .. } => format!("Failed to load data: {}.", err),
    }
}

pub fn schema_failure_message(err: &SchemaError) -> String {
    format!("Cannot build the dashboard: {}.", err)
}

#[derive(Serialize)]
struct Snapshot<'a> {
    generated_at: DateTime<Local>,
    #[serde(flatten)]
    dashboard: &'a Dashboard,
}

/// Write one CSV per series plus `dashboard.json` into `dir`. Returns the
/// written paths.
pub fn export_dashboard(dashboard: &Dashboard, dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for series in &dashboard.series {
        let path = dir.join(format!("{}.csv", series.id));
        write_csv(&path, &series.points)?;
        written.push(path);
    }
    let path = dir.join("dashboard.json");
    let snapshot = Snapshot {
        generated_at: Local::now(),
        dashboard,
    };
    write_json(&path, &snapshot)?;
    written.push(path);
    Ok(written)
}
