use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::SchemaError;

pub const CATEGORY: &str = "Category";
pub const SALES_CHANNEL: &str = "Sales Channel";
pub const REGION: &str = "Region";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const COUNTRY: &str = "Country";
pub const SALES: &str = "Sales";
pub const PROFIT: &str = "Profit";

/// Columns of the transaction file the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Category,
    SalesChannel,
    Region,
    SubCategory,
    Country,
    Sales,
    Profit,
}

impl Column {
    /// Every column a source file must carry. `Sales Channel` is optional.
    pub const REQUIRED: [Column; 6] = [
        Column::Category,
        Column::Region,
        Column::SubCategory,
        Column::Country,
        Column::Sales,
        Column::Profit,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Category => CATEGORY,
            Column::SalesChannel => SALES_CHANNEL,
            Column::Region => REGION,
            Column::SubCategory => SUB_CATEGORY,
            Column::Country => COUNTRY,
            Column::Sales => SALES,
            Column::Profit => PROFIT,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Column::Sales | Column::Profit)
    }
}

/// Row as it comes out of the CSV reader. Numeric cells stay as text until
/// the loader validates them.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sales Channel", default)]
    pub sales_channel: Option<String>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Sales")]
    pub sales: String,
    #[serde(rename = "Profit")]
    pub profit: String,
}

/// One transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub category: String,
    pub sales_channel: Option<String>,
    pub region: String,
    pub sub_category: String,
    pub country: String,
    pub sales: f64,
    pub profit: f64,
}

impl Record {
    /// Text value of a dimension column. `None` for measures and for a
    /// missing sales channel.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Category => Some(&self.category),
            Column::SalesChannel => self.sales_channel.as_deref(),
            Column::Region => Some(&self.region),
            Column::SubCategory => Some(&self.sub_category),
            Column::Country => Some(&self.country),
            Column::Sales | Column::Profit => None,
        }
    }

    pub fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::Sales => Some(self.sales),
            Column::Profit => Some(self.profit),
            _ => None,
        }
    }
}

/// Ordered, read-only collection of records sharing one header schema.
///
/// When the schema carries `Sales Channel`, every record has
/// `sales_channel == Some(..)`; otherwise every record has `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Same schema, different rows. Used by every transformation so the
    /// source table is never touched.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            columns: self.columns.clone(),
            records,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Schema capability query: does the header row name this column?
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn has(&self, column: Column) -> bool {
        self.has_column(column.header())
    }

    pub fn require(&self, column: Column) -> Result<(), SchemaError> {
        if self.has(column) {
            Ok(())
        } else {
            Err(SchemaError::UnknownColumn(column.header().to_string()))
        }
    }
}

/// Allowed values per filterable column.
///
/// `channels` is `None` when no channel constraint applies; it is ignored
/// for tables without a `Sales Channel` column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterSelection {
    pub categories: BTreeSet<String>,
    pub channels: Option<BTreeSet<String>>,
}

/// A KPI that may have no value, e.g. a mean over zero rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Value(f64),
    Undefined,
}

impl Metric {
    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::Undefined => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiResult {
    pub total_sales: f64,
    pub average_profit_margin: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Sum,
    Mean,
}

/// Which table a chart is aggregated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSource {
    Filtered,
    Unfiltered,
}

/// Table source per chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSources {
    pub region: TableSource,
    pub category: TableSource,
    pub sub_category: TableSource,
    pub country: TableSource,
}

impl Default for ChartSources {
    fn default() -> Self {
        Self {
            region: TableSource::Filtered,
            category: TableSource::Filtered,
            sub_category: TableSource::Filtered,
            country: TableSource::Filtered,
        }
    }
}

/// One chart: group `group_key`, reduce `measure`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub group_key: Column,
    pub measure: Column,
    pub reducer: Reducer,
    pub source: TableSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub id: &'static str,
    pub title: &'static str,
    pub source: TableSource,
    pub points: Vec<SeriesPoint>,
}

/// Everything the presentation layer needs for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub selection: FilterSelection,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub kpis: KpiResult,
    pub series: Vec<Series>,
}
