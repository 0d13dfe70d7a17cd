use crate::error::DataLoadError;
use crate::types::{Column, RawRow, Record, Table, PROFIT, SALES, SALES_CHANNEL};
use crate::util::parse_f64_safe;
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Load the transaction file at `path`.
///
/// Either every row is valid and the whole table comes back, or the load
/// fails; there is no partial result.
pub fn load_table(path: &Path) -> Result<Table, DataLoadError> {
    let file = File::open(path).map_err(|source| {
        warn!("cannot open {}: {}", path.display(), source);
        DataLoadError::Io {
            path: path.display().to_string(),
            source,
        }
    })?;
    let table = load_from_reader(file)?;
    info!(
        "loaded {} rows ({} columns) from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

pub fn load_from_reader<R: Read>(reader: R) -> Result<Table, DataLoadError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    for column in Column::REQUIRED {
        if !headers.iter().any(|h| h == column.header()) {
            return Err(DataLoadError::MissingColumn(column.header().to_string()));
        }
    }
    let has_channel = headers.iter().any(|h| h == SALES_CHANNEL);
    debug!("header: {:?} (sales channel: {})", headers, has_channel);

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawRow = row.deserialize(Some(&headers))?;
        records.push(into_record(raw, line, has_channel)?);
    }

    let columns = headers.iter().map(str::to_string).collect();
    Ok(Table::new(columns, records))
}

fn into_record(raw: RawRow, line: u64, has_channel: bool) -> Result<Record, DataLoadError> {
    let sales = parse_measure(&raw.sales, line, SALES)?;
    let profit = parse_measure(&raw.profit, line, PROFIT)?;
    // An empty channel cell is still a value of a column the table has.
    let sales_channel = has_channel.then(|| raw.sales_channel.unwrap_or_default());
    Ok(Record {
        category: raw.category,
        sales_channel,
        region: raw.region,
        sub_category: raw.sub_category,
        country: raw.country,
        sales,
        profit,
    })
}

fn parse_measure(value: &str, line: u64, column: &'static str) -> Result<f64, DataLoadError> {
    parse_f64_safe(value).ok_or_else(|| DataLoadError::InvalidNumber {
        line,
        column,
        value: value.to_string(),
    })
}
