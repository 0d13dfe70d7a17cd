use crate::error::SchemaError;
use crate::types::{Column, FilterSelection, Record, Table};
use log::debug;
use std::collections::{BTreeSet, HashSet};

/// Distinct values of a dimension column, in first-seen order.
///
/// These are the options a multi-select control offers.
pub fn distinct_values(table: &Table, column: Column) -> Result<Vec<String>, SchemaError> {
    table.require(column)?;
    if column.is_numeric() {
        return Err(SchemaError::NotGroupable(column.header().to_string()));
    }
    let mut seen: HashSet<&str> = HashSet::new();
    let mut values = Vec::new();
    for value in table.records().iter().filter_map(|r| r.text(column)) {
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Selection with every observed value allowed. Filtering with it returns
/// the table unchanged.
pub fn default_selection(table: &Table) -> FilterSelection {
    let categories = collect_set(table, Column::Category);
    let channels = table
        .has(Column::SalesChannel)
        .then(|| collect_set(table, Column::SalesChannel));
    FilterSelection {
        categories,
        channels,
    }
}

fn collect_set(table: &Table, column: Column) -> BTreeSet<String> {
    table
        .records()
        .iter()
        .filter_map(|r| r.text(column))
        .map(str::to_string)
        .collect()
}

/// Keep the rows whose category (and sales channel, when the table has that
/// column) is selected. Row order is preserved.
pub fn filter(table: &Table, selection: &FilterSelection) -> Table {
    let check_channel = table.has(Column::SalesChannel);
    let records: Vec<Record> = table
        .records()
        .iter()
        .filter(|r| selection.categories.contains(&r.category))
        .filter(|r| !check_channel || channel_allowed(r, selection))
        .cloned()
        .collect();
    debug!("filter kept {} of {} rows", records.len(), table.len());
    table.with_records(records)
}

fn channel_allowed(record: &Record, selection: &FilterSelection) -> bool {
    match (&selection.channels, &record.sales_channel) {
        (None, _) => true,
        (Some(allowed), Some(channel)) => allowed.contains(channel),
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_from_reader;

    fn with_channels() -> Table {
        let csv = "\
Category,Sales Channel,Region,Sub-Category,Country,Sales,Profit
Tech,Online,East,Phones,US,100,10
Office,Retail,East,Paper,US,20,2
Tech,Retail,West,Phones,France,50,-5
Furniture,Online,South,Chairs,Spain,70,7
";
        load_from_reader(csv.as_bytes()).unwrap()
    }

    fn without_channels() -> Table {
        let csv = "\
Category,Region,Sub-Category,Country,Sales,Profit
Tech,East,Phones,US,100,10
Tech,West,Phones,France,50,-5
Office,East,Paper,US,20,2
";
        load_from_reader(csv.as_bytes()).unwrap()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        let table = with_channels();
        assert_eq!(
            distinct_values(&table, Column::Category).unwrap(),
            vec!["Tech", "Office", "Furniture"]
        );
        assert_eq!(
            distinct_values(&table, Column::SalesChannel).unwrap(),
            vec!["Online", "Retail"]
        );
    }

    #[test]
    fn test_distinct_values_schema_errors() {
        let table = without_channels();
        assert_eq!(
            distinct_values(&table, Column::SalesChannel),
            Err(SchemaError::UnknownColumn("Sales Channel".into()))
        );
        assert_eq!(
            distinct_values(&table, Column::Sales),
            Err(SchemaError::NotGroupable("Sales".into()))
        );
    }

    #[test]
    fn test_default_selection_is_identity() {
        for table in [with_channels(), without_channels()] {
            let selection = default_selection(&table);
            assert_eq!(filter(&table, &selection), table);
        }
    }

    #[test]
    fn test_default_selection_channels_only_when_column_present() {
        assert_eq!(
            default_selection(&with_channels()).channels,
            Some(set(&["Online", "Retail"]))
        );
        assert_eq!(default_selection(&without_channels()).channels, None);
    }

    #[test]
    fn test_filter_by_category_preserves_order() {
        let table = without_channels();
        let selection = FilterSelection {
            categories: set(&["Tech"]),
            channels: None,
        };
        let out = filter(&table, &selection);
        let regions: Vec<&str> = out.records().iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, vec!["East", "West"]);
        assert_eq!(out.columns(), table.columns());
    }

    #[test]
    fn test_filter_by_category_and_channel() {
        let table = with_channels();
        let selection = FilterSelection {
            categories: set(&["Tech", "Office"]),
            channels: Some(set(&["Retail"])),
        };
        let out = filter(&table, &selection);
        assert_eq!(out.len(), 2);
        assert!(out.records().iter().all(|r| {
            selection.categories.contains(&r.category)
                && r.sales_channel.as_deref() == Some("Retail")
        }));
    }

    #[test]
    fn test_channel_selection_ignored_without_column() {
        let table = without_channels();
        let selection = FilterSelection {
            categories: set(&["Tech", "Office"]),
            channels: Some(BTreeSet::new()),
        };
        assert_eq!(filter(&table, &selection).len(), 3);
    }

    #[test]
    fn test_empty_selections_yield_empty_table() {
        let table = with_channels();
        let no_categories = FilterSelection {
            categories: BTreeSet::new(),
            channels: None,
        };
        assert!(filter(&table, &no_categories).is_empty());

        let mut no_channels = default_selection(&table);
        no_channels.channels = Some(BTreeSet::new());
        assert!(filter(&table, &no_channels).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let table = with_channels();
        let selection = FilterSelection {
            categories: set(&["Tech", "Furniture"]),
            channels: Some(set(&["Online"])),
        };
        let once = filter(&table, &selection);
        assert_eq!(filter(&once, &selection), once);
    }

    #[test]
    fn test_filter_does_not_touch_source() {
        let table = with_channels();
        let before = table.clone();
        let _ = filter(&table, &FilterSelection::default());
        assert_eq!(table, before);
    }
}
