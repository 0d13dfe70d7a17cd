use crate::error::SchemaError;
use crate::types::{Column, Reducer, SeriesPoint, Table};
use std::collections::HashMap;

/// Group `table` by `group_key` and reduce `measure` within each group.
///
/// Groups come out in the order their key first appears in `table`.
pub fn aggregate(
    table: &Table,
    group_key: Column,
    measure: Column,
    reducer: Reducer,
) -> Result<Vec<SeriesPoint>, SchemaError> {
    table.require(group_key)?;
    table.require(measure)?;
    if group_key.is_numeric() {
        return Err(SchemaError::NotGroupable(group_key.header().to_string()));
    }
    if !measure.is_numeric() {
        return Err(SchemaError::NotNumeric(measure.header().to_string()));
    }

    struct Acc {
        key: String,
        total: f64,
        count: usize,
    }
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Acc> = Vec::new();
    for r in table.records() {
        let (Some(key), Some(value)) = (r.text(group_key), r.number(measure)) else {
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Acc {
                key: key.to_string(),
                total: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        groups[slot].total += value;
        groups[slot].count += 1;
    }

    Ok(groups
        .into_iter()
        .map(|g| SeriesPoint {
            key: g.key,
            // Groups are built from existing rows, so count is never zero.
            value: match reducer {
                Reducer::Sum => g.total,
                Reducer::Mean => g.total / g.count as f64,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_from_reader;
    use std::collections::HashSet;

    fn table() -> Table {
        let csv = "\
Category,Region,Sub-Category,Country,Sales,Profit
Tech,East,Phones,US,100,10
Tech,West,Phones,France,50,-5
Office,East,Paper,US,20,2
Office,North,Binders,Canada,30,4
";
        load_from_reader(csv.as_bytes()).unwrap()
    }

    fn pairs(points: &[SeriesPoint]) -> Vec<(&str, f64)> {
        points.iter().map(|p| (p.key.as_str(), p.value)).collect()
    }

    #[test]
    fn test_sum_by_region_first_seen_order() {
        let points = aggregate(&table(), Column::Region, Column::Sales, Reducer::Sum).unwrap();
        assert_eq!(
            pairs(&points),
            vec![("East", 120.0), ("West", 50.0), ("North", 30.0)]
        );
    }

    #[test]
    fn test_scenario_region_sales() {
        let t = table();
        let first_three = t.with_records(t.records()[..3].to_vec());
        let points =
            aggregate(&first_three, Column::Region, Column::Sales, Reducer::Sum).unwrap();
        assert_eq!(pairs(&points), vec![("East", 120.0), ("West", 50.0)]);
    }

    #[test]
    fn test_mean_by_category() {
        let points =
            aggregate(&table(), Column::Category, Column::Profit, Reducer::Mean).unwrap();
        assert_eq!(pairs(&points), vec![("Tech", 2.5), ("Office", 3.0)]);
    }

    #[test]
    fn test_groups_partition_the_table() {
        let t = table();
        let points = aggregate(&t, Column::Country, Column::Profit, Reducer::Sum).unwrap();
        let grouped_total: f64 = points.iter().map(|p| p.value).sum();
        let table_total: f64 = t.records().iter().map(|r| r.profit).sum();
        assert_eq!(grouped_total, table_total);
        for p in &points {
            let expected: f64 = t
                .records()
                .iter()
                .filter(|r| r.country == p.key)
                .map(|r| r.profit)
                .sum();
            assert_eq!(p.value, expected);
        }
        let keys: HashSet<&str> = points.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys.len(), points.len());
    }

    #[test]
    fn test_empty_table_gives_empty_series() {
        let empty = table().with_records(Vec::new());
        assert!(aggregate(&empty, Column::Region, Column::Sales, Reducer::Mean)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_schema_errors() {
        let t = table();
        assert_eq!(
            aggregate(&t, Column::SalesChannel, Column::Sales, Reducer::Sum),
            Err(SchemaError::UnknownColumn("Sales Channel".into()))
        );
        assert_eq!(
            aggregate(&t, Column::Region, Column::Country, Reducer::Sum),
            Err(SchemaError::NotNumeric("Country".into()))
        );
        assert_eq!(
            aggregate(&t, Column::Profit, Column::Sales, Reducer::Sum),
            Err(SchemaError::NotGroupable("Profit".into()))
        );
    }
}
