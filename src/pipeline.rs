// The whole recompute step: (table, selection, charts) -> dashboard.
//
// Nothing here keeps state between calls. The same inputs always give the
// same dashboard, so callers can run it per session without locking.
use crate::aggregate::aggregate;
use crate::error::SchemaError;
use crate::filter::filter;
use crate::kpi::compute_kpis;
use crate::types::{
    ChartSources, ChartSpec, Column, Dashboard, FilterSelection, Reducer, Series, Table,
    TableSource,
};
use log::debug;

/// The four dashboard charts, each reading from the table `sources` names.
pub fn standard_charts(sources: &ChartSources) -> Vec<ChartSpec> {
    vec![
        ChartSpec {
            id: "sales_by_region",
            title: "Sales by Region",
            group_key: Column::Region,
            measure: Column::Sales,
            reducer: Reducer::Sum,
            source: sources.region,
        },
        ChartSpec {
            id: "sales_by_category",
            title: "Sales by Category",
            group_key: Column::Category,
            measure: Column::Sales,
            reducer: Reducer::Sum,
            source: sources.category,
        },
        ChartSpec {
            id: "sales_by_sub_category",
            title: "Sales by Sub-Category",
            group_key: Column::SubCategory,
            measure: Column::Sales,
            reducer: Reducer::Sum,
            source: sources.sub_category,
        },
        ChartSpec {
            id: "profit_by_country",
            title: "Profit by Country",
            group_key: Column::Country,
            measure: Column::Profit,
            reducer: Reducer::Sum,
            source: sources.country,
        },
    ]
}

pub fn run(
    table: &Table,
    selection: &FilterSelection,
    charts: &[ChartSpec],
) -> Result<Dashboard, SchemaError> {
    let filtered = filter(table, selection);
    let kpis = compute_kpis(&filtered);

    let series = charts
        .iter()
        .map(|chart| {
            let input = match chart.source {
                TableSource::Filtered => &filtered,
                TableSource::Unfiltered => table,
            };
            let points = aggregate(input, chart.group_key, chart.measure, chart.reducer)?;
            debug!("{}: {} points", chart.id, points.len());
            Ok(Series {
                id: chart.id,
                title: chart.title,
                source: chart.source,
                points,
            })
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;

    Ok(Dashboard {
        selection: selection.clone(),
        total_rows: table.len(),
        filtered_rows: filtered.len(),
        kpis,
        series,
    })
}
