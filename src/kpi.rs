use crate::types::{KpiResult, Metric, Table};

/// Total sales and mean profit over `table`.
///
/// The mean is `Metric::Undefined` for an empty table; the sum is `0`.
pub fn compute_kpis(table: &Table) -> KpiResult {
    let records = table.records();
    let total_sales: f64 = records.iter().map(|r| r.sales).sum();
    let average_profit_margin = if records.is_empty() {
        Metric::Undefined
    } else {
        let total_profit: f64 = records.iter().map(|r| r.profit).sum();
        Metric::Value(total_profit / records.len() as f64)
    };
    KpiResult {
        total_sales,
        average_profit_margin,
    }
}
