use crate::readings::ReadingTable;
use serde::{Deserialize, Serialize};

/// Summary statistics for one table column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute statistics per column, in column order.
pub fn column_summary(table: &ReadingTable) -> Vec<Summary> {
    let mut out = Vec::with_capacity(table.columns().len());
    for (idx, column) in table.columns().iter().enumerate() {
        let mut vals: Vec<f64> = table.rows().iter().filter_map(|r| r.values[idx]).collect();
        let missing = table.len() - vals.len();
        vals.sort_by(f64::total_cmp);
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        out.push(Summary {
            column: column.clone(),
            count,
            missing,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
