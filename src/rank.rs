//! Standard competition ("1224") ranking.

use serde::Serialize;

use crate::{
    data::Value,
    summary::{SummaryRow, SummaryTable},
};

pub const RANK_COLUMN: &str = "rank";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    pub rank: usize,
    pub item: T,
}

/// Sorts `items` by `key` descending and assigns competition ranks: tied keys
/// share the best rank and the next distinct key skips past the tie. Ties keep
/// their input order.
pub fn rank_by<T, F>(items: Vec<T>, key: F) -> Vec<Ranked<T>>
where
    F: Fn(&T) -> f64,
{
    let mut keyed = items
        .into_iter()
        .map(|item| (key(&item), item))
        .collect::<Vec<_>>();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut ranked: Vec<Ranked<T>> = Vec::with_capacity(keyed.len());
    let mut previous: Option<f64> = None;
    for (position, (value, item)) in keyed.into_iter().enumerate() {
        let rank = match (previous, ranked.last()) {
            (Some(prior), Some(last)) if prior == value => last.rank,
            _ => position + 1,
        };
        previous = Some(value);
        ranked.push(Ranked { rank, item });
    }
    ranked
}

/// A summary table ordered by core average with a leading rank column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Ranked<SummaryRow>>,
    core_courses: Vec<String>,
}

impl RankedTable {
    pub fn from_summary(summary: &SummaryTable) -> Self {
        let mut headers = vec![RANK_COLUMN.to_string()];
        headers.extend(summary.headers());
        Self {
            headers,
            rows: rank_by(summary.rows.clone(), SummaryRow::core_average),
            core_courses: summary.core_courses.clone(),
        }
    }

    pub fn cells(&self) -> Vec<Vec<Option<Value>>> {
        self.rows
            .iter()
            .map(|ranked| {
                let mut cells = vec![Some(Value::Integer(ranked.rank as i64))];
                cells.extend(ranked.item.cells(&self.core_courses));
                cells
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
