use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::filter::RowSubset;
use crate::data::model::{CellValue, Outcome};
use crate::error::{PredictorKind, Result};

/// Two-level breakdown: outcome first, then the chosen categorical predictor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyBreakdown {
    pub predictor: String,
    /// Outcome nodes in label order (0 then 1); only observed outcomes appear.
    pub outcomes: Vec<OutcomeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeNode {
    pub outcome: Outcome,
    pub count: usize,
    /// Predictor values in ascending order; only observed values appear.
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    pub value: CellValue,
    pub count: usize,
}

impl HierarchyBreakdown {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Rows counted across every outcome node.
    pub fn total(&self) -> usize {
        self.outcomes.iter().map(|o| o.count).sum()
    }
}

/// Count rows per (outcome, predictor value). Rows whose predictor cell is
/// null are left out, so outcome totals always equal the sum of their
/// children.
pub fn hierarchy(subset: &RowSubset<'_>, predictor: &str) -> Result<HierarchyBreakdown> {
    let column = subset
        .dataset()
        .predictor_index(predictor, PredictorKind::Categorical)?;

    let mut counts: BTreeMap<Outcome, BTreeMap<&CellValue, usize>> = BTreeMap::new();
    for row in subset.rows() {
        let value = row.cell(column);
        if value.is_null() {
            continue;
        }
        *counts.entry(row.outcome()).or_default().entry(value).or_default() += 1;
    }

    let outcomes = counts
        .into_iter()
        .map(|(outcome, by_value)| {
            let children: Vec<CategoryNode> = by_value
                .into_iter()
                .map(|(value, count)| CategoryNode {
                    value: value.clone(),
                    count,
                })
                .collect();
            OutcomeNode {
                outcome,
                count: children.iter().map(|c| c.count).sum(),
                children,
            }
        })
        .collect();

    Ok(HierarchyBreakdown {
        predictor: predictor.to_string(),
        outcomes,
    })
}
