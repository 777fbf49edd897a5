use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::filter::RowSubset;
use crate::data::model::{CellValue, Outcome};
use crate::error::{PredictorKind, Result};

/// Outcome rate per category, ready for a stacked proportion chart.
///
/// Rows are sorted by descending disease rate; consumers draw bars in this
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionTable {
    pub predictor: String,
    pub rows: Vec<ProportionRow>,
}

/// Field order is the stacking order: healthy share below, disease on top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionRow {
    pub category: CellValue,
    pub healthy_fraction: f64,
    pub disease_rate: f64,
    /// Rows in the group.
    pub count: usize,
}

impl ProportionTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Mean outcome per predictor value, with `healthy = 1 - rate`.
///
/// Null categories are dropped. Ties in rate keep ascending category order.
pub fn proportions(subset: &RowSubset<'_>, predictor: &str) -> Result<ProportionTable> {
    let column = subset
        .dataset()
        .predictor_index(predictor, PredictorKind::Categorical)?;

    // value -> (rows, disease rows)
    let mut groups: BTreeMap<&CellValue, (usize, usize)> = BTreeMap::new();
    for row in subset.rows() {
        let value = row.cell(column);
        if value.is_null() {
            continue;
        }
        let entry = groups.entry(value).or_default();
        entry.0 += 1;
        if row.outcome() == Outcome::Disease {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<ProportionRow> = groups
        .into_iter()
        .map(|(value, (count, disease))| {
            let disease_rate = disease as f64 / count as f64;
            ProportionRow {
                category: value.clone(),
                healthy_fraction: 1.0 - disease_rate,
                disease_rate,
                count,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.disease_rate.total_cmp(&a.disease_rate));

    Ok(ProportionTable {
        predictor: predictor.to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterState, SexFilter, filter};
    use crate::data::loader::parse_csv;

    const CSV: &str = "\
Age,Sex,ST_Slope,HeartDisease
40,M,Up,0
45,F,Flat,1
50,M,Flat,1
55,M,Down,1
60,F,Down,0
65,F,Up,0
";

    #[test]
    fn test_sorted_descending_by_rate() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let table = proportions(&filter(&ds, &FilterState::unfiltered(&ds)), "ST_Slope").unwrap();

        let order: Vec<String> = table.rows.iter().map(|r| r.category.to_string()).collect();
        assert_eq!(order, vec!["Flat", "Down", "Up"]);
        assert_eq!(table.rows[0].disease_rate, 1.0);
        assert_eq!(table.rows[1].disease_rate, 0.5);
        assert_eq!(table.rows[2].healthy_fraction, 1.0);
        assert_eq!(table.rows[1].count, 2);
    }

    #[test]
    fn test_ties_keep_category_order() {
        let csv = "Age,Sex,Group,HeartDisease\n40,M,B,1\n41,M,B,0\n42,F,A,0\n43,F,A,1\n44,F,C,1\n";
        let ds = parse_csv(csv.as_bytes()).unwrap();
        let table = proportions(&filter(&ds, &FilterState::unfiltered(&ds)), "Group").unwrap();

        let order: Vec<String> = table.rows.iter().map(|r| r.category.to_string()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_empty_subset() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::new(SexFilter::Only("X".into()), 0, 100));
        assert!(proportions(&subset, "ST_Slope").unwrap().is_empty());
    }
}
