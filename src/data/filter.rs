use std::fmt;

use serde::Serialize;

use super::model::{Dataset, Row};

// ---------------------------------------------------------------------------
// Filter state: sex value (or any) and an inclusive age range
// ---------------------------------------------------------------------------

/// Sex selector value. `Any` is the wildcard the host adds on top of the
/// observed values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SexFilter {
    Any,
    Only(String),
}

impl SexFilter {
    /// Parse a selector value; the literal "Any" is the wildcard.
    pub fn from_selector(value: &str) -> Self {
        if value == "Any" {
            SexFilter::Any
        } else {
            SexFilter::Only(value.to_string())
        }
    }

    fn matches(&self, sex: &str) -> bool {
        match self {
            SexFilter::Any => true,
            SexFilter::Only(wanted) => wanted == sex,
        }
    }
}

impl fmt::Display for SexFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SexFilter::Any => write!(f, "Any"),
            SexFilter::Only(s) => write!(f, "{s}"),
        }
    }
}

/// Primary filters. Passed by value into the core on every recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterState {
    pub sex: SexFilter,
    /// Inclusive (low, high) age bounds.
    pub age_range: (i64, i64),
}

impl FilterState {
    pub fn new(sex: SexFilter, low: i64, high: i64) -> Self {
        Self {
            sex,
            age_range: (low, high),
        }
    }

    /// Initialise a [`FilterState`] that keeps every row (any sex, full age range).
    pub fn unfiltered(dataset: &Dataset) -> Self {
        let (low, high) = dataset.age_range();
        Self::new(SexFilter::Any, low, high)
    }

    fn keeps(&self, row: &Row) -> bool {
        let (low, high) = self.age_range;
        self.sex.matches(row.sex()) && (low..=high).contains(&row.age())
    }
}

// ---------------------------------------------------------------------------
// RowSubset – a filtered, order-preserving view over the dataset
// ---------------------------------------------------------------------------

/// Rows passing the current filters, as indices into the dataset. Borrowing
/// the dataset keeps the subset a logical view rather than a copy.
#[derive(Debug, Clone)]
pub struct RowSubset<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> RowSubset<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Dataset indices of the kept rows, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Kept rows in original order.
    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().map(move |&i| &rows[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the rows that pass `filters`, in dataset order.
///
/// A row passes when its sex matches (always, for `Any`) and its age lies in
/// the inclusive range. An inverted range keeps nothing. An empty result is
/// a valid subset, not an error.
pub fn filter<'a>(dataset: &'a Dataset, filters: &FilterState) -> RowSubset<'a> {
    let indices: Vec<usize> = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| filters.keeps(row))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "filter sex={} age={:?}: {}/{} rows",
        filters.sex,
        filters.age_range,
        indices.len(),
        dataset.len()
    );

    RowSubset { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn dataset() -> Dataset {
        let rows = [(40, "M", 1), (45, "F", 0), (70, "M", 1), (55, "F", 1)];
        Dataset::from_records(
            vec!["Age".into(), "Sex".into(), "HeartDisease".into()],
            rows.iter()
                .map(|&(age, sex, hd)| {
                    vec![
                        CellValue::Integer(age),
                        CellValue::String(sex.into()),
                        CellValue::Integer(hd),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_any_keeps_every_row_in_range() {
        let ds = dataset();
        let subset = filter(&ds, &FilterState::new(SexFilter::Any, 45, 55));
        assert_eq!(subset.indices(), &[1, 3]);
    }

    #[test]
    fn test_specific_sex_and_inclusive_bounds() {
        let ds = dataset();
        let subset = filter(&ds, &FilterState::new(SexFilter::Only("M".into()), 40, 70));
        let ages: Vec<i64> = subset.rows().map(|r| r.age()).collect();
        assert_eq!(ages, vec![40, 70]);
    }

    #[test]
    fn test_unknown_sex_and_inverted_range_are_empty() {
        let ds = dataset();
        assert!(filter(&ds, &FilterState::new(SexFilter::Only("X".into()), 0, 100)).is_empty());
        assert!(filter(&ds, &FilterState::new(SexFilter::Any, 70, 40)).is_empty());
    }

    #[test]
    fn test_unfiltered_keeps_all() {
        let ds = dataset();
        assert_eq!(filter(&ds, &FilterState::unfiltered(&ds)).len(), ds.len());
    }

    #[test]
    fn test_selector_wildcard() {
        assert_eq!(SexFilter::from_selector("Any"), SexFilter::Any);
        assert_eq!(SexFilter::from_selector("F"), SexFilter::Only("F".into()));
    }
}
