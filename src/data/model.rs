use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{ExploreError, PredictorKind, Result};

/// Binary outcome column every view conditions on.
pub const OUTCOME_COLUMN: &str = "HeartDisease";
/// Integer column driving the age range filter.
pub const AGE_COLUMN: &str = "Age";
/// Categorical column driving the sex filter.
pub const SEX_COLUMN: &str = "Sex";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as read from CSV, JSON or Parquet.
/// Used as a `BTreeMap` key when grouping, so `CellValue` must be `Ord`.
/// Equality, ordering and hashing all treat `Integer(1)` and `Float(1.0)` as
/// the same value.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can group by CellValue in BTreeMap --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            // Mixed integer/float columns compare numerically.
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => std::cmp::Ordering::Equal,
            },
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            CellValue::String(s) => (3u8, s).hash(state),
            // Integers and floats share one key space, as in `cmp`.
            CellValue::Integer(_) | CellValue::Float(_) => {
                (2u8, self.as_f64().map(f64::to_bits)).hash(state)
            }
            CellValue::Bool(b) => (1u8, b).hash(state),
            CellValue::Null => 0u8.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

/// Category values leave the core as their display text.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

// ---------------------------------------------------------------------------
// Outcome – the binary target
// ---------------------------------------------------------------------------

/// Value of the outcome column, used as a discrete label for grouping and
/// colouring rather than as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Outcome {
    #[serde(rename = "0")]
    Healthy,
    #[serde(rename = "1")]
    Disease,
}

impl Outcome {
    pub const ALL: [Outcome; 2] = [Outcome::Healthy, Outcome::Disease];

    /// Read an outcome cell; only 0 and 1 are accepted.
    pub fn from_cell(value: &CellValue) -> Option<Outcome> {
        match value {
            CellValue::Integer(0) | CellValue::Bool(false) => Some(Outcome::Healthy),
            CellValue::Integer(1) | CellValue::Bool(true) => Some(Outcome::Disease),
            CellValue::Float(v) if *v == 0.0 => Some(Outcome::Healthy),
            CellValue::Float(v) if *v == 1.0 => Some(Outcome::Disease),
            _ => None,
        }
    }

    /// Discrete label as rendered in legends.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Healthy => "0",
            Outcome::Disease => "1",
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Outcome::Healthy => 0.0,
            Outcome::Disease => 1.0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Row – one patient record
// ---------------------------------------------------------------------------

/// A single patient record. The fixed-schema fields are extracted once at
/// load time; every cell (fixed ones included) stays addressable by column.
#[derive(Debug, Clone)]
pub struct Row {
    age: i64,
    sex: String,
    outcome: Outcome,
    cells: Vec<CellValue>,
}

static NULL_CELL: CellValue = CellValue::Null;

impl Row {
    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn sex(&self) -> &str {
        &self.sex
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Cell at `column`; out-of-range reads as null.
    pub fn cell(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with its classified schema. Immutable once built;
/// share it behind an `Arc` across sessions.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
    categorical_predictors: Vec<String>,
    numeric_predictors: Vec<String>,
    /// Sex values in order of first appearance.
    sex_values: Vec<String>,
    age_range: (i64, i64),
}

impl Dataset {
    /// Build and classify a dataset from a header and row-major cells.
    ///
    /// Fails with `DataUnavailable` when the fixed columns are missing or
    /// carry the wrong kind of value, or when there are no rows.
    pub fn from_records(columns: Vec<String>, records: Vec<Vec<CellValue>>) -> Result<Self> {
        let position = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| ExploreError::DataUnavailable(format!("missing '{name}' column")))
        };
        let age_idx = position(AGE_COLUMN)?;
        let sex_idx = position(SEX_COLUMN)?;
        let outcome_idx = position(OUTCOME_COLUMN)?;

        if records.is_empty() {
            return Err(ExploreError::DataUnavailable("dataset has no rows".into()));
        }

        let mut rows = Vec::with_capacity(records.len());
        let mut sex_values: Vec<String> = Vec::new();
        let mut age_range = (i64::MAX, i64::MIN);

        for (i, cells) in records.into_iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(ExploreError::DataUnavailable(format!(
                    "row {i} has {} cells, expected {}",
                    cells.len(),
                    columns.len()
                )));
            }

            let age = match &cells[age_idx] {
                CellValue::Integer(a) => *a,
                other => {
                    return Err(ExploreError::DataUnavailable(format!(
                        "row {i}: '{AGE_COLUMN}' must be an integer, got {other}"
                    )))
                }
            };
            let sex = match &cells[sex_idx] {
                CellValue::String(s) => s.clone(),
                other => {
                    return Err(ExploreError::DataUnavailable(format!(
                        "row {i}: '{SEX_COLUMN}' must be categorical, got {other}"
                    )))
                }
            };
            let outcome = Outcome::from_cell(&cells[outcome_idx]).ok_or_else(|| {
                ExploreError::DataUnavailable(format!(
                    "row {i}: '{OUTCOME_COLUMN}' must be 0 or 1, got {}",
                    cells[outcome_idx]
                ))
            })?;

            if !sex_values.contains(&sex) {
                sex_values.push(sex.clone());
            }
            age_range = (age_range.0.min(age), age_range.1.max(age));
            rows.push(Row {
                age,
                sex,
                outcome,
                cells,
            });
        }

        let mut categorical_predictors = Vec::new();
        let mut numeric_predictors = Vec::new();
        for (idx, name) in columns.iter().enumerate() {
            if idx == outcome_idx {
                continue;
            }
            let numeric = rows
                .iter()
                .map(|r| r.cell(idx))
                .filter(|v| !v.is_null())
                .all(CellValue::is_numeric);
            if numeric {
                numeric_predictors.push(name.clone());
            } else {
                categorical_predictors.push(name.clone());
            }
        }

        Ok(Dataset {
            columns,
            rows,
            categorical_predictors,
            numeric_predictors,
            sex_values,
            age_range,
        })
    }

    /// Column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn categorical_predictors(&self) -> &[String] {
        &self.categorical_predictors
    }

    pub fn numeric_predictors(&self) -> &[String] {
        &self.numeric_predictors
    }

    /// Observed sex values. The "Any" wildcard is not part of the data.
    pub fn sex_values(&self) -> &[String] {
        &self.sex_values
    }

    /// Observed (min, max) age.
    pub fn age_range(&self) -> (i64, i64) {
        self.age_range
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolve a predictor against the requested classified set.
    pub fn predictor_index(&self, name: &str, kind: PredictorKind) -> Result<usize> {
        let set = match kind {
            PredictorKind::Categorical => &self.categorical_predictors,
            PredictorKind::Numeric => &self.numeric_predictors,
        };
        if !set.iter().any(|p| p == name) {
            return Err(ExploreError::InvalidPredictor {
                predictor: name.to_string(),
                kind,
            });
        }
        self.column_index(name).ok_or_else(|| ExploreError::InvalidPredictor {
            predictor: name.to_string(),
            kind,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
