use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset};
use crate::error::{ExploreError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the patient dataset from a local path or `file://` URI. Dispatch by
/// extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "Age": 40, "Sex": "M", ... }, ...]`
/// * `.parquet` – flat columns of strings, ints, floats or bools
///
/// Every failure, including schema checks, surfaces as `DataUnavailable`.
pub fn load_dataset(uri: &str) -> Result<Dataset> {
    let result = resolve_path(uri).and_then(|path| load_file(&path));
    match result {
        Ok(table) => {
            let dataset = Dataset::from_records(table.columns, table.records)
                .inspect_err(|e| log::error!("Failed to load {uri}: {e}"))?;
            log::info!(
                "Loaded {} rows from {uri}; categorical predictors {:?}, numeric predictors {:?}",
                dataset.len(),
                dataset.categorical_predictors(),
                dataset.numeric_predictors()
            );
            Ok(dataset)
        }
        Err(e) => {
            log::error!("Failed to load {uri}: {e:#}");
            Err(ExploreError::DataUnavailable(format!("{e:#}")))
        }
    }
}

/// Parse CSV text from any reader into a classified dataset.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset> {
    let table = read_csv(csv::Reader::from_reader(reader))
        .map_err(|e| ExploreError::DataUnavailable(format!("{e:#}")))?;
    Dataset::from_records(table.columns, table.records)
}

/// Parse records-oriented JSON text into a classified dataset.
pub fn parse_json(text: &str) -> Result<Dataset> {
    let table = read_json(text).map_err(|e| ExploreError::DataUnavailable(format!("{e:#}")))?;
    Dataset::from_records(table.columns, table.records)
}

/// Header plus row-major cells, before schema classification.
struct RawTable {
    columns: Vec<String>,
    records: Vec<Vec<CellValue>>,
}

fn resolve_path(uri: &str) -> anyhow::Result<std::path::PathBuf> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(path.into());
    }
    if let Some((scheme, _)) = uri.split_once("://") {
        bail!("Unsupported URI scheme: {scheme}");
    }
    Ok(uri.into())
}

fn load_file(path: &Path) -> anyhow::Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&text)
        }
        "csv" => read_csv(csv::Reader::from_path(path).context("opening CSV")?),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Age": 40, "Sex": "M", "ChestPainType": "ATA", "HeartDisease": 0 },
///   ...
/// ]
/// ```
///
/// Column order follows the first record; later records may omit keys
/// (read as null) but may not introduce new ones.
fn read_json(text: &str) -> anyhow::Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let objects = root.as_array().context("Expected top-level JSON array")?;

    let columns: Vec<String> = match objects.first() {
        Some(first) => first
            .as_object()
            .context("Row 0 is not a JSON object")?
            .keys()
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    let mut records = Vec::with_capacity(objects.len());
    for (i, rec) in objects.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        if let Some(extra) = obj.keys().find(|k| !columns.contains(k)) {
            bail!("Row {i}: unexpected column '{extra}'");
        }

        records.push(
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect(),
        );
    }

    Ok(RawTable { columns, records })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                float_cell(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

/// Non-finite floats carry no value for grouping or plotting.
fn float_cell(f: f64) -> CellValue {
    if f.is_finite() {
        CellValue::Float(f)
    } else {
        CellValue::Null
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, cell types guessed per cell.
fn read_csv<R: Read>(mut reader: csv::Reader<R>) -> anyhow::Result<RawTable> {
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { columns, records })
}

/// Tokens read as a missing value, matching the usual CSV writers' NA markers.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if NA_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return float_cell(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> anyhow::Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = (0..batch.num_columns())
                .map(|col_idx| {
                    extract_cell(batch.column(col_idx), row)
                        .with_context(|| format!("Row {row}, column '{}'", columns[col_idx]))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            records.push(cells);
        }
    }

    Ok(RawTable { columns, records })
}

// -- Arrow helpers --

fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> anyhow::Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> anyhow::Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => CellValue::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => float_cell(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => float_cell(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => CellValue::Bool(downcast::<BooleanArray>(col)?.value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Outcome;

    const HEART_CSV: &str = "\
Age,Sex,ChestPainType,Cholesterol,Oldpeak,HeartDisease
40,M,ATA,289,0,0
49,F,NAP,180,1.0,1
37,M,ATA,283,0,0
";

    #[test]
    fn test_parse_csv_classifies_columns() {
        let ds = parse_csv(HEART_CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.categorical_predictors(), &["Sex", "ChestPainType"]);
        assert_eq!(ds.numeric_predictors(), &["Age", "Cholesterol", "Oldpeak"]);
        assert_eq!(ds.age_range(), (37, 49));
        assert_eq!(ds.rows()[1].outcome(), Outcome::Disease);
    }

    #[test]
    fn test_parse_json_keeps_first_record_column_order() {
        let ds = parse_json(
            r#"[{"Sex":"F","Age":50,"RestingECG":"ST","HeartDisease":1},
                {"Sex":"M","Age":61,"HeartDisease":0}]"#,
        )
        .unwrap();
        assert_eq!(ds.columns(), &["Sex", "Age", "RestingECG", "HeartDisease"]);
        assert!(ds.rows()[1].cell(2).is_null());
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let err = load_dataset("/nonexistent/heart.csv").unwrap_err();
        assert!(matches!(err, ExploreError::DataUnavailable(_)));
    }

    #[test]
    fn test_remote_and_unknown_sources_are_data_unavailable() {
        assert!(matches!(
            load_dataset("https://example.org/heart.csv"),
            Err(ExploreError::DataUnavailable(_))
        ));
        assert!(matches!(
            load_dataset("heart.xlsx"),
            Err(ExploreError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_na_tokens_keep_numeric_column_numeric() {
        let csv = "\
Age,Sex,Cholesterol,MaxHR,HeartDisease
40,M,289,172,0
49,F,NA,inf,1
37,M,NaN,98,0
";
        let ds = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.numeric_predictors(), &["Age", "Cholesterol", "MaxHR"]);
        assert_eq!(ds.categorical_predictors(), &["Sex"]);

        let chol = ds.column_index("Cholesterol").unwrap();
        assert!(ds.rows()[1].cell(chol).is_null());
        assert!(ds.rows()[2].cell(chol).is_null());
        let max_hr = ds.column_index("MaxHR").unwrap();
        assert!(ds.rows()[1].cell(max_hr).is_null());
    }

    #[test]
    fn test_guess_cell_type() {
        assert_eq!(guess_cell_type("42"), CellValue::Integer(42));
        assert_eq!(guess_cell_type("1.5"), CellValue::Float(1.5));
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type(" N/A "), CellValue::Null);
        assert_eq!(guess_cell_type("null"), CellValue::Null);
        assert_eq!(guess_cell_type("nan"), CellValue::Null);
        assert_eq!(guess_cell_type("Flat"), CellValue::String("Flat".into()));
    }
}
