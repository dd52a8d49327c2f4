use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

// ---------------------------------------------------------------------------
// Sensitivity table reader
// ---------------------------------------------------------------------------

/// A sensitivity table: named numeric columns, one sequence per column.
///
/// `wrange` is derived while reading: for every column whose name contains
/// `WAVE`, it becomes that column's `(min, max)`. When several wavelength
/// columns exist, the last one read wins.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityTable {
    /// Column names in file order.
    pub column_names: Vec<String>,
    /// Column name → ordered values.
    pub columns: BTreeMap<String, Vec<f64>>,
    /// `(min, max)` of the wavelength column, if any.
    pub wrange: Option<(f64, f64)>,
}

impl SensitivityTable {
    fn from_columns(column_names: Vec<String>, columns: BTreeMap<String, Vec<f64>>) -> Self {
        let mut wrange = None;
        for name in &column_names {
            if !name.contains("WAVE") {
                continue;
            }
            let Some(values) = columns.get(name) else {
                continue;
            };
            if values.is_empty() {
                continue;
            }
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            wrange = Some((min, max));
        }
        SensitivityTable {
            column_names,
            columns,
            wrange,
        }
    }
}

/// Load a sensitivity table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat numeric columns (the binary calibration product)
/// * `.csv`     – header row of column names, every cell numeric
pub fn read_sensitivity_file(path: &Path) -> Result<SensitivityTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => read_parquet(path),
        "csv" => read_csv(path),
        other => bail!("Unsupported sensitivity file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<SensitivityTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let column_names: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: BTreeMap<String, Vec<f64>> = column_names
        .iter()
        .map(|name| (name.clone(), Vec::new()))
        .collect();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, cell) in record.iter().enumerate() {
            let name = column_names
                .get(col_idx)
                .with_context(|| format!("CSV row {row_no}: more cells than headers"))?;
            let value: f64 = cell.trim().parse().with_context(|| {
                format!("Row {row_no}, {name}: '{cell}' is not a number")
            })?;
            columns
                .get_mut(name)
                .expect("column pre-seeded from headers")
                .push(value);
        }
    }

    Ok(SensitivityTable::from_columns(column_names, columns))
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

fn read_parquet(path: &Path) -> Result<SensitivityTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if column_names.is_empty() {
            column_names = schema.fields().iter().map(|f| f.name().clone()).collect();
        }

        for (col_idx, name) in column_names.iter().enumerate() {
            let values = extract_f64_column(batch.column(col_idx))
                .with_context(|| format!("column {name}"))?;
            columns.entry(name.clone()).or_default().extend(values);
        }
    }

    Ok(SensitivityTable::from_columns(column_names, columns))
}

/// Read a whole numeric Arrow column as `f64`, nulls becoming NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect())
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::Float64Array;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    #[test]
    fn csv_columns_and_wrange() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sens.csv");
        std::fs::write(
            &path,
            "WAVELENGTH,SENSITIVITY,ERROR\n0.8,10.0,0.1\n1.2,12.5,0.2\n2.2,11.0,0.3\n",
        )
        .unwrap();

        let table = read_sensitivity_file(&path).unwrap();
        assert_eq!(
            table.column_names,
            vec!["WAVELENGTH", "SENSITIVITY", "ERROR"]
        );
        assert_eq!(table.columns["SENSITIVITY"], vec![10.0, 12.5, 11.0]);
        assert_eq!(table.wrange, Some((0.8, 2.2)));
    }

    #[test]
    fn csv_without_wavelength_column_has_no_wrange() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sens.csv");
        std::fs::write(&path, "SENSITIVITY\n1.0\n2.0\n").unwrap();

        let table = read_sensitivity_file(&path).unwrap();
        assert_eq!(table.wrange, None);
    }

    #[test]
    fn csv_non_numeric_cell_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sens.csv");
        std::fs::write(&path, "WAVELENGTH,SENSITIVITY\n0.8,high\n").unwrap();

        let err = read_sensitivity_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("SENSITIVITY"));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = read_sensitivity_file(Path::new("sens.fits")).unwrap_err();
        assert!(err.to_string().contains(".fits"));
    }

    #[test]
    fn parquet_matches_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sens.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("WAVELENGTH", DataType::Float64, false),
            Field::new("SENSITIVITY", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![0.8, 1.2, 2.2])),
                Arc::new(Float64Array::from(vec![10.0, 12.5, 11.0])),
            ],
        )
        .unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = read_sensitivity_file(&path).unwrap();
        assert_eq!(table.column_names, vec!["WAVELENGTH", "SENSITIVITY"]);
        assert_eq!(table.columns["WAVELENGTH"], vec![0.8, 1.2, 2.2]);
        assert_eq!(table.wrange, Some((0.8, 2.2)));
    }
}
