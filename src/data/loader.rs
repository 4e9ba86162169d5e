use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::RawRecord;
use crate::error::IntegrityError;

/// Rows of a tabular source, read lazily where the format allows it.
///
/// An `Err` item is an unexpected failure (unreadable row, missing column);
/// the pipeline aborts the batch on the first one.
pub type RowStream = Box<dyn Iterator<Item = Result<RawRecord>>>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Open a tabular source of `id` / `vitals` rows.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `id` and `vitals` columns (streamed)
/// * `.json`    – `[{ "id": "...", "vitals": "1,2,3" }, ...]`
/// * `.parquet` – `id` (text or integer) and `vitals` (text) columns
///
/// A path that does not exist is reported as [`IntegrityError::SourceMissing`];
/// any other failure to open is a batch abort with nothing processed.
pub fn open_rows(path: &Path) -> crate::error::Result<RowStream> {
    if !path.exists() {
        return Err(IntegrityError::SourceMissing(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let opened = match ext.as_str() {
        "csv" => open_csv(path),
        "json" => open_json(path),
        "parquet" | "pq" => open_parquet(path),
        other => return Err(IntegrityError::UnsupportedFormat(other.to_string())),
    };

    opened.map_err(|source| IntegrityError::BatchAborted {
        processed: 0,
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, among them `id` and `vitals`.
/// `vitals` holds comma-separated floats, so it is quoted in the file:
///   `"race car","1,2,3,2,1000"`
/// Extra columns are ignored.
fn open_csv(path: &Path) -> Result<RowStream> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let id_idx = headers
        .iter()
        .position(|h| h == "id")
        .context("CSV missing 'id' column")?;
    let vitals_idx = headers
        .iter()
        .position(|h| h == "vitals")
        .context("CSV missing 'vitals' column")?;

    let rows = reader
        .into_records()
        .enumerate()
        .map(move |(row_no, result)| -> Result<RawRecord> {
            let record = result.with_context(|| format!("CSV row {row_no}"))?;
            Ok(RawRecord::new(
                record.get(id_idx).unwrap_or(""),
                record.get(vitals_idx).unwrap_or(""),
            ))
        });

    Ok(Box::new(rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": "race car", "vitals": "1,2,3,2,1000" },
///   { "id": 1221,       "vitals": [4.0, 5.0, 4.5] }
/// ]
/// ```
///
/// Numeric ids are coerced to text; a `vitals` array is joined with commas.
fn open_json(path: &Path) -> Result<RowStream> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = match root {
        JsonValue::Array(records) => records,
        _ => bail!("Expected top-level JSON array"),
    };

    let rows = records.into_iter().enumerate().map(|(i, rec)| -> Result<RawRecord> {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let id = json_field_text(obj.get("id"), i, "id")?;
        let vitals = json_field_text(obj.get("vitals"), i, "vitals")?;
        Ok(RawRecord { id, vitals })
    });

    Ok(Box::new(rows))
}

fn json_field_text(val: Option<&JsonValue>, row: usize, col: &str) -> Result<String> {
    let val = val.with_context(|| format!("Row {row}: missing '{col}'"))?;
    json_to_text(val).with_context(|| format!("Row {row}: '{col}' cannot be read as text"))
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => Some(float_to_text(f)),
            _ => Some(n.to_string()),
        },
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null => Some(String::new()),
        JsonValue::Array(items) => items
            .iter()
            .map(json_to_text)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        JsonValue::Object(_) => None,
    }
}

/// Text form of a float cell, shared by every source: whole numbers drop
/// the fraction (`121.0` → `"121"`), everything else uses `Display`.
fn float_to_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of vitals records.
///
/// Expected schema:
/// - `id`: Utf8 / LargeUtf8, or an integer / float column coerced to text
/// - `vitals`: Utf8 / LargeUtf8 with comma-separated floats
/// - Any other columns are ignored
///
/// Nulls read as empty text, which the pipeline then rejects as malformed
/// vitals. A failing record batch or cell ends the stream with that error,
/// after the rows read before it.
fn open_parquet(path: &Path) -> Result<RowStream> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let id_idx = schema
        .index_of("id")
        .map_err(|_| anyhow::anyhow!("Parquet file missing 'id' column"))?;
    let vitals_idx = schema
        .index_of("vitals")
        .map_err(|_| anyhow::anyhow!("Parquet file missing 'vitals' column"))?;

    let reader = builder.build().context("building parquet reader")?;
    let mut rows: Vec<Result<RawRecord>> = Vec::new();
    // Row numbers in errors count from the start of the file, not the batch.
    let mut offset = 0;

    'batches: for batch_result in reader {
        let batch = match batch_result.context("reading parquet record batch") {
            Ok(batch) => batch,
            Err(e) => {
                rows.push(Err(e));
                break;
            }
        };

        let id_col = batch.column(id_idx);
        let vitals_col = batch.column(vitals_idx);

        for row in 0..batch.num_rows() {
            let record = read_parquet_row(id_col, vitals_col, row, offset + row);
            let failed = record.is_err();
            rows.push(record);
            if failed {
                break 'batches;
            }
        }
        offset += batch.num_rows();
    }

    Ok(Box::new(rows.into_iter()))
}

fn read_parquet_row(
    id_col: &ArrayRef,
    vitals_col: &ArrayRef,
    row: usize,
    file_row: usize,
) -> Result<RawRecord> {
    let id = extract_text(id_col, row)
        .with_context(|| format!("Row {file_row}: failed to read 'id'"))?;
    let vitals = extract_text(vitals_col, row)
        .with_context(|| format!("Row {file_row}: failed to read 'vitals'"))?;
    Ok(RawRecord { id, vitals })
}

/// Read one cell as text. Integer and float columns are coerced.
fn extract_text(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::Float32 => float_to_text(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_to_text(col.as_primitive::<Float64Type>().value(row)),
        other => bail!("Expected a text or numeric column, got {other:?}"),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_coerce_to_text() {
        assert_eq!(json_to_text(&json!(1221)).as_deref(), Some("1221"));
        assert_eq!(json_to_text(&json!(null)).as_deref(), Some(""));
    }

    #[test]
    fn whole_floats_drop_the_fraction() {
        assert_eq!(json_to_text(&json!(121.0)).as_deref(), Some("121"));
        assert_eq!(json_to_text(&json!(-4.0)).as_deref(), Some("-4"));
        assert_eq!(json_to_text(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(float_to_text(121.0), "121");
        assert_eq!(float_to_text(f64::NAN), "NaN");
    }

    #[test]
    fn json_vitals_array_is_joined() {
        assert_eq!(
            json_to_text(&json!([1.5, 2, "3"])).as_deref(),
            Some("1.5,2,3")
        );
    }

    #[test]
    fn json_object_is_not_text() {
        assert_eq!(json_to_text(&json!({"a": 1})), None);
    }

    #[test]
    fn parquet_cell_error_reports_file_row() {
        use arrow::array::BooleanArray;
        use std::sync::Arc;

        let col: ArrayRef = Arc::new(BooleanArray::from(vec![true]));
        let err = read_parquet_row(&col, &col, 0, 1500).unwrap_err();
        assert!(format!("{err:#}").starts_with("Row 1500: failed to read 'id'"));
    }

    #[test]
    fn parquet_rows_span_record_batches() {
        use arrow::array::StringArray;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;
        use std::sync::Arc;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("many.parquet");
        let total = 2500;

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("vitals", DataType::Utf8, false),
        ]));
        let ids: Vec<String> = (0..total).map(|i| format!("n{i}")).collect();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(ids.iter().map(String::as_str).collect::<Vec<_>>())),
                Arc::new(StringArray::from(vec!["1,2,3"; total])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows: Vec<RawRecord> = open_rows(&path)
            .ok()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), total);
        assert_eq!(rows[total - 1].id, format!("n{}", total - 1));
    }

    #[test]
    fn missing_path_is_source_missing() {
        let err = open_rows(Path::new("/no/such/vitals.csv")).err().unwrap();
        assert!(matches!(err, IntegrityError::SourceMissing(_)));
    }
}
