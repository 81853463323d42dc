//! Dataset loading from CSV or Parquet files.
//!
//! Both formats are decoded into Arrow record batches. Every required
//! column is cast to text and parsed here, so CSV and Parquet inputs go
//! through the same validation path and fail with the same [`DataError`]s.

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::cast;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{debug, info};

use crate::error::DataError;
use crate::record::{Dataset, Season, TemperatureRecord};

/// Columns every input must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["city", "timestamp", "temperature", "season"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Load a dataset, choosing the decoder from the file extension.
pub fn load_dataset(path: &Path) -> Result<Dataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let file = std::fs::File::open(path)?;
    let dataset = match ext.as_str() {
        "csv" => load_csv(file)?,
        "parquet" => load_parquet(file)?,
        other => return Err(DataError::UnsupportedFormat(format!("'.{other}' ({})", path.display()))),
    };

    info!(
        "Loaded {} records for {} cities from {}",
        dataset.len(),
        dataset.city_count(),
        path.display()
    );
    Ok(dataset)
}

/// Load CSV with a header row. Columns are located by name; extra columns are ignored.
pub fn load_csv<R: Read>(mut reader: R) -> Result<Dataset, DataError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(Cursor::new(&bytes), Some(1))?;

    // Read every column as text; typed parsing happens per row below.
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name().trim(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    for column in REQUIRED_COLUMNS {
        if schema.index_of(column).is_err() {
            return Err(DataError::MissingColumn(column.to_string()));
        }
    }

    let csv = ReaderBuilder::new(schema)
        .with_header(true)
        .build(Cursor::new(bytes))?;

    let mut records = Vec::new();
    for batch in csv {
        let batch = batch?;
        let offset = records.len();
        batch_to_records(&batch, offset, &mut records)?;
    }

    debug!(rows = records.len(), "csv decoded");
    Ok(Dataset::from_records(records))
}

/// Load a Parquet file containing the required columns (any Arrow types castable to text).
pub fn load_parquet(file: std::fs::File) -> Result<Dataset, DataError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let offset = records.len();
        batch_to_records(&batch, offset, &mut records)?;
    }

    debug!(rows = records.len(), "parquet decoded");
    Ok(Dataset::from_records(records))
}

/// Cast a named column to Utf8.
fn text_column(batch: &RecordBatch, name: &str) -> Result<ArrayRef, DataError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
    Ok(cast(column, &DataType::Utf8)?)
}

fn as_strings<'a>(array: &'a ArrayRef, name: &str) -> Result<&'a StringArray, DataError> {
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DataError::Arrow(format!("column '{name}' is not text after cast")))
}

fn cell<'a>(array: &'a StringArray, idx: usize, row: usize, column: &str) -> Result<&'a str, DataError> {
    if array.is_null(idx) {
        return Err(DataError::MissingValue { row, column: column.to_string() });
    }
    let value = array.value(idx).trim();
    if value.is_empty() {
        return Err(DataError::MissingValue { row, column: column.to_string() });
    }
    Ok(value)
}

fn batch_to_records(
    batch: &RecordBatch,
    row_offset: usize,
    out: &mut Vec<TemperatureRecord>,
) -> Result<(), DataError> {
    let cities = text_column(batch, "city")?;
    let timestamps = text_column(batch, "timestamp")?;
    let temperatures = text_column(batch, "temperature")?;
    let seasons = text_column(batch, "season")?;

    let cities = as_strings(&cities, "city")?;
    let timestamps = as_strings(&timestamps, "timestamp")?;
    let temperatures = as_strings(&temperatures, "temperature")?;
    let seasons = as_strings(&seasons, "season")?;

    for idx in 0..batch.num_rows() {
        let row = row_offset + idx + 1;

        let city = cell(cities, idx, row, "city")?;

        let raw_ts = cell(timestamps, idx, row, "timestamp")?;
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| DataError::InvalidTimestamp {
            row,
            value: raw_ts.to_string(),
        })?;

        let raw_temp = cell(temperatures, idx, row, "temperature")?;
        let temperature = raw_temp
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .ok_or_else(|| DataError::InvalidTemperature {
                row,
                value: raw_temp.to_string(),
            })?;

        let raw_season = cell(seasons, idx, row, "season")?;
        let season = raw_season.parse::<Season>().map_err(|_| DataError::InvalidSeason {
            row,
            value: raw_season.to_string(),
        })?;

        out.push(TemperatureRecord::new(city, timestamp, temperature, season));
    }

    Ok(())
}

/// Parse RFC 3339, common naive date-time layouts, or a bare date. Naive values are UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
