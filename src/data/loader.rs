use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::error::DataError;
use super::model::{
    Dataset, Lateness, OrderRecord, DELAY_DAYS, IS_LATE, IS_REPEAT_CUSTOMER, PAYMENT_TYPE,
    PAYMENT_VALUE, REQUIRED_COLUMNS, REVIEW_SCORE,
};

// ---------------------------------------------------------------------------
// Malformed numeric policy
// ---------------------------------------------------------------------------

/// What to do with a numeric cell that does not parse.
///
/// Empty cells are missing values under both policies, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericPolicy {
    /// Turn the cell into a missing value and keep going. Missing values are
    /// skipped by every numeric aggregate; an unusable `is_late` flag keeps
    /// the row out of every filtered view.
    #[default]
    Coerce,
    /// Fail the whole load on the first bad cell.
    Strict,
}

// ---------------------------------------------------------------------------
// Versioned, caller-owned data source
// ---------------------------------------------------------------------------

/// Identity of the file contents as far as the filesystem can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileVersion {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileVersion {
    fn of(path: &Path) -> Result<Self, DataError> {
        let meta = std::fs::metadata(path).map_err(|source| DataError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(FileVersion {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Handle on the dashboard's input file. Reads it once and hands out the
/// same `Arc<Dataset>` until the file's version changes.
#[derive(Debug)]
pub struct DataSource {
    path: PathBuf,
    policy: NumericPolicy,
    cached: Option<(FileVersion, Arc<Dataset>)>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>, policy: NumericPolicy) -> Self {
        DataSource {
            path: path.into(),
            policy,
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the dataset, reading the file only when nothing is cached or
    /// the file changed since the last read.
    pub fn load(&mut self) -> Result<Arc<Dataset>, DataError> {
        let version = FileVersion::of(&self.path)?;
        if let Some((cached_version, dataset)) = &self.cached {
            if *cached_version == version {
                log::debug!("Serving {} from cache", self.path.display());
                return Ok(Arc::clone(dataset));
            }
            log::info!("{} changed on disk, reloading", self.path.display());
        }

        let dataset = Arc::new(load_csv(&self.path, self.policy)?);
        log::info!(
            "Loaded {} orders with columns {:?} from {}",
            dataset.len(),
            dataset.columns,
            self.path.display()
        );
        self.cached = Some((version, Arc::clone(&dataset)));
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names. The six required columns may
/// appear in any order; any other column is kept as raw text.
pub fn load_csv(path: &Path, policy: NumericPolicy) -> Result<Dataset, DataError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| csv_error(path, source))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| csv_error(path, source))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let layout = ColumnLayout::new(path, &headers)?;
    let mut coerced = 0usize;
    let mut records = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|source| csv_error(path, source))?;
        // 1-based, header is line 1.
        let row = record
            .position()
            .map_or(idx + 2, |p| p.line() as usize);
        let mut parser = RowParser {
            record: &record,
            row,
            policy,
            coerced: &mut coerced,
        };

        let order = OrderRecord {
            payment_type: parser.text(layout.payment_type),
            is_late: parser.lateness(layout.is_late)?,
            review_score: parser.number(layout.review_score, REVIEW_SCORE)?,
            delay_days: parser.number(layout.delay_days, DELAY_DAYS)?,
            is_repeat_customer: parser.number(layout.is_repeat_customer, IS_REPEAT_CUSTOMER)?,
            payment_value: parser.number(layout.payment_value, PAYMENT_VALUE)?,
            extra: layout
                .extra
                .iter()
                .map(|(i, name)| (name.clone(), parser.text(*i)))
                .collect(),
        };
        records.push(order);
    }

    if coerced > 0 {
        log::warn!(
            "{}: {coerced} malformed numeric field(s) treated as missing",
            path.display()
        );
    }

    Ok(Dataset::new(headers, records))
}

fn csv_error(path: &Path, source: csv::Error) -> DataError {
    // Failing to open or read the file is an availability problem, not a
    // format one.
    if source.is_io_error() {
        return DataError::Unavailable {
            path: path.to_path_buf(),
            source: source.into(),
        };
    }
    DataError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Column positions resolved once from the header row.
struct ColumnLayout {
    payment_type: usize,
    is_late: usize,
    review_score: usize,
    delay_days: usize,
    is_repeat_customer: usize,
    payment_value: usize,
    extra: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn new(path: &Path, headers: &[String]) -> Result<Self, DataError> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DataError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                })
        };

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !REQUIRED_COLUMNS.contains(&h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(ColumnLayout {
            payment_type: find(PAYMENT_TYPE)?,
            is_late: find(IS_LATE)?,
            review_score: find(REVIEW_SCORE)?,
            delay_days: find(DELAY_DAYS)?,
            is_repeat_customer: find(IS_REPEAT_CUSTOMER)?,
            payment_value: find(PAYMENT_VALUE)?,
            extra,
        })
    }
}

struct RowParser<'a> {
    record: &'a StringRecord,
    row: usize,
    policy: NumericPolicy,
    coerced: &'a mut usize,
}

impl<'a> RowParser<'a> {
    fn raw(&self, idx: usize) -> &'a str {
        self.record.get(idx).unwrap_or("")
    }

    fn text(&self, idx: usize) -> String {
        self.raw(idx).to_string()
    }

    /// Parse a numeric cell; empty means missing (`NaN`).
    fn number(&mut self, idx: usize, column: &str) -> Result<f64, DataError> {
        let raw = self.raw(idx);
        if raw.is_empty() {
            return Ok(f64::NAN);
        }
        match raw.parse::<f64>() {
            Ok(v) => Ok(v),
            Err(_) => self.malformed(column, raw).map(|()| f64::NAN),
        }
    }

    fn lateness(&mut self, idx: usize) -> Result<Option<Lateness>, DataError> {
        let raw = self.raw(idx);
        let flag = self.number(idx, IS_LATE)?;
        if flag.is_nan() {
            return Ok(None);
        }
        match Lateness::from_flag(flag) {
            Some(l) => Ok(Some(l)),
            None => self.malformed(IS_LATE, raw).map(|()| None),
        }
    }

    fn malformed(&mut self, column: &str, value: &str) -> Result<(), DataError> {
        match self.policy {
            NumericPolicy::Coerce => {
                log::debug!("row {}: coercing {column}='{value}' to missing", self.row);
                *self.coerced += 1;
                Ok(())
            }
            NumericPolicy::Strict => Err(DataError::MalformedNumericField {
                row: self.row,
                column: column.to_string(),
                value: value.to_string(),
            }),
        }
    }
}
