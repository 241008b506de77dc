use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const PAYMENT_TYPE: &str = "payment_type";
pub const IS_LATE: &str = "is_late";
pub const REVIEW_SCORE: &str = "review_score";
pub const DELAY_DAYS: &str = "delay_days";
pub const IS_REPEAT_CUSTOMER: &str = "is_repeat_customer";
pub const PAYMENT_VALUE: &str = "payment_value";

/// Columns every input file must carry. Anything else is kept verbatim.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    PAYMENT_TYPE,
    IS_LATE,
    REVIEW_SCORE,
    DELAY_DAYS,
    IS_REPEAT_CUSTOMER,
    PAYMENT_VALUE,
];

// ---------------------------------------------------------------------------
// Lateness – the 0/1 delivery flag
// ---------------------------------------------------------------------------

/// Delivery status of an order. Ordered so that on-time sorts before late,
/// which is the fixed order of every two-bucket breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lateness {
    OnTime,
    Late,
}

impl Lateness {
    pub const ALL: [Lateness; 2] = [Lateness::OnTime, Lateness::Late];

    /// Interpret the raw integer flag. Anything but 0 or 1 is not a flag.
    pub fn from_flag(flag: f64) -> Option<Self> {
        if flag == 0.0 {
            Some(Lateness::OnTime)
        } else if flag == 1.0 {
            Some(Lateness::Late)
        } else {
            None
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Lateness::OnTime => 0,
            Lateness::Late => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lateness::OnTime => "On time",
            Lateness::Late => "Late",
        }
    }
}

impl fmt::Display for Lateness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// OrderRecord – one row of the CSV
// ---------------------------------------------------------------------------

/// A single order. Numeric fields use `NaN` as the missing-value marker.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub payment_type: String,
    /// `None` when the flag was missing or not 0/1.
    pub is_late: Option<Lateness>,
    pub review_score: f64,
    pub delay_days: f64,
    pub is_repeat_customer: f64,
    pub payment_value: f64,
    /// Columns beyond the required six: column_name → raw text.
    pub extra: BTreeMap<String, String>,
}

impl OrderRecord {
    /// `is_late` as a number, for averaging into a late rate.
    pub fn late_flag(&self) -> f64 {
        self.is_late.map_or(f64::NAN, |l| l.flag() as f64)
    }

    /// Render any column of this row as display text.
    pub fn cell(&self, column: &str) -> String {
        match column {
            PAYMENT_TYPE => self.payment_type.clone(),
            IS_LATE => self
                .is_late
                .map_or_else(|| NULL_CELL.to_string(), |l| l.flag().to_string()),
            REVIEW_SCORE => format_number(self.review_score),
            DELAY_DAYS => format_number(self.delay_days),
            IS_REPEAT_CUSTOMER => format_number(self.is_repeat_customer),
            PAYMENT_VALUE => format_number(self.payment_value),
            other => self.extra.get(other).cloned().unwrap_or_default(),
        }
    }
}

const NULL_CELL: &str = "<null>";

fn format_number(v: f64) -> String {
    if v.is_nan() {
        NULL_CELL.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:.2}")
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table. Immutable once built; shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// All orders (rows), in file order.
    pub records: Vec<OrderRecord>,
    /// Header order as found in the file.
    pub columns: Vec<String>,
    /// Sorted set of distinct payment types, used as filter options.
    pub payment_types: BTreeSet<String>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<OrderRecord>) -> Self {
        let payment_types = records.iter().map(|r| r.payment_type.clone()).collect();
        Dataset {
            records,
            columns,
            payment_types,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
