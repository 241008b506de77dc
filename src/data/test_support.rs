use std::collections::BTreeMap;

use super::model::{Dataset, Lateness, OrderRecord, REQUIRED_COLUMNS};

/// A row with neutral numeric values; tests override what they need.
pub fn record(payment: &str, late: u8) -> OrderRecord {
    OrderRecord {
        payment_type: payment.to_string(),
        is_late: Lateness::from_flag(late as f64),
        review_score: 4.0,
        delay_days: 0.0,
        is_repeat_customer: 0.0,
        payment_value: 100.0,
        extra: BTreeMap::new(),
    }
}

/// A row with every numeric column set.
pub fn full_record(
    payment: &str,
    late: u8,
    review: f64,
    delay: f64,
    repeat: f64,
    value: f64,
) -> OrderRecord {
    OrderRecord {
        review_score: review,
        delay_days: delay,
        is_repeat_customer: repeat,
        payment_value: value,
        ..record(payment, late)
    }
}

pub fn dataset(records: Vec<OrderRecord>) -> Dataset {
    Dataset::new(
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        records,
    )
}

/// Eight orders over three payment types with a spread of values.
pub fn sample_dataset() -> Dataset {
    dataset(vec![
        full_record("credit_card", 0, 5.0, -10.0, 0.0, 120.0),
        full_record("credit_card", 1, 2.0, 4.0, 1.0, 80.0),
        full_record("credit_card", 0, 4.0, -6.0, 0.0, 95.5),
        full_record("boleto", 0, 5.0, -12.0, 1.0, 40.0),
        full_record("boleto", 1, 1.0, 9.0, 0.0, 60.0),
        full_record("voucher", 0, 4.0, -3.0, 0.0, 15.0),
        full_record("voucher", 0, 3.0, -1.0, 1.0, 20.0),
        full_record("voucher", 1, 2.0, 2.0, 0.0, 900.0),
    ])
}
