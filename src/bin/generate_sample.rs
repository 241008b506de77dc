use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

/// Payment methods with their share of orders and late-delivery rate.
const PAYMENT_MIX: [(&str, f64, f64); 4] = [
    ("credit_card", 0.74, 0.080),
    ("boleto", 0.19, 0.095),
    ("voucher", 0.05, 0.070),
    ("debit_card", 0.02, 0.060),
];

const DEFAULT_ROWS: usize = 600;
const DEFAULT_OUTPUT: &str = "data/main_data.csv";

#[derive(Debug, Serialize)]
struct SampleOrder {
    order_id: String,
    payment_type: &'static str,
    is_late: u8,
    review_score: u8,
    delay_days: i64,
    is_repeat_customer: u8,
    payment_value: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn pick_payment(rng: &mut SimpleRng) -> (&'static str, f64) {
    let mut roll = rng.next_f64();
    for (name, share, late_rate) in PAYMENT_MIX {
        if roll < share {
            return (name, late_rate);
        }
        roll -= share;
    }
    let (name, _, late_rate) = PAYMENT_MIX[0];
    (name, late_rate)
}

fn sample_order(rng: &mut SimpleRng, id: usize) -> SampleOrder {
    let (payment_type, late_rate) = pick_payment(rng);
    let late = rng.chance(late_rate);

    // Early deliveries are the norm; late ones are a few days to weeks over.
    let delay_days = if late {
        1.0 + rng.gauss(0.0, 9.0).abs()
    } else {
        rng.gauss(-12.0, 7.0).min(0.0)
    };

    let review_mean = if late { 2.4 } else { 4.2 };
    let review_score = rng.gauss(review_mean, 1.1).round().clamp(1.0, 5.0) as u8;

    let basket_mean = if payment_type == "voucher" { 3.6 } else { 4.7 };
    let payment_value = (rng.gauss(basket_mean, 0.8).exp() * 100.0).round() / 100.0;

    SampleOrder {
        order_id: format!("ord{id:06}"),
        payment_type,
        is_late: late as u8,
        review_score,
        delay_days: delay_days.round() as i64,
        is_repeat_customer: rng.chance(0.03) as u8,
        payment_value,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string()));
    let rows = match args.next() {
        Some(n) => n.parse().with_context(|| format!("row count '{n}' is not a number"))?,
        None => DEFAULT_ROWS,
    };

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    for id in 0..rows {
        writer
            .serialize(sample_order(&mut rng, id))
            .context("writing sample order")?;
    }
    writer.flush().context("flushing CSV")?;

    log::info!("Wrote {rows} orders to {}", output.display());
    println!("Wrote {rows} orders to {}", output.display());
    Ok(())
}
