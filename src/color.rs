use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use order_insights::data::model::Lateness;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

pub fn lateness_color(lateness: Lateness) -> Color32 {
    match lateness {
        Lateness::OnTime => Color32::from_rgb(76, 175, 80),
        Lateness::Late => Color32::from_rgb(229, 57, 53),
    }
}

// ---------------------------------------------------------------------------
// Payment type → Color32
// ---------------------------------------------------------------------------

/// Stable colour per payment type, so the same method has the same colour in
/// every chart regardless of how the chart is sorted.
#[derive(Debug, Clone, Default)]
pub struct PaymentColors {
    mapping: BTreeMap<String, Color32>,
}

impl PaymentColors {
    pub fn new(payment_types: &BTreeSet<String>) -> Self {
        let mapping = payment_types
            .iter()
            .cloned()
            .zip(generate_palette(payment_types.len()))
            .collect();
        PaymentColors { mapping }
    }

    pub fn color_for(&self, payment_type: &str) -> Color32 {
        self.mapping
            .get(payment_type)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        let unique: BTreeSet<_> = p.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_payment_type_is_gray() {
        let types: BTreeSet<String> = ["boleto", "voucher"].iter().map(|s| s.to_string()).collect();
        let colors = PaymentColors::new(&types);
        assert_ne!(colors.color_for("boleto"), colors.color_for("voucher"));
        assert_eq!(colors.color_for("debit_card"), Color32::GRAY);
    }
}
