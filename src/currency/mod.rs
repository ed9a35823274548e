//! Currency helpers: the flat domestic VAT rule and amount formatting.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DOMESTIC_CURRENCY: &str = "KRW";
pub const DEFAULT_DOMESTIC_VAT_RATE: f64 = 10.0;

/// Flat VAT rule: companies billed in the domestic currency pay the domestic
/// rate, everyone else pays nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatPolicy {
    pub domestic_currency: String,
    pub domestic_rate: f64,
}

impl Default for VatPolicy {
    fn default() -> Self {
        Self {
            domestic_currency: DEFAULT_DOMESTIC_CURRENCY.into(),
            domestic_rate: DEFAULT_DOMESTIC_VAT_RATE,
        }
    }
}

impl VatPolicy {
    pub fn rate_for(&self, currency: &str) -> f64 {
        if currency
            .trim()
            .eq_ignore_ascii_case(self.domestic_currency.trim())
        {
            self.domestic_rate
        } else {
            0.0
        }
    }
}

/// Renders an amount with grouping separators and a fixed number of decimals,
/// e.g. `1234.5` -> `1,234.50`.
pub fn format_amount(value: f64, precision: u8) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let body = format!("{:.*}", precision as usize, value.abs());
    let (int_part, frac_part) = match body.find('.') {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body.as_str(), ""),
    };
    let grouped = group_digits(int_part, ',');
    let is_zero = body.chars().all(|ch| ch == '0' || ch == '.');
    if value < 0.0 && !is_zero {
        format!("-{}{}", grouped, frac_part)
    } else {
        format!("{}{}", grouped, frac_part)
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
