//! fr-FR number formatting for the terminal presentation
//!
//! Thousands are grouped with a narrow no-break space (U+202F) and the
//! decimal separator is a comma, e.g. `3 416 300 000 000,00`.

/// Thousands separator used by the fr-FR locale
pub const GROUP_SEPARATOR: char = '\u{202F}';

/// Format `value` with exactly `decimals` fraction digits
///
/// Non-finite values render as `-`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    // No sign when the value rounds to zero
    if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(digit);
    }
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Per-capita amount in whole euros, or `n/a` when the population is unknown
pub fn format_per_capita(per_capita: Option<f64>) -> String {
    match per_capita {
        Some(v) => format!("{} €", format_number(v, 0)),
        None => "n/a".to_string(),
    }
}
