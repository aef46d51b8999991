/// Smallest magnitude at which an f64 has no fractional bits (2^52).
const MAX_EXACT_FRACTION: f64 = 4_503_599_627_370_496.0;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// Non-finite values are rendered as `"inf"`, `"-inf"` or `"NaN"`.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// assert_eq!(format_number(f64::INFINITY, 2), "inf");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact decimal midpoints round up. Past
    // 2^52 every f64 is already an integer and the nudge would move it.
    let factor = 10_f64.powi(decimals as i32);
    let scaled = abs_value * factor;
    let rounded = if scaled >= MAX_EXACT_FRACTION {
        abs_value
    } else {
        (scaled + f64::EPSILON * scaled).round() / factor
    };

    let frac_part = rounded - rounded.trunc();

    let int_str = format!("{:.0}", rounded.trunc());
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        // `frac_str` starts with "0.", e.g. "0.50".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    // Values that round to zero never carry a sign.
    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a growth multiple with two decimals and a trailing `x`.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_growth;
///
/// assert_eq!(format_growth(1.5), "1.50x");
/// assert_eq!(format_growth(1234.0), "1,234.00x");
/// ```
pub fn format_growth(ratio: f64) -> String {
    format!("{}x", format_number(ratio, 2))
}

/// Format a possibly-missing amount for a metric card: thousands separators,
/// no decimals, `"n/a"` when absent or NaN.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_amount;
///
/// assert_eq!(format_amount(Some(12345.4)), "12,345");
/// assert_eq!(format_amount(None), "n/a");
/// ```
pub fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(v) if !v.is_nan() => format_number(v, 0),
        _ => "n/a".to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
