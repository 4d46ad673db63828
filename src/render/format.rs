/// Whole numbers print without decimals and fractional ones with up to two,
/// grouped by thousands: `1500` -> `1,500`, `1234.5` -> `1,234.5`.
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let raw = if value.fract() == 0.0 {
        format!("{:.0}", value.abs())
    } else {
        let fixed = format!("{:.2}", value.abs());
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    let (integer, fraction) = match raw.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 4);
    if value < 0.0 && raw.chars().any(|c| c != '0' && c != '.') {
        grouped.push('-');
    }
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

pub fn format_currency(value: f64, symbol: &str) -> String {
    format!("{symbol}{}", group_thousands(value))
}

pub fn format_efficiency(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

/// Percentages are shown as the service returned them.
pub fn format_percent(value: f64) -> String {
    format!("{value}%")
}
