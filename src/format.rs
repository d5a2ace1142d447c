// Number and currency text for the console and exports.
use num_format::{Locale, ToFormattedString};

/// Fixed decimals with `en` thousands separators, e.g. `-1,234,567.89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return "n/a".to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    // "-0.00" is noise in a report
    if n.is_sign_negative() && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Rand amount, e.g. `R30,000.00` or `-R50.00`.
pub fn format_currency(n: f64) -> String {
    let s = format_number(n, 2);
    match s.strip_prefix('-') {
        Some(rest) => format!("-R{}", rest),
        None => format!("R{}", s),
    }
}

pub fn format_opt(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
