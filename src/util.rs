// Parsing and statistics helpers.
//
// Source sheets are exported by hand, so every cell goes through the lenient
// parsers here before it reaches a typed table.
use chrono::{NaiveDate, NaiveDateTime};

/// Parse a spreadsheet cell into `f64`.
///
/// - Trims whitespace and strips thousands separators (`1,250.50`).
/// - Rejects anything containing letters (`N/A`, `TBD`).
/// - Returns `None` for empty or unparseable cells, and for NaN/inf.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a date cell. Timestamps are truncated to their calendar day.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Trimmed, non-empty text or `None`.
pub fn non_empty(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Whole days from `from` to `to`; negative when `to` is in the past.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Arithmetic mean, `None` for an empty slice so callers can tell
/// "no values" apart from a mean of zero.
pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

/// Quantile `q` (0..=1) with linear interpolation between the closest ranks.
///
/// Matches the default method of most dataframe libraries: for `n` sorted
/// values the quantile sits at position `q * (n - 1)`.
pub fn percentile(mut v: Vec<f64>, q: f64) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (v.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(v[lo] + (v[hi] - v[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_with_separators() {
        assert_eq!(parse_f64_safe(Some(" 1,250.50 ")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("N/A")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parses_supported_date_layouts() {
        let d = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(parse_date_safe(Some("2025-06-01")), Some(d));
        assert_eq!(parse_date_safe(Some("2025/06/01")), Some(d));
        assert_eq!(parse_date_safe(Some("01/06/2025")), Some(d));
        assert_eq!(parse_date_safe(Some("2025-06-01 14:30:00")), Some(d));
        assert_eq!(parse_date_safe(Some("soon")), None);
    }

    #[test]
    fn percentile_interpolates() {
        assert_eq!(percentile(vec![10.0, 20.0, 30.0, 40.0], 0.75), Some(32.5));
        assert_eq!(percentile(vec![5.0], 0.75), Some(5.0));
        assert_eq!(percentile(vec![], 0.75), None);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0]), Some(1.5));
    }
}
