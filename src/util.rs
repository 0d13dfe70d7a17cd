// Number parsing and formatting helpers.
//
// Parsing is kept forgiving about the cosmetic noise spreadsheet exports add
// (whitespace, thousands separators) and strict about everything else.
use num_format::{Locale, ToFormattedString};

/// Parse a numeric CSV cell into `f64`.
///
/// - Trims whitespace.
/// - Accepts anything `f64` parses, including scientific notation (`1e-05`),
///   but rejects `NaN` and infinities.
/// - Accepts thousands separators (`1,234.5`) only when the digits after
///   the first group come in threes, so `1,2` is an error rather than `12`.
pub fn parse_f64_safe(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    strip_thousands(s)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn strip_thousands(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let unsigned = s.trim_start_matches(|c: char| c == '+' || c == '-');
    let int_end = unsigned
        .find(|c: char| c == '.' || c == 'e' || c == 'E')
        .unwrap_or(unsigned.len());
    let (int_part, rest) = unsigned.split_at(int_end);
    if rest.contains(',') {
        return None;
    }
    let is_digits = |g: &str| !g.is_empty() && g.chars().all(|c| c.is_ascii_digit());
    let mut groups = int_part.split(',');
    let first = groups.next()?;
    if !is_digits(first) || first.len() > 3 {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && is_digits(g)) {
        return None;
    }
    Some(s.replace(',', ""))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // Rounding can turn a tiny negative into zero; don't print `-0.00`.
    if n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// `$1,234.56`, with the sign in front of the currency symbol.
pub fn format_currency(n: f64) -> String {
    let body = format_number(n.abs(), 2);
    if n < 0.0 && body != "0.00" {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// `12.34%`. The value is printed as-is, not scaled by 100.
pub fn format_percent(n: f64) -> String {
    format!("{}%", format_number(n, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
