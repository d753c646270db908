//! Numeric values out of free-text prices and ratings

use regex::Regex;
use std::sync::LazyLock;

static NUMERIC_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("valid numeric token pattern"));

/// Parses the first number in `text`, honouring thousands and decimal separators
///
/// - Both `,` and `.` present: the rightmost one is the decimal separator
///   (`"1,234.56"`, `"1.234,56"`)
/// - Only dots: one dot is decimal (`"1.234"` is 1.234), several are
///   thousands separators (`"1.234.567"`)
/// - Only commas: a single comma followed by exactly three digits is a
///   thousands separator (`"1,234"`), any other single comma is decimal
///   (`"12,50"`), several are thousands separators
///
/// # Example
///
/// ```
/// use page_harvest::product::parse_amount;
///
/// assert_eq!(parse_amount("$1,299.00"), Some(1299.0));
/// assert_eq!(parse_amount("€12,50"), Some(12.5));
/// assert_eq!(parse_amount("n/a"), None);
/// ```
pub fn parse_amount(text: &str) -> Option<f64> {
    let token = NUMERIC_TOKEN_RE
        .find(text)?
        .as_str()
        .trim_end_matches(['.', ',']);

    let last_comma = token.rfind(',');
    let last_dot = token.rfind('.');

    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => token.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => token.replace(',', ""),
        (None, Some(_)) if token.matches('.').count() > 1 => token.replace('.', ""),
        (None, _) => token.to_string(),
        (Some(comma), None) => {
            let single = token.matches(',').count() == 1;
            let digits_after = token.len() - comma - 1;
            if single && digits_after != 3 {
                token.replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
    };

    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}
