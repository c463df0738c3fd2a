use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("leading float pattern is valid")
});

/// Parse the longest numeric prefix of `raw`.
///
/// Listing values often carry a unit suffix ("85000円", "5分", "25.5㎡"),
/// so only the leading number is read. Returns `None` when the text does
/// not start with a number.
pub fn parse_leading_float(raw: &str) -> Option<f64> {
    let captures = LEADING_FLOAT.captures(raw)?;
    captures
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
