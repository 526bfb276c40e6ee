//! Display filters applied to values before they reach the view.

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_ZERO_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.0(\s+)").expect("trailing zero decimal pattern"));

/// Drops a `.0` that sits right before whitespace, so "5.0 mg" reads "5 mg".
///
/// Empty or missing input yields `None`.
pub fn format_decimal_values(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    Some(TRAILING_ZERO_DECIMAL.replace_all(value, "$1").into_owned())
}
