use crate::error::ParseFailure;

const TRILLION: f64 = 1_000_000_000_000.0;
const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

/// Parses listing-page numeric text such as `"$1,234.5M"`, `"-0.42%"` or
/// `"$2.1T"` into a plain number.
///
/// `$`, `,` and `%` are stripped. A magnitude marker is looked up in the order
/// `T`, `B`, `M`; only the first one found applies, and all of its occurrences
/// are removed before parsing. Decimal separator is always `.`.
pub fn normalize(text: Option<&str>) -> Result<f64, ParseFailure> {
    let text = text.ok_or(ParseFailure::Missing)?;

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%'))
        .collect();
    let cleaned = cleaned.trim();

    let (digits, multiplier) = if cleaned.contains('T') {
        (cleaned.replace('T', ""), TRILLION)
    } else if cleaned.contains('B') {
        (cleaned.replace('B', ""), BILLION)
    } else if cleaned.contains('M') {
        (cleaned.replace('M', ""), MILLION)
    } else {
        (cleaned.to_string(), 1.0)
    };

    let digits = digits.trim();
    if digits.is_empty() {
        return Err(ParseFailure::Invalid(text.to_string()));
    }

    match digits.parse::<f64>().map(|v| v * multiplier) {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseFailure::Invalid(text.to_string())),
    }
}

/// [`normalize`] with failures collapsed to `None`, logging the reason.
pub fn normalize_cell(column: usize, text: Option<&str>) -> Option<f64> {
    match normalize(text) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::debug!(column, error = %err, "cell not parseable; recording null");
            None
        }
    }
}
