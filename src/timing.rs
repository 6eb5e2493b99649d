//! TTML time expressions and the latest end time of a document.
//!
//! All values are milliseconds.

use crate::document::{DocumentQuery, ElementMatch, ElementPattern};
use crate::error::{Result, TtmlError};

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// Local name of the elements that carry subtitle timing
pub const TIMED_ELEMENT: &str = "p";

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

/// Fraction digits beyond this cannot change a whole-millisecond result
const MAX_FRACTION_DIGITS: usize = 9;

/// Parse a time expression into milliseconds.
///
/// Accepts clock time `[-]HH:MM:SS[.fff]` (a `:` before the fraction is read
/// as a decimal point) and offset time `<number>(h|m|s|ms)`. Fractions of a
/// millisecond are truncated.
pub fn parse_time_expression(expr: &str) -> Result<i64> {
    let expr = expr.trim();

    if let Some(caps) = regex!(r"^(-?)(\d{2}):(\d{2}):(\d{2})(?:[.:](\d{1,3}))?$").captures(expr)
    {
        let hours: i64 = caps[2].parse().map_err(|_| malformed(expr))?;
        let minutes: i64 = caps[3].parse().map_err(|_| malformed(expr))?;
        let seconds: i64 = caps[4].parse().map_err(|_| malformed(expr))?;
        let millis = match caps.get(5) {
            Some(m) => fraction_to_units(m.as_str(), MS_PER_SECOND).ok_or_else(|| malformed(expr))?,
            None => 0,
        };
        let ms = hours * MS_PER_HOUR + minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis;
        return Ok(if &caps[1] == "-" { -ms } else { ms });
    }

    if let Some(caps) = regex!(r"^(\d+)(?:\.(\d+))?(h|ms|m|s)$").captures(expr) {
        let unit = match &caps[3] {
            "h" => MS_PER_HOUR,
            "m" => MS_PER_MINUTE,
            "s" => MS_PER_SECOND,
            _ => 1,
        };
        let whole: i64 = caps[1].parse().map_err(|_| malformed(expr))?;
        let fraction = match caps.get(2) {
            Some(m) => fraction_to_units(m.as_str(), unit).ok_or_else(|| malformed(expr))?,
            None => 0,
        };
        return whole
            .checked_mul(unit)
            .and_then(|ms| ms.checked_add(fraction))
            .ok_or_else(|| malformed(expr));
    }

    Err(malformed(expr))
}

/// `0.<digits>` of `unit`, truncated to a whole number.
fn fraction_to_units(digits: &str, unit: i64) -> Option<i64> {
    let digits = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
    let numerator: i64 = digits.parse().ok()?;
    let denominator = 10i64.checked_pow(digits.len() as u32)?;
    numerator.checked_mul(unit).map(|v| v / denominator)
}

fn malformed(expr: &str) -> TtmlError {
    TtmlError::MalformedTimestamp(format!("cannot read '{}' as a time expression", expr))
}

/// Absolute end time of a timed element: its own `end` plus the `begin` of
/// every ancestor. An element without `end` ends at its ancestors' offset.
pub fn end_time(timed: &ElementMatch<'_>) -> Result<i64> {
    let mut time = 0i64;
    for ancestor in &timed.ancestors {
        if let Some(begin) = ancestor.attribute("begin") {
            time = offset(time, begin)?;
        }
    }
    if let Some(end) = timed.element.attribute("end") {
        time = offset(time, end)?;
    }
    Ok(time)
}

fn offset(time: i64, expr: &str) -> Result<i64> {
    time.checked_add(parse_time_expression(expr)?)
        .ok_or_else(|| malformed(expr))
}

/// Latest end time of any timed element in the document, 0 if there is none.
pub fn latest_timestamp<D: DocumentQuery>(document: &D) -> Result<i64> {
    let pattern = ElementPattern::LocalName(TIMED_ELEMENT.to_string());
    let mut latest = 0i64;
    for timed in document.select_elements(&pattern)? {
        latest = latest.max(end_time(&timed)?);
    }
    Ok(latest)
}
