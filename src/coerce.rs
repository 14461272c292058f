use crate::schema::Cell;
use chrono::NaiveDate;

/// Best-effort numeric coercion matching the sheet's loose formatting.
///
/// Null and booleans yield 0, non-finite numbers yield 0, and text is
/// stripped to `[0-9.-]` before parsing so locale-formatted amounts like
/// "1,234.50 THB" become 1234.50. Text with multiple embedded signs or
/// periods is parser-dependent and not corrected.
pub fn to_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Null | Cell::Flag(_) => 0.0,
        Cell::Number(n) => {
            if n.is_finite() {
                *n
            } else {
                0.0
            }
        }
        Cell::Text(s) => number_from_text(s),
    }
}

fn number_from_text(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Parses the sheet export's wrapped date token `Date(year, month0, day)`
/// (zero-based month, trailing time components ignored), falling back to
/// common date-string formats. Returns `None` when unparseable; callers
/// exclude such records rather than erroring.
pub fn parse_sheet_date(cell: &Cell) -> Option<NaiveDate> {
    let text = cell.as_text()?;
    if let Some(date) = parse_date_token(text) {
        return Some(date);
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text.trim(), format) {
            return Some(date);
        }
    }
    None
}

fn parse_date_token(text: &str) -> Option<NaiveDate> {
    let inner = text
        .trim()
        .strip_prefix("Date(")?
        .trim_end_matches(')');

    let mut parts = inner.split(',').map(str::trim);
    let year: i32 = parts.next()?.parse().ok()?;
    let month0: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month0 + 1, day)
}

/// Splits a comma-separated category list, trimming whitespace and dropping
/// empty tokens. Non-text input yields an empty list.
pub fn parse_categories(cell: &Cell) -> Vec<String> {
    match cell.as_text() {
        Some(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

const TRUTHY_TOKENS: &[&str] = &["true", "✔", "1", "ใช่"];

/// Boolean classification of the new-customer flag: a fixed truthy token set
/// for text, plus boolean true and numeric 1. Everything else is false.
pub fn is_truthy_flag(cell: &Cell) -> bool {
    match cell {
        Cell::Flag(b) => *b,
        Cell::Number(n) => *n == 1.0,
        Cell::Text(s) => {
            let token = s.trim().to_lowercase();
            TRUTHY_TOKENS.contains(&token.as_str())
        }
        Cell::Null => false,
    }
}

/// Presence rule for the lead-indicator field: non-null, and for text
/// non-empty after trimming, for numbers non-zero, for booleans true.
pub fn is_present(cell: &Cell) -> bool {
    match cell {
        Cell::Null => false,
        Cell::Flag(b) => *b,
        Cell::Number(n) => *n != 0.0,
        Cell::Text(s) => !s.trim().is_empty(),
    }
}

/// Renders a cell to a join-key string. Fractionless numbers format as
/// integers so a phone number typed as a numeric cell still matches its
/// text-typed counterpart.
pub fn to_key_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Cell::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() {
                Some(format!("{}", *n as i64))
            } else {
                Some(n.to_string())
            }
        }
        _ => None,
    }
}
