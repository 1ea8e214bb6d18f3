use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Source formats accepted when rewriting a date of birth into the
/// `dd MMM yyyy` display form, tried in this order.
pub const DISPLAY_DATE_PATTERNS: [&str; 7] = [
    "%d/%m/%Y", // 12/10/1958
    "%d-%m-%Y", // 12-10-1958
    "%d.%m.%Y", // 12.10.1958
    "%Y-%m-%d", // 1958-10-12
    "%Y/%m/%d", // 1958/10/12
    "%m/%d/%Y", // 10/12/1958
    "%d %m %Y", // 12 10 1958
];

static DISPLAY_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}\s+[A-Za-z]{3}\s+\d{4}").unwrap());

static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

/// Rewrites `raw` into `dd MMM yyyy` form. Values already in that shape are
/// fixed points; values no pattern recognizes pass through unchanged.
pub fn to_display_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if DISPLAY_SHAPE.is_match(trimmed) {
        return trimmed.to_string();
    }
    for pattern in DISPLAY_DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return date.format("%d %b %Y").to_string();
        }
    }
    trimmed.to_string()
}

/// Extracts the first bare 4-digit year from free text.
pub fn extract_year(raw: &str) -> Option<String> {
    BARE_YEAR
        .captures(raw)
        .map(|caps| caps[1].to_string())
}
