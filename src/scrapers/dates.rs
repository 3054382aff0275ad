use chrono::NaiveDate;

/// Arabic month name to calendar month number.
const ARABIC_MONTHS: [(&str, &str); 12] = [
    ("يناير", "1"),
    ("فبراير", "2"),
    ("مارس", "3"),
    ("أبريل", "4"),
    ("مايو", "5"),
    ("يونيو", "6"),
    ("يوليو", "7"),
    ("أغسطس", "8"),
    ("سبتمبر", "9"),
    ("أكتوبر", "10"),
    ("نوفمبر", "11"),
    ("ديسمبر", "12"),
];

fn month_number(token: &str) -> Option<&'static str> {
    ARABIC_MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, number)| *number)
}

/// Parses a localized `day month year` string such as `"15 يناير 2020"`.
///
/// Month tokens are translated through the fixed table, everything else is
/// passed through untouched. An unknown month token or a malformed shape
/// yields `None`, never a panic.
pub fn parse_arabic_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw
        .split_whitespace()
        .map(|token| month_number(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join("-");

    NaiveDate::parse_from_str(&normalized, "%d-%m-%Y").ok()
}
