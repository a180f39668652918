//! Spanish date rendering and lenient date parsing for contract records.

use chrono::{Datelike, NaiveDate};

use crate::numerals::{apocopated_words, number_to_words};

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Spanish month name for a date, lower case.
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// `15 de marzo de 2024`.
pub fn format_date_long(date: NaiveDate) -> String {
    format!("{} de {} de {}", date.day(), month_name(date), date.year())
}

/// `15/03/2024`.
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Signature-clause date: `a los quince (15) días del mes de marzo de dos mil
/// veinticuatro (2024)`.
pub fn date_in_words(date: NaiveDate) -> String {
    let day = date.day();
    let year = date.year();
    let year_words = number_to_words(u64::from(year.unsigned_abs()));
    let month = month_name(date);
    if day == 1 {
        format!("al primer (1) día del mes de {month} de {year_words} ({year})")
    } else {
        format!(
            "a los {} ({day}) días del mes de {month} de {year_words} ({year})",
            apocopated_words(u64::from(day))
        )
    }
}

/// Inclusive number of calendar days from `start` to `end`; zero when `end`
/// precedes `start`.
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        0
    } else {
        (end - start).num_days() + 1
    }
}

/// Parse the date encodings the contract endpoints are known to emit.
///
/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY`, and any timestamp that starts with a
/// `YYYY-MM-DD` prefix (RFC 3339, `YYYY-MM-DD HH:MM:SS`). The calendar date
/// as written is kept; no timezone conversion is applied.
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Some(date);
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn long_and_short_forms() {
        assert_eq!(format_date_long(date(2024, 3, 15)), "15 de marzo de 2024");
        assert_eq!(format_date_long(date(2025, 12, 1)), "1 de diciembre de 2025");
        assert_eq!(format_date_short(date(2024, 3, 5)), "05/03/2024");
    }

    #[test]
    fn signature_date_in_words() {
        assert_eq!(
            date_in_words(date(2024, 3, 15)),
            "a los quince (15) días del mes de marzo de dos mil veinticuatro (2024)"
        );
        assert_eq!(
            date_in_words(date(2024, 1, 1)),
            "al primer (1) día del mes de enero de dos mil veinticuatro (2024)"
        );
        assert_eq!(
            date_in_words(date(2023, 7, 21)),
            "a los veintiún (21) días del mes de julio de dos mil veintitrés (2023)"
        );
    }

    #[test]
    fn inclusive_duration() {
        assert_eq!(duration_days(date(2024, 1, 1), date(2024, 1, 1)), 1);
        assert_eq!(duration_days(date(2024, 1, 1), date(2024, 12, 31)), 366);
        assert_eq!(duration_days(date(2024, 2, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn lenient_parsing() {
        assert_eq!(parse_date_lenient("2024-01-31"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_lenient(" 31/01/2024 "), Some(date(2024, 1, 31)));
        assert_eq!(
            parse_date_lenient("2024-01-31T23:30:00-05:00"),
            Some(date(2024, 1, 31))
        );
        assert_eq!(
            parse_date_lenient("2024-01-31 08:00:00"),
            Some(date(2024, 1, 31))
        );
        assert_eq!(parse_date_lenient(""), None);
        assert_eq!(parse_date_lenient("mañana"), None);
        assert_eq!(parse_date_lenient("2024-13-01"), None);
    }
}
