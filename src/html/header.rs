use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use regex::{Captures, Regex};

use crate::error::Error;

/// `Tuesday, December 26, 2023, 2:21 PM`
pub const PRIMARY_FORMAT: &str = "%A, %B %d, %Y, %I:%M %p";
/// `Dienstag, 26. Dezember 2023, 14:21` once names are translated to English.
pub const FALLBACK_FORMAT: &str = "%A, %d. %B %Y, %H:%M";

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}+").expect("static word pattern"));

fn german_to_english(word: &str) -> Option<&'static str> {
    Some(match word {
        "Montag" => "Monday",
        "Dienstag" => "Tuesday",
        "Mittwoch" => "Wednesday",
        "Donnerstag" => "Thursday",
        "Freitag" => "Friday",
        "Samstag" | "Sonnabend" => "Saturday",
        "Sonntag" => "Sunday",
        "Januar" | "Jänner" => "January",
        "Februar" => "February",
        "März" => "March",
        "April" => "April",
        "Mai" => "May",
        "Juni" => "June",
        "Juli" => "July",
        "August" => "August",
        "September" => "September",
        "Oktober" => "October",
        "November" => "November",
        "Dezember" => "December",
        _ => return None,
    })
}

fn parse_fallback(input: &str) -> Option<NaiveDateTime> {
    let translated = WORD.replace_all(input, |caps: &Captures| {
        german_to_english(&caps[0]).map_or_else(|| caps[0].to_string(), str::to_string)
    });
    NaiveDateTime::parse_from_str(&translated, FALLBACK_FORMAT).ok()
}

/// Parse the header's `"<date>, <time>"` in the page's fixed zone into epoch millis.
///
/// The English convention is tried first, then the German one.
pub fn parse_header_timestamp(date: &str, time: &str, utc_offset_minutes: i32) -> Result<i64, Error> {
    let input = format!("{date}, {time}");
    let naive = match NaiveDateTime::parse_from_str(&input, PRIMARY_FORMAT) {
        Ok(naive) => naive,
        Err(e) => {
            log::debug!("Header date {input:?} not in primary format ({e}), trying fallback");
            parse_fallback(&input).ok_or_else(|| Error::DateParse { input: input.clone() })?
        }
    };
    let zone = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| Error::DateParse {
        input: format!("{input} (offset {utc_offset_minutes} min)"),
    })?;
    zone.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp_millis())
        .ok_or(Error::DateParse { input })
}

/// Page metadata timestamps, e.g. `2023-12-26T14:21:09.000Z`.
pub fn parse_iso_millis(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_header() {
        // 14:21 at UTC-1 is 15:21Z.
        let ms = parse_header_timestamp("Tuesday, December 26, 2023", "2:21 PM", -60).unwrap();
        assert_eq!(ms, parse_iso_millis("2023-12-26T15:21:00Z").unwrap());
    }

    #[test]
    fn german_header_via_fallback() {
        let ms = parse_header_timestamp("Dienstag, 26. Dezember 2023", "14:21", 0).unwrap();
        assert_eq!(ms, parse_iso_millis("2023-12-26T14:21:00Z").unwrap());
        let ms = parse_header_timestamp("Mittwoch, 1. März 2023", "09:05", 60).unwrap();
        assert_eq!(ms, parse_iso_millis("2023-03-01T08:05:00Z").unwrap());
    }

    #[test]
    fn garbage_is_a_date_error() {
        assert!(matches!(
            parse_header_timestamp("yesterday", "noonish", 0),
            Err(Error::DateParse { .. })
        ));
    }

    #[test]
    fn iso_metadata() {
        assert_eq!(parse_iso_millis("1970-01-01T00:00:01.500Z"), Some(1500));
        assert_eq!(parse_iso_millis(""), None);
    }
}
