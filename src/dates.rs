//! Date helpers shared by every source adapter.
//!
//! - [`resolve_date`]: the "next occurrence" rule used when a request omits the year.
//! - [`month_span`]: first..last day of a month.
//! - [`CardDate`]: the three date encodings found on day cards.

use chrono::{Datelike, Month, NaiveDate};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::error::SourceError;

/// Resolve `(day, month, year?)` to a concrete date.
///
/// With an explicit year the date is taken as-is. Without one, the next
/// occurrence on or after `today` is used: if the day already passed this year,
/// it rolls forward to next year. Feb 29 rolls forward to the next leap year.
pub fn resolve_date(
    day: u32,
    month: u32,
    year: Option<i32>,
    today: NaiveDate,
) -> Result<NaiveDate, SourceError> {
    let invalid = || SourceError::InvalidDate { day, month, year };

    if let Some(y) = year {
        return NaiveDate::from_ymd_opt(y, month, day).ok_or_else(invalid);
    }

    // Validate against a leap year so Feb 29 is accepted here.
    NaiveDate::from_ymd_opt(2000, month, day).ok_or_else(invalid)?;

    // Leap years are at most 8 years apart (e.g. 1896 -> 1904).
    (today.year()..=today.year() + 8)
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .find(|d| *d >= today)
        .ok_or_else(invalid)
}

/// First and last day of `month` in `year`. The last day is the first of the
/// following month minus one day.
pub fn month_span(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Date encodings used on day cards, told apart before any parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardDate {
    /// `"Thu Sep 15th, 2022 - Sat Oct 15th, 2022"`
    Range(NaiveDate, NaiveDate),
    /// `"September, 2022"`: the whole month.
    MonthOnly { year: i32, month: u32 },
    /// `"Tue Sep 20th, 2022"`
    Single(NaiveDate),
}

impl CardDate {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("empty date".into());
        }

        if let Some((start, end)) = split_range(raw) {
            return Ok(CardDate::Range(parse_full_date(start)?, parse_full_date(end)?));
        }

        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() == 2 {
            let month = parse_month(tokens[0].trim_end_matches(','))?;
            let year: i32 = tokens[1]
                .parse()
                .map_err(|_| format!("bad year in `{raw}`"))?;
            return Ok(CardDate::MonthOnly { year, month });
        }

        Ok(CardDate::Single(parse_full_date(raw)?))
    }

    /// Normalized `(date, end_date)`.
    pub fn bounds(self) -> Result<(NaiveDate, NaiveDate), String> {
        match self {
            CardDate::Range(start, end) => Ok((start, end)),
            CardDate::MonthOnly { year, month } => month_span(year, month)
                .ok_or_else(|| format!("month {month} of {year} out of range")),
            CardDate::Single(d) => Ok((d, d)),
        }
    }
}

fn split_range(raw: &str) -> Option<(&str, &str)> {
    // En/em dashes show up once entities are decoded.
    for sep in [" - ", " \u{2013} ", " \u{2014} ", "-", "\u{2013}", "\u{2014}"] {
        if let Some((a, b)) = raw.split_once(sep) {
            return Some((a.trim(), b.trim()));
        }
    }
    None
}

fn parse_month(s: &str) -> Result<u32, String> {
    s.trim()
        .trim_end_matches('.')
        .parse::<Month>()
        .map(|m| m.number_from_month())
        .map_err(|_| format!("unknown month `{s}`"))
}

/// `[Weekday] Month Day[st|nd|rd|th][,] Year`, month full or abbreviated.
fn parse_full_date(s: &str) -> Result<NaiveDate, String> {
    static RE_DATE: OnceCell<Regex> = OnceCell::new();
    let re = RE_DATE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:[a-z]+\.?,?\s+)?([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{1,4})$",
        )
        .unwrap()
    });

    let s = s.trim();
    let caps = re
        .captures(s)
        .ok_or_else(|| format!("unrecognized date `{s}`"))?;
    let month = parse_month(&caps[1])?;
    let day: u32 = caps[2].parse().map_err(|_| format!("bad day in `{s}`"))?;
    let year: i32 = caps[3].parse().map_err(|_| format!("bad year in `{s}`"))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| format!("no such date `{s}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn explicit_year_is_kept() {
        assert_eq!(
            resolve_date(2, 8, Some(1990), d(2024, 8, 10)).unwrap(),
            d(1990, 8, 2)
        );
    }

    #[test]
    fn past_day_rolls_to_next_year() {
        assert_eq!(
            resolve_date(2, 8, None, d(2024, 8, 10)).unwrap(),
            d(2025, 8, 2)
        );
    }

    #[test]
    fn today_and_upcoming_stay_in_this_year() {
        assert_eq!(
            resolve_date(10, 8, None, d(2024, 8, 10)).unwrap(),
            d(2024, 8, 10)
        );
        assert_eq!(
            resolve_date(1, 12, None, d(2024, 8, 10)).unwrap(),
            d(2024, 12, 1)
        );
    }

    #[test]
    fn leap_day_without_year_finds_next_leap_year() {
        assert_eq!(
            resolve_date(29, 2, None, d(2025, 3, 1)).unwrap(),
            d(2028, 2, 29)
        );
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(matches!(
            resolve_date(31, 4, None, d(2024, 1, 1)),
            Err(SourceError::InvalidDate { .. })
        ));
        assert!(resolve_date(29, 2, Some(2023), d(2024, 1, 1)).is_err());
        assert!(resolve_date(1, 13, None, d(2024, 1, 1)).is_err());
    }

    #[test]
    fn month_span_handles_december_and_february() {
        assert_eq!(month_span(2022, 9), Some((d(2022, 9, 1), d(2022, 9, 30))));
        assert_eq!(month_span(2022, 12), Some((d(2022, 12, 1), d(2022, 12, 31))));
        assert_eq!(month_span(2024, 2), Some((d(2024, 2, 1), d(2024, 2, 29))));
    }

    #[test]
    fn card_month_only() {
        let cd = CardDate::parse("September, 2022").unwrap();
        assert_eq!(cd, CardDate::MonthOnly { year: 2022, month: 9 });
        assert_eq!(cd.bounds().unwrap(), (d(2022, 9, 1), d(2022, 9, 30)));
    }

    #[test]
    fn card_range() {
        let cd = CardDate::parse("Thu Sep 15th, 2022 - Sat Oct 15th, 2022").unwrap();
        assert_eq!(cd.bounds().unwrap(), (d(2022, 9, 15), d(2022, 10, 15)));
    }

    #[test]
    fn card_single_variants() {
        for raw in [
            "Tue Sep 20th, 2022",
            "Sep 20, 2022",
            "Tuesday September 20th, 2022",
            "  Tue Sep 20th 2022 ",
        ] {
            assert_eq!(
                CardDate::parse(raw).unwrap(),
                CardDate::Single(d(2022, 9, 20)),
                "{raw}"
            );
        }
        assert_eq!(
            CardDate::parse("Wed Aug 2nd, 2023").unwrap(),
            CardDate::Single(d(2023, 8, 2))
        );
    }

    #[test]
    fn card_garbage_is_an_error() {
        assert!(CardDate::parse("").is_err());
        assert!(CardDate::parse("soon").is_err());
        assert!(CardDate::parse("Smarch, 2022").is_err());
        assert!(CardDate::parse("Feb 30th, 2022").is_err());
    }
}
