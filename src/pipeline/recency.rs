// src/pipeline/recency.rs

//! Posted-date recency resolution.
//!
//! The source site's date formatting is not contractually stable, so
//! parsing tries a ranked list of formats and treats an unparseable
//! date as recent. Dropping a record over a date the site reformatted
//! would lose the alert silently; an occasional stale alert is the
//! cheaper failure.

use std::sync::OnceLock;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Inclusion policy for dates no format can parse. Flip to `false`
/// for fail-closed behavior.
pub const INCLUDE_WHEN_UNPARSEABLE: bool = true;

/// Ranked date formats observed on the source site. First successful
/// parse wins.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d.%m.%Y"];

/// Matches a date-looking token inside noisy cell text.
fn date_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d{1,2}[./-]\d{1,2}[./-]\d{4}|\d{4}-\d{2}-\d{2}")
            .expect("date token pattern is valid")
    })
}

/// Resolves listing dates against the recency window.
pub struct RecencyResolver {
    /// Preferred format first, then the fixed ranked list
    formats: Vec<String>,
}

impl RecencyResolver {
    /// Create a resolver. A configured preferred format is tried
    /// before the built-in list.
    pub fn new(preferred_format: Option<&str>) -> Self {
        let mut formats: Vec<String> = Vec::with_capacity(DATE_FORMATS.len() + 1);
        if let Some(preferred) = preferred_format {
            formats.push(preferred.to_string());
        }
        formats.extend(DATE_FORMATS.iter().map(|f| f.to_string()));
        Self { formats }
    }

    /// Parse a listing date against the ranked format list.
    pub fn parse_date(&self, date_text: &str) -> Option<NaiveDate> {
        let trimmed = date_text.trim();
        let token = date_token_pattern()
            .find(trimmed)
            .map_or(trimmed, |m| m.as_str());

        self.formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
    }

    /// Whether a listing dated `date_text` falls inside the recency
    /// window, evaluated against the local clock.
    pub fn is_recent(&self, date_text: &str) -> bool {
        self.is_recent_at(date_text, Local::now().naive_local())
    }

    /// Deterministic core of [`RecencyResolver::is_recent`].
    ///
    /// Listings carry no time component, so only calendar-day
    /// granularity is available: a record is recent when its date is
    /// `now`'s calendar date or the calendar date 24 hours earlier,
    /// regardless of the configured lookback window.
    pub fn is_recent_at(&self, date_text: &str, now: NaiveDateTime) -> bool {
        match self.parse_date(date_text) {
            Some(date) => {
                let today = now.date();
                let yesterday = (now - Duration::hours(24)).date();
                date == today || date == yesterday
            }
            None => {
                log::debug!("unparseable listing date {date_text:?}, including by policy");
                INCLUDE_WHEN_UNPARSEABLE
            }
        }
    }
}

impl Default for RecencyResolver {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_every_supported_format() {
        let resolver = RecencyResolver::default();
        let expected = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();

        for text in ["01/04/2026", "01-04-2026", "2026-04-01", "01.04.2026"] {
            assert_eq!(resolver.parse_date(text), Some(expected), "format: {text}");
        }
    }

    #[test]
    fn preferred_format_is_tried_first() {
        // %m-%d-%Y would misread 03-04-2026 as March 4th without the
        // preferred slot.
        let resolver = RecencyResolver::new(Some("%m-%d-%Y"));
        assert_eq!(
            resolver.parse_date("03-04-2026"),
            NaiveDate::from_ymd_opt(2026, 3, 4)
        );
    }

    #[test]
    fn plucks_date_token_from_noisy_text() {
        let resolver = RecencyResolver::default();
        assert_eq!(
            resolver.parse_date("Posted: 01-04-2026 (new)"),
            NaiveDate::from_ymd_opt(2026, 4, 1)
        );
    }

    #[test]
    fn same_day_is_recent() {
        let resolver = RecencyResolver::default();
        assert!(resolver.is_recent_at("01-04-2026", noon(2026, 4, 1)));
    }

    #[test]
    fn previous_day_is_recent() {
        let resolver = RecencyResolver::default();
        assert!(resolver.is_recent_at("31-03-2026", noon(2026, 4, 1)));
    }

    #[test]
    fn older_dates_are_not_recent() {
        let resolver = RecencyResolver::default();
        assert!(!resolver.is_recent_at("29-03-2026", noon(2026, 4, 1)));
        assert!(!resolver.is_recent_at("01-04-2025", noon(2026, 4, 1)));
    }

    #[test]
    fn future_dates_are_not_recent() {
        let resolver = RecencyResolver::default();
        assert!(!resolver.is_recent_at("02-04-2026", noon(2026, 4, 1)));
    }

    #[test]
    fn unparseable_dates_fail_open() {
        let resolver = RecencyResolver::default();
        assert!(resolver.is_recent_at("31 March 2024", noon(2026, 4, 1)));
        assert!(resolver.is_recent_at("", noon(2026, 4, 1)));
        assert!(resolver.is_recent_at("coming soon", noon(2026, 4, 1)));
    }

    #[test]
    fn resolution_is_deterministic() {
        let resolver = RecencyResolver::default();
        let now = noon(2026, 4, 1);
        let first = resolver.is_recent_at("01-04-2026", now);
        for _ in 0..10 {
            assert_eq!(resolver.is_recent_at("01-04-2026", now), first);
        }
    }
}
