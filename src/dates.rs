//! Natural-language date resolution for the booking form.
//!
//! Understands a deliberately small phrase set: "today", "tomorrow" and
//! "next ... monday". Other weekdays ("next friday") are not resolved;
//! they surface as [`DateError::Unrecognized`] and the form reports them
//! as a validation failure rather than guessing.

use chrono::{Datelike, Duration, Local, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Error parsing date. Please specify a clear date.")]
    Unrecognized,
}

/// Resolve `phrase` against the current local date.
pub fn resolve(phrase: &str) -> Result<NaiveDate, DateError> {
    resolve_on(phrase, Local::now().date_naive())
}

/// Resolve `phrase` against an explicit `today`. Precedence: "next" +
/// "monday" first, then "tomorrow", then "today".
pub fn resolve_on(phrase: &str, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let lowered = phrase.to_lowercase();
    if lowered.contains("next") {
        if lowered.contains("monday") {
            // Strictly future: asked on a Monday, roll a full week ahead.
            let mut days_ahead = (7 - today.weekday().num_days_from_monday() as i64) % 7;
            if days_ahead == 0 {
                days_ahead = 7;
            }
            return Ok(today + Duration::days(days_ahead));
        }
        Err(DateError::Unrecognized)
    } else if lowered.contains("tomorrow") {
        Ok(today + Duration::days(1))
    } else if lowered.contains("today") {
        Ok(today)
    } else {
        Err(DateError::Unrecognized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    // 2024-01-10 is a Wednesday.
    fn wednesday() -> NaiveDate {
        let d = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(d.weekday(), Weekday::Wed);
        d
    }

    #[test]
    fn test_today_resolves_to_today() {
        assert_eq!(resolve_on("today works", wednesday()), Ok(wednesday()));
    }

    #[test]
    fn test_tomorrow_resolves_to_next_day() {
        let thursday = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        assert_eq!(resolve_on("Tomorrow, ideally", wednesday()), Ok(thursday));
    }

    #[test]
    fn test_next_monday_from_wednesday() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert_eq!(resolve_on("next Monday", wednesday()), Ok(monday));
    }

    #[test]
    fn test_next_monday_on_a_monday_rolls_a_full_week() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert_eq!(
            resolve_on("next monday", monday),
            Ok(monday + Duration::days(7))
        );
    }

    #[test]
    fn test_other_next_weekdays_are_unrecognized() {
        assert_eq!(
            resolve_on("next friday", wednesday()),
            Err(DateError::Unrecognized)
        );
        assert_eq!(
            resolve_on("next next week", wednesday()),
            Err(DateError::Unrecognized)
        );
    }

    #[test]
    fn test_gibberish_is_unrecognized() {
        assert_eq!(
            resolve_on("whenever suits", wednesday()),
            Err(DateError::Unrecognized)
        );
        assert_eq!(resolve_on("", wednesday()), Err(DateError::Unrecognized));
    }

    #[test]
    fn test_next_takes_precedence_over_tomorrow() {
        // "next" is checked first, so a phrase containing both "next" and
        // "tomorrow" but no "monday" fails rather than resolving tomorrow.
        assert_eq!(
            resolve_on("next week or tomorrow", wednesday()),
            Err(DateError::Unrecognized)
        );
    }
}
