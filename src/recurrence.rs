//! Recurring-series date expansion.
//!
//! A `RecurrenceRule` is expanded eagerly into the concrete occurrence
//! dates of a series, walking forward from the start date one step at a
//! time. Weekly rules with explicit weekdays step weekday-aware; all
//! other frequencies step by whole interval units. Calendar arithmetic
//! clamps at month ends (Jan 31 + 1 month = Feb 28), so a monthly rule
//! pinned to day 31 only fires in months that have one.

use jiff::Span;
use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InterveneError, Result};

/// Hard ceiling on both occurrences and expansion steps. Acts as the
/// loop-termination guard for rules whose constraints never match.
pub const MAX_OCCURRENCES: usize = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = InterveneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(InterveneError::InvalidRecurrenceConfig(format!(
                "unknown frequency '{s}'"
            ))),
        }
    }
}

pub const VALID_FREQUENCIES: &[&str] = &["daily", "weekly", "monthly", "yearly"];

/// How a series repeats. `count` and `end_date` are mutually exclusive
/// termination conditions; with neither, expansion runs to the ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,

    /// Repeat every N units of `frequency`. Must be positive.
    pub interval: i32,

    /// Weekday filter (0 = Sunday .. 6 = Saturday). Weekly rules only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,

    /// Day-of-month filter (1-31). Monthly rules only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<i8>,

    /// Month filter (1-12). Yearly rules only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_of_year: Option<i8>,

    /// Stop after this many occurrences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// Stop once a candidate date passes this point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime>,
}

impl RecurrenceRule {
    /// Check the rule for contradictions and out-of-range fields.
    ///
    /// All problems are reported at once; nothing is expanded (and no
    /// ticket created) while any remain.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.interval < 1 {
            problems.push("interval must be greater than 0".to_string());
        }

        if let Some(count) = self.count {
            if count < 1 {
                problems.push("occurrence count must be greater than 0".to_string());
            }
            if count > MAX_OCCURRENCES {
                problems.push(format!("occurrence count cannot exceed {MAX_OCCURRENCES}"));
            }
        }

        if self.count.is_some() && self.end_date.is_some() {
            problems.push(
                "choose either an end date or an occurrence count, not both".to_string(),
            );
        }

        if self.frequency == Frequency::Weekly
            && let Some(days) = &self.days_of_week
        {
            if days.is_empty() {
                problems.push("at least one weekday must be selected".to_string());
            }
            if days.iter().any(|d| *d > 6) {
                problems.push("weekdays must be between 0 and 6".to_string());
            }
        }

        if self.frequency == Frequency::Monthly
            && let Some(day) = self.day_of_month
            && !(1..=31).contains(&day)
        {
            problems.push("day of month must be between 1 and 31".to_string());
        }

        if self.frequency == Frequency::Yearly
            && let Some(month) = self.month_of_year
            && !(1..=12).contains(&month)
        {
            problems.push("month of year must be between 1 and 12".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(InterveneError::InvalidRecurrenceConfig(problems.join("; ")))
        }
    }

    /// Human summary of the rule, e.g. "Every 2 weeks (Mon, Wed, Fri)".
    pub fn describe(&self) -> String {
        let mut description = match self.frequency {
            Frequency::Daily if self.interval == 1 => "Every day".to_string(),
            Frequency::Daily => format!("Every {} days", self.interval),
            Frequency::Weekly if self.interval == 1 => "Every week".to_string(),
            Frequency::Weekly => format!("Every {} weeks", self.interval),
            Frequency::Monthly if self.interval == 1 => "Every month".to_string(),
            Frequency::Monthly => format!("Every {} months", self.interval),
            Frequency::Yearly if self.interval == 1 => "Every year".to_string(),
            Frequency::Yearly => format!("Every {} years", self.interval),
        };

        if self.frequency == Frequency::Weekly
            && let Some(days) = &self.days_of_week
            && !days.is_empty()
        {
            const DAY_NAMES: &[&str] = &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
            let names: Vec<&str> = days
                .iter()
                .filter(|d| **d <= 6)
                .map(|d| DAY_NAMES[*d as usize])
                .collect();
            description.push_str(&format!(" ({})", names.join(", ")));
        }

        if self.frequency == Frequency::Monthly
            && let Some(day) = self.day_of_month
        {
            description.push_str(&format!(" on day {day}"));
        }

        if let Some(count) = self.count {
            description.push_str(&format!(" ({count} occurrences)"));
        } else if let Some(end) = self.end_date {
            description.push_str(&format!(" until {}", end.date()));
        }

        description
    }
}

/// Expand a rule into the ordered occurrence dates of the series.
///
/// Each occurrence keeps the start's time-of-day. The result is finite:
/// at most [`MAX_OCCURRENCES`] dates, and at most that many forward
/// steps even when the rule's filters never match. An empty result is
/// valid and means the series would contain no tickets.
pub fn expand(start: DateTime, rule: &RecurrenceRule) -> Result<Vec<DateTime>> {
    rule.validate()?;

    let mut dates = Vec::new();
    let mut current = start;

    for _ in 0..MAX_OCCURRENCES {
        if let Some(end) = rule.end_date
            && current > end
        {
            break;
        }

        if includes(current, rule) {
            dates.push(current);
            if rule.count.is_some_and(|count| dates.len() >= count) {
                break;
            }
            if dates.len() >= MAX_OCCURRENCES {
                break;
            }
        }

        let next = next_occurrence(current, rule)?;
        if next <= current {
            break;
        }
        current = next;
    }

    Ok(dates)
}

/// Whether a stepped candidate satisfies the rule's filters.
fn includes(date: DateTime, rule: &RecurrenceRule) -> bool {
    match rule.frequency {
        Frequency::Weekly => match &rule.days_of_week {
            Some(days) if !days.is_empty() => {
                let weekday = date.weekday().to_sunday_zero_offset() as u8;
                days.contains(&weekday)
            }
            _ => true,
        },
        Frequency::Monthly => match rule.day_of_month {
            Some(day) => date.day() == day,
            None => true,
        },
        Frequency::Yearly => match rule.month_of_year {
            Some(month) => date.month() == month,
            None => true,
        },
        Frequency::Daily => true,
    }
}

/// Step from `current` to the next candidate date.
fn next_occurrence(current: DateTime, rule: &RecurrenceRule) -> Result<DateTime> {
    let interval = rule.interval as i64;
    let next = match rule.frequency {
        Frequency::Daily => current.checked_add(Span::new().days(interval))?,
        Frequency::Weekly => match &rule.days_of_week {
            Some(days) if !days.is_empty() => {
                return next_weekday_occurrence(current, days, interval);
            }
            _ => current.checked_add(Span::new().weeks(interval))?,
        },
        Frequency::Monthly => current.checked_add(Span::new().months(interval))?,
        Frequency::Yearly => current.checked_add(Span::new().years(interval))?,
    };
    Ok(next)
}

/// Weekday-aware step for weekly rules with an explicit weekday set:
/// advance to the next listed weekday within the current week, or jump
/// `interval` weeks ahead of the current date and take the earliest
/// listed weekday. The jump is taken from the current date, not the
/// series anchor, so long intervals tolerate cadence drift.
fn next_weekday_occurrence(current: DateTime, days: &[u8], interval: i64) -> Result<DateTime> {
    let current_day = current.weekday().to_sunday_zero_offset() as u8;
    let mut sorted: Vec<u8> = days.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    if let Some(next_day) = sorted.iter().copied().find(|day| *day > current_day) {
        set_weekday(current, next_day)
    } else {
        let next_week = current.checked_add(Span::new().weeks(interval))?;
        set_weekday(next_week, sorted[0])
    }
}

/// Move `date` to the given weekday within its Sunday-started week.
fn set_weekday(date: DateTime, target: u8) -> Result<DateTime> {
    let delta = target as i64 - date.weekday().to_sunday_zero_offset() as i64;
    Ok(date.checked_add(Span::new().days(delta))?)
}

/// Fresh identifier shared by every ticket of a recurring series.
pub fn new_group_id() -> String {
    format!("rec-{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn rule(frequency: Frequency) -> RecurrenceRule {
        RecurrenceRule {
            frequency,
            interval: 1,
            days_of_week: None,
            day_of_month: None,
            month_of_year: None,
            count: None,
            end_date: None,
        }
    }

    #[test]
    fn test_daily_count_is_exact() {
        let start = date(2025, 1, 15).at(9, 0, 0, 0);
        let mut r = rule(Frequency::Daily);
        r.count = Some(10);

        let dates = expand(start, &r).unwrap();
        assert_eq!(dates.len(), 10);
        assert_eq!(dates[0], start);
        assert_eq!(dates[9], date(2025, 1, 24).at(9, 0, 0, 0));
    }

    #[test]
    fn test_daily_interval_steps() {
        let start = date(2025, 1, 1).at(8, 30, 0, 0);
        let mut r = rule(Frequency::Daily);
        r.interval = 3;
        r.count = Some(4);

        let dates = expand(start, &r).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2025, 1, 1).at(8, 30, 0, 0),
                date(2025, 1, 4).at(8, 30, 0, 0),
                date(2025, 1, 7).at(8, 30, 0, 0),
                date(2025, 1, 10).at(8, 30, 0, 0),
            ]
        );
    }

    #[test]
    fn test_unbounded_rule_hits_ceiling() {
        let start = date(2025, 1, 1).at(9, 0, 0, 0);
        let dates = expand(start, &rule(Frequency::Daily)).unwrap();
        assert_eq!(dates.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn test_weekly_weekdays_from_monday() {
        // 2025-01-06 is a Monday.
        let start = date(2025, 1, 6).at(10, 0, 0, 0);
        let mut r = rule(Frequency::Weekly);
        r.days_of_week = Some(vec![1, 3, 5]);
        r.count = Some(6);

        let dates = expand(start, &r).unwrap();
        // Mon/Wed/Fri of the same week, in order, then the next week.
        assert_eq!(dates[0], date(2025, 1, 6).at(10, 0, 0, 0));
        assert_eq!(dates[1], date(2025, 1, 8).at(10, 0, 0, 0));
        assert_eq!(dates[2], date(2025, 1, 10).at(10, 0, 0, 0));
        assert_eq!(dates[3], date(2025, 1, 13).at(10, 0, 0, 0));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_weekly_weekdays_from_unlisted_day() {
        // 2025-01-05 is a Sunday; the rule only fires Mon/Wed/Fri.
        let start = date(2025, 1, 5).at(14, 0, 0, 0);
        let mut r = rule(Frequency::Weekly);
        r.days_of_week = Some(vec![1, 3, 5]);
        r.count = Some(2);

        let dates = expand(start, &r).unwrap();
        assert_eq!(dates[0], date(2025, 1, 6).at(14, 0, 0, 0));
        assert_eq!(dates[1], date(2025, 1, 8).at(14, 0, 0, 0));
    }

    #[test]
    fn test_monthly_pinned_day() {
        let start = date(2025, 1, 15).at(7, 0, 0, 0);
        let mut r = rule(Frequency::Monthly);
        r.day_of_month = Some(15);
        r.count = Some(3);

        let dates = expand(start, &r).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2025, 1, 15).at(7, 0, 0, 0),
                date(2025, 2, 15).at(7, 0, 0, 0),
                date(2025, 3, 15).at(7, 0, 0, 0),
            ]
        );
    }

    #[test]
    fn test_monthly_day_31_clamps_and_drifts_out() {
        // Stepping clamps Jan 31 to Feb 28 and the day never recovers,
        // so only the first occurrence matches the pin.
        let start = date(2025, 1, 31).at(9, 0, 0, 0);
        let mut r = rule(Frequency::Monthly);
        r.day_of_month = Some(31);

        let dates = expand(start, &r).unwrap();
        assert_eq!(dates, vec![date(2025, 1, 31).at(9, 0, 0, 0)]);
    }

    #[test]
    fn test_yearly_month_filter() {
        let start = date(2025, 6, 10).at(9, 0, 0, 0);
        let mut r = rule(Frequency::Yearly);
        r.month_of_year = Some(6);
        r.count = Some(3);

        let dates = expand(start, &r).unwrap();
        assert_eq!(dates[0].year(), 2025);
        assert_eq!(dates[1].year(), 2026);
        assert_eq!(dates[2].year(), 2027);
        assert!(dates.iter().all(|d| d.month() == 6 && d.day() == 10));
    }

    #[test]
    fn test_yearly_month_never_matching_yields_empty() {
        // Yearly steps always land in July, the filter wants June.
        let start = date(2025, 7, 1).at(9, 0, 0, 0);
        let mut r = rule(Frequency::Yearly);
        r.month_of_year = Some(6);

        let dates = expand(start, &r).unwrap();
        assert!(dates.is_empty());
    }

    #[test]
    fn test_end_date_excludes_overshoot() {
        let start = date(2025, 1, 1).at(9, 0, 0, 0);
        let mut r = rule(Frequency::Daily);
        r.end_date = Some(date(2025, 1, 5).at(23, 59, 0, 0));

        let dates = expand(start, &r).unwrap();
        assert_eq!(dates.len(), 5);
        assert_eq!(*dates.last().unwrap(), date(2025, 1, 5).at(9, 0, 0, 0));
    }

    #[test]
    fn test_count_and_end_date_are_mutually_exclusive() {
        let mut r = rule(Frequency::Daily);
        r.count = Some(5);
        r.end_date = Some(date(2025, 2, 1).at(0, 0, 0, 0));

        let err = expand(date(2025, 1, 1).at(9, 0, 0, 0), &r).unwrap_err();
        assert!(matches!(err, InterveneError::InvalidRecurrenceConfig(_)));
    }

    #[test]
    fn test_validation_rejects_bad_fields() {
        let mut r = rule(Frequency::Daily);
        r.interval = 0;
        assert!(r.validate().is_err());

        let mut r = rule(Frequency::Weekly);
        r.days_of_week = Some(vec![]);
        assert!(r.validate().is_err());

        let mut r = rule(Frequency::Weekly);
        r.days_of_week = Some(vec![7]);
        assert!(r.validate().is_err());

        let mut r = rule(Frequency::Monthly);
        r.day_of_month = Some(32);
        assert!(r.validate().is_err());

        let mut r = rule(Frequency::Yearly);
        r.month_of_year = Some(13);
        assert!(r.validate().is_err());

        let mut r = rule(Frequency::Daily);
        r.count = Some(0);
        assert!(r.validate().is_err());

        let mut r = rule(Frequency::Daily);
        r.count = Some(MAX_OCCURRENCES + 1);
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_validation_reports_all_problems_at_once() {
        let r = RecurrenceRule {
            frequency: Frequency::Weekly,
            interval: 0,
            days_of_week: Some(vec![9]),
            day_of_month: None,
            month_of_year: None,
            count: Some(400),
            end_date: None,
        };
        let err = r.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("interval"));
        assert!(message.contains("weekdays"));
        assert!(message.contains("365"));
    }

    #[test]
    fn test_time_of_day_is_preserved() {
        let start = date(2025, 3, 1).at(16, 45, 0, 0);
        let mut r = rule(Frequency::Monthly);
        r.count = Some(4);

        let dates = expand(start, &r).unwrap();
        assert!(dates.iter().all(|d| d.hour() == 16 && d.minute() == 45));
    }

    #[test]
    fn test_describe() {
        let mut r = rule(Frequency::Weekly);
        r.interval = 2;
        r.days_of_week = Some(vec![1, 3]);
        r.count = Some(8);
        assert_eq!(r.describe(), "Every 2 weeks (Mon, Wed) (8 occurrences)");

        let mut r = rule(Frequency::Monthly);
        r.day_of_month = Some(5);
        r.end_date = Some(date(2025, 12, 31).at(0, 0, 0, 0));
        assert_eq!(r.describe(), "Every month on day 5 until 2025-12-31");

        assert_eq!(rule(Frequency::Daily).describe(), "Every day");
    }

    #[test]
    fn test_group_ids_are_unique() {
        let a = new_group_id();
        let b = new_group_id();
        assert!(a.starts_with("rec-"));
        assert_ne!(a, b);
    }
}
