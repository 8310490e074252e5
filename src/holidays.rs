//! Public holiday calendar.
//!
//! Filing deadlines that land on a weekend or a public holiday move to
//! the next business day.  The calendar is plain data: the compiled-in
//! Guyana tables cover 2024 to 2026, and a replacement can be loaded from
//! a JSON array of `{"date": "YYYY-MM-DD", "name": "..."}` entries.

use crate::error::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicHoliday {
    pub date: NaiveDate,
    pub name: String,
}

const GUYANA_HOLIDAYS: &[(i32, u32, u32, &str)] = &[
    (2024, 1, 1, "New Year's Day"),
    (2024, 2, 23, "Republic Day"),
    (2024, 3, 25, "Phagwah"),
    (2024, 3, 29, "Good Friday"),
    (2024, 4, 1, "Easter Monday"),
    (2024, 4, 10, "Eid ul-Fitr"),
    (2024, 5, 1, "Labour Day"),
    (2024, 5, 6, "Arrival Day"),
    (2024, 5, 27, "Independence Day"),
    (2024, 6, 17, "Eid ul-Adha"),
    (2024, 7, 1, "CARICOM Day"),
    (2024, 8, 1, "Emancipation Day"),
    (2024, 9, 16, "Youman Nabi"),
    (2024, 10, 31, "Deepavali"),
    (2024, 12, 25, "Christmas Day"),
    (2024, 12, 26, "Boxing Day"),
    (2025, 1, 1, "New Year's Day"),
    (2025, 2, 24, "Republic Day"),
    (2025, 3, 14, "Phagwah"),
    (2025, 3, 31, "Eid ul-Fitr"),
    (2025, 4, 18, "Good Friday"),
    (2025, 4, 21, "Easter Monday"),
    (2025, 5, 1, "Labour Day"),
    (2025, 5, 5, "Arrival Day"),
    (2025, 5, 26, "Independence Day"),
    (2025, 6, 7, "Eid ul-Adha"),
    (2025, 7, 7, "CARICOM Day"),
    (2025, 8, 1, "Emancipation Day"),
    (2025, 9, 5, "Youman Nabi"),
    (2025, 10, 20, "Deepavali"),
    (2025, 12, 25, "Christmas Day"),
    (2025, 12, 26, "Boxing Day"),
    (2026, 1, 1, "New Year's Day"),
    (2026, 2, 23, "Republic Day"),
    (2026, 3, 3, "Phagwah"),
    (2026, 3, 20, "Eid ul-Fitr"),
    (2026, 4, 3, "Good Friday"),
    (2026, 4, 6, "Easter Monday"),
    (2026, 5, 1, "Labour Day"),
    (2026, 5, 5, "Arrival Day"),
    (2026, 5, 26, "Independence Day"),
    (2026, 5, 27, "Eid ul-Adha"),
    (2026, 7, 6, "CARICOM Day"),
    (2026, 8, 1, "Emancipation Day"),
    (2026, 8, 26, "Youman Nabi"),
    (2026, 11, 9, "Deepavali"),
    (2026, 12, 25, "Christmas Day"),
    (2026, 12, 26, "Boxing Day"),
];

/// An immutable set of public holidays for one jurisdiction.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: BTreeMap<NaiveDate, String>,
}

impl HolidayCalendar {
    pub fn new(holidays: impl IntoIterator<Item = PublicHoliday>) -> Self {
        Self {
            holidays: holidays.into_iter().map(|h| (h.date, h.name)).collect(),
        }
    }

    /// Guyana public holidays for 2024 to 2026.
    pub fn guyana() -> Self {
        Self::new(GUYANA_HOLIDAYS.iter().filter_map(|&(y, m, d, name)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| PublicHoliday {
                date,
                name: name.to_string(),
            })
        }))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let holidays: Vec<PublicHoliday> = serde_json::from_str(json)?;
        Ok(Self::new(holidays))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let calendar = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), holidays = calendar.len(), "loaded holiday calendar");
        Ok(calendar)
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.get(&date).map(String::as_str)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }

    /// Holidays falling in `year`, in date order.
    pub fn holidays_in_year(&self, year: i32) -> Vec<PublicHoliday> {
        self.holidays
            .iter()
            .filter(|(date, _)| date.year() == year)
            .map(|(date, name)| PublicHoliday {
                date: *date,
                name: name.clone(),
            })
            .collect()
    }

    /// Move `date` forward until it is neither a weekend nor a holiday.
    pub fn adjust_for_holidays(&self, date: NaiveDate) -> NaiveDate {
        let mut adjusted = date;
        while !self.is_business_day(adjusted) {
            match adjusted.succ_opt() {
                Some(next) => adjusted = next,
                None => break,
            }
        }
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn saturday_moves_to_monday() {
        let calendar = HolidayCalendar::guyana();
        assert_eq!(calendar.adjust_for_holidays(date(2025, 6, 14)), date(2025, 6, 16));
    }

    #[test]
    fn christmas_skips_boxing_day() {
        let calendar = HolidayCalendar::guyana();
        assert_eq!(calendar.adjust_for_holidays(date(2024, 12, 25)), date(2024, 12, 27));
        // In 2025 the 27th is a Saturday.
        assert_eq!(calendar.adjust_for_holidays(date(2025, 12, 25)), date(2025, 12, 29));
    }

    #[test]
    fn easter_weekend_runs_to_tuesday() {
        let calendar = HolidayCalendar::guyana();
        assert_eq!(calendar.adjust_for_holidays(date(2025, 4, 18)), date(2025, 4, 22));
    }

    #[test]
    fn business_days_are_unchanged() {
        let calendar = HolidayCalendar::guyana();
        assert_eq!(calendar.adjust_for_holidays(date(2025, 4, 14)), date(2025, 4, 14));
    }

    #[test]
    fn empty_calendar_only_skips_weekends() {
        let calendar = HolidayCalendar::default();
        assert!(calendar.is_empty());
        assert_eq!(calendar.adjust_for_holidays(date(2024, 12, 25)), date(2024, 12, 25));
        assert_eq!(calendar.adjust_for_holidays(date(2024, 12, 28)), date(2024, 12, 30));
    }

    #[test]
    fn loads_alternate_calendar_from_json() {
        let calendar = HolidayCalendar::from_json(
            r#"[{"date": "2030-06-03", "name": "Company Day"}]"#,
        )
        .unwrap();
        assert_eq!(calendar.holiday_name(date(2030, 6, 3)), Some("Company Day"));
        assert_eq!(calendar.adjust_for_holidays(date(2030, 6, 3)), date(2030, 6, 4));
    }

    #[test]
    fn every_builtin_year_is_populated() {
        let calendar = HolidayCalendar::guyana();
        for year in 2024..=2026 {
            assert_eq!(calendar.holidays_in_year(year).len(), 16, "{year}");
        }
    }
}
