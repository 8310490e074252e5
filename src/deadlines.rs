//! Filing deadline engine.
//!
//! Every recurring obligation is described by a [`TaxDeadline`] whose
//! [`Schedule`] says how the raw due date is derived from a target
//! period.  The raw date is then moved past weekends and public
//! holidays using the engine's [`HolidayCalendar`], and the result is
//! classified by how many days remain:
//!
//! | days until due | status  | tone   |
//! |----------------|---------|--------|
//! | < 0            | overdue | red    |
//! | 0 to 3         | urgent  | red    |
//! | 4 to 7         | soon    | orange |
//! | 8 to 14        | soon    | yellow |
//! | > 14           | ok      | green  |

use crate::error::{EngineError, Result};
use crate::holidays::HolidayCalendar;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default look-ahead window for [`DeadlineEngine::upcoming_deadlines`].
pub const DEFAULT_DAYS_AHEAD: i64 = 30;

const URGENT_DAYS: i64 = 3;
const SOON_DAYS: i64 = 7;
const APPROACHING_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingType {
    Paye,
    Nis,
    Vat,
    CorporationTaxInstalment,
    IncomeTax,
    CorporationTax,
    PropertyTax,
    Form7B,
    CapitalGainsTax,
}

impl FilingType {
    pub const ALL: [FilingType; 9] = [
        FilingType::Paye,
        FilingType::Nis,
        FilingType::Vat,
        FilingType::CorporationTaxInstalment,
        FilingType::IncomeTax,
        FilingType::CorporationTax,
        FilingType::PropertyTax,
        FilingType::Form7B,
        FilingType::CapitalGainsTax,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// The Guyana rule for this filing type.
    fn guyana_deadline(self) -> TaxDeadline {
        use Agency::{Gra, Nis};
        let (name, schedule, agency, description) = match self {
            FilingType::Paye => (
                "PAYE Remittance",
                Schedule::Monthly { due_day: 14 },
                Gra,
                "PAYE deducted from employees, remitted with Form 2",
            ),
            FilingType::Nis => (
                "NIS Contributions",
                Schedule::Monthly { due_day: 15 },
                Nis,
                "Employee and employer NIS contributions with the CS3 schedule",
            ),
            FilingType::Vat => (
                "VAT Return",
                Schedule::Monthly { due_day: 21 },
                Gra,
                "Monthly VAT return and payment",
            ),
            FilingType::CorporationTaxInstalment => (
                "Corporation Tax Instalment",
                Schedule::Quarterly { due_day: 15 },
                Gra,
                "Quarterly advance payment of corporation tax",
            ),
            FilingType::IncomeTax => (
                "Individual Income Tax Return",
                Schedule::Annual { month: 4, day: 30 },
                Gra,
                "Annual income tax return for individuals",
            ),
            FilingType::CorporationTax => (
                "Corporation Tax Return",
                Schedule::Annual { month: 4, day: 30 },
                Gra,
                "Annual corporation tax return",
            ),
            FilingType::PropertyTax => (
                "Property Tax Return",
                Schedule::Annual { month: 4, day: 30 },
                Gra,
                "Annual property tax return",
            ),
            FilingType::Form7B => (
                "Employer Annual Return (Form 7B)",
                Schedule::Annual { month: 1, day: 31 },
                Gra,
                "Annual summary of employee earnings and PAYE deducted",
            ),
            FilingType::CapitalGainsTax => (
                "Capital Gains Tax",
                Schedule::AsNeeded,
                Gra,
                "Due when a chargeable gain is realised",
            ),
        };
        TaxDeadline {
            filing_type: self,
            name: name.to_string(),
            schedule,
            agency,
            description: description.to_string(),
        }
    }
}

/// Services a firm can provide to a client.  Each implies a fixed set of
/// filing obligations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Payroll,
    Vat,
    IncomeTax,
    CorporateTax,
    PropertyTax,
    CapitalGains,
    Bookkeeping,
}

impl ServiceType {
    pub fn filing_types(self) -> &'static [FilingType] {
        match self {
            ServiceType::Payroll => &[FilingType::Paye, FilingType::Nis, FilingType::Form7B],
            ServiceType::Vat => &[FilingType::Vat],
            ServiceType::IncomeTax => &[FilingType::IncomeTax],
            ServiceType::CorporateTax => &[
                FilingType::CorporationTax,
                FilingType::CorporationTaxInstalment,
            ],
            ServiceType::PropertyTax => &[FilingType::PropertyTax],
            ServiceType::CapitalGains => &[FilingType::CapitalGainsTax],
            ServiceType::Bookkeeping => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agency {
    Gra,
    Nis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
    AsNeeded,
}

/// How a raw due date is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "kebab-case")]
pub enum Schedule {
    /// `due_day` of the month after the target month.
    Monthly { due_day: u32 },
    /// `due_day` of the month after the quarter containing the target
    /// month.
    Quarterly { due_day: u32 },
    /// Fixed month and day each year.
    Annual { month: u32, day: u32 },
    /// No recurring date.
    AsNeeded,
}

impl Schedule {
    pub fn frequency(self) -> Frequency {
        match self {
            Schedule::Monthly { .. } => Frequency::Monthly,
            Schedule::Quarterly { .. } => Frequency::Quarterly,
            Schedule::Annual { .. } => Frequency::Annual,
            Schedule::AsNeeded => Frequency::AsNeeded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxDeadline {
    pub filing_type: FilingType,
    pub name: String,
    pub schedule: Schedule,
    pub agency: Agency,
    pub description: String,
}

/// The deadline rule for every [`FilingType`].
#[derive(Debug, Clone)]
pub struct DeadlineRegistry {
    deadlines: Vec<TaxDeadline>,
}

impl DeadlineRegistry {
    pub fn guyana() -> Self {
        Self {
            deadlines: FilingType::ALL.iter().map(|ft| ft.guyana_deadline()).collect(),
        }
    }

    pub fn get(&self, filing_type: FilingType) -> &TaxDeadline {
        &self.deadlines[filing_type.index()]
    }

    /// Replace the schedule used for one filing type.
    pub fn with_schedule(mut self, filing_type: FilingType, schedule: Schedule) -> Self {
        self.deadlines[filing_type.index()].schedule = schedule;
        self
    }
}

/// The month a deadline is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingPeriod {
    pub year: i32,
    /// 1 to 12.  Ignored by annual schedules.
    pub month: u32,
}

/// Ordered from most to least pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    Overdue,
    Urgent,
    Soon,
    Ok,
}

/// Display tier; splits the "soon" status into orange and yellow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Red,
    Orange,
    Yellow,
    Green,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineStatusInfo {
    pub days_until_due: i64,
    pub status: DeadlineStatus,
    pub tone: Tone,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingDeadline {
    pub filing_type: FilingType,
    pub name: String,
    pub agency: Agency,
    pub frequency: Frequency,
    pub due_date: NaiveDate,
    pub status: DeadlineStatusInfo,
}

pub fn days_until_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

pub fn due_date_status(due_date: NaiveDate, today: NaiveDate) -> DeadlineStatusInfo {
    let days = days_until_due(due_date, today);
    let (status, tone) = match days {
        d if d < 0 => (DeadlineStatus::Overdue, Tone::Red),
        d if d <= URGENT_DAYS => (DeadlineStatus::Urgent, Tone::Red),
        d if d <= SOON_DAYS => (DeadlineStatus::Soon, Tone::Orange),
        d if d <= APPROACHING_DAYS => (DeadlineStatus::Soon, Tone::Yellow),
        _ => (DeadlineStatus::Ok, Tone::Green),
    };
    let label = match days {
        -1 => "1 day overdue".to_string(),
        d if d < 0 => format!("{} days overdue", -d),
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        d => format!("Due in {d} days"),
    };
    DeadlineStatusInfo {
        days_until_due: days,
        status,
        tone,
        label,
    }
}

fn next_month(year: i32, month: u32) -> Result<(i32, u32)> {
    if month < 12 {
        return Ok((year, month + 1));
    }
    let next_year = year
        .checked_add(1)
        .ok_or(EngineError::DateOutOfRange { year, month })?;
    Ok((next_year, 1))
}

/// `day` of the given month, clamped to the month's last day.
fn clamped_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    let out_of_range = || EngineError::DateOutOfRange { year, month };
    let (ny, nm) = next_month(year, month)?;
    let last_day = NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|first| first.pred_opt())
        .ok_or_else(out_of_range)?
        .day();
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last_day)).ok_or_else(out_of_range)
}

/// Computes due dates against a deadline registry and holiday calendar.
#[derive(Debug, Clone)]
pub struct DeadlineEngine {
    registry: DeadlineRegistry,
    calendar: HolidayCalendar,
}

impl DeadlineEngine {
    pub fn new(registry: DeadlineRegistry, calendar: HolidayCalendar) -> Self {
        Self { registry, calendar }
    }

    pub fn guyana() -> Self {
        Self::new(DeadlineRegistry::guyana(), HolidayCalendar::guyana())
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    pub fn adjust_for_holidays(&self, date: NaiveDate) -> NaiveDate {
        self.calendar.adjust_for_holidays(date)
    }

    /// The next business-day due date for `filing_type`.
    ///
    /// Without a `period` the target is today's month (monthly and
    /// quarterly) or today's year (annual); an annual anchor that has
    /// already passed then rolls to next year.  As-needed obligations
    /// have no date and return `today`.
    pub fn next_due_date(
        &self,
        filing_type: FilingType,
        period: Option<FilingPeriod>,
        today: NaiveDate,
    ) -> Result<NaiveDate> {
        let (year, month) = period.map_or((today.year(), today.month()), |p| {
            (p.year, p.month.clamp(1, 12))
        });

        let raw = match self.registry.get(filing_type).schedule {
            Schedule::Monthly { due_day } => {
                let (y, m) = next_month(year, month)?;
                clamped_date(y, m, due_day)?
            }
            Schedule::Quarterly { due_day } => {
                let quarter_end = month.div_ceil(3) * 3;
                let (y, m) = next_month(year, quarter_end)?;
                clamped_date(y, m, due_day)?
            }
            Schedule::Annual { month: anchor_month, day } => {
                let anchor = clamped_date(year, anchor_month, day)?;
                if period.is_none() && anchor < today {
                    let next_year = year
                        .checked_add(1)
                        .ok_or(EngineError::DateOutOfRange { year, month: anchor_month })?;
                    clamped_date(next_year, anchor_month, day)?
                } else {
                    anchor
                }
            }
            Schedule::AsNeeded => return Ok(today),
        };
        Ok(self.adjust_for_holidays(raw))
    }

    /// Deadlines implied by `services` that fall due within `days_ahead`
    /// days, earliest first.  Overdue dates are included; as-needed
    /// obligations are not.
    pub fn upcoming_deadlines(
        &self,
        services: &[ServiceType],
        days_ahead: i64,
        today: NaiveDate,
    ) -> Result<Vec<UpcomingDeadline>> {
        let filing_types: BTreeSet<FilingType> = services
            .iter()
            .flat_map(|s| s.filing_types().iter().copied())
            .collect();

        let mut upcoming = Vec::new();
        for filing_type in filing_types {
            let deadline = self.registry.get(filing_type);
            if deadline.schedule == Schedule::AsNeeded {
                continue;
            }
            let due_date = self.next_due_date(filing_type, None, today)?;
            let status = due_date_status(due_date, today);
            if status.days_until_due > days_ahead {
                continue;
            }
            upcoming.push(UpcomingDeadline {
                filing_type,
                name: deadline.name.clone(),
                agency: deadline.agency,
                frequency: deadline.schedule.frequency(),
                due_date,
                status,
            });
        }
        upcoming.sort_by_key(|d| (d.due_date, d.filing_type));
        Ok(upcoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(year: i32, month: u32) -> Option<FilingPeriod> {
        Some(FilingPeriod { year, month })
    }

    fn today() -> NaiveDate {
        date(2025, 6, 16)
    }

    #[test]
    fn registry_matches_filing_type_order() {
        let registry = DeadlineRegistry::guyana();
        for ft in FilingType::ALL {
            assert_eq!(registry.get(ft).filing_type, ft);
        }
    }

    #[test]
    fn monthly_due_in_following_month() {
        let engine = DeadlineEngine::guyana();
        assert_eq!(
            engine.next_due_date(FilingType::Paye, period(2025, 3), today()).unwrap(),
            date(2025, 4, 14)
        );
        assert_eq!(
            engine.next_due_date(FilingType::Vat, period(2025, 4), today()).unwrap(),
            date(2025, 5, 21)
        );
    }

    #[test]
    fn december_rolls_into_next_year() {
        let engine = DeadlineEngine::guyana();
        assert_eq!(
            engine.next_due_date(FilingType::Paye, period(2025, 12), today()).unwrap(),
            date(2026, 1, 14)
        );
    }

    #[test]
    fn monthly_weekend_due_date_moves_to_monday() {
        let engine = DeadlineEngine::guyana();
        // 15 November 2025 is a Saturday.
        assert_eq!(
            engine.next_due_date(FilingType::Nis, period(2025, 10), today()).unwrap(),
            date(2025, 11, 17)
        );
    }

    #[test]
    fn monthly_defaults_to_current_month() {
        let engine = DeadlineEngine::guyana();
        assert_eq!(
            engine.next_due_date(FilingType::Paye, None, today()).unwrap(),
            date(2025, 7, 14)
        );
    }

    #[test]
    fn quarterly_due_after_quarter_end() {
        let engine = DeadlineEngine::guyana();
        let ft = FilingType::CorporationTaxInstalment;
        assert_eq!(
            engine.next_due_date(ft, period(2025, 2), today()).unwrap(),
            date(2025, 4, 15)
        );
        assert_eq!(
            engine.next_due_date(ft, period(2025, 11), today()).unwrap(),
            date(2026, 1, 15)
        );
    }

    #[test]
    fn annual_rolls_only_without_explicit_period() {
        let engine = DeadlineEngine::guyana();
        assert_eq!(
            engine.next_due_date(FilingType::IncomeTax, None, today()).unwrap(),
            date(2026, 4, 30)
        );
        assert_eq!(
            engine.next_due_date(FilingType::IncomeTax, period(2025, 1), today()).unwrap(),
            date(2025, 4, 30)
        );
        assert_eq!(
            engine.next_due_date(FilingType::IncomeTax, None, date(2025, 4, 30)).unwrap(),
            date(2025, 4, 30)
        );
    }

    #[test]
    fn annual_anchor_on_weekend_is_adjusted() {
        let engine = DeadlineEngine::guyana();
        // 31 January 2026 is a Saturday.
        assert_eq!(
            engine.next_due_date(FilingType::Form7B, None, today()).unwrap(),
            date(2026, 2, 2)
        );
    }

    #[test]
    fn as_needed_returns_today() {
        let engine = DeadlineEngine::guyana();
        assert_eq!(
            engine.next_due_date(FilingType::CapitalGainsTax, None, date(2025, 6, 14)).unwrap(),
            date(2025, 6, 14)
        );
    }

    #[test]
    fn due_day_is_clamped_to_month_length() {
        let registry = DeadlineRegistry::guyana()
            .with_schedule(FilingType::Vat, Schedule::Monthly { due_day: 31 });
        let engine = DeadlineEngine::new(registry, HolidayCalendar::default());
        // February 2026 has 28 days; the 28th is a Saturday.
        assert_eq!(
            engine.next_due_date(FilingType::Vat, period(2026, 1), today()).unwrap(),
            date(2026, 3, 2)
        );
    }

    #[test]
    fn december_at_last_representable_year_is_out_of_range() {
        let engine = DeadlineEngine::guyana();
        let err = engine
            .next_due_date(FilingType::Paye, period(i32::MAX, 12), today())
            .unwrap_err();
        assert!(matches!(err, EngineError::DateOutOfRange { year: i32::MAX, month: 12 }));
    }

    #[test]
    fn fourth_quarter_at_last_representable_year_is_out_of_range() {
        let engine = DeadlineEngine::guyana();
        let err = engine
            .next_due_date(FilingType::CorporationTaxInstalment, period(i32::MAX, 11), today())
            .unwrap_err();
        assert!(matches!(err, EngineError::DateOutOfRange { .. }));
    }

    #[test]
    fn year_beyond_calendar_range_is_out_of_range() {
        let engine = DeadlineEngine::guyana();
        assert!(matches!(
            engine.next_due_date(FilingType::Paye, period(300_000, 5), today()),
            Err(EngineError::DateOutOfRange { .. })
        ));
        assert!(matches!(
            engine.next_due_date(FilingType::IncomeTax, period(300_000, 1), today()),
            Err(EngineError::DateOutOfRange { .. })
        ));
    }

    #[test]
    fn status_ranks_follow_urgency() {
        assert!(DeadlineStatus::Overdue < DeadlineStatus::Urgent);
        assert!(DeadlineStatus::Urgent < DeadlineStatus::Soon);
        assert!(DeadlineStatus::Soon < DeadlineStatus::Ok);
    }

    #[test]
    fn status_boundaries() {
        let t = today();
        let at = |days: i64| due_date_status(t + chrono::Duration::days(days), t);

        assert_eq!(at(-2).status, DeadlineStatus::Overdue);
        assert_eq!(at(-2).label, "2 days overdue");
        assert_eq!(at(-1).label, "1 day overdue");
        assert_eq!(at(0).status, DeadlineStatus::Urgent);
        assert_eq!(at(0).label, "Due today");
        assert_eq!(at(3).status, DeadlineStatus::Urgent);
        assert_eq!(at(4).status, DeadlineStatus::Soon);
        assert_eq!(at(4).tone, Tone::Orange);
        assert_eq!(at(7).tone, Tone::Orange);
        assert_eq!(at(8).tone, Tone::Yellow);
        assert_eq!(at(14).status, DeadlineStatus::Soon);
        assert_eq!(at(14).tone, Tone::Yellow);
        assert_eq!(at(15).status, DeadlineStatus::Ok);
        assert_eq!(at(15).label, "Due in 15 days");
    }

    #[test]
    fn upcoming_filters_and_sorts() {
        let engine = DeadlineEngine::guyana();
        let services = [ServiceType::Vat, ServiceType::Payroll];

        let within_month = engine.upcoming_deadlines(&services, DEFAULT_DAYS_AHEAD, today()).unwrap();
        let types: Vec<FilingType> = within_month.iter().map(|d| d.filing_type).collect();
        assert_eq!(types, [FilingType::Paye, FilingType::Nis]);
        assert_eq!(within_month[0].due_date, date(2025, 7, 14));
        assert_eq!(within_month[0].status.days_until_due, 28);

        let wider = engine.upcoming_deadlines(&services, 40, today()).unwrap();
        assert_eq!(wider.len(), 3);
        assert_eq!(wider[2].filing_type, FilingType::Vat);
    }

    #[test]
    fn upcoming_dedupes_and_skips_as_needed() {
        let engine = DeadlineEngine::guyana();
        let services = [
            ServiceType::Payroll,
            ServiceType::Payroll,
            ServiceType::CapitalGains,
            ServiceType::Bookkeeping,
        ];
        let upcoming = engine.upcoming_deadlines(&services, 400, today()).unwrap();
        let types: Vec<FilingType> = upcoming.iter().map(|d| d.filing_type).collect();
        assert_eq!(types, [FilingType::Paye, FilingType::Nis, FilingType::Form7B]);
    }
}
