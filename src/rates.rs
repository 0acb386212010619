//! Time-of-use tariff catalog, simulation calendar, and hourly rate schedules.

use std::fmt;

/// Number of hours in the simulated year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Flat $/kWh applied when a requested rate plan is not in the catalog.
pub const DEFAULT_FLAT_RATE: f32 = 0.30;

/// Days in each month of the simulated (non-leap) year.
pub const MONTH_DAYS: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Three-letter month labels, used by the monthly cash-flow table.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Weekday index of January 1 in the simulated year (2025), 0 = Monday.
const JAN_1_WEEKDAY: usize = 2;

/// US federal holidays in the simulated year as (month, day-of-month), 1-based.
///
/// Holidays price as off-peak even when they land on a weekday inside the
/// tariff's peak window.
const FEDERAL_HOLIDAYS: [(usize, usize); 11] = [
    (1, 1),   // New Year's Day
    (1, 20),  // Martin Luther King Jr. Day
    (2, 17),  // Washington's Birthday
    (5, 26),  // Memorial Day
    (6, 19),  // Juneteenth
    (7, 4),   // Independence Day
    (9, 1),   // Labor Day
    (10, 13), // Columbus Day
    (11, 11), // Veterans Day
    (11, 27), // Thanksgiving Day
    (12, 25), // Christmas Day
];

/// Returns `(month_index, day_of_month)` for a day-of-year, both 0-based month
/// and 1-based day.
///
/// # Panics
///
/// Panics if `day_of_year >= 365`.
pub fn month_and_day(day_of_year: usize) -> (usize, usize) {
    assert!(day_of_year < 365, "day_of_year out of range: {day_of_year}");
    let mut remaining = day_of_year;
    for (month, &days) in MONTH_DAYS.iter().enumerate() {
        if remaining < days {
            return (month, remaining + 1);
        }
        remaining -= days;
    }
    unreachable!()
}

/// True when the day-of-year falls on a Saturday or Sunday.
pub fn is_weekend(day_of_year: usize) -> bool {
    (JAN_1_WEEKDAY + day_of_year) % 7 >= 5
}

/// True when the day-of-year is a federal holiday.
pub fn is_holiday(day_of_year: usize) -> bool {
    let (month, day) = month_and_day(day_of_year);
    FEDERAL_HOLIDAYS.contains(&(month + 1, day))
}

/// True for the summer half of the year (May through October).
pub fn is_summer(month: usize) -> bool {
    (4..=9).contains(&month)
}

/// Half-open hour-of-year spans `[start, end)` for each calendar month.
pub fn month_hour_spans() -> [(usize, usize); 12] {
    let mut spans = [(0, 0); 12];
    let mut start = 0;
    for (month, &days) in MONTH_DAYS.iter().enumerate() {
        let end = start + days * 24;
        spans[month] = (start, end);
        start = end;
    }
    spans
}

/// A time-of-use tariff definition from the built-in catalog.
///
/// Rates follow a two-season model: one peak/off-peak pair for the summer
/// half of the year and one for the winter half. The peak window is a
/// half-open hour-of-day range applied on non-holiday weekdays.
#[derive(Debug, Clone, Copy)]
pub struct Tariff {
    /// Catalog name as selected by the user.
    pub name: &'static str,
    /// Summer peak rate ($/kWh).
    pub summer_peak: f32,
    /// Summer off-peak rate ($/kWh).
    pub summer_offpeak: f32,
    /// Winter peak rate ($/kWh).
    pub winter_peak: f32,
    /// Winter off-peak rate ($/kWh).
    pub winter_offpeak: f32,
    /// First hour-of-day of the peak window (inclusive).
    pub peak_start_hour: usize,
    /// Last hour-of-day of the peak window (exclusive).
    pub peak_end_hour: usize,
}

impl Tariff {
    fn is_peak_hour(&self, hour_of_day: usize) -> bool {
        (self.peak_start_hour..self.peak_end_hour).contains(&hour_of_day)
    }
}

/// Built-in tariff catalog.
pub static TARIFF_CATALOG: [Tariff; 3] = [
    Tariff {
        name: "Residential E-TOU-C",
        summer_peak: 0.55,
        summer_offpeak: 0.42,
        winter_peak: 0.40,
        winter_offpeak: 0.35,
        peak_start_hour: 16,
        peak_end_hour: 21,
    },
    Tariff {
        name: "Commercial B-10 TOU",
        summer_peak: 0.48,
        summer_offpeak: 0.33,
        winter_peak: 0.36,
        winter_offpeak: 0.28,
        peak_start_hour: 16,
        peak_end_hour: 21,
    },
    Tariff {
        name: "Ag Rate AG-4B",
        summer_peak: 0.32,
        summer_offpeak: 0.18,
        winter_peak: 0.24,
        winter_offpeak: 0.16,
        peak_start_hour: 12,
        peak_end_hour: 18,
    },
];

/// Looks up a tariff by catalog name.
pub fn find_tariff(name: &str) -> Option<&'static Tariff> {
    TARIFF_CATALOG.iter().find(|t| t.name == name)
}

/// An 8760-entry per-hour price schedule resolved from a tariff name.
#[derive(Debug, Clone)]
pub struct RateSchedule {
    /// Resolved plan name (the requested name, even when falling back).
    pub plan: String,
    /// $/kWh for every hour of the year.
    pub rates: Vec<f32>,
    /// Hour-of-day peak mask derived from the tariff's peak window.
    ///
    /// All-false for a flat fallback schedule.
    pub peak_hours: [bool; 24],
    /// True when the plan was not found and the flat default rate was used.
    pub fallback: bool,
}

impl RateSchedule {
    /// Builds the hourly rate schedule for a named plan.
    ///
    /// Unknown plan names do not fail: the schedule falls back to
    /// [`DEFAULT_FLAT_RATE`] for every hour with `fallback` set, so the
    /// caller can surface a warning while the estimate stays available.
    ///
    /// Pure function of the plan name and the fixed simulation calendar;
    /// repeated calls yield bit-identical schedules.
    pub fn for_plan(plan: &str) -> Self {
        let Some(tariff) = find_tariff(plan) else {
            return Self {
                plan: plan.to_string(),
                rates: vec![DEFAULT_FLAT_RATE; HOURS_PER_YEAR],
                peak_hours: [false; 24],
                fallback: true,
            };
        };

        let mut rates = Vec::with_capacity(HOURS_PER_YEAR);
        for hour in 0..HOURS_PER_YEAR {
            let day = hour / 24;
            let hour_of_day = hour % 24;
            let (month, _) = month_and_day(day);
            let summer = is_summer(month);

            // Holidays and weekends never price at peak.
            let peak = tariff.is_peak_hour(hour_of_day) && !is_weekend(day) && !is_holiday(day);

            let rate = match (summer, peak) {
                (true, true) => tariff.summer_peak,
                (true, false) => tariff.summer_offpeak,
                (false, true) => tariff.winter_peak,
                (false, false) => tariff.winter_offpeak,
            };
            rates.push(rate);
        }

        let mut peak_hours = [false; 24];
        for (hour_of_day, slot) in peak_hours.iter_mut().enumerate() {
            *slot = tariff.is_peak_hour(hour_of_day);
        }

        Self {
            plan: plan.to_string(),
            rates,
            peak_hours,
            fallback: false,
        }
    }

    /// Names of every plan in the catalog.
    pub fn catalog_names() -> Vec<&'static str> {
        TARIFF_CATALOG.iter().map(|t| t.name).collect()
    }
}

impl fmt::Display for RateSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fallback {
            write!(f, "{} (flat fallback {:.2} $/kWh)", self.plan, DEFAULT_FLAT_RATE)
        } else {
            write!(f, "{}", self.plan)
        }
    }
}
