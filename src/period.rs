//! Reporting periods and the time windows they select.
//!
//! A window always ends at "now" and starts at local midnight of the first day of the period, in
//! the time zone of "now". Both ends are inclusive.

use crate::model::Expense;
use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// The granularity used to select and total expenses.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// From midnight today.
    #[default]
    #[value(alias = "day")]
    Daily,
    /// From midnight of the most recent Monday.
    #[value(alias = "week")]
    Weekly,
    /// From midnight of the first day of the month.
    #[value(alias = "month")]
    Monthly,
}

serde_plain::derive_display_from_serialize!(Period);
serde_plain::derive_fromstr_from_deserialize!(Period);

impl Period {
    /// The word used for this period in summaries, as in "Total for the week".
    pub fn label(&self) -> &'static str {
        match self {
            Period::Daily => "day",
            Period::Weekly => "week",
            Period::Monthly => "month",
        }
    }

    /// Returns the first instant of the period that contains `now`, in the time zone of `now`.
    pub fn start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let today = now.date_naive();
        let first_day = match self {
            Period::Daily => today,
            Period::Weekly => {
                today - Days::new(u64::from(today.weekday().num_days_from_monday()))
            }
            Period::Monthly => today.with_day(1).unwrap_or(today),
        };
        start_of_day(&now.timezone(), first_day)
    }

    /// Returns the inclusive window `[start, now]`.
    pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Window {
        Window {
            start: to_fixed(&self.start(now)),
            end: to_fixed(now),
        }
    }
}

/// An inclusive time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl Window {
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// True when `start <= timestamp <= end`.
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.start.with_timezone(&Utc) <= *timestamp && *timestamp <= self.end.with_timezone(&Utc)
    }
}

/// Returns the expenses whose timestamp falls within the `period` window ending at `now`,
/// preserving their order.
///
/// Passing `now` in makes this a pure function. Callers in the CLI pass `Local::now()`.
pub fn filter_by_period<'a, Tz: TimeZone>(
    expenses: &'a [Expense],
    period: Period,
    now: &DateTime<Tz>,
) -> Vec<&'a Expense> {
    let window = period.window(now);
    expenses
        .iter()
        .filter(|expense| window.contains(&expense.timestamp()))
        .collect()
}

/// The first existing instant of `day` in `tz`. This is midnight unless a DST transition skips
/// it, in which case it is the end of the gap. An ambiguous midnight resolves to the earlier one.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Tz> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..MINUTES_PER_DAY)
        .find_map(|minute| {
            tz.from_local_datetime(&(midnight + Duration::minutes(minute)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

fn to_fixed<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<FixedOffset> {
    let offset = dt.offset().fix();
    dt.with_timezone(&offset)
}
