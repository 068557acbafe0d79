use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Controls what resolution the timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    #[default]
    Quarter,
    Year,
}

impl Granularity {
    /// Finest first.
    pub const ALL: [Granularity; 3] = [Granularity::Month, Granularity::Quarter, Granularity::Year];

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Month => "Month",
            Granularity::Quarter => "Quarter",
            Granularity::Year => "Year",
        }
    }

    fn months(self) -> u32 {
        match self {
            Granularity::Month => 1,
            Granularity::Quarter => 3,
            Granularity::Year => 12,
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            Granularity::Month => "m",
            Granularity::Quarter => "q",
            Granularity::Year => "y",
        }
    }

    /// Next step when zooming in, `None` at the finest level.
    pub fn finer(self) -> Option<Self> {
        match self {
            Granularity::Year => Some(Granularity::Quarter),
            Granularity::Quarter => Some(Granularity::Month),
            Granularity::Month => None,
        }
    }

    /// Next step when zooming out, `None` at the coarsest level.
    pub fn coarser(self) -> Option<Self> {
        match self {
            Granularity::Month => Some(Granularity::Quarter),
            Granularity::Quarter => Some(Granularity::Year),
            Granularity::Year => None,
        }
    }

    /// First day of the unit containing `date`.
    pub fn start_of_unit(self, date: NaiveDate) -> NaiveDate {
        let month0 = date.month0();
        let first_month0 = match self {
            Granularity::Month => month0,
            Granularity::Quarter => month0 - month0 % 3,
            Granularity::Year => 0,
        };
        NaiveDate::from_ymd_opt(date.year(), first_month0 + 1, 1).unwrap_or(date)
    }

    /// Last day of the unit containing `date`.
    pub fn end_of_unit(self, date: NaiveDate) -> NaiveDate {
        self.start_of_unit(date)
            .checked_add_months(Months::new(self.months()))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Widen `range` outwards to whole units.
    pub fn align(self, range: DateRange) -> DateRange {
        DateRange {
            from: self.start_of_unit(range.from),
            to: self.end_of_unit(range.to),
        }
    }

    fn unit_label(self, start: NaiveDate) -> String {
        match self {
            Granularity::Month => start.format("%b %Y").to_string(),
            Granularity::Quarter => format!("Q{} {}", start.month0() / 3 + 1, start.year()),
            Granularity::Year => start.format("%Y").to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An inclusive window of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Days between `from` and `to`; the denominator of every layout percentage.
    pub fn span_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from.format("%Y-%m-%d"), self.to.format("%Y-%m-%d"))
    }
}

/// One bucket of the partitioned timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeUnit {
    pub id: String,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Split `range` into whole calendar units of `granularity`.
///
/// The first unit starts on or before `range.from`, the last ends on or after
/// `range.to`, and each unit begins the day after the previous one ends. At
/// least one unit is always produced.
pub fn partition(range: DateRange, granularity: Granularity) -> Vec<TimeUnit> {
    let mut units = Vec::new();
    let mut cursor = granularity.start_of_unit(range.from);

    loop {
        let end = granularity.end_of_unit(cursor);
        units.push(TimeUnit {
            id: format!("{}-{}", granularity.id_prefix(), cursor.format("%Y-%m-%d")),
            label: granularity.unit_label(cursor),
            start: cursor,
            end,
        });
        if end >= range.to {
            break;
        }
        match end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    units
}
