use chrono::{Duration, NaiveDateTime};

use crate::models::PrayerName;
use crate::prayer_times::table::PrayerTimeTable;
use crate::utils::format::format_12h;

/// Whole hours, minutes and seconds left, truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Negative durations clamp to zero.
    pub fn from_duration(d: Duration) -> Self {
        let total = d.num_seconds().max(0);
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

/// The upcoming table entry relative to some instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPrayer {
    pub prayer: PrayerName,
    /// Set when every entry of today has passed and this is tomorrow's Fajr
    pub tomorrow: bool,
    pub at: NaiveDateTime,
    pub remaining: Countdown,
}

impl NextPrayer {
    pub fn name(&self) -> String {
        if self.tomorrow {
            format!("{} (Tomorrow)", self.prayer.display_name())
        } else {
            self.prayer.display_name().to_string()
        }
    }

    pub fn display_time(&self) -> String {
        format_12h(self.at.time())
    }
}

/// Find the next prayer after `now` and the time left until it.
///
/// Each entry is placed on `now`'s date; the earliest one strictly after
/// `now` wins, with equal instants going to the earlier entry in table
/// order. An entry exactly at `now` counts as passed. Once Isha has passed
/// the answer is Fajr of the following day.
///
/// Called once when a table is loaded and again on every clock tick.
pub fn resolve_next(table: &PrayerTimeTable, now: NaiveDateTime) -> NextPrayer {
    let today = now.date();

    // min_by_key keeps the first of equal minima, i.e. table order
    let upcoming = table
        .entries()
        .map(|(prayer, time)| (prayer, today.and_time(time)))
        .filter(|(_, at)| *at > now)
        .min_by_key(|(_, at)| *at);

    let (prayer, at, tomorrow) = match upcoming {
        Some((prayer, at)) => (prayer, at, false),
        None => {
            let next_day = today.succ_opt().unwrap_or(today);
            let fajr = next_day.and_time(table.time(PrayerName::Fajr));
            (PrayerName::Fajr, fajr, true)
        }
    };

    NextPrayer {
        prayer,
        tomorrow,
        at,
        remaining: Countdown::from_duration(at - now),
    }
}
