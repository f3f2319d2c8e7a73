use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::PrayerName;
use crate::utils::format::{format_24h, parse_time_of_day};

/// Rejection of a table that does not hold six valid times of day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTimeTable {
    #[error("invalid time table: no entry for {0}")]
    MissingEntry(PrayerName),
    #[error("invalid time table: {prayer} has malformed time '{value}'")]
    MalformedTime { prayer: PrayerName, value: String },
}

/// Six HH:MM strings as received from an API, a cache row or a config file.
/// Accepts aladhan's capitalized keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTimings {
    #[serde(default, alias = "Fajr")]
    pub fajr: Option<String>,
    #[serde(default, alias = "Sunrise")]
    pub sunrise: Option<String>,
    #[serde(default, alias = "Dhuhr")]
    pub dhuhr: Option<String>,
    #[serde(default, alias = "Asr")]
    pub asr: Option<String>,
    #[serde(default, alias = "Maghrib")]
    pub maghrib: Option<String>,
    #[serde(default, alias = "Isha")]
    pub isha: Option<String>,
}

impl RawTimings {
    pub fn get(&self, prayer: PrayerName) -> Option<&str> {
        let value = match prayer {
            PrayerName::Fajr => &self.fajr,
            PrayerName::Sunrise => &self.sunrise,
            PrayerName::Dhuhr => &self.dhuhr,
            PrayerName::Asr => &self.asr,
            PrayerName::Maghrib => &self.maghrib,
            PrayerName::Isha => &self.isha,
        };
        value.as_deref()
    }
}

/// The six daily clock times of one location and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerTimeTable {
    times: [NaiveTime; 6],
}

impl PrayerTimeTable {
    /// Times listed in table order (Fajr, Sunrise, Dhuhr, Asr, Maghrib, Isha).
    /// Seconds are dropped.
    pub fn new(times: [NaiveTime; 6]) -> Self {
        let times = times.map(|t| {
            t.with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(t)
        });
        Self { times }
    }

    /// Build from six "HH:MM" strings in table order.
    pub fn from_hhmm(entries: [&str; 6]) -> Result<Self, InvalidTimeTable> {
        let mut times = [NaiveTime::MIN; 6];
        for (prayer, value) in PrayerName::ALL.iter().zip(entries) {
            times[prayer.index()] = parse_entry(*prayer, value)?;
        }
        Ok(Self { times })
    }

    /// Used when neither the API nor the local calculation produced a table.
    pub fn fallback() -> Self {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN);
        Self {
            times: [t(5, 12), t(6, 43), t(12, 30), t(15, 45), t(18, 32), t(20, 0)],
        }
    }

    pub fn time(&self, prayer: PrayerName) -> NaiveTime {
        self.times[prayer.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = (PrayerName, NaiveTime)> + '_ {
        PrayerName::ALL.iter().map(move |p| (*p, self.time(*p)))
    }

    pub fn to_raw(&self) -> RawTimings {
        let s = |p| Some(format_24h(self.time(p)));
        RawTimings {
            fajr: s(PrayerName::Fajr),
            sunrise: s(PrayerName::Sunrise),
            dhuhr: s(PrayerName::Dhuhr),
            asr: s(PrayerName::Asr),
            maghrib: s(PrayerName::Maghrib),
            isha: s(PrayerName::Isha),
        }
    }
}

impl TryFrom<&RawTimings> for PrayerTimeTable {
    type Error = InvalidTimeTable;

    fn try_from(raw: &RawTimings) -> Result<Self, Self::Error> {
        let mut entries = [""; 6];
        for prayer in PrayerName::ALL {
            entries[prayer.index()] = raw
                .get(prayer)
                .ok_or(InvalidTimeTable::MissingEntry(prayer))?;
        }
        Self::from_hhmm(entries)
    }
}

// aladhan may annotate a time with its zone, e.g. "05:12 (BST)"
fn parse_entry(prayer: PrayerName, value: &str) -> Result<NaiveTime, InvalidTimeTable> {
    let token = value.split_whitespace().next().unwrap_or("");
    parse_time_of_day(token).map_err(|_| InvalidTimeTable::MalformedTime {
        prayer,
        value: value.to_string(),
    })
}
