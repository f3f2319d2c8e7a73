use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::config::settings::{LocationConfig, PrayerConfig, SourcePreference};
use crate::db::repository::CacheRepo;
use crate::prayer_times::api::{TimingsFetcher, TimingsQuery};
use crate::prayer_times::calculator::{aladhan_method_id, aladhan_school, PrayerCalculator};
use crate::prayer_times::table::PrayerTimeTable;

/// Which tier produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Api,
    Cache,
    Offline,
    Fallback,
}

impl TableSource {
    pub fn label(&self) -> &'static str {
        match self {
            TableSource::Api => "aladhan.com",
            TableSource::Cache => "aladhan.com (cached)",
            TableSource::Offline => "calculated offline",
            TableSource::Fallback => "default times",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTable {
    pub date: NaiveDate,
    pub table: PrayerTimeTable,
    pub source: TableSource,
}

/// Produces the table for a day: cache, then API, then offline
/// calculation, then the built-in default table. Only API results are
/// cached so a later run can retry the network.
pub struct TableProvider<'a> {
    conn: &'a Connection,
    fetcher: &'a dyn TimingsFetcher,
    refresh: bool,
}

impl<'a> TableProvider<'a> {
    pub fn new(conn: &'a Connection, fetcher: &'a dyn TimingsFetcher) -> Self {
        Self {
            conn,
            fetcher,
            refresh: false,
        }
    }

    /// Skip the cache lookup (the fetched table is still stored).
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn table_for(
        &self,
        date: NaiveDate,
        location: &LocationConfig,
        prayer: &PrayerConfig,
    ) -> Result<ResolvedTable> {
        let resolved = |table, source| ResolvedTable {
            date,
            table,
            source,
        };

        if prayer.source == SourcePreference::Api {
            match aladhan_method_id(&prayer.calc_method) {
                None => log::debug!(
                    "No aladhan id for method {}, calculating offline",
                    prayer.calc_method
                ),
                Some(method) => {
                    let key = cache_key(date, location, prayer);
                    if !self.refresh {
                        if let Some(table) = CacheRepo::get(self.conn, &key)? {
                            log::debug!("Prayer times cache hit {}", key);
                            return Ok(resolved(table, TableSource::Cache));
                        }
                    }

                    let query = TimingsQuery {
                        date,
                        latitude: location.latitude,
                        longitude: location.longitude,
                        method,
                        school: aladhan_school(&prayer.madhab),
                    };
                    match self.fetch(&query) {
                        Ok(table) => {
                            CacheRepo::store(self.conn, &key, date, &table)?;
                            return Ok(resolved(table, TableSource::Api));
                        }
                        Err(e) => {
                            log::warn!("Fetching prayer times failed, calculating offline: {:#}", e)
                        }
                    }
                }
            }
        }

        match calculate(date, location, prayer) {
            Ok(table) => Ok(resolved(table, TableSource::Offline)),
            Err(e) => {
                log::warn!("Offline calculation failed, using default times: {:#}", e);
                Ok(resolved(PrayerTimeTable::fallback(), TableSource::Fallback))
            }
        }
    }

    fn fetch(&self, query: &TimingsQuery) -> Result<PrayerTimeTable> {
        let raw = self.fetcher.fetch_timings(query)?;
        Ok(PrayerTimeTable::try_from(&raw)?)
    }
}

fn calculate(
    date: NaiveDate,
    location: &LocationConfig,
    prayer: &PrayerConfig,
) -> Result<PrayerTimeTable> {
    PrayerCalculator::new(
        location.latitude,
        location.longitude,
        &prayer.calc_method,
        &prayer.madhab,
        location.utc_offset_minutes(date),
    )?
    .table_for_date(date)
}

fn cache_key(date: NaiveDate, location: &LocationConfig, prayer: &PrayerConfig) -> String {
    format!(
        "{}@{:.4},{:.4}/{}/{}",
        date.format("%Y-%m-%d"),
        location.latitude,
        location.longitude,
        prayer.calc_method,
        prayer.madhab
    )
}
