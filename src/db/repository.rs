use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Bookmark, BookmarkKind};
use crate::prayer_times::table::{PrayerTimeTable, RawTimings};

// ─── Local storage ───────────────────────────────────────────────────────────

/// Keyed string records, the terminal stand-in for browser local storage.
pub struct StorageRepo;

impl StorageRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM local_storage WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(conn: &Connection, key: &str) -> Result<bool> {
        let n = conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }
}

// ─── Cached prayer tables ───────────────────────────────────────────────────

pub struct CacheRepo;

impl CacheRepo {
    pub fn get(conn: &Connection, cache_key: &str) -> Result<Option<PrayerTimeTable>> {
        let row = conn
            .query_row(
                "SELECT fajr, sunrise, dhuhr, asr, maghrib, isha
                 FROM prayer_times_cache WHERE cache_key = ?1",
                params![cache_key],
                |row| {
                    Ok(RawTimings {
                        fajr: row.get(0)?,
                        sunrise: row.get(1)?,
                        dhuhr: row.get(2)?,
                        asr: row.get(3)?,
                        maghrib: row.get(4)?,
                        isha: row.get(5)?,
                    })
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some(raw) => match PrayerTimeTable::try_from(&raw) {
                Ok(table) => Ok(Some(table)),
                Err(e) => {
                    log::warn!("Ignoring cached table {}: {}", cache_key, e);
                    Ok(None)
                }
            },
        }
    }

    pub fn store(
        conn: &Connection,
        cache_key: &str,
        date: NaiveDate,
        table: &PrayerTimeTable,
    ) -> Result<()> {
        let raw = table.to_raw();
        conn.execute(
            "INSERT OR REPLACE INTO prayer_times_cache
                (cache_key, date, fajr, sunrise, dhuhr, asr, maghrib, isha)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                cache_key,
                date.format("%Y-%m-%d").to_string(),
                raw.fajr,
                raw.sunrise,
                raw.dhuhr,
                raw.asr,
                raw.maghrib,
                raw.isha,
            ],
        )?;
        Ok(())
    }

    /// Drop entries for dates before `today`.
    pub fn prune_before(conn: &Connection, today: NaiveDate) -> Result<usize> {
        let n = conn.execute(
            "DELETE FROM prayer_times_cache WHERE date < ?1",
            params![today.format("%Y-%m-%d").to_string()],
        )?;
        Ok(n)
    }

    pub fn clear_all(conn: &Connection) -> Result<usize> {
        let n = conn.execute("DELETE FROM prayer_times_cache", [])?;
        Ok(n)
    }
}

// ─── Bookmarks ───────────────────────────────────────────────────────────────

pub const BOOKMARKS_KEY: &str = "ramadhan-pro-bookmarks";

pub struct BookmarkRepo;

impl BookmarkRepo {
    /// All bookmarks in insertion order. Corrupt storage reads as empty.
    pub fn all(conn: &Connection) -> Result<Vec<Bookmark>> {
        let Some(json) = StorageRepo::get(conn, BOOKMARKS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&json) {
            Ok(bookmarks) => Ok(bookmarks),
            Err(e) => {
                log::error!("Error parsing bookmarks: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn write_all(conn: &Connection, bookmarks: &[Bookmark]) -> Result<()> {
        if bookmarks.is_empty() {
            StorageRepo::remove(conn, BOOKMARKS_KEY)?;
            return Ok(());
        }
        let json = serde_json::to_string(bookmarks).context("Serializing bookmarks")?;
        StorageRepo::set(conn, BOOKMARKS_KEY, &json)
    }

    pub fn save(
        conn: &Connection,
        kind: BookmarkKind,
        title: &str,
        reference: &str,
    ) -> Result<Bookmark> {
        Self::save_at(conn, kind, title, reference, chrono::Utc::now().timestamp_millis())
    }

    pub fn save_at(
        conn: &Connection,
        kind: BookmarkKind,
        title: &str,
        reference: &str,
        timestamp: i64,
    ) -> Result<Bookmark> {
        let bookmark = Bookmark {
            id: format!("{}-{}-{}", kind.as_str(), timestamp, random_suffix()),
            kind,
            title: title.to_string(),
            reference: reference.to_string(),
            timestamp,
        };

        let mut bookmarks = Self::all(conn)?;
        bookmarks.push(bookmark.clone());
        Self::write_all(conn, &bookmarks)?;
        Ok(bookmark)
    }

    /// Returns false when no bookmark has this id.
    pub fn remove(conn: &Connection, id: &str) -> Result<bool> {
        let bookmarks = Self::all(conn)?;
        let before = bookmarks.len();
        let kept: Vec<Bookmark> = bookmarks.into_iter().filter(|b| b.id != id).collect();

        if kept.len() == before {
            return Ok(false);
        }
        Self::write_all(conn, &kept)?;
        Ok(true)
    }

    pub fn is_bookmarked(conn: &Connection, kind: BookmarkKind, reference: &str) -> Result<bool> {
        Ok(Self::all(conn)?
            .iter()
            .any(|b| b.kind == kind && b.reference == reference))
    }

    /// Remove every bookmark for (kind, reference), or save one if none
    /// exists. Returns the new bookmark when one was saved.
    pub fn toggle(
        conn: &Connection,
        kind: BookmarkKind,
        title: &str,
        reference: &str,
    ) -> Result<Option<Bookmark>> {
        let bookmarks = Self::all(conn)?;
        let (matching, kept): (Vec<Bookmark>, Vec<Bookmark>) = bookmarks
            .into_iter()
            .partition(|b| b.kind == kind && b.reference == reference);

        if matching.is_empty() {
            Self::save(conn, kind, title, reference).map(Some)
        } else {
            Self::write_all(conn, &kept)?;
            Ok(None)
        }
    }
}

// 9 base-36 characters
fn random_suffix() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;

    #[test]
    fn storage_set_get_remove() {
        let conn = test_conn();
        assert_eq!(StorageRepo::get(&conn, "k").unwrap(), None);
        StorageRepo::set(&conn, "k", "one").unwrap();
        StorageRepo::set(&conn, "k", "two").unwrap();
        assert_eq!(StorageRepo::get(&conn, "k").unwrap().as_deref(), Some("two"));
        assert!(StorageRepo::remove(&conn, "k").unwrap());
        assert!(!StorageRepo::remove(&conn, "k").unwrap());
    }

    #[test]
    fn cache_round_trip_and_prune() {
        let conn = test_conn();
        let d1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let table = PrayerTimeTable::fallback();

        CacheRepo::store(&conn, "a", d1, &table).unwrap();
        CacheRepo::store(&conn, "b", d2, &table).unwrap();
        assert_eq!(CacheRepo::get(&conn, "a").unwrap(), Some(table));
        assert_eq!(CacheRepo::get(&conn, "missing").unwrap(), None);

        assert_eq!(CacheRepo::prune_before(&conn, d2).unwrap(), 1);
        assert_eq!(CacheRepo::get(&conn, "a").unwrap(), None);
        assert_eq!(CacheRepo::clear_all(&conn).unwrap(), 1);
    }

    #[test]
    fn corrupt_cache_row_reads_as_miss() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO prayer_times_cache (cache_key, date, fajr, sunrise, dhuhr, asr, maghrib, isha)
             VALUES ('x', '2026-03-01', 'soon', '06:43', '12:30', '15:45', '18:32', '20:00')",
            [],
        )
        .unwrap();
        assert_eq!(CacheRepo::get(&conn, "x").unwrap(), None);
    }

    #[test]
    fn empty_storage_has_no_bookmarks() {
        let conn = test_conn();
        assert!(BookmarkRepo::all(&conn).unwrap().is_empty());
    }

    #[test]
    fn save_list_remove() {
        let conn = test_conn();
        let a = BookmarkRepo::save_at(&conn, BookmarkKind::Surah, "Al-Fatihah", "1", 1_000).unwrap();
        let b = BookmarkRepo::save_at(&conn, BookmarkKind::Ayah, "Ayat al-Kursi", "2:255", 2_000)
            .unwrap();

        assert!(a.id.starts_with("surah-1000-"));
        assert_eq!(a.id.len(), "surah-1000-".len() + 9);
        assert_ne!(a.id, b.id);

        let all = BookmarkRepo::all(&conn).unwrap();
        assert_eq!(all, vec![a.clone(), b.clone()]);

        assert!(BookmarkRepo::remove(&conn, &a.id).unwrap());
        assert!(!BookmarkRepo::remove(&conn, &a.id).unwrap());
        assert_eq!(BookmarkRepo::all(&conn).unwrap(), vec![b]);
    }

    #[test]
    fn is_bookmarked_matches_kind_and_reference() {
        let conn = test_conn();
        BookmarkRepo::save(&conn, BookmarkKind::Surah, "Ya-Sin", "36").unwrap();
        assert!(BookmarkRepo::is_bookmarked(&conn, BookmarkKind::Surah, "36").unwrap());
        assert!(!BookmarkRepo::is_bookmarked(&conn, BookmarkKind::Dua, "36").unwrap());
        assert!(!BookmarkRepo::is_bookmarked(&conn, BookmarkKind::Surah, "37").unwrap());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let conn = test_conn();
        let added = BookmarkRepo::toggle(&conn, BookmarkKind::Dua, "Before sleep", "12").unwrap();
        assert!(added.is_some());
        assert!(BookmarkRepo::is_bookmarked(&conn, BookmarkKind::Dua, "12").unwrap());

        let removed = BookmarkRepo::toggle(&conn, BookmarkKind::Dua, "Before sleep", "12").unwrap();
        assert!(removed.is_none());
        assert!(BookmarkRepo::all(&conn).unwrap().is_empty());
        assert_eq!(StorageRepo::get(&conn, BOOKMARKS_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_json_reads_as_empty() {
        let conn = test_conn();
        StorageRepo::set(&conn, BOOKMARKS_KEY, "{not json").unwrap();
        assert!(BookmarkRepo::all(&conn).unwrap().is_empty());
    }

    #[test]
    fn reads_records_written_by_the_web_app() {
        let conn = test_conn();
        StorageRepo::set(
            &conn,
            BOOKMARKS_KEY,
            r#"[{"id":"ayah-1709251200000-k3j9x0q2m","type":"ayah","title":"Al-Baqarah 2:255","reference":"2:255","timestamp":1709251200000}]"#,
        )
        .unwrap();
        let all = BookmarkRepo::all(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, BookmarkKind::Ayah);
        assert_eq!(all[0].timestamp, 1_709_251_200_000);
    }
}
