use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rusqlite::Connection;
use std::str::FromStr;

use crate::cli::args::{BookmarkCommands, CacheCommands, LocationArgs, SettingsCommands};
use crate::config::settings::{format_tz_offset, LocationConfig, SETTING_KEYS};
use crate::config::AppConfig;
use crate::db::repository::{BookmarkRepo, CacheRepo};
use crate::models::bookmark::validate_reference;
use crate::models::BookmarkKind;
use crate::prayer_times::location::display_name;
use crate::prayer_times::{resolve_next, ApiClient, ResolvedTable, TableProvider};
use crate::utils::format::{format_12h, format_24h, pad, truncate};
use crate::utils::hijri::hijri_or_local;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Shared ──────────────────────────────────────────────────────────────────

/// Saved location with any per-command coordinate override applied.
pub fn effective_location(config: &AppConfig, args: &LocationArgs) -> LocationConfig {
    let mut location = config.location.clone();
    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        location.latitude = lat;
        location.longitude = lng;
        location.name = None;
        location.timezone_offset = None;
    }
    location
}

fn todays_table(
    conn: &Connection,
    client: &ApiClient,
    config: &AppConfig,
    location: &LocationConfig,
    refresh: bool,
) -> Result<ResolvedTable> {
    TableProvider::new(conn, client)
        .refresh(refresh)
        .table_for(Local::now().date_naive(), location, &config.prayer)
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(
    conn: &Connection,
    config: &AppConfig,
    args: &LocationArgs,
    refresh: bool,
) -> Result<()> {
    let client = ApiClient::new();
    let location = effective_location(config, args);
    let resolved = todays_table(conn, &client, config, &location, refresh)?;
    let place = display_name(conn, &location, |lat, lng| client.place_name(lat, lng))?;

    let now = Local::now().naive_local();
    let next = resolve_next(&resolved.table, now);

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {} ({})",
        place,
        resolved.date.format("%Y-%m-%d")
    );
    println_colored!(DIM, "  Source: {}", resolved.source.label());
    println!();

    for (prayer, time) in resolved.table.entries() {
        let line = format!(
            "  {}  {}  {}",
            pad(prayer.display_name(), 9),
            format_24h(time),
            format_12h(time)
        );
        if !next.tomorrow && prayer == next.prayer {
            println_colored!(AMBER, "{}  ◂ next", line);
        } else if resolved.date.and_time(time) <= now {
            println_colored!(DIM, "{}", line);
        } else {
            println_colored!(BOLD, "{}", line);
        }
    }

    println!();
    println_colored!(
        AMBER,
        "  Next: {} at {} — in {}",
        next.name(),
        next.display_time(),
        next.remaining
    );
    println!();
    Ok(())
}

pub fn handle_next(conn: &Connection, config: &AppConfig, args: &LocationArgs) -> Result<()> {
    let client = ApiClient::new();
    let location = effective_location(config, args);
    let resolved = todays_table(conn, &client, config, &location, false)?;
    let next = resolve_next(&resolved.table, Local::now().naive_local());
    println!("{} · {} · {}", next.name(), next.display_time(), next.remaining);
    Ok(())
}

// ─── Hijri ───────────────────────────────────────────────────────────────────

pub fn handle_hijri(config: &AppConfig) -> Result<()> {
    let client = ApiClient::new();
    let hijri = hijri_or_local(
        || client.hijri_today(),
        Local::now().date_naive(),
        config.location.hijri_offset,
    );
    println!("{}", hijri);
    Ok(())
}

// ─── Bookmarks ───────────────────────────────────────────────────────────────

fn parse_kind(kind: &str) -> Result<BookmarkKind> {
    BookmarkKind::from_str(kind)
        .map_err(|_| anyhow!("Unknown type '{}'. Use: surah, dua, ayah", kind))
}

fn default_title(kind: BookmarkKind, reference: &str) -> String {
    match kind {
        BookmarkKind::Surah => format!("Surah {}", reference),
        BookmarkKind::Dua => format!("Dua {}", reference),
        BookmarkKind::Ayah => format!("Ayah {}", reference),
    }
}

/// Whether `kind`/`reference` is bookmarked.
pub fn bookmark_check(conn: &Connection, kind: &str, reference: &str) -> Result<bool> {
    let kind = parse_kind(kind)?;
    BookmarkRepo::is_bookmarked(conn, kind, reference)
}

/// Returns false only for `check` on an item that is not bookmarked.
pub fn handle_bookmark(conn: &Connection, action: &BookmarkCommands) -> Result<bool> {
    match action {
        BookmarkCommands::Add {
            kind,
            reference,
            title,
        } => {
            let kind = parse_kind(kind)?;
            validate_reference(kind, reference)?;
            if BookmarkRepo::is_bookmarked(conn, kind, reference)? {
                println_colored!(DIM, "  Already bookmarked: {} {}", kind, reference);
                return Ok(true);
            }
            let title = title.clone().unwrap_or_else(|| default_title(kind, reference));
            let bookmark = BookmarkRepo::save(conn, kind, &title, reference)?;
            println_colored!(GREEN, "  ✓ Bookmarked {} ({})", bookmark.title, bookmark.id);
        }
        BookmarkCommands::Toggle {
            kind,
            reference,
            title,
        } => {
            let kind = parse_kind(kind)?;
            validate_reference(kind, reference)?;
            let title = title.clone().unwrap_or_else(|| default_title(kind, reference));
            match BookmarkRepo::toggle(conn, kind, &title, reference)? {
                Some(bookmark) => {
                    println_colored!(GREEN, "  ✓ Bookmarked {} ({})", bookmark.title, bookmark.id)
                }
                None => println_colored!(AMBER, "  Removed bookmark for {} {}", kind, reference),
            }
        }
        BookmarkCommands::Remove { id } => {
            if BookmarkRepo::remove(conn, id)? {
                println_colored!(GREEN, "  ✓ Bookmark removed");
            } else {
                println_colored!(RED, "  ✗ No bookmark with id {}", id);
            }
        }
        BookmarkCommands::List { kind, search } => {
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            let query = search.as_deref().unwrap_or("");
            let bookmarks: Vec<_> = BookmarkRepo::all(conn)?
                .into_iter()
                .filter(|b| b.matches(kind, query))
                .collect();

            println!();
            if bookmarks.is_empty() {
                println_colored!(DIM, "  No bookmarks found");
            } else {
                println_colored!(GOLD, "  Bookmarks ({})", bookmarks.len());
                println!();
                for b in &bookmarks {
                    let saved = chrono::DateTime::from_timestamp_millis(b.timestamp)
                        .map(|d| d.with_timezone(&Local).format("%b %-d, %Y").to_string())
                        .unwrap_or_default();
                    println!(
                        "  {}  {}  {}  {}",
                        pad(b.kind.as_str(), 5),
                        pad(&truncate(&b.title, 28), 28),
                        pad(&b.target(), 18),
                        saved
                    );
                    println_colored!(DIM, "         {}", b.id);
                }
            }
            println!();
        }
        BookmarkCommands::Check { kind, reference } => {
            let found = bookmark_check(conn, kind, reference)?;
            println!("{}", if found { "bookmarked" } else { "not bookmarked" });
            return Ok(found);
        }
    }
    Ok(true)
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub fn handle_settings(config: &mut AppConfig, action: &SettingsCommands) -> Result<()> {
    match action {
        SettingsCommands::Show => {
            let path = AppConfig::config_path()?;
            println!();
            println_colored!(GOLD, "  Settings");
            println_colored!(DIM, "  {}", path.display());
            println!();
            let name = config.location.name.as_deref().unwrap_or("(looked up)");
            println!("  location.name              {}", name);
            println!("  location.latitude          {}", config.location.latitude);
            println!("  location.longitude         {}", config.location.longitude);
            let tz = config
                .location
                .timezone_offset
                .map(format_tz_offset)
                .unwrap_or_else(|| "auto (system timezone)".to_string());
            println!("  location.timezone_offset   {}", tz);
            println!("  location.hijri_offset      {}", config.location.hijri_offset);
            println!("  prayer.source              {:?}", config.prayer.source);
            println!("  prayer.calc_method         {}", config.prayer.calc_method);
            println!("  prayer.madhab              {}", config.prayer.madhab);
            println!("  reminders.prayer_reminders {}", config.reminders.prayer_reminders);
            println!("  reminders.bell             {}", config.reminders.bell);
            println!();
        }
        SettingsCommands::Set { key, value } => {
            config
                .set_key(key, value)
                .with_context(|| format!("Setting {}", key))?;
            config.save()?;
            println_colored!(GREEN, "  ✓ {} = {}", key, value);
        }
        SettingsCommands::Reset => {
            *config = AppConfig::default();
            config.save()?;
            println_colored!(GREEN, "  ✓ Settings restored to defaults");
            println_colored!(DIM, "  Known settings: {}", SETTING_KEYS.join(", "));
        }
    }
    Ok(())
}

// ─── Cache ───────────────────────────────────────────────────────────────────

pub fn handle_cache(conn: &Connection, action: &CacheCommands) -> Result<()> {
    match action {
        CacheCommands::Clear => {
            let n = CacheRepo::clear_all(conn)?;
            println_colored!(GREEN, "  ✓ Cleared {} cached day(s)", n);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;

    #[test]
    fn override_replaces_coordinates_and_name() {
        let mut config = AppConfig::default();
        config.location.name = Some("London".to_string());
        config.location.timezone_offset = Some(60);

        let same = effective_location(&config, &LocationArgs::default());
        assert_eq!(same.name.as_deref(), Some("London"));

        let args = LocationArgs {
            lat: Some(21.4225),
            lng: Some(39.8262),
        };
        let moved = effective_location(&config, &args);
        assert_eq!(moved.latitude, 21.4225);
        assert_eq!(moved.longitude, 39.8262);
        assert!(moved.name.is_none());
        assert_eq!(moved.timezone_offset, None);
    }

    #[test]
    fn default_titles() {
        assert_eq!(default_title(BookmarkKind::Ayah, "2:255"), "Ayah 2:255");
        assert_eq!(default_title(BookmarkKind::Surah, "36"), "Surah 36");
    }

    #[test]
    fn kind_errors_list_choices() {
        let err = parse_kind("hadith").unwrap_err().to_string();
        assert!(err.contains("surah, dua, ayah"));
    }

    #[test]
    fn check_reports_membership_without_exiting() {
        let conn = test_conn();
        BookmarkRepo::save(&conn, BookmarkKind::Ayah, "Ayat al-Kursi", "2:255").unwrap();

        assert!(bookmark_check(&conn, "ayah", "2:255").unwrap());
        assert!(!bookmark_check(&conn, "surah", "2").unwrap());
        assert!(bookmark_check(&conn, "hadith", "1").is_err());

        let missing = BookmarkCommands::Check {
            kind: "dua".to_string(),
            reference: "morning-1".to_string(),
        };
        assert!(!handle_bookmark(&conn, &missing).unwrap());
        let present = BookmarkCommands::Check {
            kind: "ayah".to_string(),
            reference: "2:255".to_string(),
        };
        assert!(handle_bookmark(&conn, &present).unwrap());
    }
}
