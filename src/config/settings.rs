use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, Local, NaiveDate, NaiveTime, TimeZone};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::prayer_times::calculator::{CALC_METHODS, MADHABS};

fn default_latitude() -> f64 {
    51.5074
}
fn default_longitude() -> f64 {
    -0.1278
}
fn default_calc_method() -> String {
    "NorthAmerica".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Display name. When unset, the name is looked up from the coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Fixed minutes from UTC for the offline calculation. Unset follows
    /// the system timezone, including daylight saving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone_offset: Option<i32>,
    /// Days to add/subtract from the local Hijri date for moon sighting.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: None,
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone_offset: None,
            hijri_offset: default_hijri_offset(),
        }
    }
}

impl LocationConfig {
    /// Minutes from UTC on `date`: the fixed offset when configured,
    /// otherwise the system timezone's offset at local noon.
    pub fn utc_offset_minutes(&self, date: NaiveDate) -> i32 {
        if let Some(minutes) = self.timezone_offset {
            return minutes;
        }
        let noon = date.and_time(NaiveTime::MIN) + Duration::hours(12);
        match Local.from_local_datetime(&noon).earliest() {
            Some(dt) => dt.offset().local_minus_utc() / 60,
            None => {
                log::warn!("No local time for {}, assuming UTC", noon);
                0
            }
        }
    }
}

/// Where the daily table comes from first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePreference {
    /// aladhan.com, then offline calculation, then the built-in table
    #[default]
    Api,
    /// Offline calculation, then the built-in table
    Offline,
}

impl std::str::FromStr for SourcePreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(SourcePreference::Api),
            "offline" => Ok(SourcePreference::Offline),
            _ => Err(anyhow!("Unknown source '{}'. Use: api, offline", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerConfig {
    #[serde(default)]
    pub source: SourcePreference,
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
}

impl Default for PrayerConfig {
    fn default() -> Self {
        Self {
            source: SourcePreference::default(),
            calc_method: default_calc_method(),
            madhab: default_madhab(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Show a banner on the dashboard when a prayer time begins
    #[serde(default = "default_true")]
    pub prayer_reminders: bool,
    /// Ring the terminal bell with the banner
    #[serde(default = "default_true")]
    pub bell: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            prayer_reminders: true,
            bell: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub prayer: PrayerConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

/// Keys accepted by `settings set`.
pub const SETTING_KEYS: &[&str] = &[
    "location.name",
    "location.latitude",
    "location.longitude",
    "location.timezone_offset",
    "location.hijri_offset",
    "prayer.source",
    "prayer.calc_method",
    "prayer.madhab",
    "reminders.prayer_reminders",
    "reminders.bell",
];

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "ramadhan")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("ramadhan.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Apply one `section.field = value` change, validating the value.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "location.name" => {
                let v = value.trim();
                self.location.name = if v.is_empty() { None } else { Some(v.to_string()) };
            }
            "location.latitude" => {
                self.location.latitude = parse_latitude(value)?;
            }
            "location.longitude" => {
                self.location.longitude = parse_longitude(value)?;
            }
            "location.timezone_offset" => {
                let v = value.trim();
                self.location.timezone_offset = if v.is_empty() || v.eq_ignore_ascii_case("auto") {
                    None
                } else {
                    Some(parse_tz_offset(v).with_context(|| format!("Bad UTC offset '{}'", value))?)
                };
            }
            "location.hijri_offset" => {
                let days: i32 = value.parse().context("Hijri offset must be whole days")?;
                if !(-2..=2).contains(&days) {
                    bail!("Hijri offset must be between -2 and 2 days");
                }
                self.location.hijri_offset = days;
            }
            "prayer.source" => {
                self.prayer.source = value.parse()?;
            }
            "prayer.calc_method" => {
                if !CALC_METHODS.iter().any(|(m, _)| *m == value) {
                    let names: Vec<&str> = CALC_METHODS.iter().map(|(m, _)| *m).collect();
                    bail!("Unknown method '{}'. Use one of: {}", value, names.join(", "));
                }
                self.prayer.calc_method = value.to_string();
            }
            "prayer.madhab" => {
                if !MADHABS.contains(&value) {
                    bail!("Unknown madhab '{}'. Use one of: {}", value, MADHABS.join(", "));
                }
                self.prayer.madhab = value.to_string();
            }
            "reminders.prayer_reminders" => {
                self.reminders.prayer_reminders = parse_bool(value)?;
            }
            "reminders.bell" => {
                self.reminders.bell = parse_bool(value)?;
            }
            _ => bail!(
                "Unknown setting '{}'. Known settings: {}",
                key,
                SETTING_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

pub fn parse_latitude(s: &str) -> Result<f64> {
    let lat: f64 = s.trim().parse().context("Latitude must be a number")?;
    if !(-90.0..=90.0).contains(&lat) {
        bail!("Latitude must be between -90 and 90");
    }
    Ok(lat)
}

pub fn parse_longitude(s: &str) -> Result<f64> {
    let lng: f64 = s.trim().parse().context("Longitude must be a number")?;
    if !(-180.0..=180.0).contains(&lng) {
        bail!("Longitude must be between -180 and 180");
    }
    Ok(lng)
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(anyhow!("Expected true/false, got '{}'", s)),
    }
}

/// Parse a UTC offset string into total minutes.
/// Accepts: "5:30", "+5:30", "-5:30", "5", "+5", "5.5"
pub fn parse_tz_offset(s: &str) -> Result<i32> {
    let s = s.trim().trim_start_matches('+');
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-');
    let sign = if negative { -1 } else { 1 };

    let minutes = if s.contains(':') {
        let mut parts = s.splitn(2, ':');
        let hours: i32 = parts.next().unwrap_or("0").parse()?;
        let mins: i32 = parts.next().unwrap_or("0").parse()?;
        hours * 60 + mins
    } else if s.contains('.') {
        let hours: f64 = s.parse()?;
        (hours * 60.0).round() as i32
    } else {
        let hours: i32 = s.parse()?;
        hours * 60
    };

    if minutes > 14 * 60 {
        bail!("UTC offset out of range");
    }
    Ok(sign * minutes)
}

/// Format total minutes as "+H:MM" string
pub fn format_tz_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let abs = minutes.abs();
    let h = abs / 60;
    let m = abs % 60;
    if m == 0 {
        format!("{}{}", sign, h)
    } else {
        format!("{}{}:{:02}", sign, h, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.location.latitude, 51.5074);
        assert_eq!(config.location.longitude, -0.1278);
        assert_eq!(config.prayer.calc_method, "NorthAmerica");
        assert_eq!(config.prayer.source, SourcePreference::Api);
        assert!(config.location.name.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[location]\nname = \"Leeds\"\n\n[prayer]\nsource = \"offline\"\n")
            .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.location.name.as_deref(), Some("Leeds"));
        assert_eq!(config.location.latitude, 51.5074);
        assert_eq!(config.prayer.source, SourcePreference::Offline);
        assert_eq!(config.prayer.madhab, "Shafi");
        assert!(config.reminders.prayer_reminders);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.set_key("location.name", "Istanbul").unwrap();
        config.set_key("location.latitude", "41.0082").unwrap();
        config.set_key("location.longitude", "28.9784").unwrap();
        config.set_key("prayer.calc_method", "Turkey").unwrap();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.location.name.as_deref(), Some("Istanbul"));
        assert_eq!(loaded.location.latitude, 41.0082);
        assert_eq!(loaded.prayer.calc_method, "Turkey");
    }

    #[test]
    fn set_key_validates() {
        let mut config = AppConfig::default();
        assert!(config.set_key("location.latitude", "91").is_err());
        assert!(config.set_key("location.longitude", "east").is_err());
        assert!(config.set_key("prayer.calc_method", "Martian").is_err());
        assert!(config.set_key("prayer.madhab", "Zahiri").is_err());
        assert!(config.set_key("prayer.source", "carrier-pigeon").is_err());
        assert!(config.set_key("reminders.bell", "maybe").is_err());
        assert!(config.set_key("theme.color", "rose").is_err());

        config.set_key("reminders.bell", "off").unwrap();
        assert!(!config.reminders.bell);
        config.set_key("location.timezone_offset", "+5:30").unwrap();
        assert_eq!(config.location.timezone_offset, Some(330));
        config.set_key("location.timezone_offset", "auto").unwrap();
        assert_eq!(config.location.timezone_offset, None);
        config.set_key("location.name", "").unwrap();
        assert!(config.location.name.is_none());
    }

    #[test]
    fn every_listed_key_is_settable() {
        let samples = [
            ("location.name", "Cairo"),
            ("location.latitude", "30.0444"),
            ("location.longitude", "31.2357"),
            ("location.timezone_offset", "2"),
            ("location.hijri_offset", "-1"),
            ("prayer.source", "offline"),
            ("prayer.calc_method", "Egyptian"),
            ("prayer.madhab", "Hanafi"),
            ("reminders.prayer_reminders", "false"),
            ("reminders.bell", "true"),
        ];
        assert_eq!(samples.len(), SETTING_KEYS.len());
        let mut config = AppConfig::default();
        for (key, value) in samples {
            assert!(SETTING_KEYS.contains(&key));
            config.set_key(key, value).unwrap();
        }
    }

    #[test]
    fn configured_offset_wins_over_system_timezone() {
        let july = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let fixed = LocationConfig {
            timezone_offset: Some(330),
            ..LocationConfig::default()
        };
        assert_eq!(fixed.utc_offset_minutes(july), 330);

        let expected = Local
            .from_local_datetime(&july.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap()
            .offset()
            .local_minus_utc()
            / 60;
        assert_eq!(LocationConfig::default().utc_offset_minutes(july), expected);
    }

    #[test]
    fn coordinate_ranges() {
        assert_eq!(parse_latitude("-33.9").unwrap(), -33.9);
        assert_eq!(parse_longitude(" 151.2 ").unwrap(), 151.2);
        assert!(parse_latitude("90.5").is_err());
        assert!(parse_longitude("-181").is_err());
        assert!(parse_latitude("north").is_err());
    }

    #[test]
    fn tz_offsets() {
        assert_eq!(parse_tz_offset("5:30").unwrap(), 330);
        assert_eq!(parse_tz_offset("-3").unwrap(), -180);
        assert_eq!(parse_tz_offset("5.75").unwrap(), 345);
        assert!(parse_tz_offset("20").is_err());
        assert_eq!(format_tz_offset(330), "+5:30");
        assert_eq!(format_tz_offset(-180), "-3");
    }
}
