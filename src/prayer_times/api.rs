use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use ureq::Agent;

use crate::prayer_times::table::RawTimings;

const ALADHAN_BASE: &str = "https://api.aladhan.com/v1";
const NOMINATIM_REVERSE: &str = "https://nominatim.openstreetmap.org/reverse";
const USER_AGENT: &str = concat!("ramadhan/", env!("CARGO_PKG_VERSION"));
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Query for one day of timings.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingsQuery {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub method: u8,
    pub school: u8,
}

/// Source of raw daily timings. The HTTP client is the only production
/// implementation.
pub trait TimingsFetcher {
    fn fetch_timings(&self, query: &TimingsQuery) -> Result<RawTimings>;
}

// ─── aladhan payloads ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: u16,
    status: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T> {
        if self.code != 200 || self.status != "OK" {
            return Err(anyhow!("aladhan returned {} {}", self.code, self.status));
        }
        self.data.ok_or_else(|| anyhow!("aladhan response has no data"))
    }
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: RawTimings,
}

#[derive(Debug, Deserialize)]
struct HijriData {
    hijri: HijriPayload,
}

#[derive(Debug, Deserialize)]
struct HijriPayload {
    day: String,
    month: HijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct HijriMonth {
    en: String,
}

#[derive(Debug, Deserialize)]
struct ReversePayload {
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
}

impl Address {
    fn place_name(self) -> Option<String> {
        self.city.or(self.town).or(self.village).or(self.county)
    }
}

fn parse_timings(body: &str) -> Result<RawTimings> {
    let envelope: Envelope<TimingsData> =
        serde_json::from_str(body).context("Parsing aladhan timings")?;
    Ok(envelope.into_data()?.timings)
}

fn parse_hijri(body: &str) -> Result<String> {
    let envelope: Envelope<HijriData> =
        serde_json::from_str(body).context("Parsing aladhan gToH")?;
    let hijri = envelope.into_data()?.hijri;
    let day = hijri.day.trim_start_matches('0');
    Ok(format!("{} {} {}", day, hijri.month.en, hijri.year))
}

fn parse_place_name(body: &str) -> Result<Option<String>> {
    let payload: ReversePayload =
        serde_json::from_str(body).context("Parsing reverse geocoding response")?;
    Ok(payload.address.and_then(Address::place_name))
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Blocking client for aladhan.com and Nominatim, every call bounded by
/// [`REQUEST_TIMEOUT`].
pub struct ApiClient {
    agent: Agent,
}

impl ApiClient {
    pub fn new() -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        Self {
            agent: Agent::new_with_config(config),
        }
    }

    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        log::debug!("GET {} {:?}", url, query);
        // Nominatim rejects requests without an identifying agent
        let mut request = self.agent.get(url).header("User-Agent", USER_AGENT);
        for (key, value) in query {
            request = request.query(*key, value);
        }
        let mut response = request
            .call()
            .with_context(|| format!("Requesting {}", url))?;
        response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("Reading response from {}", url))
    }

    /// Today's Hijri date as "{day} {month} {year}".
    pub fn hijri_today(&self) -> Result<String> {
        let body = self.get_text(&format!("{}/gToH", ALADHAN_BASE), &[])?;
        parse_hijri(&body)
    }

    /// City, town, village or county at the coordinates, if any.
    pub fn place_name(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let body = self.get_text(
            NOMINATIM_REVERSE,
            &[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ],
        )?;
        parse_place_name(&body)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingsFetcher for ApiClient {
    fn fetch_timings(&self, query: &TimingsQuery) -> Result<RawTimings> {
        let url = format!(
            "{}/timings/{}",
            ALADHAN_BASE,
            query.date.format("%d-%m-%Y")
        );
        let body = self.get_text(
            &url,
            &[
                ("latitude", query.latitude.to_string()),
                ("longitude", query.longitude.to_string()),
                ("method", query.method.to_string()),
                ("school", query.school.to_string()),
            ],
        )?;
        parse_timings(&body)
    }
}
