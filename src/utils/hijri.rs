use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

fn hijri_month_name(month: usize) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        "Unknown"
    }
}

pub struct HijriInfo {
    pub day: usize,
    pub year: usize,
    pub month_name: String,
}

impl HijriInfo {
    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_name, self.year)
    }
}

pub fn to_hijri(date: NaiveDate) -> Result<HijriInfo> {
    let hd = HijriDate::from_gr(
        date.year() as usize,
        date.month() as usize,
        date.day() as usize,
    )
    .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;

    Ok(HijriInfo {
        day: hd.day(),
        year: hd.year(),
        month_name: hijri_month_name(hd.month()).to_string(),
    })
}

/// Local (tabular) Hijri date for `date`, shifted by `offset_days` for
/// local moon sighting. Used when the online conversion is unavailable.
pub fn local_hijri_string(date: NaiveDate, offset_days: i32) -> String {
    let adjusted = date + Duration::days(offset_days as i64);

    match to_hijri(adjusted) {
        Ok(info) => info.formatted(),
        Err(e) => {
            log::warn!("Hijri conversion for {} failed: {}", adjusted, e);
            let hd = HijriDate::today();
            format!("{} {} {}", hd.day(), hijri_month_name(hd.month()), hd.year())
        }
    }
}

/// Online Hijri date when `fetch` succeeds, local conversion otherwise.
pub fn hijri_or_local<F>(fetch: F, date: NaiveDate, offset_days: i32) -> String
where
    F: FnOnce() -> Result<String>,
{
    match fetch() {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Fetching Hijri date failed, converting locally: {:#}", e);
            local_hijri_string(date, offset_days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_are_one_based() {
        assert_eq!(hijri_month_name(1), "Muharram");
        assert_eq!(hijri_month_name(9), "Ramadan");
        assert_eq!(hijri_month_name(12), "Dhu al-Hijjah");
        assert_eq!(hijri_month_name(0), "Unknown");
        assert_eq!(hijri_month_name(13), "Unknown");
    }

    #[test]
    fn converts_a_known_year() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let info = to_hijri(date).unwrap();
        assert_eq!(info.year, 1448);
        assert!(HIJRI_MONTH_NAMES.contains(&info.month_name.as_str()));
    }

    #[test]
    fn offset_shifts_by_days() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let base = local_hijri_string(date, 0);
        let shifted = local_hijri_string(date, 1);
        assert_eq!(local_hijri_string(date + Duration::days(1), 0), shifted);
        assert_ne!(base, shifted);
    }

    #[test]
    fn online_value_preferred_over_local() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let online = hijri_or_local(|| Ok("6 Jumādá al-ūlá 1448".to_string()), date, 0);
        assert_eq!(online, "6 Jumādá al-ūlá 1448");

        let offline = hijri_or_local(|| Err(anyhow::anyhow!("timed out")), date, 0);
        assert_eq!(offline, local_hijri_string(date, 0));
    }
}
