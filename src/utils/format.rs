use chrono::{NaiveTime, Timelike};

/// Parse a 24-hour "HH:MM" time of day. Seconds are not accepted.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
}

/// Format a NaiveTime as 12-hour "H:MM AM/PM" ("12:05 AM", "12:00 PM")
pub fn format_12h(t: NaiveTime) -> String {
    let (pm, hour) = t.hour12();
    format!("{}:{:02} {}", hour, t.minute(), if pm { "PM" } else { "AM" })
}

/// Format a NaiveTime to "HH:MM"
pub fn format_24h(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Truncate to at most `width` display columns, appending "…" when cut
pub fn truncate(s: &str, width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Right-pad to `width` display columns
pub fn pad(s: &str, width: usize) -> String {
    use unicode_width::UnicodeWidthStr;

    let w = s.width();
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}
