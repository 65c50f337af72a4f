//! Parsers for the panel's status chips: volume, brightness, upcoming
//! calendar events and weather.
//!
//! Each parser takes the raw output of a shell command and never fails:
//! garbage in gives the chip's fallback value out.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Highest volume the slider allows, in percent.
pub const MAX_VOLUME: u8 = 150;

/// Brightness shown when the reading cannot be parsed.
pub const DEFAULT_BRIGHTNESS: u8 = 50;

/// Upcoming events shown in the calendar card.
pub const MAX_EVENTS: usize = 2;

/// Volume in percent from `pactl get-sink-volume` output.
///
/// Takes the first `N%` on the first line (the front-left channel) and
/// clamps it to `0..=150`.  No match reads as 0.
pub fn parse_volume(raw: &str) -> u8 {
    let line = raw.lines().next().unwrap_or("");
    let pct = first_percentage(line).unwrap_or(0);
    pct.min(u64::from(MAX_VOLUME)) as u8
}

fn first_percentage(line: &str) -> Option<u64> {
    let bytes = line.as_bytes();
    let mut start = None;
    for (i, b) in bytes.iter().enumerate() {
        match (b.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (true, Some(_)) => {}
            (false, Some(s)) => {
                if *b == b'%' {
                    // all digits, so only overflow can fail
                    return Some(line[s..i].parse().unwrap_or(u64::MAX));
                }
                start = None;
            }
            (false, None) => {}
        }
    }
    None
}

/// Brightness in percent from `brightnessctl -m` output.
///
/// The machine-readable line is `device,class,current,percent%,max`; the
/// fourth field is used.  Anything unparseable gives
/// [`DEFAULT_BRIGHTNESS`].
pub fn parse_brightness(raw: &str) -> u8 {
    let field = raw
        .lines()
        .next()
        .and_then(|line| line.split(',').nth(3))
        .unwrap_or("");
    let cleaned: String = field.chars().filter(|c| *c != '%' && *c != ' ').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n.round().clamp(0.0, 100.0) as u8,
        _ => DEFAULT_BRIGHTNESS,
    }
}

/// One entry of `khal list --json title --json start-time`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "start-time")]
    pub start_time: Option<String>,
}

/// The next [`MAX_EVENTS`] events from khal's JSON array.
///
/// Output that is not a JSON array yields no events.  Entries that are not
/// objects with string fields are skipped.
pub fn parse_events(raw: &str) -> Vec<CalendarEvent> {
    let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        Err(e) => {
            debug!("events: not JSON ({})", e);
            return Vec::new();
        }
    };
    let serde_json::Value::Array(items) = value else {
        debug!("events: expected a JSON array");
        return Vec::new();
    };
    items
        .into_iter()
        .take(MAX_EVENTS)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Weather card contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Weather {
    pub temp: String,
    pub icon: String,
    pub desc: String,
}

impl Default for Weather {
    /// Shown until the first reading (or the cache) arrives.
    fn default() -> Self {
        Self {
            temp: "--".into(),
            icon: "☁".into(),
            desc: "Loading...".into(),
        }
    }
}

impl Weather {
    /// Shown when the weather script printed something unusable.
    pub fn error() -> Self {
        Self {
            temp: "--".into(),
            icon: String::new(),
            desc: "Error".into(),
        }
    }
}

/// Shortenings applied to the description, first match only, in order.
const DESC_REWRITES: &[(&str, &str)] = &[
    ("overcast clouds", "Overcast"),
    ("scattered clouds", "Scattered"),
    ("broken clouds", "Cloudy"),
    ("few clouds", "Few Clouds"),
    ("thunderstorm with", "T-Storm &"),
    ("thunderstorm", "T-Storm"),
    ("shower rain", "Showers"),
    ("shower snow", "Snow Showers"),
    ("drizzle rain", "Drizzle"),
    ("rain and snow", "Rain & Snow"),
    ("intensity", ""),
    ("moderate", ""),
    ("heavy", "Hvy."),
    ("light", "Lt."),
];

/// Parse the weather script's JSON object (`temp`, `icon`, `desc`).
///
/// `temp` may be a number or a string.  The description is shortened so
/// it fits the card, e.g. `"heavy intensity rain"` becomes `"Hvy. rain"`.
pub fn parse_weather(raw: &str) -> Weather {
    let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        Err(e) => {
            debug!("weather: not JSON ({})", e);
            return Weather::error();
        }
    };
    let Some(obj) = value.as_object() else {
        return Weather::error();
    };
    let desc = match obj.get("desc") {
        None | Some(serde_json::Value::Null) => "",
        Some(serde_json::Value::String(s)) => s.as_str(),
        Some(_) => return Weather::error(),
    };
    Weather {
        temp: scalar_text(obj.get("temp")).unwrap_or_else(|| "--".into()),
        icon: scalar_text(obj.get("icon")).unwrap_or_default(),
        desc: shorten_desc(desc),
    }
}

fn scalar_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn shorten_desc(desc: &str) -> String {
    let mut d = desc.to_string();
    for (pattern, replacement) in DESC_REWRITES {
        // ASCII lowercasing keeps byte offsets aligned with `d`
        if let Some(at) = d.to_ascii_lowercase().find(pattern) {
            d.replace_range(at..at + pattern.len(), replacement);
        }
    }
    d.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The last reading the weather script cached, or the loading placeholder.
pub fn cached_weather(path: &Path) -> Weather {
    match std::fs::read_to_string(path) {
        Ok(raw) => parse_weather(&raw),
        Err(_) => {
            info!("no weather cache at {}, waiting for the script", path.display());
            Weather::default()
        }
    }
}
