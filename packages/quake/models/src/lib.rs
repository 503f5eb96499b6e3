#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earthquake feed record and derived value types.
//!
//! [`Event`] mirrors one record of the upstream earthquake feed, where every
//! field arrives as text. The derived types ([`ParsedCoordinate`],
//! [`TimeWindow`], [`Rgb`]) only ever hold validated values.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A single earthquake record as delivered by the feed.
///
/// Field names on the wire are the provider's Indonesian column names;
/// everything is text and is parsed lazily through the accessor methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque unique identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Latitude with hemisphere marker, e.g. `"6.20 LS"`.
    #[serde(rename = "lintang")]
    pub latitude_raw: String,
    /// Longitude with hemisphere marker, e.g. `"106.81 BT"`.
    #[serde(rename = "bujur")]
    pub longitude_raw: String,
    /// Magnitude as decimal text.
    pub magnitude: String,
    /// Depth as decimal text, optionally suffixed with `km`.
    #[serde(rename = "kedalaman")]
    pub depth_km: String,
    /// Free-form place name.
    #[serde(rename = "wilayah")]
    pub region: String,
    /// Date/time of the event.
    #[serde(rename = "datetime")]
    pub timestamp: String,
}

impl Event {
    /// Parses the magnitude. Returns `None` if it is not a finite decimal.
    #[must_use]
    pub fn magnitude_value(&self) -> Option<f64> {
        parse_finite(self.magnitude.trim())
    }

    /// Parses the depth in kilometers, tolerating a trailing `km` unit.
    #[must_use]
    pub fn depth_value(&self) -> Option<f64> {
        let trimmed = self.depth_km.trim();
        let number = trimmed
            .len()
            .checked_sub(2)
            .filter(|&split| {
                trimmed.is_char_boundary(split) && trimmed[split..].eq_ignore_ascii_case("km")
            })
            .map_or(trimmed, |split| trimmed[..split].trim_end());
        parse_finite(number)
    }

    /// Parses the event timestamp. Returns `None` if unparseable.
    #[must_use]
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// The feed dump as stored on disk: either the bare record array or the
/// provider's `{ "data": [...] }` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedResponse {
    /// Provider envelope.
    Envelope {
        /// The records.
        data: Vec<Event>,
    },
    /// Bare record array.
    Records(Vec<Event>),
}

impl FeedResponse {
    /// Unwraps the records regardless of shape.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        match self {
            Self::Envelope { data } | Self::Records(data) => data,
        }
    }
}

/// Parses a feed timestamp into UTC.
///
/// Accepts RFC 3339, ISO 8601 without offset (with or without fractional
/// seconds, `T` or space separated), and bare `YYYY-MM-DD` dates. Values
/// without an offset are interpreted as UTC.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Hemisphere marker attached to a coordinate.
///
/// Parses both the Indonesian two-letter forms used by the feed and the
/// single-letter English forms, case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum Hemisphere {
    /// Lintang utara
    #[strum(to_string = "LU", serialize = "N")]
    North,
    /// Lintang selatan
    #[strum(to_string = "LS", serialize = "S")]
    South,
    /// Bujur timur
    #[strum(to_string = "BT", serialize = "E")]
    East,
    /// Bujur barat
    #[strum(to_string = "BB", serialize = "W")]
    West,
}

impl Hemisphere {
    /// Whether values in this hemisphere carry a negative sign.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::South | Self::West)
    }

    /// Whether this marker belongs on a latitude (as opposed to a longitude).
    #[must_use]
    pub const fn is_latitude(self) -> bool {
        matches!(self, Self::North | Self::South)
    }
}

/// A validated position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCoordinate {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

/// A fixed 7-day slice of time indexed from the configured epoch.
///
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    /// Zero-based week index.
    pub index: u32,
    /// First instant of the window.
    pub start: DateTime<Utc>,
    /// Last instant of the window (`start + 7 days`).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Whether `instant` falls inside the window, inclusive on both ends.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Human-readable range, e.g. `01/09/2024 - 08/09/2024`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Formats as `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use chrono::TimeZone as _;

    use super::*;

    fn event_with(magnitude: &str, depth: &str, timestamp: &str) -> Event {
        Event {
            id: "evt-1".to_string(),
            latitude_raw: "6.20 LS".to_string(),
            longitude_raw: "106.81 BT".to_string(),
            magnitude: magnitude.to_string(),
            depth_km: depth.to_string(),
            region: "Jakarta".to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn deserializes_feed_field_names() {
        let json = r#"{
            "_id": "abc123",
            "lintang": "2.50 LU",
            "bujur": "128.40 BT",
            "magnitude": "5.1",
            "kedalaman": "10 Km",
            "wilayah": "Laut Maluku",
            "datetime": "2024-09-03T04:05:06+00:00"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "abc123");
        assert_eq!(event.latitude_raw, "2.50 LU");
        assert_eq!(event.region, "Laut Maluku");
        assert_eq!(event.depth_value(), Some(10.0));
    }

    #[test]
    fn feed_response_accepts_envelope_and_bare_array() {
        let record = r#"{"_id":"a","lintang":"1 LU","bujur":"2 BT","magnitude":"3",
            "kedalaman":"4","wilayah":"x","datetime":"2024-09-01"}"#;
        let envelope: FeedResponse =
            serde_json::from_str(&format!(r#"{{"data":[{record}]}}"#)).unwrap();
        let bare: FeedResponse = serde_json::from_str(&format!("[{record},{record}]")).unwrap();
        assert_eq!(envelope.into_events().len(), 1);
        assert_eq!(bare.into_events().len(), 2);
    }

    #[test]
    fn parses_magnitude_and_rejects_garbage() {
        assert_eq!(event_with(" 4.7 ", "10", "").magnitude_value(), Some(4.7));
        assert_eq!(event_with("n/a", "10", "").magnitude_value(), None);
        assert_eq!(event_with("NaN", "10", "").magnitude_value(), None);
    }

    #[test]
    fn parses_depth_with_and_without_unit() {
        assert_eq!(event_with("1", "33", "").depth_value(), Some(33.0));
        assert_eq!(event_with("1", "33 km", "").depth_value(), Some(33.0));
        assert_eq!(event_with("1", "33KM", "").depth_value(), Some(33.0));
        assert_eq!(event_with("1", "km", "").depth_value(), None);
        assert_eq!(event_with("1", "", "").depth_value(), None);
    }

    #[test]
    fn parses_supported_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 9, 8, 0, 0, 0).unwrap();
        for raw in [
            "2024-09-08T00:00:00Z",
            "2024-09-08T07:00:00+07:00",
            "2024-09-08T00:00:00",
            "2024-09-08T00:00:00.000",
            "2024-09-08 00:00:00",
            "2024-09-08",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "failed on {raw}");
        }
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn hemisphere_parses_both_vocabularies() {
        assert_eq!(Hemisphere::from_str("LS").unwrap(), Hemisphere::South);
        assert_eq!(Hemisphere::from_str("s").unwrap(), Hemisphere::South);
        assert_eq!(Hemisphere::from_str("bt").unwrap(), Hemisphere::East);
        assert_eq!(Hemisphere::from_str("W").unwrap(), Hemisphere::West);
        assert!(Hemisphere::from_str("X").is_err());
        assert_eq!(Hemisphere::North.to_string(), "LU");
    }

    #[test]
    fn window_contains_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 9, 8, 0, 0, 0).unwrap();
        let window = TimeWindow {
            index: 0,
            start,
            end,
        };
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + chrono::Duration::seconds(1)));
        assert_eq!(window.label(), "01/09/2024 - 08/09/2024");
    }

    #[test]
    fn rgb_formats() {
        let tan = Rgb::new(210, 180, 140);
        assert_eq!(tan.to_string(), "rgb(210,180,140)");
        assert_eq!(tan.to_hex(), "#d2b48c");
    }
}
