//! Date, magnitude and depth filtering for the per-event map.
//!
//! Every bound is optional and inclusive. A bound on a field the event
//! cannot parse excludes the event; unbounded fields are never parsed.

use chrono::{DateTime, Utc};
use quake_map_quake_models::Event;
use serde::{Deserialize, Serialize};

use crate::coordinate::parse_coordinates;

/// Optional inclusive bounds applied to raw events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    /// Earliest timestamp.
    pub from: Option<DateTime<Utc>>,
    /// Latest timestamp.
    pub to: Option<DateTime<Utc>>,
    /// Smallest magnitude.
    pub min_magnitude: Option<f64>,
    /// Largest magnitude.
    pub max_magnitude: Option<f64>,
    /// Shallowest depth in kilometers.
    pub min_depth_km: Option<f64>,
    /// Deepest depth in kilometers.
    pub max_depth_km: Option<f64>,
}

impl EventFilter {
    /// Whether `event` satisfies every configured bound.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        within(self.from, self.to, || event.occurred_at())
            && within(self.min_magnitude, self.max_magnitude, || {
                event.magnitude_value()
            })
            && within(self.min_depth_km, self.max_depth_km, || event.depth_value())
    }

    /// Returns the matching events in input order.
    pub fn apply<'a, I>(&self, events: I) -> Vec<&'a Event>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        events.into_iter().filter(|e| self.matches(e)).collect()
    }
}

fn within<T: PartialOrd>(
    min: Option<T>,
    max: Option<T>,
    value: impl FnOnce() -> Option<T>,
) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value() else {
        return false;
    };
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}

/// One marker on the per-event map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMarker {
    /// Event id.
    pub id: String,
    /// Place name.
    pub region: String,
    /// Signed latitude.
    pub latitude: f64,
    /// Signed longitude.
    pub longitude: f64,
    /// Parsed magnitude, if valid.
    pub magnitude: Option<f64>,
    /// Parsed depth in kilometers, if valid.
    pub depth_km: Option<f64>,
    /// Parsed timestamp, if valid.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Builds one marker per event with valid coordinates.
pub fn markers<'a, I>(events: I) -> Vec<EventMarker>
where
    I: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .filter_map(|event| {
            match parse_coordinates(&event.latitude_raw, &event.longitude_raw) {
                Ok(position) => Some(EventMarker {
                    id: event.id.clone(),
                    region: event.region.clone(),
                    latitude: position.latitude,
                    longitude: position.longitude,
                    magnitude: event.magnitude_value(),
                    depth_km: event.depth_value(),
                    occurred_at: event.occurred_at(),
                }),
                Err(e) => {
                    log::warn!(
                        "Skipping marker for event {}: '{}' '{}' ({e})",
                        event.id,
                        event.latitude_raw,
                        event.longitude_raw
                    );
                    None
                }
            }
        })
        .collect()
}
