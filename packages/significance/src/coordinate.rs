//! Coordinate parsing and great-circle distance.
//!
//! The feed encodes positions as decimal degrees followed (or preceded) by a
//! hemisphere marker, e.g. `"6.20 LS"` / `"106.81 BT"`. This module turns
//! those strings into signed degrees and measures distances between them.

use std::str::FromStr as _;

use quake_map_quake_models::{Hemisphere, ParsedCoordinate};
use strum_macros::{AsRefStr, Display};

/// Mean Earth radius used for all distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate axis, used for range and marker validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Errors raised while parsing coordinate text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    /// Nothing left after trimming whitespace.
    #[error("empty coordinate text")]
    Empty,

    /// Alphabetic text that is not a known hemisphere marker.
    #[error("unknown hemisphere marker '{marker}' in '{raw}'")]
    UnknownHemisphere {
        /// The full input.
        raw: String,
        /// The unrecognized letters.
        marker: String,
    },

    /// The numeric part is not a finite decimal.
    #[error("'{raw}' is not a decimal number")]
    InvalidNumber {
        /// The full input.
        raw: String,
    },

    /// An explicit `+`/`-` together with a hemisphere marker.
    #[error("'{raw}' combines an explicit sign with a hemisphere marker")]
    SignedWithHemisphere {
        /// The full input.
        raw: String,
    },

    /// A latitude marker on a longitude or vice versa.
    #[error("hemisphere marker {hemisphere} is not valid for a {axis} ('{raw}')")]
    AxisMismatch {
        /// The full input.
        raw: String,
        /// The marker found.
        hemisphere: Hemisphere,
        /// The axis being parsed.
        axis: Axis,
    },

    /// Parsed fine but outside `[-90, 90]` / `[-180, 180]`.
    #[error("{axis} {value} is out of range")]
    OutOfRange {
        /// The axis being parsed.
        axis: Axis,
        /// The signed value.
        value: f64,
    },
}

/// Parses a single coordinate into signed decimal degrees.
///
/// South and west markers negate the value; north and east keep it. Text
/// without a marker is parsed as a plain decimal, so already-clean input
/// passes through unchanged.
///
/// # Errors
///
/// Returns [`CoordinateError`] if the text is empty, carries unknown letters,
/// is not a finite decimal, or mixes an explicit sign with a marker.
pub fn parse_coordinate(raw: &str) -> Result<f64, CoordinateError> {
    parse_marked(raw).map(|(value, _)| value)
}

/// Parses a latitude/longitude pair and validates both axes.
///
/// # Errors
///
/// Returns [`CoordinateError`] if either value fails [`parse_coordinate`],
/// carries a marker for the other axis, or is out of range.
pub fn parse_coordinates(
    latitude_raw: &str,
    longitude_raw: &str,
) -> Result<ParsedCoordinate, CoordinateError> {
    let latitude = parse_axis(latitude_raw, Axis::Latitude)?;
    let longitude = parse_axis(longitude_raw, Axis::Longitude)?;
    Ok(ParsedCoordinate {
        latitude,
        longitude,
    })
}

fn parse_axis(raw: &str, axis: Axis) -> Result<f64, CoordinateError> {
    let (value, hemisphere) = parse_marked(raw)?;

    if let Some(hemisphere) = hemisphere {
        if hemisphere.is_latitude() != (axis == Axis::Latitude) {
            return Err(CoordinateError::AxisMismatch {
                raw: raw.to_string(),
                hemisphere,
                axis,
            });
        }
    }

    let limit = match axis {
        Axis::Latitude => 90.0,
        Axis::Longitude => 180.0,
    };
    if value.abs() > limit {
        return Err(CoordinateError::OutOfRange { axis, value });
    }

    Ok(value)
}

fn parse_marked(raw: &str) -> Result<(f64, Option<Hemisphere>), CoordinateError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(CoordinateError::Empty);
    }

    let (number, marker) = split_marker(text);

    let hemisphere = marker
        .map(|marker| {
            Hemisphere::from_str(marker).map_err(|_| CoordinateError::UnknownHemisphere {
                raw: raw.to_string(),
                marker: marker.to_string(),
            })
        })
        .transpose()?;

    if hemisphere.is_some() && number.starts_with(['-', '+']) {
        return Err(CoordinateError::SignedWithHemisphere {
            raw: raw.to_string(),
        });
    }

    let value = number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoordinateError::InvalidNumber {
            raw: raw.to_string(),
        })?;

    let signed = match hemisphere {
        Some(h) if h.is_negative() => -value,
        _ => value,
    };

    Ok((signed, hemisphere))
}

/// Splits trailing (preferred) or leading letters off the numeric part.
fn split_marker(text: &str) -> (&str, Option<&str>) {
    let is_letter = |c: char| c.is_ascii_alphabetic();

    let head = text.trim_end_matches(is_letter);
    if head.len() < text.len() {
        return (head.trim_end(), Some(&text[head.len()..]));
    }

    let tail = text.trim_start_matches(is_letter);
    if tail.len() < text.len() {
        return (tail.trim_start(), Some(&text[..text.len() - tail.len()]));
    }

    (text, None)
}

/// Great-circle distance between two points in kilometers.
#[must_use]
pub fn haversine_km(a: ParsedCoordinate, b: ParsedCoordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
