//! Mean magnitude to marker color.
//!
//! Colors darken linearly from tan at magnitude 0 to black at magnitude 10.

use quake_map_quake_models::Rgb;

/// Color of a magnitude-0 cluster.
pub const BASE_COLOR: Rgb = Rgb::new(210, 180, 140);

/// Magnitude at which the color reaches black.
pub const MAX_MAGNITUDE: f64 = 10.0;

/// Magnitudes labelled on the map legend.
pub const LEGEND_STOPS: [f64; 3] = [3.0, 6.0, 9.0];

/// Maps a cluster's mean magnitude to its fill color.
///
/// Negative, NaN and infinite magnitudes render as [`BASE_COLOR`].
#[must_use]
pub fn color_for(mean_magnitude: f64) -> Rgb {
    let factor = if mean_magnitude.is_finite() && mean_magnitude > 0.0 {
        (mean_magnitude / MAX_MAGNITUDE).min(1.0)
    } else {
        0.0
    };

    Rgb::new(
        darken(BASE_COLOR.r, factor),
        darken(BASE_COLOR.g, factor),
        darken(BASE_COLOR.b, factor),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn darken(channel: u8, factor: f64) -> u8 {
    // factor is in [0, 1], so the result stays within 0..=channel.
    (f64::from(channel) * (1.0 - factor)).round() as u8
}

/// Legend entries as `(magnitude, color)` pairs.
#[must_use]
pub fn legend() -> Vec<(f64, Rgb)> {
    LEGEND_STOPS.iter().map(|&m| (m, color_for(m))).collect()
}
