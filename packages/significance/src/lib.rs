#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weekly earthquake significance map.
//!
//! Slices the event feed into week-long windows from a fixed epoch, clusters
//! each window's events greedily within a fixed radius, and renders every
//! cluster as a circle whose color and size follow its mean magnitude.
//!
//! All functions are pure: they take the already-fetched event list and the
//! selected week as arguments and return fresh values. Clock-dependent
//! operations have an `_at` form that takes `now` explicitly.

pub mod cluster;
pub mod color;
pub mod config;
pub mod coordinate;
pub mod filter;
pub mod window;

use chrono::{DateTime, Utc};
use quake_map_quake_models::{Event, Rgb, TimeWindow};
use serde::Serialize;

pub use cluster::{AssignmentStrategy, Cluster, ClusterError, cluster_events};
pub use color::color_for;
pub use config::{ConfigError, SignificanceConfig};
pub use coordinate::{CoordinateError, haversine_km, parse_coordinate, parse_coordinates};
pub use filter::{EventFilter, EventMarker, markers};
pub use window::WindowError;

/// Errors raised by [`Significance`].
#[derive(Debug, thiserror::Error)]
pub enum SignificanceError {
    /// Week index could not be resolved.
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Clustering rejected its parameters.
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A cluster ready for the map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCluster {
    /// Centroid latitude.
    pub latitude: f64,
    /// Centroid longitude.
    pub longitude: f64,
    /// Number of events in the cluster.
    pub member_count: usize,
    /// Mean magnitude of the members.
    pub mean_magnitude: f64,
    /// Fill color derived from the mean magnitude.
    pub color: Rgb,
    /// Circle radius, `mean_magnitude * radius_scale`.
    pub visual_radius: f64,
    /// Tooltip text.
    pub label: String,
}

impl RenderedCluster {
    fn new(cluster: &Cluster, radius_scale: f64) -> Self {
        let centroid = cluster.centroid();
        let mean_magnitude = cluster.mean_magnitude();
        Self {
            latitude: centroid.latitude,
            longitude: centroid.longitude,
            member_count: cluster.member_count(),
            mean_magnitude,
            color: color_for(mean_magnitude),
            visual_radius: mean_magnitude * radius_scale,
            label: format!("Mean Magnitude: {mean_magnitude:.2}"),
        }
    }
}

/// The rendered significance map for one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySignificance {
    /// The selected window.
    pub window: TimeWindow,
    /// Number of selectable windows at the time of the call.
    pub total_windows: u32,
    /// Number of events inside the window, before coordinate validation.
    pub event_count: usize,
    /// Clusters in creation order.
    pub clusters: Vec<RenderedCluster>,
}

/// Composes windowing, clustering and color mapping for the significance map.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Significance {
    config: SignificanceConfig,
}

impl Significance {
    /// Creates an orchestrator from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SignificanceError::Config`] if the radius or scale is unusable.
    pub fn new(config: SignificanceConfig) -> Result<Self, SignificanceError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &SignificanceConfig {
        &self.config
    }

    /// Instant at which week 0 starts.
    #[must_use]
    pub fn epoch(&self) -> DateTime<Utc> {
        window::epoch_start(self.config.epoch_start)
    }

    /// Number of selectable weeks at `now`.
    #[must_use]
    pub fn total_windows_at(&self, now: DateTime<Utc>) -> u32 {
        window::total_windows(self.epoch(), now)
    }

    /// Every selectable week at `now`, oldest first.
    #[must_use]
    pub fn windows_at(&self, now: DateTime<Utc>) -> Vec<TimeWindow> {
        (0..self.total_windows_at(now))
            .map_while(|index| window::compute_window(self.epoch(), index).ok())
            .collect()
    }

    /// Resolves `week` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::OutOfRange`] if `week` is not a selectable week.
    pub fn window_at(&self, week: u32, now: DateTime<Utc>) -> Result<TimeWindow, WindowError> {
        window::checked_window(self.epoch(), week, now)
    }

    /// Resolves `week` against the current time.
    ///
    /// # Errors
    ///
    /// See [`Self::window_at`].
    pub fn window(&self, week: u32) -> Result<TimeWindow, WindowError> {
        self.window_at(week, Utc::now())
    }

    /// Builds the significance map for `week` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SignificanceError::Window`] for an unselectable week, or
    /// [`SignificanceError::Cluster`] if clustering rejects the radius.
    pub fn clusters_at(
        &self,
        events: &[Event],
        week: u32,
        now: DateTime<Utc>,
    ) -> Result<WeeklySignificance, SignificanceError> {
        let window = self.window_at(week, now)?;
        let selected = window::select_events(events, &window);
        let event_count = selected.len();

        let clusters = cluster_events(selected, self.config.radius_km, self.config.strategy)?;

        log::debug!(
            "Week {week} ({}): {event_count} events, {} clusters",
            window.label(),
            clusters.len()
        );

        Ok(WeeklySignificance {
            window,
            total_windows: self.total_windows_at(now),
            event_count,
            clusters: clusters
                .iter()
                .map(|c| RenderedCluster::new(c, self.config.radius_scale))
                .collect(),
        })
    }

    /// Builds the significance map for `week` against the current time.
    ///
    /// # Errors
    ///
    /// See [`Self::clusters_at`].
    pub fn clusters(
        &self,
        events: &[Event],
        week: u32,
    ) -> Result<WeeklySignificance, SignificanceError> {
        self.clusters_at(events, week, Utc::now())
    }
}
