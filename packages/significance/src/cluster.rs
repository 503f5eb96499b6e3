//! Greedy single-pass radius clustering.
//!
//! Events are visited in input order. Each one joins an existing cluster
//! whose *current* centroid is within the radius, or seeds a new cluster.
//! Joining moves the centroid to the running mean of all members, so later
//! distance checks see the shifted centroid. The result therefore depends on
//! input order, and clusters are never merged or revisited afterwards.
//!
//! Every event is compared against every cluster formed so far, which is
//! `O(n * k)`. That is fine for a week of events on one map and is not meant
//! for larger datasets. A spatial index would change which cluster an event
//! lands in, so it is deliberately not used here.

use quake_map_quake_models::{Event, ParsedCoordinate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::coordinate::{haversine_km, parse_coordinates};

/// How an event picks among several clusters within range.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Scan clusters in creation order and join the first one in range.
    #[default]
    FirstWithinRadius,
    /// Join the closest cluster in range; ties go to the older cluster.
    NearestWithinRadius,
}

/// Errors raised by [`cluster_events`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ClusterError {
    /// Radius is negative, NaN or infinite.
    #[error("cluster radius must be a finite, non-negative number of kilometers, got {radius_km}")]
    InvalidRadius {
        /// The rejected radius.
        radius_km: f64,
    },
}

/// A group of nearby events sharing a running centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    centroid: ParsedCoordinate,
    member_ids: Vec<String>,
    member_magnitudes: Vec<f64>,
    total_magnitude: f64,
}

impl Cluster {
    fn seed(id: &str, position: ParsedCoordinate, magnitude: f64) -> Self {
        Self {
            centroid: position,
            member_ids: vec![id.to_string()],
            member_magnitudes: vec![magnitude],
            total_magnitude: magnitude,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn add(&mut self, id: &str, position: ParsedCoordinate, magnitude: f64) {
        let before = self.member_count() as f64;
        let after = before + 1.0;

        self.centroid.latitude = self
            .centroid
            .latitude
            .mul_add(before, position.latitude)
            / after;
        self.centroid.longitude = self
            .centroid
            .longitude
            .mul_add(before, position.longitude)
            / after;

        self.member_ids.push(id.to_string());
        self.member_magnitudes.push(magnitude);
        self.total_magnitude += magnitude;
    }

    /// Running mean position of the members.
    #[must_use]
    pub const fn centroid(&self) -> ParsedCoordinate {
        self.centroid
    }

    /// Number of members. Always at least 1.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.member_magnitudes.len()
    }

    /// Member magnitudes in insertion order.
    #[must_use]
    pub fn member_magnitudes(&self) -> &[f64] {
        &self.member_magnitudes
    }

    /// Member event ids in insertion order.
    #[must_use]
    pub fn member_ids(&self) -> &[String] {
        &self.member_ids
    }

    /// Sum of member magnitudes.
    #[must_use]
    pub const fn total_magnitude(&self) -> f64 {
        self.total_magnitude
    }

    /// Mean member magnitude. NaN if any member had no usable magnitude.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_magnitude(&self) -> f64 {
        self.total_magnitude / self.member_count() as f64
    }
}

/// Clusters `events` greedily within `radius_km` of each cluster's centroid.
///
/// Events whose coordinates cannot be parsed are logged and skipped. An event
/// with valid coordinates but an unparseable magnitude still joins a cluster
/// and contributes NaN to its magnitudes.
///
/// # Errors
///
/// Returns [`ClusterError::InvalidRadius`] if `radius_km` is negative or not
/// finite.
pub fn cluster_events<'a, I>(
    events: I,
    radius_km: f64,
    strategy: AssignmentStrategy,
) -> Result<Vec<Cluster>, ClusterError>
where
    I: IntoIterator<Item = &'a Event>,
{
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(ClusterError::InvalidRadius { radius_km });
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut seen = 0_usize;
    let mut skipped = 0_usize;

    for event in events {
        seen += 1;

        let position = match parse_coordinates(&event.latitude_raw, &event.longitude_raw) {
            Ok(position) => position,
            Err(e) => {
                log::warn!(
                    "Invalid earthquake coordinates for event {}: '{}' '{}' ({e})",
                    event.id,
                    event.latitude_raw,
                    event.longitude_raw
                );
                skipped += 1;
                continue;
            }
        };

        let magnitude = event.magnitude_value().unwrap_or_else(|| {
            log::warn!(
                "Event {} has invalid magnitude '{}'",
                event.id,
                event.magnitude
            );
            f64::NAN
        });

        match find_cluster(&clusters, position, radius_km, strategy) {
            Some(idx) => clusters[idx].add(&event.id, position, magnitude),
            None => clusters.push(Cluster::seed(&event.id, position, magnitude)),
        }
    }

    log::debug!(
        "Clustered {} of {seen} events into {} clusters ({skipped} skipped)",
        seen - skipped,
        clusters.len()
    );

    Ok(clusters)
}

fn find_cluster(
    clusters: &[Cluster],
    position: ParsedCoordinate,
    radius_km: f64,
    strategy: AssignmentStrategy,
) -> Option<usize> {
    let mut in_range = clusters
        .iter()
        .enumerate()
        .map(|(idx, cluster)| (idx, haversine_km(position, cluster.centroid)))
        .filter(|&(_, distance)| distance <= radius_km);

    match strategy {
        AssignmentStrategy::FirstWithinRadius => in_range.next().map(|(idx, _)| idx),
        AssignmentStrategy::NearestWithinRadius => in_range
            .fold(None, |best: Option<(usize, f64)>, (idx, distance)| match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((idx, distance)),
            })
            .map(|(idx, _)| idx),
    }
}
