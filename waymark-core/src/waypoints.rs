//! Backbone waypoint selection and the border-crossing pre-check.
//!
//! When a direct route between two points strays across the border, the
//! planner asks the routing engine again with intermediate stops taken from
//! the territory's backbone of safe cities. [`WaypointSelector`] picks those
//! stops and decides whether trying is worthwhile at all.

use crate::{GeoPoint, TerritoryConfig};

/// Chooses backbone waypoints for a segment.
///
/// # Examples
/// ```
/// use waymark_core::{GeoPoint, TerritoryConfig, WaypointSelector};
///
/// let territory = TerritoryConfig::vietnam();
/// let selector = WaypointSelector::new(&territory);
/// let hanoi = GeoPoint::new_unchecked(21.0285, 105.8542);
/// let saigon = GeoPoint::new_unchecked(10.7769, 106.7009);
///
/// let waypoints = selector.select_waypoints(hanoi, saigon, 3);
/// assert_eq!(waypoints.len(), 3);
/// assert!(!waypoints.contains(&hanoi));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WaypointSelector<'a> {
    territory: &'a TerritoryConfig,
}

impl<'a> WaypointSelector<'a> {
    /// Create a selector over `territory`'s backbone.
    #[must_use]
    pub const fn new(territory: &'a TerritoryConfig) -> Self {
        Self { territory }
    }

    /// Select at most `max_count` backbone points between `start` and `end`.
    ///
    /// Short segments get nothing. Otherwise the backbone run between the
    /// points nearest each endpoint is taken in travel order, points within
    /// the endpoint clearance are dropped, and the remainder is thinned to an
    /// evenly spread subset.
    #[must_use]
    pub fn select_waypoints(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        max_count: usize,
    ) -> Vec<GeoPoint> {
        if max_count == 0 || start.degree_distance(&end) < self.territory.short_route_threshold {
            return Vec::new();
        }
        let (Some(start_index), Some(end_index)) =
            (self.nearest_index(start), self.nearest_index(end))
        else {
            return Vec::new();
        };
        let run = self.backbone_run(start_index, end_index);
        let clearance = self.territory.endpoint_clearance;
        let clear: Vec<GeoPoint> = run
            .into_iter()
            .filter(|point| {
                point.degree_distance(&start) > clearance && point.degree_distance(&end) > clearance
            })
            .collect();
        let selected = spread(&clear, max_count);
        log::debug!(
            "selected {} of {} backbone waypoints between {start} and {end}",
            selected.len(),
            clear.len()
        );
        selected
    }

    /// Cheap heuristic for whether a direct route may leave the territory.
    ///
    /// True when the segment's midpoint falls inside the danger zone and the
    /// latitude span exceeds the configured minimum.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "midpoint and span are float math")]
    pub fn is_route_likely_crossing_border(&self, start: GeoPoint, end: GeoPoint) -> bool {
        let midpoint =
            GeoPoint::new_unchecked((start.lat + end.lat) / 2.0, (start.lon + end.lon) / 2.0);
        self.territory.danger_zone.contains(midpoint)
            && (start.lat - end.lat).abs() > self.territory.min_lat_span
    }

    fn nearest_index(&self, point: GeoPoint) -> Option<usize> {
        self.territory
            .backbone
            .iter()
            .enumerate()
            .map(|(index, candidate)| (index, candidate.degree_distance(&point)))
            .min_by(|left, right| left.1.total_cmp(&right.1))
            .map(|(index, _)| index)
    }

    fn backbone_run(&self, start_index: usize, end_index: usize) -> Vec<GeoPoint> {
        let backbone = &self.territory.backbone;
        if start_index < end_index {
            backbone
                .get(start_index..=end_index)
                .map(<[GeoPoint]>::to_vec)
                .unwrap_or_default()
        } else {
            backbone
                .get(end_index..=start_index)
                .map(|run| run.iter().rev().copied().collect())
                .unwrap_or_default()
        }
    }
}

/// Keep `max_count` evenly spaced points, preserving order.
fn spread(points: &[GeoPoint], max_count: usize) -> Vec<GeoPoint> {
    if points.len() <= max_count {
        return points.to_vec();
    }
    let divisor = max_count.saturating_add(1);
    (1..=max_count)
        .filter_map(|slot| {
            slot.saturating_mul(points.len())
                .checked_div(divisor)
                .and_then(|index| points.get(index).copied())
        })
        .collect()
}
