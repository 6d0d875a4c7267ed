//! Route provider trait for ordered point sequences.

use std::sync::Arc;

use crate::{GeoPoint, RoutePath, VehicleProfile};

use super::error::RouteError;

/// Ask a routing engine for a path through `points` in order.
///
/// Implementations make at most one upstream request per call and never
/// retry; callers decide whether a transient failure is worth repeating.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use waymark_core::{GeoPoint, RouteError, RoutePath, RouteProvider, VehicleProfile};
///
/// struct Teleport;
///
/// impl RouteProvider for Teleport {
///     fn request_route(
///         &self,
///         points: &[GeoPoint],
///         _profile: VehicleProfile,
///     ) -> Result<RoutePath, RouteError> {
///         if points.len() < 2 {
///             return Err(RouteError::InvalidInput {
///                 message: "need two points".to_owned(),
///             });
///         }
///         Ok(RoutePath::new(points.to_vec(), 0.0, Duration::ZERO))
///     }
/// }
///
/// let points = [GeoPoint::new_unchecked(10.0, 106.0), GeoPoint::new_unchecked(11.0, 106.0)];
/// let path = Teleport.request_route(&points, VehicleProfile::Car)?;
/// assert_eq!(path.polyline.len(), 2);
/// # Ok::<(), RouteError>(())
/// ```
pub trait RouteProvider {
    /// Route through `points` using `profile`.
    ///
    /// Implementations should return [`RouteError::InvalidInput`] for fewer
    /// than two points rather than contacting the engine.
    fn request_route(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError>;
}

impl<T: RouteProvider + ?Sized> RouteProvider for &T {
    fn request_route(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError> {
        (**self).request_route(points, profile)
    }
}

impl<T: RouteProvider + ?Sized> RouteProvider for Arc<T> {
    fn request_route(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError> {
        (**self).request_route(points, profile)
    }
}

impl<T: RouteProvider + ?Sized> RouteProvider for Box<T> {
    fn request_route(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError> {
        (**self).request_route(points, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::test_support::StraightLineRouteProvider;

    #[rstest]
    fn references_and_boxes_delegate() {
        let provider = StraightLineRouteProvider::default();
        let points = [
            GeoPoint::new_unchecked(10.0, 106.0),
            GeoPoint::new_unchecked(10.0, 107.0),
        ];
        let direct = provider
            .request_route(&points, VehicleProfile::Car)
            .expect("direct route");
        let boxed: Box<dyn RouteProvider> = Box::new(provider);
        let via_box = boxed
            .request_route(&points, VehicleProfile::Car)
            .expect("boxed route");
        assert_eq!(direct, via_box);
    }

    #[rstest]
    fn single_point_is_rejected() {
        let provider = StraightLineRouteProvider::default();
        let by_ref: &dyn RouteProvider = &provider;
        let err = by_ref
            .request_route(&[GeoPoint::new_unchecked(10.0, 106.0)], VehicleProfile::Car)
            .expect_err("one point cannot be routed");
        assert!(matches!(err, RouteError::InvalidInput { .. }));
    }
}
