//! Route provider abstraction.
//!
//! The [`RouteProvider`] trait hides the routing engine behind a synchronous
//! call that turns an ordered list of points into a [`RoutePath`](crate::RoutePath).
//! Adapters for real engines live in `waymark-data`; deterministic doubles
//! live in [`crate::test_support`] behind the `test-support` feature.

mod error;
mod provider;

pub use error::RouteError;
pub use provider::RouteProvider;
