//! HTTP routing engine adapter.
//!
//! This module provides [`GraphHopperRouteProvider`], an implementation of
//! [`waymark_core::RouteProvider`] that asks a GraphHopper-compatible Routing
//! API for a path through an ordered list of points.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use waymark_data::routing::{GraphHopperConfig, GraphHopperRouteProvider};
//!
//! let config = GraphHopperConfig::new("http://localhost:8989")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_user_agent("my-app/1.0");
//! let provider = GraphHopperRouteProvider::with_config(config)?;
//! # Ok::<(), waymark_data::ProviderBuildError>(())
//! ```

mod graphhopper;
mod provider;

pub use provider::{DEFAULT_USER_AGENT, GraphHopperConfig, GraphHopperRouteProvider};
