//! Border-aware route planning for Waymark.
//!
//! This crate provides [`BorderAwarePlanner`], the default implementation of
//! the [`RoutePlanner`](waymark_core::RoutePlanner) trait. A segment is first
//! requested directly; when the answer strays outside the territory and the
//! segment looks like a likely border crossing, the planner asks again through
//! backbone waypoints and keeps whichever candidate is more compliant.
//!
//! Multi-stop trips are planned by brute force over every visiting order.
//! With at most four destinations that is 24 requests, each one a single
//! routing-engine call with waypoints inserted on crossing legs.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod permutations;
mod planner;
mod requester;

pub use config::PlannerConfig;
pub use permutations::Permutations;
pub use planner::BorderAwarePlanner;
pub use requester::RouteRequester;
