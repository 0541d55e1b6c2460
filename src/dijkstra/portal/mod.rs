//! A portal joins two tiles that are not neighbours, a stairway between two
//! levels or a ramp leading up or down.
//!
//! The [portal_graph::PortalGraph] is scanned from the grid whenever the map
//! is loaded and is shared by every [crate::prelude::CostField].

pub mod portal_graph;
