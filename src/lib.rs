//! This is a plugin for Bevy game engine to answer pathfinding queries over 3D tile grids with incremental, cacheable Dijkstra maps
//!

pub mod dijkstra;
pub mod error;
pub mod plugin;

pub mod prelude;
