//! Dijkstra maps are a means of answering many pathfinding queries towards
//! the same destination.
//!
//! [The Incredible Power of Dijkstra Maps](https://www.roguebasin.com/index.php/The_Incredible_Power_of_Dijkstra_Maps)
//!
//! [Amit's A* Pages](https://theory.stanford.edu/~amitp/GameProgramming/)
//!
//! [Moore neighbour tracing](https://www.imageprocessingplace.com/downloads_V3/root_downloads/tutorials/contour_tracing_Abeer_George_Ghuneim/moore.html)
//!
//! Rather than searching from an actor to its goal a [fields::cost_field::CostField]
//! grows outwards from the goal. Every tile the wavefront settles stores the
//! cost of walking from it to the goal, so once an actor's tile has been
//! settled its route is found by stepping downhill. Different actors heading
//! to the same goal share the same field and each of their queries only pushes
//! the wavefront as far as it needs to go.
//!
//! The map is a 3D grid of tiles, levels are stacked on `z` and within a level
//! tiles are indexed from the top-left corner:
//!
//! ```text
//!  level 1                   level 0
//!  ______________________    ______________________
//! |__|__|__|__|__|__|__|__| |__|__|__|__|__|__|__|__|
//! |__|__|v_|__|__|__|__|__| |__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__| |__|__|^_|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__| |__|__|__|__|__|__|__|__|
//! ```
//!
//! Definitions:
//!
//! * Tile - a grid position `(x, y, z)`
//! * Capability profile - what a mover is able to do (bash, climb, open doors, fly, use stairs) and what it costs them
//! * Cost field - the Dijkstra map of a single destination for a single capability profile
//! * Frontier - tiles discovered but not yet settled, biased towards the origin of the current query
//! * Portal - a connection between two tiles that are not neighbours, stairs and ramps
//! * Boundary culler - spots when the origin is sealed inside settled tiles and drops the rest of the frontier
//! * Route - tiles from an origin to the destination, built by walking downhill through a cost field
//!
//! A [cache::CostFieldCache] holds the fields between queries. It has no idea
//! when the map changes so it must be cleared whenever terrain, obstacles or
//! actors move.
//!

pub mod cache;
pub mod capability;
pub mod cost;
pub mod fields;
pub mod grid;
pub mod portal;
pub mod settings;
pub mod utilities;
