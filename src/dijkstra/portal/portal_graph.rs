//! Stairways are paired with the nearest stairway leading the other way on
//! the adjacent level, searching outwards ring by ring up to
//! [STAIRS_SEARCH_RADIUS] tiles away. The pair produces an edge in both
//! directions:
//!
//! ```text
//!  level 1              level 0
//!  ______________       ______________
//! |__|__|__|__|__|     |__|__|__|__|__|
//! |__|__|__|v_|__|  <> |__|__|__|__|__|
//! |__|__|__|__|__|     |__|__|^_|__|__|
//! |__|__|__|__|__|     |__|__|__|__|__|
//! ```
//!
//! A ramp produces a one-way edge to the tile directly above or below it.
//! Ramp edges are instant, they cost no more than an ordinary step, stairs
//! add the stair cost of the mover.
//!

use std::collections::BTreeMap;

use bevy::{
	log::debug,
	prelude::{Reflect, Resource},
};

use crate::prelude::*;

/// The kind of connection a [PortalEdge] makes
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum PortalKind {
	/// A stairway, carries a traversal cost
	Stairs,
	/// A ramp, no extra cost
	Ramp,
}

/// A one-way connection from `entry` to `exit`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub struct PortalEdge {
	/// Tile the mover steps from
	entry: Tile,
	/// Tile the mover arrives on
	exit: Tile,
	/// Kind of connection
	kind: PortalKind,
}

impl PortalEdge {
	/// Create a new instance of [PortalEdge]
	pub fn new(entry: Tile, exit: Tile, kind: PortalKind) -> Self {
		PortalEdge { entry, exit, kind }
	}
	/// Get the tile the mover steps from
	pub fn get_entry(&self) -> Tile {
		self.entry
	}
	/// Get the tile the mover arrives on
	pub fn get_exit(&self) -> Tile {
		self.exit
	}
	/// Get the kind of connection
	pub fn get_kind(&self) -> PortalKind {
		self.kind
	}
	/// Does the edge carry no extra traversal penalty
	pub fn is_instant(&self) -> bool {
		self.kind == PortalKind::Ramp
	}
	/// Can the mover use the edge
	pub fn is_usable_by(&self, profile: &CapabilityProfile) -> bool {
		match self.kind {
			PortalKind::Ramp => true,
			PortalKind::Stairs => profile.can_use_stairs(),
		}
	}
}

/// Every [PortalEdge] of the grid indexed by both of its ends
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Resource, Clone, Debug, Default)]
pub struct PortalGraph {
	/// Edges keyed by their entry tile
	leaving: BTreeMap<Tile, Vec<PortalEdge>>,
	/// Edges keyed by their exit tile
	leading_to: BTreeMap<Tile, Vec<PortalEdge>>,
}

impl PortalGraph {
	/// Create a new instance of [PortalGraph] by scanning the grid
	pub fn new<G: TileGrid>(grid: &G) -> Self {
		let mut graph = PortalGraph::default();
		graph.reset_graph(grid);
		graph
	}
	/// Replaces the current graph with a fresh scan of the grid
	pub fn reset_graph<G: TileGrid>(&mut self, grid: &G) -> &mut Self {
		self.leaving.clear();
		self.leading_to.clear();
		let dimensions = grid.get_dimensions();
		for tile in dimensions.iter_tiles() {
			let flags = grid.get_terrain_flags(tile);
			if flags.contains(TerrainFlags::STAIRS_UP) {
				if let Some(partner) =
					find_stairs_partner(grid, tile.step(Ordinal::Up), TerrainFlags::STAIRS_DOWN)
				{
					self.insert_edge(PortalEdge::new(tile, partner, PortalKind::Stairs));
					self.insert_edge(PortalEdge::new(partner, tile, PortalKind::Stairs));
				}
			}
			if flags.contains(TerrainFlags::STAIRS_DOWN) {
				if let Some(partner) =
					find_stairs_partner(grid, tile.step(Ordinal::Down), TerrainFlags::STAIRS_UP)
				{
					self.insert_edge(PortalEdge::new(tile, partner, PortalKind::Stairs));
					self.insert_edge(PortalEdge::new(partner, tile, PortalKind::Stairs));
				}
			}
			if flags.contains(TerrainFlags::RAMP_UP) {
				let above = tile.step(Ordinal::Up);
				if dimensions.contains(above) {
					self.insert_edge(PortalEdge::new(tile, above, PortalKind::Ramp));
				}
			}
			if flags.contains(TerrainFlags::RAMP_DOWN) {
				let below = tile.step(Ordinal::Down);
				if dimensions.contains(below) {
					self.insert_edge(PortalEdge::new(tile, below, PortalKind::Ramp));
				}
			}
		}
		debug!("Portal graph rebuilt with {} edges", self.len());
		self
	}
	/// Add an edge, returns `false` if it was already present
	pub fn insert_edge(&mut self, edge: PortalEdge) -> bool {
		let leaving = self.leaving.entry(edge.entry).or_default();
		if leaving.contains(&edge) {
			return false;
		}
		leaving.push(edge);
		self.leading_to.entry(edge.exit).or_default().push(edge);
		true
	}
	/// Edges a mover standing on `entry` could take
	pub fn get_edges_leaving(&self, entry: Tile) -> &[PortalEdge] {
		self.leaving.get(&entry).map(|v| v.as_slice()).unwrap_or(&[])
	}
	/// Edges arriving on `exit`
	pub fn get_edges_leading_to(&self, exit: Tile) -> &[PortalEdge] {
		self.leading_to
			.get(&exit)
			.map(|v| v.as_slice())
			.unwrap_or(&[])
	}
	/// Is the tile either end of any edge
	pub fn is_endpoint(&self, tile: Tile) -> bool {
		self.leaving.contains_key(&tile) || self.leading_to.contains_key(&tile)
	}
	/// Total number of edges
	pub fn len(&self) -> usize {
		self.leaving.values().map(|v| v.len()).sum()
	}
	/// Does the graph have no edges
	pub fn is_empty(&self) -> bool {
		self.leaving.is_empty()
	}
	/// Iterate over every edge
	pub fn iter(&self) -> impl Iterator<Item = &PortalEdge> {
		self.leaving.values().flatten()
	}
}

/// Nearest tile around `centre` on its level carrying `flag`
fn find_stairs_partner<G: TileGrid>(grid: &G, centre: Tile, flag: TerrainFlags) -> Option<Tile> {
	let dimensions = grid.get_dimensions();
	if !dimensions.contains(centre) {
		return None;
	}
	centre
		.get_closest_points_first(STAIRS_SEARCH_RADIUS)
		.into_iter()
		.filter(|t| dimensions.contains(*t))
		.find(|t| grid.get_terrain_flags(*t).contains(flag))
}
