//! A [CostField] is a Dijkstra map radiating out from a single destination.
//! Each tile of the grid is described by several layers:
//!
//! - `g` the settled cost of travelling from the tile to the destination
//! - `h` the straight-line distance to the origin of the current query
//! - `p` the cost of the neighbour the tile would step to
//! - `s` the fewest number of steps from the destination
//! - the visitation [TileState]
//!
//! Layers are stored as flat arrays indexed with
//! [GridDimensions::get_flat_index].
//!

pub mod boundary;
pub mod cost_field;
pub mod expansion;
pub mod frontier;
pub mod route;
pub mod tile_cost;

use bevy::prelude::{Component, Reflect};

use crate::prelude::*;

/// A value for every tile of the grid
#[derive(Clone, Debug, PartialEq)]
pub struct FieldLayer<T: Copy> {
	/// Size of the grid the layer covers
	dimensions: GridDimensions,
	/// One value per tile
	values: Vec<T>,
}

impl<T: Copy> FieldLayer<T> {
	/// Create a layer with every tile set to `value`
	pub fn new(dimensions: GridDimensions, value: T) -> Self {
		FieldLayer {
			dimensions,
			values: vec![value; dimensions.get_volume()],
		}
	}
	/// Retrieve the value of a tile
	pub fn get(&self, tile: Tile) -> T {
		self.values[self.dimensions.get_flat_index(tile)]
	}
	/// Set the value of a tile
	pub fn set(&mut self, tile: Tile, value: T) {
		let index = self.dimensions.get_flat_index(tile);
		self.values[index] = value;
	}
	/// Set every tile to `value`
	pub fn fill(&mut self, value: T) {
		self.values.fill(value);
	}
	/// Iterate over the tiles and their values
	pub fn iter(&self) -> impl Iterator<Item = (Tile, T)> + '_ {
		self.values
			.iter()
			.enumerate()
			.map(|(i, v)| (self.dimensions.get_tile_from_index(i), *v))
	}
}

/// Visitation state of a tile within a [CostField]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileState {
	/// Never reached by the expansion
	#[default]
	Unvisited,
	/// Reached, the cost is tentative and the tile sits in the frontier
	Open,
	/// Settled with a finite cost
	Accessible,
	/// The tile can never be entered by this mover
	Impassable,
	/// The tile cannot reach the destination, or lies outside of a limited
	/// search
	Inaccessible,
}

impl TileState {
	/// Will further expansion of the field leave this tile untouched
	pub fn is_settled(&self) -> bool {
		matches!(
			self,
			TileState::Accessible | TileState::Impassable | TileState::Inaccessible
		)
	}
}

/// Result of expanding a [CostField] towards an origin
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionOutcome {
	/// The origin has been settled
	PathFound,
	/// The origin or destination can never be entered by the mover
	TargetInaccessible,
	/// The origin is proven to be unreachable
	NoPathExists,
	/// The search ended without settling the origin, e.g. because its
	/// domain was limited
	PathNotFound,
}

/// Which part of the grid the previous expansion was allowed to explore
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchDomain {
	/// Whole grid, the settled values are reusable by any query
	#[default]
	Absolute,
	/// Limited to the previous query, the field has to be rebuilt
	Relative,
}

/// Why a route could not be produced
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
	/// Origin or destination lies outside of the grid
	#[error("origin or destination is outside of the grid")]
	OutOfBounds,
	/// Origin and destination are further apart than the settings allow
	#[error("origin and destination are further apart than the maximum distance")]
	BeyondMaxDistance,
	/// The origin or destination can never be entered by the mover
	#[error("the target cannot be entered")]
	TargetInaccessible,
	/// The origin is proven to be unreachable
	#[error("no path exists")]
	NoPathExists,
	/// The limited search could not reach the origin
	#[error("no path found within the search limits")]
	PathNotFound,
	/// The cheapest path costs more than the settings allow
	#[error("path cost exceeds the limit")]
	ExceedsCostLimit,
	/// The path needs more steps than the settings allow
	#[error("path length exceeds the limit")]
	ExceedsStepLimit,
	/// A tile along the path had no cheaper neighbour to step to
	#[error("no descending step from {0:?}")]
	NoDescendingStep(Tile),
}

impl ExpansionOutcome {
	/// The error to report to a caller asking for a route, `None` when the
	/// route can be built
	pub fn as_route_error(&self) -> Option<RouteError> {
		match self {
			ExpansionOutcome::PathFound => None,
			ExpansionOutcome::TargetInaccessible => Some(RouteError::TargetInaccessible),
			ExpansionOutcome::NoPathExists => Some(RouteError::NoPathExists),
			ExpansionOutcome::PathNotFound => Some(RouteError::PathNotFound),
		}
	}
}

/// An ordered sequence of tiles from an origin to a destination, inserted as
/// a component on actors by the plugin. An empty route means that no path
/// could be found
#[derive(Component, Clone, Debug, Default, PartialEq, Reflect)]
pub struct Route {
	/// Tiles to walk through, starting with the origin
	tiles: Vec<Tile>,
	/// Total cost of the steps taken
	cost: f32,
}

impl Route {
	/// Create a new instance of [Route]
	pub fn new(tiles: Vec<Tile>, cost: f32) -> Self {
		Route { tiles, cost }
	}
	/// Get the tiles of the route
	pub fn get_tiles(&self) -> &[Tile] {
		&self.tiles
	}
	/// Get the total cost of the route
	pub fn get_cost(&self) -> f32 {
		self.cost
	}
	/// Number of tiles in the route, including the origin
	pub fn len(&self) -> usize {
		self.tiles.len()
	}
	/// Is the route empty
	pub fn is_empty(&self) -> bool {
		self.tiles.is_empty()
	}
	/// Consume the route returning its tiles
	pub fn into_tiles(self) -> Vec<Tile> {
		self.tiles
	}
}
