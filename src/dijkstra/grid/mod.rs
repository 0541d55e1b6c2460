//! The pathfinder never owns the world. Anything implementing [TileGrid] can
//! be searched, the trait exposes the handful of queries needed to cost a
//! tile for a given [crate::prelude::CapabilityProfile]:
//!
//! - base move cost of entering a tile, `0` meaning it cannot be walked onto
//! - terrain features (rough, sharp, traps, doors, ledges, stairs, ramps...)
//! - obstacles that could be bashed, climbed or opened
//! - whether a blocking actor currently stands on a tile
//!
//! [TileMap] is an in-memory implementation that can be loaded from disk and
//! is handy for tests and simple games.
//!

pub mod tile_map;

use bevy::reflect::Reflect;

use crate::prelude::*;

/// Source of terrain information for a 3D tile grid
pub trait TileGrid {
	/// Size of the grid
	fn get_dimensions(&self) -> GridDimensions;
	/// Base cost of moving onto the tile, `0` when it cannot be entered
	/// without dealing with an obstacle first
	fn get_move_cost(&self, tile: Tile) -> u32;
	/// Terrain features of the tile
	fn get_terrain_flags(&self, tile: Tile) -> TerrainFlags;
	/// Is the tile exposed to the outside (used by doors that only open from
	/// the inside)
	fn is_outside(&self, tile: Tile) -> bool;
	/// How easily a mover of the given strength could bash the terrain of the
	/// tile. `10` is trivially, `1` is barely and anything below `1` is not
	/// at all
	fn get_bash_rating(&self, bash_strength: u32, tile: Tile) -> i32;
	/// Vehicle part obstructing the tile, if any
	fn get_vehicle_obstacle(&self, tile: Tile, bash_strength: u32) -> Option<VehicleObstacle>;
	/// Is a blocking actor standing on the tile
	fn has_blocking_actor(&self, tile: Tile) -> bool;
	/// Lowest non-zero move cost of any tile, `None` when no tile can be
	/// walked onto
	fn get_lowest_move_cost(&self) -> Option<u32> {
		self.get_dimensions()
			.iter_tiles()
			.map(|tile| self.get_move_cost(tile))
			.filter(|cost| *cost > 0)
			.min()
	}
	/// Can a mover step directly from `from` into the adjacent tile `to`.
	/// Used to forbid individual transitions such as squeezing diagonally
	/// between two walls
	fn is_valid_move(&self, _from: Tile, _to: Tile) -> bool {
		true
	}
}

/// Terrain features of a tile stored as a bit set
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub struct TerrainFlags(u16);

impl TerrainFlags {
	/// No features
	pub const NONE: TerrainFlags = TerrainFlags(0);
	/// Hard going underfoot
	pub const ROUGH: TerrainFlags = TerrainFlags(1 << 0);
	/// Harmful to walk through
	pub const SHARP: TerrainFlags = TerrainFlags(1 << 1);
	/// Contains a known trap
	pub const TRAP: TerrainFlags = TerrainFlags(1 << 2);
	/// Can be climbed over
	pub const CLIMBABLE: TerrainFlags = TerrainFlags(1 << 3);
	/// A closed door
	pub const DOOR: TerrainFlags = TerrainFlags(1 << 4);
	/// The door can only be opened from the inside
	pub const OPENS_FROM_INSIDE: TerrainFlags = TerrainFlags(1 << 5);
	/// Open air, nothing to stand on
	pub const NO_FLOOR: TerrainFlags = TerrainFlags(1 << 6);
	/// Stairway leading up
	pub const STAIRS_UP: TerrainFlags = TerrainFlags(1 << 7);
	/// Stairway leading down
	pub const STAIRS_DOWN: TerrainFlags = TerrainFlags(1 << 8);
	/// Ramp leading up
	pub const RAMP_UP: TerrainFlags = TerrainFlags(1 << 9);
	/// Ramp leading down
	pub const RAMP_DOWN: TerrainFlags = TerrainFlags(1 << 10);

	/// Create flags from raw bits
	pub const fn from_bits(bits: u16) -> Self {
		TerrainFlags(bits)
	}
	/// Get the raw bits
	pub const fn get_bits(&self) -> u16 {
		self.0
	}
	/// Are all the features of `other` present
	pub const fn contains(&self, other: TerrainFlags) -> bool {
		self.0 & other.0 == other.0
	}
	/// Add the features of `other`
	pub fn insert(&mut self, other: TerrainFlags) {
		self.0 |= other.0;
	}
	/// Remove the features of `other`
	pub fn remove(&mut self, other: TerrainFlags) {
		self.0 &= !other.0;
	}
}

impl std::ops::BitOr for TerrainFlags {
	type Output = TerrainFlags;
	fn bitor(self, rhs: Self) -> Self::Output {
		TerrainFlags(self.0 | rhs.0)
	}
}

/// A vehicle part blocking a tile
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehicleObstacle {
	/// The part is a door that could be opened
	is_door: bool,
	/// The door only opens from the inside
	opens_from_inside_only: bool,
	/// Hits needed to destroy the part, `0` when it cannot be destroyed
	hits_to_destroy: u32,
}

impl VehicleObstacle {
	/// Create a new instance of [VehicleObstacle]
	pub fn new(is_door: bool, opens_from_inside_only: bool, hits_to_destroy: u32) -> Self {
		VehicleObstacle {
			is_door,
			opens_from_inside_only,
			hits_to_destroy,
		}
	}
	/// Is the part a door
	pub fn is_door(&self) -> bool {
		self.is_door
	}
	/// Does the door only open from the inside
	pub fn opens_from_inside_only(&self) -> bool {
		self.opens_from_inside_only
	}
	/// Get the number of hits needed to destroy the part
	pub fn get_hits_to_destroy(&self) -> u32 {
		self.hits_to_destroy
	}
}
