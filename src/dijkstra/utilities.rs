//! Useful structures and tools used by the fields
//!

use bevy::reflect::Reflect;

/// How far away (Chebyshev distance) a stairway looks for its partner on the
/// adjacent z-level
pub const STAIRS_SEARCH_RADIUS: i32 = 10;

/// A position within the 3D grid. `x` increases eastwards, `y` increases
/// southwards (rows are counted from the top of a level) and `z` increases
/// upwards
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct Tile {
	/// Column
	x: i32,
	/// Row
	y: i32,
	/// Level
	z: i32,
}

impl Tile {
	/// Create a new instance of [Tile]
	pub const fn new(x: i32, y: i32, z: i32) -> Self {
		Tile { x, y, z }
	}
	/// Get the column
	pub fn get_x(&self) -> i32 {
		self.x
	}
	/// Get the row
	pub fn get_y(&self) -> i32 {
		self.y
	}
	/// Get the level
	pub fn get_z(&self) -> i32 {
		self.z
	}
	/// Get the tile displaced by the given amounts
	pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Tile {
		Tile::new(self.x + dx, self.y + dy, self.z + dz)
	}
	/// Get the neighbouring tile in the given direction
	pub fn step(&self, ordinal: Ordinal) -> Tile {
		let (dx, dy, dz) = ordinal.get_offset();
		self.offset(dx, dy, dz)
	}
	/// Straight-line distance between two tiles. Levels are treated as one
	/// tile apart
	pub fn euclidean_distance(&self, other: &Tile) -> f32 {
		let dx = (self.x - other.x) as f32;
		let dy = (self.y - other.y) as f32;
		let dz = (self.z - other.z) as f32;
		(dx * dx + dy * dy + dz * dz).sqrt()
	}
	/// The number of king-moves required to travel between two tiles
	pub fn chebyshev_distance(&self, other: &Tile) -> i32 {
		(self.x - other.x)
			.abs()
			.max((self.y - other.y).abs())
			.max((self.z - other.z).abs())
	}
	/// Tiles on the same level as `self` ordered by increasing Chebyshev
	/// distance, ring by ring, up to and including `radius`. The first entry
	/// is `self`
	pub fn get_closest_points_first(&self, radius: i32) -> Vec<Tile> {
		let mut points = vec![*self];
		for ring in 1..=radius {
			for dx in -ring..=ring {
				points.push(self.offset(dx, -ring, 0));
			}
			for dy in (-ring + 1)..=ring {
				points.push(self.offset(ring, dy, 0));
			}
			for dx in (-ring..ring).rev() {
				points.push(self.offset(dx, ring, 0));
			}
			for dy in ((-ring + 1)..ring).rev() {
				points.push(self.offset(-ring, dy, 0));
			}
		}
		points
	}
}

/// The directions of movement between adjacent tiles. Cardinal and diagonal
/// moves stay on the same level, [Ordinal::Up] and [Ordinal::Down] are only
/// available to fliers
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum Ordinal {
	North,
	NorthEast,
	East,
	SouthEast,
	South,
	SouthWest,
	West,
	NorthWest,
	Up,
	Down,
}

/// Every direction, lateral ones first
const ALL_ORDINALS: [Ordinal; 10] = [
	Ordinal::North,
	Ordinal::NorthEast,
	Ordinal::East,
	Ordinal::SouthEast,
	Ordinal::South,
	Ordinal::SouthWest,
	Ordinal::West,
	Ordinal::NorthWest,
	Ordinal::Up,
	Ordinal::Down,
];

impl Ordinal {
	/// The directions a mover may step in, the 8 lateral directions and
	/// vertical ones when it can fly
	pub fn get_movement_directions(can_fly: bool) -> &'static [Ordinal] {
		if can_fly {
			&ALL_ORDINALS
		} else {
			&ALL_ORDINALS[..8]
		}
	}
	/// Unit displacement `(x, y, z)` of the direction
	pub fn get_offset(&self) -> (i32, i32, i32) {
		match self {
			Ordinal::North => (0, -1, 0),
			Ordinal::NorthEast => (1, -1, 0),
			Ordinal::East => (1, 0, 0),
			Ordinal::SouthEast => (1, 1, 0),
			Ordinal::South => (0, 1, 0),
			Ordinal::SouthWest => (-1, 1, 0),
			Ordinal::West => (-1, 0, 0),
			Ordinal::NorthWest => (-1, -1, 0),
			Ordinal::Up => (0, 0, 1),
			Ordinal::Down => (0, 0, -1),
		}
	}
	/// Is the direction a diagonal on the same level
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Ordinal::NorthEast | Ordinal::SouthEast | Ordinal::SouthWest | Ordinal::NorthWest
		)
	}
	/// Is the direction a change of level
	pub fn is_vertical(&self) -> bool {
		matches!(self, Ordinal::Up | Ordinal::Down)
	}
	/// The direction pointing the other way
	pub fn inverse(&self) -> Ordinal {
		match self {
			Ordinal::North => Ordinal::South,
			Ordinal::NorthEast => Ordinal::SouthWest,
			Ordinal::East => Ordinal::West,
			Ordinal::SouthEast => Ordinal::NorthWest,
			Ordinal::South => Ordinal::North,
			Ordinal::SouthWest => Ordinal::NorthEast,
			Ordinal::West => Ordinal::East,
			Ordinal::NorthWest => Ordinal::SouthEast,
			Ordinal::Up => Ordinal::Down,
			Ordinal::Down => Ordinal::Up,
		}
	}
}

/// Size of the grid. Levels run from `min_z` to `max_z` inclusive, each level
/// is `width` tiles across and `height` tiles down
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub struct GridDimensions {
	/// Number of columns
	width: u32,
	/// Number of rows
	height: u32,
	/// Lowest level
	min_z: i32,
	/// Highest level
	max_z: i32,
}

impl GridDimensions {
	/// Create a new instance of [GridDimensions]. Panics if the grid would
	/// contain no tiles
	pub fn new(width: u32, height: u32, min_z: i32, max_z: i32) -> Self {
		if width == 0 || height == 0 {
			panic!(
				"A grid needs at least one tile, width {} and height {} were given",
				width, height
			);
		}
		if max_z < min_z {
			panic!(
				"The highest level ({}) cannot be below the lowest level ({})",
				max_z, min_z
			);
		}
		GridDimensions {
			width,
			height,
			min_z,
			max_z,
		}
	}
	/// Get the number of columns
	pub fn get_width(&self) -> u32 {
		self.width
	}
	/// Get the number of rows
	pub fn get_height(&self) -> u32 {
		self.height
	}
	/// Get the lowest level
	pub fn get_min_z(&self) -> i32 {
		self.min_z
	}
	/// Get the highest level
	pub fn get_max_z(&self) -> i32 {
		self.max_z
	}
	/// Number of levels
	pub fn get_levels(&self) -> u32 {
		(self.max_z - self.min_z + 1) as u32
	}
	/// Total number of tiles in the grid
	pub fn get_volume(&self) -> usize {
		self.width as usize * self.height as usize * self.get_levels() as usize
	}
	/// Does the grid contain the tile
	pub fn contains(&self, tile: Tile) -> bool {
		tile.get_x() >= 0
			&& tile.get_y() >= 0
			&& (tile.get_x() as u32) < self.width
			&& (tile.get_y() as u32) < self.height
			&& tile.get_z() >= self.min_z
			&& tile.get_z() <= self.max_z
	}
	/// Is the tile on the outer rim of its level
	pub fn is_on_edge(&self, tile: Tile) -> bool {
		tile.get_x() == 0
			|| tile.get_y() == 0
			|| tile.get_x() as u32 == self.width - 1
			|| tile.get_y() as u32 == self.height - 1
	}
	/// Position of a tile within a flat array laid out level by level, row
	/// by row
	pub fn get_flat_index(&self, tile: Tile) -> usize {
		debug_assert!(
			self.contains(tile),
			"Tile {:?} is outside of the grid {:?}",
			tile,
			self
		);
		let level = (tile.get_z() - self.min_z) as usize;
		let plane = self.width as usize * self.height as usize;
		level * plane + tile.get_y() as usize * self.width as usize + tile.get_x() as usize
	}
	/// Inverse of [GridDimensions::get_flat_index]
	pub fn get_tile_from_index(&self, index: usize) -> Tile {
		let plane = self.width as usize * self.height as usize;
		let level = index / plane;
		let remainder = index % plane;
		Tile::new(
			(remainder % self.width as usize) as i32,
			(remainder / self.width as usize) as i32,
			level as i32 + self.min_z,
		)
	}
	/// Iterate over every tile of the grid in flat index order
	pub fn iter_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
		(0..self.get_volume()).map(|i| self.get_tile_from_index(i))
	}
}
