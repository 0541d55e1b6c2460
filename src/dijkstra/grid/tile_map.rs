//! An in-memory [TileGrid]. Every tile has a [TileDefinition] and optional
//! vehicle parts, blocking actors and forbidden transitions can be layered on
//! top.
//!
//! A [TileMap] can be created programmatically or loaded:
//!
//! - from a `ron` file of the whole structure (`ron` feature)
//! - from a directory of CSV files, one per level named `level_<z>.csv`, each
//!   holding the move cost of every tile (`csv` feature)
//! - from a greyscale image where each pixel's brightness is the move cost of
//!   a tile and black pixels are walls (`heightmap` feature)
//!

use std::collections::{HashMap, HashSet};

use bevy::prelude::Resource;

use crate::prelude::*;

/// Move cost of an ordinary open tile
pub const DEFAULT_MOVE_COST: u32 = 100;

/// Terrain of a single tile
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileDefinition {
	/// Base cost of moving onto the tile, `0` for walls
	move_cost: u32,
	/// Terrain features
	flags: TerrainFlags,
	/// Bash strength needed to break through the terrain, `0` when it
	/// cannot be bashed
	bash_resistance: u32,
	/// Is the tile exposed to the outside
	outside: bool,
}

impl Default for TileDefinition {
	fn default() -> Self {
		TileDefinition {
			move_cost: DEFAULT_MOVE_COST,
			flags: TerrainFlags::NONE,
			bash_resistance: 0,
			outside: false,
		}
	}
}

impl TileDefinition {
	/// Create a new instance of [TileDefinition]
	pub fn new(move_cost: u32, flags: TerrainFlags, bash_resistance: u32, outside: bool) -> Self {
		TileDefinition {
			move_cost,
			flags,
			bash_resistance,
			outside,
		}
	}
	/// A wall that can never be passed
	pub fn wall() -> Self {
		TileDefinition {
			move_cost: 0,
			..Default::default()
		}
	}
	/// Get the base move cost
	pub fn get_move_cost(&self) -> u32 {
		self.move_cost
	}
	/// Get the terrain features
	pub fn get_flags(&self) -> TerrainFlags {
		self.flags
	}
	/// Get the bash resistance
	pub fn get_bash_resistance(&self) -> u32 {
		self.bash_resistance
	}
	/// Is the tile exposed to the outside
	pub fn is_outside(&self) -> bool {
		self.outside
	}
}

/// A vehicle part standing on a tile
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehiclePart {
	/// The part is a door
	is_door: bool,
	/// The door only opens from the inside of the vehicle
	opens_from_inside_only: bool,
	/// Damage the part can take before breaking
	hit_points: u32,
}

impl VehiclePart {
	/// Create a new instance of [VehiclePart]
	pub fn new(is_door: bool, opens_from_inside_only: bool, hit_points: u32) -> Self {
		VehiclePart {
			is_door,
			opens_from_inside_only,
			hit_points,
		}
	}
}

/// In-memory grid of [TileDefinition]s
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Resource, Clone, Debug)]
pub struct TileMap {
	/// Size of the grid
	dimensions: GridDimensions,
	/// Terrain of every tile in [GridDimensions::get_flat_index] order
	tiles: Vec<TileDefinition>,
	/// Vehicle parts obstructing tiles
	#[cfg_attr(feature = "serde", serde(default))]
	vehicle_parts: HashMap<Tile, VehiclePart>,
	/// Tiles currently occupied by blocking actors
	#[cfg_attr(feature = "serde", serde(default))]
	actors: HashSet<Tile>,
	/// Individual transitions that cannot be made
	#[cfg_attr(feature = "serde", serde(default))]
	blocked_moves: HashSet<(Tile, Tile)>,
}

impl TileMap {
	/// Create a map where every tile has the same move cost
	pub fn new(dimensions: GridDimensions, move_cost: u32) -> Self {
		let tile = TileDefinition {
			move_cost,
			..Default::default()
		};
		TileMap {
			dimensions,
			tiles: vec![tile; dimensions.get_volume()],
			vehicle_parts: HashMap::new(),
			actors: HashSet::new(),
			blocked_moves: HashSet::new(),
		}
	}
	/// Get the definition of a tile, `None` outside of the grid
	pub fn get_tile_definition(&self, tile: Tile) -> Option<&TileDefinition> {
		if self.dimensions.contains(tile) {
			self.tiles.get(self.dimensions.get_flat_index(tile))
		} else {
			None
		}
	}
	/// Mutable access to the definition of a tile, `None` outside of the grid
	pub fn get_tile_definition_mut(&mut self, tile: Tile) -> Option<&mut TileDefinition> {
		if self.dimensions.contains(tile) {
			let index = self.dimensions.get_flat_index(tile);
			self.tiles.get_mut(index)
		} else {
			None
		}
	}
	/// Replace the definition of a tile
	pub fn set_tile_definition(&mut self, tile: Tile, definition: TileDefinition) {
		if let Some(t) = self.get_tile_definition_mut(tile) {
			*t = definition;
		}
	}
	/// Set the base move cost of a tile
	pub fn set_move_cost(&mut self, tile: Tile, move_cost: u32) {
		if let Some(t) = self.get_tile_definition_mut(tile) {
			t.move_cost = move_cost;
		}
	}
	/// Add terrain features to a tile
	pub fn insert_flags(&mut self, tile: Tile, flags: TerrainFlags) {
		if let Some(t) = self.get_tile_definition_mut(tile) {
			t.flags.insert(flags);
		}
	}
	/// Set how hard the terrain of a tile is to bash
	pub fn set_bash_resistance(&mut self, tile: Tile, resistance: u32) {
		if let Some(t) = self.get_tile_definition_mut(tile) {
			t.bash_resistance = resistance;
		}
	}
	/// Mark a tile as exposed to the outside or not
	pub fn set_outside(&mut self, tile: Tile, outside: bool) {
		if let Some(t) = self.get_tile_definition_mut(tile) {
			t.outside = outside;
		}
	}
	/// Place a vehicle part on a tile
	pub fn insert_vehicle_part(&mut self, tile: Tile, part: VehiclePart) {
		self.vehicle_parts.insert(tile, part);
	}
	/// Remove any vehicle part from a tile
	pub fn remove_vehicle_part(&mut self, tile: Tile) {
		self.vehicle_parts.remove(&tile);
	}
	/// Mark a tile as occupied or vacated by a blocking actor
	pub fn set_blocking_actor(&mut self, tile: Tile, present: bool) {
		if present {
			self.actors.insert(tile);
		} else {
			self.actors.remove(&tile);
		}
	}
	/// Forbid stepping from `from` into `to`. The reverse move is unaffected
	pub fn block_move(&mut self, from: Tile, to: Tile) {
		self.blocked_moves.insert((from, to));
	}
	/// Ensure the tile data matches the dimensions
	fn validate(&self) -> Result<(), PathfindingError> {
		if self.tiles.len() != self.dimensions.get_volume() {
			return Err(PathfindingError::InvalidMap(format!(
				"expected {} tiles for {:?}, found {}",
				self.dimensions.get_volume(),
				self.dimensions,
				self.tiles.len()
			)));
		}
		Ok(())
	}
	/// From a `ron` file generate the [TileMap]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Result<Self, PathfindingError> {
		let file = std::fs::File::open(&path).map_err(|source| PathfindingError::Io {
			path: path.clone(),
			source,
		})?;
		let map: TileMap = ron::de::from_reader(file)
			.map_err(|source| PathfindingError::Ron { path, source })?;
		map.validate()?;
		Ok(map)
	}
	/// From a directory containing one CSV file of move costs per level,
	/// named `level_<z>.csv`, generate the [TileMap]
	#[cfg(feature = "csv")]
	pub fn from_csv_dir(
		dimensions: GridDimensions,
		directory: String,
	) -> Result<Self, PathfindingError> {
		let entries = std::fs::read_dir(&directory).map_err(|source| PathfindingError::Io {
			path: directory.clone(),
			source,
		})?;
		let mut csvs = Vec::new();
		for entry in entries {
			let entry = entry.map_err(|source| PathfindingError::Io {
				path: directory.clone(),
				source,
			})?;
			let file_name = entry.file_name().to_string_lossy().into_owned();
			let Some(level) = file_name
				.strip_suffix(".csv")
				.and_then(|stem| stem.strip_prefix("level_"))
			else {
				continue;
			};
			let z: i32 = level.parse().map_err(|_| {
				PathfindingError::InvalidMap(format!("cannot read a level from `{}`", file_name))
			})?;
			csvs.push((entry.path().to_string_lossy().into_owned(), z));
		}
		if csvs.len() != dimensions.get_levels() as usize {
			return Err(PathfindingError::InvalidMap(format!(
				"found {} CSVs, expected {}",
				csvs.len(),
				dimensions.get_levels()
			)));
		}
		let mut map = TileMap::new(dimensions, DEFAULT_MOVE_COST);
		for (csv_file, z) in csvs {
			if z < dimensions.get_min_z() || z > dimensions.get_max_z() {
				return Err(PathfindingError::InvalidMap(format!(
					"level {} of `{}` is outside of {:?}",
					z, csv_file, dimensions
				)));
			}
			let data = std::fs::File::open(&csv_file).map_err(|source| PathfindingError::Io {
				path: csv_file.clone(),
				source,
			})?;
			let mut rdr = csv::ReaderBuilder::new()
				.has_headers(false)
				.from_reader(data);
			for (row, record) in rdr.records().enumerate() {
				let record = record.map_err(|source| PathfindingError::Csv {
					path: csv_file.clone(),
					source,
				})?;
				for (column, value) in record.iter().enumerate() {
					let tile = Tile::new(column as i32, row as i32, z);
					if !dimensions.contains(tile) {
						return Err(PathfindingError::InvalidMap(format!(
							"`{}` has more cells than the grid, found {:?}",
							csv_file, tile
						)));
					}
					let move_cost: u32 = value.trim().parse().map_err(|_| {
						PathfindingError::InvalidMap(format!(
							"`{}` expects move costs, found `{}`",
							csv_file, value
						))
					})?;
					map.set_move_cost(tile, move_cost);
				}
			}
		}
		Ok(map)
	}
	/// Create a single level [TileMap] from a greyscale image where the
	/// brightness of each pixel is the move cost of a tile and black pixels
	/// are walls
	#[cfg(feature = "heightmap")]
	pub fn from_heightmap(path: String) -> Result<Self, PathfindingError> {
		use photon_rs::native::open_image;
		let img = open_image(path.as_str()).map_err(|e| PathfindingError::Heightmap {
			path: path.clone(),
			message: format!("{:?}", e),
		})?;
		let width = img.get_width();
		let height = img.get_height();
		let raw_pixels = img.get_raw_pixels();
		// raw pixels come in sets of either 3 or 4 (if alpha channel is included)
		let chunk_size = if (width * height * 4) as usize == raw_pixels.len() {
			4
		} else {
			3
		};
		if (width * height) as usize * chunk_size != raw_pixels.len() {
			return Err(PathfindingError::Heightmap {
				path,
				message: format!("unexpected pixel buffer length {}", raw_pixels.len()),
			});
		}
		let dimensions = GridDimensions::new(width, height, 0, 0);
		let mut map = TileMap::new(dimensions, DEFAULT_MOVE_COST);
		for (i, rgb) in raw_pixels.chunks(chunk_size).enumerate() {
			let tile = dimensions.get_tile_from_index(i);
			map.set_move_cost(tile, rgb[0] as u32);
		}
		Ok(map)
	}
}

impl TileGrid for TileMap {
	fn get_dimensions(&self) -> GridDimensions {
		self.dimensions
	}
	fn get_move_cost(&self, tile: Tile) -> u32 {
		if self.vehicle_parts.contains_key(&tile) {
			return 0;
		}
		self.get_tile_definition(tile)
			.map(|t| t.move_cost)
			.unwrap_or(0)
	}
	fn get_terrain_flags(&self, tile: Tile) -> TerrainFlags {
		self.get_tile_definition(tile)
			.map(|t| t.flags)
			.unwrap_or_default()
	}
	fn is_outside(&self, tile: Tile) -> bool {
		self.get_tile_definition(tile)
			.map(|t| t.outside)
			.unwrap_or(false)
	}
	fn get_bash_rating(&self, bash_strength: u32, tile: Tile) -> i32 {
		let resistance = self
			.get_tile_definition(tile)
			.map(|t| t.bash_resistance)
			.unwrap_or(0);
		if resistance == 0 || bash_strength == 0 {
			return -1;
		}
		if bash_strength < resistance {
			return 0;
		}
		// 1 when strength matches resistance, 10 from double the resistance
		let surplus = (bash_strength - resistance) as u64;
		(1 + (9 * surplus / resistance as u64).min(9)) as i32
	}
	fn get_vehicle_obstacle(&self, tile: Tile, bash_strength: u32) -> Option<VehicleObstacle> {
		self.vehicle_parts.get(&tile).map(|part| {
			let hits = if bash_strength == 0 {
				0
			} else {
				part.hit_points.div_ceil(bash_strength).max(1)
			};
			VehicleObstacle::new(part.is_door, part.opens_from_inside_only, hits)
		})
	}
	fn has_blocking_actor(&self, tile: Tile) -> bool {
		self.actors.contains(&tile)
	}
	fn is_valid_move(&self, from: Tile, to: Tile) -> bool {
		if self.blocked_moves.contains(&(from, to)) {
			return false;
		}
		if from.get_z() != to.get_z() {
			// only through open air
			let upper = if from.get_z() > to.get_z() { from } else { to };
			return self
				.get_terrain_flags(upper)
				.contains(TerrainFlags::NO_FLOOR);
		}
		true
	}
}
