//! The cost of traversing a tile is worked out once per [CostField] and
//! cached, it only depends on the terrain and the
//! [CapabilityProfile].
//!
//! A tile costs its base move cost plus any penalties for rough or sharp
//! terrain, traps, blocking actors and profile specific extras. When the tile
//! cannot be walked onto (base move cost of `0`) the mover may still get
//! through by bashing a vehicle part, opening a door, climbing or bashing the
//! terrain, whichever is cheapest. If none of those are possible the tile is
//! closed.
//!
//! The cost of a single step is taken from the tile being left:
//!
//! ```text
//! cardinal  0.50 * move cost + extra
//! diagonal  0.75 * move cost + extra
//! flight    0.50 * move cost + extra + fly cost
//! stairs    0.50 * move cost + extra + stair cost
//! ramp      0.50 * move cost + extra
//! ```
//!
//! No step is cheaper than [MIN_STEP_COST] so that costs strictly increase
//! away from the destination even through free obstacles.
//!

use crate::prelude::*;

/// Factor applied to the move cost of a cardinal step
pub const CARDINAL_FACTOR: f32 = 0.5;
/// Factor applied to the move cost of a diagonal step
pub const DIAGONAL_FACTOR: f32 = 0.75;
/// Lowest cost of any step, a cardinal step over the cheapest walkable tile
pub const MIN_STEP_COST: f32 = CARDINAL_FACTOR;
/// Multiplier of the bash cost for terrain the mover can only just break
const LAST_RESORT_BASH_MULTIPLIER: f32 = 1_000_000.0;

/// How a mover gets from one tile to the next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
	/// North, east, south or west
	Cardinal,
	/// Between two cardinal directions
	Diagonal,
	/// Flying straight up or down
	Vertical,
	/// Along a stairway [PortalEdge]
	Stairs,
	/// Along a ramp [PortalEdge]
	Ramp,
}

impl StepKind {
	/// The kind of step taken when moving in a direction
	pub fn from_ordinal(ordinal: Ordinal) -> Self {
		if ordinal.is_vertical() {
			StepKind::Vertical
		} else if ordinal.is_diagonal() {
			StepKind::Diagonal
		} else {
			StepKind::Cardinal
		}
	}
	/// The kind of step taken along a portal
	pub fn from_portal(kind: PortalKind) -> Self {
		match kind {
			PortalKind::Stairs => StepKind::Stairs,
			PortalKind::Ramp => StepKind::Ramp,
		}
	}
	/// Does the grid get a say in whether the step is allowed. Portal edges
	/// are derived from the terrain so are always valid
	pub fn needs_validation(&self) -> bool {
		matches!(
			self,
			StepKind::Cardinal | StepKind::Diagonal | StepKind::Vertical
		)
	}
}

/// Cached cost of traversing a tile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileCost {
	/// Base move cost of the tile
	move_cost: f32,
	/// Penalties and obstacle bypass costs, [Cost::Unreachable] if closed
	extra: Cost,
}

impl TileCost {
	/// Work out the cost of a tile for the given mover
	pub fn compute<G: TileGrid>(grid: &G, profile: &CapabilityProfile, tile: Tile) -> Self {
		let move_cost = grid.get_move_cost(tile);
		let flags = grid.get_terrain_flags(tile);
		let mut extra = 0.0;
		if flags.contains(TerrainFlags::ROUGH) {
			extra += profile.get_rough_terrain_cost();
		}
		if flags.contains(TerrainFlags::SHARP) {
			extra += profile.get_sharp_terrain_cost();
		}
		if flags.contains(TerrainFlags::TRAP) {
			extra += profile.get_trap_cost();
		}
		if profile.avoids_actors() && grid.has_blocking_actor(tile) {
			extra += profile.get_mob_presence_penalty();
		}
		// ledge
		if flags.contains(TerrainFlags::NO_FLOOR) && !profile.can_fly() {
			extra = f32::INFINITY;
		}
		extra += profile.get_extra_g_cost(tile);
		if move_cost == 0 {
			extra += obstacle_bypass_cost(grid, profile, tile);
		}
		TileCost {
			move_cost: move_cost as f32,
			extra: Cost::from_f32(extra),
		}
	}
	/// Get the base move cost
	pub fn get_move_cost(&self) -> f32 {
		self.move_cost
	}
	/// Get the penalties and obstacle bypass costs
	pub fn get_extra(&self) -> Cost {
		self.extra
	}
	/// Can the tile never be traversed
	pub fn is_closed(&self) -> bool {
		self.extra.is_unreachable()
	}
	/// Cost of stepping out of the tile, infinite when closed
	pub fn get_step_cost(&self, kind: StepKind, profile: &CapabilityProfile) -> f32 {
		let Some(extra) = self.extra.get_value() else {
			return f32::INFINITY;
		};
		let step = match kind {
			StepKind::Cardinal | StepKind::Ramp => CARDINAL_FACTOR * self.move_cost + extra,
			StepKind::Diagonal => DIAGONAL_FACTOR * self.move_cost + extra,
			StepKind::Vertical => CARDINAL_FACTOR * self.move_cost + extra + profile.get_fly_cost(),
			StepKind::Stairs => {
				CARDINAL_FACTOR * self.move_cost + extra + profile.get_stair_cost()
			}
		};
		step.max(MIN_STEP_COST)
	}
}

/// Cheapest way of getting past a tile that cannot be walked onto
fn obstacle_bypass_cost<G: TileGrid>(grid: &G, profile: &CapabilityProfile, tile: Tile) -> f32 {
	let strength = profile.get_bash_strength();
	let can_open = |opens_from_inside_only: bool| {
		profile.can_open_doors() && (!opens_from_inside_only || !grid.is_outside(tile))
	};
	// vehicles sit on top of the terrain so take priority
	if let Some(part) = grid.get_vehicle_obstacle(tile, strength) {
		let mut best = f32::INFINITY;
		if part.is_door() && can_open(part.opens_from_inside_only()) {
			best = profile.get_door_open_cost();
		}
		if profile.can_bash() && part.get_hits_to_destroy() > 0 {
			best = best.min(profile.get_bash_cost() * part.get_hits_to_destroy() as f32);
		}
		return best;
	}
	let flags = grid.get_terrain_flags(tile);
	let mut best = f32::INFINITY;
	if flags.contains(TerrainFlags::CLIMBABLE) && profile.can_climb() {
		best = best.min(profile.get_climb_cost());
	}
	if flags.contains(TerrainFlags::DOOR) && can_open(flags.contains(TerrainFlags::OPENS_FROM_INSIDE)) {
		best = best.min(profile.get_door_open_cost());
	}
	if profile.can_bash() {
		let rating = grid.get_bash_rating(strength, tile).min(10);
		if rating > 1 {
			best = best.min(10.0 / rating as f32 * profile.get_bash_cost());
		} else if rating == 1 {
			best = best.min(LAST_RESORT_BASH_MULTIPLIER * profile.get_bash_cost());
		}
	}
	best
}

#[cfg(test)]
mod tests {
	use super::*;
	/// 3x3 single level map with a cost of 100 everywhere
	fn small_map() -> TileMap {
		TileMap::new(GridDimensions::new(3, 3, 0, 0), 100)
	}
	#[test]
	fn open_tile_steps() {
		let map = small_map();
		let profile = CapabilityProfile::default();
		let cost = TileCost::compute(&map, &profile, Tile::new(1, 1, 0));
		assert!(!cost.is_closed());
		assert_eq!(50.0, cost.get_step_cost(StepKind::Cardinal, &profile));
		assert_eq!(75.0, cost.get_step_cost(StepKind::Diagonal, &profile));
		// grounded mover
		assert!(cost.get_step_cost(StepKind::Vertical, &profile).is_infinite());
	}
	#[test]
	fn penalties_accumulate() {
		let mut map = small_map();
		let tile = Tile::new(1, 1, 0);
		map.insert_flags(tile, TerrainFlags::ROUGH | TerrainFlags::TRAP);
		map.set_blocking_actor(tile, true);
		let profile = CapabilityProfile::default()
			.with_rough_terrain_cost(5.0)
			.with_trap_cost(20.0)
			.with_mob_presence_penalty(7.0)
			.with_extra_g_cost(tile, 3.0);
		let cost = TileCost::compute(&map, &profile, tile);
		assert_eq!(Cost::Value(35.0), cost.get_extra());
		assert_eq!(85.0, cost.get_step_cost(StepKind::Cardinal, &profile));
	}
	#[test]
	fn wall_is_closed() {
		let mut map = small_map();
		let tile = Tile::new(1, 1, 0);
		map.set_tile_definition(tile, TileDefinition::wall());
		let profile = CapabilityProfile::default().with_bash_strength(100);
		let cost = TileCost::compute(&map, &profile, tile);
		assert!(cost.is_closed());
	}
	#[test]
	fn ledge_closed_for_walkers_only() {
		let mut map = small_map();
		let tile = Tile::new(1, 1, 0);
		map.insert_flags(tile, TerrainFlags::NO_FLOOR);
		let walker = CapabilityProfile::default();
		let flier = CapabilityProfile::default().with_fly_cost(10.0);
		assert!(TileCost::compute(&map, &walker, tile).is_closed());
		assert!(!TileCost::compute(&map, &flier, tile).is_closed());
	}
	#[test]
	fn door_inside_only() {
		//  ________
		// |__|D_|__|
		// |__|__|__|
		// |__|__|__|
		let mut map = small_map();
		let tile = Tile::new(1, 0, 0);
		map.set_tile_definition(
			tile,
			TileDefinition::new(0, TerrainFlags::DOOR | TerrainFlags::OPENS_FROM_INSIDE, 0, false),
		);
		let opener = CapabilityProfile::default().with_door_open_cost(4.0);
		let cost = TileCost::compute(&map, &opener, tile);
		assert_eq!(Cost::Value(4.0), cost.get_extra());
		map.set_outside(tile, true);
		let cost = TileCost::compute(&map, &opener, tile);
		assert!(cost.is_closed());
	}
	#[test]
	fn cheapest_bypass_wins() {
		let mut map = small_map();
		let tile = Tile::new(1, 1, 0);
		map.set_tile_definition(
			tile,
			TileDefinition::new(0, TerrainFlags::CLIMBABLE, 20, false),
		);
		// rating 10 -> 1 * bash cost
		let profile = CapabilityProfile::default()
			.with_bash_strength(40)
			.with_bash_cost(2.0)
			.with_climb_cost(6.0);
		let cost = TileCost::compute(&map, &profile, tile);
		assert_eq!(Cost::Value(2.0), cost.get_extra());
		// bash rating 1, last resort
		let weak = CapabilityProfile::default()
			.with_bash_strength(20)
			.with_bash_cost(2.0);
		let cost = TileCost::compute(&map, &weak, tile);
		assert_eq!(Cost::Value(2_000_000.0), cost.get_extra());
	}
	#[test]
	fn vehicle_door_and_bash() {
		let mut map = small_map();
		let tile = Tile::new(1, 1, 0);
		map.insert_vehicle_part(tile, VehiclePart::new(true, false, 50));
		let basher = CapabilityProfile::default()
			.with_bash_strength(10)
			.with_bash_cost(3.0);
		// 5 hits
		assert_eq!(
			Cost::Value(15.0),
			TileCost::compute(&map, &basher, tile).get_extra()
		);
		let opener = basher.clone().with_door_open_cost(1.0);
		assert_eq!(
			Cost::Value(1.0),
			TileCost::compute(&map, &opener, tile).get_extra()
		);
		let neither = CapabilityProfile::default();
		assert!(TileCost::compute(&map, &neither, tile).is_closed());
	}
	#[test]
	fn free_door_still_costs_a_step() {
		let mut map = small_map();
		let tile = Tile::new(1, 1, 0);
		map.set_tile_definition(tile, TileDefinition::new(0, TerrainFlags::DOOR, 0, false));
		let opener = CapabilityProfile::default().with_door_open_cost(0.0);
		let cost = TileCost::compute(&map, &opener, tile);
		assert_eq!(Cost::Value(0.0), cost.get_extra());
		assert_eq!(MIN_STEP_COST, cost.get_step_cost(StepKind::Cardinal, &opener));
		assert_eq!(MIN_STEP_COST, cost.get_step_cost(StepKind::Diagonal, &opener));
	}
	#[test]
	fn stairs_and_ramps() {
		let map = small_map();
		let profile = CapabilityProfile::default().with_stair_cost(10.0);
		let cost = TileCost::compute(&map, &profile, Tile::new(0, 0, 0));
		assert_eq!(60.0, cost.get_step_cost(StepKind::Stairs, &profile));
		assert_eq!(50.0, cost.get_step_cost(StepKind::Ramp, &profile));
	}
}
