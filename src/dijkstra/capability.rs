//! A [CapabilityProfile] describes how a mover is able to traverse the grid
//! and how much it dislikes each kind of obstacle. Two movers with equal
//! profiles heading to the same destination share a
//! [crate::prelude::CostField].
//!
//! An infinite cost means "never", e.g. a `climb_cost` of [f32::INFINITY] is
//! a mover that cannot climb at all. Costs are never negative, anything below
//! `0.0` is clamped.
//!

use std::collections::HashMap;

use crate::prelude::*;

/// Default granularity of bash strength, see
/// [CapabilityProfile::with_bash_strength]
pub const DEFAULT_BASH_STRENGTH_QUANTA: u32 = 10;

/// Traversal abilities and cost weights of a mover
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct CapabilityProfile {
	/// Quantised bash strength, the effective strength is this multiplied by
	/// `bash_strength_quanta`
	bash_strength_val: u32,
	/// Granularity of bash strength so that similar movers share fields
	bash_strength_quanta: u32,
	/// Multiplier applied to the cost of bashing through an obstacle
	bash_cost: f32,
	/// Cost of climbing over an obstacle
	climb_cost: f32,
	/// Cost of stepping onto a trap
	trap_cost: f32,
	/// Cost of opening a door
	door_open_cost: f32,
	/// Extra cost of rough terrain
	rough_terrain_cost: f32,
	/// Extra cost of sharp terrain
	sharp_terrain_cost: f32,
	/// Cost of moving between levels through open air
	fly_cost: f32,
	/// Cost of using a stairway
	stair_cost: f32,
	/// Extra cost of a tile currently occupied by a blocking actor
	mob_presence_penalty: f32,
	/// Additional per-tile costs, an infinite entry closes the tile
	extra_g_costs: HashMap<Tile, f32>,
}

impl Default for CapabilityProfile {
	fn default() -> Self {
		CapabilityProfile {
			bash_strength_val: 0,
			bash_strength_quanta: DEFAULT_BASH_STRENGTH_QUANTA,
			bash_cost: 2.0,
			climb_cost: f32::INFINITY,
			trap_cost: 0.0,
			door_open_cost: f32::INFINITY,
			rough_terrain_cost: 0.0,
			sharp_terrain_cost: 0.0,
			fly_cost: f32::INFINITY,
			stair_cost: f32::INFINITY,
			mob_presence_penalty: 0.0,
			extra_g_costs: HashMap::new(),
		}
	}
}

impl CapabilityProfile {
	/// Set the raw bash strength, it is rounded to the nearest multiple of
	/// the bash strength quanta
	pub fn with_bash_strength(mut self, strength: u32) -> Self {
		let quanta = self.bash_strength_quanta.max(1);
		self.bash_strength_val = (strength + quanta / 2) / quanta;
		self
	}
	/// Set the granularity of bash strength. Any strength already set is
	/// re-quantised
	pub fn with_bash_strength_quanta(mut self, quanta: u32) -> Self {
		let strength = self.get_bash_strength();
		self.bash_strength_quanta = quanta.max(1);
		self.with_bash_strength(strength)
	}
	/// Set the bash cost multiplier
	pub fn with_bash_cost(mut self, cost: f32) -> Self {
		self.bash_cost = cost.max(0.0);
		self
	}
	/// Set the climb cost
	pub fn with_climb_cost(mut self, cost: f32) -> Self {
		self.climb_cost = cost.max(0.0);
		self
	}
	/// Set the trap cost
	pub fn with_trap_cost(mut self, cost: f32) -> Self {
		self.trap_cost = cost.max(0.0);
		self
	}
	/// Set the door opening cost
	pub fn with_door_open_cost(mut self, cost: f32) -> Self {
		self.door_open_cost = cost.max(0.0);
		self
	}
	/// Set the extra cost of rough terrain
	pub fn with_rough_terrain_cost(mut self, cost: f32) -> Self {
		self.rough_terrain_cost = cost.max(0.0);
		self
	}
	/// Set the extra cost of sharp terrain
	pub fn with_sharp_terrain_cost(mut self, cost: f32) -> Self {
		self.sharp_terrain_cost = cost.max(0.0);
		self
	}
	/// Set the flight cost, a finite value lets the mover fly
	pub fn with_fly_cost(mut self, cost: f32) -> Self {
		self.fly_cost = cost.max(0.0);
		self
	}
	/// Set the stairway cost, a finite value lets the mover use stairs
	pub fn with_stair_cost(mut self, cost: f32) -> Self {
		self.stair_cost = cost.max(0.0);
		self
	}
	/// Set the penalty of a tile occupied by a blocking actor
	pub fn with_mob_presence_penalty(mut self, cost: f32) -> Self {
		self.mob_presence_penalty = cost.max(0.0);
		self
	}
	/// Add an extra cost to a specific tile
	pub fn with_extra_g_cost(mut self, tile: Tile, cost: f32) -> Self {
		self.extra_g_costs.insert(tile, cost.max(0.0));
		self
	}
	/// Get the effective bash strength
	pub fn get_bash_strength(&self) -> u32 {
		self.bash_strength_val * self.bash_strength_quanta
	}
	/// Get the bash cost multiplier
	pub fn get_bash_cost(&self) -> f32 {
		self.bash_cost
	}
	/// Get the climb cost
	pub fn get_climb_cost(&self) -> f32 {
		self.climb_cost
	}
	/// Get the trap cost, fliers pass over traps for free
	pub fn get_trap_cost(&self) -> f32 {
		if self.can_fly() {
			0.0
		} else {
			self.trap_cost
		}
	}
	/// Get the door opening cost
	pub fn get_door_open_cost(&self) -> f32 {
		self.door_open_cost
	}
	/// Get the extra cost of rough terrain
	pub fn get_rough_terrain_cost(&self) -> f32 {
		self.rough_terrain_cost
	}
	/// Get the extra cost of sharp terrain
	pub fn get_sharp_terrain_cost(&self) -> f32 {
		self.sharp_terrain_cost
	}
	/// Get the flight cost
	pub fn get_fly_cost(&self) -> f32 {
		self.fly_cost
	}
	/// Cost of travelling along a stairway. Fliers that cannot walk stairs
	/// fly up the stairwell instead
	pub fn get_stair_cost(&self) -> f32 {
		if self.stair_cost.is_finite() {
			self.stair_cost
		} else {
			self.fly_cost
		}
	}
	/// Get the penalty of a tile occupied by a blocking actor
	pub fn get_mob_presence_penalty(&self) -> f32 {
		self.mob_presence_penalty
	}
	/// Get the extra cost of a tile, `0.0` when none was given
	pub fn get_extra_g_cost(&self, tile: Tile) -> f32 {
		self.extra_g_costs.get(&tile).copied().unwrap_or(0.0)
	}
	/// Can the mover bash through obstacles
	pub fn can_bash(&self) -> bool {
		self.get_bash_strength() > 0 && self.bash_cost.is_finite()
	}
	/// Can the mover climb over obstacles
	pub fn can_climb(&self) -> bool {
		self.climb_cost.is_finite()
	}
	/// Can the mover open doors
	pub fn can_open_doors(&self) -> bool {
		self.door_open_cost.is_finite()
	}
	/// Can the mover move freely between levels
	pub fn can_fly(&self) -> bool {
		self.fly_cost.is_finite()
	}
	/// Can the mover travel along stairways
	pub fn can_use_stairs(&self) -> bool {
		self.get_stair_cost().is_finite()
	}
	/// Lowest cost the mover could pay to get past a tile that cannot be
	/// walked onto, [f32::INFINITY] when it cannot get past any
	pub fn get_cheapest_bypass_cost(&self) -> f32 {
		let mut cheapest = f32::INFINITY;
		if self.can_open_doors() {
			cheapest = cheapest.min(self.door_open_cost);
		}
		if self.can_climb() {
			cheapest = cheapest.min(self.climb_cost);
		}
		// a single hit on a part or on terrain rated 10
		if self.can_bash() {
			cheapest = cheapest.min(self.bash_cost);
		}
		cheapest
	}
	/// Does the mover care about tiles being occupied by other actors
	pub fn avoids_actors(&self) -> bool {
		self.mob_presence_penalty > 0.0
	}
	/// From a `ron` file generate the [CapabilityProfile]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Result<Self, PathfindingError> {
		let file = std::fs::File::open(&path).map_err(|source| PathfindingError::Io {
			path: path.clone(),
			source,
		})?;
		let profile: CapabilityProfile = ron::de::from_reader(file)
			.map_err(|source| PathfindingError::Ron { path, source })?;
		Ok(profile.clamped())
	}
	/// Clamp every cost to be non-negative
	#[cfg(feature = "ron")]
	fn clamped(mut self) -> Self {
		for cost in [
			&mut self.bash_cost,
			&mut self.climb_cost,
			&mut self.trap_cost,
			&mut self.door_open_cost,
			&mut self.rough_terrain_cost,
			&mut self.sharp_terrain_cost,
			&mut self.fly_cost,
			&mut self.stair_cost,
			&mut self.mob_presence_penalty,
		] {
			*cost = cost.max(0.0);
		}
		for cost in self.extra_g_costs.values_mut() {
			*cost = cost.max(0.0);
		}
		self.bash_strength_quanta = self.bash_strength_quanta.max(1);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn default_is_a_walker() {
		let profile = CapabilityProfile::default();
		assert!(!profile.can_bash());
		assert!(!profile.can_climb());
		assert!(!profile.can_open_doors());
		assert!(!profile.can_fly());
		assert!(!profile.can_use_stairs());
	}
	#[test]
	fn bash_strength_is_quantised() {
		let a = CapabilityProfile::default().with_bash_strength(23);
		let b = CapabilityProfile::default().with_bash_strength(18);
		assert_eq!(20, a.get_bash_strength());
		assert_eq!(a, b);
	}
	#[test]
	fn requantising_keeps_strength() {
		let profile = CapabilityProfile::default()
			.with_bash_strength(40)
			.with_bash_strength_quanta(1);
		assert_eq!(40, profile.get_bash_strength());
	}
	#[test]
	fn flier_ignores_traps_and_flies_stairwells() {
		let profile = CapabilityProfile::default()
			.with_trap_cost(500.0)
			.with_fly_cost(30.0);
		assert_eq!(0.0, profile.get_trap_cost());
		assert!(profile.can_use_stairs());
		assert_eq!(30.0, profile.get_stair_cost());
	}
	#[test]
	fn extra_costs_differentiate_profiles() {
		let a = CapabilityProfile::default();
		let b = CapabilityProfile::default().with_extra_g_cost(Tile::new(1, 1, 0), 50.0);
		assert_ne!(a, b);
		assert_eq!(50.0, b.get_extra_g_cost(Tile::new(1, 1, 0)));
		assert_eq!(0.0, b.get_extra_g_cost(Tile::new(2, 1, 0)));
	}
	#[test]
	fn negative_costs_are_clamped() {
		let profile = CapabilityProfile::default()
			.with_door_open_cost(-5.0)
			.with_trap_cost(-1.0)
			.with_extra_g_cost(Tile::new(0, 0, 0), -30.0);
		assert_eq!(0.0, profile.get_door_open_cost());
		assert_eq!(0.0, profile.get_trap_cost());
		assert_eq!(0.0, profile.get_extra_g_cost(Tile::new(0, 0, 0)));
	}
	#[test]
	fn cheapest_bypass() {
		assert!(CapabilityProfile::default()
			.get_cheapest_bypass_cost()
			.is_infinite());
		let profile = CapabilityProfile::default()
			.with_door_open_cost(40.0)
			.with_climb_cost(25.0)
			.with_bash_strength(30)
			.with_bash_cost(60.0);
		assert_eq!(25.0, profile.get_cheapest_bypass_cost());
	}
	#[test]
	#[cfg(feature = "ron")]
	fn capability_profile_file() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/capability_profile.ron";
		let profile = CapabilityProfile::from_ron(path).unwrap();
		assert!(profile.can_open_doors());
		assert!(profile.can_use_stairs());
		assert_eq!(20, profile.get_bash_strength());
	}
	#[test]
	#[cfg(feature = "ron")]
	fn capability_profile_missing_file() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/does_not_exist.ron";
		let result = CapabilityProfile::from_ron(path);
		assert!(matches!(result, Err(PathfindingError::Io { .. })));
	}
}
