//! A [CostField] belongs to a destination and a [CapabilityProfile]. It is
//! seeded with the destination at a cost of `0` and grows outwards on demand
//! as queries from different origins ask for routes.
//!
//! ```text
//!  _______________________________
//! |     |     |     |     |     |
//! | 200 | 150 | 125 | 100 | 100 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! | 175 | 125 |  75 |  50 |  50 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! | 150 | 100 |  50 |  0  |  50 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! | 175 | 125 |  75 |  50 |  50 |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! Above, the `g` layer of a fully settled field with a destination in the
//! middle of the right hand side and a move cost of `100` everywhere.
//!
//! Once a tile is settled it is never revisited, later queries only push the
//! wavefront further out. The per-tile traversal costs and the forbidden
//! transitions discovered along the way are kept even when the field has to
//! be rebuilt after a limited search.
//!

use std::collections::HashSet;

use bevy::log::trace;

use crate::prelude::*;

/// Per-destination Dijkstra map
#[derive(Clone, Debug)]
pub struct CostField {
	/// Where every route of the field ends
	pub(super) destination: Tile,
	/// The mover the costs have been computed for
	pub(super) profile: CapabilityProfile,
	/// Size of the grid
	pub(super) dimensions: GridDimensions,
	/// Settled cost to the destination
	pub(super) g: FieldLayer<Cost>,
	/// Heuristic distance to the current origin
	pub(super) h: FieldLayer<Cost>,
	/// Cost of the neighbour each tile steps to
	pub(super) p: FieldLayer<Cost>,
	/// Fewest steps from the destination
	pub(super) s: FieldLayer<Option<u32>>,
	/// Cached traversal cost of each tile
	pub(super) tile_costs: FieldLayer<Option<TileCost>>,
	/// Visitation state
	pub(super) state: FieldLayer<TileState>,
	/// Tiles discovered but not yet settled, kept between queries
	pub(super) unbiased_frontier: Vec<Tile>,
	/// Transitions `(from, to)` the grid has rejected
	pub(super) forbidden_moves: HashSet<(Tile, Tile)>,
	/// Whether the previous expansion was limited
	pub(super) domain: SearchDomain,
	/// Every tile able to reach the destination has been settled
	pub(super) is_explored: bool,
	/// Cheapest cost of covering one tile of straight-line distance
	pub(super) heuristic_cap: Option<f32>,
}

impl CostField {
	/// Create a new field seeded with its destination
	pub fn new(destination: Tile, profile: CapabilityProfile, dimensions: GridDimensions) -> Self {
		trace!(
			"Creating CostField for destination {:?} over {:?}",
			destination,
			dimensions
		);
		let mut field = CostField {
			destination,
			profile,
			dimensions,
			g: FieldLayer::new(dimensions, Cost::Unset),
			h: FieldLayer::new(dimensions, Cost::Unset),
			p: FieldLayer::new(dimensions, Cost::Unset),
			s: FieldLayer::new(dimensions, None),
			tile_costs: FieldLayer::new(dimensions, None),
			state: FieldLayer::new(dimensions, TileState::Unvisited),
			unbiased_frontier: Vec::new(),
			forbidden_moves: HashSet::new(),
			domain: SearchDomain::Absolute,
			is_explored: false,
			heuristic_cap: None,
		};
		field.rebuild();
		field
	}
	/// Discard every settled value and seed the field with its destination
	/// again. Cached tile costs and forbidden moves are kept
	pub fn rebuild(&mut self) {
		self.g.fill(Cost::Unset);
		self.h.fill(Cost::Unset);
		self.p.fill(Cost::Unset);
		self.s.fill(None);
		self.state.fill(TileState::Unvisited);
		self.is_explored = false;
		self.domain = SearchDomain::Absolute;
		self.unbiased_frontier.clear();
		if self.dimensions.contains(self.destination) {
			self.g.set(self.destination, Cost::Value(0.0));
			self.p.set(self.destination, Cost::Value(0.0));
			self.s.set(self.destination, Some(0));
			self.state.set(self.destination, TileState::Open);
			self.unbiased_frontier.push(self.destination);
		}
	}
	/// Get the destination
	pub fn get_destination(&self) -> Tile {
		self.destination
	}
	/// Get the mover profile
	pub fn get_profile(&self) -> &CapabilityProfile {
		&self.profile
	}
	/// Get the size of the grid
	pub fn get_dimensions(&self) -> GridDimensions {
		self.dimensions
	}
	/// Get the cost from a tile to the destination. Only settled tiles hold
	/// their final value
	pub fn get_g(&self, tile: Tile) -> Cost {
		self.g.get(tile)
	}
	/// Get the heuristic distance from a tile to the origin of the latest
	/// query
	pub fn get_h(&self, tile: Tile) -> Cost {
		self.h.get(tile)
	}
	/// Get the cost of the neighbour a tile would step to
	pub fn get_p(&self, tile: Tile) -> Cost {
		self.p.get(tile)
	}
	/// Get the fewest steps from the destination to a tile
	pub fn get_s(&self, tile: Tile) -> Option<u32> {
		self.s.get(tile)
	}
	/// Get the visitation state of a tile
	pub fn get_state(&self, tile: Tile) -> TileState {
		self.state.get(tile)
	}
	/// Has the tile been settled
	pub fn is_settled(&self, tile: Tile) -> bool {
		self.state.get(tile).is_settled()
	}
	/// Have all tiles that can reach the destination been settled
	pub fn is_explored(&self) -> bool {
		self.is_explored
	}
	/// Get the search domain of the previous expansion
	pub fn get_domain(&self) -> SearchDomain {
		self.domain
	}
	/// Get the transitions known to be invalid
	pub fn get_forbidden_moves(&self) -> &HashSet<(Tile, Tile)> {
		&self.forbidden_moves
	}
	/// Get the tiles retained in the frontier between queries
	pub fn get_unbiased_frontier(&self) -> &[Tile] {
		&self.unbiased_frontier
	}
	/// Does the field belong to the destination and mover
	pub fn is_for(&self, destination: Tile, profile: &CapabilityProfile) -> bool {
		self.destination == destination && self.profile == *profile
	}
	/// Get the traversal cost of a tile, working it out the first time it
	/// is needed
	pub(super) fn get_or_compute_tile_cost<G: TileGrid>(&mut self, grid: &G, tile: Tile) -> TileCost {
		if let Some(cost) = self.tile_costs.get(tile) {
			return cost;
		}
		let cost = TileCost::compute(grid, &self.profile, tile);
		self.tile_costs.set(tile, Some(cost));
		cost
	}
	/// Get the heuristic distance of a tile to the origin, working it out the
	/// first time it is needed in the current query
	pub(super) fn get_or_compute_h(&mut self, tile: Tile, origin: Tile) -> f32 {
		if let Some(h) = self.h.get(tile).get_value() {
			return h;
		}
		let h = tile.euclidean_distance(&origin);
		self.h.set(tile, Cost::Value(h));
		h
	}
	/// Largest heuristic weight that keeps settled costs exact: no step the
	/// mover can take costs less than this per tile of straight-line distance
	/// it covers. Worked out once per field, like the tile costs it depends
	/// on the grid staying unchanged
	pub(super) fn get_or_compute_heuristic_cap<G: TileGrid>(
		&mut self,
		grid: &G,
		portals: &PortalGraph,
	) -> f32 {
		if let Some(cap) = self.heuristic_cap {
			return cap;
		}
		let walk = grid
			.get_lowest_move_cost()
			.map(|cost| CARDINAL_FACTOR * cost as f32)
			.unwrap_or(f32::INFINITY);
		let bypass = self.profile.get_cheapest_bypass_cost();
		// leaving any tile costs at least this before the step kind is added
		let cheapest_exit = walk.min(bypass);
		// diagonals cover sqrt 2 tiles, over an obstacle they cost no more
		// than a cardinal step
		let mut cap = walk
			.min(bypass / std::f32::consts::SQRT_2)
			.max(MIN_STEP_COST / std::f32::consts::SQRT_2);
		for edge in portals.iter() {
			if !edge.is_usable_by(&self.profile) {
				continue;
			}
			let extra = match edge.get_kind() {
				PortalKind::Stairs => self.profile.get_stair_cost(),
				PortalKind::Ramp => 0.0,
			};
			let distance = edge.get_entry().euclidean_distance(&edge.get_exit());
			if distance > 0.0 {
				cap = cap.min((cheapest_exit + extra).max(MIN_STEP_COST) / distance);
			}
		}
		trace!(
			"Heuristic of CostField towards {:?} capped at {}",
			self.destination,
			cap
		);
		self.heuristic_cap = Some(cap);
		cap
	}
	/// Can a mover step from `from` into `to`, asking the grid only the
	/// first time a transition is seen. Portal steps are always allowed
	pub(super) fn check_move<G: TileGrid>(
		&mut self,
		grid: &G,
		from: Tile,
		to: Tile,
		kind: StepKind,
	) -> bool {
		if !kind.needs_validation() {
			return true;
		}
		if self.forbidden_moves.contains(&(from, to)) {
			return false;
		}
		if !grid.is_valid_move(from, to) {
			self.forbidden_moves.insert((from, to));
			return false;
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn new_field_is_seeded() {
		let dims = GridDimensions::new(5, 5, 0, 0);
		let dest = Tile::new(2, 2, 0);
		let field = CostField::new(dest, CapabilityProfile::default(), dims);
		assert_eq!(Cost::Value(0.0), field.get_g(dest));
		assert_eq!(Some(0), field.get_s(dest));
		assert_eq!(TileState::Open, field.get_state(dest));
		assert_eq!(&[dest], field.get_unbiased_frontier());
		assert_eq!(Cost::Unset, field.get_g(Tile::new(0, 0, 0)));
		assert!(!field.is_explored());
	}
	#[test]
	fn rebuild_keeps_forbidden_moves() {
		let mut map = TileMap::new(GridDimensions::new(5, 5, 0, 0), 100);
		let a = Tile::new(0, 0, 0);
		let b = Tile::new(1, 0, 0);
		map.block_move(a, b);
		let mut field = CostField::new(b, CapabilityProfile::default(), map.get_dimensions());
		assert!(!field.check_move(&map, a, b, StepKind::Cardinal));
		field.rebuild();
		assert!(field.get_forbidden_moves().contains(&(a, b)));
	}
	#[test]
	fn portal_steps_skip_validation() {
		let map = TileMap::new(GridDimensions::new(5, 5, 0, 1), 100);
		let a = Tile::new(0, 0, 0);
		let b = Tile::new(0, 0, 1);
		let mut field = CostField::new(b, CapabilityProfile::default(), map.get_dimensions());
		// no open air so flying up is rejected
		assert!(!field.check_move(&map, a, b, StepKind::Vertical));
		assert!(field.get_forbidden_moves().contains(&(a, b)));
		assert!(field.check_move(&map, a, b, StepKind::Stairs));
	}
	#[test]
	fn heuristic_cap_follows_the_cheapest_step() {
		let dims = GridDimensions::new(5, 5, 0, 1);
		let dest = Tile::new(2, 2, 0);
		let portals = PortalGraph::default();
		let map = TileMap::new(dims, 100);
		let mut field = CostField::new(dest, CapabilityProfile::default(), dims);
		assert_eq!(50.0, field.get_or_compute_heuristic_cap(&map, &portals));
		let mut cheap = TileMap::new(dims, 100);
		cheap.set_move_cost(Tile::new(4, 4, 1), 1);
		let mut field = CostField::new(dest, CapabilityProfile::default(), dims);
		assert_eq!(0.5, field.get_or_compute_heuristic_cap(&cheap, &portals));
		// a free door is crossed at the minimum step cost, diagonally too
		let opener = CapabilityProfile::default().with_door_open_cost(0.0);
		let mut field = CostField::new(dest, opener, dims);
		assert_eq!(
			MIN_STEP_COST / std::f32::consts::SQRT_2,
			field.get_or_compute_heuristic_cap(&map, &portals)
		);
	}
	#[test]
	fn heuristic_cap_covers_distant_stairs() {
		//  stairs 10 tiles apart and free to use
		let dims = GridDimensions::new(11, 1, 0, 1);
		let mut map = TileMap::new(dims, 100);
		map.insert_flags(Tile::new(0, 0, 0), TerrainFlags::STAIRS_UP);
		map.insert_flags(Tile::new(10, 0, 1), TerrainFlags::STAIRS_DOWN);
		let portals = PortalGraph::new(&map);
		assert_eq!(2, portals.len());
		let climber = CapabilityProfile::default().with_stair_cost(0.0);
		let mut field = CostField::new(Tile::new(0, 0, 0), climber, dims);
		let distance = Tile::new(0, 0, 0).euclidean_distance(&Tile::new(10, 0, 1));
		assert_eq!(
			50.0 / distance,
			field.get_or_compute_heuristic_cap(&map, &portals)
		);
	}
	#[test]
	fn profile_identity() {
		let dims = GridDimensions::new(5, 5, 0, 0);
		let dest = Tile::new(2, 2, 0);
		let profile = CapabilityProfile::default().with_door_open_cost(3.0);
		let field = CostField::new(dest, profile.clone(), dims);
		assert!(field.is_for(dest, &profile));
		assert!(!field.is_for(dest, &CapabilityProfile::default()));
		assert!(!field.is_for(Tile::new(0, 0, 0), &profile));
	}
}
