//! Incremental expansion of a [CostField].
//!
//! The field grows outwards from its destination. Each call carries on from
//! where the previous one stopped: the tiles left in the unbiased frontier
//! are re-queued with a bias towards the new origin and tiles are settled
//! cheapest first until the origin is reached.
//!
//! When a tile `next` is settled every tile `cur` a mover could step from
//! into `next` is considered:
//!
//! ```text
//!  ___________
//! |__|__|__|__|       cur -> next costs the traversal cost of cur,
//! |__|c_|c_|c_|       g(cur) = min(g(cur), g(next) + step(cur))
//! |__|c_|n_|c_|
//! |__|c_|c_|c_|
//! ```
//!
//! Predecessors also include tiles above and below for fliers and the entry
//! of any portal arriving on `next`.
//!
//! Tiles are settled when popped. The heuristic weight is capped at the
//! cheapest cost the mover can pay per tile of distance, so it never
//! overestimates and the value of a popped tile is final whichever origin
//! the query was biased towards.
//!

use std::collections::HashSet;

use bevy::log::{debug, trace};

use crate::prelude::*;

impl CostField {
	/// Expand the field until `origin` has been settled or is proven to be
	/// out of reach
	pub fn expand_up_to<G: TileGrid>(
		&mut self,
		grid: &G,
		portals: &PortalGraph,
		origin: Tile,
		settings: &RouteSettings,
	) -> ExpansionOutcome {
		if origin == self.destination {
			return ExpansionOutcome::PathFound;
		}
		if !self.dimensions.contains(origin) || !self.dimensions.contains(self.destination) {
			return ExpansionOutcome::PathNotFound;
		}
		if self
			.get_or_compute_tile_cost(grid, self.destination)
			.is_closed()
		{
			return ExpansionOutcome::TargetInaccessible;
		}
		let limited = settings.is_limited();
		if limited || self.domain == SearchDomain::Relative {
			trace!("Rebuilding CostField towards {:?}", self.destination);
			self.rebuild();
		} else {
			match self.state.get(origin) {
				TileState::Accessible => return ExpansionOutcome::PathFound,
				TileState::Impassable => return ExpansionOutcome::TargetInaccessible,
				TileState::Inaccessible => return ExpansionOutcome::NoPathExists,
				_ => {
					if self.is_explored {
						return ExpansionOutcome::NoPathExists;
					}
				}
			}
		}
		self.domain = if limited {
			SearchDomain::Relative
		} else {
			SearchDomain::Absolute
		};

		// bias the retained frontier towards this origin
		self.h.fill(Cost::Unset);
		let h_coeff = settings
			.get_h_coeff()
			.min(self.get_or_compute_heuristic_cap(grid, portals));
		let mut frontier = Frontier::default();
		for tile in std::mem::take(&mut self.unbiased_frontier) {
			if self.state.get(tile) == TileState::Open {
				let g = self.g.get(tile).as_f32();
				let h = self.get_or_compute_h(tile, origin);
				frontier.push(tile, g, h * h_coeff);
			}
		}

		let mut culled: Vec<Tile> = Vec::new();
		let mut area: Option<HashSet<Tile>> = None;
		let mut iterations: usize = 0;
		let outcome = loop {
			if !limited && area.is_none() && iterations > 0 && iterations % CULL_INTERVAL == 0 {
				area = find_enclosed_area(self, portals, origin);
				if let Some(a) = &area {
					debug!(
						"Origin {:?} is enclosed in a pocket of {} tiles, culling the frontier",
						origin,
						a.len()
					);
				}
			}
			let Some(entry) = frontier.pop() else {
				break self.conclude_exhausted(limited, area.as_ref());
			};
			let next = entry.get_tile();
			// stale entry
			if self.state.get(next) != TileState::Open || entry.get_cost() > self.g.get(next).as_f32() {
				continue;
			}
			iterations += 1;
			if let Some(a) = &area {
				if !a.contains(&next) {
					culled.push(next);
					continue;
				}
			}
			if limited && !self.is_in_limited_domain(settings, origin, next) {
				self.state.set(next, TileState::Inaccessible);
				continue;
			}
			self.state.set(next, TileState::Accessible);
			let origin_closed = self.relax_predecessors(grid, portals, origin, next, h_coeff, &mut frontier);
			if next == origin {
				break ExpansionOutcome::PathFound;
			}
			if origin_closed {
				break ExpansionOutcome::TargetInaccessible;
			}
		};

		if limited {
			self.unbiased_frontier.clear();
		} else {
			let mut retained = frontier.into_tiles();
			retained.extend(culled);
			retained.retain(|t| self.state.get(*t) == TileState::Open);
			retained.sort();
			retained.dedup();
			self.unbiased_frontier = retained;
		}
		debug!(
			"Expanded CostField towards {:?} from {:?} in {} iterations: {:?}",
			self.destination, origin, iterations, outcome
		);
		outcome
	}
	/// Discover every tile a mover could step from into `next`, lowering
	/// their tentative costs. Returns `true` when the origin turned out to be
	/// a tile the mover can never traverse
	fn relax_predecessors<G: TileGrid>(
		&mut self,
		grid: &G,
		portals: &PortalGraph,
		origin: Tile,
		next: Tile,
		h_coeff: f32,
		frontier: &mut Frontier,
	) -> bool {
		let g_next = self.g.get(next).as_f32();
		let s_next = self.s.get(next);
		let mut predecessors: Vec<(Tile, StepKind)> = Vec::with_capacity(12);
		for ordinal in Ordinal::get_movement_directions(self.profile.can_fly()) {
			let cur = next.step(*ordinal);
			if self.dimensions.contains(cur) {
				predecessors.push((cur, StepKind::from_ordinal(*ordinal)));
			}
		}
		for edge in portals.get_edges_leading_to(next) {
			if edge.is_usable_by(&self.profile) && self.dimensions.contains(edge.get_entry()) {
				predecessors.push((edge.get_entry(), StepKind::from_portal(edge.get_kind())));
			}
		}

		let mut origin_closed = false;
		for (cur, kind) in predecessors {
			if let Some(s) = s_next {
				if self.s.get(cur).is_none_or(|existing| s + 1 < existing) {
					self.s.set(cur, Some(s + 1));
				}
			}
			if self.state.get(cur).is_settled() {
				continue;
			}
			if !self.check_move(grid, cur, next, kind) {
				continue;
			}
			let tile_cost = self.get_or_compute_tile_cost(grid, cur);
			if tile_cost.is_closed() {
				self.state.set(cur, TileState::Impassable);
				self.g.set(cur, Cost::Unreachable);
				if cur == origin {
					origin_closed = true;
				}
				continue;
			}
			let step = tile_cost.get_step_cost(kind, &self.profile);
			debug_assert!(
				step > 0.0,
				"Step from {:?} into {:?} has a non-positive cost of {}",
				cur,
				next,
				step
			);
			let candidate = Cost::from_f32(g_next + step);
			if candidate.is_lower_than(&self.g.get(cur)) {
				self.g.set(cur, candidate);
				self.p.set(cur, Cost::Value(g_next));
				self.state.set(cur, TileState::Open);
				let h = self.get_or_compute_h(cur, origin);
				frontier.push(cur, candidate.as_f32(), h * h_coeff);
			}
		}
		origin_closed
	}
	/// Is the tile within every limit the settings place on the search
	fn is_in_limited_domain(&self, settings: &RouteSettings, origin: Tile, tile: Tile) -> bool {
		let destination = self.destination;
		if !settings.is_in_search_radius(origin, tile, destination) {
			return false;
		}
		if !settings.is_in_search_cone(origin, tile, destination) {
			return false;
		}
		if self.g.get(tile).as_f32() > settings.get_max_f(origin, destination) {
			return false;
		}
		match self.s.get(tile) {
			Some(s) => s as f32 <= settings.get_max_s(origin, destination),
			None => false,
		}
	}
	/// The frontier ran dry before the origin was settled
	fn conclude_exhausted(
		&mut self,
		limited: bool,
		area: Option<&HashSet<Tile>>,
	) -> ExpansionOutcome {
		if limited {
			return ExpansionOutcome::PathNotFound;
		}
		match area {
			Some(pocket) => {
				// the pocket only connects to the rest of the grid through
				// settled tiles, anything left in it is out of reach
				for tile in pocket.iter() {
					if !self.state.get(*tile).is_settled() {
						self.state.set(*tile, TileState::Inaccessible);
						self.g.set(*tile, Cost::Unreachable);
					}
				}
			}
			None => {
				self.is_explored = true;
				for tile in self.dimensions.iter_tiles() {
					if !self.state.get(tile).is_settled() {
						self.state.set(tile, TileState::Inaccessible);
						self.g.set(tile, Cost::Unreachable);
					}
				}
			}
		}
		ExpansionOutcome::NoPathExists
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	/// Open single level map with a cost of 100 everywhere
	fn open_map(width: u32, height: u32) -> TileMap {
		TileMap::new(GridDimensions::new(width, height, 0, 0), 100)
	}
	#[test]
	fn origin_is_destination() {
		let map = open_map(5, 5);
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(2, 2, 0);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let result = field.expand_up_to(&map, &portals, dest, &RouteSettings::default());
		assert_eq!(ExpansionOutcome::PathFound, result);
	}
	#[test]
	fn settles_open_grid() {
		//  _______________
		// |O_|__|__|__|__|
		// |__|__|__|__|__|
		// |__|__|__|__|__|
		// |__|__|__|__|__|
		// |__|__|__|__|D_|
		let map = open_map(5, 5);
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(4, 4, 0);
		let origin = Tile::new(0, 0, 0);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let result = field.expand_up_to(&map, &portals, origin, &RouteSettings::default());
		assert_eq!(ExpansionOutcome::PathFound, result);
		assert_eq!(Cost::Value(300.0), field.get_g(origin));
		assert_eq!(Some(4), field.get_s(origin));
		assert_eq!(TileState::Accessible, field.get_state(origin));
		// origin's parent sits one diagonal step closer
		assert_eq!(Cost::Value(225.0), field.get_p(origin));
	}
	#[test]
	fn oversized_heuristic_is_capped() {
		//  _______________
		// |O_|__|x_|__|__|
		// |__|__|x_|__|__|
		// |__|__|x_|__|__|
		// |__|__|x_|__|__|
		// |__|__|__|__|D_|
		let mut map = open_map(5, 5);
		for y in 0..4 {
			map.set_tile_definition(Tile::new(2, y, 0), TileDefinition::wall());
		}
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(4, 4, 0);
		let origin = Tile::new(0, 0, 0);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let greedy = RouteSettings::default().with_h_coeff(1000.0);
		let result = field.expand_up_to(&map, &portals, origin, &greedy);
		assert_eq!(ExpansionOutcome::PathFound, result);
		assert_eq!(Cost::Value(350.0), field.get_g(origin));
	}
	#[test]
	fn settled_tiles_do_not_regress() {
		let map = open_map(12, 12);
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(6, 6, 0);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let settings = RouteSettings::default();
		field.expand_up_to(&map, &portals, Tile::new(8, 6, 0), &settings);
		let before: Vec<(Tile, Cost)> = map
			.get_dimensions()
			.iter_tiles()
			.filter(|t| field.is_settled(*t))
			.map(|t| (t, field.get_g(t)))
			.collect();
		assert!(!before.is_empty());
		field.expand_up_to(&map, &portals, Tile::new(0, 11, 0), &settings);
		for (tile, g) in before {
			assert!(field.is_settled(tile));
			assert_eq!(g, field.get_g(tile));
		}
	}
	#[test]
	fn repeated_query_short_circuits() {
		let map = open_map(6, 6);
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(0, 0, 0);
		let origin = Tile::new(5, 5, 0);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let settings = RouteSettings::default();
		assert_eq!(
			ExpansionOutcome::PathFound,
			field.expand_up_to(&map, &portals, origin, &settings)
		);
		let g = field.get_g(origin);
		let frontier = field.get_unbiased_frontier().to_vec();
		assert_eq!(
			ExpansionOutcome::PathFound,
			field.expand_up_to(&map, &portals, origin, &settings)
		);
		assert_eq!(g, field.get_g(origin));
		assert_eq!(frontier, field.get_unbiased_frontier());
	}
	#[test]
	fn walled_origin_has_no_path() {
		//  _______________
		// |D_|__|__|__|__|
		// |__|x_|x_|x_|__|
		// |__|x_|O_|x_|__|
		// |__|x_|x_|x_|__|
		// |__|__|__|__|__|
		let mut map = open_map(5, 5);
		for (x, y) in [(1, 1), (2, 1), (3, 1), (1, 2), (3, 2), (1, 3), (2, 3), (3, 3)] {
			map.set_tile_definition(Tile::new(x, y, 0), TileDefinition::wall());
		}
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(0, 0, 0);
		let origin = Tile::new(2, 2, 0);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let settings = RouteSettings::default();
		assert_eq!(
			ExpansionOutcome::NoPathExists,
			field.expand_up_to(&map, &portals, origin, &settings)
		);
		assert!(field.is_explored());
		assert_eq!(Cost::Unreachable, field.get_g(origin));
		assert_eq!(TileState::Impassable, field.get_state(Tile::new(1, 1, 0)));
		// cached
		assert_eq!(
			ExpansionOutcome::NoPathExists,
			field.expand_up_to(&map, &portals, origin, &settings)
		);
	}
	#[test]
	fn closed_destination_is_inaccessible() {
		let mut map = open_map(5, 5);
		let dest = Tile::new(4, 4, 0);
		map.set_tile_definition(dest, TileDefinition::wall());
		let portals = PortalGraph::new(&map);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let result = field.expand_up_to(&map, &portals, Tile::new(0, 0, 0), &RouteSettings::default());
		assert_eq!(ExpansionOutcome::TargetInaccessible, result);
	}
	#[test]
	fn closed_origin_is_inaccessible() {
		let mut map = open_map(5, 5);
		let origin = Tile::new(1, 1, 0);
		map.set_tile_definition(origin, TileDefinition::wall());
		let portals = PortalGraph::new(&map);
		let mut field = CostField::new(Tile::new(4, 4, 0), CapabilityProfile::default(), map.get_dimensions());
		let settings = RouteSettings::default();
		assert_eq!(
			ExpansionOutcome::TargetInaccessible,
			field.expand_up_to(&map, &portals, origin, &settings)
		);
		assert_eq!(TileState::Impassable, field.get_state(origin));
		assert_eq!(
			ExpansionOutcome::TargetInaccessible,
			field.expand_up_to(&map, &portals, origin, &settings)
		);
	}
	#[test]
	fn limited_search_gives_up_and_rebuilds() {
		//  _____________________
		// |__|__|__|__|__|__|__|
		// |__|__|__|x_|__|__|__|
		// |__|__|__|x_|__|__|__|
		// |O_|__|__|x_|__|__|D_|
		// |__|__|__|x_|__|__|__|
		// |__|__|__|x_|__|__|__|
		// |__|__|__|__|__|__|__|
		let mut map = open_map(7, 7);
		for y in 1..6 {
			map.set_tile_definition(Tile::new(3, y, 0), TileDefinition::wall());
		}
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(6, 3, 0);
		let origin = Tile::new(0, 3, 0);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let narrow = RouteSettings::default().with_search_cone_angle(20.0);
		assert_eq!(
			ExpansionOutcome::PathNotFound,
			field.expand_up_to(&map, &portals, origin, &narrow)
		);
		assert_eq!(SearchDomain::Relative, field.get_domain());
		let unlimited = RouteSettings::default();
		assert_eq!(
			ExpansionOutcome::PathFound,
			field.expand_up_to(&map, &portals, origin, &unlimited)
		);
		assert_eq!(SearchDomain::Absolute, field.get_domain());
		// six diagonals through the gap at the end of the wall
		assert_eq!(Cost::Value(450.0), field.get_g(origin));
	}
	#[test]
	fn step_limit_rejects_detours() {
		let mut map = open_map(7, 7);
		for y in 1..6 {
			map.set_tile_definition(Tile::new(3, y, 0), TileDefinition::wall());
		}
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(6, 3, 0);
		let origin = Tile::new(0, 3, 0);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		// straight line is 6 steps, the detour needs 6 as well
		let tight = RouteSettings::default().with_max_s_coeff(1.0);
		assert_eq!(
			ExpansionOutcome::PathFound,
			field.expand_up_to(&map, &portals, origin, &tight)
		);
		let mut field = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		let tighter = RouteSettings::default().with_max_s_coeff(0.5);
		assert_eq!(
			ExpansionOutcome::PathNotFound,
			field.expand_up_to(&map, &portals, origin, &tighter)
		);
	}
	#[test]
	fn flier_crosses_levels_through_open_air() {
		let mut map = TileMap::new(GridDimensions::new(5, 5, 0, 1), 100);
		map.insert_flags(Tile::new(2, 2, 1), TerrainFlags::NO_FLOOR);
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(2, 2, 1);
		let origin = Tile::new(2, 2, 0);
		let flier = CapabilityProfile::default().with_fly_cost(20.0);
		let mut field = CostField::new(dest, flier, map.get_dimensions());
		let result = field.expand_up_to(&map, &portals, origin, &RouteSettings::default());
		assert_eq!(ExpansionOutcome::PathFound, result);
		assert_eq!(Cost::Value(70.0), field.get_g(origin));
		// floors block flying up anywhere else
		assert!(field
			.get_forbidden_moves()
			.contains(&(Tile::new(2, 1, 0), Tile::new(2, 1, 1))));
	}
	#[test]
	fn walker_cannot_use_stairs_without_capability() {
		let mut map = TileMap::new(GridDimensions::new(5, 5, 0, 1), 100);
		map.insert_flags(Tile::new(4, 4, 0), TerrainFlags::STAIRS_UP);
		map.insert_flags(Tile::new(4, 4, 1), TerrainFlags::STAIRS_DOWN);
		let portals = PortalGraph::new(&map);
		let dest = Tile::new(0, 0, 1);
		let origin = Tile::new(0, 0, 0);
		let mut walker = CostField::new(dest, CapabilityProfile::default(), map.get_dimensions());
		assert_eq!(
			ExpansionOutcome::NoPathExists,
			walker.expand_up_to(&map, &portals, origin, &RouteSettings::default())
		);
		let climber = CapabilityProfile::default().with_stair_cost(10.0);
		let mut field = CostField::new(dest, climber, map.get_dimensions());
		assert_eq!(
			ExpansionOutcome::PathFound,
			field.expand_up_to(&map, &portals, origin, &RouteSettings::default())
		);
		// 4 diagonals, one flight of stairs, 4 diagonals
		assert_eq!(Cost::Value(660.0), field.get_g(origin));
	}
}
