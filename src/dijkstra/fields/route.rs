//! Builds a [Route] by walking downhill through a [CostField].
//!
//! From the origin every settled neighbour that is cheaper than the current
//! tile is a candidate, as is the exit of any portal the mover can use. The
//! candidates are ranked by the cost of getting to the destination through
//! them:
//!
//! ```text
//!  _______________________________
//! |     |     |     |     |     |
//! | 300 | 250 | 200 | 150 | 100 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! | 250 |>225 | 175 | 125 |  75 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! | 200 | 175 | 150 | 100 |  50 |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! Standing on the `300` corner the diagonal `225` reached for `75` is the
//! best candidate, `250` reached for `50` comes next. The settings decide how
//! far down the ranking a step may reach, with the default of always taking
//! the best the cost of the route equals the `g` value of the origin.
//!

use bevy::log::{trace, warn};
use rand::Rng;

use crate::prelude::*;

impl CostField {
	/// Expand the field as far as needed and walk from `origin` to the
	/// destination
	pub fn get_route<G: TileGrid, R: Rng + ?Sized>(
		&mut self,
		grid: &G,
		portals: &PortalGraph,
		origin: Tile,
		settings: &RouteSettings,
		rng: &mut R,
	) -> Result<Route, RouteError> {
		if !self.dimensions.contains(origin) || !self.dimensions.contains(self.destination) {
			return Err(RouteError::OutOfBounds);
		}
		if origin == self.destination {
			return Ok(Route::new(vec![origin], 0.0));
		}
		let outcome = self.expand_up_to(grid, portals, origin, settings);
		if let Some(err) = outcome.as_route_error() {
			return Err(err);
		}
		let max_f = settings.get_max_f(origin, self.destination);
		if self.g.get(origin).as_f32() > max_f {
			return Err(RouteError::ExceedsCostLimit);
		}
		let max_s = settings.get_max_s(origin, self.destination);

		let mut tiles = vec![origin];
		let mut total = 0.0;
		let mut current = origin;
		while current != self.destination {
			let mut candidates = self.get_descending_steps(grid, portals, current);
			if candidates.is_empty() {
				warn!(
					"No descending step from {:?} towards {:?}",
					current, self.destination
				);
				return Err(RouteError::NoDescendingStep(current));
			}
			candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
			let index = settings.rank_weighted_index(candidates.len(), rng);
			let (next, via, step) = candidates[index];
			trace!("Route step {:?} -> {:?} via {}", current, next, via);
			total += step;
			tiles.push(next);
			current = next;
			// a varied route may stray above the cost of the best one
			if total > max_f {
				return Err(RouteError::ExceedsCostLimit);
			}
			if (tiles.len() - 1) as f32 > max_s {
				return Err(RouteError::ExceedsStepLimit);
			}
		}
		Ok(Route::new(tiles, total))
	}
	/// Settled tiles cheaper than `current` a mover could step to, paired
	/// with the cost of reaching the destination through them and the cost
	/// of the step itself
	fn get_descending_steps<G: TileGrid>(
		&mut self,
		grid: &G,
		portals: &PortalGraph,
		current: Tile,
	) -> Vec<(Tile, f32, f32)> {
		let current_g = self.g.get(current);
		let mut steps: Vec<(Tile, StepKind)> = Vec::with_capacity(12);
		for ordinal in Ordinal::get_movement_directions(self.profile.can_fly()) {
			steps.push((current.step(*ordinal), StepKind::from_ordinal(*ordinal)));
		}
		for edge in portals.get_edges_leaving(current) {
			if edge.is_usable_by(&self.profile) {
				steps.push((edge.get_exit(), StepKind::from_portal(edge.get_kind())));
			}
		}
		let tile_cost = self.get_or_compute_tile_cost(grid, current);
		let mut candidates = Vec::with_capacity(steps.len());
		for (next, kind) in steps {
			if !self.dimensions.contains(next) || self.state.get(next) != TileState::Accessible {
				continue;
			}
			let next_g = self.g.get(next);
			if !next_g.is_lower_than(&current_g) {
				continue;
			}
			if !self.check_move(grid, current, next, kind) {
				continue;
			}
			let step = tile_cost.get_step_cost(kind, &self.profile);
			let via = next_g.as_f32() + step;
			if via.is_finite() {
				candidates.push((next, via, step));
			}
		}
		candidates
	}
}
