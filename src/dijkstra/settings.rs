//! [RouteSettings] shape a single query: how strongly the expansion is biased
//! towards the origin, which part of the grid the search may explore and how
//! much variety the resulting route may have.
//!
//! A search is "limited" when any of the radius, cone, cost or step limits is
//! finite. Limited searches only settle part of the grid and cannot be reused
//! by later queries, so the cached field gets rebuilt afterwards.
//!

use rand::Rng;

use crate::prelude::*;

/// Per-query shaping parameters
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSettings {
	/// Weight of the straight-line heuristic in cost per tile, `0.0` is plain
	/// Dijkstra. Each field caps it at the cheapest step its mover can take
	h_coeff: f32,
	/// Path diversity in `[-1.0, 1.0]`. `1.0` always takes the best step,
	/// `0.0` picks uniformly and `-1.0` always takes the worst
	alpha: f32,
	/// Tiles further than `dist * coeff / 2` from the midpoint of origin and
	/// destination are not explored
	search_radius_coeff: f32,
	/// Tiles whose bearing from the origin deviates from the bearing of the
	/// destination by more than this many degrees are not explored
	search_cone_angle: f32,
	/// Limit on the number of steps as a multiple of the Chebyshev distance
	max_s_coeff: f32,
	/// Limit on the cost as a multiple of the reference distance
	max_f_coeff: f32,
	/// Queries further apart than this are rejected outright
	max_dist: f32,
	/// Use `max_dist` rather than the origin-destination distance as the
	/// reference distance of `max_f_coeff`
	f_limit_based_on_max_dist: bool,
}

impl Default for RouteSettings {
	fn default() -> Self {
		RouteSettings {
			h_coeff: 1.0,
			alpha: 1.0,
			search_radius_coeff: f32::INFINITY,
			search_cone_angle: 180.0,
			max_s_coeff: f32::INFINITY,
			max_f_coeff: f32::INFINITY,
			max_dist: f32::INFINITY,
			f_limit_based_on_max_dist: true,
		}
	}
}

impl RouteSettings {
	/// Set the heuristic weight. It only changes the order tiles are settled
	/// in, values above the cheapest cost per tile of the mover are capped
	pub fn with_h_coeff(mut self, h_coeff: f32) -> Self {
		self.h_coeff = h_coeff.max(0.0);
		self
	}
	/// Set the path diversity, clamped into `[-1.0, 1.0]`
	pub fn with_alpha(mut self, alpha: f32) -> Self {
		self.alpha = alpha.clamp(-1.0, 1.0);
		self
	}
	/// Set the search radius coefficient
	pub fn with_search_radius_coeff(mut self, coeff: f32) -> Self {
		self.search_radius_coeff = coeff;
		self
	}
	/// Set the search cone half-angle in degrees
	pub fn with_search_cone_angle(mut self, degrees: f32) -> Self {
		self.search_cone_angle = degrees;
		self
	}
	/// Set the step limit coefficient
	pub fn with_max_s_coeff(mut self, coeff: f32) -> Self {
		self.max_s_coeff = coeff;
		self
	}
	/// Set the cost limit coefficient
	pub fn with_max_f_coeff(mut self, coeff: f32) -> Self {
		self.max_f_coeff = coeff;
		self
	}
	/// Set the maximum straight-line distance of a query
	pub fn with_max_dist(mut self, max_dist: f32) -> Self {
		self.max_dist = max_dist;
		self
	}
	/// Choose the reference distance of the cost limit
	pub fn with_f_limit_based_on_max_dist(mut self, based_on_max_dist: bool) -> Self {
		self.f_limit_based_on_max_dist = based_on_max_dist;
		self
	}
	/// Get the heuristic weight
	pub fn get_h_coeff(&self) -> f32 {
		self.h_coeff
	}
	/// Get the path diversity
	pub fn get_alpha(&self) -> f32 {
		self.alpha
	}
	/// Get the search radius coefficient
	pub fn get_search_radius_coeff(&self) -> f32 {
		self.search_radius_coeff
	}
	/// Get the search cone half-angle
	pub fn get_search_cone_angle(&self) -> f32 {
		self.search_cone_angle
	}
	/// Get the step limit coefficient
	pub fn get_max_s_coeff(&self) -> f32 {
		self.max_s_coeff
	}
	/// Get the cost limit coefficient
	pub fn get_max_f_coeff(&self) -> f32 {
		self.max_f_coeff
	}
	/// Get the maximum straight-line distance of a query
	pub fn get_max_dist(&self) -> f32 {
		self.max_dist
	}
	/// Does the search domain depend on where origin and destination are
	pub fn is_relative_search_domain(&self) -> bool {
		self.search_radius_coeff.is_finite() || self.search_cone_angle < 180.0
	}
	/// Does the search only explore part of the grid
	pub fn is_limited(&self) -> bool {
		self.is_relative_search_domain()
			|| self.max_s_coeff.is_finite()
			|| self.max_f_coeff.is_finite()
	}
	/// Is `pos` inside the circle centred on the midpoint of `start` and
	/// `end` whose radius is `distance * coeff / 2`
	pub fn is_in_search_radius(&self, start: Tile, pos: Tile, end: Tile) -> bool {
		if !self.search_radius_coeff.is_finite() {
			return true;
		}
		let mid_x = (start.get_x() + end.get_x()) as f32 / 2.0;
		let mid_y = (start.get_y() + end.get_y()) as f32 / 2.0;
		let mid_z = (start.get_z() + end.get_z()) as f32 / 2.0;
		let dx = pos.get_x() as f32 - mid_x;
		let dy = pos.get_y() as f32 - mid_y;
		let dz = pos.get_z() as f32 - mid_z;
		let radius = start.euclidean_distance(&end) * self.search_radius_coeff / 2.0;
		(dx * dx + dy * dy + dz * dz).sqrt() <= radius
	}
	/// Is the bearing from `start` to `pos` within the cone half-angle of the
	/// bearing from `start` to `end`
	pub fn is_in_search_cone(&self, start: Tile, pos: Tile, end: Tile) -> bool {
		if self.search_cone_angle >= 180.0 || pos == start || end == start {
			return true;
		}
		/// Bearing of `to` seen from `from` in degrees
		fn bearing(from: Tile, to: Tile) -> f32 {
			((to.get_y() - from.get_y()) as f32)
				.atan2((to.get_x() - from.get_x()) as f32)
				.to_degrees()
		}
		let deviation = bearing(start, pos) - bearing(start, end);
		let normalised = (deviation + 540.0).rem_euclid(360.0) - 180.0;
		normalised.abs() <= self.search_cone_angle
	}
	/// The cost ceiling of a query, infinite when unlimited
	pub fn get_max_f(&self, start: Tile, end: Tile) -> f32 {
		if !self.max_f_coeff.is_finite() {
			return f32::INFINITY;
		}
		let reference = if self.f_limit_based_on_max_dist && self.max_dist.is_finite() {
			self.max_dist
		} else {
			start.euclidean_distance(&end)
		};
		self.max_f_coeff * reference
	}
	/// The step ceiling of a query, infinite when unlimited
	pub fn get_max_s(&self, start: Tile, end: Tile) -> f32 {
		if !self.max_s_coeff.is_finite() {
			return f32::INFINITY;
		}
		self.max_s_coeff * start.chebyshev_distance(&end) as f32
	}
	/// Pick an index in `0..n` biased by `alpha`. With `alpha = 1` the first
	/// (best) index is always chosen, with `alpha = -1` the last, with
	/// `alpha = 0` every index is equally likely and in between the choice
	/// is skewed by `floor(n * r^((1 + alpha) / (1 - alpha)))` for a uniform
	/// `r` in `[0, 1)`
	pub fn rank_weighted_index<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> usize {
		if n <= 1 {
			return 0;
		}
		if self.alpha >= 1.0 {
			return 0;
		}
		if self.alpha <= -1.0 {
			return n - 1;
		}
		if self.alpha == 0.0 {
			return rng.random_range(0..n);
		}
		let exponent = (1.0 + self.alpha) / (1.0 - self.alpha);
		let r: f32 = rng.random();
		let index = (n as f32 * r.powf(exponent)).floor() as usize;
		index.min(n - 1)
	}
	/// From a `ron` file generate the [RouteSettings]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Result<Self, PathfindingError> {
		let file = std::fs::File::open(&path).map_err(|source| PathfindingError::Io {
			path: path.clone(),
			source,
		})?;
		ron::de::from_reader(file).map_err(|source| PathfindingError::Ron { path, source })
	}
}
