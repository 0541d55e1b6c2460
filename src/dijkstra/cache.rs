//! The [CostFieldCache] keeps a [CostField] for every destination and mover
//! that has been asked for so far. Every query towards the same destination
//! by the same kind of mover grows the same field, so after a few queries
//! most routes are answered straight from settled values.
//!
//! The cache knows nothing about the grid changing. Whenever the terrain,
//! obstacles or actors move the caller is expected to clear it, the plugin
//! does so at the end of every turn.
//!

use bevy::{
	log::{debug, trace},
	prelude::Resource,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::prelude::*;

/// Cache of [CostField]s keyed by destination and [CapabilityProfile]
#[derive(Resource)]
pub struct CostFieldCache {
	/// Fields in the order they were created
	fields: Vec<CostField>,
	/// Source of randomness for routes with variety
	rng: StdRng,
}

impl Default for CostFieldCache {
	fn default() -> Self {
		CostFieldCache {
			fields: Vec::new(),
			rng: StdRng::from_os_rng(),
		}
	}
}

impl CostFieldCache {
	/// Create a cache whose route variety is reproducible
	pub fn with_seed(seed: u64) -> Self {
		CostFieldCache {
			fields: Vec::new(),
			rng: StdRng::seed_from_u64(seed),
		}
	}
	/// Find a route from `origin` to `destination`. The route starts with the
	/// origin and ends with the destination, it is empty when no route could
	/// be found. Without a profile or settings their defaults are used
	pub fn find_route<G: TileGrid>(
		&mut self,
		grid: &G,
		portals: &PortalGraph,
		origin: Tile,
		destination: Tile,
		profile: Option<&CapabilityProfile>,
		settings: Option<&RouteSettings>,
	) -> Vec<Tile> {
		match self.try_find_route(grid, portals, origin, destination, profile, settings) {
			Ok(route) => route.into_tiles(),
			Err(err) => {
				debug!(
					"No route from {:?} to {:?}: {}",
					origin, destination, err
				);
				Vec::new()
			}
		}
	}
	/// Find a route from `origin` to `destination` reporting why it could not
	/// be found
	pub fn try_find_route<G: TileGrid>(
		&mut self,
		grid: &G,
		portals: &PortalGraph,
		origin: Tile,
		destination: Tile,
		profile: Option<&CapabilityProfile>,
		settings: Option<&RouteSettings>,
	) -> Result<Route, RouteError> {
		let dimensions = grid.get_dimensions();
		if !dimensions.contains(origin) || !dimensions.contains(destination) {
			return Err(RouteError::OutOfBounds);
		}
		if origin == destination {
			return Ok(Route::new(vec![origin], 0.0));
		}
		let default_settings;
		let settings = match settings {
			Some(s) => s,
			None => {
				default_settings = RouteSettings::default();
				&default_settings
			}
		};
		if origin.euclidean_distance(&destination) > settings.get_max_dist() {
			return Err(RouteError::BeyondMaxDistance);
		}
		let default_profile;
		let profile = match profile {
			Some(p) => p,
			None => {
				default_profile = CapabilityProfile::default();
				&default_profile
			}
		};
		let index = self.get_or_insert_field(destination, profile, dimensions);
		let field = &mut self.fields[index];
		field.get_route(grid, portals, origin, settings, &mut self.rng)
	}
	/// Drop every cached field, required whenever the grid has changed
	pub fn clear_cached_routes(&mut self) {
		debug!("Clearing {} cached CostFields", self.fields.len());
		self.fields.clear();
	}
	/// Get the field of a destination and mover if it has been created
	pub fn get_field(&self, destination: Tile, profile: &CapabilityProfile) -> Option<&CostField> {
		self.fields.iter().find(|f| f.is_for(destination, profile))
	}
	/// Number of cached fields
	pub fn len(&self) -> usize {
		self.fields.len()
	}
	/// Is the cache empty
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
	/// Index of the field of a destination and mover, creating it when
	/// missing or when it was built for a grid of a different size
	fn get_or_insert_field(
		&mut self,
		destination: Tile,
		profile: &CapabilityProfile,
		dimensions: GridDimensions,
	) -> usize {
		if let Some(index) = self
			.fields
			.iter()
			.position(|f| f.is_for(destination, profile))
		{
			if self.fields[index].get_dimensions() == dimensions {
				trace!("Reusing CostField for {:?}", destination);
				return index;
			}
			trace!("Grid resized, replacing CostField for {:?}", destination);
			self.fields[index] = CostField::new(destination, profile.clone(), dimensions);
			return index;
		}
		self.fields
			.push(CostField::new(destination, profile.clone(), dimensions));
		self.fields.len() - 1
	}
}
