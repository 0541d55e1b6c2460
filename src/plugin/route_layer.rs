//! Logic for answering route requests. An actor asks for a route by sending
//! an [EventRouteRequest], once it has been processed a [Route] component is
//! inserted on the actor
//!

use std::collections::BTreeMap;

use crate::prelude::*;
use bevy::prelude::*;

/// Ask for a route from `origin` to `destination` for an actor
#[derive(Event, Clone, Debug)]
pub struct EventRouteRequest {
	/// Entity the [Route] is inserted on
	actor: Entity,
	/// Where the actor stands
	origin: Tile,
	/// Where the actor wants to go
	destination: Tile,
	/// Abilities of the actor, the default profile when `None`
	profile: Option<CapabilityProfile>,
	/// Shaping of the query, the default settings when `None`
	settings: Option<RouteSettings>,
}

impl EventRouteRequest {
	/// Create a new instance of [EventRouteRequest]
	pub fn new(actor: Entity, origin: Tile, destination: Tile) -> Self {
		EventRouteRequest {
			actor,
			origin,
			destination,
			profile: None,
			settings: None,
		}
	}
	/// Route for a mover with the given abilities
	pub fn with_profile(mut self, profile: CapabilityProfile) -> Self {
		self.profile = Some(profile);
		self
	}
	/// Route shaped by the given settings
	pub fn with_settings(mut self, settings: RouteSettings) -> Self {
		self.settings = Some(settings);
		self
	}
	/// Entity the route is for
	pub fn get_actor(&self) -> Entity {
		self.actor
	}
	/// Tile the route starts on
	pub fn get_origin(&self) -> Tile {
		self.origin
	}
	/// Tile the route ends on
	pub fn get_destination(&self) -> Tile {
		self.destination
	}
	/// Abilities of the actor if any were given
	pub fn get_profile(&self) -> Option<&CapabilityProfile> {
		self.profile.as_ref()
	}
	/// Query settings if any were given
	pub fn get_settings(&self) -> Option<&RouteSettings> {
		self.settings.as_ref()
	}
}

/// Read [EventRouteRequest]s and insert the resulting [Route] on each actor.
/// An empty [Route] means no path could be found
#[cfg(not(tarpaulin_include))]
pub fn process_route_requests<G: TileGrid + Resource>(
	mut events: EventReader<EventRouteRequest>,
	grid: Option<Res<G>>,
	portal_graph: Res<PortalGraph>,
	mut cache: ResMut<CostFieldCache>,
	mut commands: Commands,
) {
	if events.is_empty() {
		return;
	}
	let Some(grid) = grid else {
		error!("No grid resource found, route requests are ignored");
		events.clear();
		return;
	};
	// coalesce, only the latest request of an actor is answered
	let mut latest: BTreeMap<Entity, &EventRouteRequest> = BTreeMap::new();
	for event in events.read() {
		latest.insert(event.get_actor(), event);
	}
	for (actor, request) in latest {
		let route = match cache.try_find_route(
			grid.as_ref(),
			&portal_graph,
			request.get_origin(),
			request.get_destination(),
			request.get_profile(),
			request.get_settings(),
		) {
			Ok(route) => route,
			Err(err) => {
				debug!("Route request of {:?} failed: {}", actor, err);
				Route::default()
			}
		};
		trace!("Inserting route of {} tiles on {:?}", route.len(), actor);
		commands.entity(actor).try_insert(route);
	}
}
