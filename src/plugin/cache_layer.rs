//! Logic for keeping the [PortalGraph] and the [CostFieldCache] in step with
//! the grid. Cached fields are only valid while nothing on the map moves, so
//! they are thrown away at the end of every turn and whenever the map is
//! reloaded
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Sent when a turn ends, terrain and actors may have changed so every
/// cached [CostField] is dropped
#[derive(Event, Default)]
pub struct EventTurnEnded;

/// Sent after the grid resource has been replaced or edited in a way that
/// moves stairs or ramps
#[derive(Event, Default)]
pub struct EventMapReloaded;

/// Scan the grid for stairs and ramps when the app starts
#[cfg(not(tarpaulin_include))]
pub fn build_portal_graph<G: TileGrid + Resource>(
	grid: Option<Res<G>>,
	mut portal_graph: ResMut<PortalGraph>,
) {
	match grid {
		Some(grid) => {
			portal_graph.reset_graph(grid.as_ref());
		}
		None => error!("No grid resource found, the PortalGraph is left empty"),
	}
}

/// Drop every cached field once a turn has ended
#[cfg(not(tarpaulin_include))]
pub fn clear_cache_on_turn_end(
	mut events: EventReader<EventTurnEnded>,
	mut cache: ResMut<CostFieldCache>,
) {
	// coalesce, one clear is enough however many turns ended
	if !events.is_empty() {
		events.clear();
		cache.clear_cached_routes();
	}
}

/// Rescan the grid for portals and drop every cached field
#[cfg(not(tarpaulin_include))]
pub fn rebuild_portal_graph<G: TileGrid + Resource>(
	mut events: EventReader<EventMapReloaded>,
	grid: Option<Res<G>>,
	mut portal_graph: ResMut<PortalGraph>,
	mut cache: ResMut<CostFieldCache>,
) {
	if events.is_empty() {
		return;
	}
	events.clear();
	match grid {
		Some(grid) => {
			portal_graph.reset_graph(grid.as_ref());
		}
		None => {
			error!("No grid resource found, clearing the PortalGraph");
			*portal_graph = PortalGraph::default();
		}
	}
	cache.clear_cached_routes();
}
