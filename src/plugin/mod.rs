//! Defines the Bevy [Plugin] for Dijkstra map pathfinding
//!

use std::marker::PhantomData;

use crate::prelude::*;
use bevy::prelude::*;

pub mod cache_layer;
pub mod route_layer;

/// Order in which the systems of the plugin run within `Update`
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Invalidate cached data
	Tidy,
	/// Answer route requests
	Calculate,
}

/// Adds pathfinding over the grid resource `G`. The grid must be inserted
/// before the app starts so the [PortalGraph] can be built from it
pub struct DijkstraMapPlugin<G: TileGrid + Resource> {
	/// The grid type to search
	grid: PhantomData<fn() -> G>,
}

impl<G: TileGrid + Resource> Default for DijkstraMapPlugin<G> {
	fn default() -> Self {
		DijkstraMapPlugin { grid: PhantomData }
	}
}

impl<G: TileGrid + Resource> Plugin for DijkstraMapPlugin<G> {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<Tile>()
			.register_type::<Ordinal>()
			.register_type::<GridDimensions>()
			.register_type::<TerrainFlags>()
			.register_type::<PortalKind>()
			.register_type::<PortalEdge>()
			.register_type::<Route>()
			.init_resource::<CostFieldCache>()
			.init_resource::<PortalGraph>()
			.add_event::<cache_layer::EventTurnEnded>()
			.add_event::<cache_layer::EventMapReloaded>()
			.add_event::<route_layer::EventRouteRequest>()
			.configure_sets(Update, (OrderingSet::Tidy, OrderingSet::Calculate).chain())
			.add_systems(Startup, cache_layer::build_portal_graph::<G>)
			.add_systems(
				Update,
				(
					(
						cache_layer::rebuild_portal_graph::<G>,
						cache_layer::clear_cache_on_turn_end,
					)
						.chain()
						.in_set(OrderingSet::Tidy),
					route_layer::process_route_requests::<G>.in_set(OrderingSet::Calculate),
				),
			);
	}
}
