//! `use bevy_dijkstra_map_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::dijkstra::{
	cache::*,
	capability::*,
	cost::*,
	fields::{boundary::*, cost_field::*, frontier::*, tile_cost::*, *},
	grid::{tile_map::*, *},
	portal::portal_graph::*,
	settings::*,
	utilities::*,
};

#[doc(hidden)]
pub use crate::{
	error::*,
	plugin::{cache_layer::*, route_layer::*, *},
};
