//! Measure finding a route across an open map with an empty cache
//!
//! World is 200 tiles by 200 tiles on a single level
//!

use bevy_dijkstra_map_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Query from the top left corner to the bottom right one
fn calc(map: &TileMap, portals: &PortalGraph) {
	let mut cache = CostFieldCache::with_seed(0);
	let route = cache.find_route(
		map,
		portals,
		Tile::new(0, 0, 0),
		Tile::new(199, 199, 0),
		None,
		None,
	);
	assert!(!route.is_empty());
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let map = TileMap::new(GridDimensions::new(200, 200, 0, 0), DEFAULT_MOVE_COST);
	let portals = PortalGraph::new(&map);
	group.bench_function("calc_route_open", |b| {
		b.iter(|| calc(black_box(&map), black_box(&portals)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
