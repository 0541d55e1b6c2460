//! Detects when the origin of a query sits in a pocket of unsettled tiles
//! completely surrounded by settled ones. Expansion elsewhere cannot change
//! anything inside such a pocket so the frontier can be cut down to the
//! pocket alone.
//!
//! ```text
//!  _____________________
//! |__|__|__|__|__|__|__|       s settled
//! |__|s_|s_|s_|s_|s_|__|       . unsettled pocket
//! |__|s_|._|._|._|s_|__|       O origin
//! |__|s_|._|O_|._|s>|__|       > probe hit, the trace starts here
//! |__|s_|._|._|._|s_|__|
//! |__|s_|s_|s_|s_|s_|__|
//! |__|__|__|__|__|__|__|
//! ```
//!
//! 1. probe east from the origin until a settled tile is hit
//! 2. trace the boundary of the settled region with Moore neighbour tracing,
//!    clockwise, until the start is re-entered from the direction it was
//!    first entered from (Jacob's stopping criterion)
//! 3. deduplicate the traced tiles into a polygon and test whether the origin
//!    is inside it by counting edge crossings
//! 4. flood fill the pocket from the origin
//!
//! The flood fill has the final say. It gives up if the pocket touches the
//! edge of the map or a portal, and the whole check is skipped for fliers,
//! so a pocket is only ever reported when it truly cannot be entered from
//! outside.
//!

use std::collections::{HashSet, VecDeque};

use bevy::log::warn;

use crate::prelude::*;

/// How many expansion iterations pass between enclosure checks
pub const CULL_INTERVAL: usize = 200;

/// Moore neighbourhood offsets in clockwise order starting north (rows grow
/// southwards)
const MOORE_OFFSETS: [(i32, i32); 8] = [
	(0, -1),
	(1, -1),
	(1, 0),
	(1, 1),
	(0, 1),
	(-1, 1),
	(-1, 0),
	(-1, -1),
];
/// Index of the western neighbour within [MOORE_OFFSETS]
const WEST: usize = 6;

/// Find the pocket of unsettled tiles containing `origin` if it is enclosed
/// by settled tiles
pub fn find_enclosed_area(
	field: &CostField,
	portals: &PortalGraph,
	origin: Tile,
) -> Option<HashSet<Tile>> {
	if field.get_profile().can_fly() {
		return None;
	}
	let dimensions = field.get_dimensions();
	let z = origin.get_z();
	let is_settled = |x: i32, y: i32| {
		let tile = Tile::new(x, y, z);
		dimensions.contains(tile) && field.is_settled(tile)
	};
	let start = probe_east(&is_settled, (origin.get_x(), origin.get_y()), dimensions.get_width())?;
	let cap = 4 * dimensions.get_width() as usize * dimensions.get_height() as usize + 8;
	let contour = trace_boundary(&is_settled, start, cap)?;
	let polygon = dedup_vertices(contour);
	if polygon.len() < 3 {
		return None;
	}
	if !is_point_enclosed(&polygon, (origin.get_x(), origin.get_y())) {
		return None;
	}
	flood_fill_pocket(origin, dimensions, |t| field.is_settled(t), |t| {
		portals.is_endpoint(t)
	})
}

/// Walk east from `from` to the first settled position, `None` if the edge
/// of the map is reached first
pub fn probe_east<F: Fn(i32, i32) -> bool>(
	is_settled: &F,
	from: (i32, i32),
	width: u32,
) -> Option<(i32, i32)> {
	((from.0 + 1)..width as i32)
		.map(|x| (x, from.1))
		.find(|(x, y)| is_settled(*x, *y))
}

/// Moore neighbour tracing of the settled region containing `start`, which
/// must have been reached from its western neighbour. Returns the visited
/// boundary positions in clockwise order, `None` for an isolated position or
/// when the trace does not close within `cap` steps
pub fn trace_boundary<F: Fn(i32, i32) -> bool>(
	is_settled: &F,
	start: (i32, i32),
	cap: usize,
) -> Option<Vec<(i32, i32)>> {
	let mut contour = vec![start];
	let mut current = start;
	let mut backtrack = WEST;
	for _ in 0..cap {
		// search clockwise from the backtrack direction
		let mut found = None;
		for i in 1..=8 {
			let d = (backtrack + i) % 8;
			let candidate = (current.0 + MOORE_OFFSETS[d].0, current.1 + MOORE_OFFSETS[d].1);
			if is_settled(candidate.0, candidate.1) {
				found = Some((d, candidate));
				break;
			}
		}
		let (d, next) = found?;
		// the last unsettled position examined becomes the new backtrack
		let previous_d = (d + 7) % 8;
		let previous = (
			current.0 + MOORE_OFFSETS[previous_d].0,
			current.1 + MOORE_OFFSETS[previous_d].1,
		);
		backtrack = moore_direction(next, previous)?;
		current = next;
		if current == start && backtrack == WEST {
			return Some(contour);
		}
		contour.push(current);
	}
	warn!("Boundary trace from {:?} did not close, skipping", start);
	None
}

/// Index within [MOORE_OFFSETS] of `to` seen from `from`
fn moore_direction(from: (i32, i32), to: (i32, i32)) -> Option<usize> {
	let offset = (to.0 - from.0, to.1 - from.1);
	MOORE_OFFSETS.iter().position(|o| *o == offset)
}

/// Keep the first occurrence of each vertex
pub fn dedup_vertices(contour: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
	let mut seen = HashSet::new();
	contour.into_iter().filter(|v| seen.insert(*v)).collect()
}

/// Crossing number test. Each edge counts its lower end and not its upper
/// one so a ray through a vertex is counted once
pub fn is_point_enclosed(polygon: &[(i32, i32)], point: (i32, i32)) -> bool {
	let (px, py) = (point.0 as f32, point.1 as f32);
	let mut inside = false;
	for i in 0..polygon.len() {
		let a = polygon[i];
		let b = polygon[(i + 1) % polygon.len()];
		let (ax, ay) = (a.0 as f32, a.1 as f32);
		let (bx, by) = (b.0 as f32, b.1 as f32);
		if (ay > py) != (by > py) {
			let crossing_x = ax + (py - ay) * (bx - ax) / (by - ay);
			if px < crossing_x {
				inside = !inside;
			}
		}
	}
	inside
}

/// 8-connected flood fill of unsettled tiles on the level of `origin`.
/// `None` if the fill reaches the edge of the map or a portal
pub fn flood_fill_pocket<S, P>(
	origin: Tile,
	dimensions: GridDimensions,
	is_settled: S,
	is_portal: P,
) -> Option<HashSet<Tile>>
where
	S: Fn(Tile) -> bool,
	P: Fn(Tile) -> bool,
{
	let mut pocket = HashSet::from([origin]);
	let mut queue = VecDeque::from([origin]);
	while let Some(tile) = queue.pop_front() {
		if dimensions.is_on_edge(tile) || is_portal(tile) {
			return None;
		}
		for ordinal in Ordinal::get_movement_directions(false) {
			let neighbour = tile.step(*ordinal);
			if !dimensions.contains(neighbour) || is_settled(neighbour) {
				continue;
			}
			if pocket.insert(neighbour) {
				queue.push_back(neighbour);
			}
		}
	}
	Some(pocket)
}

#[cfg(test)]
mod tests {
	use super::*;
	/// Build a predicate from rows of `s` (settled) and `.` (unsettled)
	fn grid(rows: &[&str]) -> impl Fn(i32, i32) -> bool {
		let cells: Vec<Vec<bool>> = rows
			.iter()
			.map(|r| r.chars().map(|c| c == 's').collect())
			.collect();
		move |x: i32, y: i32| {
			if x < 0 || y < 0 {
				return false;
			}
			cells
				.get(y as usize)
				.and_then(|r| r.get(x as usize))
				.copied()
				.unwrap_or(false)
		}
	}
	#[test]
	fn probe_finds_first_settled() {
		let is_settled = grid(&["..s.s"]);
		assert_eq!(Some((2, 0)), probe_east(&is_settled, (0, 0), 5));
		assert_eq!(Some((4, 0)), probe_east(&is_settled, (2, 0), 5));
		assert_eq!(None, probe_east(&is_settled, (4, 0), 5));
	}
	#[test]
	fn trace_ring_encloses_origin() {
		let rows = [
			".......", //
			".sssss.", //
			".s...s.", //
			".s...s.", //
			".s...s.", //
			".sssss.", //
			".......",
		];
		let is_settled = grid(&rows);
		let origin = (3, 3);
		let start = probe_east(&is_settled, origin, 7).unwrap();
		assert_eq!((5, 3), start);
		let contour = trace_boundary(&is_settled, start, 500).unwrap();
		let polygon = dedup_vertices(contour);
		// corners of the ring are stepped over diagonally
		assert_eq!(12, polygon.len());
		assert!(is_point_enclosed(&polygon, origin));
	}
	#[test]
	fn trace_blob_does_not_enclose() {
		let rows = [
			".......", //
			"....ss.", //
			"....ss.", //
			".......",
		];
		let is_settled = grid(&rows);
		let origin = (1, 1);
		let start = probe_east(&is_settled, origin, 7).unwrap();
		let contour = trace_boundary(&is_settled, start, 500).unwrap();
		let polygon = dedup_vertices(contour);
		assert_eq!(4, polygon.len());
		assert!(!is_point_enclosed(&polygon, origin));
	}
	#[test]
	fn isolated_point_is_skipped() {
		let is_settled = grid(&["...", ".s.", "..."]);
		assert_eq!(None, trace_boundary(&is_settled, (1, 1), 100));
	}
	#[test]
	fn crossing_parity_square() {
		let square = [(0, 0), (4, 0), (4, 4), (0, 4)];
		assert!(is_point_enclosed(&square, (2, 2)));
		assert!(!is_point_enclosed(&square, (5, 2)));
		assert!(!is_point_enclosed(&square, (2, 6)));
	}
	#[test]
	fn flood_fill_stops_at_edges_and_portals() {
		let dims = GridDimensions::new(7, 7, 0, 0);
		let ring = |t: Tile| {
			(t.get_x() == 1 || t.get_x() == 5) && (1..=5).contains(&t.get_y())
				|| (t.get_y() == 1 || t.get_y() == 5) && (1..=5).contains(&t.get_x())
		};
		let origin = Tile::new(3, 3, 0);
		let pocket = flood_fill_pocket(origin, dims, ring, |_| false).unwrap();
		assert_eq!(9, pocket.len());
		assert!(flood_fill_pocket(origin, dims, ring, |t| t == Tile::new(2, 2, 0)).is_none());
		// a gap in the ring lets the fill reach the map edge
		let leaky = |t: Tile| ring(t) && t != Tile::new(5, 5, 0);
		assert!(flood_fill_pocket(origin, dims, leaky, |_| false).is_none());
	}
	#[test]
	fn enclosed_area_from_field() {
		//  _____________________
		// |D_|__|__|__|__|__|__|
		// |__|s_|s_|s_|s_|s_|__|
		// |__|s_|__|__|__|s_|__|
		// |__|s_|__|O_|__|s_|__|
		// |__|s_|__|__|__|s_|__|
		// |__|s_|s_|s_|s_|s_|__|
		// |__|__|__|__|__|__|__|
		let dims = GridDimensions::new(7, 7, 0, 0);
		let map = TileMap::new(dims, 100);
		let portals = PortalGraph::new(&map);
		let mut field = CostField::new(Tile::new(0, 0, 0), CapabilityProfile::default(), dims);
		for i in 1..6 {
			for t in [
				Tile::new(i, 1, 0),
				Tile::new(i, 5, 0),
				Tile::new(1, i, 0),
				Tile::new(5, i, 0),
			] {
				field.state.set(t, TileState::Impassable);
			}
		}
		let origin = Tile::new(3, 3, 0);
		let pocket = find_enclosed_area(&field, &portals, origin).unwrap();
		assert_eq!(9, pocket.len());
		assert!(pocket.contains(&origin));
		// outside the ring
		assert!(find_enclosed_area(&field, &portals, Tile::new(0, 3, 0)).is_none());
		let mut flier = CostField::new(
			Tile::new(0, 0, 0),
			CapabilityProfile::default().with_fly_cost(1.0),
			dims,
		);
		flier.state = field.state.clone();
		assert!(find_enclosed_area(&flier, &portals, origin).is_none());
	}
}
