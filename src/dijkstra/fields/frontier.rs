//! The expansion wavefront. Tiles are popped cheapest first where the
//! priority of a tile is its tentative cost plus the heuristic bias towards
//! the origin of the current query.
//!
//! Entries are never updated in place, when a tile is found to be cheaper a
//! new entry is pushed and the old one is skipped once it surfaces (its cost
//! no longer matches the field).
//!

use std::{cmp::Ordering, collections::BinaryHeap};

use crate::prelude::*;

/// A tile waiting to be settled
#[derive(Clone, Copy, Debug)]
pub struct FrontierEntry {
	/// Cost plus heuristic bias
	priority: f32,
	/// Tentative cost when the entry was pushed
	cost: f32,
	/// The tile
	tile: Tile,
}

impl FrontierEntry {
	/// Get the tile
	pub fn get_tile(&self) -> Tile {
		self.tile
	}
	/// Get the tentative cost at the time of pushing
	pub fn get_cost(&self) -> f32 {
		self.cost
	}
	/// Get the priority
	pub fn get_priority(&self) -> f32 {
		self.priority
	}
}

impl PartialEq for FrontierEntry {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for FrontierEntry {
	// reversed so the max-heap pops the cheapest entry
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.priority
			.total_cmp(&self.priority)
			.then_with(|| other.cost.total_cmp(&self.cost))
			.then_with(|| other.tile.cmp(&self.tile))
	}
}

/// Priority queue of tiles waiting to be settled
#[derive(Clone, Debug, Default)]
pub struct Frontier {
	/// Entries ordered cheapest first
	heap: BinaryHeap<FrontierEntry>,
}

impl Frontier {
	/// Queue a tile with its tentative cost and heuristic bias
	pub fn push(&mut self, tile: Tile, cost: f32, bias: f32) {
		self.heap.push(FrontierEntry {
			priority: cost + bias,
			cost,
			tile,
		});
	}
	/// Take the cheapest entry
	pub fn pop(&mut self) -> Option<FrontierEntry> {
		self.heap.pop()
	}
	/// Number of queued entries, including stale ones
	pub fn len(&self) -> usize {
		self.heap.len()
	}
	/// Is the frontier empty
	pub fn is_empty(&self) -> bool {
		self.heap.is_empty()
	}
	/// Consume the frontier returning the distinct tiles it held
	pub fn into_tiles(self) -> Vec<Tile> {
		let mut tiles: Vec<Tile> = self.heap.into_iter().map(|e| e.tile).collect();
		tiles.sort();
		tiles.dedup();
		tiles
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn pops_cheapest_first() {
		let mut frontier = Frontier::default();
		frontier.push(Tile::new(0, 0, 0), 30.0, 0.0);
		frontier.push(Tile::new(1, 0, 0), 10.0, 0.0);
		frontier.push(Tile::new(2, 0, 0), 5.0, 10.0);
		assert_eq!(Tile::new(1, 0, 0), frontier.pop().unwrap().get_tile());
		assert_eq!(Tile::new(2, 0, 0), frontier.pop().unwrap().get_tile());
		assert_eq!(Tile::new(0, 0, 0), frontier.pop().unwrap().get_tile());
		assert!(frontier.pop().is_none());
	}
	#[test]
	fn bias_reorders() {
		let mut frontier = Frontier::default();
		frontier.push(Tile::new(0, 0, 0), 10.0, 50.0);
		frontier.push(Tile::new(1, 0, 0), 20.0, 0.0);
		let first = frontier.pop().unwrap();
		assert_eq!(Tile::new(1, 0, 0), first.get_tile());
		assert_eq!(20.0, first.get_priority());
	}
	#[test]
	fn into_tiles_dedups() {
		let mut frontier = Frontier::default();
		frontier.push(Tile::new(0, 0, 0), 10.0, 0.0);
		frontier.push(Tile::new(0, 0, 0), 8.0, 0.0);
		frontier.push(Tile::new(3, 0, 0), 8.0, 0.0);
		assert_eq!(3, frontier.len());
		assert_eq!(
			vec![Tile::new(0, 0, 0), Tile::new(3, 0, 0)],
			frontier.into_tiles()
		);
	}
}
