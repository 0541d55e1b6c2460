//! Cost values stored in the layers of a [crate::prelude::CostField].
//!
//! Rather than overloading floating point sentinels (`NaN` for "not yet
//! computed", infinity for "can never be reached") a [Cost] carries the
//! distinction in its variant so that every comparison has to decide how an
//! unknown value behaves.
//!

use std::cmp::Ordering;

/// A traversal cost
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Cost {
	/// Not computed yet
	#[default]
	Unset,
	/// A finite cost
	Value(f32),
	/// Proven to be unreachable
	Unreachable,
}

impl Cost {
	/// Build a [Cost] from a raw float, infinity maps to [Cost::Unreachable]
	pub fn from_f32(value: f32) -> Self {
		debug_assert!(!value.is_nan(), "A cost cannot be NaN");
		if value.is_infinite() {
			Cost::Unreachable
		} else {
			Cost::Value(value)
		}
	}
	/// Has a value been computed
	pub fn is_unset(&self) -> bool {
		matches!(self, Cost::Unset)
	}
	/// Is the cost finite
	pub fn is_finite(&self) -> bool {
		matches!(self, Cost::Value(_))
	}
	/// Has the cost been proven unreachable
	pub fn is_unreachable(&self) -> bool {
		matches!(self, Cost::Unreachable)
	}
	/// Get the finite value, if any
	pub fn get_value(&self) -> Option<f32> {
		match self {
			Cost::Value(v) => Some(*v),
			_ => None,
		}
	}
	/// Finite values as themselves, anything else as infinity
	pub fn as_f32(&self) -> f32 {
		match self {
			Cost::Value(v) => *v,
			_ => f32::INFINITY,
		}
	}
	/// Compare two costs where an unset value sorts after every finite value
	/// and before an unreachable one
	pub fn total_cmp(&self, other: &Cost) -> Ordering {
		/// Rank of the variant
		fn rank(c: &Cost) -> u8 {
			match c {
				Cost::Value(_) => 0,
				Cost::Unset => 1,
				Cost::Unreachable => 2,
			}
		}
		match (self, other) {
			(Cost::Value(a), Cost::Value(b)) => a.total_cmp(b),
			_ => rank(self).cmp(&rank(other)),
		}
	}
	/// Is `self` a strict improvement over `other`
	pub fn is_lower_than(&self, other: &Cost) -> bool {
		self.is_finite() && self.total_cmp(other) == Ordering::Less
	}
}

impl std::ops::Add<f32> for Cost {
	type Output = Cost;
	fn add(self, rhs: f32) -> Self::Output {
		match self {
			Cost::Value(v) => Cost::from_f32(v + rhs),
			other => other,
		}
	}
}

impl std::ops::Add<Cost> for Cost {
	type Output = Cost;
	fn add(self, rhs: Cost) -> Self::Output {
		match (self, rhs) {
			(Cost::Value(a), Cost::Value(b)) => Cost::from_f32(a + b),
			(Cost::Unreachable, _) | (_, Cost::Unreachable) => Cost::Unreachable,
			_ => Cost::Unset,
		}
	}
}
