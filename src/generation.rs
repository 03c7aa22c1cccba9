//! Monotonic tags that identify mount attempts, so that results from superseded mounts can be discarded.

use core::fmt::{self, Display, Formatter};

/// An opaque, totally ordered mount tag.
///
/// No surface is ever tagged with [`Generation::INITIAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);
impl Generation {
	pub const INITIAL: Self = Self(0);

	#[must_use]
	pub fn get(self) -> u64 {
		self.0
	}

	#[must_use]
	fn next(self) -> Self {
		Self(self.0 + 1)
	}
}
impl Default for Generation {
	fn default() -> Self {
		Self::INITIAL
	}
}
impl Display for Generation {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

#[derive(Debug, Default)]
pub struct GenerationTracker {
	current: Generation,
}
impl GenerationTracker {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a generation strictly greater than any previously returned one.
	pub fn advance(&mut self) -> Generation {
		self.current = self.current.next();
		self.current
	}

	#[must_use]
	pub fn current(&self) -> Generation {
		self.current
	}
}

/// A unit of asynchronous work, tagged with the generation it was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tagged<T> {
	pub generation: Generation,
	pub payload: T,
}
impl<T> Tagged<T> {
	#[must_use]
	pub fn new(generation: Generation, payload: T) -> Self {
		Self { generation, payload }
	}

	/// Whether this result still belongs to `current`. Anything else is stale and must be ignored.
	#[must_use]
	pub fn is_current(&self, current: Generation) -> bool {
		self.generation == current
	}
}
