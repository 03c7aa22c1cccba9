//! The selection state machine: which example is active, and under which generation.

use crate::{
	example::{Example, ExampleSet},
	generation::{Generation, GenerationTracker},
};
use tracing::{instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
	pub active_index: usize,
	pub generation: Generation,
}

/// Receives every selection change synchronously, in order.
pub trait SelectionListener {
	fn selection_changed(&mut self, index: usize, example: &Example, generation: Generation);
}

/// Sole owner of the [`Selection`].
///
/// Out-of-range indices are clamped to the last example rather than rejected.
#[derive(Debug)]
pub struct TabController {
	active_index: usize,
	generations: GenerationTracker,
}
impl TabController {
	/// The controller starts at [`Generation::INITIAL`] and does not notify anyone.
	/// Call [`TabController::select`] with [`TabController::selection`]'s index to perform the first mount.
	#[must_use]
	pub fn new(examples: &ExampleSet, initial_index: usize) -> Self {
		Self {
			active_index: clamp(examples, initial_index),
			generations: GenerationTracker::new(),
		}
	}

	#[must_use]
	pub fn selection(&self) -> Selection {
		Selection {
			active_index: self.active_index,
			generation: self.generations.current(),
		}
	}

	/// Activates `index` under a new generation and notifies `listener` before returning.
	///
	/// Selecting the already active index is a restart: the same example is handed out again under a fresh generation.
	#[instrument(skip(examples, listener))]
	pub fn select(&mut self, index: usize, examples: &ExampleSet, listener: &mut impl SelectionListener) -> Selection {
		let index = clamp(examples, index);
		self.active_index = index;
		let generation = self.generations.advance();
		listener.selection_changed(index, examples.get(index), generation);
		self.selection()
	}

	pub fn restart(&mut self, examples: &ExampleSet, listener: &mut impl SelectionListener) -> Selection {
		self.select(self.active_index, examples, listener)
	}
}

fn clamp(examples: &ExampleSet, index: usize) -> usize {
	let clamped = examples.clamp_index(index);
	if clamped != index {
		warn!("Example index {} out of range (len {}). Clamped to {}.", index, examples.len(), clamped);
	}
	clamped
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Default)]
	struct Recorder(Vec<(usize, String, Generation)>);
	impl SelectionListener for Recorder {
		fn selection_changed(&mut self, index: usize, example: &Example, generation: Generation) {
			self.0.push((index, example.title().to_owned(), generation));
		}
	}

	fn abc() -> ExampleSet {
		ExampleSet::new(["A", "B", "C"].iter().map(|&t| Example::new(t, "<!DOCTYPE html>"))).unwrap()
	}

	#[test]
	fn initial_is_clamped_and_silent() {
		let examples = abc();
		let controller = TabController::new(&examples, 7);
		assert_eq!(
			controller.selection(),
			Selection {
				active_index: 2,
				generation: Generation::INITIAL
			}
		);
	}

	#[test]
	fn select_notifies_synchronously() {
		let examples = abc();
		let mut controller = TabController::new(&examples, 0);
		let mut recorder = Recorder::default();

		let first = controller.select(0, &examples, &mut recorder);
		let second = controller.select(2, &examples, &mut recorder);
		assert_eq!(second.active_index, 2);
		assert_eq!(second.generation.get(), first.generation.get() + 1);
		assert_eq!(recorder.0, [(0, "A".to_owned(), first.generation), (2, "C".to_owned(), second.generation)]);
	}

	#[test]
	fn restart_keeps_index_and_advances_generation() {
		let examples = abc();
		let mut controller = TabController::new(&examples, 1);
		let mut recorder = Recorder::default();

		let before = controller.select(1, &examples, &mut recorder);
		let after = controller.restart(&examples, &mut recorder);
		assert_eq!(after.active_index, before.active_index);
		assert!(after.generation > before.generation);
		assert_eq!(recorder.0.len(), 2);
		assert_eq!(recorder.0[1].1, "B");
	}

	#[test]
	fn out_of_range_select_is_clamped() {
		let examples = abc();
		let mut controller = TabController::new(&examples, 0);
		let mut recorder = Recorder::default();

		let selection = controller.select(5, &examples, &mut recorder);
		assert_eq!(selection.active_index, 2);
		assert_eq!(recorder.0[0].1, "C");
	}
}
