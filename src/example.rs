//! The ordered, immutable set of runnable examples shown by one panel.

use std::borrow::Cow;
use thiserror::Error;

/// One self-contained, runnable document and its display title.
///
/// [`code`](`Example::code`) is handed to the isolated surface verbatim as its complete document source.
/// It is never parsed, evaluated or rewritten by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Example {
	title: Cow<'static, str>,
	code: Cow<'static, str>,
}
impl Example {
	#[must_use]
	pub fn new(title: impl Into<Cow<'static, str>>, code: impl Into<Cow<'static, str>>) -> Self {
		Self {
			title: title.into(),
			code: code.into(),
		}
	}

	#[must_use]
	pub fn title(&self) -> &str {
		&self.title
	}

	#[must_use]
	pub fn code(&self) -> &str {
		&self.code
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("an example set must contain at least one example")]
pub struct EmptyExampleSetError;

/// An ordered, non-empty sequence of [`Example`]s.
///
/// The first entry is the default active example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSet(Vec<Example>);
impl ExampleSet {
	/// # Errors
	///
	/// Iff `examples` yields no items.
	pub fn new(examples: impl IntoIterator<Item = Example>) -> Result<Self, EmptyExampleSetError> {
		let examples: Vec<_> = examples.into_iter().collect();
		if examples.is_empty() {
			Err(EmptyExampleSetError)
		} else {
			Ok(Self(examples))
		}
	}

	/// # Panics
	///
	/// Iff `index` is out of range. Callers are expected to go through [`ExampleSet::clamp_index`] first.
	#[must_use]
	pub fn get(&self, index: usize) -> &Example {
		self.0.get(index).unwrap_or_else(|| panic!("tryit-dom bug: example index {} out of range (len {})", index, self.0.len()))
	}

	/// Always at least 1.
	#[must_use]
	#[allow(clippy::len_without_is_empty)]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn titles(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
		self.0.iter().map(Example::title)
	}

	pub fn iter(&self) -> impl ExactSizeIterator<Item = &Example> + '_ {
		self.0.iter()
	}

	#[must_use]
	pub fn clamp_index(&self, index: usize) -> usize {
		index.min(self.0.len() - 1)
	}
}

impl<'a> IntoIterator for &'a ExampleSet {
	type Item = &'a Example;
	type IntoIter = core::slice::Iter<'a, Example>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
