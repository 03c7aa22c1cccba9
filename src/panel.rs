//! A complete "try it yourself" panel, independent of how surfaces are rendered.

use crate::{
	example::ExampleSet,
	host::{PumpReport, SandboxHandle, SandboxHost},
	isolation::IsolationPolicy,
	surface::{SurfaceError, SurfacePlatform},
	tabs::{Selection, TabController},
};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabStatus {
	Ready,
	/// The last attempt to mount this tab failed. Other tabs are unaffected.
	Failed(SurfaceError),
}

/// Ties an [`ExampleSet`] to its [`TabController`] and [`SandboxHost`].
///
/// The initial example is mounted during construction.
/// Dropping the panel destroys the live surface.
#[derive(Debug)]
pub struct Panel<P: SurfacePlatform> {
	examples: ExampleSet,
	controller: TabController,
	host: SandboxHost<P>,
}
impl<P: SurfacePlatform> Panel<P> {
	#[instrument(skip(examples, platform), fields(example_count = examples.len()))]
	pub fn new(examples: ExampleSet, initial_index: usize, platform: P, policy: IsolationPolicy) -> Self {
		let mut controller = TabController::new(&examples, initial_index);
		let mut host = SandboxHost::new(platform, policy);
		controller.select(controller.selection().active_index, &examples, &mut host);
		host.pump();
		Self { examples, controller, host }
	}

	/// Switches to `index` (clamped), tearing down the current surface first.
	///
	/// Selecting the active index restarts it.
	pub fn select(&mut self, index: usize) -> Selection {
		let selection = self.controller.select(index, &self.examples, &mut self.host);
		self.host.pump();
		selection
	}

	pub fn restart(&mut self) -> Selection {
		let selection = self.controller.restart(&self.examples, &mut self.host);
		self.host.pump();
		selection
	}

	/// Applies pending surface signals. Stale ones are dropped.
	pub fn pump(&mut self) -> PumpReport {
		self.host.pump()
	}

	/// Destroys the live surface. The panel stays usable: a later [`Panel::select`] mounts again.
	pub fn unmount(&mut self) {
		self.host.unmount()
	}

	#[must_use]
	pub fn selection(&self) -> Selection {
		self.controller.selection()
	}

	#[must_use]
	pub fn examples(&self) -> &ExampleSet {
		&self.examples
	}

	#[must_use]
	pub fn status(&self, index: usize) -> TabStatus {
		match self.host.failure(index) {
			Some(error) => TabStatus::Failed(error.clone()),
			None => TabStatus::Ready,
		}
	}

	#[must_use]
	pub fn live(&self) -> Option<&SandboxHandle<P::Surface>> {
		self.host.live()
	}

	#[must_use]
	pub fn host(&self) -> &SandboxHost<P> {
		&self.host
	}
}
