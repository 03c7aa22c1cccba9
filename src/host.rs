//! Owns the single live isolated surface of a panel.

use crate::{
	example::Example,
	generation::Generation,
	isolation::IsolationPolicy,
	surface::{SignalInbox, Surface, SurfaceError, SurfacePlatform, SurfaceRequest, SurfaceSignal},
	tabs::SelectionListener,
};
use hashbrown::HashMap;
use tracing::{error, instrument, trace, trace_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
	Loading,
	Loaded,
}

/// The currently mounted surface, tagged with the generation it was created for.
#[derive(Debug)]
pub struct SandboxHandle<S> {
	surface: S,
	index: usize,
	generation: Generation,
	state: SurfaceState,
}
impl<S> SandboxHandle<S> {
	#[must_use]
	pub fn surface(&self) -> &S {
		&self.surface
	}

	#[must_use]
	pub fn index(&self) -> usize {
		self.index
	}

	#[must_use]
	pub fn generation(&self) -> Generation {
		self.generation
	}

	#[must_use]
	pub fn state(&self) -> SurfaceState {
		self.state
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
	pub applied: usize,
	pub discarded: usize,
}

/// Creates, replaces and destroys isolated surfaces, keeping at most one alive.
///
/// # Correct Use
///
/// Surfaces report asynchronously through the host's [`SignalInbox`].
/// Call [`SandboxHost::pump`] whenever it may have received something (see [`SignalInbox::set_waker`]).
pub struct SandboxHost<P: SurfacePlatform> {
	platform: P,
	policy: IsolationPolicy,
	live: Option<SandboxHandle<P::Surface>>,
	generation: Generation,
	failures: HashMap<usize, SurfaceError>,
	inbox: SignalInbox,
}
impl<P: SurfacePlatform> SandboxHost<P> {
	#[must_use]
	pub fn new(platform: P, policy: IsolationPolicy) -> Self {
		Self {
			platform,
			policy,
			live: None,
			generation: Generation::INITIAL,
			failures: HashMap::new(),
			inbox: SignalInbox::new(),
		}
	}

	/// Tears down the live surface (if any), then creates one for `example` tagged with `generation`.
	///
	/// # Errors
	///
	/// Iff the platform failed to create the surface.
	/// The failure is also recorded for `index` until that tab is mounted successfully.
	/// No surface is live afterwards in that case.
	#[instrument(skip(self, example), fields(title = tracing::field::Empty, document_len = example.code().len()))]
	pub fn mount(&mut self, index: usize, example: &Example, generation: Generation) -> Result<(), SurfaceError> {
		if cfg!(feature = "dangerous-logging") {
			tracing::Span::current().record("title", &example.title());
			trace!(document = example.code());
		}

		self.teardown();
		self.generation = generation;

		let request = SurfaceRequest {
			title: example.title(),
			document: example.code(),
			generation,
			policy: &self.policy,
			signals: self.inbox.sender(),
		};
		match self.platform.create(request) {
			Ok(surface) => {
				self.failures.remove(&index);
				self.live = Some(SandboxHandle {
					surface,
					index,
					generation,
					state: SurfaceState::Loading,
				});
				trace!("Mounted surface {} for example {}.", generation, index);
				Ok(())
			}
			Err(error) => {
				error!("Failed to mount example {} ({}): {}", index, generation, error);
				self.failures.insert(index, error.clone());
				Err(error)
			}
		}
	}

	/// Applies queued signals of the live generation and discards all others.
	#[instrument(skip(self))]
	pub fn pump(&mut self) -> PumpReport {
		let mut report = PumpReport::default();
		for signal in self.inbox.drain() {
			match self.live.as_mut() {
				Some(live) if signal.is_current(live.generation) => {
					let span = trace_span!("Applying signal", ?signal);
					let _enter = span.enter();
					match signal.payload {
						SurfaceSignal::Loaded => {
							live.state = SurfaceState::Loaded;
							live.surface.loaded();
						}
					}
					report.applied += 1;
				}
				_ => {
					trace!("Discarding stale signal {:?} (current: {}).", signal, self.generation);
					report.discarded += 1;
				}
			}
		}
		report
	}

	/// Destroys the live surface, if any.
	#[instrument(skip(self))]
	pub fn unmount(&mut self) {
		self.teardown();
	}

	fn teardown(&mut self) {
		if let Some(live) = self.live.take() {
			trace!("Destroying surface {} of example {}.", live.generation, live.index);
			live.surface.destroy();
		}
	}

	#[must_use]
	pub fn live(&self) -> Option<&SandboxHandle<P::Surface>> {
		self.live.as_ref()
	}

	#[must_use]
	pub fn failure(&self, index: usize) -> Option<&SurfaceError> {
		self.failures.get(&index)
	}

	/// The generation of the latest mount attempt, successful or not.
	#[must_use]
	pub fn current_generation(&self) -> Generation {
		self.generation
	}

	#[must_use]
	pub fn inbox(&self) -> &SignalInbox {
		&self.inbox
	}

	#[must_use]
	pub fn platform(&self) -> &P {
		&self.platform
	}
}
impl<P: SurfacePlatform> core::fmt::Debug for SandboxHost<P> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("SandboxHost")
			.field("policy", &self.policy)
			.field("live", &self.live.as_ref().map(|live| (live.index, live.generation, live.state)))
			.field("generation", &self.generation)
			.field("failures", &self.failures)
			.field("inbox", &self.inbox)
			.finish()
	}
}
impl<P: SurfacePlatform> SelectionListener for SandboxHost<P> {
	fn selection_changed(&mut self, index: usize, example: &Example, generation: Generation) {
		let _ = self.mount(index, example, generation);
	}
}
impl<P: SurfacePlatform> Drop for SandboxHost<P> {
	fn drop(&mut self) {
		self.teardown()
	}
}
