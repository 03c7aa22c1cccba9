//! The seam between the [`SandboxHost`](`crate::host::SandboxHost`) and whatever actually creates isolated surfaces.

use crate::{
	generation::{Generation, Tagged},
	isolation::IsolationPolicy,
};
use core::cell::RefCell;
use std::{
	collections::VecDeque,
	rc::{Rc, Weak},
};
use thiserror::Error;
use tracing::trace;

/// Asynchronous notifications from a mounted surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSignal {
	/// The surface's document finished loading.
	Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
	#[error("the isolated surface could not be created: {message}")]
	Creation { message: String },
}

/// Everything a platform gets to see when creating a surface.
#[derive(Debug)]
pub struct SurfaceRequest<'a> {
	pub title: &'a str,
	/// The complete document source, verbatim.
	pub document: &'a str,
	pub generation: Generation,
	pub policy: &'a IsolationPolicy,
	/// Every asynchronous signal the surface emits must go through this sender.
	pub signals: SignalSender,
}

pub trait SurfacePlatform {
	type Surface: Surface;

	/// Creates and attaches a new isolated surface.
	///
	/// # Errors
	///
	/// Iff the platform refused to create the surface. Nothing may remain attached in that case.
	fn create(&mut self, request: SurfaceRequest<'_>) -> Result<Self::Surface, SurfaceError>;
}

pub trait Surface {
	/// Called only for a [`SurfaceSignal::Loaded`] tagged with this surface's own generation.
	fn loaded(&mut self);

	/// Detaches the surface so that none of its timers, listeners or pending requests can affect the host anymore.
	fn destroy(self);
}

type Queue = RefCell<VecDeque<Tagged<SurfaceSignal>>>;

/// Single-threaded queue of tagged surface signals, drained by [`SandboxHost::pump`](`crate::host::SandboxHost::pump`).
pub struct SignalInbox {
	queue: Rc<Queue>,
	waker: Rc<RefCell<Option<Box<dyn Fn()>>>>,
}
impl Default for SignalInbox {
	fn default() -> Self {
		Self::new()
	}
}
impl core::fmt::Debug for SignalInbox {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("SignalInbox")
			.field("queued", &self.queue.borrow().len())
			.field("has_waker", &self.waker.borrow().is_some())
			.finish()
	}
}
impl SignalInbox {
	#[must_use]
	pub fn new() -> Self {
		Self {
			queue: Rc::default(),
			waker: Rc::default(),
		}
	}

	/// `waker` runs after each send, outside of any borrow of the queue.
	///
	/// It must not assume it can drain the inbox right away. Failing to do so is fine as long as someone pumps later.
	pub fn set_waker(&self, waker: impl 'static + Fn()) {
		*self.waker.borrow_mut() = Some(Box::new(waker));
	}

	#[must_use]
	pub fn sender(&self) -> SignalSender {
		SignalSender {
			queue: Rc::downgrade(&self.queue),
			waker: Rc::downgrade(&self.waker),
		}
	}

	pub(crate) fn drain(&self) -> Vec<Tagged<SurfaceSignal>> {
		self.queue.borrow_mut().drain(..).collect()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.queue.borrow().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Weak handle into a [`SignalInbox`]. Sending after the inbox was dropped does nothing.
#[derive(Debug, Clone)]
pub struct SignalSender {
	queue: Weak<Queue>,
	#[allow(clippy::type_complexity)]
	waker: Weak<RefCell<Option<Box<dyn Fn()>>>>,
}
impl SignalSender {
	pub fn send(&self, signal: Tagged<SurfaceSignal>) {
		let queue = match self.queue.upgrade() {
			Some(queue) => queue,
			None => return trace!("Signal {:?} sent after its inbox was dropped. Ignoring.", signal),
		};
		queue.borrow_mut().push_back(signal);
		drop(queue);

		if let Some(waker) = self.waker.upgrade() {
			if let Ok(waker) = waker.try_borrow() {
				if let Some(waker) = waker.as_ref() {
					waker()
				}
			}
		}
	}
}
