use std::{cell::RefCell, rc::Rc};
use tryit_dom::{
	generation::{Generation, Tagged},
	surface::{SignalSender, Surface, SurfaceError, SurfacePlatform, SurfaceRequest, SurfaceSignal},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	Created(&'static str, u64),
	Loaded(&'static str, u64),
	Destroyed(&'static str, u64),
}

#[derive(Debug, Default)]
pub struct Journal {
	pub events: Vec<Event>,
	pub documents: Vec<String>,
	pub sandbox_attributes: Vec<String>,
	pub live: usize,
	pub max_live: usize,
	senders: Vec<(Generation, SignalSender)>,
}

/// Records every surface lifecycle step instead of rendering anything.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
	pub journal: Rc<RefCell<Journal>>,
	pub refuse: Rc<RefCell<Vec<&'static str>>>,
	/// Emits `Loaded` from within `create`, before the host has recorded the new surface.
	pub load_on_create: bool,
}
impl MockPlatform {
	/// Simulates the asynchronous load completion of the surface created for `generation`.
	pub fn complete_load(&self, generation: u64) {
		let sender = self
			.journal
			.borrow()
			.senders
			.iter()
			.find(|(g, _)| g.get() == generation)
			.map(|(g, sender)| (*g, sender.clone()));
		let (generation, sender) = sender.unwrap_or_else(|| panic!("No surface was ever created for generation {}", generation));
		sender.send(Tagged::new(generation, SurfaceSignal::Loaded));
	}

	pub fn events(&self) -> Vec<Event> {
		self.journal.borrow().events.clone()
	}

	pub fn live(&self) -> usize {
		self.journal.borrow().live
	}
}

fn leak(title: &str) -> &'static str {
	Box::leak(title.to_owned().into_boxed_str())
}

impl SurfacePlatform for MockPlatform {
	type Surface = MockSurface;

	fn create(&mut self, request: SurfaceRequest<'_>) -> Result<Self::Surface, SurfaceError> {
		let title = leak(request.title);
		if self.refuse.borrow().contains(&title) {
			return Err(SurfaceError::Creation {
				message: format!("refused to create {}", title),
			});
		}

		let mut journal = self.journal.borrow_mut();
		journal.events.push(Event::Created(title, request.generation.get()));
		journal.documents.push(request.document.to_owned());
		journal.sandbox_attributes.push(request.policy.sandbox_attribute());
		if self.load_on_create {
			request.signals.send(Tagged::new(request.generation, SurfaceSignal::Loaded));
		}
		journal.senders.push((request.generation, request.signals));
		journal.live += 1;
		journal.max_live = journal.max_live.max(journal.live);

		Ok(MockSurface {
			title,
			generation: request.generation,
			journal: Rc::clone(&self.journal),
		})
	}
}

#[derive(Debug)]
pub struct MockSurface {
	title: &'static str,
	generation: Generation,
	journal: Rc<RefCell<Journal>>,
}
impl MockSurface {
	pub fn title(&self) -> &'static str {
		self.title
	}
}
impl Surface for MockSurface {
	fn loaded(&mut self) {
		self.journal.borrow_mut().events.push(Event::Loaded(self.title, self.generation.get()));
	}

	fn destroy(self) {
		let mut journal = self.journal.borrow_mut();
		journal.events.push(Event::Destroyed(self.title, self.generation.get()));
		journal.live -= 1;
	}
}
