//! Browser binding: sandboxed [***iframe***](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/iframe)s via [`web_sys`].
//!
//! Each example is loaded through [***srcdoc***](https://developer.mozilla.org/en-US/docs/Web/API/HTMLIFrameElement/srcdoc),
//! so its document text is never parsed or evaluated by the host page itself.
//! Removing the iframe from the document discards its browsing context, along with all of its timers, listeners and pending requests.

use crate::{
	example::ExampleSet,
	generation::{Generation, Tagged},
	isolation::IsolationPolicy,
	panel::{Panel, TabStatus},
	surface::{Surface, SurfaceError, SurfacePlatform, SurfaceRequest, SurfaceSignal},
	tabs::Selection,
};
use core::cell::RefCell;
use js_sys::Function;
use std::{borrow::Cow, rc::Rc};
use tracing::{error, instrument, trace, trace_span};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// Presentation options of a [`TryItPanel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IframeOptions {
	/// Prefix of all generated class names. Defaults to `"tryit"`.
	pub class_prefix: Cow<'static, str>,
	pub policy: IsolationPolicy,
	/// Sets `loading="lazy"` on example iframes, for panels far down a page.
	pub loading_lazy: bool,
}
impl Default for IframeOptions {
	fn default() -> Self {
		Self {
			class_prefix: Cow::Borrowed("tryit"),
			policy: IsolationPolicy::default(),
			loading_lazy: false,
		}
	}
}

/// Creates sandboxed iframes as children of a stage element.
#[derive(Debug)]
pub struct IframePlatform {
	document: web_sys::Document,
	stage: web_sys::Element,
	class_prefix: Cow<'static, str>,
	loading_lazy: bool,
}
impl IframePlatform {
	/// # Errors
	///
	/// Iff `stage` has no owner document.
	pub fn new(stage: web_sys::Element, class_prefix: Cow<'static, str>, loading_lazy: bool) -> Result<Self, JsValue> {
		let document = stage.owner_document().ok_or_else(|| JsValue::from_str("tryit-dom: Stage element has no owner document."))?;
		Ok(Self {
			document,
			stage,
			class_prefix,
			loading_lazy,
		})
	}

	#[must_use]
	pub fn stage(&self) -> &web_sys::Element {
		&self.stage
	}
}
impl SurfacePlatform for IframePlatform {
	type Surface = IframeSurface;

	#[instrument(skip(self, request), fields(generation = %request.generation))]
	fn create(&mut self, request: SurfaceRequest<'_>) -> Result<Self::Surface, SurfaceError> {
		let iframe = self
			.document
			.create_element("iframe")
			.map_err(creation_error)?
			.dyn_into::<web_sys::HtmlIFrameElement>()
			.map_err(|element| creation_error(element.into()))?;

		// Sandbox flags are fixed when the iframe first navigates, i.e. on insertion.
		iframe.set_attribute("sandbox", &request.policy.sandbox_attribute()).map_err(creation_error)?;
		iframe.set_attribute("referrerpolicy", request.policy.referrer_policy()).map_err(creation_error)?;
		iframe.set_attribute("class", &format!("{}-surface", self.class_prefix)).map_err(creation_error)?;
		if self.loading_lazy {
			iframe.set_attribute("loading", "lazy").map_err(creation_error)?;
		}
		iframe.set_title(request.title);
		iframe.set_srcdoc(request.document);

		let generation = request.generation;
		let signals = request.signals;
		let on_load = Closure::wrap(Box::new(move || {
			let span = trace_span!("iframe load", %generation);
			let _enter = span.enter();
			signals.send(Tagged::new(generation, SurfaceSignal::Loaded));
		}) as Box<dyn Fn()>);
		iframe
			.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref::<Function>())
			.map_err(creation_error)?;

		set_attribute(&self.stage, "aria-busy", "true");
		if let Err(error) = self.stage.append_child(&iframe) {
			remove_load_listener(&iframe, &on_load);
			set_attribute(&self.stage, "aria-busy", "false");
			return Err(creation_error(error));
		}

		Ok(IframeSurface {
			iframe,
			stage: self.stage.clone(),
			on_load,
			generation,
		})
	}
}

/// One mounted example. Exclusively owned by the [`SandboxHost`](`crate::host::SandboxHost`).
#[derive(Debug)]
pub struct IframeSurface {
	iframe: web_sys::HtmlIFrameElement,
	stage: web_sys::Element,
	on_load: Closure<dyn Fn()>,
	generation: Generation,
}
impl IframeSurface {
	#[must_use]
	pub fn iframe(&self) -> &web_sys::HtmlIFrameElement {
		&self.iframe
	}
}
impl Surface for IframeSurface {
	fn loaded(&mut self) {
		set_attribute(&self.iframe, "data-loaded", "");
		set_attribute(&self.stage, "aria-busy", "false");
	}

	#[instrument(skip(self), fields(generation = %self.generation))]
	fn destroy(self) {
		remove_load_listener(&self.iframe, &self.on_load);
		self.iframe.remove();
		set_attribute(&self.stage, "aria-busy", "false");
		trace!("Removed iframe.");
	}
}

fn remove_load_listener(iframe: &web_sys::HtmlIFrameElement, on_load: &Closure<dyn Fn()>) {
	if let Err(error) = iframe.remove_event_listener_with_callback("load", on_load.as_ref().unchecked_ref::<Function>()) {
		error!("Failed to remove iframe load listener: {:?}", error)
	}
}

fn creation_error(error: JsValue) -> SurfaceError {
	let message = match error.dyn_ref::<js_sys::Error>() {
		Some(error) => String::from(error.message()),
		None => error.as_string().unwrap_or_else(|| format!("{:?}", error)),
	};
	SurfaceError::Creation { message }
}

fn set_attribute(element: &web_sys::Element, name: &str, value: &str) {
	if let Err(error) = element.set_attribute(name, value) {
		error!("Failed to set attribute {:?}={:?}: {:?}", name, value, error)
	}
}

fn remove_attribute(element: &web_sys::Element, name: &str) {
	if let Err(error) = element.remove_attribute(name) {
		error!("Failed to remove attribute {:?}: {:?}", name, error)
	}
}

/// A mounted "try it yourself" panel: a tab strip, a stage holding at most one sandboxed iframe, and an error region.
///
/// The generated markup is:
///
/// ```html
/// <div class="tryit">
///   <div role="tablist" class="tryit-tabs">
///     <button type="button" role="tab" aria-selected="true" class="tryit-tab tryit-tab-active">…</button>
///     <button type="button" role="tab" aria-selected="false" class="tryit-tab">…</button>
///   </div>
///   <div class="tryit-stage" aria-busy="false"><iframe sandbox="…" srcdoc="…"></iframe></div>
///   <div role="alert" class="tryit-error" hidden></div>
/// </div>
/// ```
///
/// Dropping the panel destroys the live iframe, removes all listeners and removes the markup.
#[derive(Debug)]
pub struct TryItPanel {
	state: Rc<RefCell<PanelState>>,
	root: web_sys::Element,
	tab_listeners: Vec<(web_sys::Element, Closure<dyn Fn()>)>,
}

#[derive(Debug)]
struct PanelState {
	panel: Panel<IframePlatform>,
	tabs: Vec<web_sys::Element>,
	error: web_sys::Element,
	class_prefix: Cow<'static, str>,
}

impl TryItPanel {
	/// Appends the panel to `container` and mounts the example at `initial_index` (clamped).
	///
	/// # Errors
	///
	/// Iff the panel markup couldn't be created.
	/// A failure to create the example iframe itself is not an error here. It is shown in the panel's error region instead.
	#[instrument(skip(container, examples, options), fields(example_count = examples.len()))]
	pub fn mount(container: &web_sys::Element, examples: ExampleSet, initial_index: usize, options: IframeOptions) -> Result<Self, JsValue> {
		let document = container.owner_document().ok_or_else(|| JsValue::from_str("tryit-dom: Container element has no owner document."))?;
		let prefix = options.class_prefix;

		let root = document.create_element("div")?;
		root.set_attribute("class", &prefix)?;

		let tab_list = document.create_element("div")?;
		tab_list.set_attribute("role", "tablist")?;
		tab_list.set_attribute("class", &format!("{}-tabs", prefix))?;
		let tabs = examples
			.titles()
			.map(|title| {
				let tab = document.create_element("button")?;
				tab.set_attribute("type", "button")?;
				tab.set_attribute("role", "tab")?;
				tab.set_text_content(Some(title));
				tab_list.append_child(&tab)?;
				Ok::<_, JsValue>(tab)
			})
			.collect::<Result<Vec<_>, JsValue>>()?;

		let stage = document.create_element("div")?;
		stage.set_attribute("class", &format!("{}-stage", prefix))?;

		let error = document.create_element("div")?;
		error.set_attribute("role", "alert")?;
		error.set_attribute("class", &format!("{}-error", prefix))?;
		error.set_attribute("hidden", "")?;

		root.append_child(&tab_list)?;
		root.append_child(&stage)?;
		root.append_child(&error)?;

		// The initial iframe is created detached and starts loading once `root` is attached.
		let platform = IframePlatform::new(stage, prefix.clone(), options.loading_lazy)?;
		let panel = Panel::new(examples, initial_index, platform, options.policy);

		// From here on, an early return drops `this`, which unregisters listeners and removes the markup.
		let mut this = Self {
			state: Rc::new(RefCell::new(PanelState {
				panel,
				tabs,
				error,
				class_prefix: prefix,
			})),
			root,
			tab_listeners: Vec::new(),
		};

		{
			let weak = Rc::downgrade(&this.state);
			this.state.borrow().panel.host().inbox().set_waker(move || {
				if let Some(state) = weak.upgrade() {
					match state.try_borrow_mut() {
						Ok(mut state) => state.pump(),
						// The ongoing operation pumps before it returns.
						Err(_) => trace!("Panel busy. Deferring signal."),
					}
				}
			});
		}

		let tabs = this.state.borrow().tabs.clone();
		for (index, tab) in tabs.into_iter().enumerate() {
			let weak = Rc::downgrade(&this.state);
			let on_click = Closure::wrap(Box::new(move || {
				let span = trace_span!("tab click", index);
				let _enter = span.enter();
				if let Some(state) = weak.upgrade() {
					match state.try_borrow_mut() {
						Ok(mut state) => state.select(index),
						Err(_) => error!("Tab {} clicked re-entrantly. Ignoring.", index),
					}
				}
			}) as Box<dyn Fn()>);
			tab.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref::<Function>())?;
			this.tab_listeners.push((tab, on_click));
		}

		container.append_child(&this.root)?;
		this.state.borrow_mut().pump();
		Ok(this)
	}

	/// Switches to `index` (clamped). Selecting the active tab restarts its example.
	pub fn select(&self, index: usize) -> Selection {
		let mut state = self.state.borrow_mut();
		state.select(index);
		state.panel.selection()
	}

	pub fn restart(&self) -> Selection {
		let mut state = self.state.borrow_mut();
		state.restart();
		state.panel.selection()
	}

	#[must_use]
	pub fn selection(&self) -> Selection {
		self.state.borrow().panel.selection()
	}

	#[must_use]
	pub fn status(&self, index: usize) -> TabStatus {
		self.state.borrow().panel.status(index)
	}

	/// The live example iframe, if any.
	#[must_use]
	pub fn iframe(&self) -> Option<web_sys::HtmlIFrameElement> {
		self.state.borrow().panel.live().map(|live| live.surface().iframe().clone())
	}

	#[must_use]
	pub fn root(&self) -> &web_sys::Element {
		&self.root
	}

	/// Same as dropping the panel.
	pub fn unmount(self) {}
}

impl Drop for TryItPanel {
	#[instrument(skip(self))]
	fn drop(&mut self) {
		for (tab, on_click) in self.tab_listeners.drain(..) {
			if let Err(error) = tab.remove_event_listener_with_callback("click", on_click.as_ref().unchecked_ref::<Function>()) {
				error!("Failed to remove tab click listener: {:?}", error)
			}
		}
		match self.state.try_borrow_mut() {
			Ok(mut state) => state.panel.unmount(),
			Err(_) => error!("Panel dropped while in use. The iframe is removed along with the panel markup."),
		}
		self.root.remove();
	}
}

impl PanelState {
	fn select(&mut self, index: usize) {
		self.panel.select(index);
		self.render();
	}

	fn restart(&mut self) {
		self.panel.restart();
		self.render();
	}

	fn pump(&mut self) {
		let report = self.panel.pump();
		trace!(?report);
		self.render();
	}

	fn render(&self) {
		let selection = self.panel.selection();
		for (index, tab) in self.tabs.iter().enumerate() {
			let active = index == selection.active_index;
			let mut class = format!("{}-tab", self.class_prefix);
			if active {
				class.push_str(&format!(" {}-tab-active", self.class_prefix));
			}
			if let TabStatus::Failed(_) = self.panel.status(index) {
				class.push_str(&format!(" {}-tab-failed", self.class_prefix));
			}
			set_attribute(tab, "class", &class);
			set_attribute(tab, "aria-selected", if active { "true" } else { "false" });
		}

		match self.panel.status(selection.active_index) {
			TabStatus::Failed(error) => {
				self.error.set_text_content(Some(&error.to_string()));
				remove_attribute(&self.error, "hidden");
			}
			TabStatus::Ready => {
				self.error.set_text_content(None);
				set_attribute(&self.error, "hidden", "");
			}
		}
	}
}
