//! The platform context.
//!
//! [`Platform`] owns every piece of runtime state: the component registry,
//! the element classes, per-host records, loader bookkeeping, globals and
//! the scheduler. Nothing is process-wide, so independent platforms can
//! coexist (one per test, for instance).
//!
//! The embedder drives it: document callbacks go to
//! [`connected_callback`](Platform::connected_callback) and friends, script
//! completions to [`script_loaded`](Platform::script_loaded), and the event
//! loop to [`run_microtasks`](Platform::run_microtasks) and
//! [`run_frame`](Platform::run_frame).

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use vireo_core::{
	Clock, ComponentMeta, ErrorKind, NodeId, Priority, RegistryEntry, RuntimeConfig, RuntimeError,
	RuntimeResult, Scheduler, SystemClock, Value,
};

use crate::component::{Component, ComponentDefinition};
use crate::dom::{DomApi, DomEvent, NodeKind};
use crate::element::{CustomElement, HostElementClass};
use crate::host::{HostElement, LifecycleState};
use crate::lifecycle::{self, RenderPhase, WriteOrigin};
use crate::loader::{self, ModuleImports, ModuleLoader};
use crate::ssr;

type ErrorHandler = Rc<dyn Fn(ErrorKind, &anyhow::Error, NodeId)>;

#[derive(Default)]
struct AppState {
	loading: Vec<NodeId>,
	loaded: bool,
	listeners: Vec<Box<dyn FnOnce()>>,
}

/// Runtime context shared by every host element of one document.
pub struct Platform {
	this: Weak<Platform>,
	dom: Rc<dyn DomApi>,
	config: RuntimeConfig,
	clock: Rc<dyn Clock>,
	pub(crate) queue: Scheduler<Platform>,
	registry: RefCell<HashMap<String, Rc<ComponentMeta>>>,
	elements: RefCell<HashMap<String, Rc<dyn CustomElement>>>,
	definitions: RefCell<HashMap<String, Rc<ComponentDefinition>>>,
	pub(crate) hosts: RefCell<HashMap<NodeId, HostElement>>,
	/// Disconnected hosts; their records are gone and they never reconnect.
	retired: RefCell<HashSet<NodeId>>,
	pub(crate) loader: ModuleLoader,
	globals: RefCell<HashMap<String, Value>>,
	error_handler: RefCell<Option<ErrorHandler>>,
	pub(crate) render_phase: Cell<RenderPhase>,
	app: RefCell<AppState>,
}

impl Platform {
	/// Creates a platform measuring time with the system clock.
	pub fn new(dom: Rc<dyn DomApi>, config: RuntimeConfig) -> Rc<Self> {
		Self::with_clock(dom, config, Rc::new(SystemClock::new()))
	}

	pub fn with_clock(dom: Rc<dyn DomApi>, config: RuntimeConfig, clock: Rc<dyn Clock>) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			this: this.clone(),
			queue: Scheduler::new(clock.clone(), config.frame_budget(), config.cooldown_budget()),
			dom,
			config,
			clock,
			registry: RefCell::new(HashMap::new()),
			elements: RefCell::new(HashMap::new()),
			definitions: RefCell::new(HashMap::new()),
			hosts: RefCell::new(HashMap::new()),
			retired: RefCell::new(HashSet::new()),
			loader: ModuleLoader::default(),
			globals: RefCell::new(HashMap::new()),
			error_handler: RefCell::new(None),
			render_phase: Cell::new(RenderPhase::Idle),
			app: RefCell::new(AppState::default()),
		})
	}

	pub fn dom(&self) -> &dyn DomApi {
		&*self.dom
	}

	pub fn config(&self) -> &RuntimeConfig {
		&self.config
	}

	pub(crate) fn weak(&self) -> Weak<Platform> {
		self.this.clone()
	}

	pub(crate) fn now(&self) -> Duration {
		self.clock.now()
	}

	// Registry

	/// Registers component metadata and defines the element class for its tag.
	///
	/// Returns `false` when the tag was already registered.
	pub fn register_component(&self, meta: ComponentMeta) -> bool {
		let key = meta.registry_key();
		if self.registry.borrow().contains_key(&key) {
			tracing::warn!(tag = %meta.tag_name, "component already registered");
			return false;
		}
		let meta = Rc::new(meta);
		self.define_element(&meta.tag_name, Rc::new(HostElementClass::new(meta.clone())));
		tracing::debug!(tag = %meta.tag_name, module_id = %meta.module_id, "component registered");
		self.registry.borrow_mut().insert(key, meta);
		true
	}

	/// Registers every entry and returns how many were new.
	pub fn register_components(&self, entries: impl IntoIterator<Item = RegistryEntry>) -> usize {
		entries
			.into_iter()
			.map(|entry| self.register_component(entry.into()))
			.filter(|added| *added)
			.count()
	}

	/// Registers entries from their JSON wire form.
	pub fn register_components_json(&self, json: &str) -> RuntimeResult<usize> {
		let entries = RegistryEntry::parse_list(json)?;
		Ok(self.register_components(entries))
	}

	/// Installs a custom element class for `tag`, replacing any previous one.
	pub fn define_element(&self, tag: &str, class: Rc<dyn CustomElement>) {
		self.elements
			.borrow_mut()
			.insert(tag.to_ascii_uppercase(), class);
	}

	pub fn component_meta(&self, tag: &str) -> Option<Rc<ComponentMeta>> {
		self.meta_for_key(&tag.to_ascii_uppercase())
	}

	pub(crate) fn meta_for_key(&self, key: &str) -> Option<Rc<ComponentMeta>> {
		self.registry.borrow().get(key).cloned()
	}

	pub(crate) fn install_definition(&self, key: String, definition: ComponentDefinition) {
		self.definitions
			.borrow_mut()
			.insert(key, Rc::new(definition));
	}

	pub(crate) fn definition(&self, tag: &str) -> Option<Rc<ComponentDefinition>> {
		self.definitions
			.borrow()
			.get(&tag.to_ascii_uppercase())
			.cloned()
	}

	fn element_class(&self, elm: NodeId) -> Option<Rc<dyn CustomElement>> {
		let tag = self.dom.tag_name(elm)?;
		self.elements
			.borrow()
			.get(&tag.to_ascii_uppercase())
			.cloned()
	}

	/// Whether `elm` is an element whose tag has a defined class.
	pub fn is_defined(&self, elm: NodeId) -> bool {
		self.element_class(elm).is_some()
	}

	// Modules

	/// Entry point of a fetched module.
	///
	/// `import_fn` receives the module imports and defines the code for each
	/// tag; `tags` lists the components the module carries.
	pub fn announce(&self, module_id: &str, import_fn: impl FnOnce(&mut ModuleImports), tags: &[&str]) {
		loader::announce(self, module_id, import_fn, tags);
	}

	/// Requests the module and stylesheet of `meta` for `elm`, then runs
	/// `callback` once the module is announced.
	///
	/// Calling it again after a failed or timed out request retries the fetch.
	pub fn load_bundle(&self, meta: &ComponentMeta, elm: NodeId, callback: impl FnOnce(&Platform) + 'static) {
		let mode = self
			.hosts
			.borrow()
			.get(&elm)
			.map(|h| h.mode.clone())
			.unwrap_or_else(|| self.config.default_mode.clone());
		loader::load_bundle(self, meta, &mode, Box::new(callback));
	}

	/// The module script at `url` finished loading.
	pub fn script_loaded(&self, url: &str) {
		loader::settle_request(self, url, None);
	}

	/// The module script at `url` failed to load.
	pub fn script_failed(&self, url: &str) {
		let error = RuntimeError::ModuleLoad { url: url.to_string() };
		loader::settle_request(self, url, Some(error));
	}

	/// Abandons module requests older than the configured timeout.
	pub fn sweep_module_timeouts(&self) {
		loader::sweep_timeouts(self);
	}

	pub fn is_module_loaded(&self, module_id: &str) -> bool {
		self.loader.is_module_loaded(module_id)
	}

	pub fn is_style_loaded(&self, style_id: &str) -> bool {
		self.loader.is_style_loaded(style_id)
	}

	/// URLs of module requests still in flight, sorted.
	pub fn pending_module_urls(&self) -> Vec<String> {
		self.loader.pending_urls()
	}

	// Document callbacks

	pub fn connected_callback(&self, elm: NodeId) {
		if let Some(class) = self.element_class(elm) {
			class.connected(self, elm);
		}
	}

	pub fn disconnected_callback(&self, elm: NodeId) {
		if let Some(class) = self.element_class(elm) {
			class.disconnected(self, elm);
		}
	}

	/// Forwards an attribute change if the tag observes `name`.
	pub fn attribute_changed_callback(&self, elm: NodeId, name: &str, old: Option<&str>, new: Option<&str>) {
		let Some(class) = self.element_class(elm) else {
			return;
		};
		if class.observed_attributes().iter().any(|a| a == name) {
			class.attribute_changed(self, elm, name, old, new);
		}
	}

	/// Connects every defined element under `root`, parents first.
	pub fn connect_tree(&self, root: NodeId) {
		for node in self.subtree(root) {
			self.connected_callback(node);
		}
	}

	/// Disconnects every defined element under `root`, parents first.
	pub fn disconnect_tree(&self, root: NodeId) {
		for node in self.subtree(root) {
			self.disconnected_callback(node);
		}
	}

	fn subtree(&self, root: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack = vec![root];
		while let Some(node) = stack.pop() {
			if self.dom.node_kind(node) != NodeKind::Element {
				continue;
			}
			out.push(node);
			stack.extend(self.dom.child_nodes(node).into_iter().rev());
		}
		out
	}

	/// Sets an attribute and reports the change like a document would.
	pub fn set_attribute(&self, elm: NodeId, name: &str, value: Option<&str>) {
		let old = self.dom.get_attribute(elm, name);
		match value {
			Some(value) => self.dom.set_attribute(elm, name, value),
			None => self.dom.remove_attribute(elm, name),
		}
		self.attribute_changed_callback(elm, name, old.as_deref(), value);
	}

	/// Reports that the light DOM children of `elm` changed.
	pub fn notify_child_list_changed(&self, elm: NodeId) {
		lifecycle::child_list_changed(self, elm);
	}

	// Members

	/// Reads a member through the host element.
	pub fn get_prop(&self, elm: NodeId, name: &str) -> Value {
		lifecycle::get_member(self, elm, name, WriteOrigin::Host)
	}

	/// Writes a member through the host element.
	///
	/// Before the instance exists the value is kept on the element and picked
	/// up during instantiation.
	pub fn set_prop(&self, elm: NodeId, name: &str, value: impl Into<Value>) -> RuntimeResult<()> {
		lifecycle::set_member(self, elm, name, value.into(), WriteOrigin::Host)
	}

	/// Reads a member from inside the component.
	pub fn get_state(&self, elm: NodeId, name: &str) -> Value {
		lifecycle::get_member(self, elm, name, WriteOrigin::Instance)
	}

	/// Writes a member from inside the component.
	///
	/// Writes to plain props are refused according to
	/// [`RuntimeConfig::readonly_prop_writes`].
	pub fn set_state(&self, elm: NodeId, name: &str, value: impl Into<Value>) -> RuntimeResult<()> {
		lifecycle::set_member(self, elm, name, value.into(), WriteOrigin::Instance)
	}

	/// Calls a declared method on the instance behind `elm`.
	pub fn call_method(&self, elm: NodeId, name: &str, args: &[Value]) -> anyhow::Result<Value> {
		lifecycle::call_method(self, elm, name, args)
	}

	/// Adds a value injected into global members declaring `ctrl_id`.
	pub fn add_global(&self, ctrl_id: impl Into<String>, value: impl Into<Value>) {
		self.globals.borrow_mut().insert(ctrl_id.into(), value.into());
	}

	pub(crate) fn global(&self, ctrl_id: &str) -> Option<Value> {
		self.globals.borrow().get(ctrl_id).cloned()
	}

	/// Runs `f` against the typed component behind `elm`.
	pub fn with_component<C: Component, R>(&self, elm: NodeId, f: impl FnOnce(&C) -> R) -> Option<R> {
		let instance = self.hosts.borrow().get(&elm)?.instance.clone()?;
		let obj = instance.borrow();
		obj.as_any().downcast_ref::<C>().map(f)
	}

	// Events

	/// Dispatches a bubbling, composed event from `elm`.
	pub fn emit_event(&self, elm: NodeId, name: &str, detail: impl Into<Value>) {
		let name = match &self.config.event_name_prefix {
			Some(prefix) => format!("{prefix}{name}"),
			None => name.to_string(),
		};
		let event = DomEvent::new(name).with_detail(detail).bubbling().composed();
		self.dom.dispatch_event(elm, event);
	}

	/// Turns a declared listener of `elm` on or off.
	pub fn enable_listener(&self, elm: NodeId, event_name: &str, enabled: bool) -> RuntimeResult<()> {
		lifecycle::set_listener_enabled(self, elm, event_name, enabled)
	}

	// Errors and load signals

	/// Installs the handler receiving lifecycle errors.
	///
	/// Without one, errors are logged with `tracing::error!`.
	pub fn on_error(&self, handler: impl Fn(ErrorKind, &anyhow::Error, NodeId) + 'static) {
		*self.error_handler.borrow_mut() = Some(Rc::new(handler));
	}

	pub(crate) fn report(&self, kind: ErrorKind, error: &anyhow::Error, elm: NodeId) {
		let handler = self.error_handler.borrow().clone();
		match handler {
			Some(handler) => handler(kind, error, elm),
			None => tracing::error!(kind = %kind, elm = %elm, error = %error, "component error"),
		}
	}

	/// Runs `listener` once every top-level host has loaded.
	pub fn on_app_loaded(&self, listener: impl FnOnce() + 'static) {
		if self.is_app_loaded() {
			listener();
		} else {
			self.app.borrow_mut().listeners.push(Box::new(listener));
		}
	}

	pub fn is_app_loaded(&self) -> bool {
		self.app.borrow().loaded
	}

	pub(crate) fn app_child_loading(&self, elm: NodeId) {
		self.app.borrow_mut().loading.push(elm);
	}

	/// Removes `elm` from the hosts the app waits on.
	pub(crate) fn app_child_resolved(&self, elm: NodeId) {
		let listeners = {
			let mut app = self.app.borrow_mut();
			app.loading.retain(|c| *c != elm);
			if !app.loading.is_empty() || app.loaded {
				return;
			}
			app.loaded = true;
			std::mem::take(&mut app.listeners)
		};
		tracing::debug!("app loaded");
		self.dom
			.dispatch_event(self.dom.document_element(), DomEvent::new("appload"));
		for listener in listeners {
			listener();
		}
	}

	// Introspection

	/// Lifecycle state of `elm`, or `None` when its tag is not defined.
	pub fn lifecycle_state(&self, elm: NodeId) -> Option<LifecycleState> {
		if let Some(host) = self.hosts.borrow().get(&elm) {
			return Some(host.state);
		}
		if self.is_retired(elm) {
			return Some(LifecycleState::Disconnected);
		}
		self.is_defined(elm).then_some(LifecycleState::Unconnected)
	}

	pub fn is_loaded(&self, elm: NodeId) -> bool {
		self.hosts.borrow().get(&elm).is_some_and(|h| h.loaded)
	}

	/// Number of live host records.
	pub fn host_count(&self) -> usize {
		self.hosts.borrow().len()
	}

	/// Drops the record of a disconnected host.
	pub(crate) fn retire_host(&self, elm: NodeId) {
		self.hosts.borrow_mut().remove(&elm);
		self.retired.borrow_mut().insert(elm);
	}

	pub(crate) fn is_retired(&self, elm: NodeId) -> bool {
		self.retired.borrow().contains(&elm)
	}

	/// Current phase of the render pass.
	pub fn render_phase(&self) -> RenderPhase {
		self.render_phase.get()
	}

	// Event loop

	/// Runs queued high-priority work.
	pub fn run_microtasks(&self) {
		self.queue.run_tick(self);
	}

	/// Runs one frame. Returns `false` when no frame was requested.
	pub fn run_frame(&self) -> bool {
		self.sweep_module_timeouts();
		self.queue.run_frame(self)
	}

	/// Runs ticks and frames until every queue is empty.
	pub fn run_until_idle(&self) {
		loop {
			self.run_microtasks();
			if !self.run_frame() && self.queue.is_idle() {
				break;
			}
		}
	}

	pub fn enqueue(&self, task: impl FnOnce(&Platform) + 'static, priority: Priority) {
		self.queue.enqueue(task, priority);
	}

	// Server rendering

	/// Stamps loaded hosts under `root` with SSR markers and serialises it.
	pub fn prerender(&self, root: NodeId) -> String {
		ssr::prerender(self, root)
	}
}

impl fmt::Debug for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Platform")
			.field("config", &self.config)
			.field("registry", &self.registry.borrow().keys().collect::<Vec<_>>())
			.field("hosts", &self.hosts.borrow().len())
			.field("retired", &self.retired.borrow().len())
			.field("loader", &self.loader)
			.field("render_phase", &self.render_phase.get())
			.finish_non_exhaustive()
	}
}
