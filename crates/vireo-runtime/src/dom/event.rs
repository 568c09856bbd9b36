use std::fmt;
use std::rc::Rc;

use vireo_core::{NodeId, Value};

/// Event listener callback. Listeners are compared by `Rc` identity.
pub type Listener = Rc<dyn Fn(&DomEvent)>;

/// Options passed when attaching a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
	pub capture: bool,
	pub passive: bool,
}

/// A dispatched event.
#[derive(Clone)]
pub struct DomEvent {
	pub name: String,
	pub detail: Value,
	pub bubbles: bool,
	pub composed: bool,
	/// Node the event was dispatched on.
	pub target: Option<NodeId>,
	/// Node whose listener is currently running.
	pub current_target: Option<NodeId>,
}

impl DomEvent {
	/// A non-bubbling event with no detail.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			detail: Value::Undefined,
			bubbles: false,
			composed: false,
			target: None,
			current_target: None,
		}
	}

	pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
		self.detail = detail.into();
		self
	}

	pub fn bubbling(mut self) -> Self {
		self.bubbles = true;
		self
	}

	pub fn composed(mut self) -> Self {
		self.composed = true;
		self
	}
}

impl fmt::Debug for DomEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DomEvent")
			.field("name", &self.name)
			.field("detail", &self.detail)
			.field("bubbles", &self.bubbles)
			.field("target", &self.target)
			.finish()
	}
}
