//! Per-type field accessor tables.

use std::collections::HashMap;
use std::fmt;

use vireo_core::Value;

use crate::dom::DomEvent;

type Getter<C> = Box<dyn Fn(&C) -> Value>;
type Setter<C> = Box<dyn Fn(&mut C, Value)>;
type Watcher<C> = Box<dyn Fn(&mut C, &Value, &Value)>;
type Method<C> = Box<dyn Fn(&mut C, &[Value]) -> anyhow::Result<Value>>;
type Handler<C> = Box<dyn Fn(&mut C, &DomEvent) -> anyhow::Result<()>>;

struct Field<C> {
	get: Getter<C>,
	set: Setter<C>,
}

/// How the runtime reads and writes the members of a component type.
///
/// Built once per type when its [`ComponentDefinition`](super::ComponentDefinition)
/// is created and shared by all instances.
///
/// # Example
///
/// ```
/// use vireo_core::Value;
/// use vireo_runtime::component::AccessorTable;
///
/// #[derive(Default)]
/// struct Toggle {
///     open: bool,
///     changes: u32,
/// }
///
/// let table = AccessorTable::<Toggle>::new()
///     .field("open", |t| Value::Bool(t.open), |t, v| t.open = v.is_truthy())
///     .did_change("open", |t, _new, _old| t.changes += 1);
///
/// assert!(table.has_field("open"));
/// ```
pub struct AccessorTable<C> {
	fields: HashMap<String, Field<C>>,
	will_change: HashMap<String, Watcher<C>>,
	did_change: HashMap<String, Watcher<C>>,
	methods: HashMap<String, Method<C>>,
	handlers: HashMap<String, Handler<C>>,
}

impl<C> AccessorTable<C> {
	pub fn new() -> Self {
		Self {
			fields: HashMap::new(),
			will_change: HashMap::new(),
			did_change: HashMap::new(),
			methods: HashMap::new(),
			handlers: HashMap::new(),
		}
	}

	/// Registers the getter and setter of a prop, state, element or global member.
	pub fn field(
		mut self,
		name: impl Into<String>,
		get: impl Fn(&C) -> Value + 'static,
		set: impl Fn(&mut C, Value) + 'static,
	) -> Self {
		self.fields.insert(
			name.into(),
			Field {
				get: Box::new(get),
				set: Box::new(set),
			},
		);
		self
	}

	/// Runs before a changed value is committed, with `(new, old)`.
	pub fn will_change(
		mut self,
		name: impl Into<String>,
		watcher: impl Fn(&mut C, &Value, &Value) + 'static,
	) -> Self {
		self.will_change.insert(name.into(), Box::new(watcher));
		self
	}

	/// Runs after a changed value is committed, with `(new, old)`.
	pub fn did_change(
		mut self,
		name: impl Into<String>,
		watcher: impl Fn(&mut C, &Value, &Value) + 'static,
	) -> Self {
		self.did_change.insert(name.into(), Box::new(watcher));
		self
	}

	/// Registers a method callable through the host element.
	pub fn method(
		mut self,
		name: impl Into<String>,
		method: impl Fn(&mut C, &[Value]) -> anyhow::Result<Value> + 'static,
	) -> Self {
		self.methods.insert(name.into(), Box::new(method));
		self
	}

	/// Registers the target of a declared listener.
	pub fn handler(
		mut self,
		name: impl Into<String>,
		handler: impl Fn(&mut C, &DomEvent) -> anyhow::Result<()> + 'static,
	) -> Self {
		self.handlers.insert(name.into(), Box::new(handler));
		self
	}

	pub fn has_field(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	pub(crate) fn get(&self, component: &C, name: &str) -> Option<Value> {
		self.fields.get(name).map(|f| (f.get)(component))
	}

	pub(crate) fn set(&self, component: &mut C, name: &str, value: Value) -> bool {
		match self.fields.get(name) {
			Some(field) => {
				(field.set)(component, value);
				true
			}
			None => false,
		}
	}

	pub(crate) fn notify_will_change(&self, component: &mut C, name: &str, new: &Value, old: &Value) {
		if let Some(watcher) = self.will_change.get(name) {
			watcher(component, new, old);
		}
	}

	pub(crate) fn notify_did_change(&self, component: &mut C, name: &str, new: &Value, old: &Value) {
		if let Some(watcher) = self.did_change.get(name) {
			watcher(component, new, old);
		}
	}

	pub(crate) fn call(
		&self,
		component: &mut C,
		name: &str,
		args: &[Value],
	) -> Option<anyhow::Result<Value>> {
		self.methods.get(name).map(|m| m(component, args))
	}

	pub(crate) fn handle(
		&self,
		component: &mut C,
		name: &str,
		event: &DomEvent,
	) -> Option<anyhow::Result<()>> {
		self.handlers.get(name).map(|h| h(component, event))
	}
}

impl<C> Default for AccessorTable<C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C> fmt::Debug for AccessorTable<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AccessorTable")
			.field("fields", &self.fields.keys().collect::<Vec<_>>())
			.field("methods", &self.methods.keys().collect::<Vec<_>>())
			.field("handlers", &self.handlers.keys().collect::<Vec<_>>())
			.finish()
	}
}
