//! Type-erased component instances.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use vireo_core::Value;

use super::{AccessorTable, Component, WillLoad};
use crate::dom::DomEvent;
use crate::vdom::{VData, VNode};

/// Shared handle to a live instance.
pub(crate) type InstanceRef = Rc<RefCell<dyn InstanceObject>>;

/// Object-safe view of a [`Component`] and its accessor table.
pub(crate) trait InstanceObject {
	fn get(&self, member: &str) -> Option<Value>;

	/// Raw write without change detection. Returns `false` for unknown members.
	fn set(&mut self, member: &str, value: Value) -> bool;

	fn will_change(&mut self, member: &str, new: &Value, old: &Value);

	fn did_change(&mut self, member: &str, new: &Value, old: &Value);

	fn call(&mut self, method: &str, args: &[Value]) -> Option<anyhow::Result<Value>>;

	fn handle(&mut self, handler: &str, event: &DomEvent) -> Option<anyhow::Result<()>>;

	fn render(&self) -> anyhow::Result<Option<VNode>>;

	fn host_data(&self) -> Option<VData>;

	fn will_load(&mut self) -> anyhow::Result<WillLoad>;

	fn did_load(&mut self) -> anyhow::Result<()>;

	fn will_update(&mut self) -> anyhow::Result<()>;

	fn did_update(&mut self) -> anyhow::Result<()>;

	fn did_unload(&mut self);

	fn as_any(&self) -> &dyn Any;
}

pub(crate) struct TypedInstance<C: Component> {
	component: C,
	table: Rc<AccessorTable<C>>,
}

impl<C: Component> TypedInstance<C> {
	pub(crate) fn new_ref(component: C, table: Rc<AccessorTable<C>>) -> InstanceRef {
		Rc::new(RefCell::new(Self { component, table }))
	}
}

impl<C: Component> InstanceObject for TypedInstance<C> {
	fn get(&self, member: &str) -> Option<Value> {
		self.table.get(&self.component, member)
	}

	fn set(&mut self, member: &str, value: Value) -> bool {
		self.table.set(&mut self.component, member, value)
	}

	fn will_change(&mut self, member: &str, new: &Value, old: &Value) {
		self.table
			.notify_will_change(&mut self.component, member, new, old);
	}

	fn did_change(&mut self, member: &str, new: &Value, old: &Value) {
		self.table
			.notify_did_change(&mut self.component, member, new, old);
	}

	fn call(&mut self, method: &str, args: &[Value]) -> Option<anyhow::Result<Value>> {
		self.table.call(&mut self.component, method, args)
	}

	fn handle(&mut self, handler: &str, event: &DomEvent) -> Option<anyhow::Result<()>> {
		self.table.handle(&mut self.component, handler, event)
	}

	fn render(&self) -> anyhow::Result<Option<VNode>> {
		self.component.render()
	}

	fn host_data(&self) -> Option<VData> {
		self.component.host_data()
	}

	fn will_load(&mut self) -> anyhow::Result<WillLoad> {
		self.component.will_load()
	}

	fn did_load(&mut self) -> anyhow::Result<()> {
		self.component.did_load()
	}

	fn will_update(&mut self) -> anyhow::Result<()> {
		self.component.will_update()
	}

	fn did_update(&mut self) -> anyhow::Result<()> {
		self.component.did_update()
	}

	fn did_unload(&mut self) {
		self.component.did_unload();
	}

	fn as_any(&self) -> &dyn Any {
		&self.component
	}
}
