//! Custom element classes.
//!
//! Defining a tag installs one [`CustomElement`] for it. The platform looks
//! the class up by tag name and forwards the document callbacks to it.

use std::rc::Rc;

use vireo_core::{ComponentMeta, NodeId};

use crate::lifecycle;
use crate::platform::Platform;

/// Callbacks the platform dispatches to the class registered for a tag.
pub trait CustomElement {
	/// Attributes whose changes reach [`CustomElement::attribute_changed`].
	fn observed_attributes(&self) -> &[String];

	fn connected(&self, plt: &Platform, elm: NodeId);

	fn disconnected(&self, plt: &Platform, elm: NodeId);

	fn attribute_changed(
		&self,
		plt: &Platform,
		elm: NodeId,
		name: &str,
		old: Option<&str>,
		new: Option<&str>,
	);

	/// Schedules a render of `elm`.
	fn queue_update(&self, plt: &Platform, elm: NodeId);

	/// Completes the load of `elm` if nothing below it is still loading.
	fn init_load(&self, plt: &Platform, elm: NodeId);

	/// Renders `elm` right away.
	fn render(&self, plt: &Platform, elm: NodeId, is_update: bool);
}

/// Class of every registered component tag.
#[derive(Debug)]
pub struct HostElementClass {
	meta: Rc<ComponentMeta>,
	observed: Vec<String>,
}

impl HostElementClass {
	pub fn new(meta: Rc<ComponentMeta>) -> Self {
		let observed = meta.observed_attributes();
		Self { meta, observed }
	}

	pub fn meta(&self) -> &Rc<ComponentMeta> {
		&self.meta
	}
}

impl CustomElement for HostElementClass {
	fn observed_attributes(&self) -> &[String] {
		&self.observed
	}

	fn connected(&self, plt: &Platform, elm: NodeId) {
		lifecycle::connected(plt, elm, &self.meta);
	}

	fn disconnected(&self, plt: &Platform, elm: NodeId) {
		lifecycle::disconnected(plt, elm);
	}

	fn attribute_changed(
		&self,
		plt: &Platform,
		elm: NodeId,
		name: &str,
		old: Option<&str>,
		new: Option<&str>,
	) {
		if old == new {
			return;
		}
		lifecycle::attribute_changed(plt, elm, &self.meta, name, new);
	}

	fn queue_update(&self, plt: &Platform, elm: NodeId) {
		lifecycle::queue_update(plt, elm);
	}

	fn init_load(&self, plt: &Platform, elm: NodeId) {
		lifecycle::init_load(plt, elm);
	}

	fn render(&self, plt: &Platform, elm: NodeId, is_update: bool) {
		lifecycle::render_reporting(plt, elm, is_update);
	}
}
