//! Slot projection of light DOM content.

use std::collections::BTreeMap;

use vireo_core::NodeId;

use crate::dom::{DomApi, NodeKind};

/// Host children captured at connect time, grouped by target slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContent {
	default_slot: Vec<NodeId>,
	named_slots: BTreeMap<String, Vec<NodeId>>,
}

impl HostContent {
	/// Detaches the current children of `host` and assigns them to slots.
	///
	/// Elements with a `slot` attribute go to the named slot, everything else
	/// to the default slot. Whitespace-only text is dropped.
	pub fn assign(dom: &dyn DomApi, host: NodeId) -> Self {
		let mut content = Self::default();
		for child in dom.child_nodes(host) {
			dom.remove_child(host, child);
			match dom.node_kind(child) {
				NodeKind::Element => match dom.get_attribute(child, "slot") {
					Some(name) if !name.is_empty() => {
						content.named_slots.entry(name).or_default().push(child);
					}
					_ => content.default_slot.push(child),
				},
				NodeKind::Text => {
					let blank = dom
						.text_content(child)
						.is_none_or(|text| text.trim().is_empty());
					if !blank {
						content.default_slot.push(child);
					}
				}
				NodeKind::Comment => {}
			}
		}
		content
	}

	/// Collects the nodes already projected into the `<slot>` elements of a
	/// server-rendered `host`, leaving them where they are.
	///
	/// Nested hosts (elements carrying `nested_marker`) are not searched.
	pub fn from_rendered_slots(dom: &dyn DomApi, host: NodeId, nested_marker: &str) -> Self {
		let mut content = Self::default();
		let mut stack: Vec<NodeId> = dom.child_nodes(host).into_iter().rev().collect();
		while let Some(node) = stack.pop() {
			if dom.node_kind(node) != NodeKind::Element || dom.has_attribute(node, nested_marker) {
				continue;
			}
			if dom.tag_name(node).as_deref() == Some("slot") {
				let nodes = dom.child_nodes(node);
				match dom.get_attribute(node, "name").filter(|name| !name.is_empty()) {
					Some(name) => content.named_slots.entry(name).or_default().extend(nodes),
					None => content.default_slot.extend(nodes),
				}
				continue;
			}
			stack.extend(dom.child_nodes(node).into_iter().rev());
		}
		content
	}

	/// Nodes projected into the slot named `name`, or the default slot.
	pub fn nodes_for(&self, name: Option<&str>) -> &[NodeId] {
		match name {
			Some(name) if !name.is_empty() => self
				.named_slots
				.get(name)
				.map(Vec::as_slice)
				.unwrap_or(&[]),
			_ => &self.default_slot,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.default_slot.is_empty() && self.named_slots.is_empty()
	}
}
