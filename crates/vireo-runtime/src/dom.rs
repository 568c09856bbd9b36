//! Document abstraction.
//!
//! The runtime reaches the document only through [`DomApi`]. Nodes are
//! addressed by [`NodeId`] handles issued by the implementation; the runtime
//! never owns document nodes.
//!
//! [`MemoryDom`] is an arena-backed implementation used on the server and in
//! tests. It counts every mutation so callers can verify that a patch did
//! nothing.

mod event;
mod memory;

pub use event::{DomEvent, Listener, ListenerOptions};
pub use memory::MemoryDom;

use vireo_core::{NodeId, Value};

/// Namespace of SVG elements.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	Element,
	Text,
	Comment,
}

/// Operations the runtime performs on a document.
pub trait DomApi {
	/// The `<html>` element; acts as the root loader of the app.
	fn document_element(&self) -> NodeId;

	fn head(&self) -> NodeId;

	fn body(&self) -> NodeId;

	fn create_element(&self, tag: &str) -> NodeId;

	fn create_element_ns(&self, namespace: &str, tag: &str) -> NodeId;

	fn create_text_node(&self, text: &str) -> NodeId;

	fn create_comment(&self, text: &str) -> NodeId;

	fn node_kind(&self, node: NodeId) -> NodeKind;

	/// Lower-cased tag name of an element, `None` for other nodes.
	fn tag_name(&self, node: NodeId) -> Option<String>;

	fn namespace(&self, node: NodeId) -> Option<String>;

	/// Text payload of a text or comment node.
	fn text_content(&self, node: NodeId) -> Option<String>;

	fn set_text_content(&self, node: NodeId, text: &str);

	fn get_attribute(&self, node: NodeId, name: &str) -> Option<String>;

	fn set_attribute(&self, node: NodeId, name: &str, value: &str);

	fn remove_attribute(&self, node: NodeId, name: &str);

	/// Attributes in insertion order.
	fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

	fn has_attribute(&self, node: NodeId, name: &str) -> bool {
		self.get_attribute(node, name).is_some()
	}

	/// Expando property on the node object, not reflected to markup.
	fn get_property(&self, node: NodeId, name: &str) -> Option<Value>;

	fn set_property(&self, node: NodeId, name: &str, value: Value);

	fn remove_property(&self, node: NodeId, name: &str);

	fn add_class(&self, node: NodeId, class: &str);

	fn remove_class(&self, node: NodeId, class: &str);

	fn has_class(&self, node: NodeId, class: &str) -> bool;

	fn set_style(&self, node: NodeId, property: &str, value: &str);

	fn remove_style(&self, node: NodeId, property: &str);

	fn style(&self, node: NodeId, property: &str) -> Option<String>;

	fn parent_node(&self, node: NodeId) -> Option<NodeId>;

	fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

	fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

	fn first_child(&self, node: NodeId) -> Option<NodeId> {
		self.child_nodes(node).first().copied()
	}

	/// Inserts `child` before `reference`, or appends when `reference` is `None`.
	///
	/// A child that already has a parent is moved.
	fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>);

	fn append_child(&self, parent: NodeId, child: NodeId) {
		self.insert_before(parent, child, None);
	}

	fn remove_child(&self, parent: NodeId, child: NodeId);

	fn add_event_listener(
		&self,
		node: NodeId,
		event: &str,
		listener: Listener,
		options: ListenerOptions,
	);

	/// Removes a listener previously added with the same `Rc`.
	fn remove_event_listener(&self, node: NodeId, event: &str, listener: &Listener);

	/// Delivers `event` to `target` and, when it bubbles, to each ancestor.
	fn dispatch_event(&self, target: NodeId, event: DomEvent);

	/// Whether `node` is attached under the document element.
	fn is_connected(&self, node: NodeId) -> bool {
		let root = self.document_element();
		let mut current = Some(node);
		while let Some(n) = current {
			if n == root {
				return true;
			}
			current = self.parent_node(n);
		}
		false
	}

	/// Whether `node` is `ancestor` or lies beneath it.
	fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut current = Some(node);
		while let Some(n) = current {
			if n == ancestor {
				return true;
			}
			current = self.parent_node(n);
		}
		false
	}
}
