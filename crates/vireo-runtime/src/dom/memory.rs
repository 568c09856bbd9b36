//! Arena-backed in-memory document.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use vireo_core::{NodeId, Value};

use super::{DomApi, DomEvent, Listener, ListenerOptions, NodeKind};

struct NodeData {
	kind: NodeKind,
	tag: Option<String>,
	namespace: Option<String>,
	text: String,
	attrs: Vec<(String, String)>,
	classes: Vec<String>,
	styles: Vec<(String, String)>,
	props: HashMap<String, Value>,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	listeners: Vec<(String, Listener, ListenerOptions)>,
}

impl NodeData {
	fn new(kind: NodeKind) -> Self {
		Self {
			kind,
			tag: None,
			namespace: None,
			text: String::new(),
			attrs: Vec::new(),
			classes: Vec::new(),
			styles: Vec::new(),
			props: HashMap::new(),
			parent: None,
			children: Vec::new(),
			listeners: Vec::new(),
		}
	}
}

/// In-memory document with `<html>`, `<head>` and `<body>` pre-created.
///
/// Every call that changes the tree, an attribute, a class, a style, a
/// property, text or a listener bumps [`MemoryDom::mutation_count`].
pub struct MemoryDom {
	nodes: RefCell<Vec<NodeData>>,
	mutations: Cell<usize>,
	html: NodeId,
	head: NodeId,
	body: NodeId,
}

impl MemoryDom {
	pub fn new() -> Self {
		let mut nodes = Vec::new();
		let mut element = |tag: &str| {
			let mut data = NodeData::new(NodeKind::Element);
			data.tag = Some(tag.to_string());
			nodes.push(data);
			NodeId::from_index(nodes.len() - 1)
		};
		let html = element("html");
		let head = element("head");
		let body = element("body");

		nodes[html.index()].children = vec![head, body];
		nodes[head.index()].parent = Some(html);
		nodes[body.index()].parent = Some(html);

		Self {
			nodes: RefCell::new(nodes),
			mutations: Cell::new(0),
			html,
			head,
			body,
		}
	}

	/// Number of mutations performed so far.
	pub fn mutation_count(&self) -> usize {
		self.mutations.get()
	}

	pub fn reset_mutation_count(&self) {
		self.mutations.set(0);
	}

	/// Elements under `root` (inclusive) with the given tag, in document order.
	pub fn elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
		let mut found = Vec::new();
		let mut stack = vec![root];
		while let Some(node) = stack.pop() {
			if self.tag_name(node).as_deref() == Some(tag) {
				found.push(node);
			}
			stack.extend(self.child_nodes(node).into_iter().rev());
		}
		found
	}

	fn read<R>(&self, node: NodeId, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
		self.nodes.borrow().get(node.index()).map(f)
	}

	fn write(&self, node: NodeId, f: impl FnOnce(&mut NodeData)) {
		if let Some(data) = self.nodes.borrow_mut().get_mut(node.index()) {
			f(data);
			self.bump();
		}
	}

	fn bump(&self) {
		self.mutations.set(self.mutations.get() + 1);
	}

	fn push(&self, data: NodeData) -> NodeId {
		let mut nodes = self.nodes.borrow_mut();
		nodes.push(data);
		self.bump();
		NodeId::from_index(nodes.len() - 1)
	}

	fn detach(nodes: &mut [NodeData], child: NodeId) {
		let Some(parent) = nodes.get(child.index()).and_then(|d| d.parent) else {
			return;
		};
		if let Some(data) = nodes.get_mut(parent.index()) {
			data.children.retain(|c| *c != child);
		}
		if let Some(data) = nodes.get_mut(child.index()) {
			data.parent = None;
		}
	}
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for MemoryDom {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryDom")
			.field("nodes", &self.nodes.borrow().len())
			.field("mutations", &self.mutations.get())
			.finish()
	}
}

impl DomApi for MemoryDom {
	fn document_element(&self) -> NodeId {
		self.html
	}

	fn head(&self) -> NodeId {
		self.head
	}

	fn body(&self) -> NodeId {
		self.body
	}

	fn create_element(&self, tag: &str) -> NodeId {
		let mut data = NodeData::new(NodeKind::Element);
		data.tag = Some(tag.to_ascii_lowercase());
		self.push(data)
	}

	fn create_element_ns(&self, namespace: &str, tag: &str) -> NodeId {
		let mut data = NodeData::new(NodeKind::Element);
		data.tag = Some(tag.to_string());
		data.namespace = Some(namespace.to_string());
		self.push(data)
	}

	fn create_text_node(&self, text: &str) -> NodeId {
		let mut data = NodeData::new(NodeKind::Text);
		data.text = text.to_string();
		self.push(data)
	}

	fn create_comment(&self, text: &str) -> NodeId {
		let mut data = NodeData::new(NodeKind::Comment);
		data.text = text.to_string();
		self.push(data)
	}

	fn node_kind(&self, node: NodeId) -> NodeKind {
		self.read(node, |d| d.kind).unwrap_or(NodeKind::Comment)
	}

	fn tag_name(&self, node: NodeId) -> Option<String> {
		self.read(node, |d| d.tag.clone()).flatten()
	}

	fn namespace(&self, node: NodeId) -> Option<String> {
		self.read(node, |d| d.namespace.clone()).flatten()
	}

	fn text_content(&self, node: NodeId) -> Option<String> {
		self.read(node, |d| match d.kind {
			NodeKind::Element => None,
			NodeKind::Text | NodeKind::Comment => Some(d.text.clone()),
		})
		.flatten()
	}

	fn set_text_content(&self, node: NodeId, text: &str) {
		self.write(node, |d| d.text = text.to_string());
	}

	fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
		self.read(node, |d| match name {
			"class" if !d.classes.is_empty() => Some(d.classes.join(" ")),
			"style" if !d.styles.is_empty() => Some(
				d.styles
					.iter()
					.map(|(k, v)| format!("{k}: {v};"))
					.collect::<Vec<_>>()
					.join(" "),
			),
			_ => d
				.attrs
				.iter()
				.find(|(k, _)| k == name)
				.map(|(_, v)| v.clone()),
		})
		.flatten()
	}

	fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
		self.write(node, |d| match name {
			"class" => {
				d.classes = value.split_whitespace().map(str::to_string).collect();
			}
			"style" => {
				d.styles = value
					.split(';')
					.filter_map(|decl| decl.split_once(':'))
					.map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
					.collect();
			}
			_ => match d.attrs.iter_mut().find(|(k, _)| k == name) {
				Some((_, v)) => *v = value.to_string(),
				None => d.attrs.push((name.to_string(), value.to_string())),
			},
		});
	}

	fn remove_attribute(&self, node: NodeId, name: &str) {
		self.write(node, |d| match name {
			"class" => d.classes.clear(),
			"style" => d.styles.clear(),
			_ => d.attrs.retain(|(k, _)| k != name),
		});
	}

	fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
		let mut attrs = self.read(node, |d| d.attrs.clone()).unwrap_or_default();
		for name in ["class", "style"] {
			if let Some(value) = self.get_attribute(node, name) {
				attrs.push((name.to_string(), value));
			}
		}
		attrs
	}

	fn get_property(&self, node: NodeId, name: &str) -> Option<Value> {
		self.read(node, |d| d.props.get(name).cloned()).flatten()
	}

	fn set_property(&self, node: NodeId, name: &str, value: Value) {
		self.write(node, |d| {
			d.props.insert(name.to_string(), value);
		});
	}

	fn remove_property(&self, node: NodeId, name: &str) {
		self.write(node, |d| {
			d.props.remove(name);
		});
	}

	fn add_class(&self, node: NodeId, class: &str) {
		self.write(node, |d| {
			if !d.classes.iter().any(|c| c == class) {
				d.classes.push(class.to_string());
			}
		});
	}

	fn remove_class(&self, node: NodeId, class: &str) {
		self.write(node, |d| d.classes.retain(|c| c != class));
	}

	fn has_class(&self, node: NodeId, class: &str) -> bool {
		self.read(node, |d| d.classes.iter().any(|c| c == class))
			.unwrap_or(false)
	}

	fn set_style(&self, node: NodeId, property: &str, value: &str) {
		self.write(node, |d| match d.styles.iter_mut().find(|(k, _)| k == property) {
			Some((_, v)) => *v = value.to_string(),
			None => d.styles.push((property.to_string(), value.to_string())),
		});
	}

	fn remove_style(&self, node: NodeId, property: &str) {
		self.write(node, |d| d.styles.retain(|(k, _)| k != property));
	}

	fn style(&self, node: NodeId, property: &str) -> Option<String> {
		self.read(node, |d| {
			d.styles
				.iter()
				.find(|(k, _)| k == property)
				.map(|(_, v)| v.clone())
		})
		.flatten()
	}

	fn parent_node(&self, node: NodeId) -> Option<NodeId> {
		self.read(node, |d| d.parent).flatten()
	}

	fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
		self.read(node, |d| d.children.clone()).unwrap_or_default()
	}

	fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
		let parent = self.parent_node(node)?;
		self.read(parent, |d| {
			let pos = d.children.iter().position(|c| *c == node)?;
			d.children.get(pos + 1).copied()
		})
		.flatten()
	}

	fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
		let mut nodes = self.nodes.borrow_mut();
		if parent.index() >= nodes.len() || child.index() >= nodes.len() {
			return;
		}
		Self::detach(&mut nodes, child);

		let children = &mut nodes[parent.index()].children;
		let pos = reference
			.and_then(|r| children.iter().position(|c| *c == r))
			.unwrap_or(children.len());
		children.insert(pos, child);
		nodes[child.index()].parent = Some(parent);
		self.bump();
	}

	fn remove_child(&self, parent: NodeId, child: NodeId) {
		let mut nodes = self.nodes.borrow_mut();
		if nodes.get(child.index()).and_then(|d| d.parent) == Some(parent) {
			Self::detach(&mut nodes, child);
			self.bump();
		}
	}

	fn add_event_listener(
		&self,
		node: NodeId,
		event: &str,
		listener: Listener,
		options: ListenerOptions,
	) {
		self.write(node, |d| d.listeners.push((event.to_string(), listener, options)));
	}

	fn remove_event_listener(&self, node: NodeId, event: &str, listener: &Listener) {
		self.write(node, |d| {
			d.listeners
				.retain(|(name, l, _)| !(name == event && Rc::ptr_eq(l, listener)));
		});
	}

	fn dispatch_event(&self, target: NodeId, event: DomEvent) {
		let mut path = vec![target];
		if event.bubbles {
			let mut current = self.parent_node(target);
			while let Some(node) = current {
				path.push(node);
				current = self.parent_node(node);
			}
		}

		for node in path {
			let listeners: Vec<Listener> = self
				.read(node, |d| {
					d.listeners
						.iter()
						.filter(|(name, _, _)| *name == event.name)
						.map(|(_, l, _)| l.clone())
						.collect()
				})
				.unwrap_or_default();

			for listener in listeners {
				let mut delivered = event.clone();
				delivered.target = Some(target);
				delivered.current_target = Some(node);
				listener(&delivered);
			}
		}
	}
}
