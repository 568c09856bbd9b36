//! Virtual nodes and the `h` / `t` construction primitives.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use vireo_core::value::format_number;
use vireo_core::{NodeId, Value};

use crate::dom::{DomEvent, Listener};

/// Reconciliation key of a child node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Str(String),
	Num(i64),
}

impl From<&str> for Key {
	fn from(value: &str) -> Self {
		Key::Str(value.to_string())
	}
}

impl From<String> for Key {
	fn from(value: String) -> Self {
		Key::Str(value)
	}
}

impl From<i64> for Key {
	fn from(value: i64) -> Self {
		Key::Num(value)
	}
}

impl From<i32> for Key {
	fn from(value: i32) -> Self {
		Key::Num(i64::from(value))
	}
}

impl From<usize> for Key {
	fn from(value: usize) -> Self {
		Key::Num(value as i64)
	}
}

/// Description of one DOM node for a single render pass.
///
/// A node is either an element (`tag` is set) or a text node (`text` is set).
/// `elm` is filled in once the node has been patched into the document.
#[derive(Clone, Default)]
pub struct VNode {
	pub(crate) tag: Option<String>,
	pub(crate) text: Option<String>,
	pub(crate) attrs: BTreeMap<String, String>,
	pub(crate) props: BTreeMap<String, Value>,
	pub(crate) class: BTreeMap<String, bool>,
	pub(crate) style: BTreeMap<String, String>,
	pub(crate) listeners: BTreeMap<String, Listener>,
	pub(crate) key: Option<Key>,
	pub(crate) namespace: Option<String>,
	pub(crate) children: Vec<VNode>,
	pub(crate) elm: Option<NodeId>,
}

impl VNode {
	/// Element node bound to an existing document node, with no data or children.
	///
	/// Patching a new tree against it treats every child as new.
	pub fn bound(tag: impl Into<String>, elm: NodeId) -> Self {
		Self {
			tag: Some(tag.into()),
			elm: Some(elm),
			..Self::default()
		}
	}

	pub fn tag(&self) -> Option<&str> {
		self.tag.as_deref()
	}

	pub fn text(&self) -> Option<&str> {
		self.text.as_deref()
	}

	pub fn is_text(&self) -> bool {
		self.text.is_some()
	}

	pub fn attrs(&self) -> &BTreeMap<String, String> {
		&self.attrs
	}

	pub fn props(&self) -> &BTreeMap<String, Value> {
		&self.props
	}

	pub fn class_map(&self) -> &BTreeMap<String, bool> {
		&self.class
	}

	pub fn style(&self) -> &BTreeMap<String, String> {
		&self.style
	}

	pub fn listeners(&self) -> &BTreeMap<String, Listener> {
		&self.listeners
	}

	pub fn key(&self) -> Option<&Key> {
		self.key.as_ref()
	}

	pub fn namespace(&self) -> Option<&str> {
		self.namespace.as_deref()
	}

	pub fn children(&self) -> &[VNode] {
		&self.children
	}

	/// Node this vnode was patched into, if any.
	pub fn elm(&self) -> Option<NodeId> {
		self.elm
	}

	/// Sets the key after construction.
	pub fn with_key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}
}

impl fmt::Debug for VNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(text) = &self.text {
			return f.debug_tuple("Text").field(text).finish();
		}
		f.debug_struct("VNode")
			.field("tag", &self.tag)
			.field("key", &self.key)
			.field("attrs", &self.attrs)
			.field("class", &self.class)
			.field("listeners", &self.listeners.keys().collect::<Vec<_>>())
			.field("children", &self.children)
			.field("elm", &self.elm)
			.finish()
	}
}

/// Node data accepted by [`h`].
///
/// # Example
///
/// ```
/// use vireo_runtime::vdom::{VData, h};
///
/// let node = h("button", VData::new().class("primary big").attr("type", "submit"), ["Send"]);
/// assert_eq!(node.class_map().len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct VData {
	attrs: BTreeMap<String, String>,
	props: BTreeMap<String, Value>,
	class: BTreeMap<String, bool>,
	style: BTreeMap<String, String>,
	listeners: BTreeMap<String, Listener>,
	key: Option<Key>,
	namespace: Option<String>,
}

impl VData {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}

	/// Sets a presence attribute when `on` is true.
	pub fn bool_attr(mut self, name: impl Into<String>, on: bool) -> Self {
		if on {
			self.attrs.insert(name.into(), String::new());
		}
		self
	}

	pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.props.insert(name.into(), value.into());
		self
	}

	/// Adds every whitespace-separated class name as enabled.
	pub fn class(mut self, classes: &str) -> Self {
		for name in classes.split_whitespace() {
			self.class.insert(name.to_string(), true);
		}
		self
	}

	/// Enables or disables one class.
	pub fn class_toggle(mut self, name: impl Into<String>, on: bool) -> Self {
		self.class.insert(name.into(), on);
		self
	}

	pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
		self.style.insert(property.into(), value.into());
		self
	}

	pub fn on(self, event: impl Into<String>, handler: impl Fn(&DomEvent) + 'static) -> Self {
		self.listener(event, Rc::new(handler))
	}

	/// Attaches a shared listener; reusing the same `Rc` across renders keeps it bound.
	pub fn listener(mut self, event: impl Into<String>, listener: Listener) -> Self {
		self.listeners.insert(event.into(), listener);
		self
	}

	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = Some(namespace.into());
		self
	}
}

/// A child passed to [`h`]: a node or a text fragment.
#[derive(Debug, Clone)]
pub enum Child {
	Node(VNode),
	Text(String),
}

impl From<VNode> for Child {
	fn from(node: VNode) -> Self {
		Child::Node(node)
	}
}

impl From<&str> for Child {
	fn from(text: &str) -> Self {
		Child::Text(text.to_string())
	}
}

impl From<String> for Child {
	fn from(text: String) -> Self {
		Child::Text(text)
	}
}

impl From<f64> for Child {
	fn from(n: f64) -> Self {
		Child::Text(format_number(n))
	}
}

impl From<i32> for Child {
	fn from(n: i32) -> Self {
		Child::Text(n.to_string())
	}
}

impl From<i64> for Child {
	fn from(n: i64) -> Self {
		Child::Text(n.to_string())
	}
}

/// Builds an element node.
///
/// Adjacent text children are concatenated into a single text node.
///
/// ```
/// use vireo_runtime::vdom::{VData, h};
///
/// let node = h("div", VData::new().class("a b"), ["hi"]);
/// assert_eq!(node.children()[0].text(), Some("hi"));
/// ```
pub fn h<I, C>(tag: &str, data: VData, children: I) -> VNode
where
	I: IntoIterator<Item = C>,
	C: Into<Child>,
{
	let mut nodes: Vec<VNode> = Vec::new();
	let mut pending_text: Option<String> = None;

	for child in children {
		match child.into() {
			Child::Text(text) => pending_text.get_or_insert_with(String::new).push_str(&text),
			Child::Node(node) => {
				if let Some(text) = pending_text.take() {
					nodes.push(t(text));
				}
				nodes.push(node);
			}
		}
	}
	if let Some(text) = pending_text {
		nodes.push(t(text));
	}

	VNode {
		tag: Some(tag.to_string()),
		text: None,
		attrs: data.attrs,
		props: data.props,
		class: data.class,
		style: data.style,
		listeners: data.listeners,
		key: data.key,
		namespace: data.namespace,
		children: nodes,
		elm: None,
	}
}

/// Builds a standalone text node.
pub fn t(text: impl Into<String>) -> VNode {
	VNode {
		text: Some(text.into()),
		..VNode::default()
	}
}

/// `h` without children.
pub fn el(tag: &str, data: VData) -> VNode {
	h(tag, data, std::iter::empty::<Child>())
}
