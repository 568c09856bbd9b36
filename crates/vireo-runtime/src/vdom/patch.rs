//! Diff and patch.
//!
//! Reconciles a freshly built [`VNode`] tree against the previous one and
//! applies the minimal set of document mutations:
//!
//! - element data (attributes, properties, classes, styles) is patched by
//!   set difference; listeners are compared by `Rc` identity
//! - text nodes short-circuit to a single text assignment
//! - children use a two-ended scan with a key-map fallback for moved nodes
//! - namespaces are inherited from the parent unless a node overrides them
//!
//! The new tree is fully built before patching starts, so a failing render
//! never reaches this module.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use vireo_core::NodeId;

use super::node::{Key, VNode};
use super::slot::HostContent;
use crate::dom::{DomApi, ListenerOptions, SVG_NS};

/// Nodes created and detached by one patch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
	/// Elements created, parents before children.
	pub created: Vec<NodeId>,
	/// Roots of detached subtrees.
	pub removed: Vec<NodeId>,
}

/// Patches `new` against `old`, recording the real nodes into `new`.
///
/// `old` must already be bound to a node. When the two roots cannot be
/// matched the old root is replaced in its parent.
pub fn patch(
	dom: &dyn DomApi,
	old: VNode,
	new: &mut VNode,
	host_content: Option<&HostContent>,
) -> PatchOutcome {
	let mut patcher = Patcher {
		dom,
		host_content,
		outcome: PatchOutcome::default(),
	};

	let old_root = old.elm;
	match old_root {
		Some(_) if same_vnode(&old, new) => patcher.patch_vnode(old, new, None),
		Some(old_elm) => {
			let parent = dom.parent_node(old_elm);
			let elm = patcher.create_elm(new, None);
			if let Some(parent) = parent {
				dom.insert_before(parent, elm, dom.next_sibling(old_elm));
				patcher.remove(parent, &old);
			}
		}
		None => {
			patcher.create_elm(new, None);
		}
	}

	patcher.outcome
}

/// Two nodes are patchable into each other when key and tag agree.
fn same_vnode(a: &VNode, b: &VNode) -> bool {
	a.key == b.key && a.tag == b.tag && a.text.is_some() == b.text.is_some()
}

fn resolve_namespace(vnode: &VNode, parent_ns: Option<&str>) -> Option<String> {
	match (&vnode.namespace, vnode.tag.as_deref()) {
		(Some(ns), _) => Some(ns.clone()),
		(None, Some("svg")) => Some(SVG_NS.to_string()),
		(None, _) => parent_ns.map(str::to_string),
	}
}

fn child_namespace(vnode: &VNode, ns: Option<String>) -> Option<String> {
	if vnode.tag.as_deref() == Some("foreignObject") {
		None
	} else {
		ns
	}
}

struct Patcher<'a> {
	dom: &'a dyn DomApi,
	host_content: Option<&'a HostContent>,
	outcome: PatchOutcome,
}

impl Patcher<'_> {
	fn create_elm(&mut self, vnode: &mut VNode, parent_ns: Option<&str>) -> NodeId {
		if let Some(text) = &vnode.text {
			let node = self.dom.create_text_node(text);
			vnode.elm = Some(node);
			return node;
		}

		let tag = vnode.tag.clone().unwrap_or_default();
		let ns = resolve_namespace(vnode, parent_ns);
		let elm = match ns.as_deref() {
			Some(ns) => self.dom.create_element_ns(ns, &tag),
			None => self.dom.create_element(&tag),
		};
		vnode.elm = Some(elm);
		self.update_element(elm, &VNode::default(), vnode);
		self.outcome.created.push(elm);

		if tag == "slot"
			&& let Some(content) = self.host_content
		{
			let name = vnode.attrs.get("name").map(String::as_str);
			for node in content.nodes_for(name) {
				self.dom.append_child(elm, *node);
			}
		}

		let child_ns = child_namespace(vnode, ns);
		for child in vnode.children.iter_mut() {
			let node = self.create_elm(child, child_ns.as_deref());
			self.dom.append_child(elm, node);
		}
		elm
	}

	fn patch_vnode(&mut self, old: VNode, new: &mut VNode, parent_ns: Option<&str>) {
		let Some(elm) = old.elm else {
			self.create_elm(new, parent_ns);
			return;
		};
		new.elm = Some(elm);

		if let (Some(old_text), Some(new_text)) = (&old.text, &new.text) {
			if old_text != new_text {
				self.dom.set_text_content(elm, new_text);
			}
			return;
		}

		self.update_element(elm, &old, new);

		let ns = resolve_namespace(new, parent_ns);
		let child_ns = child_namespace(new, ns);
		let old_children = old.children;
		match (old_children.is_empty(), new.children.is_empty()) {
			(false, false) => {
				self.update_children(elm, old_children, &mut new.children, child_ns.as_deref())
			}
			(true, false) => {
				self.add_vnodes(elm, None, &mut new.children, child_ns.as_deref());
			}
			(false, true) => {
				for child in &old_children {
					self.remove(elm, child);
				}
			}
			(true, true) => {}
		}
	}

	fn update_children(
		&mut self,
		parent: NodeId,
		old_ch: Vec<VNode>,
		new_ch: &mut [VNode],
		ns: Option<&str>,
	) {
		let mut old: Vec<Option<VNode>> = old_ch.into_iter().map(Some).collect();
		let (mut old_start, mut old_end) = (0, old.len());
		let (mut new_start, mut new_end) = (0, new_ch.len());
		let mut key_map: Option<HashMap<Key, usize>> = None;

		while old_start < old_end && new_start < new_end {
			let Some(os) = &old[old_start] else {
				old_start += 1;
				continue;
			};
			let Some(oe) = &old[old_end - 1] else {
				old_end -= 1;
				continue;
			};

			if same_vnode(os, &new_ch[new_start]) {
				if let Some(vnode) = old[old_start].take() {
					self.patch_vnode(vnode, &mut new_ch[new_start], ns);
				}
				old_start += 1;
				new_start += 1;
			} else if same_vnode(oe, &new_ch[new_end - 1]) {
				if let Some(vnode) = old[old_end - 1].take() {
					self.patch_vnode(vnode, &mut new_ch[new_end - 1], ns);
				}
				old_end -= 1;
				new_end -= 1;
			} else if same_vnode(os, &new_ch[new_end - 1]) {
				// moved right
				let anchor = oe.elm.and_then(|e| self.dom.next_sibling(e));
				if let Some(vnode) = old[old_start].take() {
					self.patch_vnode(vnode, &mut new_ch[new_end - 1], ns);
				}
				self.move_before(parent, &new_ch[new_end - 1], anchor);
				old_start += 1;
				new_end -= 1;
			} else if same_vnode(oe, &new_ch[new_start]) {
				// moved left
				let anchor = os.elm;
				if let Some(vnode) = old[old_end - 1].take() {
					self.patch_vnode(vnode, &mut new_ch[new_start], ns);
				}
				self.move_before(parent, &new_ch[new_start], anchor);
				old_end -= 1;
				new_start += 1;
			} else {
				let anchor = os.elm;
				let map = key_map.get_or_insert_with(|| {
					(old_start..old_end)
						.filter_map(|i| {
							let key = old[i].as_ref()?.key.clone()?;
							Some((key, i))
						})
						.collect()
				});
				let matched = new_ch[new_start]
					.key
					.as_ref()
					.and_then(|k| map.get(k))
					.copied()
					.filter(|&i| {
						old[i]
							.as_ref()
							.is_some_and(|o| same_vnode(o, &new_ch[new_start]))
					});

				match matched.and_then(|i| old[i].take()) {
					Some(vnode) => {
						self.patch_vnode(vnode, &mut new_ch[new_start], ns);
						self.move_before(parent, &new_ch[new_start], anchor);
					}
					None => {
						let node = self.create_elm(&mut new_ch[new_start], ns);
						self.dom.insert_before(parent, node, anchor);
					}
				}
				new_start += 1;
			}
		}

		if new_start < new_end {
			let anchor = new_ch.get(new_end).and_then(|n| n.elm);
			self.add_vnodes(parent, anchor, &mut new_ch[new_start..new_end], ns);
		} else {
			for vnode in old[old_start..old_end].iter().flatten() {
				self.remove(parent, vnode);
			}
		}
	}

	fn move_before(&self, parent: NodeId, vnode: &VNode, anchor: Option<NodeId>) {
		if let Some(elm) = vnode.elm {
			self.dom.insert_before(parent, elm, anchor);
		}
	}

	fn add_vnodes(
		&mut self,
		parent: NodeId,
		before: Option<NodeId>,
		vnodes: &mut [VNode],
		ns: Option<&str>,
	) {
		for vnode in vnodes {
			let node = self.create_elm(vnode, ns);
			self.dom.insert_before(parent, node, before);
		}
	}

	fn remove(&mut self, parent: NodeId, vnode: &VNode) {
		if let Some(elm) = vnode.elm {
			self.dom.remove_child(parent, elm);
			if vnode.tag.is_some() {
				self.outcome.removed.push(elm);
			}
		}
	}

	fn update_element(&self, elm: NodeId, old: &VNode, new: &VNode) {
		let dom = self.dom;

		diff_map(
			&old.attrs,
			&new.attrs,
			|name| dom.remove_attribute(elm, name),
			|name, value| dom.set_attribute(elm, name, value),
		);
		diff_map(
			&old.props,
			&new.props,
			|name| dom.remove_property(elm, name),
			|name, value| dom.set_property(elm, name, value.clone()),
		);
		diff_map(
			&old.style,
			&new.style,
			|name| dom.remove_style(elm, name),
			|name, value| dom.set_style(elm, name, value),
		);

		for (name, &was_on) in &old.class {
			if was_on && !new.class.get(name).copied().unwrap_or(false) {
				dom.remove_class(elm, name);
			}
		}
		for (name, &on) in &new.class {
			if on && !old.class.get(name).copied().unwrap_or(false) {
				dom.add_class(elm, name);
			}
		}

		for (event, listener) in &old.listeners {
			let kept = new
				.listeners
				.get(event)
				.is_some_and(|l| Rc::ptr_eq(l, listener));
			if !kept {
				dom.remove_event_listener(elm, event, listener);
			}
		}
		for (event, listener) in &new.listeners {
			let bound = old
				.listeners
				.get(event)
				.is_some_and(|l| Rc::ptr_eq(l, listener));
			if !bound {
				dom.add_event_listener(elm, event, listener.clone(), ListenerOptions::default());
			}
		}
	}
}

/// Calls `remove` for keys only in `old` and `set` for keys whose value changed.
fn diff_map<V: PartialEq>(
	old: &BTreeMap<String, V>,
	new: &BTreeMap<String, V>,
	mut remove: impl FnMut(&str),
	mut set: impl FnMut(&str, &V),
) {
	for name in old.keys() {
		if !new.contains_key(name) {
			remove(name);
		}
	}
	for (name, value) in new {
		if old.get(name) != Some(value) {
			set(name, value);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::{DomEvent, Listener, MemoryDom};
	use crate::vdom::{Child, VData, el, h};
	use rstest::{fixture, rstest};

	struct Mounted {
		dom: MemoryDom,
		root: NodeId,
		current: VNode,
	}

	impl Mounted {
		fn patch_to(&mut self, mut next: VNode) -> PatchOutcome {
			let old = std::mem::take(&mut self.current);
			let outcome = patch(&self.dom, old, &mut next, None);
			self.current = next;
			outcome
		}

		fn children(&self) -> Vec<NodeId> {
			self.dom.child_nodes(self.root)
		}
	}

	#[fixture]
	fn mounted() -> Mounted {
		let dom = MemoryDom::new();
		let root = dom.create_element("div");
		dom.append_child(dom.body(), root);
		Mounted {
			current: VNode::bound("div", root),
			dom,
			root,
		}
	}

	fn keyed_list(keys: &[&str]) -> VNode {
		h(
			"div",
			VData::new(),
			keys.iter()
				.map(|k| Child::from(h("li", VData::new().key(*k), [*k]))),
		)
	}

	#[rstest]
	fn test_first_patch_creates_children(mut mounted: Mounted) {
		let outcome = mounted.patch_to(h(
			"div",
			VData::new().attr("id", "root"),
			[Child::from(el("span", VData::new())), Child::from("text")],
		));

		let children = mounted.children();
		assert_eq!(children.len(), 2);
		assert_eq!(mounted.dom.tag_name(children[0]).as_deref(), Some("span"));
		assert_eq!(mounted.dom.text_content(children[1]).as_deref(), Some("text"));
		assert_eq!(mounted.dom.get_attribute(mounted.root, "id").as_deref(), Some("root"));
		assert_eq!(outcome.created, vec![children[0]]);
	}

	#[rstest]
	fn test_keyed_reorder_reuses_nodes(mut mounted: Mounted) {
		mounted.patch_to(keyed_list(&["a", "b", "c"]));
		let before = mounted.children();

		let outcome = mounted.patch_to(keyed_list(&["c", "a", "b"]));

		let after = mounted.children();
		assert_eq!(after, vec![before[2], before[0], before[1]]);
		assert!(outcome.created.is_empty());
		assert!(outcome.removed.is_empty());
	}

	#[rstest]
	#[case(&["a", "b", "c", "d"], &["d", "c", "b", "a"])]
	#[case(&["a", "b", "c"], &["b", "c", "a"])]
	#[case(&["a", "b", "c", "d", "e"], &["e", "b", "d", "a", "c"])]
	fn test_keyed_permutations_keep_identity(
		mut mounted: Mounted,
		#[case] from: &[&str],
		#[case] to: &[&str],
	) {
		mounted.patch_to(keyed_list(from));
		let by_key: HashMap<&str, NodeId> = from
			.iter()
			.copied()
			.zip(mounted.children())
			.collect();

		mounted.patch_to(keyed_list(to));

		let expected: Vec<NodeId> = to.iter().map(|k| by_key[k]).collect();
		assert_eq!(mounted.children(), expected);
	}

	#[rstest]
	fn test_keyed_insert_and_remove(mut mounted: Mounted) {
		mounted.patch_to(keyed_list(&["a", "b", "c"]));
		let before = mounted.children();

		let outcome = mounted.patch_to(keyed_list(&["a", "x", "c"]));

		let after = mounted.children();
		assert_eq!(after[0], before[0]);
		assert_eq!(after[2], before[2]);
		assert_ne!(after[1], before[1]);
		assert_eq!(outcome.removed, vec![before[1]]);
		assert_eq!(outcome.created, vec![after[1]]);
	}

	#[rstest]
	fn test_identical_patch_is_mutation_free(mut mounted: Mounted) {
		let listener: Listener = Rc::new(|_: &DomEvent| {});
		let build = || {
			h(
				"div",
				VData::new()
					.attr("title", "t")
					.class("a b")
					.style("color", "red")
					.prop("value", 3)
					.listener("click", listener.clone()),
				[Child::from(keyed_list(&["a", "b"])), Child::from("tail")],
			)
		};
		mounted.patch_to(build());
		mounted.dom.reset_mutation_count();

		mounted.patch_to(build());

		assert_eq!(mounted.dom.mutation_count(), 0);
	}

	#[rstest]
	fn test_element_data_set_difference(mut mounted: Mounted) {
		mounted.patch_to(el(
			"div",
			VData::new()
				.attr("a", "1")
				.attr("b", "2")
				.class("x y")
				.style("color", "red"),
		));

		mounted.patch_to(el(
			"div",
			VData::new()
				.attr("b", "3")
				.class_toggle("x", false)
				.class("z"),
		));

		let dom = &mounted.dom;
		let root = mounted.root;
		assert_eq!(dom.get_attribute(root, "a"), None);
		assert_eq!(dom.get_attribute(root, "b").as_deref(), Some("3"));
		assert!(!dom.has_class(root, "x"));
		assert!(!dom.has_class(root, "y"));
		assert!(dom.has_class(root, "z"));
		assert_eq!(dom.style(root, "color"), None);
	}

	#[rstest]
	fn test_changed_listener_is_rebound(mut mounted: Mounted) {
		let hits = Rc::new(std::cell::RefCell::new(Vec::new()));
		let first = hits.clone();
		let second = hits.clone();

		mounted.patch_to(el("div", VData::new().on("ping", move |_| first.borrow_mut().push(1))));
		mounted.patch_to(el("div", VData::new().on("ping", move |_| second.borrow_mut().push(2))));
		mounted.dom.dispatch_event(mounted.root, DomEvent::new("ping"));

		assert_eq!(*hits.borrow(), vec![2]);
	}

	#[rstest]
	fn test_text_update_is_a_single_assignment(mut mounted: Mounted) {
		mounted.patch_to(h("div", VData::new(), ["before"]));
		let text = mounted.children()[0];
		mounted.dom.reset_mutation_count();

		mounted.patch_to(h("div", VData::new(), ["after"]));

		assert_eq!(mounted.children(), vec![text]);
		assert_eq!(mounted.dom.text_content(text).as_deref(), Some("after"));
		assert_eq!(mounted.dom.mutation_count(), 1);
	}

	#[rstest]
	fn test_unkeyed_tag_change_replaces_node(mut mounted: Mounted) {
		mounted.patch_to(h("div", VData::new(), [el("span", VData::new())]));
		let span = mounted.children()[0];

		let outcome = mounted.patch_to(h("div", VData::new(), [el("em", VData::new())]));

		let em = mounted.children()[0];
		assert_ne!(em, span);
		assert_eq!(mounted.dom.tag_name(em).as_deref(), Some("em"));
		assert_eq!(outcome.removed, vec![span]);
	}

	#[rstest]
	fn test_svg_namespace_is_inherited(mut mounted: Mounted) {
		mounted.patch_to(h(
			"div",
			VData::new(),
			[h(
				"svg",
				VData::new(),
				[
					el("circle", VData::new()),
					h("foreignObject", VData::new(), [el("p", VData::new())]),
				],
			)],
		));

		let dom = &mounted.dom;
		let svg = mounted.children()[0];
		let parts = dom.child_nodes(svg);
		let p = dom.child_nodes(parts[1])[0];
		assert_eq!(dom.namespace(svg).as_deref(), Some(SVG_NS));
		assert_eq!(dom.namespace(parts[0]).as_deref(), Some(SVG_NS));
		assert_eq!(dom.namespace(parts[1]).as_deref(), Some(SVG_NS));
		assert_eq!(dom.namespace(p), None);
	}

	#[rstest]
	fn test_slot_receives_host_content() {
		let dom = MemoryDom::new();
		let host = dom.create_element("x-card");
		let named = dom.create_element("h1");
		dom.set_attribute(named, "slot", "title");
		let loose = dom.create_text_node("body");
		dom.append_child(host, named);
		dom.append_child(host, loose);
		let content = HostContent::assign(&dom, host);

		let mut tree = h(
			"x-card",
			VData::new(),
			[
				el("slot", VData::new().attr("name", "title")),
				h("div", VData::new(), [el("slot", VData::new())]),
			],
		);
		patch(&dom, VNode::bound("x-card", host), &mut tree, Some(&content));

		let children = dom.child_nodes(host);
		assert_eq!(dom.child_nodes(children[0]), vec![named]);
		let inner_slot = dom.child_nodes(children[1])[0];
		assert_eq!(dom.child_nodes(inner_slot), vec![loose]);
	}

	#[rstest]
	fn test_root_mismatch_replaces_in_parent() {
		let dom = MemoryDom::new();
		let old_root = dom.create_element("div");
		dom.append_child(dom.body(), old_root);

		let mut next = el("section", VData::new());
		let outcome = patch(&dom, VNode::bound("div", old_root), &mut next, None);

		assert_eq!(dom.child_nodes(dom.body()), vec![next.elm().unwrap()]);
		assert_eq!(outcome.removed, vec![old_root]);
	}
}
