//! Rebuilding the previous tree of a server-rendered host.

use vireo_core::NodeId;

use super::markers::{SSR_CHILD_ID, SSR_VNODE_ID, is_marker};
use crate::dom::{DomApi, NodeKind};
use crate::vdom::{VNode, t};

/// Describes the existing children of `host` as the tree its first render
/// is diffed against, so matching nodes are reused.
///
/// Hosts nested inside and `<slot>` elements are described without
/// children. `ignored_class` (the hydrated class) is left out of class
/// maps so patching does not strip it.
pub(crate) fn vnode_from_ssr(dom: &dyn DomApi, host: NodeId, ignored_class: &str) -> VNode {
	let mut root = VNode::bound(dom.tag_name(host).unwrap_or_default(), host);
	root.children = rebuild_children(dom, host, ignored_class);
	root
}

fn rebuild_children(dom: &dyn DomApi, parent: NodeId, ignored_class: &str) -> Vec<VNode> {
	dom.child_nodes(parent)
		.into_iter()
		.filter_map(|child| rebuild(dom, child, ignored_class))
		.collect()
}

fn rebuild(dom: &dyn DomApi, node: NodeId, ignored_class: &str) -> Option<VNode> {
	match dom.node_kind(node) {
		NodeKind::Comment => None,
		NodeKind::Text => {
			let mut vnode = t(dom.text_content(node).unwrap_or_default());
			vnode.elm = Some(node);
			Some(vnode)
		}
		NodeKind::Element => {
			let mut vnode = VNode::bound(dom.tag_name(node)?, node);
			for (name, value) in dom.attributes(node) {
				if is_marker(&name) {
					continue;
				}
				match name.as_str() {
					"class" => {
						for class in value.split_whitespace().filter(|c| *c != ignored_class) {
							vnode.class.insert(class.to_string(), true);
						}
					}
					"style" => {
						for (property, value) in value.split(';').filter_map(|d| d.split_once(':')) {
							vnode
								.style
								.insert(property.trim().to_string(), value.trim().to_string());
						}
					}
					_ => {
						vnode.attrs.insert(name.clone(), value);
					}
				}
			}
			if dom.has_attribute(node, SSR_CHILD_ID) {
				dom.remove_attribute(node, SSR_CHILD_ID);
			}
			// Nested hosts render their own content and slot children belong
			// to the host's light DOM.
			if !dom.has_attribute(node, SSR_VNODE_ID) && vnode.tag.as_deref() != Some("slot") {
				vnode.children = rebuild_children(dom, node, ignored_class);
			}
			Some(vnode)
		}
	}
}
