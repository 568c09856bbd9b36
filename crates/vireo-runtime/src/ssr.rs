//! Server-side pre-rendering.
//!
//! After a document has been rendered on the server, [`prerender`] marks
//! each loaded host with an SSR id and each element it rendered with a
//! child id, then serialises the markup. On the client, a host carrying
//! the SSR id skips slot assignment and diffs its first render against the
//! nodes already present.

mod hydrate;
mod markers;
mod serialize;

pub use markers::{SSR_CHILD_ID, SSR_VNODE_ID, is_marker};
pub use serialize::{html_escape, to_html};

pub(crate) use hydrate::vnode_from_ssr;

use vireo_core::NodeId;

use crate::dom::{DomApi, NodeKind};
use crate::platform::Platform;

/// Stamps the loaded hosts under `root` in document order and returns the
/// serialised subtree.
pub(crate) fn prerender(plt: &Platform, root: NodeId) -> String {
	let dom = plt.dom();
	let mut next_id = 0;
	let mut stack = vec![root];

	while let Some(node) = stack.pop() {
		if dom.node_kind(node) != NodeKind::Element {
			continue;
		}
		if plt.is_loaded(node) {
			stamp_host(plt, dom, node, next_id);
			next_id += 1;
		}
		stack.extend(dom.child_nodes(node).into_iter().rev());
	}

	tracing::debug!(hosts = next_id, "prerendered");
	to_html(dom, root)
}

fn stamp_host(plt: &Platform, dom: &dyn DomApi, host: NodeId, id: usize) {
	dom.set_attribute(host, SSR_VNODE_ID, &id.to_string());

	let rendered: Vec<NodeId> = plt
		.hosts
		.borrow()
		.get(&host)
		.and_then(|h| h.vnode.as_ref())
		.map(|vnode| vnode.children().iter().filter_map(|c| c.elm()).collect())
		.unwrap_or_default();
	for (index, child) in rendered.into_iter().enumerate() {
		if dom.node_kind(child) == NodeKind::Element {
			dom.set_attribute(child, SSR_CHILD_ID, &markers::child_id(id, index));
		}
	}
}
