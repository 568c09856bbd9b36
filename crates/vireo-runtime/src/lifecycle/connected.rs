//! Connecting a host to the document.

use std::rc::Rc;

use vireo_core::{ComponentMeta, NodeId, SlotMeta};

use super::{listeners, set_state, update, with_host};
use crate::host::{Ancestor, HostElement, LifecycleState};
use crate::platform::Platform;
use crate::ssr::SSR_VNODE_ID;
use crate::vdom::HostContent;

/// Starts the lifecycle of `elm`. Hosts connect once; later calls are ignored.
pub(crate) fn connected(plt: &Platform, elm: NodeId, meta: &Rc<ComponentMeta>) {
	if plt.hosts.borrow().contains_key(&elm) || plt.is_retired(elm) {
		return;
	}
	let dom = plt.dom();

	let mode = dom
		.get_attribute(elm, "mode")
		.unwrap_or_else(|| plt.config().default_mode.clone());
	let mut host = HostElement::new(meta.clone(), mode.clone());
	host.ssr = dom.has_attribute(elm, SSR_VNODE_ID);
	if meta.slots == SlotMeta::HasSlots {
		host.host_content = Some(if host.ssr {
			HostContent::from_rendered_slots(dom, elm, SSR_VNODE_ID)
		} else {
			HostContent::assign(dom, elm)
		});
	}
	host.ancestor = find_ancestor(plt, elm);
	let ancestor = host.ancestor;
	plt.hosts.borrow_mut().insert(elm, host);

	match ancestor {
		Some(Ancestor::Host(parent)) => {
			with_host(plt, parent, |h| h.loading_children.push(elm));
		}
		Some(Ancestor::App) => plt.app_child_loading(elm),
		None => {}
	}

	listeners::attach_declared(plt, elm, meta);

	tracing::debug!(tag = %meta.tag_name, elm = %elm, %mode, ?ancestor, "host connected");
	set_state(plt, elm, LifecycleState::AwaitingModule);
	plt.load_bundle(meta, elm, move |plt| update::queue_update(plt, elm));
}

/// Nearest host above `elm` that is still loading, else the app itself.
///
/// Returns `None` for elements outside the document.
fn find_ancestor(plt: &Platform, elm: NodeId) -> Option<Ancestor> {
	let dom = plt.dom();
	let root = dom.document_element();
	let hosts = plt.hosts.borrow();

	let mut current = dom.parent_node(elm);
	while let Some(node) = current {
		if node == root {
			return Some(Ancestor::App);
		}
		if hosts.get(&node).is_some_and(HostElement::is_pending) {
			return Some(Ancestor::Host(node));
		}
		current = dom.parent_node(node);
	}
	None
}
