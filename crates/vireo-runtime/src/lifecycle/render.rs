//! Render passes.

use vireo_core::{ComponentMeta, ErrorKind, NodeId};

use super::{update, with_host};
use crate::component::InstanceRef;
use crate::platform::Platform;
use crate::ssr;
use crate::vdom::{VData, VNode, h, patch};

/// Phase of the render pass in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPhase {
	#[default]
	Idle,
	/// Building the new tree; user code runs here.
	Diffing,
	/// Applying the new tree to the document.
	Patching,
}

/// Renders `elm` and reports a failed render through the error handler.
pub(crate) fn render_reporting(plt: &Platform, elm: NodeId, is_update: bool) {
	if let Err(error) = render(plt, elm, is_update) {
		plt.report(ErrorKind::Render, &error, elm);
	}
}

/// Builds the new tree of `elm` and patches it in.
///
/// The tree is built in full before anything is patched, so a failing
/// `render` leaves the document as it was.
fn render(plt: &Platform, elm: NodeId, is_update: bool) -> anyhow::Result<()> {
	if plt.render_phase.get() == RenderPhase::Patching {
		tracing::debug!(elm = %elm, "render requested while patching; scheduling it");
		update::queue_update(plt, elm);
		return Ok(());
	}
	let Some((meta, instance, ssr)) = with_host(plt, elm, |host| {
		if host.destroyed {
			return None;
		}
		Some((host.meta.clone(), host.instance.clone()?, host.ssr))
	})
	.flatten() else {
		return Ok(());
	};

	plt.render_phase.set(RenderPhase::Diffing);
	let built = build_host_vnode(&instance, &meta);
	plt.render_phase.set(RenderPhase::Idle);
	let mut vnode = built?;

	let dom = plt.dom();
	let (previous, content) =
		with_host(plt, elm, |host| (host.vnode.take(), host.host_content.clone())).unwrap_or_default();
	let old = match previous {
		Some(old) => old,
		None if ssr && !is_update => ssr::vnode_from_ssr(dom, elm, &plt.config().hydrated_class),
		None => VNode::bound(meta.tag_name.as_str(), elm),
	};

	plt.render_phase.set(RenderPhase::Patching);
	let outcome = patch(dom, old, &mut vnode, content.as_ref());
	plt.render_phase.set(RenderPhase::Idle);

	with_host(plt, elm, |host| host.vnode = Some(vnode));
	tracing::debug!(
		tag = %meta.tag_name,
		elm = %elm,
		created = outcome.created.len(),
		removed = outcome.removed.len(),
		"rendered"
	);

	for root in outcome.removed {
		plt.disconnect_tree(root);
	}
	for created in outcome.created {
		plt.connected_callback(created);
	}
	Ok(())
}

fn build_host_vnode(instance: &InstanceRef, meta: &ComponentMeta) -> anyhow::Result<VNode> {
	let obj = instance.borrow();
	let content = obj.render()?;
	let data = if meta.lifecycle.host_data {
		obj.host_data().unwrap_or_default()
	} else {
		VData::new()
	};
	Ok(h(&meta.tag_name, data, content))
}
