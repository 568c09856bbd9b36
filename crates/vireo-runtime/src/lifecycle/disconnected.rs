//! Disconnecting a host.

use vireo_core::NodeId;

use super::{listeners, load, with_host};
use crate::host::LifecycleState;
use crate::platform::Platform;

/// Tears down `elm` and drops its record. Anything still scheduled for it
/// becomes a no-op.
pub(crate) fn disconnected(plt: &Platform, elm: NodeId) {
	let Some((meta, instance, attached)) = with_host(plt, elm, |host| {
		if host.destroyed {
			return None;
		}
		host.destroyed = true;
		host.state = LifecycleState::Disconnected;
		host.vnode = None;
		host.queued_events.clear();
		Some((
			host.meta.clone(),
			host.instance.take(),
			std::mem::take(&mut host.listeners),
		))
	})
	.flatten() else {
		return;
	};

	load::release_ancestor(plt, elm);
	listeners::detach(plt, elm, attached);

	if let Some(instance) = instance
		&& meta.lifecycle.did_unload
	{
		instance.borrow_mut().did_unload();
	}
	plt.retire_host(elm);
	tracing::debug!(tag = %meta.tag_name, elm = %elm, "host disconnected");
}
