//! Load completion and ancestor notification.

use vireo_core::{ErrorKind, NodeId};

use super::{proxy, set_state, with_host};
use crate::host::{Ancestor, LifecycleState};
use crate::platform::Platform;

/// Completes the load of `elm` once it has rendered and nothing below it is
/// still loading.
pub(crate) fn init_load(plt: &Platform, elm: NodeId) {
	let ready = with_host(plt, elm, |host| {
		let ready = host.state == LifecycleState::AwaitingChildren
			&& host.instance.is_some()
			&& !host.destroyed
			&& host.loading_children.is_empty();
		if ready {
			host.loaded = true;
		}
		ready.then(|| (host.meta.clone(), host.instance.clone()))
	})
	.flatten();
	let Some((meta, Some(instance))) = ready else {
		return;
	};
	set_state(plt, elm, LifecycleState::Loaded);

	if meta.lifecycle.did_load {
		let (result, writes) = proxy::track_writes(plt, elm, &meta, &instance, |obj| obj.did_load());
		if let Err(error) = result.and(writes.map_err(anyhow::Error::from)) {
			plt.report(ErrorKind::DidLoad, &error, elm);
		}
	}

	plt.dom().add_class(elm, &plt.config().hydrated_class);
	tracing::debug!(tag = %meta.tag_name, elm = %elm, "host loaded");

	release_ancestor(plt, elm);
}

/// Drops `elm` from the list its ancestor waits on and re-checks the ancestor.
pub(crate) fn release_ancestor(plt: &Platform, elm: NodeId) {
	let ancestor = with_host(plt, elm, |host| host.ancestor.take()).flatten();
	match ancestor {
		Some(Ancestor::Host(parent)) => {
			let settled = with_host(plt, parent, |host| {
				host.loading_children.retain(|child| *child != elm);
				host.loading_children.is_empty()
			})
			.unwrap_or(false);
			if settled {
				init_load(plt, parent);
			}
		}
		Some(Ancestor::App) => plt.app_child_resolved(elm),
		None => {}
	}
}

/// A host whose instance could not be created stops holding up its ancestor.
pub(crate) fn release_failed(plt: &Platform, elm: NodeId) {
	with_host(plt, elm, |host| host.failed = true);
	release_ancestor(plt, elm);
}
