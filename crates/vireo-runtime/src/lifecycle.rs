//! Host element lifecycle.
//!
//! Every host moves through
//!
//! ```text
//! Unconnected -> Connecting -> AwaitingModule -> Instantiating
//!             -> Rendering -> AwaitingChildren -> Loaded
//! ```
//!
//! and may drop to `Disconnected` from any non-terminal state. A
//! disconnect drops the host's record, so work still queued for it finds
//! nothing to run on.
//!
//! A host only loads once every host below it that was still loading when
//! it connected has loaded, which gives bottom-up `did_load` ordering across
//! a tree whose modules arrive in any order.
//!
//! The functions here take the [`Platform`] explicitly and are reached
//! through the element class installed for each tag.

mod connected;
mod disconnected;
mod listeners;
mod load;
mod proxy;
mod render;
mod update;

pub use render::RenderPhase;

pub(crate) use connected::connected;
pub(crate) use disconnected::disconnected;
pub(crate) use listeners::set_listener_enabled;
pub(crate) use load::init_load;
pub(crate) use proxy::{WriteOrigin, attribute_changed, call_method, get_member, set_member};
pub(crate) use render::render_reporting;
pub(crate) use update::{child_list_changed, queue_update};

use vireo_core::NodeId;

use crate::host::{HostElement, LifecycleState};
use crate::platform::Platform;

/// Runs `f` on the record of `elm`.
///
/// The host map stays borrowed while `f` runs, so `f` must not call into
/// user code or back into the platform.
fn with_host<R>(plt: &Platform, elm: NodeId, f: impl FnOnce(&mut HostElement) -> R) -> Option<R> {
	plt.hosts.borrow_mut().get_mut(&elm).map(f)
}

fn set_state(plt: &Platform, elm: NodeId, state: LifecycleState) {
	with_host(plt, elm, |host| {
		tracing::trace!(elm = %elm, from = %host.state, to = %state, "lifecycle transition");
		host.state = state;
	});
}
