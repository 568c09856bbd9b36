//! Per-element runtime records.
//!
//! The platform keeps one [`HostElement`] per connected custom element,
//! keyed by its [`NodeId`]. The record never owns the element itself; the
//! document does.

use std::fmt;
use std::rc::Rc;

use vireo_core::{ComponentMeta, NodeId};

use crate::component::InstanceRef;
use crate::dom::{DomEvent, Listener};
use crate::vdom::{HostContent, VNode};

/// Where a host element is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
	/// The tag is registered but the element has not been connected.
	Unconnected,
	Connecting,
	/// Waiting for the component module to be announced.
	AwaitingModule,
	/// The instance exists; `will_load` may still be pending.
	Instantiating,
	/// The initial render is running.
	Rendering,
	/// Rendered, waiting for child hosts to load.
	AwaitingChildren,
	Loaded,
	Disconnected,
}

impl fmt::Display for LifecycleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			LifecycleState::Unconnected => "unconnected",
			LifecycleState::Connecting => "connecting",
			LifecycleState::AwaitingModule => "awaiting-module",
			LifecycleState::Instantiating => "instantiating",
			LifecycleState::Rendering => "rendering",
			LifecycleState::AwaitingChildren => "awaiting-children",
			LifecycleState::Loaded => "loaded",
			LifecycleState::Disconnected => "disconnected",
		};
		f.write_str(name)
	}
}

/// Lookup-only link to whoever waits on this host's load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ancestor {
	/// The document element, i.e. the app itself.
	App,
	Host(NodeId),
}

/// A declared listener currently bound on the host.
pub(crate) struct AttachedListener {
	pub(crate) event: String,
	pub(crate) listener: Listener,
}

/// An event delivered before the instance existed.
pub(crate) struct QueuedEvent {
	pub(crate) handler: String,
	pub(crate) event: DomEvent,
}

pub(crate) struct HostElement {
	pub(crate) meta: Rc<ComponentMeta>,
	pub(crate) state: LifecycleState,
	pub(crate) mode: String,
	pub(crate) instance: Option<InstanceRef>,
	pub(crate) queued_for_update: bool,
	pub(crate) loaded: bool,
	pub(crate) destroyed: bool,
	/// Instantiation failed; the host stays unupgraded.
	pub(crate) failed: bool,
	/// Server-rendered host; the first render reuses existing children.
	pub(crate) ssr: bool,
	pub(crate) loading_children: Vec<NodeId>,
	pub(crate) ancestor: Option<Ancestor>,
	pub(crate) vnode: Option<VNode>,
	pub(crate) host_content: Option<HostContent>,
	pub(crate) queued_events: Vec<QueuedEvent>,
	pub(crate) listeners: Vec<AttachedListener>,
	pub(crate) observing: bool,
}

impl HostElement {
	pub(crate) fn new(meta: Rc<ComponentMeta>, mode: String) -> Self {
		Self {
			meta,
			state: LifecycleState::Connecting,
			mode,
			instance: None,
			queued_for_update: false,
			loaded: false,
			destroyed: false,
			failed: false,
			ssr: false,
			loading_children: Vec::new(),
			ancestor: None,
			vnode: None,
			host_content: None,
			queued_events: Vec::new(),
			listeners: Vec::new(),
			observing: false,
		}
	}

	/// Whether this host can still hold up the load of hosts below it.
	pub(crate) fn is_pending(&self) -> bool {
		!self.loaded && !self.destroyed && !self.failed
	}
}

impl fmt::Debug for HostElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HostElement")
			.field("tag", &self.meta.tag_name)
			.field("state", &self.state)
			.field("mode", &self.mode)
			.field("instantiated", &self.instance.is_some())
			.field("queued_for_update", &self.queued_for_update)
			.field("loading_children", &self.loading_children)
			.field("ancestor", &self.ancestor)
			.finish_non_exhaustive()
	}
}
