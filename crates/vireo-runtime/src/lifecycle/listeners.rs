//! Declared host listeners.
//!
//! Declared listeners are bound when the host connects, long before the
//! module may have arrived. Events seen before the instance exists are kept
//! on the host and replayed right after instantiation.

use std::rc::Rc;

use vireo_core::{ComponentMeta, ErrorKind, ListenMeta, NodeId, RuntimeError, RuntimeResult};

use super::{proxy, with_host};
use crate::component::InstanceRef;
use crate::dom::{DomEvent, Listener, ListenerOptions};
use crate::host::{AttachedListener, QueuedEvent};
use crate::platform::Platform;

pub(crate) fn attach_declared(plt: &Platform, elm: NodeId, meta: &ComponentMeta) {
	for listen in meta.listeners.iter().filter(|l| l.enabled) {
		attach(plt, elm, listen);
	}
}

fn attach(plt: &Platform, elm: NodeId, listen: &ListenMeta) {
	let weak = plt.weak();
	let handler = listen.handler.clone();
	let listener: Listener = Rc::new(move |event: &DomEvent| {
		if let Some(plt) = weak.upgrade() {
			deliver(&plt, elm, &handler, event);
		}
	});
	let options = ListenerOptions {
		capture: listen.capture,
		passive: listen.passive,
	};

	plt.dom()
		.add_event_listener(elm, &listen.event_name, listener.clone(), options);
	with_host(plt, elm, |host| {
		host.listeners.push(AttachedListener {
			event: listen.event_name.clone(),
			listener,
		})
	});
}

pub(crate) fn detach(plt: &Platform, elm: NodeId, attached: Vec<AttachedListener>) {
	for bound in attached {
		plt.dom()
			.remove_event_listener(elm, &bound.event, &bound.listener);
	}
}

fn deliver(plt: &Platform, elm: NodeId, handler: &str, event: &DomEvent) {
	let instance = with_host(plt, elm, |host| {
		if host.destroyed {
			return None;
		}
		if host.instance.is_none() {
			host.queued_events.push(QueuedEvent {
				handler: handler.to_string(),
				event: event.clone(),
			});
		}
		host.instance.clone()
	})
	.flatten();

	if let Some(instance) = instance {
		invoke(plt, elm, &instance, handler, event, ErrorKind::Listener);
	}
}

/// Replays events that arrived before `instance` existed.
pub(crate) fn replay_queued(plt: &Platform, elm: NodeId, instance: &InstanceRef) {
	let queued = with_host(plt, elm, |host| std::mem::take(&mut host.queued_events)).unwrap_or_default();
	if !queued.is_empty() {
		tracing::debug!(elm = %elm, count = queued.len(), "replaying queued events");
	}
	for QueuedEvent { handler, event } in queued {
		invoke(plt, elm, instance, &handler, &event, ErrorKind::QueueEvents);
	}
}

fn invoke(
	plt: &Platform,
	elm: NodeId,
	instance: &InstanceRef,
	handler: &str,
	event: &DomEvent,
	kind: ErrorKind,
) {
	let Some(meta) = with_host(plt, elm, |host| host.meta.clone()) else {
		return;
	};
	let (result, writes) =
		proxy::track_writes(plt, elm, &meta, instance, |obj| obj.handle(handler, event));
	if let Err(error) = writes {
		plt.report(kind, &anyhow::Error::from(error), elm);
	}
	match result {
		Some(Ok(())) => {}
		Some(Err(error)) => plt.report(kind, &error, elm),
		None => tracing::warn!(elm = %elm, handler, "declared listener has no handler"),
	}
}

/// Binds or unbinds the declared listener for `event_name` on `elm`.
pub(crate) fn set_listener_enabled(
	plt: &Platform,
	elm: NodeId,
	event_name: &str,
	enabled: bool,
) -> RuntimeResult<()> {
	let (meta, bound) = with_host(plt, elm, |host| {
		let bound = host.listeners.iter().any(|l| l.event == event_name);
		(host.meta.clone(), bound)
	})
	.ok_or(RuntimeError::NotAHost(elm))?;
	let listen = meta
		.listeners
		.iter()
		.find(|l| l.event_name == event_name)
		.ok_or_else(|| RuntimeError::UnknownMember {
			tag: meta.tag_name.clone(),
			member: event_name.to_string(),
		})?;

	match (enabled, bound) {
		(true, false) => attach(plt, elm, listen),
		(false, true) => {
			let removed = with_host(plt, elm, |host| {
				let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut host.listeners)
					.into_iter()
					.partition(|l| l.event == event_name);
				host.listeners = kept;
				removed
			})
			.unwrap_or_default();
			detach(plt, elm, removed);
		}
		_ => {}
	}
	tracing::debug!(elm = %elm, event_name, enabled, "listener toggled");
	Ok(())
}
