//! Update scheduling and instantiation.

use std::rc::Rc;

use vireo_core::{ComponentMeta, ErrorKind, NodeId, Priority, RuntimeError};

use super::{listeners, load, proxy, render, set_state, with_host};
use crate::component::{InstanceRef, WillLoad};
use crate::host::LifecycleState;
use crate::platform::Platform;

/// Schedules one render of `elm`. Repeated calls before it runs are ignored.
pub(crate) fn queue_update(plt: &Platform, elm: NodeId) {
	let schedule = with_host(plt, elm, |host| {
		if host.queued_for_update || host.destroyed {
			false
		} else {
			host.queued_for_update = true;
			true
		}
	})
	.unwrap_or(false);

	if schedule {
		plt.queue.enqueue(
			move |plt: &Platform| {
				with_host(plt, elm, |host| host.queued_for_update = false);
				update(plt, elm);
			},
			Priority::Medium,
		);
	}
}

/// Re-renders `elm` after its light DOM changed, unless it is rendering.
pub(crate) fn child_list_changed(plt: &Platform, elm: NodeId) {
	let observing = with_host(plt, elm, |host| {
		host.observing && !host.destroyed && host.instance.is_some()
	})
	.unwrap_or(false);
	if observing {
		queue_update(plt, elm);
	}
}

fn update(plt: &Platform, elm: NodeId) {
	let Some((destroyed, state, instance, meta)) = with_host(plt, elm, |host| {
		(host.destroyed, host.state, host.instance.clone(), host.meta.clone())
	}) else {
		return;
	};
	if destroyed {
		return;
	}

	let Some(instance) = instance else {
		set_state(plt, elm, LifecycleState::Instantiating);
		match init_component_instance(plt, elm, &meta) {
			Ok(WillLoad::Ready) => post_will_update(plt, elm, true),
			Ok(WillLoad::Deferred(signal)) => {
				tracing::debug!(tag = %meta.tag_name, elm = %elm, "waiting on will_load");
				let weak = plt.weak();
				signal.on_settled(move || {
					if let Some(plt) = weak.upgrade() {
						plt.queue.enqueue(
							move |plt: &Platform| post_will_update(plt, elm, true),
							Priority::High,
						);
					}
				});
			}
			Err(error) => {
				plt.report(ErrorKind::InitInstance, &error, elm);
				load::release_failed(plt, elm);
			}
		}
		return;
	};

	// The initial render is still waiting on will_load and will pick up
	// whatever changed in the meantime.
	if state == LifecycleState::Instantiating {
		return;
	}

	if meta.lifecycle.will_update {
		let result = instance.borrow_mut().will_update();
		if let Err(error) = result {
			plt.report(ErrorKind::WillUpdate, &error, elm);
		}
	}
	post_will_update(plt, elm, false);
}

fn init_component_instance(plt: &Platform, elm: NodeId, meta: &ComponentMeta) -> anyhow::Result<WillLoad> {
	let definition = plt
		.definition(&meta.tag_name)
		.ok_or_else(|| RuntimeError::UnknownComponent(meta.tag_name.clone()))?;
	let instance: InstanceRef = definition.instantiate()?;

	proxy::init_instance_properties(plt, elm, &instance, meta);
	with_host(plt, elm, |host| host.instance = Some(Rc::clone(&instance)));
	tracing::debug!(tag = %meta.tag_name, elm = %elm, "instance created");

	listeners::replay_queued(plt, elm, &instance);

	if meta.lifecycle.will_load {
		let result = instance.borrow_mut().will_load();
		match result {
			Ok(outcome) => return Ok(outcome),
			Err(error) => plt.report(ErrorKind::WillLoad, &error, elm),
		}
	}
	Ok(WillLoad::Ready)
}

fn post_will_update(plt: &Platform, elm: NodeId, initial: bool) {
	let Some((destroyed, meta, instance)) = with_host(plt, elm, |host| {
		(host.destroyed, host.meta.clone(), host.instance.clone())
	}) else {
		return;
	};
	let Some(instance) = instance.filter(|_| !destroyed) else {
		return;
	};

	if initial {
		set_state(plt, elm, LifecycleState::Rendering);
	}
	with_host(plt, elm, |host| host.observing = false);
	render::render_reporting(plt, elm, !initial);
	with_host(plt, elm, |host| host.observing = true);

	if initial {
		set_state(plt, elm, LifecycleState::AwaitingChildren);
		load::init_load(plt, elm);
	} else if meta.lifecycle.did_update {
		let result = instance.borrow_mut().did_update();
		if let Err(error) = result {
			plt.report(ErrorKind::DidUpdate, &error, elm);
		}
	}
}
