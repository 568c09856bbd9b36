//! Member interception between host, instance and scheduler.
//!
//! Props are reachable from both sides: the host (attributes and
//! [`Platform::set_prop`]) and the instance ([`Platform::set_state`]). Both
//! go through one setter that compares by identity, runs the change
//! watchers around the commit and queues a render.
//!
//! Methods and listeners write their own fields directly. Their writes are
//! found by comparing the declared members before and after the call and
//! are then committed the same way.

use vireo_core::{
	ComponentMeta, MemberKind, MemberMeta, NodeId, ReadonlyPropPolicy, RuntimeError, RuntimeResult,
	Value,
};

use super::{update, with_host};
use crate::component::{InstanceObject, InstanceRef};
use crate::host::LifecycleState;
use crate::dom::DomApi;
use crate::platform::Platform;

/// Which side of the component a member access comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOrigin {
	/// Through the host element.
	Host,
	/// From inside the component.
	Instance,
}

/// Seeds the members of a fresh instance.
///
/// Props resolve, in order, from the host attribute, a property set on the
/// host before the upgrade, and finally the instance's own value.
pub(crate) fn init_instance_properties(
	plt: &Platform,
	elm: NodeId,
	instance: &InstanceRef,
	meta: &ComponentMeta,
) {
	let dom = plt.dom();
	for member in &meta.members {
		let value = match member.kind {
			MemberKind::Prop | MemberKind::PropState => initial_prop_value(dom, elm, member),
			MemberKind::Element => Some(Value::Element(elm)),
			MemberKind::Global => Some(
				member
					.ctrl_id
					.as_deref()
					.and_then(|id| plt.global(id))
					.unwrap_or_default(),
			),
			MemberKind::State | MemberKind::Method => None,
		};
		let Some(value) = value else {
			continue;
		};
		if !instance.borrow_mut().set(&member.name, value) {
			tracing::warn!(
				tag = %meta.tag_name,
				member = %member.name,
				"declared member has no accessor"
			);
		}
	}
}

fn initial_prop_value(dom: &dyn DomApi, elm: NodeId, member: &MemberMeta) -> Option<Value> {
	let preset = dom.get_property(elm, &member.name);
	if preset.is_some() {
		dom.remove_property(elm, &member.name);
	}

	if let Some(raw) = member
		.attr_name
		.as_deref()
		.and_then(|attr| dom.get_attribute(elm, attr))
	{
		return Some(Value::parse_attribute(member.prop_type, &raw));
	}
	preset
		.filter(|value| !value.is_undefined())
		.map(|value| value.coerce(member.prop_type))
}

/// Routes an observed attribute change into its prop.
pub(crate) fn attribute_changed(
	plt: &Platform,
	elm: NodeId,
	meta: &ComponentMeta,
	name: &str,
	new: Option<&str>,
) {
	let Some(member) = meta.member_for_attribute(name) else {
		return;
	};
	let instantiated = with_host(plt, elm, |host| host.instance.is_some()).unwrap_or(false);
	if !instantiated {
		// Read from the attribute itself during instantiation.
		return;
	}
	let value = new.map_or(Value::Null, |raw| Value::parse_attribute(member.prop_type, raw));
	if let Err(error) = set_member(plt, elm, &member.name, value, WriteOrigin::Host) {
		tracing::debug!(%error, attr = name, "attribute change ignored");
	}
}

pub(crate) fn get_member(plt: &Platform, elm: NodeId, name: &str, origin: WriteOrigin) -> Value {
	let found = with_host(plt, elm, |host| {
		let proxied = host
			.meta
			.member(name)
			.is_some_and(|m| origin == WriteOrigin::Instance || m.kind.is_prop());
		(proxied, host.instance.clone())
	});

	match found {
		Some((true, Some(instance))) => instance.borrow().get(name).unwrap_or_default(),
		_ => plt.dom().get_property(elm, name).unwrap_or_default(),
	}
}

pub(crate) fn set_member(
	plt: &Platform,
	elm: NodeId,
	name: &str,
	value: Value,
	origin: WriteOrigin,
) -> RuntimeResult<()> {
	let Some((meta, instance)) = with_host(plt, elm, |host| (host.meta.clone(), host.instance.clone()))
	else {
		if origin == WriteOrigin::Host && plt.is_defined(elm) {
			plt.dom().set_property(elm, name, value);
			return Ok(());
		}
		return Err(RuntimeError::NotAHost(elm));
	};

	let member = meta.member(name);
	match origin {
		WriteOrigin::Host => {
			if !member.is_some_and(|m| m.kind.is_prop()) {
				// Not a prop: a plain property on the element.
				plt.dom().set_property(elm, name, value);
				return Ok(());
			}
		}
		WriteOrigin::Instance => {
			let Some(member) = member else {
				return Err(RuntimeError::UnknownMember {
					tag: meta.tag_name.clone(),
					member: name.to_string(),
				});
			};
			if !member.kind.is_writable_from_instance() {
				return reject_readonly(plt, &meta, name);
			}
		}
	}

	let Some(instance) = instance else {
		return match origin {
			WriteOrigin::Host => {
				plt.dom().set_property(elm, name, value);
				Ok(())
			}
			WriteOrigin::Instance => Err(RuntimeError::NotInstantiated(meta.tag_name.clone())),
		};
	};

	let old = instance.borrow().get(name).unwrap_or_default();
	if old == value {
		return Ok(());
	}
	{
		let mut obj = instance.borrow_mut();
		obj.will_change(name, &value, &old);
		obj.set(name, value.clone());
		obj.did_change(name, &value, &old);
	}
	update::queue_update(plt, elm);
	Ok(())
}

fn reject_readonly(plt: &Platform, meta: &ComponentMeta, name: &str) -> RuntimeResult<()> {
	match plt.config().readonly_prop_writes {
		ReadonlyPropPolicy::Warn => {
			tracing::warn!(
				tag = %meta.tag_name,
				member = name,
				"read-only prop written from inside the component; ignored"
			);
			Ok(())
		}
		ReadonlyPropPolicy::Error => Err(RuntimeError::ReadOnlyProp {
			tag: meta.tag_name.clone(),
			member: name.to_string(),
		}),
	}
}

pub(crate) fn call_method(plt: &Platform, elm: NodeId, name: &str, args: &[Value]) -> anyhow::Result<Value> {
	let (meta, instance) = with_host(plt, elm, |host| (host.meta.clone(), host.instance.clone()))
		.ok_or(RuntimeError::NotAHost(elm))?;
	let unknown = || RuntimeError::UnknownMember {
		tag: meta.tag_name.clone(),
		member: name.to_string(),
	};
	if !meta.member(name).is_some_and(|m| m.kind == MemberKind::Method) {
		return Err(unknown().into());
	}
	let instance = instance.ok_or_else(|| RuntimeError::NotInstantiated(meta.tag_name.clone()))?;
	let (result, writes) = track_writes(plt, elm, &meta, &instance, |obj| obj.call(name, args));
	writes?;
	result.unwrap_or_else(|| Err(unknown().into()))
}

/// Runs `f` on `instance` and commits every declared member it changed as
/// an instance write.
///
/// Changed props the component may not write are put back and handled per
/// [`ReadonlyPropPolicy`]; the first refusal is returned next to `f`'s
/// result. Changes made while the initial render is still pending are left
/// to that render.
pub(crate) fn track_writes<R>(
	plt: &Platform,
	elm: NodeId,
	meta: &ComponentMeta,
	instance: &InstanceRef,
	f: impl FnOnce(&mut dyn InstanceObject) -> R,
) -> (R, RuntimeResult<()>) {
	let tracked: Vec<&MemberMeta> = meta
		.members
		.iter()
		.filter(|m| m.kind.is_prop() || m.kind == MemberKind::State)
		.collect();
	let before: Vec<Value> = {
		let obj = instance.borrow();
		tracked
			.iter()
			.map(|m| obj.get(&m.name).unwrap_or_default())
			.collect()
	};

	let result = f(&mut *instance.borrow_mut());

	let mut outcome = Ok(());
	let mut changed = false;
	for (member, old) in tracked.into_iter().zip(before) {
		let new = instance.borrow().get(&member.name).unwrap_or_default();
		if new.is_same(&old) {
			continue;
		}
		let mut obj = instance.borrow_mut();
		obj.set(&member.name, old.clone());
		if !member.kind.is_writable_from_instance() {
			drop(obj);
			if let Err(error) = reject_readonly(plt, meta, &member.name)
				&& outcome.is_ok()
			{
				outcome = Err(error);
			}
			continue;
		}
		obj.will_change(&member.name, &new, &old);
		obj.set(&member.name, new.clone());
		obj.did_change(&member.name, &new, &old);
		changed = true;
	}

	let pending = with_host(plt, elm, |host| host.state == LifecycleState::Instantiating).unwrap_or(true);
	if changed && !pending {
		update::queue_update(plt, elm);
	}
	(result, outcome)
}
