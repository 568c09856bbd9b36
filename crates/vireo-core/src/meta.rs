//! Component registry metadata.
//!
//! A [`ComponentMeta`] is the static description of one custom element tag:
//! its members, declared listeners, lifecycle hook presence, per-mode style
//! ids and owning module. Metadata is produced by the compiler, decoded from
//! [`RegistryEntry`] JSON, and shared by reference across every host of the
//! tag. It is never mutated after registration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RuntimeResult;

/// Style id key used when no mode-specific style exists.
pub const DEFAULT_STYLE_MODE: &str = "$";

/// Declared value type of a prop member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
	/// Presence-based boolean.
	Boolean,
	/// Decimal number.
	Number,
	/// Raw string.
	String,
	/// Untyped; attribute values pass through as strings.
	#[default]
	Any,
}

/// How a member is exposed by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberKind {
	/// Externally settable, read-only from inside the component.
	Prop,
	/// Externally settable and writable from inside the component.
	PropState,
	/// Internal reactive state.
	State,
	/// Method exposed on the host element.
	Method,
	/// The host element itself.
	Element,
	/// Value injected from the platform globals.
	Global,
}

impl MemberKind {
	/// Members that are proxied onto the host element.
	pub fn is_prop(self) -> bool {
		matches!(self, MemberKind::Prop | MemberKind::PropState)
	}

	/// Members the component may write to.
	pub fn is_writable_from_instance(self) -> bool {
		matches!(self, MemberKind::PropState | MemberKind::State)
	}
}

/// One declared member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberMeta {
	pub name: String,
	pub kind: MemberKind,
	#[serde(default, rename = "type")]
	pub prop_type: PropType,
	/// Observed attribute; props default to the dash-cased member name.
	#[serde(default, rename = "attr")]
	pub attr_name: Option<String>,
	/// Global registry key for [`MemberKind::Global`] members.
	#[serde(default)]
	pub ctrl_id: Option<String>,
}

impl MemberMeta {
	fn new(name: impl Into<String>, kind: MemberKind) -> Self {
		Self {
			name: name.into(),
			kind,
			prop_type: PropType::Any,
			attr_name: None,
			ctrl_id: None,
		}
	}

	pub fn prop(name: impl Into<String>, prop_type: PropType) -> Self {
		Self::new(name, MemberKind::Prop).with_type(prop_type)
	}

	pub fn prop_state(name: impl Into<String>, prop_type: PropType) -> Self {
		Self::new(name, MemberKind::PropState).with_type(prop_type)
	}

	pub fn state(name: impl Into<String>) -> Self {
		Self::new(name, MemberKind::State)
	}

	pub fn method(name: impl Into<String>) -> Self {
		Self::new(name, MemberKind::Method)
	}

	pub fn element(name: impl Into<String>) -> Self {
		Self::new(name, MemberKind::Element)
	}

	pub fn global(name: impl Into<String>, ctrl_id: impl Into<String>) -> Self {
		let mut member = Self::new(name, MemberKind::Global);
		member.ctrl_id = Some(ctrl_id.into());
		member
	}

	pub fn with_type(mut self, prop_type: PropType) -> Self {
		self.prop_type = prop_type;
		self
	}

	/// Overrides the observed attribute name.
	pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
		self.attr_name = Some(attr.into());
		self
	}
}

/// A declared event listener on the host element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenMeta {
	#[serde(rename = "event")]
	pub event_name: String,
	#[serde(rename = "method")]
	pub handler: String,
	#[serde(default)]
	pub capture: bool,
	#[serde(default)]
	pub passive: bool,
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
}

fn enabled_by_default() -> bool {
	true
}

impl ListenMeta {
	pub fn new(event_name: impl Into<String>, handler: impl Into<String>) -> Self {
		Self {
			event_name: event_name.into(),
			handler: handler.into(),
			capture: false,
			passive: false,
			enabled: true,
		}
	}

	/// Declares the listener disabled until explicitly enabled.
	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}
}

/// Which optional lifecycle hooks the component implements.
///
/// Hooks whose flag is unset are never invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecycleFlags {
	pub will_load: bool,
	pub did_load: bool,
	pub will_update: bool,
	pub did_update: bool,
	pub did_unload: bool,
	pub host_data: bool,
}

impl LifecycleFlags {
	/// Every hook enabled.
	pub const fn all() -> Self {
		Self {
			will_load: true,
			did_load: true,
			will_update: true,
			did_update: true,
			did_unload: true,
			host_data: true,
		}
	}
}

/// Whether the component renders `<slot>` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotMeta {
	/// Light DOM children are left in place.
	#[default]
	NoSlots,
	/// Light DOM children are assigned to slots at connect time.
	HasSlots,
}

/// Registry wire shape, as emitted by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
	pub tag: String,
	pub module_id: String,
	#[serde(default)]
	pub style_ids: BTreeMap<String, String>,
	#[serde(default)]
	pub members: Vec<MemberMeta>,
	#[serde(default)]
	pub listeners: Vec<ListenMeta>,
	#[serde(default)]
	pub lifecycle: LifecycleFlags,
	#[serde(default)]
	pub slots: SlotMeta,
}

impl RegistryEntry {
	/// Decodes a JSON array of entries.
	pub fn parse_list(json: &str) -> RuntimeResult<Vec<RegistryEntry>> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Static description of a component, shared by every host of its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMeta {
	/// Lower-cased tag name.
	pub tag_name: String,
	pub module_id: String,
	pub members: Vec<MemberMeta>,
	pub listeners: Vec<ListenMeta>,
	pub lifecycle: LifecycleFlags,
	pub style_ids: BTreeMap<String, String>,
	pub slots: SlotMeta,
}

impl ComponentMeta {
	/// Creates metadata with every lifecycle hook enabled and no members.
	pub fn new(tag_name: impl Into<String>, module_id: impl Into<String>) -> Self {
		Self {
			tag_name: tag_name.into().to_ascii_lowercase(),
			module_id: module_id.into(),
			members: Vec::new(),
			listeners: Vec::new(),
			lifecycle: LifecycleFlags::all(),
			style_ids: BTreeMap::new(),
			slots: SlotMeta::NoSlots,
		}
	}

	pub fn with_member(mut self, member: MemberMeta) -> Self {
		self.members.push(normalize_member(member));
		self
	}

	pub fn with_listener(mut self, listener: ListenMeta) -> Self {
		self.listeners.push(listener);
		self
	}

	pub fn with_lifecycle(mut self, lifecycle: LifecycleFlags) -> Self {
		self.lifecycle = lifecycle;
		self
	}

	/// Registers a style id for `mode`; use [`DEFAULT_STYLE_MODE`] for the fallback.
	pub fn with_style(mut self, mode: impl Into<String>, style_id: impl Into<String>) -> Self {
		self.style_ids.insert(mode.into(), style_id.into());
		self
	}

	pub fn with_slots(mut self) -> Self {
		self.slots = SlotMeta::HasSlots;
		self
	}

	/// Registry key for this component.
	pub fn registry_key(&self) -> String {
		self.tag_name.to_ascii_uppercase()
	}

	pub fn member(&self, name: &str) -> Option<&MemberMeta> {
		self.members.iter().find(|m| m.name == name)
	}

	/// The prop member observing `attr`.
	pub fn member_for_attribute(&self, attr: &str) -> Option<&MemberMeta> {
		self.members
			.iter()
			.find(|m| m.kind.is_prop() && m.attr_name.as_deref() == Some(attr))
	}

	/// Attributes whose changes are routed to props.
	pub fn observed_attributes(&self) -> Vec<String> {
		self.members
			.iter()
			.filter(|m| m.kind.is_prop())
			.filter_map(|m| m.attr_name.clone())
			.collect()
	}

	/// Resolves the style id for `mode`, falling back to the mode-independent one.
	pub fn style_id(&self, mode: &str) -> Option<&str> {
		self.style_ids
			.get(mode)
			.or_else(|| self.style_ids.get(DEFAULT_STYLE_MODE))
			.map(String::as_str)
	}
}

impl From<RegistryEntry> for ComponentMeta {
	fn from(entry: RegistryEntry) -> Self {
		Self {
			tag_name: entry.tag.to_ascii_lowercase(),
			module_id: entry.module_id,
			members: entry.members.into_iter().map(normalize_member).collect(),
			listeners: entry.listeners,
			lifecycle: entry.lifecycle,
			style_ids: entry.style_ids,
			slots: entry.slots,
		}
	}
}

fn normalize_member(mut member: MemberMeta) -> MemberMeta {
	if member.kind.is_prop() && member.attr_name.is_none() {
		member.attr_name = Some(to_dash_case(&member.name));
	}
	member
}

/// Converts a camelCase member name to its attribute form.
pub fn to_dash_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len() + 4);
	for (i, c) in name.chars().enumerate() {
		if c.is_ascii_uppercase() {
			if i > 0 {
				out.push('-');
			}
			out.push(c.to_ascii_lowercase());
		} else {
			out.push(c);
		}
	}
	out
}
