//! Shared harness for the runtime integration tests.
//!
//! [`Recorder`] is a component that records every hook it runs into a shared
//! log, so tests can assert lifecycle ordering across hosts.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vireo_core::{
	ComponentMeta, Deferred, ErrorKind, ListenMeta, ManualClock, MemberMeta, NodeId, PropType,
	RuntimeConfig, Value,
};
use vireo_runtime::vdom::{VData, VNode, h};
use vireo_runtime::{
	AccessorTable, Component, ComponentDefinition, DomApi, MemoryDom, ModuleImports, NodeKind,
	Platform, WillLoad,
};

pub type Log = Rc<RefCell<Vec<String>>>;

/// What a [`Recorder`] does besides logging.
#[derive(Clone, Default)]
pub struct Behavior {
	/// Child tags rendered inside the recorder's `<div>`.
	pub children: Vec<&'static str>,
	/// Returned from `will_load`.
	pub will_load: Option<Deferred>,
	/// Makes `render` fail while set.
	pub fail_render: Rc<Cell<bool>>,
	pub fail_handler: bool,
}

pub struct Recorder {
	pub name: String,
	pub log: Log,
	pub behavior: Behavior,
	pub count: f64,
	pub label: String,
	pub open: bool,
	pub clicks: f64,
	pub host: Value,
	pub config: Value,
}

impl Recorder {
	fn record(&self, event: &str) {
		self.log.borrow_mut().push(format!("{}:{}", self.name, event));
	}
}

impl Component for Recorder {
	fn accessors() -> AccessorTable<Self> {
		AccessorTable::<Self>::new()
			.field(
				"count",
				|p| Value::Number(p.count),
				|p, v| p.count = v.as_f64().unwrap_or(f64::NAN),
			)
			.field(
				"label",
				|p| Value::from(p.label.as_str()),
				|p, v| p.label = v.to_text(),
			)
			.field("open", |p| Value::Bool(p.open), |p, v| p.open = v.is_truthy())
			.field(
				"clicks",
				|p| Value::Number(p.clicks),
				|p, v| p.clicks = v.as_f64().unwrap_or_default(),
			)
			.field("host", |p| p.host.clone(), |p, v| p.host = v)
			.field("config", |p| p.config.clone(), |p, v| p.config = v)
			.will_change("count", |p, new, old| {
				p.record(&format!("will_change {} -> {}", old.to_text(), new.to_text()))
			})
			.did_change("count", |p, new, _| {
				p.record(&format!("did_change {}", new.to_text()))
			})
			.method("increment", |p, args| {
				p.clicks += args.first().and_then(Value::as_f64).unwrap_or(1.0);
				Ok(Value::Number(p.clicks))
			})
			.method("toggle", |p, _| {
				p.open = !p.open;
				Ok(Value::Bool(p.open))
			})
			.method("bump", |p, _| {
				p.count += 1.0;
				Ok(Value::Number(p.count))
			})
			.handler("onToggle", |p, _| {
				p.open = !p.open;
				Ok(())
			})
			.handler("onPing", |p, ev| {
				if p.behavior.fail_handler {
					anyhow::bail!("handler failed");
				}
				p.record(&format!("ping {}", ev.detail.to_text()));
				Ok(())
			})
	}

	fn render(&self) -> anyhow::Result<Option<VNode>> {
		self.record("render");
		if self.behavior.fail_render.get() {
			anyhow::bail!("render failed");
		}
		let label = h(
			"span",
			VData::new(),
			[format!("{}:{}", self.label, Value::Number(self.count).to_text())],
		);
		let children = self
			.behavior
			.children
			.iter()
			.map(|tag| h(tag, VData::new(), std::iter::empty::<VNode>()));
		Ok(Some(h(
			"div",
			VData::new(),
			std::iter::once(label).chain(children),
		)))
	}

	fn host_data(&self) -> Option<VData> {
		Some(VData::new().class_toggle("open", self.open))
	}

	fn will_load(&mut self) -> anyhow::Result<WillLoad> {
		self.record("will_load");
		Ok(match &self.behavior.will_load {
			Some(signal) => WillLoad::Deferred(signal.clone()),
			None => WillLoad::Ready,
		})
	}

	fn did_load(&mut self) -> anyhow::Result<()> {
		self.record("did_load");
		Ok(())
	}

	fn will_update(&mut self) -> anyhow::Result<()> {
		self.record("will_update");
		Ok(())
	}

	fn did_update(&mut self) -> anyhow::Result<()> {
		self.record("did_update");
		Ok(())
	}

	fn did_unload(&mut self) {
		self.record("did_unload");
	}
}

/// Metadata matching [`Recorder`]'s accessors.
pub fn recorder_meta(tag: &str, module_id: &str) -> ComponentMeta {
	ComponentMeta::new(tag, module_id)
		.with_member(MemberMeta::prop("count", PropType::Number))
		.with_member(MemberMeta::prop("label", PropType::String))
		.with_member(MemberMeta::prop_state("open", PropType::Boolean))
		.with_member(MemberMeta::state("clicks"))
		.with_member(MemberMeta::method("increment"))
		.with_member(MemberMeta::method("toggle"))
		.with_member(MemberMeta::method("bump"))
		.with_member(MemberMeta::element("host"))
		.with_member(MemberMeta::global("config", "appConfig"))
		.with_listener(ListenMeta::new("ping", "onPing"))
		.with_listener(ListenMeta::new("toggle", "onToggle"))
}

pub struct Harness {
	pub dom: Rc<MemoryDom>,
	pub clock: Rc<ManualClock>,
	pub plt: Rc<Platform>,
	pub log: Log,
	pub errors: Rc<RefCell<Vec<(ErrorKind, String, NodeId)>>>,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_config(RuntimeConfig::default())
	}

	pub fn with_config(config: RuntimeConfig) -> Self {
		Self::on_dom(Rc::new(MemoryDom::new()), config)
	}

	/// A fresh platform over an existing document.
	pub fn on_dom(dom: Rc<MemoryDom>, config: RuntimeConfig) -> Self {
		let clock = Rc::new(ManualClock::new());
		let plt = Platform::with_clock(dom.clone(), config, clock.clone());
		let errors = Rc::new(RefCell::new(Vec::new()));
		let sink = errors.clone();
		plt.on_error(move |kind, error, elm| {
			sink.borrow_mut().push((kind, error.to_string(), elm));
		});
		Self {
			dom,
			clock,
			plt,
			log: Rc::new(RefCell::new(Vec::new())),
			errors,
		}
	}

	/// Registers a recorder tag served by `module_id`.
	pub fn register(&self, tag: &str, module_id: &str) {
		self.plt.register_component(recorder_meta(tag, module_id));
	}

	/// Announces `module_id` carrying recorders for `tags`, all with `behavior`.
	pub fn announce(&self, module_id: &str, tags: &[&'static str], behavior: Behavior) {
		let log = self.log.clone();
		self.plt.announce(
			module_id,
			move |imports: &mut ModuleImports| {
				for tag in tags {
					imports.define(recorder_definition(tag, log.clone(), behavior.clone()));
				}
			},
			tags,
		);
	}

	/// Creates `<tag>` and appends it to `parent` without connecting it.
	pub fn create(&self, parent: NodeId, tag: &str) -> NodeId {
		let elm = self.dom.create_element(tag);
		self.dom.append_child(parent, elm);
		elm
	}

	/// Creates, appends and connects `<tag>`.
	pub fn mount(&self, parent: NodeId, tag: &str) -> NodeId {
		let elm = self.create(parent, tag);
		self.plt.connected_callback(elm);
		elm
	}

	pub fn run(&self) {
		self.plt.run_until_idle();
	}

	pub fn take_log(&self) -> Vec<String> {
		std::mem::take(&mut *self.log.borrow_mut())
	}

	pub fn log_contains(&self, entry: &str) -> bool {
		self.log.borrow().iter().any(|e| e == entry)
	}

	pub fn count(&self, entry: &str) -> usize {
		self.log.borrow().iter().filter(|e| *e == entry).count()
	}

	/// Concatenated text under `node`.
	pub fn text(&self, node: NodeId) -> String {
		match self.dom.node_kind(node) {
			NodeKind::Element => self
				.dom
				.child_nodes(node)
				.into_iter()
				.map(|child| self.text(child))
				.collect(),
			NodeKind::Text => self.dom.text_content(node).unwrap_or_default(),
			NodeKind::Comment => String::new(),
		}
	}

	pub fn scripts(&self) -> Vec<String> {
		self.dom
			.elements_by_tag_name(self.dom.head(), "script")
			.into_iter()
			.filter_map(|s| self.dom.get_attribute(s, "src"))
			.collect()
	}
}

pub fn recorder_definition(tag: &str, log: Log, behavior: Behavior) -> ComponentDefinition {
	let name = tag.to_string();
	ComponentDefinition::with_factory::<Recorder>(tag, move || {
		Ok(Recorder {
			name: name.clone(),
			log: log.clone(),
			behavior: behavior.clone(),
			count: 0.0,
			label: String::new(),
			open: false,
			clicks: 0.0,
			host: Value::Undefined,
			config: Value::Undefined,
		})
	})
}
