//! Lazy module and stylesheet loading.
//!
//! Component code arrives in modules fetched on demand by injecting a
//! `<script>` into the document head. A fetched module calls
//! [`Platform::announce`](crate::Platform::announce), which hands over the
//! definitions it carries and releases every host waiting on it.
//!
//! At most one request per URL is in flight. A request that errors or
//! outlives the configured timeout is forgotten so a later load retries it;
//! waiters are only ever released by an announcement.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use vireo_core::{ComponentMeta, ErrorKind, NodeId, RuntimeConfig, RuntimeError};

use crate::component::ComponentDefinition;
use crate::platform::Platform;

pub(crate) type ModuleCallback = Box<dyn FnOnce(&Platform)>;

/// URL of the script carrying `module_id`.
pub fn module_url(config: &RuntimeConfig, module_id: &str) -> String {
	format!("{}{}.js", config.public_path, module_id)
}

/// URL of the stylesheet `style_id`.
pub fn style_url(config: &RuntimeConfig, style_id: &str) -> String {
	format!("{}{}.css", config.public_path, style_id)
}

struct PendingRequest {
	requested_at: Duration,
	script: NodeId,
}

/// Loader bookkeeping owned by the platform.
#[derive(Default)]
pub(crate) struct ModuleLoader {
	loaded_modules: RefCell<HashSet<String>>,
	loaded_styles: RefCell<HashSet<String>>,
	waiters: RefCell<HashMap<String, Vec<ModuleCallback>>>,
	pending: RefCell<HashMap<String, PendingRequest>>,
}

impl ModuleLoader {
	pub(crate) fn is_module_loaded(&self, module_id: &str) -> bool {
		self.loaded_modules.borrow().contains(module_id)
	}

	pub(crate) fn is_style_loaded(&self, style_id: &str) -> bool {
		self.loaded_styles.borrow().contains(style_id)
	}

	pub(crate) fn pending_urls(&self) -> Vec<String> {
		let mut urls: Vec<_> = self.pending.borrow().keys().cloned().collect();
		urls.sort();
		urls
	}

	#[cfg(test)]
	pub(crate) fn waiter_count(&self, module_id: &str) -> usize {
		self.waiters.borrow().get(module_id).map_or(0, Vec::len)
	}
}

impl fmt::Debug for ModuleLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModuleLoader")
			.field("loaded_modules", &self.loaded_modules.borrow())
			.field("loaded_styles", &self.loaded_styles.borrow())
			.field("pending", &self.pending_urls())
			.finish_non_exhaustive()
	}
}

/// What an announced module provides.
///
/// Passed to the import function given to
/// [`Platform::announce`](crate::Platform::announce).
#[derive(Debug)]
pub struct ModuleImports {
	public_path: String,
	definitions: HashMap<String, ComponentDefinition>,
}

impl ModuleImports {
	fn new(public_path: String) -> Self {
		Self {
			public_path,
			definitions: HashMap::new(),
		}
	}

	/// URL prefix the module was loaded from.
	pub fn public_path(&self) -> &str {
		&self.public_path
	}

	/// Adds the code for one tag.
	pub fn define(&mut self, definition: ComponentDefinition) -> &mut Self {
		self.definitions
			.insert(definition.tag().to_ascii_uppercase(), definition);
		self
	}
}

/// Requests the module and stylesheet of `meta`, then runs `callback` once
/// the module has been announced.
pub(crate) fn load_bundle(plt: &Platform, meta: &ComponentMeta, mode: &str, callback: ModuleCallback) {
	load_style(plt, meta, mode);

	let loader = &plt.loader;
	if loader.is_module_loaded(&meta.module_id) {
		callback(plt);
		return;
	}

	loader
		.waiters
		.borrow_mut()
		.entry(meta.module_id.clone())
		.or_default()
		.push(callback);

	let url = module_url(plt.config(), &meta.module_id);
	if loader.pending.borrow().contains_key(&url) {
		tracing::debug!(%url, "module request already in flight");
		return;
	}

	let dom = plt.dom();
	let script = dom.create_element("script");
	dom.set_attribute(script, "src", &url);
	dom.set_attribute(script, "charset", "utf-8");
	dom.set_attribute(script, "async", "");
	dom.append_child(dom.head(), script);

	loader.pending.borrow_mut().insert(
		url.clone(),
		PendingRequest {
			requested_at: plt.now(),
			script,
		},
	);
	tracing::debug!(%url, tag = %meta.tag_name, "module requested");
}

fn load_style(plt: &Platform, meta: &ComponentMeta, mode: &str) {
	let Some(style_id) = meta.style_id(mode) else {
		return;
	};
	if !plt.loader.loaded_styles.borrow_mut().insert(style_id.to_string()) {
		return;
	}

	let dom = plt.dom();
	let href = style_url(plt.config(), style_id);
	let link = dom.create_element("link");
	dom.set_attribute(link, "rel", "stylesheet");
	dom.set_attribute(link, "href", &href);
	let head = dom.head();
	let first = dom.first_child(head);
	dom.insert_before(head, link, first);
	tracing::debug!(%href, "stylesheet requested");
}

/// Handles the completion signal of a module script.
///
/// `failure` carries the error to report when the script did not load.
pub(crate) fn settle_request(plt: &Platform, url: &str, failure: Option<RuntimeError>) {
	let Some(request) = plt.loader.pending.borrow_mut().remove(url) else {
		tracing::debug!(%url, "completion for a request that is no longer pending");
		return;
	};
	let dom = plt.dom();
	if let Some(parent) = dom.parent_node(request.script) {
		dom.remove_child(parent, request.script);
	}
	if let Some(error) = failure {
		plt.report(ErrorKind::ModuleLoad, &anyhow::Error::new(error), request.script);
	}
}

/// Abandons every request older than the module timeout.
pub(crate) fn sweep_timeouts(plt: &Platform) {
	let now = plt.now();
	let timeout = plt.config().module_timeout();
	let stale: Vec<(String, Duration)> = plt
		.loader
		.pending
		.borrow()
		.iter()
		.filter_map(|(url, req)| {
			let age = now.saturating_sub(req.requested_at);
			(age >= timeout).then(|| (url.clone(), age))
		})
		.collect();

	for (url, age) in stale {
		tracing::warn!(%url, elapsed_ms = age.as_millis() as u64, "module request timed out");
		let error = RuntimeError::ModuleTimeout {
			url: url.clone(),
			elapsed_ms: age.as_millis() as u64,
		};
		settle_request(plt, &url, Some(error));
	}
}

/// Registers an announced module and releases its waiters in FIFO order.
pub(crate) fn announce(
	plt: &Platform,
	module_id: &str,
	import_fn: impl FnOnce(&mut ModuleImports),
	tags: &[&str],
) {
	let mut imports = ModuleImports::new(plt.config().public_path.clone());
	import_fn(&mut imports);

	for tag in tags {
		let key = tag.to_ascii_uppercase();
		if plt.meta_for_key(&key).is_none() {
			tracing::warn!(%tag, module_id, "announced component is not registered");
			continue;
		}
		match imports.definitions.remove(&key) {
			Some(definition) => plt.install_definition(key, definition),
			None => {
				let error = RuntimeError::MissingDefinition {
					module_id: module_id.to_string(),
					tag: tag.to_ascii_lowercase(),
				};
				tracing::warn!(%error, "skipping component");
			}
		}
	}

	let url = module_url(plt.config(), module_id);
	settle_request(plt, &url, None);

	let waiters = plt
		.loader
		.waiters
		.borrow_mut()
		.remove(module_id)
		.unwrap_or_default();
	plt.loader
		.loaded_modules
		.borrow_mut()
		.insert(module_id.to_string());
	tracing::debug!(module_id, waiters = waiters.len(), "module announced");

	for waiter in waiters {
		waiter(plt);
	}
}
