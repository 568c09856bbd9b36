//! Lifecycle integration tests
//!
//! Drives hosts from connection to load through the platform and checks
//! hook ordering, render de-duplication and bottom-up load completion.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{Behavior, Harness, Recorder};
use rstest::rstest;
use vireo_core::{Deferred, ErrorKind, Value};
use vireo_runtime::{ComponentDefinition, DomApi, DomEvent, LifecycleState};

// ============================================================================
// Single host
// ============================================================================

/// Tests the hooks of a host that loads without children
#[rstest]
fn test_host_runs_initial_hooks_in_order() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");

	assert_eq!(hx.plt.lifecycle_state(elm), Some(LifecycleState::AwaitingModule));

	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();

	assert_eq!(
		hx.take_log(),
		vec!["x-rec:will_load", "x-rec:render", "x-rec:did_load"]
	);
	assert_eq!(hx.plt.lifecycle_state(elm), Some(LifecycleState::Loaded));
	assert!(hx.dom.has_class(elm, "hydrated"));
	assert_eq!(hx.text(elm), ":0");
}

/// Tests that a host connects only once
#[rstest]
fn test_second_connect_is_ignored() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.plt.connected_callback(elm);

	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();

	assert_eq!(hx.count("x-rec:render"), 1);
}

/// Tests that many writes before a drain produce a single render
#[rstest]
fn test_prop_writes_before_drain_render_once() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();
	hx.take_log();

	for n in 1..=5 {
		hx.plt.set_prop(elm, "count", n).unwrap();
	}
	hx.plt.set_prop(elm, "label", "n").unwrap();
	hx.run();

	assert_eq!(hx.count("x-rec:render"), 1);
	assert_eq!(hx.count("x-rec:did_update"), 1);
	assert!(hx.log_contains("x-rec:will_change 0 -> 1"));
	assert!(hx.log_contains("x-rec:did_change 5"));
	assert_eq!(hx.text(elm), "n:5");
}

/// Tests that writing an identical value is not a change
#[rstest]
fn test_identical_write_does_not_render() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();
	hx.take_log();

	hx.plt.set_prop(elm, "count", 0).unwrap();
	hx.run();

	assert!(hx.take_log().is_empty());
}

/// Tests will_update / did_update around a state-driven re-render
#[rstest]
fn test_update_hooks_wrap_rerender() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();
	hx.take_log();

	hx.plt.set_state(elm, "clicks", 3).unwrap();
	hx.run();

	assert_eq!(
		hx.take_log(),
		vec!["x-rec:will_update", "x-rec:render", "x-rec:did_update"]
	);
}

/// Tests that host data is patched onto the host element
#[rstest]
fn test_host_data_classes_follow_state() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();
	assert!(!hx.dom.has_class(elm, "open"));

	hx.plt.set_state(elm, "open", true).unwrap();
	hx.run();
	assert!(hx.dom.has_class(elm, "open"));
	assert!(hx.dom.has_class(elm, "hydrated"));

	hx.plt.set_state(elm, "open", false).unwrap();
	hx.run();
	assert!(!hx.dom.has_class(elm, "open"));
}

// ============================================================================
// Load ordering
// ============================================================================

/// Tests that a parent loads only after both children, in either order
#[rstest]
#[case(["x-a", "x-b"])]
#[case(["x-b", "x-a"])]
fn test_parent_loads_after_both_children(#[case] order: [&'static str; 2]) {
	let hx = Harness::new();
	hx.register("x-parent", "parent");
	hx.register("x-a", "a");
	hx.register("x-b", "b");
	let parent = hx.mount(hx.dom.body(), "x-parent");

	hx.announce(
		"parent",
		&["x-parent"],
		Behavior {
			children: vec!["x-a", "x-b"],
			..Behavior::default()
		},
	);
	hx.run();

	assert_eq!(
		hx.plt.lifecycle_state(parent),
		Some(LifecycleState::AwaitingChildren)
	);
	assert_eq!(hx.scripts(), vec!["/build/a.js", "/build/b.js"]);

	let [first, second] = order;
	hx.announce(&first[2..], &[first], Behavior::default());
	hx.run();
	assert!(!hx.plt.is_loaded(parent));
	assert!(!hx.log_contains("x-parent:did_load"));

	hx.announce(&second[2..], &[second], Behavior::default());
	hx.run();
	assert!(hx.plt.is_loaded(parent));

	let did_loads: Vec<String> = hx
		.take_log()
		.into_iter()
		.filter(|e| e.ends_with(":did_load"))
		.collect();
	assert_eq!(
		did_loads,
		vec![
			format!("{first}:did_load"),
			format!("{second}:did_load"),
			"x-parent:did_load".to_string(),
		]
	);
}

/// Tests that a child disconnected while loading releases its parent
#[rstest]
fn test_disconnected_child_releases_parent() {
	let hx = Harness::new();
	hx.register("x-parent", "parent");
	hx.register("x-a", "a");
	let parent = hx.mount(hx.dom.body(), "x-parent");
	hx.announce(
		"parent",
		&["x-parent"],
		Behavior {
			children: vec!["x-a"],
			..Behavior::default()
		},
	);
	hx.run();
	let child = hx.dom.elements_by_tag_name(parent, "x-a")[0];

	hx.plt.disconnected_callback(child);

	assert!(hx.plt.is_loaded(parent));
	assert_eq!(hx.plt.lifecycle_state(child), Some(LifecycleState::Disconnected));
}

/// Tests that the app load signal waits for every top-level host
#[rstest]
fn test_app_loaded_after_all_top_level_hosts() {
	let hx = Harness::new();
	hx.register("x-a", "a");
	hx.register("x-b", "b");
	let fired = Rc::new(Cell::new(0));
	let counter = fired.clone();
	hx.plt.on_app_loaded(move || counter.set(counter.get() + 1));
	let events = Rc::new(Cell::new(0));
	let seen = events.clone();
	hx.dom.add_event_listener(
		hx.dom.document_element(),
		"appload",
		Rc::new(move |_: &DomEvent| seen.set(seen.get() + 1)),
		Default::default(),
	);

	hx.mount(hx.dom.body(), "x-a");
	hx.mount(hx.dom.body(), "x-b");
	hx.announce("a", &["x-a"], Behavior::default());
	hx.run();
	assert!(!hx.plt.is_app_loaded());

	hx.announce("b", &["x-b"], Behavior::default());
	hx.run();

	assert!(hx.plt.is_app_loaded());
	assert_eq!(fired.get(), 1);
	assert_eq!(events.get(), 1);

	let late = Rc::new(Cell::new(false));
	let flag = late.clone();
	hx.plt.on_app_loaded(move || flag.set(true));
	assert!(late.get());
}

// ============================================================================
// will_load
// ============================================================================

/// Tests that render waits for a deferred will_load and sees later writes
#[rstest]
fn test_deferred_will_load_blocks_first_render() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let ready = Deferred::new();
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce(
		"recorder",
		&["x-rec"],
		Behavior {
			will_load: Some(ready.clone()),
			..Behavior::default()
		},
	);
	hx.run();

	assert_eq!(hx.take_log(), vec!["x-rec:will_load"]);
	assert_eq!(hx.plt.lifecycle_state(elm), Some(LifecycleState::Instantiating));

	hx.plt.set_prop(elm, "count", 3).unwrap();
	hx.run();
	assert!(!hx.log_contains("x-rec:render"));

	ready.resolve();
	hx.run();

	assert_eq!(hx.count("x-rec:render"), 1);
	assert!(hx.plt.is_loaded(elm));
	assert_eq!(hx.text(elm), ":3");
}

// ============================================================================
// Disconnect
// ============================================================================

/// Tests that a disconnect cancels the queued first render
#[rstest]
fn test_disconnect_halts_scheduled_work() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce("recorder", &["x-rec"], Behavior::default());

	hx.plt.disconnected_callback(elm);
	hx.run();

	assert!(hx.take_log().is_empty());
	assert_eq!(hx.plt.lifecycle_state(elm), Some(LifecycleState::Disconnected));
}

/// Tests did_unload and the teardown of a loaded host
#[rstest]
fn test_disconnect_runs_did_unload() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();
	hx.take_log();

	hx.plt.disconnected_callback(elm);
	hx.plt.set_prop(elm, "count", 9).unwrap();
	hx.run();

	assert_eq!(hx.take_log(), vec!["x-rec:did_unload"]);
	assert!(hx.plt.with_component::<Recorder, _>(elm, |_| ()).is_none());
}

/// Tests that disconnected hosts leave no record behind
#[rstest]
fn test_disconnected_hosts_are_dropped() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elms: Vec<_> = (0..3).map(|_| hx.mount(hx.dom.body(), "x-rec")).collect();
	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();
	assert_eq!(hx.plt.host_count(), 3);

	for elm in &elms {
		hx.plt.disconnected_callback(*elm);
	}
	hx.plt.connected_callback(elms[0]);
	hx.run();

	assert_eq!(hx.plt.host_count(), 0);
	assert!(!hx.plt.is_loaded(elms[0]));
	assert_eq!(hx.plt.lifecycle_state(elms[0]), Some(LifecycleState::Disconnected));
}

/// Tests that removing a rendered child host disconnects it
#[rstest]
fn test_removed_child_hosts_are_disconnected() {
	let hx = Harness::new();
	hx.register("x-parent", "parent");
	hx.register("x-a", "a");
	let parent = hx.mount(hx.dom.body(), "x-parent");
	hx.announce(
		"parent",
		&["x-parent"],
		Behavior {
			children: vec!["x-a"],
			..Behavior::default()
		},
	);
	hx.announce("a", &["x-a"], Behavior::default());
	hx.run();
	let child = hx.dom.elements_by_tag_name(parent, "x-a")[0];
	assert!(hx.plt.is_loaded(child));

	hx.plt.disconnect_tree(parent);

	assert_eq!(hx.plt.lifecycle_state(child), Some(LifecycleState::Disconnected));
	assert!(hx.log_contains("x-a:did_unload"));
	assert!(hx.log_contains("x-parent:did_unload"));
}

// ============================================================================
// Errors
// ============================================================================

/// Tests that a failed instantiation is reported and leaves the host unupgraded
#[rstest]
fn test_instantiation_failure_is_reported() {
	let hx = Harness::new();
	hx.register("x-bad", "bad");
	let elm = hx.mount(hx.dom.body(), "x-bad");

	hx.plt.announce(
		"bad",
		|imports| {
			imports.define(ComponentDefinition::with_factory::<Recorder>("x-bad", || {
				anyhow::bail!("constructor failed")
			}));
		},
		&["x-bad"],
	);
	hx.run();

	let errors = hx.errors.borrow();
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].0, ErrorKind::InitInstance);
	assert_eq!(errors[0].1, "constructor failed");
	assert_eq!(errors[0].2, elm);
	assert!(!hx.dom.has_class(elm, "hydrated"));
	assert!(!hx.plt.is_loaded(elm));
	assert!(hx.plt.is_app_loaded());
}

/// Tests that a failing render keeps the previously patched DOM
#[rstest]
fn test_render_failure_keeps_previous_dom() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let behavior = Behavior::default();
	let fail = behavior.fail_render.clone();
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce("recorder", &["x-rec"], behavior);
	hx.run();
	let before = hx.dom.first_child(elm);

	fail.set(true);
	hx.plt.set_prop(elm, "label", "broken").unwrap();
	hx.run();

	assert_eq!(hx.errors.borrow()[0].0, ErrorKind::Render);
	assert_eq!(hx.text(elm), ":0");
	assert_eq!(hx.dom.first_child(elm), before);

	fail.set(false);
	hx.plt.set_prop(elm, "label", "fixed").unwrap();
	hx.run();
	assert_eq!(hx.text(elm), "fixed:0");
}

// ============================================================================
// Members
// ============================================================================

/// Tests element and global member injection
#[rstest]
fn test_element_and_global_members_are_injected() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	hx.plt.add_global("appConfig", "dark");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();

	let (host, config) = hx
		.plt
		.with_component::<Recorder, _>(elm, |p| (p.host.clone(), p.config.clone()))
		.unwrap();
	assert_eq!(host, Value::Element(elm));
	assert_eq!(config, Value::from("dark"));
}

/// Tests calling a declared method through the host
#[rstest]
fn test_call_method_requires_instance() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");

	let early = hx.plt.call_method(elm, "increment", &[]);
	assert!(early.unwrap_err().to_string().contains("not been instantiated"));

	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();

	let result = hx.plt.call_method(elm, "increment", &[Value::from(2)]).unwrap();
	assert_eq!(result, Value::Number(2.0));
	assert!(hx.plt.call_method(elm, "count", &[]).is_err());
}

/// Tests that a light DOM change re-renders an observing host
#[rstest]
fn test_child_list_change_requeues_render() {
	let hx = Harness::new();
	hx.register("x-rec", "recorder");
	let elm = hx.mount(hx.dom.body(), "x-rec");
	hx.plt.notify_child_list_changed(elm);
	hx.announce("recorder", &["x-rec"], Behavior::default());
	hx.run();
	hx.take_log();

	hx.plt.notify_child_list_changed(elm);
	hx.run();

	assert_eq!(hx.count("x-rec:render"), 1);
}
