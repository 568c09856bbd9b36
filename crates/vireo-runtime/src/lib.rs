//! # Vireo Runtime
//!
//! The custom element runtime: lifecycle, reactive members, virtual DOM and
//! lazy module loading, composed behind a [`Platform`].
//!
//! ## Modules
//!
//! - [`dom`]: the document seam and an in-memory document
//! - [`vdom`]: virtual nodes, diff/patch and slot projection
//! - [`component`]: the [`Component`] trait and per-type accessor tables
//! - [`element`]: element classes dispatched by tag name
//! - [`loader`]: module and stylesheet requests
//! - [`ssr`]: pre-rendering and hydration markers
//! - [`platform`]: the context that owns all runtime state
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use vireo_core::{ComponentMeta, MemberMeta, PropType, RuntimeConfig, Value};
//! use vireo_runtime::vdom::{VData, VNode, h};
//! use vireo_runtime::{AccessorTable, Component, ComponentDefinition, DomApi, MemoryDom, Platform};
//!
//! #[derive(Default)]
//! struct Hello {
//!     name: String,
//! }
//!
//! impl Component for Hello {
//!     fn accessors() -> AccessorTable<Self> {
//!         AccessorTable::<Self>::new().field(
//!             "name",
//!             |c| Value::from(c.name.as_str()),
//!             |c, v| c.name = v.to_text(),
//!         )
//!     }
//!
//!     fn render(&self) -> anyhow::Result<Option<VNode>> {
//!         Ok(Some(h("p", VData::new(), [format!("Hello {}", self.name)])))
//!     }
//! }
//!
//! let dom = Rc::new(MemoryDom::new());
//! let plt = Platform::new(dom.clone(), RuntimeConfig::default());
//! plt.register_component(
//!     ComponentMeta::new("x-hello", "hello").with_member(MemberMeta::prop("name", PropType::String)),
//! );
//!
//! let elm = dom.create_element("x-hello");
//! dom.set_attribute(elm, "name", "Vireo");
//! dom.append_child(dom.body(), elm);
//! plt.connect_tree(elm);
//!
//! plt.announce(
//!     "hello",
//!     |imports| {
//!         imports.define(ComponentDefinition::new::<Hello>("x-hello"));
//!     },
//!     &["x-hello"],
//! );
//! plt.run_until_idle();
//!
//! assert!(plt.is_loaded(elm));
//! let p = dom.first_child(elm).unwrap();
//! let text = dom.first_child(p).unwrap();
//! assert_eq!(dom.text_content(text).as_deref(), Some("Hello Vireo"));
//! ```

pub mod component;
pub mod dom;
pub mod element;
pub mod loader;
pub mod platform;
pub mod ssr;
pub mod vdom;

mod host;
mod lifecycle;

pub use component::{AccessorTable, Component, ComponentDefinition, WillLoad};
pub use dom::{DomApi, DomEvent, Listener, ListenerOptions, MemoryDom, NodeKind};
pub use element::{CustomElement, HostElementClass};
pub use host::LifecycleState;
pub use lifecycle::RenderPhase;
pub use loader::ModuleImports;
pub use platform::Platform;
pub use vdom::{VData, VNode, el, h, t};
