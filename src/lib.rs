//! # Vireo
//!
//! A runtime for lazily loaded custom elements.
//!
//! Components are registered up front from compact metadata. Their code is
//! fetched the first time a matching element connects, after which each
//! host runs through a fixed lifecycle: instantiate, render through a
//! virtual DOM, wait for child components, then report itself loaded.
//!
//! ## Feature Flags
//!
//! - `full` (default) - everything below
//! - `runtime` - lifecycle controller, virtual DOM, module loader and the
//!   [`Platform`] context
//!
//! Without `runtime` only the platform-independent pieces are built:
//! the scheduler, the value model, registry metadata and configuration.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "runtime")]
//! # {
//! use std::rc::Rc;
//! use vireo::prelude::*;
//!
//! let dom = Rc::new(MemoryDom::new());
//! let plt = Platform::new(dom.clone(), RuntimeConfig::default());
//! plt.register_component(ComponentMeta::new("x-card", "cards"));
//!
//! let card = dom.create_element("x-card");
//! dom.append_child(dom.body(), card);
//! plt.connected_callback(card);
//!
//! assert_eq!(plt.pending_module_urls(), vec!["/build/cards.js"]);
//! # }
//! ```

pub mod core;
#[cfg(feature = "runtime")]
pub mod runtime;

pub use vireo_core::{
	ComponentMeta, Deferred, ErrorKind, MemberKind, MemberMeta, NodeId, Priority, PropType,
	RuntimeConfig, RuntimeError, RuntimeResult, Value,
};

#[cfg(feature = "runtime")]
pub use vireo_runtime::{
	Component, ComponentDefinition, DomApi, MemoryDom, ModuleImports, Platform, VNode, h,
};

/// Commonly used types.
pub mod prelude {
	pub use vireo_core::{
		ComponentMeta, Deferred, ErrorKind, ListenMeta, MemberMeta, NodeId, PropType,
		RuntimeConfig, RuntimeError, Value,
	};

	#[cfg(feature = "runtime")]
	pub use vireo_runtime::{
		AccessorTable, Component, ComponentDefinition, DomApi, DomEvent, LifecycleState,
		MemoryDom, ModuleImports, Platform, VData, VNode, WillLoad, el, h, t,
	};
}
