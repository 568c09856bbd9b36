//! User-facing component API.
//!
//! A component is a plain Rust type implementing [`Component`]. Its members
//! are exposed to the runtime through an [`AccessorTable`], and the type is
//! handed to the platform as a [`ComponentDefinition`] when its module is
//! announced.

mod accessor;
mod instance;

pub use accessor::AccessorTable;

pub(crate) use instance::{InstanceObject, InstanceRef};

use std::fmt;
use std::rc::Rc;

use vireo_core::Deferred;

use crate::vdom::{VData, VNode};
use instance::TypedInstance;

/// Outcome of [`Component::will_load`].
#[derive(Debug, Clone)]
pub enum WillLoad {
	/// Render right away.
	Ready,
	/// Render once the signal resolves.
	Deferred(Deferred),
}

/// Trait for custom element components.
///
/// Every hook has a no-op default. Hooks only run when the matching flag is
/// set in the component's [`LifecycleFlags`](vireo_core::LifecycleFlags).
///
/// # Example
///
/// ```
/// use vireo_core::Value;
/// use vireo_runtime::component::{AccessorTable, Component};
/// use vireo_runtime::vdom::{VData, VNode, h};
///
/// #[derive(Default)]
/// struct Greeting {
///     name: String,
/// }
///
/// impl Component for Greeting {
///     fn accessors() -> AccessorTable<Self> {
///         AccessorTable::<Self>::new().field(
///             "name",
///             |g| Value::from(g.name.as_str()),
///             |g, v| g.name = v.to_text(),
///         )
///     }
///
///     fn render(&self) -> anyhow::Result<Option<VNode>> {
///         Ok(Some(h("p", VData::new(), [format!("Hello, {}!", self.name)])))
///     }
/// }
/// ```
pub trait Component: Sized + 'static {
	/// Member accessors, built once per type.
	fn accessors() -> AccessorTable<Self> {
		AccessorTable::new()
	}

	/// Describes the content rendered inside the host element.
	fn render(&self) -> anyhow::Result<Option<VNode>> {
		Ok(None)
	}

	/// Attributes, classes and styles applied to the host element itself.
	fn host_data(&self) -> Option<VData> {
		None
	}

	/// Runs once before the first render.
	fn will_load(&mut self) -> anyhow::Result<WillLoad> {
		Ok(WillLoad::Ready)
	}

	/// Runs once after the first render, after every child has loaded.
	fn did_load(&mut self) -> anyhow::Result<()> {
		Ok(())
	}

	fn will_update(&mut self) -> anyhow::Result<()> {
		Ok(())
	}

	fn did_update(&mut self) -> anyhow::Result<()> {
		Ok(())
	}

	/// Runs when the host element is disconnected.
	fn did_unload(&mut self) {}
}

type Factory = Box<dyn Fn() -> anyhow::Result<InstanceRef>>;

/// Code for one tag, as provided by an announced module.
pub struct ComponentDefinition {
	tag: String,
	factory: Factory,
}

impl ComponentDefinition {
	/// Definition whose instances start from `C::default()`.
	pub fn new<C: Component + Default>(tag: &str) -> Self {
		Self::with_factory(tag, || Ok(C::default()))
	}

	/// Definition with a fallible constructor.
	pub fn with_factory<C: Component>(
		tag: &str,
		factory: impl Fn() -> anyhow::Result<C> + 'static,
	) -> Self {
		let table = Rc::new(C::accessors());
		Self {
			tag: tag.to_ascii_lowercase(),
			factory: Box::new(move || -> anyhow::Result<InstanceRef> {
				Ok(TypedInstance::new_ref(factory()?, table.clone()))
			}),
		}
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub(crate) fn instantiate(&self) -> anyhow::Result<InstanceRef> {
		(self.factory)()
	}
}

impl fmt::Debug for ComponentDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentDefinition")
			.field("tag", &self.tag)
			.finish_non_exhaustive()
	}
}
