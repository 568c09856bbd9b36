//! Virtual DOM Engine
//!
//! Components describe their output as a [`VNode`] tree built with [`h`] and
//! [`t`]. Each render produces a complete new tree which [`patch`] reconciles
//! against the previous one; the old tree is discarded afterwards.
//!
//! ## Example
//!
//! ```
//! use vireo_runtime::dom::{DomApi, MemoryDom};
//! use vireo_runtime::vdom::{VData, VNode, h, patch};
//!
//! let dom = MemoryDom::new();
//! let host = dom.create_element("div");
//!
//! let mut first = h("div", VData::new(), [h("li", VData::new().key("a"), ["A"])]);
//! patch(&dom, VNode::bound("div", host), &mut first, None);
//! assert_eq!(dom.child_nodes(host).len(), 1);
//! ```

mod node;
mod patch;
mod slot;

pub use node::{Child, Key, VData, VNode, el, h, t};
pub use patch::{PatchOutcome, patch};
pub use slot::HostContent;
