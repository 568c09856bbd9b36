//! The element runtime.
//!
//! Re-exports [`vireo_runtime`]: the document seam, virtual DOM, lifecycle
//! controller, module loader and server rendering helpers.

pub use vireo_runtime::*;
