//! Platform-independent building blocks.
//!
//! The render scheduler, the member value model, registry metadata,
//! configuration and the error types shared by every crate.
//!
//! # Examples
//!
//! ```rust
//! use vireo::core::{PropType, Value};
//!
//! assert_eq!(Value::parse_attribute(PropType::Number, "42"), Value::Number(42.0));
//! ```

pub use vireo_core::*;
