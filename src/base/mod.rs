//! Foundation types for the quill definition engine.
//!
//! This module provides the value types used throughout the crate:
//! - [`Descriptor`], [`DefKind`] - canonical definition identities
//! - [`DescriptorFilter`] - wildcard descriptor patterns
//! - [`AttrValue`], [`AttrMap`] - explicit attribute values
//! - [`Timestamp`] - source last-modified stamps
//!
//! This module has NO dependencies on other quill modules (except errors).

mod attribute;
mod descriptor;

pub use attribute::{AttrMap, AttrValue};
pub use descriptor::{DefKind, Descriptor, DescriptorFilter};

/// A last-modified stamp in milliseconds since the Unix epoch.
pub type Timestamp = u64;
