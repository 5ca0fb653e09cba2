//! quill: an inheritance-resolving registry for declarative UI definitions.
//!
//! Applications, components, and themes are written as small markup sources,
//! addressed by typed [`base::Descriptor`]s, and resolved on demand: the
//! engine parses a source, folds its `extends` chain into one merged
//! definition, validates everything it references, and answers freshness
//! questions for client caching.
//!
//! # Architecture
//!
//! ```text
//!   service          DefinitionService: the public operations
//!      |
//!   registry         sources, resolution cache, validation, watermarks
//!      |
//!   definition       Definition / ResolvedDef, inheritance merge
//!      |
//!   markup           logos lexer + tag-tree reader
//!      |
//!   base             Descriptor, DefKind, attribute values
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use quill::base::{DefKind, Descriptor};
//! use quill::registry::{ProviderSet, StringSource};
//! use quill::service::DefinitionService;
//!
//! let sources = Arc::new(StringSource::new());
//! let home = Descriptor::new("demo", "home", DefKind::Application);
//! sources.add(home.clone(), "<quill:application useAppcache='true'/>", 1);
//!
//! let service = DefinitionService::new(sources, Arc::new(ProviderSet::with_default()));
//! let def = service.get_definition(&home)?;
//! assert!(def.appcache_enabled());
//! service.validate_references(&home)?;
//! # Ok::<(), quill::error::DefError>(())
//! ```

pub mod base;
pub mod definition;
pub mod error;
pub mod markup;
pub mod registry;
pub mod service;

pub use base::{AttrValue, DefKind, Descriptor, DescriptorFilter};
pub use definition::ResolvedDef;
pub use error::{DefError, Result};
pub use registry::{Access, Context, DefRegistry, Mode, SourceProvider};
pub use service::DefinitionService;
