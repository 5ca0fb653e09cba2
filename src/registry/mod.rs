//! The definition registry: sources, resolution, validation, contexts.
//!
//! ```text
//!            DefinitionService (src/service.rs)
//!                      |
//!      +---------+-----+------+-----------+
//!      |         |            |           |
//!  DefRegistry  ReferenceValidator  WatermarkCache  Context
//!      |         |            |
//!      +----+----+------------+
//!           |
//!     SourceProvider (StringSource / FsSource)
//! ```

mod context;
mod deps;
mod resolver;
mod source;
mod theme;
mod validate;
mod watermark;

pub use context::{Access, Context, Mode};
pub use deps::{append_dependencies, DependencyCollector};
pub use resolver::DefRegistry;
pub use source::{FsSource, Source, SourceProvider, StringSource};
pub use theme::{effective_theme, is_local_theme};
pub use validate::{ProviderHandle, ProviderRegistry, ProviderSet, ReferenceValidator};
pub use watermark::WatermarkCache;
