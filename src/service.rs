//! The service facade.
//!
//! [`DefinitionService`] bundles the registry, the provider seam, and the
//! watermark cache behind the handful of operations callers actually use.
//! It is `Send + Sync`; one instance serves all threads.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::base::{Descriptor, Timestamp};
use crate::definition::ResolvedDef;
use crate::error::Result;
use crate::registry::{
    append_dependencies, effective_theme, Access, Context, DefRegistry, Mode, ProviderRegistry,
    ReferenceValidator, SourceProvider, WatermarkCache,
};

pub struct DefinitionService {
    registry: Arc<DefRegistry>,
    providers: Arc<dyn ProviderRegistry>,
    watermarks: WatermarkCache,
}

impl DefinitionService {
    pub fn new(source: Arc<dyn SourceProvider>, providers: Arc<dyn ProviderRegistry>) -> Self {
        Self {
            registry: Arc::new(DefRegistry::new(source)),
            providers,
            watermarks: WatermarkCache::new(),
        }
    }

    pub fn registry(&self) -> &Arc<DefRegistry> {
        &self.registry
    }

    /// Resolve a descriptor to its fully merged definition.
    pub fn get_definition(&self, descriptor: &Descriptor) -> Result<Arc<ResolvedDef>> {
        self.registry.get_definition(descriptor)
    }

    /// Resolve, then check that every transitive reference exists.
    pub fn validate_references(&self, descriptor: &Descriptor) -> Result<()> {
        let def = self.registry.get_definition(descriptor)?;
        ReferenceValidator::new(&self.registry, &*self.providers).validate(&def)
    }

    /// Collect the full transitive dependency set of a definition.
    pub fn append_dependencies(
        &self,
        descriptor: &Descriptor,
        out: &mut FxHashSet<Descriptor>,
    ) -> Result<()> {
        let def = self.registry.get_definition(descriptor)?;
        append_dependencies(&self.registry, &def, out);
        Ok(())
    }

    /// The effective theme of a definition, if it has one.
    pub fn effective_theme(&self, descriptor: &Descriptor) -> Result<Option<Descriptor>> {
        let def = self.registry.get_definition(descriptor)?;
        effective_theme(&def, &**self.registry.source())
    }

    /// Open a unit of work. Infallible: the root is resolved lazily by the
    /// operations that need it.
    pub fn start_context(&self, mode: Mode, access: Access, root: Descriptor) -> Context {
        debug!(root = %root, ?mode, "context started");
        Context::new(mode, access, root)
    }

    /// Close a unit of work. Contexts hold no server-side state; this exists
    /// so callers have a definite end-of-request point.
    pub fn end_context(&self, ctx: Context) {
        debug!(root = %ctx.root(), "context ended");
    }

    /// The freshness watermark for a context's root application.
    pub fn last_mod_for_context(&self, ctx: &Context) -> Result<Timestamp> {
        self.watermarks.last_mod(ctx, &self.registry)
    }

    /// Drop published watermarks touching a namespace.
    pub fn invalidate_namespace(&self, namespace: &str) {
        self.watermarks.invalidate_namespace(namespace);
    }
}
