//! Reference validation.
//!
//! After a definition resolves, every descriptor in its transitive
//! dependency set must be accounted for: markup and style kinds need a
//! backing source, provider kinds need a registered provider. Validation is
//! fail-fast on the first missing reference, in sorted descriptor order so
//! the reported failure is deterministic.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use super::deps::append_dependencies;
use super::resolver::DefRegistry;
use super::theme::is_local_theme;
use crate::base::{AttrValue, DefKind, Descriptor};
use crate::definition::{attrs, default_provider_descriptor, ResolvedDef};
use crate::error::{DefError, Result};

// ============================================================================
// PROVIDERS
// ============================================================================

/// A resolved security provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderHandle {
    descriptor: Descriptor,
}

impl ProviderHandle {
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}

/// Resolves provider descriptors to live providers.
///
/// Providers have no markup source; whatever hosts the engine registers
/// them through this seam.
pub trait ProviderRegistry: Send + Sync {
    fn resolve_provider(&self, descriptor: &Descriptor) -> Option<ProviderHandle>;
}

/// An in-memory provider registry.
#[derive(Debug, Default)]
pub struct ProviderSet {
    inner: RwLock<FxHashSet<Descriptor>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with the default security provider pre-registered.
    pub fn with_default() -> Self {
        let set = Self::new();
        set.register(default_provider_descriptor());
        set
    }

    pub fn register(&self, descriptor: Descriptor) {
        self.inner.write().insert(descriptor);
    }
}

impl ProviderRegistry for ProviderSet {
    fn resolve_provider(&self, descriptor: &Descriptor) -> Option<ProviderHandle> {
        self.inner.read().contains(descriptor).then(|| ProviderHandle {
            descriptor: descriptor.clone(),
        })
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Validates that everything a definition references actually exists.
pub struct ReferenceValidator<'a> {
    registry: &'a DefRegistry,
    providers: &'a dyn ProviderRegistry,
}

impl<'a> ReferenceValidator<'a> {
    pub fn new(registry: &'a DefRegistry, providers: &'a dyn ProviderRegistry) -> Self {
        Self {
            registry,
            providers,
        }
    }

    pub fn validate(&self, def: &ResolvedDef) -> Result<()> {
        let mut set = FxHashSet::default();
        append_dependencies(self.registry, def, &mut set);
        let mut deps: Vec<_> = set.into_iter().collect();
        deps.sort();

        for dep in &deps {
            let found = match dep.kind() {
                DefKind::Provider => self.providers.resolve_provider(dep).is_some(),
                _ => self.registry.source().exists(dep),
            };
            if !found {
                return Err(DefError::not_found(dep));
            }
        }

        if def.kind() == DefKind::Application {
            self.check_override_theme(def)?;
        }
        Ok(())
    }

    /// An application may override its theme only with a standalone theme;
    /// a component's local theme belongs to that component, except within
    /// the application's own bundle.
    fn check_override_theme(&self, def: &ResolvedDef) -> Result<()> {
        let Some(AttrValue::Text(value)) = def.attr(attrs::OVERRIDE_THEME) else {
            return Ok(());
        };
        let theme = Descriptor::parse(value, DefKind::Theme)?;
        if is_local_theme(&theme, &**self.registry.source()) && !theme.same_bundle(def.descriptor())
        {
            return Err(DefError::invalid(format!(
                "{theme} is a local theme and cannot override an application theme"
            )));
        }
        Ok(())
    }
}
