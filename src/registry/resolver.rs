//! Inheritance resolution and the shared resolved-definition cache.
//!
//! [`DefRegistry`] walks the `extends` chain of a definition, merges
//! attributes and children with child-wins precedence, and caches the fully
//! merged result keyed by descriptor. Cache entries are content-addressed by
//! the source's last-modified stamp: a changed stamp invalidates the entry.
//!
//! # Concurrency
//!
//! Many resolution passes run concurrently. The cache and the gate map are
//! the only shared mutable state. Per-descriptor gates give single-flight
//! convergence: duplicate concurrent requests for a descriptor end up with
//! one cached result. Single-flight here governs publication, not parsing:
//! simultaneous misses may each parse and walk the chain, but only one merge
//! is published and the losers adopt it at the double-check. Gating earlier
//! would hold a child's gate while taking the parent's; two threads entering
//! a cyclic `extends` pair from opposite ends would then block on each
//! other's gate before either per-pass in-progress set could notice the
//! cycle. No gate is held while a parent resolves (parents merge completely
//! before the child's gate is taken), so that deadlock cannot occur.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::source::SourceProvider;
use crate::base::{AttrValue, DefKind, Descriptor, Timestamp};
use crate::definition::{attrs, parse_definition, ResolvedDef};
use crate::error::{DefError, Result};

struct CachedDef {
    stamp: Timestamp,
    def: Arc<ResolvedDef>,
}

/// State scoped to one top-level resolution call.
#[derive(Default)]
struct ResolvePass {
    /// Descriptors currently being resolved on this chain. Re-entering one
    /// means the `extends` relation has a cycle.
    in_progress: FxHashSet<Descriptor>,
}

/// The resolution engine: source access, inheritance merging, caching.
pub struct DefRegistry {
    source: Arc<dyn SourceProvider>,
    cache: RwLock<FxHashMap<Descriptor, CachedDef>>,
    gates: Mutex<FxHashMap<Descriptor, Arc<Mutex<()>>>>,
}

impl DefRegistry {
    pub fn new(source: Arc<dyn SourceProvider>) -> Self {
        Self {
            source,
            cache: RwLock::new(FxHashMap::default()),
            gates: Mutex::new(FxHashMap::default()),
        }
    }

    /// The underlying source provider.
    pub fn source(&self) -> &Arc<dyn SourceProvider> {
        &self.source
    }

    /// Resolve a descriptor to its fully merged definition.
    ///
    /// Fails with `DefinitionNotFound` if no source backs the descriptor,
    /// or `InvalidDefinition` on any structural violation along the chain.
    pub fn get_definition(&self, descriptor: &Descriptor) -> Result<Arc<ResolvedDef>> {
        let mut pass = ResolvePass::default();
        self.resolve_in_pass(descriptor, &mut pass)
    }

    fn resolve_in_pass(
        &self,
        descriptor: &Descriptor,
        pass: &mut ResolvePass,
    ) -> Result<Arc<ResolvedDef>> {
        if !pass.in_progress.insert(descriptor.clone()) {
            return Err(DefError::invalid(format!(
                "cycle detected in extends chain of {descriptor}"
            )));
        }
        let result = self.resolve_fresh(descriptor, pass);
        pass.in_progress.remove(descriptor);
        result
    }

    fn resolve_fresh(
        &self,
        descriptor: &Descriptor,
        pass: &mut ResolvePass,
    ) -> Result<Arc<ResolvedDef>> {
        let source = self
            .source
            .get_source(descriptor)
            .ok_or_else(|| DefError::not_found(descriptor))?;
        let stamp = source.last_modified;

        if let Some(hit) = self.lookup_cached(descriptor, stamp) {
            debug!(descriptor = %descriptor, "definition cache hit");
            return Ok(hit);
        }

        // Parse and resolve the parent chain before taking any gate.
        let own = parse_definition(descriptor, &source)?;
        let parent = match &own.extends {
            Some(parent_desc) => {
                let parent = self.resolve_in_pass(parent_desc, pass)?;
                if !parent.extensible() {
                    return Err(DefError::invalid(format!(
                        "{descriptor} cannot extend non-extensible definition {parent_desc}"
                    )));
                }
                Some(parent)
            }
            None => None,
        };

        let gate = self.gate_for(descriptor);
        let _flight = gate.lock();
        if let Some(hit) = self.lookup_cached(descriptor, stamp) {
            // Another flight computed it while we were parsing.
            return Ok(hit);
        }

        let merged = ResolvedDef::merge(own, parent.as_deref());
        self.validate_structure(&merged)?;
        let def = Arc::new(merged);
        self.cache.write().insert(
            descriptor.clone(),
            CachedDef {
                stamp,
                def: def.clone(),
            },
        );
        self.gates.lock().remove(descriptor);
        debug!(descriptor = %descriptor, stamp, "definition resolved");
        Ok(def)
    }

    fn lookup_cached(&self, descriptor: &Descriptor, stamp: Timestamp) -> Option<Arc<ResolvedDef>> {
        self.cache
            .read()
            .get(descriptor)
            .filter(|cached| cached.stamp == stamp)
            .map(|cached| cached.def.clone())
    }

    fn gate_for(&self, descriptor: &Descriptor) -> Arc<Mutex<()>> {
        self.gates
            .lock()
            .entry(descriptor.clone())
            .or_default()
            .clone()
    }

    /// Structural checks over the merged definition.
    ///
    /// Reference *existence* is the validator's job; this rejects what is
    /// wrong regardless of what else exists: disallowed explicit-empty,
    /// malformed referenced names, dependency filters matching nothing.
    fn validate_structure(&self, def: &ResolvedDef) -> Result<()> {
        def.security_provider_descriptor()?;
        if let Some(AttrValue::Text(value)) = def.attr(attrs::OVERRIDE_THEME) {
            Descriptor::parse(value, DefKind::Theme)?;
        }
        for filter in def.dependencies() {
            if self.source.find(filter).is_empty() {
                return Err(DefError::invalid(format!("Invalid dependency {filter}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StringSource;

    fn app(name: &str) -> Descriptor {
        Descriptor::new("demo", name, DefKind::Application)
    }

    fn registry(defs: &[(&str, &str)]) -> DefRegistry {
        let sources = StringSource::new();
        for (name, text) in defs {
            sources.add(app(name), *text, 1);
        }
        DefRegistry::new(Arc::new(sources))
    }

    #[test]
    fn test_missing_source_is_not_found() {
        let reg = registry(&[]);
        let err = reg.get_definition(&app("ghost")).unwrap_err();
        assert_eq!(err.to_string(), "No APPLICATION named demo:ghost found");
    }

    #[test]
    fn test_inherited_attribute_across_two_levels() {
        let reg = registry(&[
            (
                "grand",
                "<quill:application securityProvider='core:allow' extensible='true'/>",
            ),
            (
                "parent",
                "<quill:application extends='demo:grand' extensible='true'/>",
            ),
            ("child", "<quill:application extends='demo:parent'/>"),
        ]);

        let def = reg.get_definition(&app("child")).unwrap();
        assert_eq!(
            def.security_provider_descriptor().unwrap().qualified_name(),
            "core:allow"
        );
    }

    #[test]
    fn test_non_extensible_base_rejected() {
        let reg = registry(&[
            ("base", "<quill:application/>"),
            ("child", "<quill:application extends='demo:base'/>"),
        ]);

        let err = reg.get_definition(&app("child")).unwrap_err();
        assert!(err.is_invalid());
        assert!(err.to_string().contains("non-extensible"));
    }

    #[test]
    fn test_extends_cycle_detected() {
        let reg = registry(&[
            (
                "a",
                "<quill:application extends='demo:b' extensible='true'/>",
            ),
            (
                "b",
                "<quill:application extends='demo:a' extensible='true'/>",
            ),
        ]);

        let err = reg.get_definition(&app("a")).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_self_extends_cycle() {
        let reg = registry(&[(
            "a",
            "<quill:application extends='demo:a' extensible='true'/>",
        )]);
        assert!(reg.get_definition(&app("a")).unwrap_err().is_invalid());
    }

    #[test]
    fn test_empty_security_provider_rejected_at_resolution() {
        let reg = registry(&[("home", "<quill:application securityProvider=''/>")]);
        let err = reg.get_definition(&app("home")).unwrap_err();
        assert_eq!(err.to_string(), "QualifiedName is required for descriptors");
    }

    #[test]
    fn test_unmatched_dependency_filter() {
        let reg = registry(&[(
            "home",
            "<quill:application>\
             <quill:dependency resource='*://somecrap:*' type='COMPONENT'/>\
             </quill:application>",
        )]);

        let err = reg.get_definition(&app("home")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid dependency *://somecrap:*[COMPONENT]"
        );
    }

    #[test]
    fn test_cache_invalidated_by_stamp_change() {
        let sources = Arc::new(StringSource::new());
        sources.add(app("home"), "<quill:application/>", 1);
        let reg = DefRegistry::new(sources.clone());

        let first = reg.get_definition(&app("home")).unwrap();
        let again = reg.get_definition(&app("home")).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        sources.set_last_modified(&app("home"), 2);
        let fresh = reg.get_definition(&app("home")).unwrap();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert_eq!(fresh.last_modified(), 2);
    }

    #[test]
    fn test_concurrent_resolution_converges() {
        let sources = StringSource::new();
        sources.add(
            app("base"),
            "<quill:application useAppcache='true' extensible='true'/>",
            1,
        );
        sources.add(app("home"), "<quill:application extends='demo:base'/>", 1);
        let reg = Arc::new(DefRegistry::new(Arc::new(sources)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = reg.clone();
                std::thread::spawn(move || reg.get_definition(&app("home")).unwrap())
            })
            .collect();
        let defs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Every thread converges on the cached value.
        let cached = reg.get_definition(&app("home")).unwrap();
        assert!(defs.iter().all(|d| Arc::ptr_eq(d, &cached)));
        assert!(cached.appcache_enabled());
    }
}
