//! Transitive dependency collection.
//!
//! The dependency set of a definition is everything reachable from it:
//! body children, the `extends` parent, the security provider, the effective
//! theme, and every descriptor matched by a declared dependency filter, each
//! followed transitively through its own references. A visited set keeps
//! shared and cyclic references from being walked twice.

use rustc_hash::FxHashSet;
use tracing::debug;

use super::resolver::DefRegistry;
use super::theme::effective_theme;
use crate::base::{DefKind, Descriptor};
use crate::definition::ResolvedDef;

/// One collection walk over the dependency graph.
pub struct DependencyCollector<'a> {
    registry: &'a DefRegistry,
    visited: FxHashSet<Descriptor>,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(registry: &'a DefRegistry) -> Self {
        Self {
            registry,
            visited: FxHashSet::default(),
        }
    }

    /// Add every descriptor transitively referenced by `def` to `out`.
    ///
    /// The definition's own descriptor is not part of its dependency set.
    /// References that name nothing resolvable are still reported in `out`
    /// (the validator decides whether that is an error); they are just not
    /// recursed into.
    pub fn collect(&mut self, def: &ResolvedDef, out: &mut FxHashSet<Descriptor>) {
        self.visited.insert(def.descriptor().clone());

        let mut direct: Vec<Descriptor> = def.children().to_vec();
        if let Some(parent) = def.extends() {
            direct.push(parent.clone());
        }
        if def.kind() == DefKind::Application {
            if let Ok(provider) = def.security_provider_descriptor() {
                direct.push(provider);
            }
        }
        if matches!(def.kind(), DefKind::Application | DefKind::Component) {
            if let Ok(Some(theme)) = effective_theme(def, &**self.registry.source()) {
                direct.push(theme);
            }
        }
        for filter in def.dependencies() {
            direct.extend(self.registry.source().find(filter));
        }

        for dep in direct {
            let follow = dep.kind().is_markup()
                && !self.visited.contains(&dep)
                && self.registry.source().exists(&dep);
            out.insert(dep.clone());
            if !follow {
                continue;
            }
            match self.registry.get_definition(&dep) {
                Ok(child) => self.collect(&child, out),
                Err(err) => {
                    debug!(dependency = %dep, error = %err, "skipping unresolvable dependency");
                    self.visited.insert(dep);
                }
            }
        }
    }
}

/// Collect the full transitive dependency set of `def` into `out`.
pub fn append_dependencies(
    registry: &DefRegistry,
    def: &ResolvedDef,
    out: &mut FxHashSet<Descriptor>,
) {
    DependencyCollector::new(registry).collect(def, out);
}
