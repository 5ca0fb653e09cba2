//! Freshness watermarks.
//!
//! A watermark is the newest last-modified stamp across an application and
//! its full transitive dependency set. Clients use it to decide whether
//! cached artifacts are still current, so it must never move backwards:
//! published entries only ever max-merge upward.
//!
//! Entries are keyed by the application's *namespace set* (its own namespace
//! plus its declared preload namespaces, sorted and deduplicated), so
//! applications drawing on the same namespaces share one watermark.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

use super::context::{Context, Mode};
use super::deps::append_dependencies;
use super::resolver::DefRegistry;
use crate::base::Timestamp;
use crate::definition::ResolvedDef;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct WatermarkCache {
    entries: RwLock<FxHashMap<Vec<SmolStr>, Timestamp>>,
}

impl WatermarkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The watermark for the context's root application.
    ///
    /// Dev mode always computes fresh. Prod reuses the published entry while
    /// preloading; outside preloading it computes fresh too, publishing the
    /// result either way.
    pub fn last_mod(&self, ctx: &Context, registry: &DefRegistry) -> Result<Timestamp> {
        let root = registry.get_definition(ctx.root())?;
        let key = namespace_key(&root);

        if ctx.mode() == Mode::Prod && ctx.preloading() {
            if let Some(stamp) = self.entries.read().get(&key).copied() {
                debug!(root = %ctx.root(), stamp, "watermark reused");
                return Ok(stamp);
            }
        }

        let stamp = compute_watermark(&root, registry);
        self.publish(key, stamp);
        debug!(root = %ctx.root(), stamp, "watermark computed");
        Ok(stamp)
    }

    /// Drop every watermark whose namespace set contains `namespace`.
    /// The next request over those namespaces recomputes.
    pub fn invalidate_namespace(&self, namespace: &str) {
        self.entries
            .write()
            .retain(|key, _| !key.iter().any(|ns| ns == namespace));
    }

    fn publish(&self, key: Vec<SmolStr>, stamp: Timestamp) {
        let mut entries = self.entries.write();
        let entry = entries.entry(key).or_insert(stamp);
        // Monotonic: concurrent publishers never lower a watermark.
        *entry = (*entry).max(stamp);
    }
}

fn namespace_key(root: &ResolvedDef) -> Vec<SmolStr> {
    let mut key = root.preload_namespaces();
    key.push(SmolStr::new(root.descriptor().namespace()));
    key.sort();
    key.dedup();
    key
}

fn compute_watermark(root: &ResolvedDef, registry: &DefRegistry) -> Timestamp {
    let mut deps = FxHashSet::default();
    append_dependencies(registry, root, &mut deps);

    let mut stamp = root.last_modified();
    for dep in &deps {
        // Sourceless kinds (providers) carry no stamp.
        if let Some(source) = registry.source().get_source(dep) {
            stamp = stamp.max(source.last_modified);
        }
    }
    stamp
}
