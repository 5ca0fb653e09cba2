//! Source providers: raw text + last-modified lookup per descriptor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;

use crate::base::{DefKind, Descriptor, DescriptorFilter, Timestamp};

/// Raw source text with its last-modified stamp.
#[derive(Clone, Debug)]
pub struct Source {
    pub text: Arc<str>,
    pub last_modified: Timestamp,
}

impl Source {
    pub fn new(text: impl Into<Arc<str>>, last_modified: Timestamp) -> Self {
        Self {
            text: text.into(),
            last_modified,
        }
    }
}

/// Supplies raw definition sources.
///
/// This is the storage seam of the engine: everything above it only ever
/// sees `(text, last_modified)` pairs keyed by descriptor.
pub trait SourceProvider: Send + Sync {
    /// Get the source for a descriptor, if one exists.
    fn get_source(&self, descriptor: &Descriptor) -> Option<Source>;

    /// Whether a source of exactly this descriptor exists.
    fn exists(&self, descriptor: &Descriptor) -> bool {
        self.get_source(descriptor).is_some()
    }

    /// All descriptors with backing sources matching the filter.
    fn find(&self, filter: &DescriptorFilter) -> Vec<Descriptor>;
}

// ============================================================================
// IN-MEMORY SOURCES
// ============================================================================

/// An in-memory source registry.
///
/// The workhorse for tests and for callers that assemble definitions
/// programmatically. Thread-safe; `set_last_modified` lets tests advance
/// stamps without rewriting text.
#[derive(Debug, Default)]
pub struct StringSource {
    inner: RwLock<IndexMap<Descriptor, Source>>,
}

impl StringSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a source.
    pub fn add(&self, descriptor: Descriptor, text: impl Into<Arc<str>>, last_modified: Timestamp) {
        self.inner
            .write()
            .insert(descriptor, Source::new(text, last_modified));
    }

    /// Advance (or rewind) the last-modified stamp of an existing source.
    /// Returns false if the descriptor has no source.
    pub fn set_last_modified(&self, descriptor: &Descriptor, last_modified: Timestamp) -> bool {
        match self.inner.write().get_mut(descriptor) {
            Some(source) => {
                source.last_modified = last_modified;
                true
            }
            None => false,
        }
    }

    /// Remove a source. Returns false if absent.
    pub fn remove(&self, descriptor: &Descriptor) -> bool {
        self.inner.write().shift_remove(descriptor).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl SourceProvider for StringSource {
    fn get_source(&self, descriptor: &Descriptor) -> Option<Source> {
        self.inner.read().get(descriptor).cloned()
    }

    fn exists(&self, descriptor: &Descriptor) -> bool {
        self.inner.read().contains_key(descriptor)
    }

    fn find(&self, filter: &DescriptorFilter) -> Vec<Descriptor> {
        self.inner
            .read()
            .keys()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect()
    }
}

// ============================================================================
// FILESYSTEM SOURCES
// ============================================================================

/// A directory-backed source provider.
///
/// Layout: `<root>/<namespace>/<name>.<ext>` where the extension encodes the
/// kind (`app`, `cmp`, `theme`, `css`). File mtime is the last-modified
/// stamp.
#[derive(Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, descriptor: &Descriptor) -> Option<PathBuf> {
        let ext = descriptor.kind().extension()?;
        Some(
            self.root
                .join(descriptor.namespace())
                .join(format!("{}.{}", descriptor.name(), ext)),
        )
    }

    fn kind_for_extension(ext: &str) -> Option<DefKind> {
        match ext {
            "app" => Some(DefKind::Application),
            "cmp" => Some(DefKind::Component),
            "theme" => Some(DefKind::Theme),
            "css" => Some(DefKind::Style),
            _ => None,
        }
    }
}

impl SourceProvider for FsSource {
    fn get_source(&self, descriptor: &Descriptor) -> Option<Source> {
        let path = self.path_for(descriptor)?;
        let text = std::fs::read_to_string(&path).ok()?;
        let last_modified = std::fs::metadata(&path)
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as Timestamp)
            .unwrap_or(0);
        Some(Source::new(text, last_modified))
    }

    fn exists(&self, descriptor: &Descriptor) -> bool {
        self.path_for(descriptor).is_some_and(|p| p.is_file())
    }

    fn find(&self, filter: &DescriptorFilter) -> Vec<Descriptor> {
        let Some(wanted_ext) = filter.kind().extension() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let Ok(namespaces) = std::fs::read_dir(&self.root) else {
            return out;
        };
        for ns_entry in namespaces.flatten() {
            if !ns_entry.path().is_dir() {
                continue;
            }
            let namespace = SmolStr::new(ns_entry.file_name().to_string_lossy());
            let Ok(files) = std::fs::read_dir(ns_entry.path()) else {
                continue;
            };
            for file in files.flatten() {
                let path = file.path();
                let (Some(stem), Some(ext)) = (
                    path.file_stem().and_then(|s| s.to_str()),
                    path.extension().and_then(|s| s.to_str()),
                ) else {
                    continue;
                };
                if ext != wanted_ext || Self::kind_for_extension(ext) != Some(filter.kind()) {
                    continue;
                }
                let descriptor = Descriptor::new(namespace.clone(), stem, filter.kind());
                if filter.matches(&descriptor) {
                    out.push(descriptor);
                }
            }
        }
        out
    }
}
