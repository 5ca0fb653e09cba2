//! Theme selection.
//!
//! An application or component picks its theme in three tiers:
//!
//! 1. an explicit `overrideTheme` attribute (explicit-empty means *no theme*,
//!    and short-circuits the probes below),
//! 2. a theme in the definition's own bundle (`ns:name` as a THEME),
//! 3. the namespace default `ns:nsTheme`.
//!
//! If none apply the definition simply has no theme.

use super::source::SourceProvider;
use crate::base::{AttrValue, DefKind, Descriptor};
use crate::definition::{attrs, ResolvedDef};
use crate::error::Result;

/// Select the effective theme descriptor for a definition, if any.
///
/// Only names the theme; whether it exists is checked by reference
/// validation.
pub fn effective_theme(
    def: &ResolvedDef,
    source: &dyn SourceProvider,
) -> Result<Option<Descriptor>> {
    match def.attr(attrs::OVERRIDE_THEME) {
        Some(AttrValue::Empty) => return Ok(None),
        Some(AttrValue::Text(value)) => {
            return Descriptor::parse(value, DefKind::Theme).map(Some);
        }
        None => {}
    }

    let bundle = def.descriptor().with_kind(DefKind::Theme);
    if source.exists(&bundle) {
        return Ok(Some(bundle));
    }

    let ns = def.descriptor().namespace();
    let implicit = Descriptor::new(ns, format!("{ns}Theme"), DefKind::Theme);
    if source.exists(&implicit) {
        return Ok(Some(implicit));
    }

    Ok(None)
}

/// A theme is *local* when its bundle also holds a style source: it is the
/// styling of one component, not a standalone theme.
pub fn is_local_theme(theme: &Descriptor, source: &dyn SourceProvider) -> bool {
    source.exists(&theme.with_kind(DefKind::Style))
}
