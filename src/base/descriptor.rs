//! Canonical definition identities.
//!
//! A [`Descriptor`] is the typed name used as the lookup key for every
//! definition in the system. It is immutable and value-equal: two descriptors
//! with the same `namespace:name` and kind are the same identity everywhere
//! (source lookup, resolution cache, dependency sets).

use std::fmt;

use smol_str::SmolStr;

use crate::error::{DefError, Result};

// ============================================================================
// DEFINITION KIND
// ============================================================================

/// The kind of definition a descriptor refers to.
///
/// `Provider` names a security provider handle resolved through the access
/// collaborator rather than through markup sources.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub enum DefKind {
    Application,
    Component,
    Theme,
    Style,
    Provider,
}

impl DefKind {
    /// The uppercase tag used in error messages and dependency filters.
    pub const fn as_str(self) -> &'static str {
        match self {
            DefKind::Application => "APPLICATION",
            DefKind::Component => "COMPONENT",
            DefKind::Theme => "THEME",
            DefKind::Style => "STYLE",
            DefKind::Provider => "PROVIDER",
        }
    }

    /// Parse an uppercase kind tag (as written in `type=` attributes).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "APPLICATION" => Some(DefKind::Application),
            "COMPONENT" => Some(DefKind::Component),
            "THEME" => Some(DefKind::Theme),
            "STYLE" => Some(DefKind::Style),
            "PROVIDER" => Some(DefKind::Provider),
            _ => None,
        }
    }

    /// The source file extension for this kind (used by the filesystem
    /// source provider). Providers have no backing source.
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            DefKind::Application => Some("app"),
            DefKind::Component => Some("cmp"),
            DefKind::Theme => Some("theme"),
            DefKind::Style => Some("css"),
            DefKind::Provider => None,
        }
    }

    /// Whether definitions of this kind are written as tag markup.
    pub const fn is_markup(self) -> bool {
        matches!(
            self,
            DefKind::Application | DefKind::Component | DefKind::Theme
        )
    }
}

impl fmt::Display for DefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

/// A canonical, typed definition name: `namespace:name` plus a [`DefKind`].
///
/// Descriptors are never mutated after construction and implement `Ord` so
/// collections of them can be iterated deterministically.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Descriptor {
    namespace: SmolStr,
    name: SmolStr,
    kind: DefKind,
}

impl Descriptor {
    /// Create a descriptor from already-validated parts.
    pub fn new(namespace: impl Into<SmolStr>, name: impl Into<SmolStr>, kind: DefKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
        }
    }

    /// Parse a qualified name of the form `namespace:name`.
    ///
    /// An empty string is a distinct failure from a malformed one: explicit
    /// emptiness means a required name was deliberately blanked out.
    pub fn parse(qualified: &str, kind: DefKind) -> Result<Self> {
        let qualified = qualified.trim();
        if qualified.is_empty() {
            return Err(DefError::invalid("QualifiedName is required for descriptors"));
        }
        let Some((namespace, name)) = qualified.split_once(':') else {
            return Err(DefError::invalid(format!(
                "Invalid qualified name: {qualified}"
            )));
        };
        if !is_valid_segment(namespace) || !is_valid_segment(name) {
            return Err(DefError::invalid(format!(
                "Invalid qualified name: {qualified}"
            )));
        }
        Ok(Self::new(namespace, name, kind))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DefKind {
        self.kind
    }

    /// The `namespace:name` form, without the kind.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }

    /// The same `namespace:name` under a different kind.
    ///
    /// Used for bundle probes: e.g. "is there a THEME with this app's name".
    pub fn with_kind(&self, kind: DefKind) -> Descriptor {
        Descriptor {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            kind,
        }
    }

    /// Whether `other` names the same bundle (`namespace:name`), regardless
    /// of kind.
    pub fn same_bundle(&self, other: &Descriptor) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}[{}]", self.namespace, self.name, self.kind)
    }
}

/// A descriptor segment is identifier-shaped: XID start (or `_`) followed by
/// XID continue characters.
fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if unicode_ident::is_xid_start(c) || c == '_' => {}
        _ => return false,
    }
    chars.all(unicode_ident::is_xid_continue)
}

// ============================================================================
// DESCRIPTOR FILTER
// ============================================================================

/// A wildcard pattern over descriptors, as written in dependency tags.
///
/// The textual form is `prefix://namespace:name`, where any segment may be
/// `*`. The prefix segment is retained for display compatibility; matching is
/// by namespace, name, and kind.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DescriptorFilter {
    prefix: SmolStr,
    namespace: SmolStr,
    name: SmolStr,
    kind: DefKind,
}

impl DescriptorFilter {
    /// Parse a filter resource string like `*://ui:button` or `ui:*`.
    pub fn parse(resource: &str, kind: DefKind) -> Result<Self> {
        let resource = resource.trim();
        if resource.is_empty() {
            return Err(DefError::invalid("QualifiedName is required for descriptors"));
        }
        let (prefix, rest) = match resource.split_once("://") {
            Some((p, r)) => (p, r),
            None => ("*", resource),
        };
        let Some((namespace, name)) = rest.split_once(':') else {
            return Err(DefError::invalid(format!(
                "Invalid qualified name: {resource}"
            )));
        };
        if !segment_ok(prefix) || !segment_ok(namespace) || !segment_ok(name) {
            return Err(DefError::invalid(format!(
                "Invalid qualified name: {resource}"
            )));
        }
        Ok(Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
            name: name.into(),
            kind,
        })
    }

    pub fn kind(&self) -> DefKind {
        self.kind
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether the given descriptor satisfies this filter.
    pub fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.kind() == self.kind
            && segment_matches(&self.namespace, descriptor.namespace())
            && segment_matches(&self.name, descriptor.name())
    }
}

impl fmt::Display for DescriptorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}[{}]",
            self.prefix, self.namespace, self.name, self.kind
        )
    }
}

fn segment_ok(segment: &str) -> bool {
    segment == "*" || is_valid_segment(segment)
}

fn segment_matches(pattern: &str, value: &str) -> bool {
    pattern == "*" || pattern == value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_value_equality() {
        let a = Descriptor::new("ui", "button", DefKind::Component);
        let b = Descriptor::parse("ui:button", DefKind::Component).unwrap();
        let c = Descriptor::new("ui", "button", DefKind::Theme);

        assert_eq!(a, b);
        assert_ne!(a, c); // kind is part of the identity
    }

    #[test]
    fn test_descriptor_parse_empty() {
        let err = Descriptor::parse("", DefKind::Application).unwrap_err();
        assert_eq!(err.to_string(), "QualifiedName is required for descriptors");
    }

    #[test]
    fn test_descriptor_parse_malformed() {
        for bad in ["nocolon", "a:b:c", "1st:name", "ns:", ":name", "a b:c"] {
            let err = Descriptor::parse(bad, DefKind::Component).unwrap_err();
            assert!(err.is_invalid(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_descriptor_display() {
        let d = Descriptor::new("demo", "home", DefKind::Application);
        assert_eq!(d.to_string(), "demo:home");
        assert_eq!(format!("{d:?}"), "demo:home[APPLICATION]");
    }

    #[test]
    fn test_with_kind_same_bundle() {
        let app = Descriptor::new("demo", "home", DefKind::Application);
        let theme = app.with_kind(DefKind::Theme);

        assert_eq!(theme.kind(), DefKind::Theme);
        assert!(app.same_bundle(&theme));
    }

    #[test]
    fn test_filter_display_compat() {
        let f = DescriptorFilter::parse("*://somecrap:*", DefKind::Component).unwrap();
        assert_eq!(f.to_string(), "*://somecrap:*[COMPONENT]");
    }

    #[test]
    fn test_filter_matching() {
        let f = DescriptorFilter::parse("ui:*", DefKind::Component).unwrap();

        assert!(f.matches(&Descriptor::new("ui", "button", DefKind::Component)));
        assert!(!f.matches(&Descriptor::new("ui", "button", DefKind::Theme)));
        assert!(!f.matches(&Descriptor::new("other", "button", DefKind::Component)));
    }

    #[test]
    fn test_filter_default_prefix() {
        let f = DescriptorFilter::parse("ui:button", DefKind::Component).unwrap();
        assert_eq!(f.to_string(), "*://ui:button[COMPONENT]");
    }

    #[test]
    fn test_descriptor_ordering_is_stable() {
        let mut v = vec![
            Descriptor::new("b", "x", DefKind::Component),
            Descriptor::new("a", "y", DefKind::Theme),
            Descriptor::new("a", "x", DefKind::Component),
        ];
        v.sort();
        let names: Vec<_> = v.iter().map(|d| d.to_string()).collect();
        assert_eq!(names, ["a:x", "a:y", "b:x"]);
    }
}
