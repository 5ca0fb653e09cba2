//! The definition model.
//!
//! [`Definition`] is the unresolved form of a single source: its own
//! attributes, its `extends` reference, and its declared children. The
//! inheritance resolver merges a chain of these into a [`ResolvedDef`],
//! which is shared read-only once built.

use smol_str::SmolStr;

use crate::base::{AttrMap, AttrValue, DefKind, Descriptor, DescriptorFilter, Timestamp};
use crate::error::{DefError, Result};
use crate::markup::{parse_markup, Node};
use crate::registry::Source;

/// Well-known attribute names, lowercased (attribute lookup is
/// case-insensitive).
pub mod attrs {
    pub const EXTENDS: &str = "extends";
    pub const EXTENSIBLE: &str = "extensible";
    pub const SECURITY_PROVIDER: &str = "securityprovider";
    pub const OVERRIDE_THEME: &str = "overridetheme";
    pub const USE_APPCACHE: &str = "useappcache";
    pub const IS_ONE_PAGE_APP: &str = "isonepageapp";
    pub const PRELOAD: &str = "preload";
    pub const RESOURCE: &str = "resource";
    pub const TYPE: &str = "type";
}

/// Root and system tags of the markup dialect.
pub mod tags {
    pub const APPLICATION: &str = "quill:application";
    pub const COMPONENT: &str = "quill:component";
    pub const THEME: &str = "quill:theme";
    pub const DEPENDENCY: &str = "quill:dependency";
    pub const SYSTEM_PREFIX: &str = "quill:";
}

/// The provider applied when an application declares no `securityProvider`.
pub const DEFAULT_SECURITY_PROVIDER: &str = "quill:defaultProvider";

/// [`DEFAULT_SECURITY_PROVIDER`] in descriptor form.
pub fn default_provider_descriptor() -> Descriptor {
    Descriptor::new("quill", "defaultProvider", DefKind::Provider)
}

// ============================================================================
// UNRESOLVED DEFINITION
// ============================================================================

/// A single parsed source, before inheritance resolution.
#[derive(Clone, Debug)]
pub struct Definition {
    pub descriptor: Descriptor,
    pub attributes: AttrMap,
    pub extends: Option<Descriptor>,
    pub extensible: bool,
    /// Component references declared in the body, in declaration order.
    pub children: Vec<Descriptor>,
    /// Dependency filters declared via `<quill:dependency resource=…/>`.
    pub dependencies: Vec<DescriptorFilter>,
    pub last_modified: Timestamp,
}

/// Parse a raw source into an unresolved [`Definition`].
///
/// Style sources are CSS text and parse to leaf definitions; markup kinds
/// must open with the root tag matching the descriptor kind.
pub fn parse_definition(descriptor: &Descriptor, source: &Source) -> Result<Definition> {
    if !descriptor.kind().is_markup() {
        return Ok(leaf_definition(descriptor, source));
    }

    let node = parse_markup(&source.text)?;
    let expected = root_tag(descriptor.kind());
    if node.tag != expected {
        return Err(DefError::invalid(format!(
            "expected <{expected}> as root tag of {descriptor}, found <{tag}>",
            tag = node.tag
        )));
    }

    let extends = match node.attr(attrs::EXTENDS) {
        None => None,
        Some(value) => Some(Descriptor::parse(value.as_str(), descriptor.kind())?),
    };
    let extensible = node
        .attr(attrs::EXTENSIBLE)
        .is_some_and(AttrValue::as_bool);

    let mut attributes = node.attributes.clone();
    // Structural attributes never participate in attribute inheritance.
    attributes.shift_remove(attrs::EXTENDS);
    attributes.shift_remove(attrs::EXTENSIBLE);

    let mut children = Vec::new();
    let mut dependencies = Vec::new();
    if descriptor.kind() != DefKind::Theme {
        collect_body_refs(&node, &mut children, &mut dependencies)?;
    }

    Ok(Definition {
        descriptor: descriptor.clone(),
        attributes,
        extends,
        extensible,
        children,
        dependencies,
        last_modified: source.last_modified,
    })
}

fn leaf_definition(descriptor: &Descriptor, source: &Source) -> Definition {
    Definition {
        descriptor: descriptor.clone(),
        attributes: AttrMap::new(),
        extends: None,
        extensible: false,
        children: Vec::new(),
        dependencies: Vec::new(),
        last_modified: source.last_modified,
    }
}

fn root_tag(kind: DefKind) -> &'static str {
    match kind {
        DefKind::Application => tags::APPLICATION,
        DefKind::Component => tags::COMPONENT,
        DefKind::Theme => tags::THEME,
        // Callers gate on is_markup().
        DefKind::Style | DefKind::Provider => unreachable!("not a markup kind"),
    }
}

/// Walk body elements, collecting component references and dependency
/// filters in declaration order.
fn collect_body_refs(
    node: &Node,
    children: &mut Vec<Descriptor>,
    dependencies: &mut Vec<DescriptorFilter>,
) -> Result<()> {
    for child in &node.children {
        if child.tag == tags::DEPENDENCY {
            dependencies.push(parse_dependency(child)?);
            continue;
        }
        if child.tag.starts_with(tags::SYSTEM_PREFIX) {
            return Err(DefError::invalid(format!(
                "unknown system tag <{tag}>",
                tag = child.tag
            )));
        }
        children.push(Descriptor::parse(&child.tag, DefKind::Component)?);
        collect_body_refs(child, children, dependencies)?;
    }
    Ok(())
}

fn parse_dependency(node: &Node) -> Result<DescriptorFilter> {
    let kind = match node.attr(attrs::TYPE) {
        None => DefKind::Component,
        Some(value) => DefKind::from_tag(value.as_str()).ok_or_else(|| {
            DefError::invalid(format!(
                "invalid dependency type '{value}'",
                value = value.as_str()
            ))
        })?,
    };
    let resource = node
        .attr(attrs::RESOURCE)
        .ok_or_else(|| DefError::invalid("missing resource attribute on <quill:dependency>"))?;
    DescriptorFilter::parse(resource.as_str(), kind)
}

// ============================================================================
// RESOLVED DEFINITION
// ============================================================================

/// A fully merged definition: attributes and children folded across the
/// entire `extends` chain. Callers never need to re-walk ancestors.
#[derive(Clone, Debug)]
pub struct ResolvedDef {
    descriptor: Descriptor,
    attributes: AttrMap,
    extends: Option<Descriptor>,
    extensible: bool,
    children: Vec<Descriptor>,
    dependencies: Vec<DescriptorFilter>,
    last_modified: Timestamp,
}

impl ResolvedDef {
    /// Merge an unresolved definition with its (already resolved) parent.
    ///
    /// Precedence: the child's own explicit values, including explicit-empty,
    /// always win; inherited children come before own children.
    pub(crate) fn merge(own: Definition, parent: Option<&ResolvedDef>) -> ResolvedDef {
        let (attributes, children, dependencies) = match parent {
            None => (own.attributes, own.children, own.dependencies),
            Some(parent) => {
                let mut attributes = parent.attributes.clone();
                attributes.extend(own.attributes);
                let mut children = parent.children.clone();
                children.extend(own.children);
                let mut dependencies = parent.dependencies.clone();
                dependencies.extend(own.dependencies);
                (attributes, children, dependencies)
            }
        };
        ResolvedDef {
            descriptor: own.descriptor,
            attributes,
            extends: own.extends,
            extensible: own.extensible,
            children,
            dependencies,
            last_modified: own.last_modified,
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> DefKind {
        self.descriptor.kind()
    }

    /// Case-insensitive attribute lookup over the merged map.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name.to_ascii_lowercase().as_str())
    }

    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    /// The immediate `extends` parent, if any.
    pub fn extends(&self) -> Option<&Descriptor> {
        self.extends.as_ref()
    }

    /// Whether this definition may be used as an `extends` base.
    /// Not inherited: each definition opts in on its own.
    pub fn extensible(&self) -> bool {
        self.extensible
    }

    /// All referenced children, inherited first, own appended.
    pub fn children(&self) -> &[Descriptor] {
        &self.children
    }

    pub fn dependencies(&self) -> &[DescriptorFilter] {
        &self.dependencies
    }

    /// The last-modified stamp of this definition's own source.
    pub fn last_modified(&self) -> Timestamp {
        self.last_modified
    }

    /// The effective security provider descriptor.
    ///
    /// Absent falls back to [`DEFAULT_SECURITY_PROVIDER`]; explicit-empty is
    /// a hard error rather than a silent default.
    pub fn security_provider_descriptor(&self) -> Result<Descriptor> {
        match self.attr(attrs::SECURITY_PROVIDER) {
            Some(AttrValue::Empty) => {
                Err(DefError::invalid("QualifiedName is required for descriptors"))
            }
            Some(AttrValue::Text(value)) => Descriptor::parse(value, DefKind::Provider),
            None => Ok(default_provider_descriptor()),
        }
    }

    /// Whether the client app cache is enabled. Lenient: only a literal
    /// `'true'` enables it.
    pub fn appcache_enabled(&self) -> bool {
        self.attr(attrs::USE_APPCACHE).is_some_and(AttrValue::as_bool)
    }

    /// Whether this application is marked as a one-page app. Off by default.
    pub fn one_page_app(&self) -> bool {
        self.attr(attrs::IS_ONE_PAGE_APP).is_some_and(AttrValue::as_bool)
    }

    /// Namespaces this definition marks for preloading.
    pub fn preload_namespaces(&self) -> Vec<SmolStr> {
        match self.attr(attrs::PRELOAD) {
            Some(AttrValue::Text(value)) => value
                .split([',', ' ', '\t'])
                .filter(|s| !s.is_empty())
                .map(SmolStr::new)
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> Source {
        Source::new(text, 1)
    }

    fn app(name: &str) -> Descriptor {
        Descriptor::new("demo", name, DefKind::Application)
    }

    #[test]
    fn test_parse_simple_application() {
        let def = parse_definition(
            &app("home"),
            &source("<quill:application useAppcache='true' preload='demo'/>"),
        )
        .unwrap();

        assert!(def.extends.is_none());
        assert!(!def.extensible);
        assert_eq!(
            def.attributes.get(attrs::USE_APPCACHE),
            Some(&AttrValue::Text("true".into()))
        );
    }

    #[test]
    fn test_parse_extends_and_extensible_removed_from_attrs() {
        let def = parse_definition(
            &app("child"),
            &source("<quill:application extends='demo:base' extensible='true'/>"),
        )
        .unwrap();

        assert_eq!(def.extends, Some(app("base")));
        assert!(def.extensible);
        assert!(!def.attributes.contains_key(attrs::EXTENDS));
        assert!(!def.attributes.contains_key(attrs::EXTENSIBLE));
    }

    #[test]
    fn test_parse_empty_extends_rejected() {
        let err = parse_definition(&app("child"), &source("<quill:application extends=''/>"))
            .unwrap_err();
        assert_eq!(err.to_string(), "QualifiedName is required for descriptors");
    }

    #[test]
    fn test_root_tag_mismatch() {
        let err =
            parse_definition(&app("home"), &source("<quill:component/>")).unwrap_err();
        assert!(err.to_string().contains("expected <quill:application>"));
    }

    #[test]
    fn test_body_children_collected_in_order() {
        let def = parse_definition(
            &app("home"),
            &source("<quill:application><a:one/><b:two/></quill:application>"),
        )
        .unwrap();
        let names: Vec<_> = def.children.iter().map(|d| d.to_string()).collect();
        assert_eq!(names, ["a:one", "b:two"]);
    }

    #[test]
    fn test_dependency_tag_parsed() {
        let def = parse_definition(
            &app("home"),
            &source(
                "<quill:application>\
                 <quill:dependency resource='*://somecrap:*' type='COMPONENT'/>\
                 </quill:application>",
            ),
        )
        .unwrap();
        assert_eq!(def.dependencies.len(), 1);
        assert_eq!(def.dependencies[0].to_string(), "*://somecrap:*[COMPONENT]");
    }

    #[test]
    fn test_style_source_is_leaf() {
        let desc = Descriptor::new("demo", "home", DefKind::Style);
        let def = parse_definition(&desc, &source(".THIS{}")).unwrap();
        assert!(def.attributes.is_empty());
        assert!(def.children.is_empty());
    }

    #[test]
    fn test_merge_child_overrides_parent() {
        let parent = parse_definition(
            &app("base"),
            &source("<quill:application securityProvider='core:allow' extensible='true'/>"),
        )
        .unwrap();
        let parent = ResolvedDef::merge(parent, None);

        let child = parse_definition(
            &app("child"),
            &source("<quill:application extends='demo:base' securityProvider='core:deny'/>"),
        )
        .unwrap();
        let merged = ResolvedDef::merge(child, Some(&parent));

        assert_eq!(
            merged.attr(attrs::SECURITY_PROVIDER),
            Some(&AttrValue::Text("core:deny".into()))
        );
        // extensible is not inherited
        assert!(!merged.extensible());
    }

    #[test]
    fn test_merge_absent_inherits() {
        let parent = parse_definition(
            &app("base"),
            &source("<quill:application useAppcache='true' extensible='true'/>"),
        )
        .unwrap();
        let parent = ResolvedDef::merge(parent, None);

        let child =
            parse_definition(&app("child"), &source("<quill:application extends='demo:base'/>"))
                .unwrap();
        let merged = ResolvedDef::merge(child, Some(&parent));

        assert!(merged.appcache_enabled());
    }

    #[test]
    fn test_merge_explicit_empty_wins() {
        let parent = parse_definition(
            &app("base"),
            &source("<quill:application securityProvider='core:allow' extensible='true'/>"),
        )
        .unwrap();
        let parent = ResolvedDef::merge(parent, None);

        let child = parse_definition(
            &app("child"),
            &source("<quill:application extends='demo:base' securityProvider=''/>"),
        )
        .unwrap();
        let merged = ResolvedDef::merge(child, Some(&parent));

        assert_eq!(merged.attr(attrs::SECURITY_PROVIDER), Some(&AttrValue::Empty));
        assert!(merged.security_provider_descriptor().is_err());
    }

    #[test]
    fn test_security_provider_default() {
        let def = parse_definition(&app("home"), &source("<quill:application/>")).unwrap();
        let def = ResolvedDef::merge(def, None);
        assert_eq!(
            def.security_provider_descriptor().unwrap().qualified_name(),
            DEFAULT_SECURITY_PROVIDER
        );
    }

    #[test]
    fn test_preload_namespaces_split() {
        let def = parse_definition(
            &app("home"),
            &source("<quill:application preload='demo, shared'/>"),
        )
        .unwrap();
        let def = ResolvedDef::merge(def, None);
        let ns: Vec<_> = def.preload_namespaces();
        assert_eq!(ns, ["demo", "shared"]);
    }
}
