//! Attribute values on definitions.
//!
//! The distinction between an *absent* attribute and an *explicitly empty*
//! one is load-bearing throughout resolution: absent inherits from an
//! ancestor (or defaults), explicit-empty deliberately unsets. Absence is
//! modeled as absence from the [`AttrMap`]; this enum only covers the two
//! explicit states.

use indexmap::IndexMap;
use smol_str::SmolStr;

/// An explicitly written attribute value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum AttrValue {
    /// Written as `attr=''`, deliberately empty.
    Empty,
    /// Written as `attr='text'`.
    Text(SmolStr),
}

impl AttrValue {
    /// The textual content; `Empty` reads as `""`.
    pub fn as_str(&self) -> &str {
        match self {
            AttrValue::Empty => "",
            AttrValue::Text(s) => s,
        }
    }

    /// The textual content, or `None` for explicit-empty.
    pub fn text(&self) -> Option<&str> {
        match self {
            AttrValue::Empty => None,
            AttrValue::Text(s) => Some(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AttrValue::Empty)
    }

    /// Lenient boolean coercion: exactly `"true"` is true, everything else
    /// (including `Empty` and values like `"yes"`) is false.
    pub fn as_bool(&self) -> bool {
        self.as_str() == "true"
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            AttrValue::Empty
        } else {
            AttrValue::Text(SmolStr::new(s))
        }
    }
}

/// Attribute map of a definition.
///
/// Keys are stored lowercased (attribute names are case-insensitive) and
/// insertion order is preserved, though no semantics attach to it.
pub type AttrMap = IndexMap<SmolStr, AttrValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_vs_text() {
        assert_eq!(AttrValue::from(""), AttrValue::Empty);
        assert_eq!(AttrValue::from("x"), AttrValue::Text("x".into()));
        assert_eq!(AttrValue::Empty.text(), None);
        assert_eq!(AttrValue::from("x").text(), Some("x"));
    }

    #[test]
    fn test_bool_coercion() {
        assert!(AttrValue::from("true").as_bool());
        assert!(!AttrValue::from("false").as_bool());
        assert!(!AttrValue::from("yes").as_bool());
        assert!(!AttrValue::from("TRUE").as_bool());
        assert!(!AttrValue::Empty.as_bool());
    }
}
