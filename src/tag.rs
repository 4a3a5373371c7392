//! Tags and their attribute collections.

use std::ops::Index;
use std::rc::Rc;

use crate::namespace::NsScope;

/// A single parsed attribute.
///
/// The namespace triple (`prefix`, `local`, `uri`) is populated only when the
/// parser runs with [`Config::xmlns`]; in plain mode an attribute is just a
/// name/value pair.
///
/// [`Config::xmlns`]: crate::Config::xmlns
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
pub struct Attribute {
    /// The attribute name exactly as written (after case folding in lenient
    /// mode).
    pub name: String,
    /// The attribute value with entities already resolved.
    pub value: String,
    /// The namespace prefix, empty if the name was unprefixed.
    pub prefix: Option<String>,
    /// The local part of the name.
    pub local: Option<String>,
    /// The resolved namespace URI, empty if the name binds to no namespace.
    pub uri: Option<String>,
}

impl Attribute {
    /// An attribute as produced in plain (non-namespace) mode.
    pub fn plain(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            prefix: None,
            local: None,
            uri: None,
        }
    }

    /// An attribute as produced in namespace mode.
    pub fn qualified(
        name: impl Into<String>,
        value: impl Into<String>,
        prefix: impl Into<String>,
        local: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            prefix: Some(prefix.into()),
            local: Some(local.into()),
            uri: Some(uri.into()),
        }
    }
}

/// An ordered collection of the attributes of one tag.
///
/// Preserves source order (which is also emission order of the `attribute`
/// events) and offers lookup by name. Duplicate names never reach this
/// collection; the parser drops them at commit time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    /// Looks an attribute up by its (qualified) name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name == name)
    }

    /// Checks whether an attribute with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates the attributes in source order.
    pub fn iter(&self) -> std::slice::Iter<Attribute> {
        self.0.iter()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }
}

impl Index<usize> for Attributes {
    type Output = Attribute;

    fn index(&self, index: usize) -> &Attribute {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An element as staged by `opentagstart` and completed by `opentag`.
///
/// Like [`Attribute`], the namespace fields are populated only in namespace
/// mode. Equality ignores the namespace scope chain; scope changes are
/// observable through the `opennamespace`/`closenamespace` events instead.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
pub struct Tag {
    /// The tag name (after case folding in lenient mode).
    pub name: String,
    /// The namespace prefix, empty if the name was unprefixed.
    pub prefix: Option<String>,
    /// The local part of the name.
    pub local: Option<String>,
    /// The resolved namespace URI.
    pub uri: Option<String>,
    /// Whether the tag was written `<name/>`.
    pub is_self_closing: bool,
    /// The committed attributes in source order.
    pub attributes: Attributes,
    #[cfg_attr(feature = "serde-types", serde(skip))]
    pub(crate) ns: Option<Rc<NsScope>>,
}

impl Tag {
    /// Creates a plain tag value; mostly useful to compare against emitted
    /// events.
    pub fn new(name: impl Into<String>) -> Self {
        Self::staged(name.into(), None)
    }

    /// Creates a namespace-qualified tag value.
    pub fn qualified(
        name: impl Into<String>,
        prefix: impl Into<String>,
        local: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        let mut tag = Self::new(name);
        tag.prefix = Some(prefix.into());
        tag.local = Some(local.into());
        tag.uri = Some(uri.into());
        tag
    }

    /// Replaces the attributes, consuming and returning the tag.
    pub fn with_attributes<I: IntoIterator<Item = Attribute>>(mut self, attributes: I) -> Self {
        self.attributes = attributes.into_iter().collect();
        self
    }

    /// Marks the tag self-closing, consuming and returning it.
    pub fn self_closing(mut self) -> Self {
        self.is_self_closing = true;
        self
    }

    pub(crate) fn staged(name: String, ns: Option<Rc<NsScope>>) -> Self {
        Self {
            name,
            prefix: None,
            local: None,
            uri: None,
            is_self_closing: false,
            attributes: Attributes::default(),
            ns,
        }
    }

    /// The namespace scope in effect for this tag, when namespace mode is on.
    pub fn ns(&self) -> Option<&NsScope> {
        self.ns.as_deref()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.prefix == other.prefix
            && self.local == other.local
            && self.uri == other.uri
            && self.is_self_closing == other.is_self_closing
            && self.attributes == other.attributes
    }
}

impl Eq for Tag {}
