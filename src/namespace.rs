//! Namespace binding scopes and qualified-name handling.
//!
//! Every open tag carries exactly one [`NsScope`]. A tag that introduces no
//! bindings shares its parent's scope (`Rc` identity); the first `xmlns` or
//! `xmlns:p` attribute on a tag creates a fresh child scope chained to the
//! parent, so `opennamespace`/`closenamespace` events can enumerate exactly
//! the bindings the tag introduced.

use std::rc::Rc;

/// The namespace URI the `xml` prefix is permanently bound to.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace URI the `xmlns` prefix is permanently bound to.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A namespace declaration. Can either bind a namespace to a prefix or define
/// the current default namespace (empty prefix).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
pub struct NsBinding {
    /// The bound prefix; empty for the default namespace.
    pub prefix: String,
    /// The namespace name (the URI).
    pub uri: String,
}

/// One element's namespace scope.
///
/// Bindings introduced by the element live here in source order; everything
/// inherited is reachable through the parent link. Resolution walks own
/// bindings first, then up the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NsScope {
    parent: Option<Rc<NsScope>>,
    bindings: Vec<NsBinding>,
}

impl NsScope {
    /// The scope of the implicit document root: `xml` and `xmlns` bound to
    /// their well-known URIs.
    pub(crate) fn root() -> Rc<Self> {
        Rc::new(Self {
            parent: None,
            bindings: vec![
                NsBinding {
                    prefix: "xml".to_string(),
                    uri: XML_NAMESPACE.to_string(),
                },
                NsBinding {
                    prefix: "xmlns".to_string(),
                    uri: XMLNS_NAMESPACE.to_string(),
                },
            ],
        })
    }

    /// A fresh scope with no own bindings, chained to `parent`.
    pub(crate) fn child_of(parent: &Rc<NsScope>) -> Self {
        Self {
            parent: Some(Rc::clone(parent)),
            bindings: Vec::new(),
        }
    }

    /// Adds or overwrites an own binding.
    pub(crate) fn bind(&mut self, prefix: &str, uri: &str) {
        match self.bindings.iter_mut().find(|b| b.prefix == prefix) {
            Some(binding) => binding.uri = uri.to_string(),
            None => self.bindings.push(NsBinding {
                prefix: prefix.to_string(),
                uri: uri.to_string(),
            }),
        }
    }

    /// Resolves a prefix to the URI it is bound to in this scope, walking the
    /// parent chain. An empty prefix resolves the default namespace.
    ///
    /// Returns `None` if the prefix has no binding at all; an empty string
    /// means the prefix was explicitly unbound with `xmlns:p=""`.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        if let Some(binding) = self.bindings.iter().rev().find(|b| b.prefix == prefix) {
            return Some(&binding.uri);
        }
        self.parent.as_deref().and_then(|p| p.resolve(prefix))
    }

    /// The bindings this scope introduced itself, in source order.
    pub fn own_bindings(&self) -> &[NsBinding] {
        &self.bindings
    }
}

/// Splits a potentially qualified name on the *first* `:` into
/// `(prefix, local)`.
///
/// An unprefixed name has an empty prefix. The attribute literal `xmlns`
/// splits to `("xmlns", "")` so namespace declarations and ordinary
/// attributes take the same path.
pub(crate) fn split_qname(name: &str, attribute: bool) -> (&str, &str) {
    if attribute && name == "xmlns" {
        return ("xmlns", "");
    }
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}
