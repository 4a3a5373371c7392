//! Namespace resolution: bindings, qualified names, scope pairing.

use pretty_assertions::assert_eq;
use push_xml::{
    Attribute, Config, Error, Event, NsBinding, NsError, ParseError, Tag, XMLNS_NAMESPACE,
};

mod helpers;
use helpers::{body, parse_with};

fn xmlns_strict() -> Config {
    Config {
        strict: true,
        xmlns: true,
        ..Config::default()
    }
}

fn xmlns_lenient() -> Config {
    // uppercase folding would mangle `xmlns:` declarations, so namespace
    // processing in lenient mode goes together with `lowercase`
    Config {
        xmlns: true,
        lowercase: true,
        ..Config::default()
    }
}

fn binding(prefix: &str, uri: &str) -> NsBinding {
    NsBinding {
        prefix: prefix.to_string(),
        uri: uri.to_string(),
    }
}

#[test]
fn prefix_binding_qualifies_descendants() {
    assert_eq!(
        body(parse_with(
            r#"<root xmlns:p="urn:x"><p:c/></root>"#,
            xmlns_strict()
        )),
        vec![
            Event::OpenTagStart(Tag::new("root")),
            Event::OpenNamespace(binding("p", "urn:x")),
            Event::Attribute(Attribute::qualified(
                "xmlns:p",
                "urn:x",
                "xmlns",
                "p",
                XMLNS_NAMESPACE
            )),
            Event::OpenTag(Tag::qualified("root", "", "root", "").with_attributes([
                Attribute::qualified("xmlns:p", "urn:x", "xmlns", "p", XMLNS_NAMESPACE)
            ])),
            Event::OpenTagStart(Tag::new("p:c")),
            Event::OpenTag(Tag::qualified("p:c", "p", "c", "urn:x").self_closing()),
            Event::CloseTag("p:c".to_string()),
            Event::CloseTag("root".to_string()),
            Event::CloseNamespace(binding("p", "urn:x")),
        ]
    );
}

#[test]
fn default_namespace_applies_to_elements_not_attributes() {
    let events = body(parse_with(
        r#"<root xmlns="urn:d" a="1"><child/></root>"#,
        xmlns_strict(),
    ));

    let open_tags: Vec<&Tag> = events
        .iter()
        .filter_map(|e| match e {
            Event::OpenTag(tag) => Some(tag),
            _ => None,
        })
        .collect();
    assert_eq!(open_tags[0].uri.as_deref(), Some("urn:d"));
    assert_eq!(open_tags[1].uri.as_deref(), Some("urn:d"));

    // the plain attribute does not pick up the default namespace
    let attr = open_tags[0].attributes.get("a").unwrap();
    assert_eq!(attr.uri.as_deref(), Some(""));
    assert_eq!(attr.local.as_deref(), Some("a"));
}

#[test]
fn namespace_events_pair_in_lifo_order() {
    let events = body(parse_with(
        r#"<a xmlns:x="urn:1"><b xmlns:y="urn:2"/></a>"#,
        xmlns_strict(),
    ));

    let scoped: Vec<(bool, String)> = events
        .iter()
        .filter_map(|e| match e {
            Event::OpenNamespace(b) => Some((true, b.prefix.clone())),
            Event::CloseNamespace(b) => Some((false, b.prefix.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        scoped,
        vec![
            (true, "x".to_string()),
            (true, "y".to_string()),
            (false, "y".to_string()),
            (false, "x".to_string()),
        ]
    );
}

#[test]
fn inner_binding_shadows_outer() {
    let events = body(parse_with(
        r#"<a xmlns:p="urn:outer"><b xmlns:p="urn:inner"><p:c/></b><p:d/></a>"#,
        xmlns_strict(),
    ));

    let uri_of = |name: &str| {
        events.iter().find_map(|e| match e {
            Event::OpenTag(tag) if tag.name == name => tag.uri.clone(),
            _ => None,
        })
    };
    assert_eq!(uri_of("p:c").as_deref(), Some("urn:inner"));
    assert_eq!(uri_of("p:d").as_deref(), Some("urn:outer"));
}

#[test]
fn sibling_of_binder_does_not_inherit() {
    let events = body(parse_with(
        r#"<a><b xmlns:p="urn:x"/><p:c/></a>"#,
        xmlns_lenient(),
    ));
    // the binding closed with <b>, so <p:c> is unbound and falls back to
    // its prefix as URI
    let unbound = events.iter().find_map(|e| match e {
        Event::OpenTag(tag) if tag.name == "p:c" => tag.uri.clone(),
        _ => None,
    });
    assert_eq!(unbound.as_deref(), Some("p"));
}

#[test]
fn unbound_prefix_is_strict_failure() {
    let events = body(parse_with("<p:a/>", xmlns_strict()));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Error(ParseError {
            kind: Error::Ns(NsError::UnboundPrefix(_)),
            ..
        })
    )));
    // lenient fallback still qualifies with the prefix itself
    let tag = events
        .iter()
        .find_map(|e| match e {
            Event::OpenTag(tag) => Some(tag.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(tag.uri.as_deref(), Some("p"));
}

#[test]
fn unbound_attribute_prefix_is_strict_failure() {
    let events = body(parse_with(r#"<a q:b="1"/>"#, xmlns_strict()));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Error(ParseError {
            kind: Error::Ns(NsError::UnboundPrefix(_)),
            ..
        })
    )));
    let attr = events
        .iter()
        .find_map(|e| match e {
            Event::Attribute(a) => Some(a.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(attr.uri.as_deref(), Some("q"));
}

#[test]
fn xml_prefix_must_keep_its_uri() {
    let events = body(parse_with(
        r#"<a xmlns:xml="urn:wrong"/>"#,
        xmlns_strict(),
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Error(ParseError {
            kind: Error::Ns(NsError::XmlPrefixRebound(_)),
            ..
        })
    )));

    let events = body(parse_with(
        r#"<a xmlns:xml="http://www.w3.org/XML/1998/namespace"/>"#,
        xmlns_strict(),
    ));
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::Error(_))));
}

#[test]
fn xmlns_prefix_must_keep_its_uri() {
    let events = body(parse_with(
        r#"<a xmlns:xmlns="urn:wrong"/>"#,
        xmlns_strict(),
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Error(ParseError {
            kind: Error::Ns(NsError::XmlnsPrefixRebound(_)),
            ..
        })
    )));
}

#[test]
fn duplicate_attributes_are_dropped_in_namespace_mode() {
    let events = body(parse_with(r#"<a b="1" b="2"/>"#, xmlns_strict()));
    let values: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            Event::Attribute(a) if a.name == "b" => Some(a.value.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(values, vec!["1".to_string()]);
}

#[test]
fn attribute_events_wait_for_all_bindings() {
    // the binding appears after the attribute that needs it; resolution must
    // still succeed because attributes are staged until the tag completes
    let events = body(parse_with(
        r#"<a p:b="1" xmlns:p="urn:x"/>"#,
        xmlns_strict(),
    ));
    let attr = events
        .iter()
        .find_map(|e| match e {
            Event::Attribute(a) if a.name == "p:b" => Some(a.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(attr.uri.as_deref(), Some("urn:x"));
    assert!(!events.iter().any(|e| matches!(
        e,
        Event::Error(ParseError {
            kind: Error::Ns(_),
            ..
        })
    )));
}

#[test]
fn deep_qualified_name_splits_on_first_colon() {
    let events = body(parse_with(r#"<p:a:b xmlns:p="urn:x"/>"#, xmlns_lenient()));
    let tag = events
        .iter()
        .find_map(|e| match e {
            Event::OpenTag(tag) => Some(tag.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(tag.prefix.as_deref(), Some("p"));
    assert_eq!(tag.local.as_deref(), Some("a:b"));
    assert_eq!(tag.uri.as_deref(), Some("urn:x"));
}
