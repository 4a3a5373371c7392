//! Streaming push-style SAX parser for XML 1.0, with optional SGML-ish
//! leniency.
//!
//! ## Description
//!
//! - [`Parser`]: a push parser; feed it already-decoded text in chunks of any
//!   size, it synchronously emits structural [`Event`]s to an [`EventSink`]
//! - no document tree is ever built; the consumer decides what model, if
//!   any, to construct from the event stream
//!
//! By default the parser is *lenient*: it mimics the forgiving behaviour of
//! browser HTML parsers (case folding, unquoted attributes, recovery from
//! mismatched closing tags, raw `<script>` content). With
//! [`Config::strict`] every violation is reported through [`Event::Error`]
//! and latches the parser until [`Parser::resume`].
//!
//! ## Examples
//!
//! ```rust
//! use push_xml::{Event, Parser};
//!
//! let mut parser = Parser::new(Vec::new());
//!
//! // chunk boundaries may fall anywhere, even inside a tag
//! parser.write("<greeting lang=\"en\">Hello, ").unwrap();
//! parser.write("<em>world</em>!</greeting>").unwrap();
//! parser.end().unwrap();
//!
//! let mut text = String::new();
//! let mut tags = 0;
//! for event in parser.into_sink() {
//!     match event {
//!         Event::OpenTag(tag) => {
//!             tags += 1;
//!             if tag.name == "GREETING" {
//!                 // lenient mode folds names to uppercase
//!                 assert_eq!(tag.attributes.get("LANG").unwrap().value, "en");
//!             }
//!         }
//!         Event::Text(t) => text.push_str(&t),
//!         _ => {}
//!     }
//! }
//! assert_eq!(tags, 2);
//! assert_eq!(text, "Hello, world!");
//! ```
//!
//! Namespace resolution is opt-in and produces qualified tags and
//! attributes plus paired `opennamespace`/`closenamespace` events:
//!
//! ```rust
//! use push_xml::{Config, Event, Parser};
//!
//! let mut parser = Parser::with_config(
//!     Vec::new(),
//!     Config {
//!         strict: true,
//!         xmlns: true,
//!         ..Config::default()
//!     },
//! );
//! parser.write(r#"<root xmlns:p="urn:x"><p:child/></root>"#).unwrap();
//! parser.end().unwrap();
//!
//! for event in parser.into_sink() {
//!     if let Event::OpenTag(tag) = &event {
//!         if tag.name == "p:child" {
//!             assert_eq!(tag.prefix.as_deref(), Some("p"));
//!             assert_eq!(tag.local.as_deref(), Some("child"));
//!             assert_eq!(tag.uri.as_deref(), Some("urn:x"));
//!         }
//!     }
//! }
//! ```
#![cfg_attr(
    feature = "document-features",
    doc = ::document_features::document_features!()
)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chars;

pub mod entities;
pub mod errors;
pub mod events;
pub mod namespace;
pub mod parser;
pub mod tag;

// reexports
pub use errors::{Error, IllFormedError, NsError, ParseError, Position, Result, SyntaxError};
pub use events::{Event, EventSink, SinkFn};
pub use namespace::{NsBinding, NsScope, XMLNS_NAMESPACE, XML_NAMESPACE};
pub use parser::{Config, Parser, MAX_BUFFER_LENGTH};
pub use tag::{Attribute, Attributes, Tag};
