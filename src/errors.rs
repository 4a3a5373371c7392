//! Error management module.
//!
//! Violations are grouped into families mirroring the kind of rule that was
//! broken: [`SyntaxError`] for lexical-level violations, [`IllFormedError`]
//! for structural ones and [`NsError`] for namespace ones. The parser wraps
//! whichever kind occurred into a [`ParseError`] together with the position
//! of the offending character when position tracking is enabled.

use std::fmt;

/// A lexical violation: the character stream itself breaks an XML token rule.
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxError {
    /// Text appeared before the first tag of the document.
    TextBeforeFirstTag,
    /// Non-whitespace text appeared outside the root element.
    TextOutsideRoot,
    /// A `<` in text content was not followed by anything tag-like.
    UnencodedLt,
    /// A `--` sequence appeared inside a comment body.
    MalformedComment,
    /// The character cannot appear in a tag name.
    InvalidTagName,
    /// The character cannot appear in an attribute name.
    InvalidAttribName,
    /// Two attributes were not separated by whitespace.
    MissingWhitespaceBetweenAttributes,
    /// An attribute value was not enclosed in quotes.
    UnquotedAttribValue,
    /// An attribute name was not followed by `=` and a value.
    AttribWithoutValue,
    /// The character cannot appear in an entity name.
    InvalidEntityName,
    /// A character entity did not round-trip to a valid code point.
    InvalidCharacterEntity,
    /// The character cannot appear in a closing tag name.
    InvalidCloseTagName,
    /// Trailing characters appeared after a closing tag name.
    InvalidCharInCloseTag,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TextBeforeFirstTag => f.write_str("Non-whitespace before first tag"),
            Self::TextOutsideRoot => f.write_str("Text data outside of root node"),
            Self::UnencodedLt => f.write_str("Unencoded <"),
            Self::MalformedComment => f.write_str("Malformed comment"),
            Self::InvalidTagName => f.write_str("Invalid character in tag name"),
            Self::InvalidAttribName => f.write_str("Invalid attribute name"),
            Self::MissingWhitespaceBetweenAttributes => {
                f.write_str("No whitespace between attributes")
            }
            Self::UnquotedAttribValue => f.write_str("Unquoted attribute value"),
            Self::AttribWithoutValue => f.write_str("Attribute without value"),
            Self::InvalidEntityName => f.write_str("Invalid character in entity name"),
            Self::InvalidCharacterEntity => f.write_str("Invalid character entity"),
            Self::InvalidCloseTagName => f.write_str("Invalid tagname in closing tag"),
            Self::InvalidCharInCloseTag => f.write_str("Invalid characters in closing tag"),
        }
    }
}

/// A structural violation: tokens are fine but nest or occur incorrectly.
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IllFormedError {
    /// A doctype declaration occurred after the root element opened, or a
    /// second one was seen.
    InappropriateDoctype,
    /// A closing tag did not match the innermost open tag.
    UnexpectedCloseTag,
    /// A closing tag matched nothing on the open-tag stack.
    UnmatchedCloseTag(String),
    /// The document ended while the root element was still open.
    UnclosedRootTag,
    /// A `</>` with no tag name.
    EmptyCloseTag,
    /// A `/` in an opening tag was not followed by `>`.
    SlashNotFollowedByGt,
}

impl fmt::Display for IllFormedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InappropriateDoctype => {
                f.write_str("Inappropriately located doctype declaration")
            }
            Self::UnexpectedCloseTag => f.write_str("Unexpected close tag"),
            Self::UnmatchedCloseTag(name) => write!(f, "Unmatched closing tag: {}", name),
            Self::UnclosedRootTag => f.write_str("Unclosed root tag"),
            Self::EmptyCloseTag => f.write_str("Weird empty close tag"),
            Self::SlashNotFollowedByGt => {
                f.write_str("Forward-slash in opening tag not followed by >")
            }
        }
    }
}

/// A namespace violation (only raised when namespace resolution is enabled).
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NsError {
    /// An element or attribute used a prefix with no binding in scope.
    UnboundPrefix(String),
    /// `xmlns:xml` was bound to something other than the XML namespace URI.
    XmlPrefixRebound(String),
    /// `xmlns:xmlns` was bound to something other than the XMLNS namespace URI.
    XmlnsPrefixRebound(String),
}

impl fmt::Display for NsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnboundPrefix(prefix) => {
                write!(f, "Unbound namespace prefix: {:?}", prefix)
            }
            Self::XmlPrefixRebound(actual) => write!(
                f,
                "xml: prefix must be bound to {}, actual: {}",
                crate::namespace::XML_NAMESPACE,
                actual
            ),
            Self::XmlnsPrefixRebound(actual) => write!(
                f,
                "xmlns: prefix must be bound to {}, actual: {}",
                crate::namespace::XMLNS_NAMESPACE,
                actual
            ),
        }
    }
}

/// The error type used by this crate.
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The input broke a lexical rule.
    Syntax(SyntaxError),
    /// The document structure is ill-formed.
    IllFormed(IllFormedError),
    /// A namespace rule was broken.
    Ns(NsError),
    /// A non-flushable internal buffer outgrew [`MAX_BUFFER_LENGTH`].
    /// Not recoverable without a reset.
    ///
    /// [`MAX_BUFFER_LENGTH`]: crate::MAX_BUFFER_LENGTH
    BufferOverflow(&'static str),
    /// `write` was called on a parser that was already closed.
    WriteAfterClose,
    /// The document ended in the middle of a lexical construct.
    UnexpectedEnd,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Syntax(e) => e.fmt(f),
            Self::IllFormed(e) => e.fmt(f),
            Self::Ns(e) => e.fmt(f),
            Self::BufferOverflow(buffer) => {
                write!(f, "Max buffer length exceeded: {}", buffer)
            }
            Self::WriteAfterClose => f.write_str("Cannot write after close"),
            Self::UnexpectedEnd => f.write_str("Unexpected end"),
        }
    }
}

impl std::error::Error for Error {}

impl From<SyntaxError> for Error {
    #[inline]
    fn from(error: SyntaxError) -> Self {
        Self::Syntax(error)
    }
}

impl From<IllFormedError> for Error {
    #[inline]
    fn from(error: IllFormedError) -> Self {
        Self::IllFormed(error)
    }
}

impl From<NsError> for Error {
    #[inline]
    fn from(error: NsError) -> Self {
        Self::Ns(error)
    }
}

/// A line/column/offset triple maintained when position tracking is enabled.
///
/// Lines and columns are zero-based, `offset` counts consumed characters.
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// Zero-based line of the current character.
    pub line: usize,
    /// Zero-based column of the current character.
    pub column: usize,
    /// Count of characters consumed so far.
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Line: {}\nColumn: {}\nChar: {}",
            self.line, self.column, self.offset
        )
    }
}

/// An error as surfaced through the `error` event and the latched-error slot.
///
/// Carries the position of the offending character when the parser was
/// created with [`Config::track_position`].
///
/// [`Config::track_position`]: crate::Config::track_position
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: Error,
    /// Where it went wrong, if position tracking is enabled.
    pub position: Option<Position>,
}

impl ParseError {
    pub(crate) fn new(kind: Error, position: Option<Position>) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.position {
            Some(position) => write!(f, "{}\n{}", self.kind, position),
            None => self.kind.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// A specialized `Result` type where the error is hard-wired to [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
