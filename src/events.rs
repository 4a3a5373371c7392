//! The event vocabulary of the parser and the sink it publishes to.
//!
//! The parser never materialises a document tree; everything it recognises
//! is pushed, in document order, into an [`EventSink`] as one [`Event`]
//! value per structural item. Pending text is always flushed before any
//! structural event, and within one opening tag the order is
//! `OpenTagStart` → `OpenNamespace`* → `Attribute`* → `OpenTag`.

use crate::errors::ParseError;
use crate::namespace::NsBinding;
use crate::tag::{Attribute, Tag};

/// A structural item recognised in the input stream.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
pub enum Event {
    /// The parser is (re-)initialised and accepts writes.
    Ready,
    /// A run of character data, after trim/normalise when those options are
    /// enabled.
    Text(String),
    /// The raw content of a `<!DOCTYPE …>` declaration, minus delimiters.
    Doctype(String),
    /// A `<?target body?>` processing instruction.
    ProcessingInstruction {
        /// The target, i.e. the first whitespace-delimited token.
        name: String,
        /// Everything after the target with leading whitespace skipped.
        body: String,
    },
    /// An SGML declaration (`<!…>`) that is neither comment, CDATA nor
    /// doctype.
    SgmlDeclaration(String),
    /// A `<![CDATA[` opened.
    OpenCData,
    /// A run of CDATA content. Large sections can be split over several of
    /// these between one `OpenCData`/`CloseCData` pair.
    CData(String),
    /// A `]]>` closed the current CDATA section.
    CloseCData,
    /// The content of a `<!-- … -->` comment, after trim/normalise when
    /// those options are enabled.
    Comment(String),
    /// An opening tag name was completed; attributes are not parsed yet.
    OpenTagStart(Tag),
    /// An attribute was committed on the current opening tag.
    Attribute(Attribute),
    /// A namespace binding came into scope (namespace mode only).
    OpenNamespace(NsBinding),
    /// A namespace binding went out of scope (namespace mode only).
    CloseNamespace(NsBinding),
    /// An opening tag was completed with all attributes resolved.
    OpenTag(Tag),
    /// A tag was closed; carries the tag name.
    CloseTag(String),
    /// The raw content of a `<script>` element (lenient mode only).
    Script(String),
    /// A violation was detected. In strict mode the same error is latched on
    /// the parser until [`resume`] is called.
    ///
    /// [`resume`]: crate::Parser::resume
    Error(ParseError),
    /// The document ended; the parser has reset itself for reuse.
    End,
}

/// The receiving side of the parser.
///
/// Emission is synchronous: the sink is called while [`Parser::write`] is on
/// the stack, so implementations must not call back into the parser.
///
/// [`Parser::write`]: crate::Parser::write
pub trait EventSink {
    /// Receives one event.
    fn event(&mut self, event: Event);
}

/// Collects events in order; the usual sink for tests and for consumers that
/// want to iterate afterwards.
impl EventSink for Vec<Event> {
    fn event(&mut self, event: Event) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn event(&mut self, event: Event) {
        (**self).event(event);
    }
}

/// Adapts a closure to an [`EventSink`].
///
/// ```
/// # use push_xml::{EventSink, Event, SinkFn};
/// let mut count = 0;
/// let mut sink = SinkFn(|event: Event| {
///     if matches!(event, Event::OpenTag(_)) {
///         count += 1;
///     }
/// });
/// sink.event(Event::Ready);
/// ```
pub struct SinkFn<F>(
    /// The wrapped closure, invoked once per event.
    pub F,
);

impl<F: FnMut(Event)> EventSink for SinkFn<F> {
    fn event(&mut self, event: Event) {
        (self.0)(event);
    }
}
