//! The push parser: lifecycle, buffer management and event emission.
//!
//! A [`Parser`] consumes already-decoded text in arbitrarily sized chunks
//! through [`write`] and synchronously publishes [`Event`]s to its sink.
//! There is no suspension point inside the parser: every `write` processes
//! its whole chunk before returning.
//!
//! [`write`]: Parser::write

use std::mem::take;
use std::rc::Rc;

use crate::chars::is_whitespace;
use crate::errors::{Error, ParseError, Position, Result, SyntaxError};
use crate::events::{Event, EventSink};
use crate::namespace::NsScope;
use crate::parser::state::State;
use crate::tag::Tag;

mod machine;
mod state;

/// Buffers over this length trigger the watchdog: text, CDATA and script
/// content auto-flush as events, any other buffer raises a fatal
/// [`Error::BufferOverflow`].
pub const MAX_BUFFER_LENGTH: usize = 64 * 1024;

/// User-defined settings that affect parsing. Frozen once the parser is
/// constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Emit errors on XML violations instead of silently recovering.
    pub strict: bool,
    /// Strip leading and trailing whitespace from text and comment events.
    pub trim: bool,
    /// Collapse whitespace runs to a single space in text and comment events.
    pub normalize: bool,
    /// In lenient mode, fold tag and attribute names to lowercase instead of
    /// the default uppercase.
    pub lowercase: bool,
    /// Resolve namespaces and emit qualified tags and attributes.
    pub xmlns: bool,
    /// Maintain line/column/offset and annotate errors with them.
    pub track_position: bool,
    /// Restrict named entities to the five predefined XML ones.
    pub strict_entities: bool,
    /// Disable raw `<script>` content handling in lenient mode.
    pub noscript: bool,
}

/// The named text accumulators of the lexer.
///
/// All of them are truncated to empty on reset. The watchdog in
/// [`Parser::check_buffer_length`] keeps each one below
/// [`MAX_BUFFER_LENGTH`].
#[derive(Debug, Default)]
struct Buffers {
    comment: String,
    sgml_decl: String,
    text_node: String,
    tag_name: String,
    doctype: String,
    proc_inst_name: String,
    proc_inst_body: String,
    entity: String,
    attrib_name: String,
    attrib_value: String,
    cdata: String,
    script: String,
}

impl Buffers {
    fn clear(&mut self) {
        self.comment.clear();
        self.sgml_decl.clear();
        self.text_node.clear();
        self.tag_name.clear();
        self.doctype.clear();
        self.proc_inst_name.clear();
        self.proc_inst_body.clear();
        self.entity.clear();
        self.attrib_name.clear();
        self.attrib_value.clear();
        self.cdata.clear();
        self.script.clear();
    }
}

/// A streaming push parser for XML 1.0 with optional SGML-ish leniency.
///
/// Feed it text with [`write`], finish with [`end`] (or [`close`]). Events
/// arrive at the sink while `write` is on the stack. After `end` the parser
/// has reset itself and accepts the next document.
///
/// On a violation in strict mode (and for a handful of fatal conditions in
/// any mode) the error is emitted as [`Event::Error`] and *latched*:
/// subsequent `write`s fail with the same error until [`resume`] is called.
///
/// ```
/// use push_xml::{Config, Event, Parser};
///
/// let mut parser = Parser::with_config(
///     Vec::new(),
///     Config {
///         strict: true,
///         ..Config::default()
///     },
/// );
/// parser.write("<greeting lang=\"en\">hello").unwrap();
/// parser.write(" world</greeting>").unwrap();
/// parser.end().unwrap();
///
/// let events = parser.into_sink();
/// assert!(matches!(events[0], Event::Ready));
/// assert!(events.contains(&Event::Text("hello world".to_string())));
/// ```
///
/// [`write`]: Parser::write
/// [`end`]: Parser::end
/// [`close`]: Parser::close
/// [`resume`]: Parser::resume
#[derive(Debug)]
pub struct Parser<S> {
    sink: S,
    config: Config,
    state: State,
    /// The quote that opened the current quoted region, if any.
    quote: Option<char>,
    error: Option<ParseError>,
    closed: bool,
    ended: bool,
    saw_root: bool,
    closed_root: bool,
    doctype_seen: bool,
    /// Count of characters consumed since the last reset. Always maintained;
    /// the line/column pair additionally requires `track_position`.
    offset: usize,
    line: usize,
    column: usize,
    /// Offset just past the `<` that opened the current tag.
    start_tag_position: usize,
    /// Offset at which the buffer watchdog runs next.
    buffer_check_position: usize,
    buffers: Buffers,
    /// The tag currently being assembled between `opentagstart` and
    /// `opentag`.
    current_tag: Option<Tag>,
    /// All opened tags without a matching close yet; the root is at index 0.
    open_tags: Vec<Tag>,
    /// Attributes staged during an open tag, used only in namespace mode so
    /// every binding is visible before URIs resolve.
    attrib_list: Vec<(String, String)>,
    /// The scope of the implicit document root.
    root_ns: Rc<NsScope>,
}

impl<S: EventSink> Parser<S> {
    /// Creates a lenient parser with default options, publishing to `sink`.
    ///
    /// Fires [`Event::Ready`] immediately.
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, Config::default())
    }

    /// Creates a parser with the given options, publishing to `sink`.
    ///
    /// Fires [`Event::Ready`] immediately. The options cannot be changed
    /// afterwards.
    pub fn with_config(sink: S, config: Config) -> Self {
        let mut parser = Self {
            sink,
            config,
            state: State::Begin,
            quote: None,
            error: None,
            closed: false,
            ended: false,
            saw_root: false,
            closed_root: false,
            doctype_seen: false,
            offset: 0,
            line: 0,
            column: 0,
            start_tag_position: 0,
            buffer_check_position: MAX_BUFFER_LENGTH,
            buffers: Buffers::default(),
            current_tag: None,
            open_tags: Vec::new(),
            attrib_list: Vec::new(),
            root_ns: NsScope::root(),
        };
        parser.emit(Event::Ready);
        parser
    }

    /// Feeds the next chunk of the document.
    ///
    /// Fails immediately if an error is latched or the parser is closed.
    /// Violations detected *inside* the chunk are published as
    /// [`Event::Error`] and latch the parser, but the chunk is still consumed
    /// to its end; the following `write` then fails.
    pub fn write(&mut self, chunk: &str) -> Result<()> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if self.closed {
            return Err(self.raise(Error::WriteAfterClose));
        }
        if !chunk.is_empty() {
            self.ended = false;
        }
        self.consume(chunk);
        if self.offset >= self.buffer_check_position {
            self.check_buffer_length();
        }
        Ok(())
    }

    /// Finishes the document.
    ///
    /// Emits an error for an unclosed root or a construct cut short, flushes
    /// pending text, emits [`Event::End`] and resets every piece of transient
    /// state so the instance can parse the next document. Calling `end` again
    /// without an intervening `write` is a no-op.
    pub fn end(&mut self) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        if self.saw_root && !self.closed_root {
            self.strict_fail(Error::IllFormed(
                crate::errors::IllFormedError::UnclosedRootTag,
            ));
        }
        if !self.state.accepts_end() {
            self.raise(Error::UnexpectedEnd);
        }
        self.close_text();
        self.closed = true;
        self.emit(Event::End);
        self.ended = true;
        self.reset();
        Ok(())
    }

    /// Equivalent to ending the stream: runs [`end`](Parser::end).
    pub fn close(&mut self) -> Result<()> {
        self.end()
    }

    /// Clears a latched error, permitting further writes.
    pub fn resume(&mut self) -> &mut Self {
        self.error = None;
        self
    }

    /// Forces out whatever text, CDATA or script content is buffered.
    pub fn flush(&mut self) {
        self.close_text();
        if !self.buffers.cdata.is_empty() {
            let cdata = take(&mut self.buffers.cdata);
            self.emit_node(Event::CData(cdata));
        }
        if !self.buffers.script.is_empty() {
            let script = take(&mut self.buffers.script);
            self.emit_node(Event::Script(script));
        }
    }

    /// The latched error, if any.
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Whether the parser is currently rejecting writes because it is inside
    /// its end sequence. After the post-`end` reset this is `false` again:
    /// the instance accepts the next document.
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Current position, meaningful when `track_position` is enabled.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }

    /// Zero-based line of the last consumed character, meaningful when
    /// `track_position` is enabled.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Zero-based column of the last consumed character, meaningful when
    /// `track_position` is enabled.
    pub fn column(&self) -> usize {
        self.column
    }

    /// The options this parser was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared access to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Exclusive access to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the parser, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Restores the pristine state, keeping options and sink, and fires
    /// [`Event::Ready`].
    fn reset(&mut self) {
        self.state = State::Begin;
        self.quote = None;
        self.error = None;
        self.closed = false;
        self.saw_root = false;
        self.closed_root = false;
        self.doctype_seen = false;
        self.offset = 0;
        self.line = 0;
        self.column = 0;
        self.start_tag_position = 0;
        self.buffer_check_position = MAX_BUFFER_LENGTH;
        self.buffers.clear();
        self.current_tag = None;
        self.open_tags.clear();
        self.attrib_list.clear();
        self.emit(Event::Ready);
    }

    /// Advances the position accounting for one consumed character.
    fn tick(&mut self, c: char) {
        self.offset += 1;
        if self.config.track_position {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    fn emit(&mut self, event: Event) {
        self.sink.event(event);
    }

    /// Emits a structural event, flushing pending text first.
    fn emit_node(&mut self, event: Event) {
        if !self.buffers.text_node.is_empty() {
            self.close_text();
        }
        self.emit(event);
    }

    /// Applies the text options and emits the pending text node, if any
    /// survives them.
    fn close_text(&mut self) {
        let text = take(&mut self.buffers.text_node);
        let text = self.text_opts(text);
        if !text.is_empty() {
            self.emit(Event::Text(text));
        }
    }

    /// Applies `trim` and `normalize` to a text or comment payload.
    fn text_opts(&self, mut text: String) -> String {
        if self.config.trim {
            text = text.trim_matches(|c| is_whitespace(c)).to_string();
        }
        if self.config.normalize {
            let mut normalized = String::with_capacity(text.len());
            let mut in_whitespace = false;
            for c in text.chars() {
                if is_whitespace(c) {
                    if !in_whitespace {
                        normalized.push(' ');
                    }
                    in_whitespace = true;
                } else {
                    normalized.push(c);
                    in_whitespace = false;
                }
            }
            text = normalized;
        }
        text
    }

    /// Emits an error without latching it, flushing pending text first.
    fn report(&mut self, kind: Error) -> ParseError {
        self.close_text();
        let position = self.config.track_position.then(|| self.position());
        let error = ParseError::new(kind, position);
        self.emit(Event::Error(error.clone()));
        error
    }

    /// Emits an error and latches it. The first latched error wins; later
    /// ones within the same chunk are still emitted but do not replace it.
    fn raise(&mut self, kind: Error) -> ParseError {
        let error = self.report(kind);
        if self.error.is_none() {
            self.error = Some(error.clone());
        }
        error
    }

    /// Reports a tolerated structural mismatch: the error event fires in both
    /// modes, but only strict mode latches it.
    fn tolerated_fail(&mut self, kind: Error) {
        if self.config.strict {
            self.raise(kind);
        } else {
            self.report(kind);
        }
    }

    /// Raises only in strict mode; lenient parsing recovers silently.
    fn strict_fail(&mut self, kind: Error) {
        if self.config.strict {
            self.raise(kind);
        }
    }

    fn strict_fail_syntax(&mut self, kind: SyntaxError) {
        self.strict_fail(Error::Syntax(kind));
    }

    /// Compares every buffer against [`MAX_BUFFER_LENGTH`]. Flushable content
    /// buffers are emitted and reset, anything else overflowing is fatal.
    /// Reschedules itself as late as the largest observed buffer allows.
    fn check_buffer_length(&mut self) {
        let max_allowed = MAX_BUFFER_LENGTH.max(10);
        let mut max_actual = 0;

        let text_len = self.buffers.text_node.len();
        if text_len > max_allowed {
            self.close_text();
        }
        max_actual = max_actual.max(text_len);

        let cdata_len = self.buffers.cdata.len();
        if cdata_len > max_allowed {
            let cdata = take(&mut self.buffers.cdata);
            self.emit_node(Event::CData(cdata));
        }
        max_actual = max_actual.max(cdata_len);

        let script_len = self.buffers.script.len();
        if script_len > max_allowed {
            let script = take(&mut self.buffers.script);
            self.emit_node(Event::Script(script));
        }
        max_actual = max_actual.max(script_len);

        let fatal = [
            ("comment", self.buffers.comment.len()),
            ("sgmlDecl", self.buffers.sgml_decl.len()),
            ("tagName", self.buffers.tag_name.len()),
            ("doctype", self.buffers.doctype.len()),
            ("procInstName", self.buffers.proc_inst_name.len()),
            ("procInstBody", self.buffers.proc_inst_body.len()),
            ("entity", self.buffers.entity.len()),
            ("attribName", self.buffers.attrib_name.len()),
            ("attribValue", self.buffers.attrib_value.len()),
        ];
        for (name, len) in fatal {
            if len > max_allowed {
                self.raise(Error::BufferOverflow(name));
            }
            max_actual = max_actual.max(len);
        }

        // Schedule the next check as late as possible while still guaranteed
        // not to miss the next overflow.
        self.buffer_check_position = self.offset + MAX_BUFFER_LENGTH.saturating_sub(max_actual);
    }
}
