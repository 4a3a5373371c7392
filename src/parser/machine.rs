//! The per-character dispatch of the lexer and the tag/attribute/namespace
//! commit protocol.
//!
//! Every consumed character drives exactly one transition of the
//! [`State`] machine. Lenient recovery rules live right next to the strict
//! failures they replace, so each `match` arm reads as the full story of one
//! lexical position.

use std::mem::take;
use std::rc::Rc;

use crate::chars::{
    is_attrib_end, is_entity_body, is_entity_start, is_name_body, is_name_start, is_quote,
    is_whitespace,
};
use crate::entities::resolve_entity;
use crate::errors::{Error, IllFormedError, NsError, SyntaxError};
use crate::events::{Event, EventSink};
use crate::namespace::{split_qname, NsScope, XMLNS_NAMESPACE, XML_NAMESPACE};
use crate::tag::{Attribute, Tag};

use super::state::State;
use super::Parser;

impl<S: EventSink> Parser<S> {
    /// Runs the state machine over one chunk.
    pub(super) fn consume(&mut self, chunk: &str) {
        let mut pos = 0;
        while pos < chunk.len() {
            let c = match chunk[pos..].chars().next() {
                Some(c) => c,
                None => break,
            };
            pos += c.len_utf8();
            self.tick(c);

            // Fast path: inside the root, plain text extends to the next
            // structural character, so the whole span is copied in one go
            // instead of char by char.
            if self.state == State::Text
                && self.saw_root
                && !self.closed_root
                && c != '<'
                && c != '&'
            {
                let rest = &chunk[pos..];
                let stop =
                    memchr::memchr2(b'<', b'&', rest.as_bytes()).unwrap_or(rest.len());
                let span = &rest[..stop];
                self.buffers.text_node.push(c);
                self.buffers.text_node.push_str(span);
                for ch in span.chars() {
                    self.tick(ch);
                }
                pos += stop;
                continue;
            }

            self.step(c);
        }
    }

    /// Dispatches one character against the current state.
    fn step(&mut self, c: char) {
        match self.state {
            State::Begin => {
                self.state = State::BeginWhitespace;
                // a leading byte-order mark is skipped, once
                if c != '\u{FEFF}' {
                    self.begin_whitespace(c);
                }
            }

            State::BeginWhitespace => {
                if !is_whitespace(c) {
                    self.begin_whitespace(c);
                }
            }

            State::Text => {
                if c == '<' && !(self.saw_root && self.closed_root && !self.config.strict) {
                    self.state = State::OpenWaka;
                    self.start_tag_position = self.offset;
                } else {
                    if !is_whitespace(c) && (!self.saw_root || self.closed_root) {
                        self.strict_fail_syntax(SyntaxError::TextOutsideRoot);
                    }
                    if c == '&' {
                        self.state = State::TextEntity;
                    } else {
                        self.buffers.text_node.push(c);
                    }
                }
            }

            State::Script => {
                if c == '<' {
                    self.state = State::ScriptEnding;
                } else {
                    self.buffers.script.push(c);
                }
            }

            State::ScriptEnding => {
                if c == '/' {
                    self.state = State::CloseTag;
                } else {
                    self.buffers.script.push('<');
                    self.buffers.script.push(c);
                    self.state = State::Script;
                }
            }

            State::OpenWaka => {
                if c == '!' {
                    self.state = State::SgmlDecl;
                    self.buffers.sgml_decl.clear();
                } else if is_whitespace(c) {
                    // wait for it...
                } else if is_name_start(c) {
                    self.state = State::OpenTag;
                    self.buffers.tag_name.clear();
                    self.buffers.tag_name.push(c);
                } else if c == '/' {
                    self.state = State::CloseTag;
                    self.buffers.tag_name.clear();
                } else if c == '?' {
                    self.state = State::ProcInst;
                    self.buffers.proc_inst_name.clear();
                    self.buffers.proc_inst_body.clear();
                } else {
                    self.strict_fail_syntax(SyntaxError::UnencodedLt);
                    // Re-emit the `<` as text, restoring whatever whitespace
                    // was skipped since it, and resynchronise on text.
                    self.buffers.text_node.push('<');
                    if self.start_tag_position + 1 < self.offset {
                        let pad = self.offset - self.start_tag_position - 1;
                        for _ in 0..pad {
                            self.buffers.text_node.push(' ');
                        }
                    }
                    self.buffers.text_node.push(c);
                    self.state = State::Text;
                }
            }

            State::SgmlDecl => self.sgml_decl(c),

            State::CommentStarting => {
                if c == '-' {
                    self.state = State::Comment;
                    self.buffers.comment.clear();
                    self.buffers.sgml_decl.clear();
                } else {
                    // not a comment after all; restore the pending dash and
                    // rejoin the generic declaration handling
                    self.buffers.sgml_decl.push('-');
                    self.state = State::SgmlDecl;
                    self.sgml_decl(c);
                }
            }

            State::SgmlDeclQuoted => {
                if Some(c) == self.quote {
                    self.state = State::SgmlDecl;
                    self.quote = None;
                }
                self.buffers.sgml_decl.push(c);
            }

            State::Doctype => {
                if c == '>' {
                    self.state = State::Text;
                    let doctype = take(&mut self.buffers.doctype);
                    self.emit_node(Event::Doctype(doctype));
                    self.doctype_seen = true;
                } else {
                    self.buffers.doctype.push(c);
                    if c == '[' {
                        self.state = State::DoctypeDtd;
                    } else if is_quote(c) {
                        self.state = State::DoctypeQuoted;
                        self.quote = Some(c);
                    }
                }
            }

            State::DoctypeQuoted => {
                self.buffers.doctype.push(c);
                if Some(c) == self.quote {
                    self.quote = None;
                    self.state = State::Doctype;
                }
            }

            State::DoctypeDtd => {
                self.buffers.doctype.push(c);
                if c == ']' {
                    self.state = State::Doctype;
                } else if is_quote(c) {
                    self.state = State::DoctypeDtdQuoted;
                    self.quote = Some(c);
                }
            }

            State::DoctypeDtdQuoted => {
                self.buffers.doctype.push(c);
                if Some(c) == self.quote {
                    self.state = State::DoctypeDtd;
                    self.quote = None;
                }
            }

            State::Comment => {
                if c == '-' {
                    self.state = State::CommentEnding;
                } else {
                    self.buffers.comment.push(c);
                }
            }

            State::CommentEnding => {
                if c == '-' {
                    self.state = State::CommentEnded;
                    let comment = take(&mut self.buffers.comment);
                    let comment = self.text_opts(comment);
                    if !comment.is_empty() {
                        self.emit_node(Event::Comment(comment));
                    }
                } else {
                    self.buffers.comment.push('-');
                    self.buffers.comment.push(c);
                    self.state = State::Comment;
                }
            }

            State::CommentEnded => {
                if c != '>' {
                    self.strict_fail_syntax(SyntaxError::MalformedComment);
                    // lenient: `--` inside a comment is literal content
                    self.buffers.comment.push_str("--");
                    self.buffers.comment.push(c);
                    self.state = State::Comment;
                } else {
                    self.state = State::Text;
                }
            }

            State::CData => {
                if c == ']' {
                    self.state = State::CDataEnding;
                } else {
                    self.buffers.cdata.push(c);
                }
            }

            State::CDataEnding => {
                if c == ']' {
                    self.state = State::CDataEnding2;
                } else {
                    self.buffers.cdata.push(']');
                    self.buffers.cdata.push(c);
                    self.state = State::CData;
                }
            }

            State::CDataEnding2 => {
                if c == '>' {
                    if !self.buffers.cdata.is_empty() {
                        let cdata = take(&mut self.buffers.cdata);
                        self.emit_node(Event::CData(cdata));
                    }
                    self.emit_node(Event::CloseCData);
                    self.state = State::Text;
                } else if c == ']' {
                    self.buffers.cdata.push(']');
                } else {
                    self.buffers.cdata.push_str("]]");
                    self.buffers.cdata.push(c);
                    self.state = State::CData;
                }
            }

            State::ProcInst => {
                if c == '?' {
                    self.state = State::ProcInstEnding;
                } else if is_whitespace(c) {
                    self.state = State::ProcInstBody;
                } else {
                    self.buffers.proc_inst_name.push(c);
                }
            }

            State::ProcInstBody => {
                if self.buffers.proc_inst_body.is_empty() && is_whitespace(c) {
                    // leading whitespace between target and body is skipped
                } else if c == '?' {
                    self.state = State::ProcInstEnding;
                } else {
                    self.buffers.proc_inst_body.push(c);
                }
            }

            State::ProcInstEnding => {
                if c == '>' {
                    let name = take(&mut self.buffers.proc_inst_name);
                    let body = take(&mut self.buffers.proc_inst_body);
                    self.emit_node(Event::ProcessingInstruction { name, body });
                    self.state = State::Text;
                } else {
                    self.buffers.proc_inst_body.push('?');
                    self.buffers.proc_inst_body.push(c);
                    self.state = State::ProcInstBody;
                }
            }

            State::OpenTag => {
                if is_name_body(c) {
                    self.buffers.tag_name.push(c);
                } else {
                    self.new_tag();
                    if c == '>' {
                        self.open_tag(false);
                    } else if c == '/' {
                        self.state = State::OpenTagSlash;
                    } else {
                        if !is_whitespace(c) {
                            self.strict_fail_syntax(SyntaxError::InvalidTagName);
                        }
                        self.state = State::Attrib;
                    }
                }
            }

            State::OpenTagSlash => {
                if c == '>' {
                    self.open_tag(true);
                    self.close_tag();
                } else {
                    self.strict_fail(Error::IllFormed(IllFormedError::SlashNotFollowedByGt));
                    self.state = State::Attrib;
                }
            }

            State::Attrib => {
                if is_whitespace(c) {
                    // skip
                } else if c == '>' {
                    self.open_tag(false);
                } else if c == '/' {
                    self.state = State::OpenTagSlash;
                } else if is_name_start(c) {
                    self.buffers.attrib_name.clear();
                    self.buffers.attrib_name.push(c);
                    self.buffers.attrib_value.clear();
                    self.state = State::AttribName;
                } else {
                    self.strict_fail_syntax(SyntaxError::InvalidAttribName);
                }
            }

            State::AttribName => {
                if c == '=' {
                    self.state = State::AttribValue;
                } else if c == '>' {
                    self.strict_fail_syntax(SyntaxError::AttribWithoutValue);
                    // legacy HTML-ish: the value is the name
                    self.buffers.attrib_value = self.buffers.attrib_name.clone();
                    self.commit_attribute();
                    self.open_tag(false);
                } else if is_whitespace(c) {
                    self.state = State::AttribNameSawWhite;
                } else if is_name_body(c) {
                    self.buffers.attrib_name.push(c);
                } else {
                    self.strict_fail_syntax(SyntaxError::InvalidAttribName);
                }
            }

            State::AttribNameSawWhite => {
                if c == '=' {
                    self.state = State::AttribValue;
                } else if is_whitespace(c) {
                    // skip
                } else {
                    self.strict_fail_syntax(SyntaxError::AttribWithoutValue);
                    // commit the dangling name with an empty value
                    self.buffers.attrib_value.clear();
                    self.commit_attribute();
                    if c == '>' {
                        self.open_tag(false);
                    } else if is_name_start(c) {
                        self.buffers.attrib_name.clear();
                        self.buffers.attrib_name.push(c);
                        self.state = State::AttribName;
                    } else {
                        self.strict_fail_syntax(SyntaxError::InvalidAttribName);
                        self.state = State::Attrib;
                    }
                }
            }

            State::AttribValue => {
                if is_whitespace(c) {
                    // skip
                } else if is_quote(c) {
                    self.quote = Some(c);
                    self.state = State::AttribValueQuoted;
                } else {
                    self.strict_fail_syntax(SyntaxError::UnquotedAttribValue);
                    self.state = State::AttribValueUnquoted;
                    self.buffers.attrib_value.clear();
                    self.buffers.attrib_value.push(c);
                }
            }

            State::AttribValueQuoted => {
                if Some(c) != self.quote {
                    if c == '&' {
                        self.state = State::AttribValueEntityQ;
                    } else {
                        self.buffers.attrib_value.push(c);
                    }
                } else {
                    self.commit_attribute();
                    self.quote = None;
                    self.state = State::AttribValueClosed;
                }
            }

            State::AttribValueClosed => {
                if is_whitespace(c) {
                    self.state = State::Attrib;
                } else if c == '>' {
                    self.open_tag(false);
                } else if c == '/' {
                    self.state = State::OpenTagSlash;
                } else if is_name_start(c) {
                    self.strict_fail_syntax(SyntaxError::MissingWhitespaceBetweenAttributes);
                    self.buffers.attrib_name.clear();
                    self.buffers.attrib_name.push(c);
                    self.buffers.attrib_value.clear();
                    self.state = State::AttribName;
                } else {
                    self.strict_fail_syntax(SyntaxError::InvalidAttribName);
                }
            }

            State::AttribValueUnquoted => {
                if !is_attrib_end(c) {
                    if c == '&' {
                        self.state = State::AttribValueEntityU;
                    } else {
                        self.buffers.attrib_value.push(c);
                    }
                } else {
                    self.commit_attribute();
                    if c == '>' {
                        self.open_tag(false);
                    } else {
                        self.state = State::Attrib;
                    }
                }
            }

            State::CloseTag => {
                if self.buffers.tag_name.is_empty() {
                    if is_whitespace(c) {
                        // skip
                    } else if !is_name_start(c) {
                        if !self.buffers.script.is_empty() {
                            self.buffers.script.push_str("</");
                            self.buffers.script.push(c);
                            self.state = State::Script;
                        } else {
                            self.strict_fail_syntax(SyntaxError::InvalidCloseTagName);
                        }
                    } else {
                        self.buffers.tag_name.push(c);
                    }
                } else if c == '>' {
                    self.close_tag();
                } else if is_name_body(c) {
                    self.buffers.tag_name.push(c);
                } else if !self.buffers.script.is_empty() {
                    let name = take(&mut self.buffers.tag_name);
                    self.buffers.script.push_str("</");
                    self.buffers.script.push_str(&name);
                    self.buffers.script.push(c);
                    self.state = State::Script;
                } else {
                    if !is_whitespace(c) {
                        self.strict_fail_syntax(SyntaxError::InvalidCharInCloseTag);
                    }
                    self.state = State::CloseTagSawWhite;
                }
            }

            State::CloseTagSawWhite => {
                if is_whitespace(c) {
                    // skip
                } else if c == '>' {
                    self.close_tag();
                } else {
                    self.strict_fail_syntax(SyntaxError::InvalidCharInCloseTag);
                }
            }

            State::TextEntity | State::AttribValueEntityQ | State::AttribValueEntityU => {
                self.entity(c);
            }
        }
    }

    /// The first non-BOM, non-leading-whitespace character of a document.
    fn begin_whitespace(&mut self, c: char) {
        if c == '<' {
            self.state = State::OpenWaka;
            self.start_tag_position = self.offset;
        } else if !is_whitespace(c) {
            self.strict_fail_syntax(SyntaxError::TextBeforeFirstTag);
            self.buffers.text_node.push(c);
            self.state = State::Text;
        }
    }

    /// A character inside `<!…>` before the declaration kind is known.
    ///
    /// Recognition is by case-insensitive prefix: `[CDATA[` opens a CDATA
    /// section, `DOCTYPE` a doctype; a first `-` is diverted to
    /// [`State::CommentStarting`] before this runs.
    fn sgml_decl(&mut self, c: char) {
        if self.buffers.sgml_decl.is_empty() && c == '-' {
            self.state = State::CommentStarting;
            return;
        }
        let mut with_c = self.buffers.sgml_decl.clone();
        with_c.push(c);
        if with_c.eq_ignore_ascii_case("[CDATA[") {
            self.emit_node(Event::OpenCData);
            self.state = State::CData;
            self.buffers.sgml_decl.clear();
            self.buffers.cdata.clear();
        } else if with_c.eq_ignore_ascii_case("DOCTYPE") {
            self.state = State::Doctype;
            if self.doctype_seen || self.saw_root {
                self.strict_fail(Error::IllFormed(IllFormedError::InappropriateDoctype));
            }
            self.buffers.doctype.clear();
            self.buffers.sgml_decl.clear();
        } else if c == '>' {
            let decl = take(&mut self.buffers.sgml_decl);
            self.emit_node(Event::SgmlDeclaration(decl));
            self.state = State::Text;
        } else if is_quote(c) {
            self.state = State::SgmlDeclQuoted;
            self.buffers.sgml_decl.push(c);
            self.quote = Some(c);
        } else {
            self.buffers.sgml_decl.push(c);
        }
    }

    /// A character of an entity reference, in text or in an attribute value.
    fn entity(&mut self, c: char) {
        let return_state = match self.state {
            State::TextEntity => State::Text,
            State::AttribValueEntityQ => State::AttribValueQuoted,
            _ => State::AttribValueUnquoted,
        };
        if c == ';' {
            let entity = take(&mut self.buffers.entity);
            match resolve_entity(&entity, self.config.strict_entities) {
                Some(resolved) => self.entity_target(return_state).push(resolved),
                None => {
                    self.strict_fail_syntax(SyntaxError::InvalidCharacterEntity);
                    // pass the unrecognised reference through verbatim
                    let target = self.entity_target(return_state);
                    target.push('&');
                    target.push_str(&entity);
                    target.push(';');
                }
            }
            self.state = return_state;
            return;
        }

        let allowed = if self.buffers.entity.is_empty() {
            is_entity_start(c)
        } else {
            is_entity_body(c)
        };
        if allowed {
            self.buffers.entity.push(c);
        } else {
            self.strict_fail_syntax(SyntaxError::InvalidEntityName);
            let entity = take(&mut self.buffers.entity);
            let target = self.entity_target(return_state);
            target.push('&');
            target.push_str(&entity);
            target.push(c);
            self.state = return_state;
        }
    }

    /// The buffer an entity expansion lands in, per the state it returns to.
    fn entity_target(&mut self, return_state: State) -> &mut String {
        if return_state == State::Text {
            &mut self.buffers.text_node
        } else {
            &mut self.buffers.attrib_value
        }
    }

    /// Folds a name according to the lenient casing rule.
    fn fold_case(&self, name: String) -> String {
        if self.config.strict {
            name
        } else if self.config.lowercase {
            name.to_lowercase()
        } else {
            name.to_uppercase()
        }
    }

    /// The namespace scope the current tag would inherit.
    fn parent_ns(&self) -> Rc<NsScope> {
        self.open_tags
            .last()
            .and_then(|tag| tag.ns.clone())
            .unwrap_or_else(|| self.root_ns.clone())
    }

    /// The open-tag name is complete: stage the tag and announce it.
    fn new_tag(&mut self) {
        let name = take(&mut self.buffers.tag_name);
        let name = self.fold_case(name);
        self.buffers.tag_name = name.clone();
        let ns = self.config.xmlns.then(|| self.parent_ns());
        let tag = Tag::staged(name, ns);
        self.current_tag = Some(tag.clone());
        self.attrib_list.clear();
        self.emit_node(Event::OpenTagStart(tag));
    }

    /// An attribute name/value pair is complete.
    ///
    /// Duplicates are dropped silently. In namespace mode the pair is staged
    /// (bindings must all be visible before any URI resolves) and `xmlns`
    /// attributes update the tag's scope copy-on-write; otherwise the
    /// attribute is committed and announced immediately.
    fn commit_attribute(&mut self) {
        let name = take(&mut self.buffers.attrib_name);
        let name = self.fold_case(name);
        let value = take(&mut self.buffers.attrib_value);

        let duplicate = self.attrib_list.iter().any(|(staged, _)| *staged == name)
            || self
                .current_tag
                .as_ref()
                .map_or(false, |tag| tag.attributes.contains(&name));
        if duplicate {
            return;
        }

        if self.config.xmlns {
            let (prefix, local) = split_qname(&name, true);
            let (prefix, local) = (prefix.to_string(), local.to_string());
            if prefix == "xmlns" {
                // a namespace binding; guard the two reserved prefixes
                if local == "xml" && value != XML_NAMESPACE {
                    self.strict_fail(Error::Ns(NsError::XmlPrefixRebound(value.clone())));
                } else if local == "xmlns" && value != XMLNS_NAMESPACE {
                    self.strict_fail(Error::Ns(NsError::XmlnsPrefixRebound(value.clone())));
                } else {
                    let parent = self.parent_ns();
                    if let Some(tag) = self.current_tag.as_mut() {
                        let current = tag.ns.clone().unwrap_or_else(|| parent.clone());
                        let mut scope = if Rc::ptr_eq(&current, &parent) {
                            NsScope::child_of(&parent)
                        } else {
                            (*current).clone()
                        };
                        scope.bind(&local, &value);
                        tag.ns = Some(Rc::new(scope));
                    }
                }
            }
            self.attrib_list.push((name, value));
        } else {
            let attribute = Attribute::plain(name, value);
            if let Some(tag) = self.current_tag.as_mut() {
                tag.attributes.push(attribute.clone());
            }
            self.emit_node(Event::Attribute(attribute));
        }
    }

    /// Completes the current opening tag: qualify it, resolve and announce
    /// staged attributes, push it onto the open-tag stack and announce it.
    fn open_tag(&mut self, self_closing: bool) {
        let mut tag = match self.current_tag.take() {
            Some(tag) => tag,
            None => return,
        };

        if self.config.xmlns {
            let ns = tag.ns.clone().unwrap_or_else(|| self.root_ns.clone());

            let (prefix, local) = split_qname(&tag.name, false);
            let (prefix, local) = (prefix.to_string(), local.to_string());
            let mut uri = ns.resolve(&prefix).unwrap_or("").to_string();
            if !prefix.is_empty() && uri.is_empty() {
                self.strict_fail(Error::Ns(NsError::UnboundPrefix(tag.name.clone())));
                uri = prefix.clone();
            }
            tag.prefix = Some(prefix);
            tag.local = Some(local);
            tag.uri = Some(uri);

            let parent = self.parent_ns();
            if !Rc::ptr_eq(&ns, &parent) {
                for binding in ns.own_bindings().to_vec() {
                    self.emit_node(Event::OpenNamespace(binding));
                }
            }

            for (name, value) in take(&mut self.attrib_list) {
                let (prefix, local) = split_qname(&name, true);
                let (prefix, local) = (prefix.to_string(), local.to_string());
                // attributes never receive the default namespace
                let mut uri = if prefix.is_empty() {
                    String::new()
                } else {
                    ns.resolve(&prefix).unwrap_or("").to_string()
                };
                if !prefix.is_empty() && prefix != "xmlns" && uri.is_empty() {
                    self.strict_fail(Error::Ns(NsError::UnboundPrefix(prefix.clone())));
                    uri = prefix.clone();
                }
                let attribute = Attribute {
                    name,
                    value,
                    prefix: Some(prefix),
                    local: Some(local),
                    uri: Some(uri),
                };
                tag.attributes.push(attribute.clone());
                self.emit_node(Event::Attribute(attribute));
            }
        }

        tag.is_self_closing = self_closing;
        self.saw_root = true;
        self.open_tags.push(tag.clone());
        self.emit_node(Event::OpenTag(tag));

        if !self_closing {
            let script_content = !self.config.strict
                && !self.config.noscript
                && self.buffers.tag_name.to_lowercase() == "script";
            self.state = if script_content {
                State::Script
            } else {
                State::Text
            };
            self.buffers.tag_name.clear();
        }
        self.buffers.attrib_name.clear();
        self.buffers.attrib_value.clear();
        self.attrib_list.clear();
    }

    /// A closing tag is complete: find the matching open tag and pop down to
    /// it, tolerating mismatches in lenient mode.
    fn close_tag(&mut self) {
        if self.buffers.tag_name.is_empty() {
            self.strict_fail(Error::IllFormed(IllFormedError::EmptyCloseTag));
            self.buffers.text_node.push_str("</>");
            self.state = State::Text;
            return;
        }

        if !self.buffers.script.is_empty() {
            // everything but a real `</script>` is literal script content
            if self.buffers.tag_name != "script" {
                let name = take(&mut self.buffers.tag_name);
                self.buffers.script.push_str("</");
                self.buffers.script.push_str(&name);
                self.buffers.script.push('>');
                self.state = State::Script;
                return;
            }
            let script = take(&mut self.buffers.script);
            self.emit_node(Event::Script(script));
        }

        // Make sure the closing tag actually exists before popping anything,
        // otherwise `<a><b></c></b></a>` would close everything.
        let close_to = self.fold_case(self.buffers.tag_name.clone());
        let mut matched = None;
        for index in (0..self.open_tags.len()).rev() {
            if self.open_tags[index].name == close_to {
                matched = Some(index);
                break;
            }
            // every intervening tag is reported; only strict mode latches
            self.tolerated_fail(Error::IllFormed(IllFormedError::UnexpectedCloseTag));
        }

        let matched = match matched {
            Some(index) => index,
            None => {
                let name = take(&mut self.buffers.tag_name);
                self.strict_fail(Error::IllFormed(IllFormedError::UnmatchedCloseTag(
                    name.clone(),
                )));
                self.buffers.text_node.push_str("</");
                self.buffers.text_node.push_str(&name);
                self.buffers.text_node.push('>');
                self.state = State::Text;
                return;
            }
        };

        while self.open_tags.len() > matched {
            let tag = match self.open_tags.pop() {
                Some(tag) => tag,
                None => break,
            };
            self.emit_node(Event::CloseTag(tag.name.clone()));

            if self.config.xmlns {
                let parent = self.parent_ns();
                if let Some(ns) = tag.ns.clone() {
                    if !Rc::ptr_eq(&ns, &parent) {
                        // the bindings this tag introduced go out of scope
                        for binding in ns.own_bindings().to_vec() {
                            self.emit_node(Event::CloseNamespace(binding));
                        }
                    }
                }
            }
        }

        if matched == 0 {
            self.closed_root = true;
        }
        self.buffers.tag_name.clear();
        self.buffers.attrib_name.clear();
        self.buffers.attrib_value.clear();
        self.attrib_list.clear();
        self.state = State::Text;
    }
}
