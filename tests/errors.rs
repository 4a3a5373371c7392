//! Error latching, resumption, position annotation and buffer limits.

use push_xml::{
    Config, Error, Event, IllFormedError, ParseError, Parser, Position, SyntaxError,
    MAX_BUFFER_LENGTH,
};

fn strict() -> Config {
    Config {
        strict: true,
        ..Config::default()
    }
}

mod latching {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_blocks_following_writes() {
        let mut parser = Parser::with_config(Vec::new(), strict());
        parser.write("<a><b>").unwrap();
        // the error is detected inside this chunk, which is still consumed
        parser.write("</c>").unwrap();
        assert!(parser.error().is_some());

        let refused = parser.write("</b>");
        assert_eq!(
            refused.unwrap_err().kind,
            Error::IllFormed(IllFormedError::UnexpectedCloseTag)
        );
    }

    #[test]
    fn resume_clears_the_latch() {
        let mut parser = Parser::with_config(Vec::new(), strict());
        parser.write("<a><b>").unwrap();
        parser.write("</c>").unwrap();
        assert!(parser.write("</b>").is_err());

        parser.resume();
        assert!(parser.error().is_none());
        parser.write("</b></a>").unwrap();
        parser.end().unwrap();

        let closes: Vec<_> = parser
            .into_sink()
            .into_iter()
            .filter_map(|e| match e {
                Event::CloseTag(name) => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(closes, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn lenient_reports_do_not_latch() {
        let mut parser = Parser::new(Vec::new());
        parser.write("<a><b></c>").unwrap();
        assert!(parser.error().is_none());
        parser.write("</b></a>").unwrap();
        parser.end().unwrap();
    }

    #[test]
    fn end_still_completes_while_latched() {
        let mut parser = Parser::with_config(Vec::new(), strict());
        parser.write("<a>&nope;").unwrap();
        assert!(parser.error().is_some());
        parser.end().unwrap();
        assert!(parser.sink().contains(&Event::End));
    }
}

mod positions {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tracking() -> Config {
        Config {
            strict: true,
            track_position: true,
            ..Config::default()
        }
    }

    #[test]
    fn parser_reports_line_column_offset() {
        let mut parser = Parser::with_config(Vec::new(), tracking());
        parser.write("<a>\nxy").unwrap();
        assert_eq!(
            parser.position(),
            Position {
                line: 1,
                column: 2,
                offset: 6,
            }
        );
        assert_eq!(parser.line(), 1);
        assert_eq!(parser.column(), 2);
    }

    #[test]
    fn errors_carry_the_position() {
        let mut parser = Parser::with_config(Vec::new(), tracking());
        parser.write("<a>\n&bad;</a>").unwrap();

        let error = parser
            .sink()
            .iter()
            .find_map(|e| match e {
                Event::Error(error) => Some(error.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            error,
            ParseError {
                kind: Error::Syntax(SyntaxError::InvalidCharacterEntity),
                position: Some(Position {
                    line: 1,
                    column: 5,
                    offset: 9,
                }),
            }
        );
        assert_eq!(
            error.to_string(),
            "Invalid character entity\nLine: 1\nColumn: 5\nChar: 9"
        );
    }

    #[test]
    fn untracked_errors_have_no_position() {
        let mut parser = Parser::with_config(Vec::new(), strict());
        parser.write("<a>&bad;</a>").unwrap();
        let error = parser.error().unwrap();
        assert_eq!(error.position, None);
    }
}

mod buffers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn oversized_text_flushes_in_pieces() {
        let mut parser = Parser::with_config(Vec::new(), strict());
        let big = "x".repeat(MAX_BUFFER_LENGTH + 1024);
        parser.write("<a>").unwrap();
        parser.write(&big).unwrap();
        // the watchdog flushed the oversized buffer as a text event already
        assert!(parser
            .sink()
            .iter()
            .any(|e| matches!(e, Event::Text(t) if t.len() > MAX_BUFFER_LENGTH)));

        parser.write("tail</a>").unwrap();
        parser.end().unwrap();

        let text: String = parser
            .into_sink()
            .into_iter()
            .filter_map(|e| match e {
                Event::Text(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(text.len(), big.len() + "tail".len());
        assert!(text.ends_with("tail"));
    }

    #[test]
    fn oversized_cdata_flushes_between_open_and_close() {
        let mut parser = Parser::with_config(Vec::new(), strict());
        let big = "y".repeat(MAX_BUFFER_LENGTH + 1024);
        parser.write("<a><![CDATA[").unwrap();
        parser.write(&big).unwrap();
        parser.write("z]]></a>").unwrap();
        parser.end().unwrap();

        let events = parser.into_sink();
        let open = events
            .iter()
            .position(|e| matches!(e, Event::OpenCData))
            .unwrap();
        let close = events
            .iter()
            .position(|e| matches!(e, Event::CloseCData))
            .unwrap();
        let chunks: Vec<usize> = events
            .iter()
            .enumerate()
            .filter_map(|(i, e)| matches!(e, Event::CData(_)).then(|| i))
            .collect();
        assert!(chunks.len() >= 2, "large CDATA should split");
        assert!(chunks.iter().all(|&i| open < i && i < close));
    }

    #[test]
    fn oversized_comment_is_fatal() {
        let mut parser = Parser::with_config(Vec::new(), strict());
        let big = "c".repeat(MAX_BUFFER_LENGTH + 1024);
        parser.write("<a><!--").unwrap();
        parser.write(&big).unwrap();

        let error = parser.error().expect("overflow should latch");
        assert_eq!(error.kind, Error::BufferOverflow("comment"));
        assert!(parser.write("-->").is_err());
    }
}
