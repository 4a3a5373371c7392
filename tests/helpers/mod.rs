//! Helpers shared by the integration tests.
#![allow(dead_code)] // not every test binary uses every helper

use push_xml::{Config, Event, Parser};

/// Runs one document through a parser with the given options and returns
/// every emitted event, including the `Ready`/`End` lifecycle markers.
pub fn parse_with(input: &str, config: Config) -> Vec<Event> {
    let mut parser = Parser::with_config(Vec::new(), config);
    let _ = parser.write(input);
    let _ = parser.end();
    parser.into_sink()
}

/// Lenient parse with default options.
pub fn parse(input: &str) -> Vec<Event> {
    parse_with(input, Config::default())
}

/// Strict parse.
pub fn parse_strict(input: &str) -> Vec<Event> {
    parse_with(
        input,
        Config {
            strict: true,
            ..Config::default()
        },
    )
}

/// Strips the `Ready` and `End` lifecycle events, leaving just the document
/// body, which keeps expected sequences readable.
pub fn body(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| !matches!(event, Event::Ready | Event::End))
        .collect()
}

/// Strict parse reduced to the document body.
pub fn strict_body(input: &str) -> Vec<Event> {
    body(parse_strict(input))
}

/// Lenient parse reduced to the document body.
pub fn lenient_body(input: &str) -> Vec<Event> {
    body(parse(input))
}
