use criterion::{self, criterion_group, criterion_main, Criterion};
use push_xml::{Config, Event, EventSink, Parser};

static LOREM_IPSUM_TEXT: &str =
"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt
ut labore et dolore magna aliqua. Hac habitasse platea dictumst vestibulum rhoncus est pellentesque.
Risus ultricies tristique nulla aliquet enim tortor at. Fermentum odio eu feugiat pretium nibh ipsum.
Volutpat sed cras ornare arcu dui. Scelerisque fermentum dui faucibus in ornare quam. Arcu cursus
euismod quis viverra nibh cras pulvinar mattis. Sed viverra tellus in hac habitasse platea. Quis
commodo odio aenean sed. Cursus in hac habitasse platea dictumst quisque sagittis purus.";

/// A sink that only counts, so emission cost stays out of the picture.
struct Counter {
    tags: usize,
    texts: usize,
}

impl EventSink for Counter {
    fn event(&mut self, event: Event) {
        match event {
            Event::OpenTag(_) => self.tags += 1,
            Event::Text(_) => self.texts += 1,
            _ => {}
        }
    }
}

fn synthetic_document(items: usize) -> String {
    let mut document = String::from("<feed xmlns:m=\"urn:m\">");
    for i in 0..items {
        document.push_str(&format!(
            "<item id=\"{}\" m:kind=\"entry\"><title>entry &amp; {}</title><body>{}</body></item>",
            i, i, LOREM_IPSUM_TEXT
        ));
    }
    document.push_str("</feed>");
    document
}

/// Benchmarks the whole write/end cycle over a markup-dense document.
fn parse_document(c: &mut Criterion) {
    let document = synthetic_document(100);
    let mut group = c.benchmark_group("parse_document");

    group.bench_function("lenient", |b| {
        b.iter(|| {
            let mut parser = Parser::new(Counter { tags: 0, texts: 0 });
            parser.write(criterion::black_box(&document)).unwrap();
            parser.end().unwrap();
            assert_eq!(parser.sink().tags, 301);
        })
    });

    group.bench_function("strict", |b| {
        b.iter(|| {
            let mut parser = Parser::with_config(
                Counter { tags: 0, texts: 0 },
                Config {
                    strict: true,
                    ..Config::default()
                },
            );
            parser.write(criterion::black_box(&document)).unwrap();
            parser.end().unwrap();
            assert_eq!(parser.sink().tags, 301);
        })
    });

    group.bench_function("strict + xmlns", |b| {
        b.iter(|| {
            let mut parser = Parser::with_config(
                Counter { tags: 0, texts: 0 },
                Config {
                    strict: true,
                    xmlns: true,
                    ..Config::default()
                },
            );
            parser.write(criterion::black_box(&document)).unwrap();
            parser.end().unwrap();
            assert_eq!(parser.sink().tags, 301);
        })
    });
    group.finish();
}

/// Benchmarks the bulk text scan: one huge text node, almost no markup.
fn parse_text_heavy(c: &mut Criterion) {
    let mut document = String::from("<doc>");
    for _ in 0..200 {
        document.push_str(LOREM_IPSUM_TEXT);
    }
    document.push_str("</doc>");

    let mut group = c.benchmark_group("parse_text_heavy");
    group.bench_function("bulk scan", |b| {
        b.iter(|| {
            let mut parser = Parser::new(Counter { tags: 0, texts: 0 });
            parser.write(criterion::black_box(&document)).unwrap();
            parser.end().unwrap();
            assert_eq!(parser.sink().tags, 1);
        })
    });

    group.bench_function("chunked by 64", |b| {
        let chunks: Vec<&str> = document
            .as_bytes()
            .chunks(64)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect();
        b.iter(|| {
            let mut parser = Parser::new(Counter { tags: 0, texts: 0 });
            for chunk in criterion::black_box(&chunks) {
                parser.write(chunk).unwrap();
            }
            parser.end().unwrap();
            assert_eq!(parser.sink().tags, 1);
        })
    });
    group.finish();
}

criterion_group!(benches, parse_document, parse_text_heavy);
criterion_main!(benches);
