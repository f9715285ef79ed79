//! Benchmarks for parsing and render-tree building.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mdview_renderer::{
    DefaultDelegate, RegexHighlighter, StyleSheet, TreeBuilder, parse_markdown,
};

/// Generate markdown content with specified structure.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 50 + headings * paragraphs_per_section * 250);
    md.push_str("# Document Title\n\n");

    for i in 0..headings {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "Paragraph {j} in section {i} has **bold**, *italic*, `code` and a [link](https://example.com/{i}).\n\n"
            ));
        }
        md.push_str("1. first\n2. second\n   - nested\n   - items\n3. third\n\n");
        md.push_str("> quoted text\n\n![diagram](img/diagram.png#320x200)\n\n");
    }
    md
}

fn bench_build_by_size(c: &mut Criterion) {
    let builder = TreeBuilder::new(StyleSheet::default());
    let mut group = c.benchmark_group("build_by_size");

    for (headings, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(headings, paragraphs);
        let nodes = parse_markdown(&markdown);

        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("nodes", format!("{headings}h_{paragraphs}p")),
            &nodes,
            |b, nodes| b.iter(|| builder.build(black_box(nodes))),
        );
    }

    group.finish();
}

fn bench_parse_and_build(c: &mut Criterion) {
    let builder = TreeBuilder::new(StyleSheet::default());
    let markdown = generate_markdown(20, 3);

    c.bench_function("parse_and_build_20_sections", |b| {
        b.iter(|| builder.build(&parse_markdown(black_box(&markdown))));
    });
}

fn bench_code_blocks(c: &mut Criterion) {
    let markdown = r#"# Code

```rust
fn main() {
    let x = 42; // answer
    for i in 0..10 {
        println!("{}", i * x);
    }
}
```

```python
def greet(name):
    return "Hello, " + name
```
"#;
    let nodes = parse_markdown(markdown);
    let plain = TreeBuilder::new(StyleSheet::default());
    let highlighted = TreeBuilder::new(StyleSheet::default()).with_delegate(Arc::new(
        DefaultDelegate::new().with_highlighter(Arc::new(RegexHighlighter::default())),
    ));

    let mut group = c.benchmark_group("code_blocks");
    group.bench_function("plain", |b| b.iter(|| plain.build(black_box(&nodes))));
    group.bench_function("highlighted", |b| {
        b.iter(|| highlighted.build(black_box(&nodes)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build_by_size,
    bench_parse_and_build,
    bench_code_blocks
);
criterion_main!(benches);
