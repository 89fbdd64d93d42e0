// Benchmarks for DOM → Markdown conversion and tree rendering.

use criterion::{criterion_group, criterion_main, Criterion};
use mdbridge::{
    dom_to_markdown, dom_to_tree, format_node, spin, tree_to_html, Dialect, Options, RenderOptions,
};

const WYSIWYG: &str = "<h2 data-block=\"0\" data-marker=\"#\">Notes</h2>\
    <p data-block=\"0\">This is a <strong data-marker=\"**\">simple</strong> document \
    with <em data-marker=\"*\">inline</em> markup and a <a href=\"https://example.com\">link</a>.</p>\
    <ul data-tight=\"true\" data-marker=\"*\" data-block=\"0\">\
    <li data-marker=\"*\">one</li><li data-marker=\"*\">two</li><li data-marker=\"*\">three</li></ul>\
    <blockquote data-block=\"0\"><p data-block=\"0\">quoted <code data-marker=\"`\">code</code></p></blockquote>\
    <table data-block=\"0\"><thead><tr><th>a</th><th align=\"right\">b</th></tr></thead>\
    <tbody><tr><td>1</td><td align=\"right\">2</td></tr></tbody></table>";

fn large_document() -> String {
    WYSIWYG.repeat(200)
}

fn bench_simple(c: &mut Criterion) {
    let html = "<h1>Hello</h1><p>This is a <strong>simple</strong> document.</p>";
    c.bench_function("html_simple_document", |b| {
        b.iter(|| dom_to_markdown(html, Dialect::Html).unwrap());
    });
}

fn bench_wysiwyg(c: &mut Criterion) {
    c.bench_function("wysiwyg_to_markdown", |b| {
        b.iter(|| dom_to_markdown(WYSIWYG, Dialect::Wysiwyg).unwrap());
    });
    let large = large_document();
    c.bench_function("wysiwyg_to_markdown_large", |b| {
        b.iter(|| dom_to_markdown(&large, Dialect::Wysiwyg).unwrap());
    });
    c.bench_function("wysiwyg_spin", |b| {
        b.iter(|| spin(WYSIWYG, Dialect::Wysiwyg, &Options::default()).unwrap());
    });
}

fn bench_render(c: &mut Criterion) {
    let tree = dom_to_tree(&large_document(), Dialect::Wysiwyg, &Options::default()).unwrap();
    let options = RenderOptions::default();
    c.bench_function("tree_to_html_large", |b| {
        b.iter(|| tree_to_html(&tree, &options).unwrap());
    });
    let first = tree.children(tree.root()).nth(1).unwrap();
    c.bench_function("format_single_node", |b| {
        b.iter(|| format_node(&tree, first, &options).unwrap());
    });
}

criterion_group!(benches, bench_simple, bench_wysiwyg, bench_render);
criterion_main!(benches);
