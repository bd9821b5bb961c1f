extern crate criterion;

use criterion::{criterion_group, criterion_main, Criterion};

use replyquote_lib::{quote_html, rewrite_body_selectors};

fn bench_large_document(c: &mut Criterion) {
    let mut big_html = String::with_capacity(2_000_000);
    big_html.push_str("<html><head><style>body { margin: 0 } p { color: red }</style></head><body>");
    for _ in 0..100_000 {
        big_html.push_str("<p>Test</p>");
    }
    big_html.push_str("</body></html>");

    c.bench_function("large_document", |b| {
        b.iter(|| quote_html(&big_html, "<p>Reply</p>"))
    });
}

fn bench_deep_nesting(c: &mut Criterion) {
    let mut deep_html = String::new();
    for _ in 0..1000 {
        deep_html.push_str("<div>");
    }
    deep_html.push_str("Content");
    for _ in 0..1000 {
        deep_html.push_str("</div>");
    }

    c.bench_function("deep_nesting", |b| b.iter(|| quote_html(&deep_html, "Reply")));
}

fn bench_stylesheet(c: &mut Criterion) {
    let mut css = String::new();
    for i in 0..5_000 {
        css.push_str(&format!(
            "body.c{i} > p {{ color: red; }} @media screen {{ body {{ margin: {i}px; }} }}\n"
        ));
    }

    c.bench_function("stylesheet_rewrite", |b| {
        b.iter(|| rewrite_body_selectors(&css, "div", "quoted_email"))
    });
}

criterion_group!(
    benches,
    bench_large_document,
    bench_deep_nesting,
    bench_stylesheet
);
criterion_main!(benches);
