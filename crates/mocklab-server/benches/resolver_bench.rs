use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mocklab_server::fixture::{
    parse_query_string, FixtureGrammar, HttpMethod, LayeredResolver, NameShape, OverlayState,
    QueryParams, RequestDescriptor,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Build a tree with `count` resources, each with an index, an exact file,
/// a query fixture and a POST variant.
fn build_tree(root: &Path, count: usize) {
    for i in 0..count {
        let dir = root.join(format!("resource{i}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.json"), r#"{"ok":true}"#).unwrap();
        fs::write(dir.join("[id=5]-status-404.json"), "{}").unwrap();
        fs::write(dir.join("index-method-post-status-201.json"), "{}").unwrap();
        fs::write(root.join(format!("item{i}-delay-0.json")), "{}").unwrap();
    }
    fs::write(root.join("[*].json"), "{}").unwrap();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    for count in [10, 100, 500].iter() {
        let tmp = TempDir::new().unwrap();
        let mocks = tmp.path().join("mocks");
        build_tree(&mocks, *count);
        let resolver = LayeredResolver::new(
            mocks,
            tmp.path().join("overlays"),
            Arc::new(OverlayState::default()),
        );

        let index = RequestDescriptor::new("/resource0", HttpMethod::Get, QueryParams::new());
        let query =
            RequestDescriptor::new("/resource0", HttpMethod::Get, parse_query_string(Some("id=5")));
        let exact = RequestDescriptor::new("/item1", HttpMethod::Get, QueryParams::new());
        let wildcard = RequestDescriptor::new("/unknown", HttpMethod::Get, QueryParams::new());

        group.throughput(Throughput::Elements(1));
        for (name, request) in [
            ("index", &index),
            ("query", &query),
            ("exact", &exact),
            ("wildcard", &wildcard),
        ] {
            group.bench_with_input(BenchmarkId::new(name, count), count, |b, _| {
                b.iter(|| resolver.resolve(black_box(request)));
            });
        }
    }

    group.finish();
}

fn bench_grammar(c: &mut Criterion) {
    let mut group = c.benchmark_group("grammar");

    group.bench_function("compile_exact", |b| {
        b.iter(|| FixtureGrammar::new(NameShape::ExactName(black_box("users")), "json"));
    });

    let grammar = FixtureGrammar::new(NameShape::ExactQueryValue, "json").unwrap();
    group.bench_function("parse_query_value", |b| {
        b.iter(|| grammar.parse(black_box("[id=5]-method-post-delay-100-status-201.json")));
    });

    group.finish();
}

criterion_group!(benches, bench_resolution, bench_grammar);
criterion_main!(benches);
