//! Per-file pipeline benchmark: DOT text → graph → feature row.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graph_features::corpus::{Label, WorkItem};
use graph_features::features::build_row;
use graph_features::graph::{parse_dot, BehaviorGraph, DotAnalytics};
use std::fmt::Write;
use std::path::PathBuf;

/// Ring of `n` call sites with a chord every seventh node; strongly connected.
fn call_graph_dot(n: usize) -> String {
    let mut src = String::from("digraph calls {\n  node [shape=box];\n");
    for i in 0..n {
        let _ = writeln!(src, "  \"sub_{:06x}\" -> \"sub_{:06x}\";", i, (i + 1) % n);
        if i % 7 == 0 {
            let _ = writeln!(src, "  \"sub_{:06x}\" -> \"sub_{:06x}\";", i, (i * 31 + 3) % n);
        }
    }
    src.push_str("}\n");
    src
}

fn bench_parse(c: &mut Criterion) {
    let src = call_graph_dot(500);
    c.bench_function("parse_dot_500_nodes", |b| {
        b.iter(|| parse_dot(black_box(&src)).unwrap())
    });
}

fn bench_build_row(c: &mut Criterion) {
    let item = WorkItem::new(PathBuf::from("Malicious/bench.dot"), Label::Malicious);
    let mut g = c.benchmark_group("build_row_by_nodes");
    for n in [50, 200, 800] {
        let doc = parse_dot(&call_graph_dot(n)).unwrap();
        let graph = BehaviorGraph::from_document(&doc);
        g.bench_function(format!("nodes_{}", n).as_str(), |b| {
            b.iter(|| build_row(&DotAnalytics, &item, black_box(&graph)).unwrap())
        });
    }
    g.finish();
}

criterion_group!(benches, bench_parse, bench_build_row);
criterion_main!(benches);
