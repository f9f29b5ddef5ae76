//! Converter and save-path benchmarks
//!
//! Run with: `cargo bench -p problem-admin-core`
//!
//! - Markdown → Document parsing of a long problem statement
//! - Document → Markdown serialization of the same statement
//! - Problem upsert with tag reconciliation on a file database

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use problem_admin_core::db::{DatabaseService, ProblemStore, TursoStore};
use problem_admin_core::markdown::{deserialize, serialize};
use problem_admin_core::{ProblemPayload, ProblemService, TagService};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Generate a statement with `sections` headed sections
fn generate_statement(sections: usize) -> String {
    let mut md = String::new();
    for i in 0..sections {
        let depth = (i % 3) + 1;
        md.push_str(&format!("{} Part {}\n\n", "#".repeat(depth), i + 1));
        md.push_str(&format!(
            "Given **{}** integers $a_1, \\dots, a_n$, find the *minimum* of `f(x)`.\n\n",
            i + 1
        ));
        md.push_str("* first constraint\n* second constraint\n\n");
        md.push_str("```python\ndef solve(nums):\n    return min(nums)\n```\n\n");
        md.push_str("$$\\sum_{i=1}^{n} a_i \\le 10^9$$\n\n");
    }
    md
}

fn bench_deserialize(c: &mut Criterion) {
    let md = generate_statement(100);
    c.bench_function("deserialize_100_sections", |b| {
        b.iter(|| deserialize(black_box(&md)))
    });
}

fn bench_serialize(c: &mut Criterion) {
    let doc = deserialize(&generate_statement(100));
    c.bench_function("serialize_100_sections", |b| {
        b.iter(|| serialize(black_box(&doc)))
    });
}

fn bench_save_problem(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let temp_dir = TempDir::new().unwrap();

    let (problems, tag_ids) = rt.block_on(async {
        let db = Arc::new(
            DatabaseService::new(temp_dir.path().join("bench.db"))
                .await
                .unwrap(),
        );
        let store: Arc<dyn ProblemStore> = Arc::new(TursoStore::new(db));
        let tags = TagService::new(store.clone());

        let mut tag_ids = Vec::new();
        for i in 0..10 {
            tag_ids.push(tags.create_tag(Some(&format!("tag-{}", i))).await.unwrap().id);
        }
        (ProblemService::new(store), tag_ids)
    });

    let description = generate_statement(10);
    let mut round = 0usize;

    c.bench_function("save_problem_rotating_tags", |b| {
        b.iter(|| {
            round += 1;
            let start = round % tag_ids.len();
            let payload = ProblemPayload {
                slug: Some("bench-problem".to_string()),
                title: Some("Bench".to_string()),
                description: Some(description.clone()),
                tag_ids: Some(tag_ids[start..].iter().take(3).cloned().collect()),
                ..Default::default()
            };
            rt.block_on(problems.save_problem(black_box(payload))).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_deserialize,
    bench_serialize,
    bench_save_problem
);
criterion_main!(benches);
