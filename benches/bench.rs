// Criterion benchmarks for Intern Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use intern_match::core::{default_catalog, filter_catalog, normalize_skills, Matcher};
use intern_match::models::{CatalogFilter, InternshipPosting};

const SKILL_POOL: &[&str] = &[
    "React", "JavaScript", "CSS", "TypeScript", "Node.js", "PostgreSQL", "Docker", "Python",
    "Machine Learning", "Pandas", "Kubernetes", "AWS", "Figma", "Linux", "Go", "Rust",
];

fn create_posting(id: usize) -> InternshipPosting {
    let required_skills = (0..4)
        .map(|k| SKILL_POOL[(id * 3 + k * 5) % SKILL_POOL.len()].to_string())
        .collect();

    InternshipPosting {
        id: id.to_string(),
        title: format!("Intern {}", id),
        company: format!("Company {}", id % 37),
        location: ["Remote", "Pune", "Delhi", "Hybrid"][id % 4].to_string(),
        domain: ["Web Dev", "Backend", "Data Science", "DevOps"][id % 4].to_string(),
        description: String::new(),
        required_skills,
    }
}

fn user_skills() -> Vec<String> {
    vec!["react".into(), "CSS".into(), "Python".into(), "docker".into(), "Rust".into()]
}

fn bench_default_catalog(c: &mut Criterion) {
    let matcher = Matcher::new();
    let catalog = default_catalog().unwrap();
    let skills = user_skills();

    c.bench_function("rank_default_catalog", |b| {
        b.iter(|| matcher.rank(black_box(&skills), black_box(&catalog)));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let matcher = Matcher::new();
    let skills = user_skills();

    let mut group = c.benchmark_group("ranking");

    for posting_count in [10, 100, 1000, 10000].iter() {
        let catalog: Vec<InternshipPosting> = (0..*posting_count).map(create_posting).collect();

        group.bench_with_input(
            BenchmarkId::new("rank", posting_count),
            posting_count,
            |b, _| {
                b.iter(|| matcher.rank(black_box(&skills), black_box(&catalog)));
            },
        );
    }

    group.finish();
}

fn bench_catalog_filter(c: &mut Criterion) {
    let catalog: Vec<InternshipPosting> = (0..1000).map(create_posting).collect();
    let filter = CatalogFilter {
        q: Some("intern 1".to_string()),
        location: Some("Remote".to_string()),
        domain: Some("all".to_string()),
    };

    c.bench_function("filter_catalog_1000_postings", |b| {
        b.iter(|| filter_catalog(black_box(&catalog), black_box(&filter)));
    });
}

fn bench_normalize_skills(c: &mut Criterion) {
    let raw: Vec<String> = SKILL_POOL
        .iter()
        .chain(SKILL_POOL.iter())
        .map(|s| format!("  {}  ", s.to_lowercase()))
        .collect();

    c.bench_function("normalize_skills", |b| {
        b.iter(|| normalize_skills(black_box(&raw)));
    });
}

criterion_group!(
    benches,
    bench_default_catalog,
    bench_ranking,
    bench_catalog_filter,
    bench_normalize_skills
);

criterion_main!(benches);
