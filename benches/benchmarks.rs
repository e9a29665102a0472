// benches/benchmarks.rs — Performance benchmarks (criterion)
//
// Hot paths of one generation request:
//   1. Vector math and batch similarity ranking over a full candidate batch
//   2. Feedback adjustment and diversity passes
//   3. Candidate queries against a populated store

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rusqlite::Connection;

use project_recommender::core::scoring::{
    apply_diversity_boost, apply_feedback_adjustment, ScoredCandidate,
};
use project_recommender::core::types::{ApprovalStatus, Difficulty, Project};
use project_recommender::infra::config::RecommendationConfig;
use project_recommender::learner::types::FeedbackAdjustment;
use project_recommender::memory::schema::run_migrations;
use project_recommender::memory::store::{ProjectFilter, Store};
use project_recommender::ranking::vector::cosine_similarity;
use project_recommender::ranking::{SimilarityOptions, SimilarityRanker};

// ─── Helpers ────────────────────────────────────────────────────────────────

const DIM: usize = 384; // all-MiniLM-L6-v2
const SPECIALIZATIONS: [&str; 5] = ["AI/ML", "Web", "Security", "Systems", "Data"];

fn setup_store() -> Store {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    run_migrations(&conn).expect("run migrations");
    Store::new(conn)
}

fn project(i: usize) -> Project {
    Project {
        id: format!("p-{i:04}"),
        title: format!("Project {i}"),
        abstract_text: "Build and evaluate a prototype system.".into(),
        specialization: SPECIALIZATIONS[i % SPECIALIZATIONS.len()].into(),
        difficulty: Difficulty::ALL[i % Difficulty::ALL.len()],
        tags: vec!["research".into()],
        technology_stack: vec!["Rust".into(), "Python".into()],
        approval_status: if i % 10 == 0 {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::Approved
        },
    }
}

fn vector(seed: usize) -> Vec<f32> {
    (0..DIM).map(|i| ((i * 31 + seed * 17) as f32).sin()).collect()
}

fn candidates(n: usize) -> Vec<ScoredCandidate> {
    (0..n)
        .map(|i| ScoredCandidate::new(project(i), 1.0 - i as f32 / n as f32))
        .collect()
}

// ─── Benchmark: Similarity ──────────────────────────────────────────────────

fn bench_similarity(c: &mut Criterion) {
    let query = vector(0);
    let other = vector(1);
    let batch: Vec<Vec<f32>> = (1..=99).map(vector).collect();
    let ranker = SimilarityRanker::new();

    let mut group = c.benchmark_group("similarity");

    group.bench_function("cosine_similarity_384d", |b| {
        b.iter(|| cosine_similarity(black_box(&query), black_box(&other)))
    });

    group.bench_function("rank_99_candidates", |b| {
        let options = SimilarityOptions::default();
        b.iter(|| ranker.calculate_batch_similarity(black_box(&query), black_box(&batch), &options))
    });

    group.bench_function("rank_99_candidates_thresholded", |b| {
        let options = SimilarityOptions {
            min_threshold: Some(0.3),
            top_k: Some(10),
        };
        b.iter(|| ranker.calculate_batch_similarity(black_box(&query), black_box(&batch), &options))
    });

    group.finish();
}

// ─── Benchmark: Score adjustment passes ─────────────────────────────────────

fn bench_scoring(c: &mut Criterion) {
    let config = RecommendationConfig::default();
    let adjustment = FeedbackAdjustment {
        boost_specializations: ["AI/ML".to_string()].into(),
        penalize_specializations: ["Web".to_string()].into(),
        score_adjustment: 0.1,
        ..Default::default()
    };
    let base = candidates(99);

    let mut group = c.benchmark_group("scoring");

    group.bench_function("feedback_adjustment_99", |b| {
        b.iter(|| {
            let mut cs = base.clone();
            apply_feedback_adjustment(black_box(&mut cs), &adjustment, &config);
        })
    });

    group.bench_function("diversity_99", |b| {
        b.iter(|| {
            let mut cs = base.clone();
            apply_diversity_boost(black_box(&mut cs), config.diversity_bonus);
        })
    });

    group.finish();
}

// ─── Benchmark: Store queries ───────────────────────────────────────────────

fn bench_store(c: &mut Criterion) {
    let store = setup_store();
    for i in 0..500 {
        store.upsert_project(&project(i)).expect("insert project");
    }

    let mut group = c.benchmark_group("store");

    group.bench_function("approved_candidates_500", |b| {
        let filter = ProjectFilter::default();
        b.iter(|| store.query_approved_projects(black_box(&filter)).expect("query"))
    });

    group.bench_function("approved_candidates_filtered", |b| {
        let filter = ProjectFilter {
            exclude_specializations: vec!["Web".into()],
            max_difficulty: Some(Difficulty::Advanced),
            ..Default::default()
        };
        b.iter(|| store.query_approved_projects(black_box(&filter)).expect("query"))
    });

    group.finish();
}

// ─── Main ───────────────────────────────────────────────────────────────────

criterion_group!(benches, bench_similarity, bench_scoring, bench_store);
criterion_main!(benches);
