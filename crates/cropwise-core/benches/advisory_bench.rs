//! # Advisory Benchmarks
//!
//! Performance benchmarks for retrieval and crop suggestion.
//!
//! Run with: `cargo bench -p cropwise-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use cropwise_core::{
    CropSuggester, DatasetKind, FeatureVector, KnowledgeBase, ReferenceTable, Table,
    retrieve_context,
};
use std::hint::black_box;

const CROPS: [&str; 4] = ["Wheat", "Rice", "Corn", "Soybean"];

/// Create a farmer table with N synthetic rows.
fn create_farmer_table(size: usize) -> Table {
    Table::from_rows(
        [
            "Crop_Type",
            "Soil_pH",
            "Soil_Moisture",
            "Temperature_C",
            "Rainfall_mm",
            "Crop_Yield_ton",
            "Sustainability_Score",
        ],
        (0..size).map(|i| {
            let f = i as f64;
            vec![
                CROPS[i % CROPS.len()].to_string(),
                format!("{:.2}", 5.0 + (f * 0.37) % 3.5),
                format!("{:.2}", 10.0 + (f * 1.3) % 50.0),
                format!("{:.2}", 15.0 + (f * 0.7) % 20.0),
                format!("{:.2}", 60.0 + (f * 3.1) % 300.0),
                format!("{:.2}", 1.0 + (f * 0.11) % 9.0),
                format!("{:.2}", (f * 7.3) % 100.0),
            ]
        }),
    )
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_kb_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kb_build");

    for size in [100, 1000, 10000].iter() {
        let table = create_farmer_table(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(KnowledgeBase::build(DatasetKind::Farmer, &table)));
        });
    }

    group.finish();
}

fn bench_retrieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve_context");

    for size in [100, 1000, 10000].iter() {
        let kb = KnowledgeBase::build(DatasetKind::Farmer, &create_farmer_table(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(retrieve_context("rice soil moisture yield", &kb, 3)));
        });
    }

    group.finish();
}

fn bench_suggest(c: &mut Criterion) {
    let mut group = c.benchmark_group("crop_suggestion");
    let input = FeatureVector::new(6.5, 30.0, 22.0, 150.0);

    for size in [100, 1000, 10000].iter() {
        let reference =
            ReferenceTable::from_table(&create_farmer_table(*size)).expect("reference");
        let suggester = CropSuggester::new(reference);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(suggester.find_crop_suggestion_with_guidance(&input)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kb_build, bench_retrieve, bench_suggest);

criterion_main!(benches);
