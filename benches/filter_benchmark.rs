use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pollen_mapper::models::{AgeType, PollenDataset, PollenRecord};
use pollen_mapper::processors::{DatasetMerger, FilterQuery, RecordFilter};

// Create test data for benchmarking
fn create_test_records(site_count: usize, samples_per_site: usize) -> Vec<PollenRecord> {
    let taxa = ["Pinus", "Quercus", "Picea", "Betula", "Ambrosia"];
    let mut records = Vec::with_capacity(site_count * samples_per_site * taxa.len());

    for site_id in 0..site_count {
        let latitude = 40.0 + (site_id as f64) * 0.05;
        let longitude = -95.0 - (site_id as f64) * 0.05;

        for sample in 0..samples_per_site {
            let age = (sample as f64) * 100.0;

            for (t, taxon) in taxa.iter().enumerate() {
                records.push(PollenRecord::new(
                    format!("Site {}", site_id),
                    latitude,
                    longitude,
                    age,
                    AgeType::CalendarYearsBp,
                    taxon.to_string(),
                    (5.0 + t as f32 * 3.0) % 100.0,
                ));
            }
        }
    }

    records
}

fn benchmark_record_filter(c: &mut Criterion) {
    let records = create_test_records(50, 100);
    let filter = RecordFilter::new();
    let query = FilterQuery::new(5000.0, "Pinus");

    c.bench_function("record_filter", |b| {
        b.iter(|| {
            let selected = filter.apply(black_box(&records), black_box(&query));
            black_box(selected.len())
        })
    });
}

fn benchmark_filter_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_scaling");

    for site_count in [10, 50, 200] {
        let records = create_test_records(site_count, 50);
        let filter = RecordFilter::new();
        let query = FilterQuery::new(2500.0, "Quercus");

        group.bench_with_input(
            BenchmarkId::from_parameter(site_count),
            &records,
            |b, records| {
                b.iter(|| filter.apply(black_box(records), black_box(&query)).len())
            },
        );
    }

    group.finish();
}

fn benchmark_dataset_merger(c: &mut Criterion) {
    let a = create_test_records(25, 50);
    let b_records = create_test_records(25, 50); // identical: worst case for dedup

    c.bench_function("dataset_merger", |b| {
        b.iter(|| {
            let merger = DatasetMerger::new();
            let outcome = merger.merge(vec![
                PollenDataset::from_records(a.clone()),
                PollenDataset::from_records(b_records.clone()),
            ]);
            black_box(outcome.dataset.len())
        })
    });
}

criterion_group!(
    benches,
    benchmark_record_filter,
    benchmark_filter_scaling,
    benchmark_dataset_merger
);
criterion_main!(benches);
