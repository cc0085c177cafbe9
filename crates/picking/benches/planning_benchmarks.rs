use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, NaiveDate};
use forgewms_inventory::{Location, LocationId, Lot, LotId, ProductId};
use forgewms_picking::{
    LineItemId, LoadId, OrderId, PickTaskId, TaskDraft, ZoneDistanceScorer, allocate, sequence,
};

fn candidate_lots(product_id: ProductId, count: usize) -> Vec<Lot> {
    let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    (0..count)
        .map(|i| {
            // Every fifth lot never expires; the rest are spread over a year.
            let expires_at = (i % 5 != 0).then(|| base + Duration::days((i * 37 % 365) as i64));
            Lot::new(
                LotId::generate(),
                product_id,
                LocationId::generate(),
                (i % 40 + 1) as i64,
                expires_at,
            )
            .expect("valid lot")
        })
        .collect()
}

fn task_drafts(count: usize) -> Vec<TaskDraft> {
    let zones = ["A", "B", "C", "D", "OVERFLOW", "MEZZANINE"];
    let load_id = LoadId::generate();
    (0..count)
        .map(|i| TaskDraft {
            task_id: PickTaskId::generate(),
            load_id,
            order_id: OrderId::generate(),
            line_item_id: LineItemId::generate(),
            product_id: ProductId::generate(),
            lot_id: LotId::generate(),
            location: Location::new(
                LocationId::generate(),
                zones[i % zones.len()],
                (i % 30) as i32,
                (i % 12) as i32,
                (i % 4) as i32,
            )
            .expect("valid location"),
            quantity: 1,
        })
        .collect()
}

fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("fefo_allocate");
    for size in [10usize, 100, 1_000] {
        let product_id = ProductId::generate();
        let lots = candidate_lots(product_id, size);
        let required: i64 = lots.iter().map(|l| l.available_quantity).sum::<i64>() / 2;
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lots, |b, lots| {
            b.iter(|| allocate(black_box(product_id), black_box(required), black_box(lots)))
        });
    }
    group.finish();
}

fn bench_sequence(c: &mut Criterion) {
    let scorer = ZoneDistanceScorer::default();
    let mut group = c.benchmark_group("sequence_load");
    for size in [50usize, 500, 5_000] {
        let drafts = task_drafts(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &drafts, |b, drafts| {
            b.iter(|| sequence(black_box(drafts.clone()), &scorer))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_allocate, bench_sequence);
criterion_main!(benches);
