use criterion::{Criterion, criterion_group, criterion_main};
use modelpool::{Filter, Model, Pool, PoolConfig};
use std::hint::black_box;

#[derive(Clone, Default)]
pub struct Position(pub i32);

#[derive(Clone, Default)]
pub struct Velocity(pub i32);

#[derive(Clone)]
pub struct Frozen;

fn populate(count: u32) -> Pool {
    let mut pool = Pool::with_config(PoolConfig::new().with_model_capacity(count as usize + 1));

    for i in 0..count {
        let mut view = pool.create_with((Position(i as i32),));
        if i % 2 == 0 {
            view.add(Velocity(1)).unwrap();
        }
        if i % 10 == 0 {
            view.add(Frozen).unwrap();
        }
    }

    pool
}

fn bench_get_set(c: &mut Criterion) {
    let mut pool = populate(1_000);
    let mut view = pool.create();

    c.bench_function("view add/get", |b| {
        b.iter(|| {
            view.add(Velocity(black_box(3))).unwrap();
            black_box(view.get::<Velocity>().unwrap());
        })
    });

    c.bench_function("table get", |b| {
        let table = pool.table();
        b.iter(|| {
            for raw in 1..=1_000 {
                black_box(table.get::<Position>(Model::from_raw(raw)).ok());
            }
        })
    });
}

fn bench_growth(c: &mut Criterion) {
    c.bench_function("create 10k models", |b| {
        b.iter(|| {
            let mut pool = Pool::with_config(PoolConfig::new().with_model_capacity(0));
            for i in 0..10_000 {
                pool.create_with((Position(i),));
            }
            black_box(pool.len());
        })
    });
}

fn bench_query(c: &mut Criterion) {
    let pool = populate(10_000);
    let moving = Filter::new()
        .with::<Position>()
        .with::<Velocity>()
        .without::<Frozen>();

    c.bench_function("query with/without", |b| {
        b.iter(|| black_box(pool.query_models(&moving).unwrap().len()))
    });
}

criterion_group!(benches, bench_get_set, bench_growth, bench_query);
criterion_main!(benches);
