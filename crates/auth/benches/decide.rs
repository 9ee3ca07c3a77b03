use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use libris_auth::{decide, Action, Permission, Resource};

fn permission_set(size: usize) -> Vec<Permission> {
    let resources = [Resource::BOOKS, Resource::USERS, Resource::ROLES, Resource::PERMISSIONS];
    (0..size)
        .map(|i| {
            let resource = resources[i % resources.len()].clone();
            // Leave MANAGE out so a miss scans the whole set.
            let action = Action::ALL[i % 4];
            Permission::new(&format!("P_{i}"), resource, action, "", Utc::now()).expect("permission")
        })
        .collect()
}

fn bench_decide(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");
    for size in [4usize, 20, 200] {
        let perms = permission_set(size);
        let missing = Resource::new("AUDIT").expect("resource");
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("hit", size), &perms, |b, perms| {
            b.iter(|| decide(black_box(perms), black_box(&Resource::BOOKS), black_box(Action::Create)))
        });
        group.bench_with_input(BenchmarkId::new("miss", size), &perms, |b, perms| {
            b.iter(|| decide(black_box(perms), black_box(&missing), black_box(Action::Read)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decide);
criterion_main!(benches);
