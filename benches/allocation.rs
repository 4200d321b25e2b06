//! Benchmarks for the Relief Hub allocation engine.
//!
//! ## What is measured
//!
//! | Group             | Operation                                      |
//! |-------------------|------------------------------------------------|
//! | `plan_forward`    | one pool spread over N waiting requests        |
//! | `plan_reverse`    | one request drained from N pools               |
//! | `service_commit`  | create + allocate + commit on the memory store |
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench -- plan_forward
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use rust_decimal::Decimal;
use serde_json::json;

use relief_hub::service::{DonationInput, RequestInput};
use relief_hub::types::{
    Condition, DeliveryPreference, DonationId, DonorRef, NewPoolDonation, NewRequest, NewUser,
    PickupLocation, PoolDonation, Request, RequestId, RequestStatus, ResourceSpec, Urgency,
    UserId, UserKind,
};
use relief_hub::{AllocationEngine, Config, MemoryStore, ReliefService};

// ============================================================================
// HELPER FUNCTIONS - Deterministic record generation
// ============================================================================

const URGENCIES: [Urgency; 4] = [Urgency::Critical, Urgency::High, Urgency::Medium, Urgency::Low];

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .unwrap_or_default()
}

fn make_request(id: u64, quantity: i64) -> Request {
    NewRequest {
        user_id: UserId(id),
        user_name: format!("requester-{id}"),
        user_type: UserKind::Individual,
        address: None,
        landmark: None,
        district: "Chennai".into(),
        state: None,
        coordinates: None,
        category: "food-nutrition".into(),
        specific_resource: "Rice".into(),
        quantity: Decimal::from(quantity),
        unit: "kg".into(),
        urgency: URGENCIES[id as usize % URGENCIES.len()],
        needed_by: None,
        delivery_preference: DeliveryPreference::Either,
        people_affected: None,
        special_requirements: None,
        pinged_organizations: Vec::new(),
        status: RequestStatus::Active,
        assigned_poc: None,
        notified_poc: true,
        created_at: at(id as i64),
    }
    .into_request(RequestId(id))
}

fn make_pool(id: u64, quantity: i64) -> PoolDonation {
    NewPoolDonation {
        donor: DonorRef {
            id: UserId(10_000 + id),
            name: format!("donor-{id}"),
            kind: UserKind::Organization,
        },
        resource: ResourceSpec {
            category: "food-nutrition".into(),
            specific_resource: "Rice".into(),
            unit: "kg".into(),
        },
        quantity: Decimal::from(quantity),
        condition: Condition::New,
        expiry_date: None,
        available_until: None,
        location: PickupLocation {
            pickup_address: None,
            district: "Chennai".into(),
            state: None,
        },
        can_deliver: false,
        can_pickup: true,
        delivery_radius: 25,
        // Reverse creation order so the queue has to sort
        created_at: at(-(id as i64)),
    }
    .into_pool(DonationId(id))
}

// ============================================================================
// BENCHMARKS
// ============================================================================

fn bench_plan_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_forward");
    group.measurement_time(Duration::from_secs(5));
    let engine = AllocationEngine::default();

    for waiting in [10u64, 100, 1_000] {
        let demand: Vec<Request> = (1..=waiting).map(|id| make_request(id, 5)).collect();
        // Enough to serve half the queue
        let pool = make_pool(1, (waiting * 5 / 2) as i64);

        group.throughput(Throughput::Elements(waiting));
        group.bench_with_input(BenchmarkId::from_parameter(waiting), &demand, |b, demand| {
            b.iter_batched(
                || demand.clone(),
                |demand| black_box(engine.plan_forward(&pool, demand, at(0))),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_plan_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_reverse");
    group.measurement_time(Duration::from_secs(5));
    let engine = AllocationEngine::default();

    for pools in [10u64, 100, 1_000] {
        let supply: Vec<PoolDonation> = (1..=pools).map(|id| make_pool(id, 3)).collect();
        let request = make_request(1, (pools * 2) as i64);

        group.throughput(Throughput::Elements(pools));
        group.bench_with_input(BenchmarkId::from_parameter(pools), &supply, |b, supply| {
            b.iter_batched(
                || supply.clone(),
                |supply| black_box(engine.plan_reverse(&request, supply, at(0))),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_service_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("service_commit");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    group.bench_function("donation_over_200_requests", |b| {
        b.iter_batched(
            || {
                let svc = ReliefService::new(MemoryStore::with_capacity(256), &Config::default());
                let requester = svc
                    .register_user(NewUser {
                        name: "Ravi".into(),
                        email: "ravi@example.org".into(),
                        district: Some("Chennai".into()),
                        ..NewUser::default()
                    })
                    .ok();
                let donor = svc
                    .register_user(NewUser {
                        name: "Meera".into(),
                        email: "meera@example.org".into(),
                        kind: UserKind::Organization,
                        district: Some("Chennai".into()),
                        ..NewUser::default()
                    })
                    .ok();
                if let Some(requester) = &requester {
                    for i in 0..200 {
                        let input = RequestInput {
                            district: Some("Chennai".into()),
                            category: Some("food-nutrition".into()),
                            specific_resource: Some("Rice".into()),
                            quantity: Some(json!(5)),
                            urgency: Some(URGENCIES[i % URGENCIES.len()].as_str().into()),
                            ..RequestInput::default()
                        };
                        let _ = svc.create_request(requester, input, at(i as i64));
                    }
                }
                (svc, donor)
            },
            |(svc, donor)| {
                if let Some(donor) = donor {
                    let input = DonationInput {
                        district: Some("Chennai".into()),
                        category: Some("food-nutrition".into()),
                        specific_resource: Some("Rice".into()),
                        quantity: Some(json!(600)),
                        ..DonationInput::default()
                    };
                    black_box(svc.create_donation(&donor, input, at(1_000)).ok());
                }
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_plan_forward,
    bench_plan_reverse,
    bench_service_commit
);
criterion_main!(benches);
