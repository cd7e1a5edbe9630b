//! # Ledger Gateway Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | lg-02 Admission | queue push / admit / remove, uncontended admit |
//! | lg-01 Policy | endorsement evaluation over N responses |
//! | lg-01 Coordinator | full submit-and-confirm on the simulated network |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lg_01_commit_coordinator::domain::{evaluate_endorsements, EndorsementResponse, ProposalResponse};
use lg_01_commit_coordinator::TransactionSubmissionApi;
use lg_02_enrollment_admission::domain::{AdmissionQueue, AdmissionTicket, TicketId};
use lg_02_enrollment_admission::{AdmissionConfig, EnrollmentAdmission};
use lg_tests::fixtures::{three_peers, transfer, Network};
use shared_types::{IdentityKey, PeerId};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// LG-02: Admission
// ============================================================================

fn bench_admission_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("lg-02-admission-queue");
    let identity = IdentityKey::new("alice");
    let stale_after = Duration::from_secs(3);

    for depth in [1usize, 16, 256] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("drain_in_order", depth), &depth, |b, &depth| {
            b.iter(|| {
                let now = Instant::now();
                let mut queue = AdmissionQueue::new();
                let ids: Vec<TicketId> = (0..depth)
                    .map(|_| {
                        let ticket_id = TicketId::new();
                        queue.push(AdmissionTicket {
                            identity: identity.clone(),
                            ticket_id,
                            issued_at: now,
                        });
                        ticket_id
                    })
                    .collect();
                for id in ids {
                    black_box(queue.admit(id, now, stale_after));
                    queue.remove(id);
                }
                black_box(queue.is_empty())
            })
        });
    }

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let admission = EnrollmentAdmission::new(AdmissionConfig::default());
    group.bench_function("admit_uncontended", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let guard = admission.admit(&identity).await.unwrap();
                black_box(guard.ticket())
            })
        })
    });

    group.finish();
}

// ============================================================================
// LG-01: Endorsement policy
// ============================================================================

fn bench_endorsement_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("lg-01-endorsement-policy");

    for peers in [3usize, 10, 50] {
        let responses: Vec<EndorsementResponse> = (0..peers)
            .map(|i| {
                EndorsementResponse::endorsed(
                    PeerId::new(format!("peer{i}")),
                    ProposalResponse {
                        status: 200,
                        message: "OK".into(),
                        payload: b"{}".to_vec(),
                        signature: vec![0u8; 64],
                    },
                )
            })
            .collect();

        group.throughput(Throughput::Elements(peers as u64));
        group.bench_with_input(BenchmarkId::new("all_good", peers), &responses, |b, responses| {
            b.iter(|| black_box(evaluate_endorsements(responses, 200)))
        });
    }

    group.finish();
}

// ============================================================================
// LG-01: Submit and confirm
// ============================================================================

fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lg-01-submit");
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let network = Network::new(three_peers().build());
    let alice = runtime.block_on(network.enroll("alice"));

    group.bench_function("three_peers", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let outcome = network.coordinator.submit(transfer(&alice, 1)).await.unwrap();
                black_box(outcome.overall_success)
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_admission_queue,
    bench_endorsement_policy,
    bench_submit,
);

criterion_main!(benches);
