//! Properties of the aggregate over arbitrary peer failures.

#[cfg(test)]
mod tests {
    use crate::fixtures::{three_peers, transfer, Network, PEERS};
    use lg_01_commit_coordinator::adapters::CommitBehavior;
    use lg_01_commit_coordinator::{CoordinatorConfig, PeerCommitStatus, TransactionSubmissionApi};
    use proptest::prelude::*;
    use std::time::Duration;

    fn behavior(code: u8) -> CommitBehavior {
        match code {
            0 => CommitBehavior::Valid,
            1 => CommitBehavior::Silent,
            2 => CommitBehavior::Invalid("MVCC_READ_CONFLICT".into()),
            _ => CommitBehavior::Error("event stream closed".into()),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_every_peer_resolves_exactly_once(codes in proptest::collection::vec(0u8..4, 3)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .start_paused(true)
                .build()
                .unwrap();

            let (outcome, open_sessions) = runtime.block_on(async {
                let ledger = three_peers().build();
                for (peer, code) in PEERS.iter().zip(&codes) {
                    ledger.set_commit(peer, behavior(*code));
                }
                let network = Network::with_config(
                    ledger,
                    CoordinatorConfig {
                        commit_timeout: Duration::from_secs(2),
                        ..CoordinatorConfig::default()
                    },
                );
                let alice = network.enroll("alice").await;
                let outcome = network.coordinator.submit(transfer(&alice, 1)).await.unwrap();
                (outcome, network.ledger.open_sessions())
            });

            prop_assert_eq!(open_sessions, 0);
            prop_assert_eq!(outcome.per_peer_commit_status.len(), PEERS.len());

            let valid = codes.iter().filter(|c| **c == 0).count();
            let silent = codes.iter().filter(|c| **c == 1).count();
            let timeouts = outcome
                .per_peer_commit_status
                .values()
                .filter(|s| **s == PeerCommitStatus::Timeout)
                .count();
            prop_assert_eq!(outcome.valid_commits(), valid);
            prop_assert_eq!(timeouts, silent);
            prop_assert_eq!(outcome.overall_success, valid >= 1);
            prop_assert_eq!(outcome.first_error_message.is_none(), valid == PEERS.len());
        }
    }
}
