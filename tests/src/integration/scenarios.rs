//! Submit-and-confirm scenarios over a three-peer channel.

#[cfg(test)]
mod tests {
    use crate::fixtures::{three_peers, transfer, Network, PEERS};
    use lg_01_commit_coordinator::adapters::{
        CommitBehavior, EndorsementBehavior, LedgerCall, OrderingBehavior,
    };
    use lg_01_commit_coordinator::{
        CommitPolicy, CoordinatorConfig, CoordinatorError, OrderingStatus, PeerCommitStatus,
        TransactionSubmissionApi,
    };
    use shared_types::PeerId;
    use std::collections::HashSet;
    use std::time::Duration;

    fn is_ordering(call: &LedgerCall) -> bool {
        matches!(call, LedgerCall::SendToOrdering { .. })
    }

    fn is_watch(call: &LedgerCall) -> bool {
        matches!(call, LedgerCall::RegisterWatch { .. })
    }

    #[tokio::test]
    async fn test_all_peers_commit() {
        let network = Network::new(three_peers().build());
        let alice = network.enroll("alice").await;

        let outcome = network.coordinator.submit(transfer(&alice, 10)).await.unwrap();

        assert!(outcome.overall_success);
        assert_eq!(outcome.ordering_status, OrderingStatus::Success);
        assert_eq!(outcome.valid_commits(), 3);
        assert!(outcome.first_error_message.is_none());
        for peer in PEERS {
            assert!(matches!(
                outcome.per_peer_commit_status.get(&PeerId::new(peer)),
                Some(PeerCommitStatus::Valid { .. })
            ));
        }
        assert_eq!(network.ledger.open_sessions(), 0);
        assert_eq!(network.ledger.block_height(), 1);
    }

    #[tokio::test]
    async fn test_one_bad_endorsement_stops_before_ordering() {
        let ledger = three_peers().build();
        ledger.set_endorsement("peer3.coins", EndorsementBehavior::status(500, "insufficient funds"));
        let network = Network::new(ledger);
        let alice = network.enroll("alice").await;

        let err = network
            .coordinator
            .submit(transfer(&alice, 1_000))
            .await
            .unwrap_err();

        match err {
            CoordinatorError::EndorsementRejected { causes } => {
                assert_eq!(causes.len(), 1);
                assert!(causes[0].contains("peer3.coins"));
                assert!(causes[0].contains("insufficient funds"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let journal = network.ledger.journal();
        assert_eq!(journal.count(is_ordering), 0);
        assert_eq!(journal.count(is_watch), 0);
        assert_eq!(network.ledger.open_sessions(), 0);
        assert_eq!(network.coordinator.stats().endorsement_rejections, 1);
    }

    #[tokio::test]
    async fn test_every_bad_endorsement_is_reported() {
        let ledger = three_peers().build();
        ledger.set_endorsement("peer1.coins", EndorsementBehavior::Fail("connect timeout".into()));
        ledger.set_endorsement("peer3.coins", EndorsementBehavior::status(403, "access denied"));
        let network = Network::new(ledger);
        let alice = network.enroll("alice").await;

        let err = network.coordinator.submit(transfer(&alice, 1)).await.unwrap_err();

        let CoordinatorError::EndorsementRejected { causes } = err else {
            panic!("expected an endorsement rejection");
        };
        assert_eq!(causes.len(), 2);
        assert!(causes.iter().any(|c| c.contains("connect timeout")));
        assert!(causes.iter().any(|c| c.contains("access denied")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_peer_times_out() {
        let ledger = three_peers().build();
        ledger.set_commit("peer3.coins", CommitBehavior::Silent);
        let config = CoordinatorConfig {
            commit_timeout: Duration::from_secs(5),
            ..CoordinatorConfig::default()
        };
        let network = Network::with_config(ledger, config.clone());
        let alice = network.enroll("alice").await;

        let outcome = network.coordinator.submit(transfer(&alice, 10)).await.unwrap();

        assert!(outcome.overall_success);
        assert_eq!(outcome.valid_commits(), 2);
        assert_eq!(
            outcome.per_peer_commit_status.get(&PeerId::new("peer3.coins")),
            Some(&PeerCommitStatus::Timeout)
        );
        assert_eq!(
            outcome.first_error_message.as_deref(),
            Some("REQUEST_TIMEOUT: no commit event from peer3.coins")
        );

        let strict = Network::with_config(
            {
                let ledger = three_peers().build();
                ledger.set_commit("peer3.coins", CommitBehavior::Silent);
                ledger
            },
            CoordinatorConfig {
                commit_policy: CommitPolicy::All,
                ..config
            },
        );
        let alice = strict.enroll("alice").await;
        let err = strict
            .coordinator
            .submit(transfer(&alice, 10))
            .await
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(
            err,
            CoordinatorError::CommitTimeout {
                peer_id: PeerId::new("peer3.coins")
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_commit_is_reported_per_peer() {
        let ledger = three_peers().build();
        ledger.set_commit("peer2.coins", CommitBehavior::Invalid("MVCC_READ_CONFLICT".into()));
        let network = Network::new(ledger);
        let alice = network.enroll("alice").await;

        let outcome = network.coordinator.submit(transfer(&alice, 10)).await.unwrap();

        assert!(outcome.overall_success);
        assert!(matches!(
            outcome.per_peer_commit_status.get(&PeerId::new("peer2.coins")),
            Some(PeerCommitStatus::Invalid { validation_code, .. }) if validation_code == "MVCC_READ_CONFLICT"
        ));
        assert_eq!(network.coordinator.stats().commit_invalid, 1);
    }

    #[tokio::test]
    async fn test_watches_registered_before_ordering() {
        let network = Network::new(three_peers().build());
        let alice = network.enroll("alice").await;

        network.coordinator.submit(transfer(&alice, 10)).await.unwrap();

        let journal = network.ledger.journal();
        let ordering_at = journal.position(is_ordering).unwrap();
        let calls = journal.calls();
        let watched: HashSet<_> = calls[..ordering_at]
            .iter()
            .filter_map(|call| match call {
                LedgerCall::RegisterWatch { peer } => Some(peer.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(watched.len(), PEERS.len());
    }

    #[tokio::test]
    async fn test_ordering_rejection_fails_without_commit() {
        let ledger = three_peers()
            .ordering(OrderingBehavior::Reject("BAD_REQUEST".into()))
            .build();
        let network = Network::new(ledger);
        let alice = network.enroll("alice").await;

        let outcome = network.coordinator.submit(transfer(&alice, 10)).await.unwrap();

        assert!(!outcome.overall_success);
        assert_eq!(
            outcome.ordering_status,
            OrderingStatus::Rejected {
                status_code: "BAD_REQUEST".into()
            }
        );
        assert_eq!(
            outcome.error(),
            Some(CoordinatorError::OrderingFailed {
                status_code: "BAD_REQUEST".into()
            })
        );
        assert_eq!(network.ledger.block_height(), 0);
        assert_eq!(network.ledger.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_unenrolled_signer_touches_no_peer() {
        let network = Network::new(three_peers().build());

        let err = network
            .coordinator
            .submit(transfer(&shared_types::IdentityKey::new("mallory"), 10))
            .await
            .unwrap_err();

        assert!(matches!(err, CoordinatorError::IdentityNotFound(_)));
        assert!(network.ledger.journal().calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_independent() {
        let network = Network::new(three_peers().build());
        let alice = network.enroll("alice").await;
        let bob = network.enroll("bob").await;

        let submissions = (0..8).map(|i| {
            let signer = if i % 2 == 0 { &alice } else { &bob };
            network.coordinator.submit(transfer(signer, i))
        });
        let outcomes = futures::future::join_all(submissions).await;

        let mut ids = HashSet::new();
        for outcome in outcomes {
            let outcome = outcome.unwrap();
            assert!(outcome.overall_success);
            assert_eq!(outcome.valid_commits(), 3);
            assert!(ids.insert(outcome.transaction_id));
        }
        assert_eq!(network.ledger.open_sessions(), 0);
        assert_eq!(network.coordinator.stats().committed, 8);
    }
}
