//! Admission, enrollment and submission working together.

#[cfg(test)]
mod tests {
    use crate::fixtures::{three_peers, transfer, Network};
    use lg_01_commit_coordinator::TransactionSubmissionApi;
    use lg_02_enrollment_admission::{EnrollmentApi, EnrollmentOutcome, IdentityWallet};
    use shared_types::IdentityKey;
    use std::time::Duration;

    #[tokio::test]
    async fn test_enrolled_user_can_submit() {
        let network = Network::new(three_peers().build());
        let dave = network.enroll("dave").await;

        let stored = network.wallet.get(&dave).await.unwrap().unwrap();
        assert_eq!(stored.identity, dave);
        assert!(stored.certificate.contains("BEGIN CERTIFICATE"));

        let outcome = network.coordinator.submit(transfer(&dave, 3)).await.unwrap();
        assert!(outcome.overall_success);
    }

    #[tokio::test]
    async fn test_enrollment_bootstraps_admin_once() {
        let network = Network::new(three_peers().build());

        network.enroll("alice").await;
        network.enroll("bob").await;

        assert!(network.wallet.contains(&IdentityKey::new("admin")));
        assert_eq!(network.wallet.len(), 3);
        // admin bootstrap + alice + bob
        assert_eq!(network.authority.enroll_calls(), 3);
        assert_eq!(network.authority.register_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_enrollments_register_once() {
        let network = Network::with_slow_authority(three_peers().build(), Duration::from_millis(200));
        let carol = IdentityKey::new("carol");

        let attempts = (0..5).map(|_| network.enrollment.enroll(&carol, "coins"));
        let outcomes = futures::future::join_all(attempts).await;

        let outcomes: Vec<_> = outcomes.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == EnrollmentOutcome::Enrolled)
                .count(),
            1
        );
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == EnrollmentOutcome::AlreadyEnrolled)
                .count(),
            4
        );
        assert_eq!(network.authority.register_calls(), 1);
        assert_eq!(network.admission.pending(&carol), 0);
        assert_eq!(network.admission.active_identities(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_ticket_is_evicted_once_stale() {
        let network = Network::new(three_peers().build());
        let admission = &network.admission;
        let erin = IdentityKey::new("erin");

        // The first holder never releases.
        let first = admission.init(&erin);
        assert!(admission.acquire(&erin, first));

        let second = admission.init(&erin);
        assert!(!admission.acquire(&erin, second));

        tokio::time::advance(Duration::from_millis(2_900)).await;
        assert!(!admission.acquire(&erin, second));

        let waited = tokio::time::Instant::now();
        admission.wait_for_turn(&erin, second).await.unwrap();
        assert!(waited.elapsed() >= Duration::from_millis(100));
        assert_eq!(admission.pending(&erin), 1);

        admission.release(&erin, second);
        assert_eq!(admission.pending(&erin), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicted_waiter_cannot_proceed() {
        let network = Network::new(three_peers().build());
        let admission = &network.admission;
        let frank = IdentityKey::new("frank");

        let head = admission.init(&frank);
        let stuck = admission.init(&frank);
        let behind = admission.init(&frank);

        // Past the stale window, `behind` evicts both tickets ahead of it.
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(admission.acquire(&frank, behind));
        assert!(admission.wait_for_turn(&frank, stuck).await.is_err());

        admission.release(&frank, head);
        admission.release(&frank, behind);
        assert_eq!(admission.active_identities(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_waiter_releases_its_ticket() {
        let network = Network::new(three_peers().build());
        let admission = &network.admission;
        let grace = IdentityKey::new("grace");

        let holder = admission.init(&grace);
        let waiting = tokio::time::timeout(Duration::from_millis(500), admission.admit(&grace)).await;
        assert!(waiting.is_err());
        assert_eq!(admission.pending(&grace), 1);

        admission.release(&grace, holder);
        assert_eq!(admission.pending(&grace), 0);
    }
}
