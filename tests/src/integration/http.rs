//! The assembled runtime driven through its HTTP router.

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use gateway_runtime::{GatewayRuntime, RuntimeConfig};
    use lg_01_commit_coordinator::adapters::{CommitBehavior, LedgerCall};
    use lg_01_commit_coordinator::TransactionSubmissionApi;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tower::ServiceExt;

    const USER_HEADER: &str = "x-ledger-user";

    async fn runtime(vars: &[(&str, &str)]) -> GatewayRuntime {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = RuntimeConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let runtime = GatewayRuntime::new(config).unwrap();
        runtime.bootstrap().await.unwrap();
        runtime
    }

    async fn post(router: &Router, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = Request::post(uri).header("content-type", "application/json");
        if let Some(user) = user {
            request = request.header(USER_HEADER, user);
        }
        let response = router
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get(router: &Router, uri: &str) -> Value {
        let response = router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_enroll_invoke_query_lifecycle() {
        let runtime = runtime(&[("LG_PEERS", "peer1.coins,peer2.coins,peer3.coins")]).await;
        let router = runtime.gateway().router();

        let (status, body) = post(
            &router,
            "/enroll",
            None,
            json!({"username": "alice", "orgName": "coins"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "enrolled");

        let (status, body) = post(
            &router,
            "/invoke",
            Some("alice"),
            json!({"fcn": "transfer", "args": ["bob", 5]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        assert!(!body["transactionID"].as_str().unwrap().is_empty());
        assert_eq!(body["ordering"]["state"], "success");
        assert_eq!(body["commits"].as_object().unwrap().len(), 3);

        let (status, body) = post(
            &router,
            "/query",
            Some("alice"),
            json!({"fcn": "getFoundations", "args": []}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payload"], json!({}));

        let health = get(&router, "/health").await;
        assert_eq!(health["channel"], "mychannel");
        assert_eq!(health["coordinator"]["submitted"], 1);
        assert_eq!(health["coordinator"]["committed"], 1);
        assert_eq!(health["coordinator"]["evaluations"], 1);
    }

    #[tokio::test]
    async fn test_upgrade_uses_configured_admin() {
        let runtime = runtime(&[("LG_ADMIN", "registrar"), ("LG_ADMIN_SECRET", "s3cret")]).await;
        let router = runtime.gateway().router();
        post(&router, "/enroll", None, json!({"username": "ops"})).await;

        let (status, body) = post(
            &router,
            "/upgrade/foundation",
            Some("ops"),
            json!({"version": "1.1", "args": ["reset"]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(runtime
            .wallet()
            .contains(&shared_types::IdentityKey::new("registrar")));
        assert_eq!(
            runtime
                .ledger()
                .journal()
                .count(|c| matches!(c, LedgerCall::SendToOrdering { .. })),
            1
        );
    }

    #[tokio::test]
    async fn test_no_valid_commit_is_a_conflict() {
        let runtime = runtime(&[]).await;
        let router = runtime.gateway().router();
        post(&router, "/enroll", None, json!({"username": "alice"})).await;
        runtime.ledger().set_commit(
            "peer1.coins.example.com:8051",
            CommitBehavior::Invalid("ENDORSEMENT_POLICY_FAILURE".into()),
        );
        runtime.ledger().set_commit(
            "peer0.coins.example.com:7051",
            CommitBehavior::Invalid("ENDORSEMENT_POLICY_FAILURE".into()),
        );

        let (status, body) = post(
            &router,
            "/invoke/coins",
            Some("alice"),
            json!({"fcn": "transfer", "args": ["bob", "5"]}),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("ENDORSEMENT_POLICY_FAILURE"));
        assert_eq!(runtime.coordinator().stats().commit_invalid, 2);
    }

    #[tokio::test]
    async fn test_unenrolled_caller_is_unauthorized() {
        let runtime = runtime(&[]).await;
        let router = runtime.gateway().router();

        let (status, body) = post(
            &router,
            "/invoke",
            Some("nobody"),
            json!({"fcn": "transfer", "args": []}),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(
            runtime
                .ledger()
                .journal()
                .count(|c| matches!(c, LedgerCall::ResolveContext { .. })),
            0
        );
    }

    #[tokio::test]
    async fn test_concurrent_enrollments_over_http() {
        let runtime = runtime(&[]).await;
        let router = runtime.gateway().router();

        let requests = (0..4).map(|_| post(&router, "/enroll", None, json!({"username": "hana"})));
        let responses = futures::future::join_all(requests).await;

        let mut outcomes: Vec<String> = responses
            .into_iter()
            .map(|(status, body)| {
                assert_eq!(status, StatusCode::OK);
                body["outcome"].as_str().unwrap().to_string()
            })
            .collect();
        outcomes.sort();
        assert_eq!(
            outcomes,
            vec!["already_enrolled", "already_enrolled", "already_enrolled", "enrolled"]
        );
    }
}
