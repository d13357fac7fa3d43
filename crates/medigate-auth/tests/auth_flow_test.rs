//! Integration tests for the login / authenticate / refresh / logout flow.

mod helpers;

use medigate_auth::jwt::TokenRejection;

#[tokio::test]
async fn test_login_then_authenticate() {
    let harness = helpers::TestHarness::new();
    let identity = helpers::practitioner();
    let ctx = helpers::browser_login("203.0.113.10");

    let result = harness
        .manager
        .login(&identity, &ctx)
        .await
        .expect("login succeeds");

    assert_eq!(result.tokens.token_type, "Bearer");
    assert!(result.session.is_active());

    let claims = harness
        .manager
        .authenticate(&result.tokens.access_token)
        .await
        .expect("fresh access token authenticates");

    assert_eq!(claims.sub, identity.user_id);
    assert_eq!(claims.sid, result.session.id);
    assert_eq!(claims.tid, identity.tenant_id);
}

#[tokio::test]
async fn test_authenticate_records_session_activity() {
    let harness = helpers::TestHarness::new();
    let identity = helpers::practitioner();
    let ctx = helpers::browser_login("203.0.113.10");

    let result = harness.manager.login(&identity, &ctx).await.unwrap();
    harness
        .manager
        .authenticate(&result.tokens.access_token)
        .await
        .unwrap();

    let session = harness.store.get(result.session.id).expect("still active");
    assert!(
        session
            .activity_log
            .iter()
            .any(|entry| entry.action == "api_request")
    );
}

#[tokio::test]
async fn test_refresh_rotates_and_old_token_is_single_use() {
    let harness = helpers::TestHarness::new();
    let identity = helpers::practitioner();
    let ctx = helpers::browser_login("203.0.113.10");

    let login = harness.manager.login(&identity, &ctx).await.unwrap();
    let old_refresh = login.tokens.refresh_token.clone();

    let rotated = harness
        .manager
        .refresh(&old_refresh, &identity)
        .await
        .expect("first refresh succeeds");
    assert_ne!(rotated.refresh_token, old_refresh);

    // The presented token was consumed by the rotation.
    let replay = harness.manager.refresh(&old_refresh, &identity).await;
    assert!(matches!(replay, Err(TokenRejection::Revoked)));

    // The rotated pair keeps working.
    harness
        .manager
        .authenticate(&rotated.access_token)
        .await
        .expect("rotated access token authenticates");
    harness
        .manager
        .refresh(&rotated.refresh_token, &identity)
        .await
        .expect("rotated refresh token refreshes");
}

#[tokio::test]
async fn test_refresh_rejects_foreign_identity() {
    let harness = helpers::TestHarness::new();
    let identity = helpers::practitioner();
    let other = helpers::practitioner();
    let ctx = helpers::browser_login("203.0.113.10");

    let login = harness.manager.login(&identity, &ctx).await.unwrap();

    let result = harness
        .manager
        .refresh(&login.tokens.refresh_token, &other)
        .await;
    assert!(matches!(result, Err(TokenRejection::SessionGone)));
}

#[tokio::test]
async fn test_logout_invalidates_both_tokens_and_session() {
    let harness = helpers::TestHarness::new();
    let identity = helpers::practitioner();
    let ctx = helpers::browser_login("203.0.113.10");

    let login = harness.manager.login(&identity, &ctx).await.unwrap();
    let claims = harness
        .manager
        .authenticate(&login.tokens.access_token)
        .await
        .unwrap();

    harness
        .manager
        .logout(
            &login.tokens.access_token,
            &claims,
            Some(&login.tokens.refresh_token),
        )
        .await
        .expect("logout succeeds");

    let auth = harness.manager.authenticate(&login.tokens.access_token).await;
    assert!(matches!(auth, Err(TokenRejection::Revoked)));

    let refresh = harness
        .manager
        .refresh(&login.tokens.refresh_token, &identity)
        .await;
    assert!(matches!(refresh, Err(TokenRejection::Revoked)));

    assert!(harness.store.get(login.session.id).is_none());
}

#[tokio::test]
async fn test_authenticate_rejects_garbage_token() {
    let harness = helpers::TestHarness::new();

    let result = harness.manager.authenticate("not-a-jwt-at-all").await;
    assert!(matches!(result, Err(TokenRejection::Malformed)));
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let harness = helpers::TestHarness::new();
    let identity = helpers::practitioner();
    let ctx = helpers::browser_login("203.0.113.10");

    let login = harness.manager.login(&identity, &ctx).await.unwrap();

    // Signed with a different key and issuer; the access verifier
    // rejects it before the type claim is even inspected.
    let result = harness
        .manager
        .authenticate(&login.tokens.refresh_token)
        .await;
    assert!(matches!(result, Err(TokenRejection::InvalidSignature)));
}

#[tokio::test]
async fn test_admin_terminate_makes_tokens_unusable() {
    let harness = helpers::TestHarness::new();
    let identity = helpers::practitioner();
    let ctx = helpers::browser_login("203.0.113.10");
    let admin_id = uuid::Uuid::new_v4();

    let login = harness.manager.login(&identity, &ctx).await.unwrap();

    harness
        .manager
        .admin_terminate(login.session.id, admin_id)
        .await
        .expect("admin termination succeeds");

    let auth = harness.manager.authenticate(&login.tokens.access_token).await;
    assert!(matches!(auth, Err(TokenRejection::SessionGone)));

    let refresh = harness
        .manager
        .refresh(&login.tokens.refresh_token, &identity)
        .await;
    assert!(matches!(refresh, Err(TokenRejection::SessionGone)));

    // Terminating again reports the session as gone.
    let again = harness.manager.admin_terminate(login.session.id, admin_id).await;
    assert!(again.is_err());
}

#[tokio::test]
async fn test_terminate_all_spares_excepted_session() {
    let harness = helpers::TestHarness::new();
    let identity = helpers::practitioner();
    let ctx = helpers::browser_login("203.0.113.10");
    let admin_id = uuid::Uuid::new_v4();

    let first = harness.manager.login(&identity, &ctx).await.unwrap();
    harness.manager.login(&identity, &ctx).await.unwrap();
    harness.manager.login(&identity, &ctx).await.unwrap();

    let terminated = harness
        .manager
        .terminate_all_user_sessions(identity.user_id, admin_id, Some(first.session.id))
        .await
        .unwrap();

    assert_eq!(terminated, 2);
    assert!(harness.store.get(first.session.id).is_some());
    assert_eq!(harness.store.count_active(identity.user_id), 1);
}
