//! Integration tests for login, hydration and the account flows

mod common;

use common::{Harness, login_body, user_json};
use gigdesk_http::client::ClientError;
use gigdesk_http::navigation::Route;
use gigdesk_http::session::{
    AuthError, FileStorage, Registration, SessionPhase, SessionStorage, StorageKeys,
};
use gigdesk_http::types::{RegisterData, UserType};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn registration() -> RegisterData {
    RegisterData {
        email: "lin@example.com".into(),
        password: "s3cret-enough".into(),
        first_name: "Lin".into(),
        last_name: "Park".into(),
        user_type: UserType::Freelancer,
    }
}

#[tokio::test]
async fn test_login_persists_session_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::in_dir(dir.path()));
    let harness = Harness::with_storage(storage.clone()).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("a-1", "r-1")))
        .expect(1)
        .mount(&harness.server)
        .await;

    let user = harness
        .client
        .session()
        .login("ada@example.com", "pw")
        .await
        .unwrap();

    assert_eq!(user.id, 7);
    assert_eq!(user.user_type, UserType::Client);
    assert_eq!(harness.client.session().phase(), SessionPhase::LoggedIn);
    assert_eq!(storage.get(StorageKeys::ACCESS_TOKEN).unwrap().as_deref(), Some("a-1"));
    assert_eq!(storage.get(StorageKeys::REFRESH_TOKEN).unwrap().as_deref(), Some("r-1"));
    let stored_user: serde_json::Value =
        serde_json::from_str(&storage.get(StorageKeys::USER).unwrap().unwrap()).unwrap();
    assert_eq!(stored_user["email"], "ada@example.com");
    assert_eq!(
        harness.navigator.routes(),
        vec![Route::Dashboard(UserType::Client)]
    );
}

#[tokio::test]
async fn test_invalid_credentials_surface_server_message() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "No active account found with the given credentials"})),
        )
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    let err = harness
        .client
        .session()
        .login("ada@example.com", "nope")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No active account found"));
    assert!(!harness.client.session().is_authenticated());
    assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_hydrate_restores_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::in_dir(dir.path()));
    storage.set(StorageKeys::ACCESS_TOKEN, "old-access").unwrap();
    storage.set(StorageKeys::REFRESH_TOKEN, "r-1").unwrap();
    storage
        .set(StorageKeys::USER, &user_json().to_string())
        .unwrap();

    let harness = Harness::with_storage(storage.clone()).await;
    harness
        .mount_refresh("r-1", 200, json!({"access": "new-access"}), 1)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread_count/"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unread_count": 0})))
        .expect(1)
        .mount(&harness.server)
        .await;

    let session = harness.client.session();
    assert_eq!(session.hydrate().await, SessionPhase::LoggedIn);

    assert_eq!(session.current_user().unwrap().first_name, "Ada");
    assert_eq!(
        storage.get(StorageKeys::ACCESS_TOKEN).unwrap().as_deref(),
        Some("new-access")
    );
    assert_eq!(harness.client.unread_notifications().await.unwrap(), 0);
    assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_hydrate_with_revoked_refresh_token_starts_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::in_dir(dir.path()));
    storage.set(StorageKeys::ACCESS_TOKEN, "old-access").unwrap();
    storage.set(StorageKeys::REFRESH_TOKEN, "revoked").unwrap();
    storage
        .set(StorageKeys::USER, &user_json().to_string())
        .unwrap();

    let harness = Harness::with_storage(storage.clone()).await;
    harness
        .mount_refresh("revoked", 401, json!({"detail": "Token is blacklisted"}), 1)
        .await;

    let session = harness.client.session();
    assert_eq!(session.hydrate().await, SessionPhase::LoggedOut);

    assert_eq!(session.phase(), SessionPhase::LoggedOut);
    assert!(session.current_user().is_none());
    for key in StorageKeys::ALL {
        assert!(storage.get(key).unwrap().is_none(), "{key} left behind");
    }
    assert!(!storage.path().exists());
    assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_hydrate_with_empty_storage_skips_network() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    assert_eq!(
        harness.client.session().hydrate().await,
        SessionPhase::LoggedOut
    );
}

#[tokio::test]
async fn test_register_with_tokens_signs_in() {
    let harness = Harness::start().await;
    let mut body = login_body("a-9", "r-9");
    body["user"]["user_type"] = json!("freelancer");

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .and(body_json(json!({
            "email": "lin@example.com",
            "password": "s3cret-enough",
            "password2": "s3cret-enough",
            "first_name": "Lin",
            "last_name": "Park",
            "user_type": "freelancer"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(body))
        .expect(1)
        .mount(&harness.server)
        .await;

    let outcome = harness
        .client
        .session()
        .register(&registration())
        .await
        .unwrap();

    let Registration::SignedIn(user) = outcome else {
        panic!("expected a signed-in registration, got {outcome:?}");
    };
    assert_eq!(user.user_type, UserType::Freelancer);
    assert_eq!(
        harness.client.session().access_token().as_deref(),
        Some("a-9")
    );
    assert_eq!(
        harness.navigator.routes(),
        vec![Route::Dashboard(UserType::Freelancer)]
    );
}

#[tokio::test]
async fn test_register_without_tokens_requires_verification() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Check your inbox to verify your email address."
        })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let outcome = harness
        .client
        .session()
        .register(&registration())
        .await
        .unwrap();

    assert_eq!(outcome, Registration::VerificationRequired);
    assert!(!harness.client.session().is_authenticated());
    assert_eq!(harness.navigator.routes(), vec![Route::VerifyEmail]);
}

#[tokio::test]
async fn test_register_validation_error() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"email": ["user with this email already exists."]})),
        )
        .mount(&harness.server)
        .await;

    let err = harness
        .client
        .session()
        .register(&registration())
        .await
        .unwrap_err();

    match err {
        AuthError::Api(ref e) => assert!(e.is_validation()),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(err.to_string().contains("already exists"));
    assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_logout_forgets_session() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::in_dir(dir.path()));
    let harness = Harness::with_storage(storage.clone()).await;
    harness.login_as("a-1", "r-1").await;
    assert!(storage.path().exists());

    harness.client.session().logout();

    let session = harness.client.session();
    assert_eq!(session.phase(), SessionPhase::LoggedOut);
    assert!(session.snapshot().tokens.is_none());
    assert!(!storage.path().exists());
    assert_eq!(harness.navigator.routes().last(), Some(&Route::Login));
}

#[tokio::test]
async fn test_change_password_refreshes_expired_token() {
    let harness = Harness::start().await;
    harness.login_as("stale", "r-1").await;

    let expected = json!({"old_password": "old", "new_password": "brand-new"});
    Mock::given(method("POST"))
        .and(path("/api/auth/change-password/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/change-password/"))
        .and(header("authorization", "Bearer fresh"))
        .and(body_json(expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&harness.server)
        .await;
    harness
        .mount_refresh("r-1", 200, json!({"access": "fresh"}), 1)
        .await;

    harness
        .client
        .session()
        .change_password("old", "brand-new")
        .await
        .unwrap();

    assert!(harness.client.session().is_authenticated());
}

#[tokio::test]
async fn test_wrong_old_password_is_rejected() {
    let harness = Harness::start().await;
    harness.login_as("a-1", "r-1").await;

    Mock::given(method("POST"))
        .and(path("/api/auth/change-password/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"old_password": ["Wrong password."]})),
        )
        .mount(&harness.server)
        .await;

    let err = harness
        .client
        .session()
        .change_password("guess", "brand-new")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Api(ClientError::Validation { .. })));
    assert!(harness.client.session().is_authenticated());
}

#[tokio::test]
async fn test_email_verification_and_password_reset() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-email/"))
        .and(body_json(json!({"token": "verify-123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "verified"})))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/resend-verification/"))
        .and(body_json(json!({"email": "lin@example.com"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/password-reset/"))
        .and(body_json(json!({"email": "lin@example.com"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/password-reset/confirm/"))
        .and(body_json(json!({"token": "reset-456", "password": "n3w-pass"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;

    let session = harness.client.session();
    session.verify_email("verify-123").await.unwrap();
    session.resend_verification("lin@example.com").await.unwrap();
    session.reset_password("lin@example.com").await.unwrap();
    session
        .reset_password_confirm("reset-456", "n3w-pass")
        .await
        .unwrap();

    assert_eq!(
        harness.navigator.routes(),
        vec![Route::Login, Route::Login, Route::Login]
    );
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_expired_verification_token() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-email/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Verification link expired"})),
        )
        .mount(&harness.server)
        .await;

    let err = harness
        .client
        .session()
        .verify_email("old-token")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Verification link expired"));
    assert!(harness.navigator.routes().is_empty());
}
