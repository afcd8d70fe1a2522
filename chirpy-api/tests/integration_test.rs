/// Integration tests for the Chirpy API
///
/// These tests drive the full router over an in-memory store:
/// - Registration, login and credential changes
/// - Access token refresh and refresh token revocation
/// - Chirp creation, listing and owner-only deletion
/// - Payment provider webhook
/// - Admin metrics and dev-only reset

mod common;

use axum::http::StatusCode;
use chirpy_shared::auth::jwt::{create_token, Claims};
use chrono::{Duration, Utc};
use common::{bearer, empty_request, json_request, TestContext, JWT_SECRET, POLKA_KEY};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_healthz() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(empty_request("GET", "/api/healthz", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "connected");
}

#[tokio::test]
async fn test_register_and_login() {
    let ctx = TestContext::new();

    let user = ctx.register("walt@breakingbad.com", "04234").await;
    assert_eq!(user["email"], "walt@breakingbad.com");
    assert_eq!(user["is_chirpy_red"], false);
    assert!(user.get("password").is_none());
    assert!(user.get("hashed_password").is_none());

    let login = ctx.login("walt@breakingbad.com", "04234").await;
    assert_eq!(login["id"], user["id"]);
    assert!(!login["token"].as_str().unwrap().is_empty());

    let refresh_token = login["refresh_token"].as_str().unwrap();
    assert_eq!(refresh_token.len(), 64);
    assert!(refresh_token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let ctx = TestContext::new();
    ctx.register("saul@bettercall.com", "123456").await;

    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/api/users",
            None,
            json!({ "email": "saul@bettercall.com", "password": "other" }),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/api/users",
            None,
            json!({ "email": "not-an-email", "password": "pw" }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.register("jesse@breakingbad.com", "yo").await;

    let (wrong_pw_status, wrong_pw) = ctx
        .send(json_request(
            "POST",
            "/api/login",
            None,
            json!({ "email": "jesse@breakingbad.com", "password": "nope" }),
        ))
        .await;
    let (unknown_status, unknown) = ctx
        .send(json_request(
            "POST",
            "/api/login",
            None,
            json!({ "email": "nobody@breakingbad.com", "password": "yo" }),
        ))
        .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw["message"], "Incorrect email or password");
    assert_eq!(wrong_pw, unknown);
}

#[tokio::test]
async fn test_update_user_changes_credentials() {
    let ctx = TestContext::new();
    let login = ctx.signup("old@example.com", "old-pw").await;
    let auth = bearer(&login["token"]);

    let (status, body) = ctx
        .send(json_request(
            "PUT",
            "/api/users",
            Some(&auth),
            json!({ "email": "new@example.com", "password": "new-pw" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["id"], login["id"]);

    ctx.login("new@example.com", "new-pw").await;
    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/login",
            None,
            json!({ "email": "old@example.com", "password": "old-pw" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_user_requires_access_token() {
    let ctx = TestContext::new();
    let login = ctx.signup("a@example.com", "pw").await;

    let body = json!({ "email": "b@example.com", "password": "pw2" });

    let (status, _) = ctx
        .send(json_request("PUT", "/api/users", None, body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A refresh token is not an access token
    let (status, _) = ctx
        .send(json_request(
            "PUT",
            "/api/users",
            Some(&bearer(&login["refresh_token"])),
            body,
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_access_token_rejected() {
    let ctx = TestContext::new();
    let login = ctx.signup("late@example.com", "pw").await;
    let user_id: Uuid = login["id"].as_str().unwrap().parse().unwrap();

    let claims = Claims::issued_at(user_id, Duration::seconds(60), Utc::now() - Duration::hours(1));
    let expired = create_token(&claims, JWT_SECRET).unwrap();

    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/api/chirps",
            Some(&format!("Bearer {}", expired)),
            json!({ "body": "too late" }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let ctx = TestContext::new();
    let login = ctx.signup("refresh@example.com", "pw").await;

    let (status, body) = ctx
        .send(empty_request(
            "POST",
            "/api/refresh",
            Some(&bearer(&login["refresh_token"])),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    // The new token authorizes requests
    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/chirps",
            Some(&bearer(&body["token"])),
            json!({ "body": "refreshed" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_refresh_rejects_missing_and_unknown_tokens() {
    let ctx = TestContext::new();

    let (status, _) = ctx.send(empty_request("POST", "/api/refresh", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(empty_request("POST", "/api/refresh", Some("Bearer deadbeef")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoked_refresh_token_cannot_refresh() {
    let ctx = TestContext::new();
    let login = ctx.signup("revoke@example.com", "pw").await;
    let auth = bearer(&login["refresh_token"]);

    let (status, body) = ctx.send(empty_request("POST", "/api/revoke", Some(&auth))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = ctx.send(empty_request("POST", "/api/refresh", Some(&auth))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Revoking again still succeeds
    let (status, _) = ctx.send(empty_request("POST", "/api/revoke", Some(&auth))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_create_chirp_cleans_profanity() {
    let ctx = TestContext::new();
    let login = ctx.signup("chirper@example.com", "pw").await;

    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/api/chirps",
            Some(&bearer(&login["token"])),
            json!({ "body": "I had something interesting for breakfast Kerfuffle! kerfuffle" }),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["body"],
        "I had something interesting for breakfast Kerfuffle! ****"
    );
    assert_eq!(body["user_id"], login["id"]);
}

#[tokio::test]
async fn test_create_chirp_rejects_long_body() {
    let ctx = TestContext::new();
    let login = ctx.signup("verbose@example.com", "pw").await;

    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/chirps",
            Some(&bearer(&login["token"])),
            json!({ "body": "a".repeat(141) }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_chirps_filter_and_sort() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice@example.com", "pw").await;
    let bob = ctx.signup("bob@example.com", "pw").await;

    for (login, text) in [(&alice, "first"), (&bob, "second"), (&alice, "third")] {
        let (status, _) = ctx
            .send(json_request(
                "POST",
                "/api/chirps",
                Some(&bearer(&login["token"])),
                json!({ "body": text }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (_, all) = ctx.send(empty_request("GET", "/api/chirps", None)).await;
    let bodies: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);

    let uri = format!(
        "/api/chirps?author_id={}&sort=desc",
        alice["id"].as_str().unwrap()
    );
    let (_, filtered) = ctx.send(empty_request("GET", &uri, None)).await;
    let bodies: Vec<&str> = filtered
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["third", "first"]);
}

#[tokio::test]
async fn test_get_chirp_not_found() {
    let ctx = TestContext::new();

    let uri = format!("/api/chirps/{}", Uuid::new_v4());
    let (status, _) = ctx.send(empty_request("GET", &uri, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_chirp_owner_only() {
    let ctx = TestContext::new();
    let owner = ctx.signup("owner@example.com", "pw").await;
    let other = ctx.signup("other@example.com", "pw").await;

    let (_, chirp) = ctx
        .send(json_request(
            "POST",
            "/api/chirps",
            Some(&bearer(&owner["token"])),
            json!({ "body": "mine" }),
        ))
        .await;
    let uri = format!("/api/chirps/{}", chirp["id"].as_str().unwrap());

    let (status, _) = ctx.send(empty_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(empty_request("DELETE", &uri, Some(&bearer(&other["token"]))))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send(empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .send(empty_request("DELETE", &uri, Some(&bearer(&owner["token"]))))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send(empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_chirp_checks_auth_first() {
    let ctx = TestContext::new();
    let login = ctx.signup("someone@example.com", "pw").await;
    let uri = format!("/api/chirps/{}", Uuid::new_v4());

    let (status, _) = ctx.send(empty_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(empty_request("DELETE", &uri, Some(&bearer(&login["token"]))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_malformed_chirp_id_checks_auth_first() {
    let ctx = TestContext::new();
    let login = ctx.signup("typo@example.com", "pw").await;

    let (status, body) = ctx
        .send(empty_request("DELETE", "/api/chirps/not-a-uuid", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = ctx
        .send(empty_request(
            "DELETE",
            "/api/chirps/not-a-uuid",
            Some(&bearer(&login["token"])),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_webhook_upgrades_user() {
    let ctx = TestContext::new();
    let user = ctx.register("red@example.com", "pw").await;

    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/polka/webhooks",
            Some(&format!("ApiKey {}", POLKA_KEY)),
            json!({ "event": "user.upgraded", "data": { "user_id": user["id"] } }),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let login = ctx.login("red@example.com", "pw").await;
    assert_eq!(login["is_chirpy_red"], true);
}

#[tokio::test]
async fn test_webhook_rejects_bad_key() {
    let ctx = TestContext::new();
    let user = ctx.register("notred@example.com", "pw").await;
    let payload = json!({ "event": "user.upgraded", "data": { "user_id": user["id"] } });

    for auth in [None, Some("ApiKey wrong"), Some("Bearer f271c81ff7084ee5b99a5091b42d486e")] {
        let (status, _) = ctx
            .send(json_request("POST", "/api/polka/webhooks", auth, payload.clone()))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let login = ctx.login("notred@example.com", "pw").await;
    assert_eq!(login["is_chirpy_red"], false);
}

#[tokio::test]
async fn test_webhook_unknown_user_and_ignored_event() {
    let ctx = TestContext::new();
    let auth = format!("ApiKey {}", POLKA_KEY);

    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/polka/webhooks",
            Some(&auth),
            json!({ "event": "user.upgraded", "data": { "user_id": Uuid::new_v4() } }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/polka/webhooks",
            Some(&auth),
            json!({ "event": "user.payment_failed", "data": {} }),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Unknown kinds are ignored whatever their data looks like
    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/polka/webhooks",
            Some(&auth),
            json!({ "event": "user.downgraded", "data": { "user_id": "not-a-uuid", "plan": [1] } }),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/polka/webhooks",
            Some(&auth),
            json!({ "event": "user.upgraded", "data": { "user_id": "not-a-uuid" } }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/api/polka/webhooks",
            Some(&auth),
            json!({ "event": "user.upgraded" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_count_fileserver_hits() {
    let ctx = TestContext::new();

    for _ in 0..3 {
        let (status, _) = ctx
            .send_raw(empty_request("GET", "/app/Cargo.toml", None))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    // API traffic is not counted
    ctx.send(empty_request("GET", "/api/healthz", None)).await;

    let (status, page) = ctx
        .send_raw(empty_request("GET", "/admin/metrics", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Welcome, Chirpy Admin"));
    assert!(page.contains("Chirpy has been visited 3 times!"));
}

#[tokio::test]
async fn test_reset_in_dev_clears_everything() {
    let ctx = TestContext::new();
    let login = ctx.signup("gone@example.com", "pw").await;
    ctx.send_raw(empty_request("GET", "/app/Cargo.toml", None)).await;

    let (status, text) = ctx.send_raw(empty_request("POST", "/admin/reset", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Reset successful");

    let (_, page) = ctx
        .send_raw(empty_request("GET", "/admin/metrics", None))
        .await;
    assert!(page.contains("visited 0 times"));

    let (status, _) = ctx
        .send(empty_request(
            "POST",
            "/api/refresh",
            Some(&bearer(&login["refresh_token"])),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.register("gone@example.com", "pw").await;
}

#[tokio::test]
async fn test_reset_forbidden_outside_dev() {
    for platform in ["", "production", "DEV"] {
        let ctx = TestContext::with_platform(platform);
        ctx.register("kept@example.com", "pw").await;

        let (status, _) = ctx.send(empty_request("POST", "/admin/reset", None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        ctx.login("kept@example.com", "pw").await;
    }
}
