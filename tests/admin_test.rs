mod common;

use axum::http::StatusCode;
use briefhub_backend::entities::types::Role;
use common::setup_app;
use serde_json::json;

#[tokio::test]
async fn test_admin_routes_need_admin_role() {
    let t = setup_app().await;
    let (_, token) = t.register_user("ivan").await;

    let (status, body) = t.call("GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_PERMISSIONS");

    let (status, _) = t.call("GET", "/api/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_filters() {
    let t = setup_app().await;
    t.register_user("judy").await;
    t.register_user("kate").await;
    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;

    let (status, body) = t.call("GET", "/api/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = t
        .call("GET", "/api/admin/users?role=admin", Some(&admin), None)
        .await;
    let accounts = body.as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["username"], "moderator");

    let (_, body) = t
        .call("GET", "/api/admin/users?q=judy", Some(&admin), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["email"], "judy@example.com");
}

#[tokio::test]
async fn test_only_super_admin_creates_and_approves() {
    let t = setup_app().await;
    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;
    let (_, root) = t.account_with_role("root", Role::SuperAdmin).await;
    let account = json!({
        "username": "staffer",
        "email": "staffer@example.com",
        "password": "password123",
        "role": "admin"
    });

    let (status, _) = t
        .call("POST", "/api/admin/users", Some(&admin), Some(account.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = t
        .call("POST", "/api/admin/users", Some(&root), Some(account))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["is_verified"], true);
    let staffer_id = body["id"].as_str().unwrap().to_string();

    // Created accounts can log in straight away
    t.login("staffer").await;

    let (status, _) = t
        .call(
            "POST",
            &format!("/api/admin/users/{}/approve", staffer_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_touch_super_admin() {
    let t = setup_app().await;
    let (root_id, root) = t.account_with_role("root", Role::SuperAdmin).await;
    let (admin_id, admin) = t.account_with_role("moderator", Role::Admin).await;

    let (status, _) = t
        .call(
            "PATCH",
            &format!("/api/admin/users/{}", root_id),
            Some(&admin),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t
        .call("DELETE", &format!("/api/admin/users/{}", root_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The super admin can remove the admin
    let (status, _) = t
        .call("DELETE", &format!("/api/admin/users/{}", admin_id), Some(&root), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t
        .call("DELETE", &format!("/api/admin/users/{}", root_id), Some(&root), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_moderate_unknown_user() {
    let t = setup_app().await;
    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;

    let (status, body) = t
        .call(
            "PATCH",
            "/api/admin/users/missing",
            Some(&admin),
            Some(json!({ "is_verified": true })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_admin_cannot_verify_pending_admin() {
    let t = setup_app().await;
    let (user_id, _) = t.register_user("member").await;
    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;
    let (_, root) = t.account_with_role("root", Role::SuperAdmin).await;

    let (status, body) = t
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "pending",
                "email": "pending@example.com",
                "password": "password123",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let pending_id = body["user"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/admin/users/{}", pending_id);

    let (status, body) = t
        .call("PATCH", &uri, Some(&admin), Some(json!({ "is_verified": true })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_PERMISSIONS");

    let (status, body) = t
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "login": "pending", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ACCOUNT_NOT_VERIFIED");

    // Plain accounts stay within reach of admins
    let (status, _) = t
        .call(
            "PATCH",
            &format!("/api/admin/users/{}", user_id),
            Some(&admin),
            Some(json!({ "is_verified": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t
        .call("PATCH", &uri, Some(&root), Some(json!({ "is_verified": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_verified"], true);
    t.login("pending").await;
}

#[tokio::test]
async fn test_huge_page_returns_empty_list() {
    let t = setup_app().await;
    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;

    for uri in [
        "/api/tags?page=1000000000000000000&per_page=100",
        "/api/briefs?page=18446744073709551615",
        "/api/admin/users?page=18446744073709551615",
    ] {
        let (status, body) = t.call("GET", uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK, "{}: {}", uri, body);
        assert!(body.as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_deleting_account_refreshes_counters() {
    let t = setup_app().await;
    let (_, owner) = t.register_user("owner").await;
    let (creator_id, creator) = t.register_user("creator").await;
    let (fan_id, fan) = t.register_user("fan").await;
    let (_, admin) = t.account_with_role("moderator", Role::Admin).await;

    let brief_id = t.open_brief(&owner).await;
    let (_, mine) = t.submit(&owner, &brief_id).await;
    let (_, theirs) = t.submit(&creator, &brief_id).await;
    let owner_submission = mine["id"].as_str().unwrap().to_string();
    let creator_submission = theirs["id"].as_str().unwrap().to_string();

    for submission in [&owner_submission, &creator_submission] {
        let (status, _) = t
            .call(
                "POST",
                &format!("/api/submissions/{}/reactions", submission),
                Some(&fan),
                Some(json!({ "type": "like" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = t
        .call("DELETE", &format!("/api/admin/users/{}", fan_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, submission) = t
        .call("GET", &format!("/api/submissions/{}", owner_submission), None, None)
        .await;
    assert_eq!(submission["likes"], 0);

    let (_, brief) = t
        .call("GET", &format!("/api/briefs/{}", brief_id), None, None)
        .await;
    assert_eq!(brief["submission_count"], 2);

    let (status, _) = t
        .call(
            "DELETE",
            &format!("/api/admin/users/{}", creator_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t
        .call("GET", &format!("/api/submissions/{}", creator_submission), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, brief) = t
        .call("GET", &format!("/api/briefs/{}", brief_id), None, None)
        .await;
    assert_eq!(brief["submission_count"], 1);
}
